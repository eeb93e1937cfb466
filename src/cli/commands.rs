//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

use crate::agent::{PromptSet, default_registry};
use crate::cli::output::{
    OutputFormat, format_message, format_records, format_result, format_status,
};
use crate::cli::parser::{Cli, Commands};
use crate::coordinator::{Coordinator, CoordinatorConfig};
use crate::core::MemoryRecord;
use crate::error::{CommandError, MemoryError, Result};
use crate::llm::{OpenAiConfig, create_llm};
use crate::memory::{MemoryBank, MemoryConfig};
use crate::plan::{KeywordPlanner, LlmPlanner, Planner};
use crate::storage::{RecordStore, SqliteStore};
use crate::tool::default_gateway;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// Executes the CLI command.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);
    let db_path = cli.get_db_path();

    match &cli.command {
        Commands::Init { force } => cmd_init(&db_path, *force, format),
        Commands::Status => cmd_status(&db_path, format),
        Commands::Reset { yes } => cmd_reset(&db_path, *yes, format),
        Commands::Analyze {
            query,
            session,
            owner,
            llm,
            model,
            base_url,
            prompt_dir,
            max_concurrency,
            offline,
        } => cmd_analyze(
            &db_path,
            &AnalyzeArgs {
                query,
                session,
                owner,
                llm,
                model: model.as_deref(),
                base_url: base_url.as_deref(),
                prompt_dir: prompt_dir.as_deref(),
                max_concurrency: *max_concurrency,
                offline: *offline,
            },
            format,
        ),
        Commands::Recall { owner, limit } => cmd_recall(&db_path, owner, *limit, format),
        Commands::Forget { owner, key } => cmd_forget(&db_path, owner, key, format),
    }
}

/// Flags for the analyze command.
struct AnalyzeArgs<'a> {
    query: &'a str,
    session: &'a str,
    owner: &'a str,
    llm: &'a str,
    model: Option<&'a str>,
    base_url: Option<&'a str>,
    prompt_dir: Option<&'a Path>,
    max_concurrency: usize,
    offline: bool,
}

fn open_store(db_path: &Path) -> Result<SqliteStore> {
    let store = SqliteStore::open(db_path)?;
    if !store.is_initialized()? {
        return Err(MemoryError::NotInitialized.into());
    }
    Ok(store)
}

fn cmd_init(db_path: &Path, force: bool, format: OutputFormat) -> Result<String> {
    if db_path.exists() && !force {
        return Err(CommandError::ExecutionFailed(
            "Database already exists. Use --force to reinitialize.".to_string(),
        )
        .into());
    }

    if force && db_path.exists() {
        std::fs::remove_file(db_path).map_err(|e| {
            CommandError::ExecutionFailed(format!("Failed to remove existing database: {e}"))
        })?;
    }

    let store = SqliteStore::open(db_path)?;
    store.init()?;

    Ok(format_message(
        &format!("Initialized memory store at {}", db_path.display()),
        format,
    ))
}

fn cmd_status(db_path: &Path, format: OutputFormat) -> Result<String> {
    let store = open_store(db_path)?;
    let stats = store.stats()?;
    Ok(format_status(&stats, format))
}

fn cmd_reset(db_path: &Path, yes: bool, format: OutputFormat) -> Result<String> {
    if !yes {
        return Err(CommandError::ExecutionFailed(
            "Use --yes to confirm reset. This will delete all records.".to_string(),
        )
        .into());
    }

    let store = open_store(db_path)?;
    store.reset()?;
    Ok(format_message("Memory store reset.", format))
}

fn cmd_analyze(db_path: &Path, args: &AnalyzeArgs<'_>, format: OutputFormat) -> Result<String> {
    let store = open_store(db_path)?;
    let bank = Arc::new(MemoryBank::new(Arc::new(store), MemoryConfig::default()));
    let prompts = Arc::new(PromptSet::load(args.prompt_dir));

    let mut llm_config = OpenAiConfig::from_env();
    if let Some(model) = args.model {
        llm_config = llm_config.with_model(model);
    }
    if let Some(base_url) = args.base_url {
        llm_config = llm_config.with_base_url(base_url);
    }

    let backend = if args.offline { "offline" } else { args.llm };
    let llm = create_llm(backend, llm_config)?;

    // Planning degrades with the backend: no network means the
    // deterministic keyword planner.
    let planner: Arc<dyn Planner> = if backend == "offline" {
        Arc::new(KeywordPlanner::new())
    } else {
        Arc::new(LlmPlanner::new(Arc::clone(&llm)).with_system_prompt(&prompts.planner))
    };

    let coordinator = Coordinator::new(
        Arc::clone(&bank),
        Arc::new(default_registry()),
        Arc::new(default_gateway()),
        llm,
        planner,
        prompts,
        CoordinatorConfig::default().with_max_concurrency(args.max_concurrency),
    );

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(coordinator.analyze(args.session, args.query))?;

    // Persist the answer as a long-term insight; a write failure never
    // loses the computed result.
    if let Some(answer) = result.payload.get("answer").and_then(Value::as_str)
        && let Err(err) = bank.remember(args.owner, &MemoryRecord::insight(answer))
    {
        warn!(owner = args.owner, error = %err, "failed to persist insight");
    }

    Ok(format_result(&result, format))
}

fn cmd_recall(
    db_path: &Path,
    owner: &str,
    limit: Option<usize>,
    format: OutputFormat,
) -> Result<String> {
    let store = open_store(db_path)?;
    let mut records = store.list(owner)?;
    if let Some(limit) = limit {
        records.truncate(limit);
    }
    Ok(format_records(&records, format))
}

fn cmd_forget(db_path: &Path, owner: &str, key: &str, format: OutputFormat) -> Result<String> {
    let store = open_store(db_path)?;
    if store.delete(owner, key)? {
        Ok(format_message(&format!("Forgot record: {key}"), format))
    } else {
        Err(CommandError::ExecutionFailed(format!("No record found for key: {key}")).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_in(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("memory.db")
    }

    #[test]
    fn test_init_then_status() {
        let dir = tempfile::tempdir().unwrap();
        let db = db_in(&dir);

        let output = cmd_init(&db, false, OutputFormat::Text).unwrap();
        assert!(output.contains("Initialized"));

        let output = cmd_status(&db, OutputFormat::Text).unwrap();
        assert!(output.contains("Records:  0"));
    }

    #[test]
    fn test_init_refuses_existing_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let db = db_in(&dir);
        cmd_init(&db, false, OutputFormat::Text).unwrap();

        let err = cmd_init(&db, false, OutputFormat::Text).unwrap_err();
        assert!(err.to_string().contains("--force"));

        cmd_init(&db, true, OutputFormat::Text).unwrap();
    }

    #[test]
    fn test_status_requires_init() {
        let dir = tempfile::tempdir().unwrap();
        let err = cmd_status(&db_in(&dir), OutputFormat::Text).unwrap_err();
        assert!(err.to_string().contains("not initialized"));
    }

    #[test]
    fn test_reset_requires_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let db = db_in(&dir);
        cmd_init(&db, false, OutputFormat::Text).unwrap();

        let err = cmd_reset(&db, false, OutputFormat::Text).unwrap_err();
        assert!(err.to_string().contains("--yes"));

        let output = cmd_reset(&db, true, OutputFormat::Text).unwrap();
        assert!(output.contains("reset"));
    }

    #[test]
    fn test_recall_and_forget() {
        let dir = tempfile::tempdir().unwrap();
        let db = db_in(&dir);
        cmd_init(&db, false, OutputFormat::Text).unwrap();

        let store = open_store(&db).unwrap();
        store
            .put("alice", &MemoryRecord::new("pref", "charts", "preference"))
            .unwrap();
        drop(store);

        let output = cmd_recall(&db, "alice", None, OutputFormat::Text).unwrap();
        assert!(output.contains("pref"));

        let output = cmd_forget(&db, "alice", "pref", OutputFormat::Text).unwrap();
        assert!(output.contains("Forgot"));

        let err = cmd_forget(&db, "alice", "pref", OutputFormat::Text).unwrap_err();
        assert!(err.to_string().contains("No record"));
    }

    #[test]
    fn test_analyze_offline_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let db = db_in(&dir);
        cmd_init(&db, false, OutputFormat::Text).unwrap();

        let args = AnalyzeArgs {
            query: "what do the figures suggest?",
            session: "s1",
            owner: "alice",
            llm: "openai",
            model: None,
            base_url: None,
            prompt_dir: None,
            max_concurrency: 2,
            offline: true,
        };
        let output = cmd_analyze(&db, &args, OutputFormat::Text).unwrap();
        assert!(output.contains("status: Ok"));

        // The answer landed in long-term memory as an insight.
        let recalled = cmd_recall(&db, "alice", None, OutputFormat::Text).unwrap();
        assert!(recalled.contains("insight"));
    }
}
