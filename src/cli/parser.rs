//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Ensemble: multi-agent analytics orchestration.
///
/// Decomposes analysis requests into task DAGs, dispatches them to
/// worker agents, and maintains session memory with bounded context.
#[derive(Parser, Debug)]
#[command(name = "ensemble-rs")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the long-term memory database file.
    ///
    /// Defaults to `.ensemble/memory.db` in the current directory.
    #[arg(short, long, env = "ENSEMBLE_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the memory database.
    ///
    /// Creates the database file and schema if they don't exist.
    Init {
        /// Force re-initialization (destroys existing data).
        #[arg(short, long)]
        force: bool,
    },

    /// Show memory store status.
    Status,

    /// Reset long-term memory (delete all records).
    Reset {
        /// Skip confirmation prompt.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Run an analysis request.
    Analyze {
        /// The natural-language analysis request.
        query: String,

        /// Session to run the request against.
        #[arg(short, long, default_value = "default")]
        session: String,

        /// Owner for long-term memory records.
        #[arg(short, long, default_value = "default")]
        owner: String,

        /// LLM backend (openai, offline).
        #[arg(long, default_value = "openai")]
        llm: String,

        /// Model identifier for the LLM backend.
        #[arg(long, env = "OPENAI_MODEL")]
        model: Option<String>,

        /// Base URL for OpenAI-compatible endpoints.
        #[arg(long, env = "OPENAI_BASE_URL")]
        base_url: Option<String>,

        /// Directory with prompt template overrides.
        #[arg(long, env = "ENSEMBLE_PROMPT_DIR")]
        prompt_dir: Option<PathBuf>,

        /// Maximum number of tasks executing at once.
        #[arg(long, default_value = "4")]
        max_concurrency: usize,

        /// Run without network access (deterministic LLM and planner).
        #[arg(long)]
        offline: bool,
    },

    /// List long-term memory records for an owner.
    Recall {
        /// Record owner.
        owner: String,

        /// Maximum number of records to show.
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Delete one long-term memory record.
    Forget {
        /// Record owner.
        owner: String,

        /// Record key.
        key: String,
    },
}

impl Cli {
    /// Resolved database path (flag, env, or default).
    #[must_use]
    pub fn get_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(crate::storage::DEFAULT_DB_PATH))
    }
}
