mod cli;
mod config;
mod ids;
mod render;
mod store;
mod subject;
mod subjects;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vakken", about = "Track study hours per subject")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[arg(long, help = "Config file path")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "VAKKEN_STORE", help = "Storage file (default: ~/.vakken/storage.json)")]
    pub store: Option<PathBuf>,

    #[arg(long, help = "Storage key holding the subject list")]
    pub key: Option<String>,

    #[arg(long, help = "Keep the list in memory only; nothing is written")]
    pub ephemeral: bool,

    #[arg(short, long, help = "Verbose output (debug logging)")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Show all subjects
    List,
    /// Add a subject with zero logged hours
    Add {
        name: Option<String>,
        credits: Option<String>,
    },
    /// Delete a subject by id
    Delete { id: u64 },
    /// Rename a subject
    Rename { id: u64, name: String },
    /// Set the credit points of a subject
    Credits { id: u64, value: String },
    /// Overwrite the logged hours of a subject
    Hours { id: u64, value: String },
    /// Log one more hour on a subject
    Log { id: u64 },
    /// Interactive session (default)
    Repl,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "vakken=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_logging(args.verbose);

    let mut cfg = if let Some(config_path) = &args.config {
        config::Config::load_from(config_path)?
    } else {
        config::Config::load()?
    };

    // CLI flags override config files
    if let Some(path) = &args.store {
        cfg.storage.path = Some(path.clone());
    }
    if let Some(key) = &args.key {
        cfg.storage.key = Some(key.clone());
    }

    if let Err(errors) = cfg.validate() {
        for error in &errors {
            eprintln!("Config error {}", error);
        }
        return Err(anyhow::anyhow!(
            "Invalid configuration ({} errors)",
            errors.len()
        ));
    }

    let store: Box<dyn store::KeyValueStore> = if args.ephemeral {
        tracing::debug!("using in-memory storage");
        Box::new(store::MemoryStore::new())
    } else {
        let storage_path = cfg.storage_path().ok_or_else(|| {
            anyhow::anyhow!(
                "Cannot determine a home directory; pass --store to choose a storage file"
            )
        })?;
        tracing::debug!(path = %storage_path.display(), key = cfg.storage_key(), "opening storage");
        Box::new(store::FileStore::new(storage_path))
    };
    let list = subjects::SubjectList::load(store, cfg.storage_key())?;
    let mut ctx = cli::Context::new(cfg, list);

    match args.command.unwrap_or(Command::Repl) {
        Command::Repl => cli::run_repl(ctx),
        command => cli::run_once(&mut ctx, command),
    }
}
