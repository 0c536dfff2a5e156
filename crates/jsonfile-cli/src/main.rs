//! jsonfile CLI
//!
//! Command-line access to a lock-protected JSON document.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use jsonfile_core::{Dialect, LockOptions, Options, Store};

mod commands;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "jsonfile")]
#[command(about = "Read and modify a JSON file safely from concurrent processes")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Options file (TOML); defaults to $JSONFILE_CONFIG or the user config dir
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pretty-print width in spaces (0 for compact files)
    #[arg(long, global = true)]
    indent: Option<usize>,

    /// Accept JSON5 (comments, trailing commas) when reading
    #[arg(long, global = true)]
    json5: bool,

    /// Value used when the file is unreadable or unparsable
    #[arg(long = "default", global = true, value_name = "VALUE")]
    default_value: Option<String>,

    /// Value used when the file is unreadable
    #[arg(long, global = true, value_name = "VALUE")]
    cant_read_default: Option<String>,

    /// Value used when the file is unparsable
    #[arg(long, global = true, value_name = "VALUE")]
    parse_error_default: Option<String>,

    /// Give up on the lock after this many milliseconds
    #[arg(long, global = true, value_name = "MS")]
    lock_wait_ms: Option<u64>,

    /// Delay between lock polls in milliseconds
    #[arg(long, global = true, value_name = "MS")]
    poll_ms: Option<u64>,

    /// Print results on one line
    #[arg(long, global = true)]
    compact: bool,

    /// Quiet mode - print nothing on success
    #[arg(short, long, global = true)]
    quiet: bool,

    /// The JSON document to operate on
    file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the whole document
    Read,
    /// Replace the whole document
    Write {
        /// New document (JSON, or a plain string)
        value: String,
    },
    /// Print the value at a key path
    Get {
        /// Key path, e.g. `a.b[0].c`
        path: String,
        /// Printed instead of failing when the path is absent
        #[arg(long = "or", value_name = "VALUE")]
        fallback: Option<String>,
    },
    /// Set the value at a key path, creating containers as needed
    Set {
        /// Key path, e.g. `a.b[0].c`
        path: String,
        /// Value (JSON, or a plain string)
        value: String,
    },
    /// Overwrite top-level keys with those of an object
    Merge {
        /// JSON object
        value: String,
    },
    /// Remove top-level keys
    #[command(alias = "rm")]
    Delete {
        /// Keys to remove
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Re-read and re-write the document with the current formatting
    Rewrite,
}

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        if let Some(hint) = e
            .downcast_ref::<jsonfile_core::Error>()
            .and_then(|e| e.recovery_suggestion())
        {
            eprintln!("hint: {}", hint);
        }
        return Err(e);
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let output = Output::new(OutputFormat::from_flags(cli.compact, cli.quiet));
    let store = open_store(cli)?;

    let result = match &cli.command {
        Commands::Read => commands::document::read(&store),
        Commands::Write { value } => commands::document::write(&store, value),
        Commands::Get { path, fallback } => {
            commands::document::get(&store, path, fallback.as_deref())
        }
        Commands::Set { path, value } => commands::document::set(&store, path, value),
        Commands::Merge { value } => commands::document::merge(&store, value),
        Commands::Delete { keys } => commands::document::delete(&store, keys),
        Commands::Rewrite => commands::document::rewrite(&store),
    }?;

    output.print_value(&result)
}

/// Build the store: options file and environment form the store level, the
/// command-line flags the call level
fn open_store(cli: &Cli) -> Result<Store> {
    let config_path = cli.config.clone().unwrap_or_else(Options::config_file_path);
    let mut store_options = Options::load_from_path(&config_path)
        .with_context(|| format!("Failed to load options from {:?}", config_path))?;
    store_options.apply_env_overrides();

    let lock_options = lock_options(cli);

    let call_options = call_options(cli);
    Ok(Store::new(&cli.file)
        .with_options(store_options)
        .with_lock_options(lock_options)
        .with_overrides(&call_options))
}

/// Lock budget from the flags; when either is given the wait time alone
/// bounds acquisition
fn lock_options(cli: &Cli) -> LockOptions {
    let defaults = LockOptions::default();
    if cli.lock_wait_ms.is_none() && cli.poll_ms.is_none() {
        return defaults;
    }

    LockOptions::timed(
        cli.lock_wait_ms.map_or(defaults.wait, Duration::from_millis),
        cli.poll_ms.map_or(defaults.poll_interval, Duration::from_millis),
    )
}

fn call_options(cli: &Cli) -> Options {
    Options {
        default_value: cli.default_value.as_deref().map(commands::parse_value),
        cant_read_file_default: cli.cant_read_default.as_deref().map(commands::parse_value),
        parse_error_default: cli.parse_error_default.as_deref().map(commands::parse_value),
        indent: cli.indent,
        dialect: cli.json5.then_some(Dialect::Json5),
    }
}

/// Initialize logging to stderr
///
/// Only initializes if the JSONFILE_LOG environment variable is set; its
/// value is the level (e.g. `debug`).
fn init_logging() {
    let Ok(log_level) = std::env::var("JSONFILE_LOG") else {
        return;
    };

    let env_filter = EnvFilter::new(format!(
        "jsonfile_core={},jsonfile_cli={}",
        log_level, log_level
    ));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
