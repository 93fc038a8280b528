use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use markdown_sections_config::Config;

mod commands;

use commands::{CommandResult, ConvertArgs};

#[derive(Parser)]
#[command(name = "markdown-sections")]
#[command(about = "Convert markdown into a JSON tree of sections", long_about = None)]
struct Cli {
    /// Log at debug level
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a markdown file to JSON, optionally saving it to a database
    Convert {
        #[arg(value_name = "SOURCE")]
        source: PathBuf,

        /// Output JSON path, defaults to <SOURCE stem>.json next to the source
        #[arg(long, short = 'o', value_name = "OUT")]
        output: Option<PathBuf>,

        /// SQLite database to save the document into
        #[arg(long, value_name = "PATH")]
        db: Option<PathBuf>,

        /// Skip saving even when the config enables it
        #[arg(long, conflicts_with = "db")]
        no_db: bool,
    },
    /// Validate an existing JSON section tree
    Validate {
        #[arg(value_name = "JSON")]
        path: PathBuf,
    },
    /// List stored documents
    Documents {
        #[arg(long, value_name = "PATH")]
        db: Option<PathBuf>,
    },
    /// Print the stored outline and validation result of a document
    Show {
        #[arg(value_name = "FILENAME")]
        filename: PathBuf,

        #[arg(long, value_name = "PATH")]
        db: Option<PathBuf>,
    },
    /// Delete every stored document
    Truncate {
        #[arg(long, value_name = "PATH")]
        db: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

fn run(cli: Cli, config: &Config) -> CommandResult {
    let mut out = std::io::stdout().lock();
    match cli.command {
        Command::Convert {
            source,
            output,
            db,
            no_db,
        } => commands::convert(
            ConvertArgs {
                source,
                output,
                db,
                no_db,
            },
            config,
            &mut out,
        ),
        Command::Validate { path } => commands::validate(&path, &mut out),
        Command::Documents { db } => {
            commands::documents(&commands::resolve_db_path(db, config)?, &mut out)
        }
        Command::Show { filename, db } => commands::show(
            &commands::resolve_db_path(db, config)?,
            &filename,
            &mut out,
        ),
        Command::Truncate { db } => {
            commands::truncate(&commands::resolve_db_path(db, config)?, &mut out)
        }
    }
}

fn load_config() -> Result<Config> {
    let config = Config::load().with_context(|| {
        format!(
            "Failed to load config file {}",
            Config::config_path().display()
        )
    })?;
    Ok(config.unwrap_or_default())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = load_config().and_then(|config| run(cli, &config));
    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    }
}
