use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use markdown_sections_config::Config;
use markdown_sections_engine::{Converter, DocumentStore, Validator, io, persist};
use markdown_sections_store::SqliteStore;

/// Each command returns `Ok(false)` when it ran but the outcome should
/// fail the process, e.g. an invalid JSON file.
pub type CommandResult = Result<bool>;

pub struct ConvertArgs {
    pub source: PathBuf,
    pub output: Option<PathBuf>,
    pub db: Option<PathBuf>,
    pub no_db: bool,
}

pub fn convert(args: ConvertArgs, config: &Config, out: &mut impl Write) -> CommandResult {
    let mut converter = Converter::new(&args.source);
    if let Some(output) = args
        .output
        .or_else(|| config.output_path_for(converter.source()))
    {
        converter = converter.with_output_path(output);
    }

    let outcome = converter
        .convert()
        .with_context(|| format!("Failed to convert {}", args.source.display()))?;

    writeln!(
        out,
        "Successfully converted {} to {}",
        outcome.source.display(),
        outcome.output_path.display()
    )?;
    if !outcome.validation.is_valid() {
        writeln!(out, "{}", outcome.validation.message())?;
    }

    if args.no_db {
        return Ok(true);
    }
    let db_path = match args.db {
        Some(path) => Some(path),
        None if config.save_to_db => {
            let path = config.database_path.clone();
            if path.is_none() {
                log::warn!("save_to_db is set but no database_path is configured");
            }
            path
        }
        None => None,
    };

    if let Some(db_path) = db_path {
        let mut store = open_store(&db_path)?;
        let document_id = persist(&outcome, &mut store)
            .with_context(|| format!("Failed to save to database {}", db_path.display()))?;
        writeln!(out, "Saved to database as document {document_id}")?;
    }
    Ok(true)
}

pub fn validate(path: &Path, out: &mut impl Write) -> CommandResult {
    let data = io::read_json_value(path)?;
    let outcome = Validator::new().validate(&data);
    if outcome.is_valid() {
        writeln!(out, "Validation passed: {}", path.display())?;
    } else {
        writeln!(out, "{}", outcome.message())?;
    }
    Ok(outcome.is_valid())
}

pub fn documents(db_path: &Path, out: &mut impl Write) -> CommandResult {
    let store = open_existing_store(db_path)?;
    let documents = store.documents()?;
    if documents.is_empty() {
        writeln!(out, "No documents stored")?;
    }
    for document in documents {
        writeln!(out, "{:>4}  {}", document.id, document.filename)?;
    }
    Ok(true)
}

pub fn show(db_path: &Path, filename: &Path, out: &mut impl Write) -> CommandResult {
    let store = open_existing_store(db_path)?;
    let filename = io::normalize_path(filename);
    let Some(document_id) = store.document_id(&filename.to_string_lossy())? else {
        bail!("No stored document named {}", filename.display());
    };

    writeln!(out, "{} (document {document_id})", filename.display())?;
    for section in store.section_tree(document_id)? {
        write!(out, "{}", section.outline())?;
    }
    match store.validation_result(document_id)? {
        Some(record) if record.is_valid => writeln!(out, "Validation: passed")?,
        Some(record) => writeln!(out, "Validation: failed\n{}", record.errors)?,
        None => writeln!(out, "Validation: not recorded")?,
    }
    Ok(true)
}

pub fn truncate(db_path: &Path, out: &mut impl Write) -> CommandResult {
    let mut store = open_existing_store(db_path)?;
    store.truncate()?;
    writeln!(out, "All tables truncated in {}", db_path.display())?;
    Ok(true)
}

/// Picks `--db` over the configured database path.
pub fn resolve_db_path(flag: Option<PathBuf>, config: &Config) -> Result<PathBuf> {
    match flag.or_else(|| config.database_path.clone()) {
        Some(path) => Ok(path),
        None => bail!(
            "No database given; pass --db or set database_path in {}",
            Config::config_path().display()
        ),
    }
}

/// Opens a database for inspection without creating it.
fn open_existing_store(db_path: &Path) -> Result<SqliteStore> {
    if !db_path.is_file() {
        bail!("Database not found: {}", db_path.display());
    }
    open_store(db_path)
}

fn open_store(db_path: &Path) -> Result<SqliteStore> {
    io::ensure_parent_dir(db_path)?;
    SqliteStore::open(db_path)
        .with_context(|| format!("Failed to open database {}", db_path.display()))
}
