use std::path::{Path, PathBuf};

use crate::io::{self, IoError};
use crate::models::DocumentTree;
use crate::parsing::build_tree;
use crate::store::{DocumentId, DocumentStore, StoreError};
use crate::validation::{ValidationOutcome, Validator};

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error(transparent)]
    Io(#[from] IoError),
    #[error("Failed to persist {filename}: {source}")]
    Store {
        filename: String,
        source: StoreError,
    },
}

/// Everything produced by one conversion.
#[derive(Debug, Clone)]
pub struct ConversionOutcome {
    /// Normalized source path; also the document identity in a store.
    pub source: PathBuf,
    pub output_path: PathBuf,
    pub tree: DocumentTree,
    pub validation: ValidationOutcome,
}

/// Converts one markdown file to its JSON section tree.
///
/// The source path is normalized up front. Without an explicit output path
/// the JSON lands next to the source as `<stem>.json`.
pub struct Converter {
    source: PathBuf,
    output_path: PathBuf,
    validator: Validator,
}

impl Converter {
    pub fn new(source: impl AsRef<Path>) -> Self {
        let source = io::normalize_path(source.as_ref());
        let output_path = io::default_output_path(&source);
        Self {
            source,
            output_path,
            validator: Validator::new(),
        }
    }

    pub fn with_output_path(mut self, output_path: impl AsRef<Path>) -> Self {
        self.output_path = io::normalize_path(output_path.as_ref());
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Builds and validates the tree without touching the output file.
    pub fn build(&self) -> Result<(DocumentTree, ValidationOutcome), ConvertError> {
        let lines = io::read_lines(&self.source)?;
        let tree = DocumentTree::for_source(&self.source, build_tree(&lines));
        log::info!(
            "Parsed {} into {} sections",
            self.source.display(),
            tree.root().count()
        );

        let validation = self.validator.validate_tree(&tree);
        if !validation.is_valid() {
            log::warn!("{}: {}", self.source.display(), validation.message());
        }
        Ok((tree, validation))
    }

    /// Reads the source, builds and validates the tree, then writes the JSON.
    ///
    /// Validation failures do not stop the write; they are reported in the
    /// outcome.
    pub fn convert(&self) -> Result<ConversionOutcome, ConvertError> {
        let (tree, validation) = self.build()?;
        io::write_json(&self.output_path, &tree)?;
        log::info!("Output saved to: {}", self.output_path.display());

        Ok(ConversionOutcome {
            source: self.source.clone(),
            output_path: self.output_path.clone(),
            tree,
            validation,
        })
    }
}

/// Saves a conversion into `store`: document, JSON output, the section
/// hierarchy under the root, then the validation result.
pub fn persist(
    outcome: &ConversionOutcome,
    store: &mut dyn DocumentStore,
) -> Result<DocumentId, ConvertError> {
    let filename = outcome.source.to_string_lossy().into_owned();
    let wrap = |source: StoreError| ConvertError::Store {
        filename: filename.clone(),
        source,
    };

    let document_id = store.insert_document(&filename).map_err(wrap)?;
    log::debug!("Inserting JSON output for document ID: {document_id}");
    store
        .insert_json_output(document_id, &outcome.tree)
        .map_err(wrap)?;
    log::debug!("Inserting sections for document ID: {document_id}");
    store
        .insert_section(document_id, None, outcome.tree.root())
        .map_err(wrap)?;
    store
        .insert_validation_result(
            document_id,
            outcome.validation.is_valid(),
            &outcome.validation.message(),
        )
        .map_err(wrap)?;

    log::info!("Stored {filename} as document {document_id}");
    Ok(document_id)
}
