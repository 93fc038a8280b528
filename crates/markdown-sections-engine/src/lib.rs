pub mod convert;
pub mod io;
pub mod models;
pub mod parsing;
pub mod store;
pub mod validation;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use convert::{ConversionOutcome, ConvertError, Converter, persist};
pub use models::{DocumentTree, DocumentTreeError, Section};
pub use parsing::{build_tree, parse_markdown};
pub use store::{DocumentId, DocumentStore, MemoryStore, SectionId, StoreError};
pub use validation::{Stage, ValidationError, ValidationOutcome, Validator};
