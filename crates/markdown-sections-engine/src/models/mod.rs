pub mod document_tree;
pub mod section;

pub use document_tree::{DocumentTree, DocumentTreeError};
pub use section::{DEFAULT_ROOT_TITLE, Section, SectionIter};
