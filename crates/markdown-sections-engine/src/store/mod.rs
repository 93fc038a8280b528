//! # Document Store
//!
//! The persistence contract used by conversion. A store keeps, per document
//! (keyed by filename):
//!
//! - the section hierarchy as rows with parent back-references and a
//!   position counter per sibling group
//! - the serialized JSON output (one per document, replaced on rewrite)
//! - the validation result (one per document, replaced on rewrite)
//!
//! [`MemoryStore`] is the in-process implementation; the SQLite backend
//! lives in the `markdown-sections-store` crate.

pub mod memory;

pub use memory::MemoryStore;

use serde_json::Value;

use crate::models::{DocumentTree, Section};

pub type DocumentId = i64;
pub type SectionId = i64;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Document {0} not found")]
    DocumentNotFound(DocumentId),
    #[error("Section {0} not found")]
    SectionNotFound(SectionId),
    #[error("Store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        StoreError::Backend(Box::new(err))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    pub id: DocumentId,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRecord {
    pub id: SectionId,
    pub document_id: DocumentId,
    pub parent_id: Option<SectionId>,
    pub title: String,
    pub content: String,
    pub level: u8,
    /// 1-based order among rows sharing `(document_id, parent_id)`.
    pub position: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRecord {
    pub is_valid: bool,
    pub errors: String,
}

pub trait DocumentStore {
    /// Returns the id for `filename`, creating the document if needed.
    /// Inserting an existing filename returns its existing id.
    fn insert_document(&mut self, filename: &str) -> Result<DocumentId, StoreError>;

    /// Stores a single section row without its children.
    ///
    /// `occurrence` counts the earlier siblings sharing this section's title
    /// and level. The stored rows with the same document, parent, title and
    /// level are taken in position order and the one at index `occurrence`
    /// is reused: its content is refreshed and its id and position are kept.
    /// Without such a row a new one is placed after its existing siblings.
    fn insert_section_row(
        &mut self,
        document_id: DocumentId,
        parent_id: Option<SectionId>,
        section: &Section,
        occurrence: usize,
    ) -> Result<SectionId, StoreError>;

    /// Stores or replaces the JSON output of a document.
    fn insert_json_output(
        &mut self,
        document_id: DocumentId,
        tree: &DocumentTree,
    ) -> Result<(), StoreError>;

    /// Stores or replaces the validation result of a document.
    fn insert_validation_result(
        &mut self,
        document_id: DocumentId,
        is_valid: bool,
        errors: &str,
    ) -> Result<(), StoreError>;

    fn documents(&self) -> Result<Vec<DocumentRecord>, StoreError>;

    fn document_id(&self, filename: &str) -> Result<Option<DocumentId>, StoreError>;

    fn json_output(&self, document_id: DocumentId) -> Result<Option<Value>, StoreError>;

    /// All section rows of a document, ordered by id.
    fn sections(&self, document_id: DocumentId) -> Result<Vec<SectionRecord>, StoreError>;

    fn validation_result(
        &self,
        document_id: DocumentId,
    ) -> Result<Option<ValidationRecord>, StoreError>;

    /// Removes every document and everything attached to it.
    fn truncate(&mut self) -> Result<(), StoreError>;

    /// Stores `section` as the first of its title and level under
    /// `parent_id` and, recursively, all of its children.
    fn insert_section(
        &mut self,
        document_id: DocumentId,
        parent_id: Option<SectionId>,
        section: &Section,
    ) -> Result<SectionId, StoreError> {
        self.insert_section_at(document_id, parent_id, section, 0)
    }

    fn insert_section_at(
        &mut self,
        document_id: DocumentId,
        parent_id: Option<SectionId>,
        section: &Section,
        occurrence: usize,
    ) -> Result<SectionId, StoreError> {
        let id = self.insert_section_row(document_id, parent_id, section, occurrence)?;
        for (index, child) in section.children.iter().enumerate() {
            let occurrence = section.children[..index]
                .iter()
                .filter(|earlier| earlier.title == child.title && earlier.level == child.level)
                .count();
            self.insert_section_at(document_id, Some(id), child, occurrence)?;
        }
        Ok(id)
    }

    /// Rebuilds the stored section forest of a document, siblings ordered by
    /// position.
    fn section_tree(&self, document_id: DocumentId) -> Result<Vec<Section>, StoreError> {
        Ok(assemble_sections(&self.sections(document_id)?))
    }
}

/// Nests flat section rows under their parents. Rows whose parent is not in
/// `rows` are treated as roots.
pub fn assemble_sections(rows: &[SectionRecord]) -> Vec<Section> {
    fn children_of(rows: &[SectionRecord], parent: Option<SectionId>) -> Vec<Section> {
        let mut siblings: Vec<&SectionRecord> =
            rows.iter().filter(|r| r.parent_id == parent).collect();
        siblings.sort_by_key(|r| (r.position, r.id));
        siblings
            .into_iter()
            .map(|r| Section {
                title: r.title.clone(),
                content: r.content.clone(),
                level: r.level,
                children: children_of(rows, Some(r.id)),
            })
            .collect()
    }

    let mut roots = children_of(rows, None);
    for orphan in rows.iter().filter(|r| {
        r.parent_id
            .is_some_and(|parent| !rows.iter().any(|other| other.id == parent))
    }) {
        roots.push(Section {
            title: orphan.title.clone(),
            content: orphan.content.clone(),
            level: orphan.level,
            children: children_of(rows, Some(orphan.id)),
        });
    }
    roots
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(id: SectionId, parent_id: Option<SectionId>, title: &str, level: u8, position: i64) -> SectionRecord {
        SectionRecord {
            id,
            document_id: 1,
            parent_id,
            title: title.to_string(),
            content: String::new(),
            level,
            position,
        }
    }

    #[test]
    fn test_assemble_orders_siblings_by_position() {
        let rows = vec![
            row(1, None, "Root", 1, 1),
            row(2, Some(1), "Second", 2, 2),
            row(3, Some(1), "First", 2, 1),
            row(4, Some(3), "Nested", 3, 1),
        ];
        assert_eq!(
            assemble_sections(&rows),
            vec![Section::new("Root", 1).with_children(vec![
                Section::new("First", 2).with_children(vec![Section::new("Nested", 3)]),
                Section::new("Second", 2),
            ])]
        );
    }

    #[test]
    fn test_assemble_keeps_orphans_as_roots() {
        let rows = vec![row(1, None, "Root", 1, 1), row(5, Some(99), "Orphan", 2, 1)];
        let forest = assemble_sections(&rows);
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[1].title, "Orphan");
    }
}
