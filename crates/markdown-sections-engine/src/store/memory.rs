use std::collections::HashMap;

use serde_json::Value;

use super::{
    DocumentId, DocumentRecord, DocumentStore, SectionId, SectionRecord, StoreError,
    ValidationRecord,
};
use crate::models::{DocumentTree, Section};

/// In-process [`DocumentStore`]. Ids start at 1 and are never reused, even
/// after [`DocumentStore::truncate`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Vec<DocumentRecord>,
    sections: Vec<SectionRecord>,
    json_outputs: HashMap<DocumentId, Value>,
    validation_results: HashMap<DocumentId, ValidationRecord>,
    next_document_id: DocumentId,
    next_section_id: SectionId,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn require_document(&self, document_id: DocumentId) -> Result<(), StoreError> {
        if self.documents.iter().any(|d| d.id == document_id) {
            Ok(())
        } else {
            Err(StoreError::DocumentNotFound(document_id))
        }
    }
}

impl DocumentStore for MemoryStore {
    fn insert_document(&mut self, filename: &str) -> Result<DocumentId, StoreError> {
        if let Some(existing) = self.documents.iter().find(|d| d.filename == filename) {
            log::debug!("Document already exists with ID: {}", existing.id);
            return Ok(existing.id);
        }
        self.next_document_id += 1;
        let id = self.next_document_id;
        self.documents.push(DocumentRecord {
            id,
            filename: filename.to_string(),
        });
        log::debug!("Inserted document with ID: {id}");
        Ok(id)
    }

    fn insert_section_row(
        &mut self,
        document_id: DocumentId,
        parent_id: Option<SectionId>,
        section: &Section,
        occurrence: usize,
    ) -> Result<SectionId, StoreError> {
        self.require_document(document_id)?;
        if let Some(parent) = parent_id
            && !self
                .sections
                .iter()
                .any(|s| s.id == parent && s.document_id == document_id)
        {
            return Err(StoreError::SectionNotFound(parent));
        }

        let content = section.content.trim().to_string();
        let mut matching: Vec<&mut SectionRecord> = self
            .sections
            .iter_mut()
            .filter(|s| {
                s.document_id == document_id
                    && s.parent_id == parent_id
                    && s.title == section.title
                    && s.level == section.level
            })
            .collect();
        matching.sort_by_key(|s| (s.position, s.id));
        if let Some(existing) = matching.into_iter().nth(occurrence) {
            existing.content = content;
            log::debug!("Updated section {} for document {document_id}", existing.id);
            return Ok(existing.id);
        }

        let position = self
            .sections
            .iter()
            .filter(|s| s.document_id == document_id && s.parent_id == parent_id)
            .map(|s| s.position)
            .max()
            .map_or(1, |max| max + 1);

        self.next_section_id += 1;
        let id = self.next_section_id;
        self.sections.push(SectionRecord {
            id,
            document_id,
            parent_id,
            title: section.title.clone(),
            content,
            level: section.level,
            position,
        });
        log::debug!("Inserted section {id} for document {document_id}");
        Ok(id)
    }

    fn insert_json_output(
        &mut self,
        document_id: DocumentId,
        tree: &DocumentTree,
    ) -> Result<(), StoreError> {
        self.require_document(document_id)?;
        self.json_outputs.insert(document_id, tree.to_json_value());
        Ok(())
    }

    fn insert_validation_result(
        &mut self,
        document_id: DocumentId,
        is_valid: bool,
        errors: &str,
    ) -> Result<(), StoreError> {
        self.require_document(document_id)?;
        self.validation_results.insert(
            document_id,
            ValidationRecord {
                is_valid,
                errors: errors.to_string(),
            },
        );
        Ok(())
    }

    fn documents(&self) -> Result<Vec<DocumentRecord>, StoreError> {
        Ok(self.documents.clone())
    }

    fn document_id(&self, filename: &str) -> Result<Option<DocumentId>, StoreError> {
        Ok(self
            .documents
            .iter()
            .find(|d| d.filename == filename)
            .map(|d| d.id))
    }

    fn json_output(&self, document_id: DocumentId) -> Result<Option<Value>, StoreError> {
        Ok(self.json_outputs.get(&document_id).cloned())
    }

    fn sections(&self, document_id: DocumentId) -> Result<Vec<SectionRecord>, StoreError> {
        Ok(self
            .sections
            .iter()
            .filter(|s| s.document_id == document_id)
            .cloned()
            .collect())
    }

    fn validation_result(
        &self,
        document_id: DocumentId,
    ) -> Result<Option<ValidationRecord>, StoreError> {
        Ok(self.validation_results.get(&document_id).cloned())
    }

    fn truncate(&mut self) -> Result<(), StoreError> {
        self.documents.clear();
        self.sections.clear();
        self.json_outputs.clear();
        self.validation_results.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::parse_markdown;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insert_document_is_idempotent() {
        let mut store = MemoryStore::new();
        let first = store.insert_document("notes/doc.md").unwrap();
        let second = store.insert_document("notes/doc.md").unwrap();
        let other = store.insert_document("notes/other.md").unwrap();

        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(store.documents().unwrap().len(), 2);
        assert_eq!(store.document_id("notes/doc.md").unwrap(), Some(first));
        assert_eq!(store.document_id("missing.md").unwrap(), None);
    }

    #[test]
    fn test_insert_section_recurses_with_positions() {
        let mut store = MemoryStore::new();
        let doc = store.insert_document("doc.md").unwrap();
        let tree = parse_markdown("# Root\nintro\n## A\n### A.1\n## B\n## C");

        let root_id = store.insert_section(doc, None, &tree).unwrap();
        let rows = store.sections(doc).unwrap();

        assert_eq!(rows.len(), 5);
        let children: Vec<(&str, i64)> = rows
            .iter()
            .filter(|r| r.parent_id == Some(root_id))
            .map(|r| (r.title.as_str(), r.position))
            .collect();
        assert_eq!(children, vec![("A", 1), ("B", 2), ("C", 3)]);
        assert_eq!(store.section_tree(doc).unwrap(), vec![tree]);
    }

    #[test]
    fn test_reinsert_section_refreshes_content() {
        let mut store = MemoryStore::new();
        let doc = store.insert_document("doc.md").unwrap();

        let first = store
            .insert_section(doc, None, &Section::new("Root", 1).with_content("old"))
            .unwrap();
        let second = store
            .insert_section(doc, None, &Section::new("Root", 1).with_content("  new  "))
            .unwrap();

        assert_eq!(first, second);
        let rows = store.sections(doc).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].content, "new");
        assert_eq!(rows[0].position, 1);
    }

    #[test]
    fn test_same_titled_siblings_get_their_own_rows() {
        let mut store = MemoryStore::new();
        let doc = store.insert_document("doc.md").unwrap();
        let tree = parse_markdown(
            "# FAQ\n## Example\nfirst\n### Detail A\n## Example\nsecond\n### Detail B",
        );

        store.insert_section(doc, None, &tree).unwrap();

        assert_eq!(store.sections(doc).unwrap().len(), tree.count());
        assert_eq!(store.section_tree(doc).unwrap(), vec![tree.clone()]);

        let again = tree.clone().with_children(vec![
            Section::new("Example", 2)
                .with_content("first v2")
                .with_children(vec![Section::new("Detail A", 3)]),
            Section::new("Example", 2)
                .with_content("second v2")
                .with_children(vec![Section::new("Detail B", 3)]),
        ]);
        store.insert_section(doc, None, &again).unwrap();

        assert_eq!(store.sections(doc).unwrap().len(), tree.count());
        assert_eq!(store.section_tree(doc).unwrap(), vec![again]);
    }

    #[test]
    fn test_insert_section_requires_document_and_parent() {
        let mut store = MemoryStore::new();
        let section = Section::new("Root", 1);
        assert!(matches!(
            store.insert_section(42, None, &section),
            Err(StoreError::DocumentNotFound(42))
        ));

        let doc = store.insert_document("doc.md").unwrap();
        assert!(matches!(
            store.insert_section(doc, Some(7), &section),
            Err(StoreError::SectionNotFound(7))
        ));
    }

    #[test]
    fn test_json_output_and_validation_are_replaced() {
        let mut store = MemoryStore::new();
        let doc = store.insert_document("doc.md").unwrap();

        let first = DocumentTree::new("doc.md", Section::new("Old", 1));
        let second = DocumentTree::new("doc.md", Section::new("New", 1));
        store.insert_json_output(doc, &first).unwrap();
        store.insert_json_output(doc, &second).unwrap();
        store.insert_validation_result(doc, false, "broken").unwrap();
        store.insert_validation_result(doc, true, "").unwrap();

        assert_eq!(store.json_output(doc).unwrap(), Some(second.to_json_value()));
        assert_eq!(
            store.validation_result(doc).unwrap(),
            Some(ValidationRecord {
                is_valid: true,
                errors: String::new()
            })
        );
    }

    #[test]
    fn test_truncate_clears_everything() {
        let mut store = MemoryStore::new();
        let doc = store.insert_document("doc.md").unwrap();
        store.insert_section(doc, None, &Section::new("Root", 1)).unwrap();
        store.insert_validation_result(doc, true, "").unwrap();

        store.truncate().unwrap();

        assert!(store.documents().unwrap().is_empty());
        assert!(store.sections(doc).unwrap().is_empty());
        assert_eq!(store.validation_result(doc).unwrap(), None);
        assert_ne!(store.insert_document("doc.md").unwrap(), doc);
    }
}
