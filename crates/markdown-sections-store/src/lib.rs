//! SQLite-backed [`DocumentStore`].
//!
//! # Schema
//!
//! - `document`: one row per source file, unique on `filename`
//! - `section`: the section hierarchy, `parent_id` pointing at another row
//!   of the same document and `position` ordering siblings from 1
//! - `json_output`: the serialized tree, one row per document
//! - `validation_result`: the last validation outcome, one row per document
//!
//! Ids use `AUTOINCREMENT` so they are never handed out twice, even after
//! [`DocumentStore::truncate`].

use std::path::Path;

use markdown_sections_engine::models::{DocumentTree, Section};
use markdown_sections_engine::store::{
    DocumentId, DocumentRecord, DocumentStore, SectionId, SectionRecord, StoreError,
    ValidationRecord,
};
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS document (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    filename TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS section (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    document_id INTEGER NOT NULL REFERENCES document(id) ON DELETE CASCADE,
    parent_id INTEGER REFERENCES section(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    content TEXT NOT NULL DEFAULT '',
    level INTEGER NOT NULL,
    position INTEGER NOT NULL,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS json_output (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    document_id INTEGER NOT NULL UNIQUE REFERENCES document(id) ON DELETE CASCADE,
    json_content TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS validation_result (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    document_id INTEGER NOT NULL UNIQUE REFERENCES document(id) ON DELETE CASCADE,
    is_valid INTEGER NOT NULL,
    errors TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_section_document ON section(document_id);
CREATE INDEX IF NOT EXISTS idx_section_parent ON section(document_id, parent_id);
"#;

/// Document store in a single SQLite database file.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `path` and its schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        log::debug!("Opening document store at {}", path.display());
        let conn = Connection::open(path).map_err(StoreError::backend)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(StoreError::backend)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(StoreError::backend)?;
        conn.execute_batch(SCHEMA).map_err(StoreError::backend)?;
        Ok(Self { conn })
    }

    fn require_document(&self, document_id: DocumentId) -> Result<(), StoreError> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM document WHERE id = ?1",
                [document_id],
                |_| Ok(()),
            )
            .optional()
            .map_err(StoreError::backend)?;
        found.ok_or(StoreError::DocumentNotFound(document_id))
    }

    fn require_parent(
        &self,
        document_id: DocumentId,
        parent_id: SectionId,
    ) -> Result<(), StoreError> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM section WHERE id = ?1 AND document_id = ?2",
                params![parent_id, document_id],
                |_| Ok(()),
            )
            .optional()
            .map_err(StoreError::backend)?;
        found.ok_or(StoreError::SectionNotFound(parent_id))
    }
}

impl DocumentStore for SqliteStore {
    fn insert_document(&mut self, filename: &str) -> Result<DocumentId, StoreError> {
        let inserted = self
            .conn
            .execute(
                "INSERT INTO document (filename) VALUES (?1) ON CONFLICT(filename) DO NOTHING",
                [filename],
            )
            .map_err(StoreError::backend)?;

        let id: DocumentId = self
            .conn
            .query_row(
                "SELECT id FROM document WHERE filename = ?1",
                [filename],
                |row| row.get(0),
            )
            .map_err(StoreError::backend)?;

        if inserted == 0 {
            log::debug!("Document already exists with ID: {id}");
        } else {
            log::debug!("Inserted document with ID: {id}");
        }
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
        if let Some(parent) = parent_id {
            self.require_parent(document_id, parent)?;
        }
        let content = section.content.trim();

        let existing: Option<SectionId> = self
            .conn
            .query_row(
                "SELECT id FROM section
                 WHERE document_id = ?1 AND parent_id IS ?2 AND title = ?3 AND level = ?4
                 ORDER BY position, id
                 LIMIT 1 OFFSET ?5",
                params![
                    document_id,
                    parent_id,
                    section.title,
                    section.level,
                    occurrence as i64
                ],
                |row| row.get(0),
            )
            .optional()
            .map_err(StoreError::backend)?;

        if let Some(id) = existing {
            self.conn
                .execute(
                    "UPDATE section SET content = ?1, updated_at = CURRENT_TIMESTAMP WHERE id = ?2",
                    params![content, id],
                )
                .map_err(StoreError::backend)?;
            log::debug!("Updated section {id} for document {document_id}");
            return Ok(id);
        }

        self.conn
            .execute(
                "INSERT INTO section (document_id, parent_id, title, content, level, position)
                 VALUES (?1, ?2, ?3, ?4, ?5, (
                     SELECT COALESCE(MAX(position), 0) + 1 FROM section
                     WHERE document_id = ?1 AND parent_id IS ?2
                 ))",
                params![document_id, parent_id, section.title, content, section.level],
            )
            .map_err(StoreError::backend)?;
        let id = self.conn.last_insert_rowid();
        log::debug!("Inserted section {id} for document {document_id}");
        Ok(id)
    }

    fn insert_json_output(
        &mut self,
        document_id: DocumentId,
        tree: &DocumentTree,
    ) -> Result<(), StoreError> {
        self.require_document(document_id)?;
        let json = serde_json::to_string(&tree.to_json_value()).map_err(StoreError::backend)?;
        self.conn
            .execute(
                "INSERT INTO json_output (document_id, json_content) VALUES (?1, ?2)
                 ON CONFLICT(document_id) DO UPDATE SET
                     json_content = excluded.json_content,
                     created_at = CURRENT_TIMESTAMP",
                params![document_id, json],
            )
            .map_err(StoreError::backend)?;
        Ok(())
    }

    fn insert_validation_result(
        &mut self,
        document_id: DocumentId,
        is_valid: bool,
        errors: &str,
    ) -> Result<(), StoreError> {
        self.require_document(document_id)?;
        self.conn
            .execute(
                "INSERT INTO validation_result (document_id, is_valid, errors) VALUES (?1, ?2, ?3)
                 ON CONFLICT(document_id) DO UPDATE SET
                     is_valid = excluded.is_valid,
                     errors = excluded.errors,
                     created_at = CURRENT_TIMESTAMP",
                params![document_id, is_valid, errors],
            )
            .map_err(StoreError::backend)?;
        Ok(())
    }

    fn documents(&self) -> Result<Vec<DocumentRecord>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, filename FROM document ORDER BY id")
            .map_err(StoreError::backend)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(DocumentRecord {
                    id: row.get(0)?,
                    filename: row.get(1)?,
                })
            })
            .map_err(StoreError::backend)?;
        rows.collect::<Result<_, _>>().map_err(StoreError::backend)
    }

    fn document_id(&self, filename: &str) -> Result<Option<DocumentId>, StoreError> {
        self.conn
            .query_row(
                "SELECT id FROM document WHERE filename = ?1",
                [filename],
                |row| row.get(0),
            )
            .optional()
            .map_err(StoreError::backend)
    }

    fn json_output(&self, document_id: DocumentId) -> Result<Option<Value>, StoreError> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT json_content FROM json_output WHERE document_id = ?1",
                [document_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(StoreError::backend)?;
        json.map(|text| serde_json::from_str(&text).map_err(StoreError::backend))
            .transpose()
    }

    fn sections(&self, document_id: DocumentId) -> Result<Vec<SectionRecord>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, document_id, parent_id, title, content, level, position
                 FROM section WHERE document_id = ?1 ORDER BY id",
            )
            .map_err(StoreError::backend)?;
        let rows = stmt
            .query_map([document_id], |row| {
                Ok(SectionRecord {
                    id: row.get(0)?,
                    document_id: row.get(1)?,
                    parent_id: row.get(2)?,
                    title: row.get(3)?,
                    content: row.get(4)?,
                    level: row.get(5)?,
                    position: row.get(6)?,
                })
            })
            .map_err(StoreError::backend)?;
        rows.collect::<Result<_, _>>().map_err(StoreError::backend)
    }

    fn validation_result(
        &self,
        document_id: DocumentId,
    ) -> Result<Option<ValidationRecord>, StoreError> {
        self.conn
            .query_row(
                "SELECT is_valid, errors FROM validation_result WHERE document_id = ?1",
                [document_id],
                |row| {
                    Ok(ValidationRecord {
                        is_valid: row.get(0)?,
                        errors: row.get(1)?,
                    })
                },
            )
            .optional()
            .map_err(StoreError::backend)
    }

    fn truncate(&mut self) -> Result<(), StoreError> {
        self.conn
            .execute_batch(
                "BEGIN;
                 DELETE FROM validation_result;
                 DELETE FROM json_output;
                 DELETE FROM section;
                 DELETE FROM document;
                 COMMIT;",
            )
            .map_err(StoreError::backend)?;
        log::info!("All tables truncated");
        Ok(())
    }
}
