use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::section::Section;

#[derive(Debug, thiserror::Error)]
pub enum DocumentTreeError {
    #[error("expected exactly one document key, found {0}")]
    DocumentCount(usize),
    #[error("expected exactly one root section for '{name}', found {count}")]
    RootCount { name: String, count: usize },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The public conversion output: a single root section keyed by the source
/// file's base name.
///
/// Serializes as `{ "<name>": [ <root> ] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, Vec<Section>>",
    into = "BTreeMap<String, Vec<Section>>"
)]
pub struct DocumentTree {
    name: String,
    root: Section,
}

impl DocumentTree {
    pub fn new(name: impl Into<String>, root: Section) -> Self {
        Self {
            name: name.into(),
            root,
        }
    }

    /// Key the tree by the base name of `source`, falling back to the whole
    /// path when it has no file name component.
    pub fn for_source(source: &Path, root: Section) -> Self {
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.to_string_lossy().into_owned());
        Self::new(name, root)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Section {
        &self.root
    }

    pub fn into_root(self) -> Section {
        self.root
    }

    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({ &self.name: [&self.root] })
    }

    /// Pretty JSON with two-space indentation.
    pub fn to_json_pretty(&self) -> Result<String, DocumentTreeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self, DocumentTreeError> {
        let map: BTreeMap<String, Vec<Section>> = serde_json::from_str(json)?;
        Self::try_from(map)
    }
}

impl TryFrom<BTreeMap<String, Vec<Section>>> for DocumentTree {
    type Error = DocumentTreeError;

    fn try_from(map: BTreeMap<String, Vec<Section>>) -> Result<Self, Self::Error> {
        if map.len() != 1 {
            return Err(DocumentTreeError::DocumentCount(map.len()));
        }
        let Some((name, mut roots)) = map.into_iter().next() else {
            return Err(DocumentTreeError::DocumentCount(0));
        };
        if roots.len() != 1 {
            return Err(DocumentTreeError::RootCount {
                name,
                count: roots.len(),
            });
        }
        let root = roots.remove(0);
        Ok(Self { name, root })
    }
}

impl From<DocumentTree> for BTreeMap<String, Vec<Section>> {
    fn from(tree: DocumentTree) -> Self {
        BTreeMap::from([(tree.name, vec![tree.root])])
    }
}
