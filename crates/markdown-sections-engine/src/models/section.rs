use serde::{Deserialize, Serialize};

/// Title used for the wrapping root when a document has no level-1 heading.
pub const DEFAULT_ROOT_TITLE: &str = "Document";

/// One heading plus its body text and nested subsections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub content: String,
    pub level: u8,
    pub children: Vec<Section>,
}

impl Section {
    pub fn new(title: impl Into<String>, level: u8) -> Self {
        Self {
            title: title.into(),
            content: String::new(),
            level,
            children: Vec::new(),
        }
    }

    /// Builder-style helper, mostly used by tests to spell out expected trees.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_children(mut self, children: Vec<Section>) -> Self {
        self.children = children;
        self
    }

    /// The tree returned for a document without any headings.
    pub fn empty_document() -> Self {
        Self::new(DEFAULT_ROOT_TITLE, 1)
    }

    /// Number of sections in this subtree, including `self`.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Section::count).sum::<usize>()
    }

    /// Depth-first iterator over this subtree in document order.
    pub fn iter(&self) -> SectionIter<'_> {
        SectionIter { stack: vec![self] }
    }

    /// Render the subtree as indented heading lines, e.g. `  ## Child`.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.write_outline(0, &mut out);
        out
    }

    fn write_outline(&self, depth: usize, out: &mut String) {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&"#".repeat(self.level as usize));
        out.push(' ');
        out.push_str(&self.title);
        out.push('\n');
        for child in &self.children {
            child.write_outline(depth + 1, out);
        }
    }
}

pub struct SectionIter<'a> {
    stack: Vec<&'a Section>,
}

impl<'a> Iterator for SectionIter<'a> {
    type Item = &'a Section;

    fn next(&mut self) -> Option<Self::Item> {
        let section = self.stack.pop()?;
        self.stack.extend(section.children.iter().rev());
        Some(section)
    }
}
