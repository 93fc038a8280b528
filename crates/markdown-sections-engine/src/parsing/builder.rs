use crate::models::{DEFAULT_ROOT_TITLE, Section};

use super::{
    content::ContentBuffer,
    heading::{Heading, parse_heading},
};

type NodeId = usize;

#[derive(Debug, Default)]
struct Node {
    title: String,
    content: String,
    level: u8,
    children: Vec<NodeId>,
}

/// Single-pass builder turning markdown lines into a nested [`Section`] tree.
///
/// Sections live in an arena while building; the stack holds the currently
/// open sections from outermost to innermost. All state belongs to one
/// builder and is consumed by [`TreeBuilder::finish`].
///
/// Level-1 headings are special: the first one becomes the document root and
/// every later level-1 heading is folded in as one of its children.
/// Heading level skips (e.g. `#` straight to `###`) are accepted here; the
/// new section hangs off whatever is left on the stack.
pub struct TreeBuilder {
    nodes: Vec<Node>,
    stack: Vec<NodeId>,
    root: Vec<NodeId>,
    first_level1: Option<NodeId>,
    pending: ContentBuffer,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            nodes: vec![],
            stack: vec![],
            root: vec![],
            first_level1: None,
            pending: ContentBuffer::default(),
        }
    }

    pub fn push_line(&mut self, line: &str) {
        match parse_heading(line) {
            Some(heading) => self.open_section(heading),
            None => self.pending.push(line),
        }
    }

    pub fn finish(mut self) -> Section {
        // EOF flush
        self.flush_content();

        let root = std::mem::take(&mut self.root);
        match self.first_level1 {
            Some(first) => {
                let mut children = Vec::new();
                for id in root {
                    if id == first {
                        let nested = std::mem::take(&mut self.nodes[first].children);
                        children.extend(nested.into_iter().map(|c| self.materialize(c)));
                    } else {
                        children.push(self.materialize(id));
                    }
                }
                let node = &mut self.nodes[first];
                Section {
                    title: std::mem::take(&mut node.title),
                    content: std::mem::take(&mut node.content),
                    level: 1,
                    children,
                }
            }
            None => Section {
                title: DEFAULT_ROOT_TITLE.to_string(),
                content: String::new(),
                level: 1,
                children: root.into_iter().map(|id| self.materialize(id)).collect(),
            },
        }
    }

    fn open_section(&mut self, heading: Heading) {
        self.flush_content();

        let id = self.nodes.len();
        self.nodes.push(Node {
            title: heading.title,
            content: String::new(),
            level: heading.level,
            children: vec![],
        });

        if heading.level == 1 {
            match self.first_level1 {
                None => {
                    self.first_level1 = Some(id);
                    self.root.push(id);
                }
                Some(first) => self.nodes[first].children.push(id),
            }
            self.stack.clear();
            self.stack.push(id);
            return;
        }

        while let Some(&top) = self.stack.last()
            && self.nodes[top].level >= heading.level
        {
            self.stack.pop();
        }

        match self.stack.last() {
            Some(&parent) => self.nodes[parent].children.push(id),
            None => self.root.push(id),
        }
        self.stack.push(id);
    }

    /// Moves the pending body text onto the innermost open section. Text seen
    /// before any heading has no owner and is discarded.
    fn flush_content(&mut self) {
        let content = self.pending.take_content();
        if let Some(&top) = self.stack.last() {
            self.nodes[top].content = content;
        }
    }

    fn materialize(&mut self, id: NodeId) -> Section {
        let node = std::mem::take(&mut self.nodes[id]);
        Section {
            title: node.title,
            content: node.content,
            level: node.level,
            children: node
                .children
                .into_iter()
                .map(|c| self.materialize(c))
                .collect(),
        }
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
