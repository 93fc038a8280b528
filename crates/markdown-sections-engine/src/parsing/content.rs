use super::heading::parse_heading;

/// Groups the non-heading lines of a document into text blocks.
///
/// Every heading line closes the running block. Lines are right-trimmed and
/// joined with `\n`; blank lines inside a block are kept. Blocks that are
/// blank overall are dropped, so the result never contains empty strings.
pub fn accumulate_blocks<I>(lines: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut blocks = Vec::new();
    let mut current = ContentBuffer::default();

    for line in lines {
        let line = line.as_ref();
        if parse_heading(line).is_some() {
            if let Some(block) = current.take_block() {
                blocks.push(block);
            }
        } else {
            current.push(line);
        }
    }

    if let Some(block) = current.take_block() {
        blocks.push(block);
    }
    blocks
}

/// Pending body lines for the section currently being read.
#[derive(Debug, Default)]
pub(crate) struct ContentBuffer {
    lines: Vec<String>,
}

impl ContentBuffer {
    pub(crate) fn push(&mut self, line: &str) {
        self.lines.push(line.trim_end().to_string());
    }

    /// Joined lines, or `None` when nothing but whitespace was collected.
    /// The buffer is left empty either way.
    pub(crate) fn take_block(&mut self) -> Option<String> {
        let block = std::mem::take(&mut self.lines).join("\n");
        if block.trim().is_empty() {
            None
        } else {
            Some(block)
        }
    }

    /// Joined lines trimmed at both edges, as stored on a section.
    pub(crate) fn take_content(&mut self) -> String {
        std::mem::take(&mut self.lines).join("\n").trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_blocks_split_on_headings() {
        let lines = [
            "# Title",
            "First paragraph",
            "",
            "Second paragraph",
            "## Section",
            "Section content",
        ];
        assert_eq!(
            accumulate_blocks(lines),
            vec![
                "First paragraph\n\nSecond paragraph".to_string(),
                "Section content".to_string()
            ]
        );
    }

    #[test]
    fn test_leading_content_forms_first_block() {
        let lines = ["Preamble", "# Title", "Body"];
        assert_eq!(accumulate_blocks(lines), vec!["Preamble", "Body"]);
    }

    #[test]
    fn test_heading_without_content_yields_no_block() {
        let lines = ["# One", "## Two", "", "## Three", "text"];
        assert_eq!(accumulate_blocks(lines), vec!["text"]);
    }

    #[test]
    fn test_lines_are_right_trimmed_only() {
        let lines = ["# H", "  indented   ", "tail\t"];
        assert_eq!(accumulate_blocks(lines), vec!["  indented\ntail"]);
    }

    #[test]
    fn test_blank_lines_at_block_edges_are_kept() {
        let lines = ["# H", "", "body", "", "## Next"];
        assert_eq!(accumulate_blocks(lines), vec!["\nbody\n"]);
    }

    #[test]
    fn test_no_lines_no_blocks() {
        assert!(accumulate_blocks(Vec::<&str>::new()).is_empty());
    }

    #[test]
    fn test_buffer_take_content_trims_edges() {
        let mut buffer = ContentBuffer::default();
        buffer.push("");
        buffer.push("line1");
        buffer.push("");
        buffer.push("line2   ");
        buffer.push("");
        assert_eq!(buffer.take_content(), "line1\n\nline2");
        assert_eq!(buffer.take_content(), "");
    }
}
