//! # Section Parsing
//!
//! Turns markdown lines into a [`Section`] tree.
//!
//! ## Stages
//!
//! - **`heading`**: `parse_heading` / `scan_headings` recognise ATX headings (`#` to `######`)
//! - **`content`**: `accumulate_blocks` groups the text between headings
//! - **`builder`**: `TreeBuilder` runs both in one pass and nests sections with a level stack
//!
//! The scanner and accumulator are usable on their own; `build_tree` is the
//! fused single pass used for conversion.
//!
//! ## Key Invariants
//!
//! - The result always has exactly one root section at level 1
//! - Later level-1 headings become children of the first one
//! - Text is never rejected: malformed heading sequences still produce a tree

pub mod builder;
pub mod content;
pub mod heading;

pub use builder::TreeBuilder;
pub use content::accumulate_blocks;
pub use heading::{Heading, MAX_HEADING_LEVEL, parse_heading, scan_headings};

use crate::models::Section;

/// Builds the section tree for an ordered sequence of lines.
pub fn build_tree<I>(lines: I) -> Section
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut builder = TreeBuilder::new();
    for line in lines {
        builder.push_line(line.as_ref());
    }
    builder.finish()
}

/// Builds the section tree for a whole markdown text. Both `\n` and `\r\n`
/// line endings are accepted.
pub fn parse_markdown(text: &str) -> Section {
    build_tree(text.lines())
}
