use std::sync::OnceLock;

use regex::Regex;

/// Deepest heading level recognised by the scanner.
pub const MAX_HEADING_LEVEL: u8 = 6;

/// An ATX heading found on a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// Number of leading `#` markers, 1 through 6.
    pub level: u8,
    /// Text after the markers and the whitespace that follows them.
    pub title: String,
}

fn heading_regex() -> &'static Regex {
    static HEADING_REGEX: OnceLock<Regex> = OnceLock::new();
    HEADING_REGEX.get_or_init(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("Invalid heading regex"))
}

/// Classifies a single line as a heading.
///
/// The line is trimmed first, so indentation and trailing whitespace are
/// ignored. A run of more than six `#` markers, or markers not followed by
/// whitespace and a title, is not a heading.
pub fn parse_heading(line: &str) -> Option<Heading> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let caps = heading_regex().captures(line)?;
    Some(Heading {
        level: caps[1].len() as u8,
        title: caps[2].to_string(),
    })
}

/// Lazily yields every heading in `lines`, in document order.
pub fn scan_headings<I>(lines: I) -> impl Iterator<Item = Heading>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    lines
        .into_iter()
        .filter_map(|line| parse_heading(line.as_ref()))
}
