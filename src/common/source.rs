//! Line supplier for declaration sources
//!
//! Yields trimmed lines with their 1-based physical line number, skipping
//! blank lines and `#` comments.

use crate::consts::COMMENT;

/// A cleaned source line and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine<'a> {
    pub number: usize,
    pub text: &'a str,
}

/// Iterator over the meaningful lines of a source text
#[derive(Debug)]
pub struct SourceLines<'a> {
    lines: std::str::Lines<'a>,
    last_line: usize,
}

impl<'a> SourceLines<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { lines: source.lines(), last_line: 0 }
    }

    /// Number of the last physical line consumed, including skipped ones
    pub fn last_line(&self) -> usize {
        self.last_line
    }
}

impl<'a> Iterator for SourceLines<'a> {
    type Item = SourceLine<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        for raw in self.lines.by_ref() {
            self.last_line += 1;
            let text = raw.trim();
            if text.is_empty() || text.starts_with(COMMENT) {
                continue;
            }
            return Some(SourceLine { number: self.last_line, text });
        }
        None
    }
}
