use core::fmt;
use std::sync::Arc;

/// A region of a Ruse source file.
///
/// Every syntax node and IR value carries a span so that errors can quote
/// `file:line:column`. The `end` offset is exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Span {
    /// Name of the source file.
    pub file: Arc<str>,
    /// Byte offset of the first character.
    pub offset: usize,
    /// Byte offset just past the last character.
    pub end: usize,
    /// 1-based line of the first character.
    pub line: u32,
    /// 1-based column of the first character.
    pub column: u32,
}

impl Span {
    /// A span for a region of `file` starting at `offset`.
    pub fn new(file: Arc<str>, offset: usize, end: usize, line: u32, column: u32) -> Self {
        Span {
            file,
            offset,
            end,
            line,
            column,
        }
    }

    /// A span with no backing source, used by synthesised nodes.
    pub fn synthetic() -> Self {
        Span {
            file: Arc::from(""),
            offset: 0,
            end: 0,
            line: 0,
            column: 0,
        }
    }

    /// Extends this span to cover `other`.
    pub fn to(&self, other: &Span) -> Span {
        let mut span = self.clone();
        span.end = other.end;
        span
    }
}

impl Default for Span {
    fn default() -> Self {
        Span::synthetic()
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_quotes_file_line_column() {
        let span = Span::new(Arc::from("lib.ruse"), 10, 14, 3, 7);
        assert_eq!(span.to_string(), "lib.ruse:3:7");
    }

    #[test]
    fn to_extends_end() {
        let a = Span::new(Arc::from("lib.ruse"), 0, 4, 1, 1);
        let b = Span::new(Arc::from("lib.ruse"), 6, 9, 1, 7);
        assert_eq!(a.to(&b).offset, 0);
        assert_eq!(a.to(&b).end, 9);
    }
}
