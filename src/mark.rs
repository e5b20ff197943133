//! Source positions.

use std::fmt;

/// A position inside the input or output stream: absolute character offset,
/// zero-based line, and zero-based column.
///
/// Marks are carried by every token and event so that errors can point at the
/// exact place in the source that produced them. During a scan the mark only
/// ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Mark {
    /// Absolute character offset from the start of the stream.
    pub index: usize,
    /// Zero-based line number.
    pub line: usize,
    /// Zero-based column number.
    pub column: usize,
}

impl Mark {
    /// Create a mark at an explicit position.
    pub fn new(index: usize, line: usize, column: usize) -> Self {
        Self {
            index,
            line,
            column,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, column {} (offset {})",
            self.line + 1,
            self.column + 1,
            self.index
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_one_based() {
        let mark = Mark::new(10, 2, 4);
        assert_eq!(mark.to_string(), "line 3, column 5 (offset 10)");
    }

    #[test]
    fn default_is_origin() {
        assert_eq!(Mark::default(), Mark::new(0, 0, 0));
    }
}
