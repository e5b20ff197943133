//! Error types for scanning, parsing, and emission.

use thiserror::Error;

use crate::mark::Mark;

/// Result type for all engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the YAML engine.
///
/// Scanning problems (malformed token content) surface as `Syntax`, grammar
/// and directive problems as `Semantic`. Both carry the start/end marks of the
/// offending region. All errors are terminal for the stream: the caller must
/// discard the scanner/parser/emitter and restart from a clean source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed token content: bad escape, bad UTF-8, tab as indentation,
    /// unterminated construct, a character that cannot start any token.
    #[error("syntax error at {start}: {message}")]
    Syntax {
        start: Mark,
        end: Mark,
        message: String,
    },

    /// Grammar or directive violation: unexpected token shape, undefined tag
    /// handle, duplicate or incompatible directive.
    #[error("semantic error at {start}: {message}")]
    Semantic {
        start: Mark,
        end: Mark,
        message: String,
    },

    /// Emitter misuse: bad configuration, an event the current state cannot
    /// accept, or emitting past STREAM-END. Signals a caller contract
    /// violation rather than malformed input.
    #[error("emitter error: {0}")]
    Emitter(String),
}

impl From<std::fmt::Error> for Error {
    fn from(_: std::fmt::Error) -> Self {
        Error::emitter("failed to write to the output")
    }
}

impl Error {
    /// A syntax error covering the given source range.
    pub fn syntax(start: Mark, end: Mark, message: impl Into<String>) -> Self {
        Error::Syntax {
            start,
            end,
            message: message.into(),
        }
    }

    /// A semantic error covering the given source range.
    pub fn semantic(start: Mark, end: Mark, message: impl Into<String>) -> Self {
        Error::Semantic {
            start,
            end,
            message: message.into(),
        }
    }

    /// An emitter contract violation.
    pub fn emitter(message: impl Into<String>) -> Self {
        Error::Emitter(message.into())
    }

    /// The start of the source range this error covers, if it has one.
    pub fn start(&self) -> Option<Mark> {
        match self {
            Error::Syntax { start, .. } | Error::Semantic { start, .. } => Some(*start),
            Error::Emitter(_) => None,
        }
    }

    /// The end of the source range this error covers, if it has one.
    pub fn end(&self) -> Option<Mark> {
        match self {
            Error::Syntax { end, .. } | Error::Semantic { end, .. } => Some(*end),
            Error::Emitter(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_display_includes_position() {
        let err = Error::syntax(Mark::new(5, 1, 2), Mark::new(6, 1, 3), "bad escape");
        assert_eq!(
            err.to_string(),
            "syntax error at line 2, column 3 (offset 5): bad escape"
        );
    }

    #[test]
    fn emitter_error_has_no_range() {
        let err = Error::emitter("expected nothing after STREAM-END");
        assert_eq!(err.start(), None);
        assert_eq!(err.end(), None);
    }
}
