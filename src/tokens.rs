//! Tokens produced by the scanner.

use crate::directives::{TagDirective, VersionDirective};
use crate::events::ScalarStyle;
use crate::mark::Mark;

/// A scanner token: a kind plus the start/end marks of the source region it
/// covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub start: Mark,
    pub end: Mark,
    pub kind: TokenKind,
}

impl Token {
    pub fn new(kind: TokenKind, start: Mark, end: Mark) -> Self {
        Self { start, end, kind }
    }
}

/// The kinds of token the scanner emits.
///
/// Structural markers carry no payload; directives, anchors, aliases, tags,
/// and scalars carry their scanned content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    StreamStart,
    StreamEnd,
    VersionDirective(VersionDirective),
    TagDirective(TagDirective),
    DocumentStart,
    DocumentEnd,
    BlockSequenceStart,
    BlockMappingStart,
    BlockEnd,
    FlowSequenceStart,
    FlowSequenceEnd,
    FlowMappingStart,
    FlowMappingEnd,
    BlockEntry,
    FlowEntry,
    Key,
    Value,
    Alias(String),
    Anchor(String),
    Tag { handle: String, suffix: String },
    Scalar { value: String, style: ScalarStyle },
}

impl TokenKind {
    /// A short name for diagnostics.
    pub fn description(&self) -> &'static str {
        match self {
            TokenKind::StreamStart => "STREAM-START",
            TokenKind::StreamEnd => "STREAM-END",
            TokenKind::VersionDirective(_) => "VERSION-DIRECTIVE",
            TokenKind::TagDirective(_) => "TAG-DIRECTIVE",
            TokenKind::DocumentStart => "DOCUMENT-START",
            TokenKind::DocumentEnd => "DOCUMENT-END",
            TokenKind::BlockSequenceStart => "BLOCK-SEQUENCE-START",
            TokenKind::BlockMappingStart => "BLOCK-MAPPING-START",
            TokenKind::BlockEnd => "BLOCK-END",
            TokenKind::FlowSequenceStart => "FLOW-SEQUENCE-START",
            TokenKind::FlowSequenceEnd => "FLOW-SEQUENCE-END",
            TokenKind::FlowMappingStart => "FLOW-MAPPING-START",
            TokenKind::FlowMappingEnd => "FLOW-MAPPING-END",
            TokenKind::BlockEntry => "BLOCK-ENTRY",
            TokenKind::FlowEntry => "FLOW-ENTRY",
            TokenKind::Key => "KEY",
            TokenKind::Value => "VALUE",
            TokenKind::Alias(_) => "ALIAS",
            TokenKind::Anchor(_) => "ANCHOR",
            TokenKind::Tag { .. } => "TAG",
            TokenKind::Scalar { .. } => "SCALAR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_carries_marks() {
        let token = Token::new(TokenKind::Key, Mark::new(3, 0, 3), Mark::new(4, 0, 4));
        assert_eq!(token.start.index, 3);
        assert_eq!(token.end.column, 4);
        assert_eq!(token.kind.description(), "KEY");
    }
}
