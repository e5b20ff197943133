//! Events exchanged between the parser and the emitter.
//!
//! An event stream is the flattened form of a document tree: a well-formed
//! stream is `STREAM-START document* STREAM-END`, each document is
//! `DOCUMENT-START node DOCUMENT-END`, and a node is a scalar, an alias, or a
//! sequence/mapping start paired with its matching end. Every event carries
//! the start/end marks of the source region (or output region) it covers.

use crate::directives::{TagDirectiveCollection, VersionDirective};
use crate::mark::Mark;

/// Presentation style of a scalar.
///
/// `Any` is only meaningful on events handed to the emitter, which then picks
/// the best admissible style. The parser always reports a concrete style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScalarStyle {
    #[default]
    Any,
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Literal,
    Folded,
}

/// Presentation style of a sequence or mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectionStyle {
    #[default]
    Any,
    Block,
    Flow,
}

/// Start of the event stream. Always the first event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamStart {
    pub start: Mark,
    pub end: Mark,
}

/// End of the event stream. Always the last event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamEnd {
    pub start: Mark,
    pub end: Mark,
}

/// Start of a document, carrying its directives.
///
/// `implicit` records whether the document had no `---` marker (on parse) or
/// may omit one (on emit). After parsing, `tags` holds the explicit `%TAG`
/// directives followed by the built-in `!` and `!!` handles; an event built
/// by hand may leave the collection empty and the emitter fills in the
/// defaults itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentStart {
    pub version: Option<VersionDirective>,
    pub tags: TagDirectiveCollection,
    pub implicit: bool,
    pub start: Mark,
    pub end: Mark,
}

impl DocumentStart {
    pub fn new(
        version: Option<VersionDirective>,
        tags: TagDirectiveCollection,
        implicit: bool,
    ) -> Self {
        Self {
            version,
            tags,
            implicit,
            start: Mark::default(),
            end: Mark::default(),
        }
    }
}

/// End of a document. `implicit` records the absence of a `...` marker.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentEnd {
    pub implicit: bool,
    pub start: Mark,
    pub end: Mark,
}

impl DocumentEnd {
    pub fn new(implicit: bool) -> Self {
        Self {
            implicit,
            start: Mark::default(),
            end: Mark::default(),
        }
    }
}

/// A reference to a previously anchored node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Alias {
    pub anchor: String,
    pub start: Mark,
    pub end: Mark,
}

impl Alias {
    pub fn new(anchor: impl Into<String>) -> Self {
        Self {
            anchor: anchor.into(),
            start: Mark::default(),
            end: Mark::default(),
        }
    }
}

/// A scalar node.
///
/// The two implicitness flags record whether the tag may be omitted when the
/// scalar is rendered plain (`plain_implicit`) or quoted (`quoted_implicit`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Scalar {
    pub anchor: Option<String>,
    pub tag: Option<String>,
    pub value: String,
    pub style: ScalarStyle,
    pub plain_implicit: bool,
    pub quoted_implicit: bool,
    pub start: Mark,
    pub end: Mark,
}

impl Scalar {
    pub fn new(
        anchor: Option<String>,
        tag: Option<String>,
        value: impl Into<String>,
        style: ScalarStyle,
        plain_implicit: bool,
        quoted_implicit: bool,
    ) -> Self {
        Self {
            anchor,
            tag,
            value: value.into(),
            style,
            plain_implicit,
            quoted_implicit,
            start: Mark::default(),
            end: Mark::default(),
        }
    }

    /// A plain implicit scalar with just a value.
    pub fn plain(value: impl Into<String>) -> Self {
        Self::new(None, None, value, ScalarStyle::Plain, true, false)
    }
}

/// Start of a sequence node. `implicit` means the tag may be omitted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SequenceStart {
    pub anchor: Option<String>,
    pub tag: Option<String>,
    pub implicit: bool,
    pub style: CollectionStyle,
    pub start: Mark,
    pub end: Mark,
}

impl SequenceStart {
    pub fn new(
        anchor: Option<String>,
        tag: Option<String>,
        implicit: bool,
        style: CollectionStyle,
    ) -> Self {
        Self {
            anchor,
            tag,
            implicit,
            style,
            start: Mark::default(),
            end: Mark::default(),
        }
    }
}

/// End of a sequence node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SequenceEnd {
    pub start: Mark,
    pub end: Mark,
}

/// Start of a mapping node. `implicit` means the tag may be omitted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MappingStart {
    pub anchor: Option<String>,
    pub tag: Option<String>,
    pub implicit: bool,
    pub style: CollectionStyle,
    pub start: Mark,
    pub end: Mark,
}

impl MappingStart {
    pub fn new(
        anchor: Option<String>,
        tag: Option<String>,
        implicit: bool,
        style: CollectionStyle,
    ) -> Self {
        Self {
            anchor,
            tag,
            implicit,
            style,
            start: Mark::default(),
            end: Mark::default(),
        }
    }
}

/// End of a mapping node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MappingEnd {
    pub start: Mark,
    pub end: Mark,
}

/// Any event the parser can produce or the emitter can accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    StreamStart(StreamStart),
    StreamEnd(StreamEnd),
    DocumentStart(DocumentStart),
    DocumentEnd(DocumentEnd),
    Alias(Alias),
    Scalar(Scalar),
    SequenceStart(SequenceStart),
    SequenceEnd(SequenceEnd),
    MappingStart(MappingStart),
    MappingEnd(MappingEnd),
}

impl Event {
    pub fn start(&self) -> Mark {
        match self {
            Event::StreamStart(e) => e.start,
            Event::StreamEnd(e) => e.start,
            Event::DocumentStart(e) => e.start,
            Event::DocumentEnd(e) => e.start,
            Event::Alias(e) => e.start,
            Event::Scalar(e) => e.start,
            Event::SequenceStart(e) => e.start,
            Event::SequenceEnd(e) => e.start,
            Event::MappingStart(e) => e.start,
            Event::MappingEnd(e) => e.start,
        }
    }

    pub fn end(&self) -> Mark {
        match self {
            Event::StreamStart(e) => e.end,
            Event::StreamEnd(e) => e.end,
            Event::DocumentStart(e) => e.end,
            Event::DocumentEnd(e) => e.end,
            Event::Alias(e) => e.end,
            Event::Scalar(e) => e.end,
            Event::SequenceStart(e) => e.end,
            Event::SequenceEnd(e) => e.end,
            Event::MappingStart(e) => e.end,
            Event::MappingEnd(e) => e.end,
        }
    }

    /// How this event changes the nesting depth of the stream: +1 for a
    /// document or collection start, -1 for the matching end, 0 otherwise.
    pub fn nesting_increase(&self) -> i32 {
        match self {
            Event::DocumentStart(_) | Event::SequenceStart(_) | Event::MappingStart(_) => 1,
            Event::DocumentEnd(_) | Event::SequenceEnd(_) | Event::MappingEnd(_) => -1,
            _ => 0,
        }
    }

    /// A short name for diagnostics.
    pub fn description(&self) -> &'static str {
        match self {
            Event::StreamStart(_) => StreamStart::NAME,
            Event::StreamEnd(_) => StreamEnd::NAME,
            Event::DocumentStart(_) => DocumentStart::NAME,
            Event::DocumentEnd(_) => DocumentEnd::NAME,
            Event::Alias(_) => Alias::NAME,
            Event::Scalar(_) => Scalar::NAME,
            Event::SequenceStart(_) => SequenceStart::NAME,
            Event::SequenceEnd(_) => SequenceEnd::NAME,
            Event::MappingStart(_) => MappingStart::NAME,
            Event::MappingEnd(_) => MappingEnd::NAME,
        }
    }
}

/// Implemented by each event struct so that [`crate::reader::EventReader`]
/// can expect and allow events by type.
pub trait EventVariant: Into<Event> + Sized {
    const NAME: &'static str;

    /// Unwrap `event` into this variant, or give the event back.
    fn from_event(event: Event) -> Result<Self, Event>;

    /// Borrow `event` as this variant, if it matches.
    fn as_variant(event: &Event) -> Option<&Self>;
}

macro_rules! event_variant {
    ($variant:ident, $name:literal) => {
        impl From<$variant> for Event {
            fn from(event: $variant) -> Event {
                Event::$variant(event)
            }
        }

        impl EventVariant for $variant {
            const NAME: &'static str = $name;

            fn from_event(event: Event) -> Result<Self, Event> {
                match event {
                    Event::$variant(inner) => Ok(inner),
                    other => Err(other),
                }
            }

            fn as_variant(event: &Event) -> Option<&Self> {
                match event {
                    Event::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

event_variant!(StreamStart, "STREAM-START");
event_variant!(StreamEnd, "STREAM-END");
event_variant!(DocumentStart, "DOCUMENT-START");
event_variant!(DocumentEnd, "DOCUMENT-END");
event_variant!(Alias, "ALIAS");
event_variant!(Scalar, "SCALAR");
event_variant!(SequenceStart, "SEQUENCE-START");
event_variant!(SequenceEnd, "SEQUENCE-END");
event_variant!(MappingStart, "MAPPING-START");
event_variant!(MappingEnd, "MAPPING-END");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_round_trip() {
        let event: Event = Scalar::plain("hello").into();
        assert_eq!(event.description(), "SCALAR");
        let scalar = Scalar::from_event(event).unwrap();
        assert_eq!(scalar.value, "hello");
        assert_eq!(scalar.style, ScalarStyle::Plain);
    }

    #[test]
    fn variant_mismatch_returns_event() {
        let event: Event = StreamEnd::default().into();
        let err = Scalar::from_event(event).unwrap_err();
        assert_eq!(err.description(), "STREAM-END");
    }

    #[test]
    fn nesting() {
        assert_eq!(Event::from(MappingStart::default()).nesting_increase(), 1);
        assert_eq!(Event::from(MappingEnd::default()).nesting_increase(), -1);
        assert_eq!(Event::from(Scalar::plain("x")).nesting_increase(), 0);
    }
}
