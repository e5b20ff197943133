//! A self-contained YAML 1.1 engine.
//!
//! The engine decodes text through a pipeline of three phases and encodes
//! through their inverse:
//!
//! 1. **Scanner**: Converts characters into tokens, resolving indentation
//!    into explicit block start/end tokens and retroactively recognizing
//!    simple keys.
//!
//! 2. **Parser**: Converts tokens into events, enforcing the stream grammar
//!    and resolving `%YAML`/`%TAG` directives.
//!
//! 3. **EventReader**: Typed, buffered access to the event stream for
//!    callers that want to assert its shape instead of matching on it.
//!
//! The [`Emitter`] runs the pipeline in reverse, serializing an event stream
//! back into YAML text with its own scalar-style analysis and line-wrapping
//! decisions.

pub mod buffer;
pub mod directives;
pub mod emitter;
pub mod error;
pub mod events;
pub mod mark;
pub mod parser;
mod queue;
pub mod reader;
pub mod scanner;
pub mod tokens;

pub use emitter::{Emitter, EmitterSettings};
pub use error::{Error, Result};
pub use events::{CollectionStyle, Event, EventVariant, ScalarStyle};
pub use mark::Mark;
pub use parser::{EventSource, Parser};
pub use reader::{EventReader, MemoryParser};
pub use scanner::Scanner;
pub use tokens::{Token, TokenKind};

/// Parse a YAML stream into its full event sequence.
///
/// # Example
///
/// ```
/// let events = yaml11::parse_events("a: 1\n").unwrap();
/// assert_eq!(events.len(), 8);
/// ```
pub fn parse_events(input: &str) -> Result<Vec<Event>> {
    let mut parser = Parser::new(input.chars());
    let mut events = Vec::new();
    while let Some(event) = parser.next_event()? {
        events.push(event);
    }
    Ok(events)
}

/// Serialize an event sequence into YAML text.
///
/// # Example
///
/// ```
/// let events = yaml11::parse_events("- 1\n- 2\n").unwrap();
/// let text = yaml11::emit_to_string(events).unwrap();
/// assert_eq!(text, "- 1\n- 2\n");
/// ```
pub fn emit_to_string(events: impl IntoIterator<Item = Event>) -> Result<String> {
    let mut emitter = Emitter::new(String::new());
    for event in events {
        emitter.emit(event)?;
    }
    Ok(emitter.into_inner())
}
