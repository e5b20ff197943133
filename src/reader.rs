//! Typed, buffered access to an event stream.
//!
//! [`EventReader`] wraps any [`EventSource`] with one event of lookahead and
//! a typed surface: callers assert the shape of the stream with
//! [`expect`](EventReader::expect), probe it with [`accept`](EventReader::accept)
//! or [`peek`](EventReader::peek), and consume optional events with
//! [`allow`](EventReader::allow). [`MemoryParser`] replays a recorded list of
//! events through the same interface, so a subtree captured with
//! [`read_current`](EventReader::read_current) can be re-read later.

use crate::error::{Error, Result};
use crate::events::{Event, EventVariant};
use crate::parser::EventSource;

/// Reads and validates events from an [`EventSource`].
pub struct EventReader<S> {
    source: S,
    current: Option<Event>,
    end_of_stream: bool,
}

impl<S: EventSource> EventReader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            current: None,
            end_of_stream: false,
        }
    }

    fn ensure_current(&mut self) -> Result<()> {
        if self.current.is_none() && !self.end_of_stream {
            self.current = self.source.next_event()?;
            if self.current.is_none() {
                self.end_of_stream = true;
            }
        }
        Ok(())
    }

    /// Whether the stream is exhausted.
    pub fn is_end_of_stream(&mut self) -> Result<bool> {
        self.ensure_current()?;
        Ok(self.current.is_none())
    }

    /// Whether the next event is a `T`, without consuming it.
    pub fn accept<T: EventVariant>(&mut self) -> Result<bool> {
        self.ensure_current()?;
        Ok(self
            .current
            .as_ref()
            .and_then(T::as_variant)
            .is_some())
    }

    /// The next event as a `T`, without consuming it.
    pub fn peek<T: EventVariant>(&mut self) -> Result<Option<&T>> {
        self.ensure_current()?;
        Ok(self.current.as_ref().and_then(T::as_variant))
    }

    /// Consume the next event, which must be a `T`.
    pub fn expect<T: EventVariant>(&mut self) -> Result<T> {
        self.ensure_current()?;
        match self.current.take() {
            Some(event) => T::from_event(event).map_err(|other| {
                let message = format!(
                    "expected '{}', got '{}'",
                    T::NAME,
                    other.description()
                );
                let error = Error::semantic(other.start(), other.end(), message);
                // Put the event back so the caller can recover its position.
                self.current = Some(other);
                error
            }),
            None => Err(Error::emitter(format!(
                "expected '{}' past the end of the event stream",
                T::NAME
            ))),
        }
    }

    /// Consume the next event if it is a `T`.
    pub fn allow<T: EventVariant>(&mut self) -> Result<Option<T>> {
        self.ensure_current()?;
        if self.current.as_ref().and_then(T::as_variant).is_none() {
            return Ok(None);
        }
        match self.current.take().map(T::from_event) {
            Some(Ok(event)) => Ok(Some(event)),
            _ => Ok(None),
        }
    }

    /// Consume the next event, whatever it is.
    pub fn skip(&mut self) -> Result<Option<Event>> {
        self.ensure_current()?;
        Ok(self.current.take())
    }

    /// The wrapped event source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Consume events until `depth` already-open nesting levels have been
    /// closed.
    pub fn skip_depth(&mut self, depth: i32) -> Result<()> {
        let mut depth = depth;
        while depth > 0 {
            match self.skip()? {
                Some(event) => depth += event.nesting_increase(),
                None => return Ok(()),
            }
        }
        Ok(())
    }

    /// Consume the next node in its entirety: a scalar or alias, or a
    /// collection start through its matching end.
    pub fn skip_this_and_nested(&mut self) -> Result<()> {
        let mut depth = 0;
        loop {
            match self.skip()? {
                Some(event) => {
                    depth += event.nesting_increase();
                    if depth <= 0 {
                        return Ok(());
                    }
                }
                None => return Ok(()),
            }
        }
    }

    /// Consume the next node in its entirety, appending its events to
    /// `events`. The result replays through a [`MemoryParser`].
    pub fn read_current(&mut self, events: &mut Vec<Event>) -> Result<()> {
        let mut depth = 0;
        loop {
            match self.skip()? {
                Some(event) => {
                    depth += event.nesting_increase();
                    events.push(event);
                    if depth <= 0 {
                        return Ok(());
                    }
                }
                None => return Ok(()),
            }
        }
    }
}

/// An [`EventSource`] that replays a recorded list of events.
#[derive(Debug, Clone, Default)]
pub struct MemoryParser {
    events: Vec<Event>,
    position: usize,
}

impl MemoryParser {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events,
            position: 0,
        }
    }

    /// The index of the next event to replay.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Rewind or advance the replay to `position`.
    pub fn set_position(&mut self, position: usize) {
        self.position = position;
    }
}

impl EventSource for MemoryParser {
    fn next_event(&mut self) -> Result<Option<Event>> {
        match self.events.get(self.position) {
            Some(event) => {
                self.position += 1;
                Ok(Some(event.clone()))
            }
            None => Ok(None),
        }
    }
}
