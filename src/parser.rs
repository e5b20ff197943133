//! Converts a sequence of YAML tokens into a sequence of parsing events.
//!
//! The parser is a pushdown automaton over the token stream: `state` names
//! the production being parsed and `states` holds the continuations to
//! return to when a nested node completes. Tag handles are resolved against
//! the directives of the current document, and the grammar's empty
//! productions (a missing value, a missing key) are materialized as empty
//! plain scalar events so that downstream consumers always see a complete
//! node per slot.

use crate::directives::{TagDirectiveCollection, VersionDirective, DEFAULT_HANDLE};
use crate::error::{Error, Result};
use crate::events::{
    Alias, CollectionStyle, DocumentEnd, DocumentStart, Event, MappingEnd, MappingStart, Scalar,
    ScalarStyle, SequenceEnd, SequenceStart, StreamEnd, StreamStart,
};
use crate::mark::Mark;
use crate::scanner::Scanner;
use crate::tokens::{Token, TokenKind};

/// Anything that yields parsing events: the streaming [`Parser`] or the
/// replayable [`crate::reader::MemoryParser`].
pub trait EventSource {
    /// The next event, or `None` once STREAM-END has been produced.
    fn next_event(&mut self) -> Result<Option<Event>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    StreamStart,
    ImplicitDocumentStart,
    DocumentStart,
    DocumentContent,
    DocumentEnd,
    BlockNode,
    BlockSequenceFirstEntry,
    BlockSequenceEntry,
    IndentlessSequenceEntry,
    BlockMappingFirstKey,
    BlockMappingKey,
    BlockMappingValue,
    FlowSequenceFirstEntry,
    FlowSequenceEntry,
    FlowSequenceEntryMappingKey,
    FlowSequenceEntryMappingValue,
    FlowSequenceEntryMappingEnd,
    FlowMappingFirstKey,
    FlowMappingKey,
    FlowMappingValue,
    FlowMappingEmptyValue,
    End,
}

/// Parses a YAML stream into events.
///
/// Errors are terminal: after an `Err` the parser must be discarded.
pub struct Parser<I> {
    scanner: Scanner<I>,
    state: State,
    states: Vec<State>,
    tag_directives: TagDirectiveCollection,
    current_token: Option<Token>,
}

impl<I: Iterator<Item = char>> Parser<I> {
    pub fn new(source: I) -> Self {
        Self {
            scanner: Scanner::new(source),
            state: State::StreamStart,
            states: Vec::new(),
            tag_directives: TagDirectiveCollection::new(),
            current_token: None,
        }
    }

    fn peek_token(&mut self) -> Result<&Token> {
        if self.current_token.is_none() {
            self.current_token = self.scanner.next_token()?;
        }
        match &self.current_token {
            Some(token) => Ok(token),
            None => {
                let position = self.scanner.current_position();
                Err(Error::semantic(
                    position,
                    position,
                    "unexpected end of the token stream",
                ))
            }
        }
    }

    fn skip(&mut self) {
        self.current_token = None;
    }

    /// Whether STREAM-END has been produced.
    pub fn is_end_of_stream(&self) -> bool {
        self.state == State::End
    }

    fn pop_state(&mut self) -> State {
        self.states.pop().unwrap_or(State::End)
    }

    fn state_machine(&mut self) -> Result<Event> {
        match self.state {
            State::StreamStart => self.parse_stream_start(),
            State::ImplicitDocumentStart => self.parse_document_start(true),
            State::DocumentStart => self.parse_document_start(false),
            State::DocumentContent => self.parse_document_content(),
            State::DocumentEnd => self.parse_document_end(),
            State::BlockNode => self.parse_node(true, false),
            State::BlockSequenceFirstEntry => self.parse_block_sequence_entry(true),
            State::BlockSequenceEntry => self.parse_block_sequence_entry(false),
            State::IndentlessSequenceEntry => self.parse_indentless_sequence_entry(),
            State::BlockMappingFirstKey => self.parse_block_mapping_key(true),
            State::BlockMappingKey => self.parse_block_mapping_key(false),
            State::BlockMappingValue => self.parse_block_mapping_value(),
            State::FlowSequenceFirstEntry => self.parse_flow_sequence_entry(true),
            State::FlowSequenceEntry => self.parse_flow_sequence_entry(false),
            State::FlowSequenceEntryMappingKey => self.parse_flow_sequence_entry_mapping_key(),
            State::FlowSequenceEntryMappingValue => self.parse_flow_sequence_entry_mapping_value(),
            State::FlowSequenceEntryMappingEnd => self.parse_flow_sequence_entry_mapping_end(),
            State::FlowMappingFirstKey => self.parse_flow_mapping_key(true),
            State::FlowMappingKey => self.parse_flow_mapping_key(false),
            State::FlowMappingValue => self.parse_flow_mapping_value(false),
            State::FlowMappingEmptyValue => self.parse_flow_mapping_value(true),
            State::End => unreachable!("state machine invoked past STREAM-END"),
        }
    }

    /// stream ::= STREAM-START implicit_document? explicit_document* STREAM-END
    fn parse_stream_start(&mut self) -> Result<Event> {
        let token = self.peek_token()?;
        let (start, end) = (token.start, token.end);
        if !matches!(token.kind, TokenKind::StreamStart) {
            return Err(Error::semantic(
                start,
                end,
                "did not find expected <stream-start>",
            ));
        }
        self.skip();

        self.state = State::ImplicitDocumentStart;
        Ok(StreamStart { start, end }.into())
    }

    /// implicit_document ::= block_node DOCUMENT-END*
    /// explicit_document ::= DIRECTIVE* DOCUMENT-START block_node? DOCUMENT-END*
    fn parse_document_start(&mut self, is_implicit: bool) -> Result<Event> {
        // Eat extra document end indicators.
        if !is_implicit {
            while matches!(self.peek_token()?.kind, TokenKind::DocumentEnd) {
                self.skip();
            }
        }

        let token = self.peek_token()?.clone();
        let at_directive_or_marker = matches!(
            token.kind,
            TokenKind::VersionDirective(_)
                | TokenKind::TagDirective(_)
                | TokenKind::DocumentStart
                | TokenKind::StreamEnd
        );

        if is_implicit && !at_directive_or_marker {
            // An implicit document: content with no '---' before it.
            let mut directives = TagDirectiveCollection::new();
            self.process_directives(Some(&mut directives))?;

            self.states.push(State::DocumentEnd);
            self.state = State::BlockNode;

            Ok(DocumentStart {
                version: None,
                tags: directives,
                implicit: true,
                start: token.start,
                end: token.end,
            }
            .into())
        } else if !matches!(token.kind, TokenKind::StreamEnd) {
            // An explicit document.
            let start = token.start;
            let mut directives = TagDirectiveCollection::new();
            let version = self.process_directives(Some(&mut directives))?;

            let token = self.peek_token()?;
            let (token_start, token_end) = (token.start, token.end);
            if !matches!(token.kind, TokenKind::DocumentStart) {
                return Err(Error::semantic(
                    token_start,
                    token_end,
                    "did not find expected <document start>",
                ));
            }

            self.states.push(State::DocumentEnd);
            self.state = State::DocumentContent;

            let event = DocumentStart {
                version,
                tags: directives,
                implicit: false,
                start,
                end: token_end,
            };
            self.skip();
            Ok(event.into())
        } else {
            self.state = State::End;
            Ok(StreamEnd {
                start: token.start,
                end: token.end,
            }
            .into())
        }
    }

    /// Consume the directives before a document, folding them into the
    /// active directive set and validating as we go.
    fn process_directives(
        &mut self,
        mut tags: Option<&mut TagDirectiveCollection>,
    ) -> Result<Option<VersionDirective>> {
        let mut version: Option<VersionDirective> = None;

        loop {
            let token = self.peek_token()?.clone();
            match token.kind {
                TokenKind::VersionDirective(current_version) => {
                    if version.is_some() {
                        return Err(Error::semantic(
                            token.start,
                            token.end,
                            "found a duplicate %YAML directive",
                        ));
                    }
                    if !current_version.is_compatible() {
                        return Err(Error::semantic(
                            token.start,
                            token.end,
                            "found an incompatible YAML document",
                        ));
                    }
                    version = Some(current_version);
                }
                TokenKind::TagDirective(tag) => {
                    if self.tag_directives.contains_handle(&tag.handle) {
                        return Err(Error::semantic(
                            token.start,
                            token.end,
                            "found a duplicate %TAG directive",
                        ));
                    }
                    self.tag_directives.add(tag.clone());
                    if let Some(tags) = tags.as_deref_mut() {
                        tags.add(tag);
                    }
                }
                _ => break,
            }
            self.skip();
        }

        if let Some(tags) = tags {
            tags.add_defaults();
        }
        self.tag_directives.add_defaults();

        Ok(version)
    }

    /// explicit_document ::= DIRECTIVE* DOCUMENT-START block_node? DOCUMENT-END*
    fn parse_document_content(&mut self) -> Result<Event> {
        let at_document_boundary = matches!(
            self.peek_token()?.kind,
            TokenKind::VersionDirective(_)
                | TokenKind::TagDirective(_)
                | TokenKind::DocumentStart
                | TokenKind::DocumentEnd
                | TokenKind::StreamEnd
        );
        if at_document_boundary {
            self.state = self.pop_state();
            Ok(empty_scalar(self.scanner.current_position()))
        } else {
            self.parse_node(true, false)
        }
    }

    /// implicit_document ::= block_node DOCUMENT-END*
    /// explicit_document ::= DIRECTIVE* DOCUMENT-START block_node? DOCUMENT-END*
    fn parse_document_end(&mut self) -> Result<Event> {
        let token = self.peek_token()?.clone();
        let start = token.start;
        let mut end = start;
        let mut is_implicit = true;

        if matches!(token.kind, TokenKind::DocumentEnd) {
            end = token.end;
            self.skip();
            is_implicit = false;
        }

        // Directives do not carry across documents.
        self.tag_directives.clear();

        self.state = State::DocumentStart;
        Ok(DocumentEnd {
            implicit: is_implicit,
            start,
            end,
        }
        .into())
    }

    /// block_node ::= ALIAS | properties block_content? | block_content
    /// flow_node  ::= ALIAS | properties flow_content?  | flow_content
    /// properties ::= TAG ANCHOR? | ANCHOR TAG?
    ///
    /// With `is_indentless_sequence`, a BLOCK-ENTRY may also open a sequence
    /// that has no surrounding BLOCK-SEQUENCE-START.
    fn parse_node(&mut self, is_block: bool, is_indentless_sequence: bool) -> Result<Event> {
        let token = self.peek_token()?.clone();
        if let TokenKind::Alias(anchor) = token.kind {
            self.state = self.pop_state();
            self.skip();
            return Ok(Alias {
                anchor,
                start: token.start,
                end: token.end,
            }
            .into());
        }

        let start = token.start;

        // The anchor and the tag may come in either order.
        let mut anchor: Option<String> = None;
        let mut tag: Option<(String, String, Mark, Mark)> = None;
        loop {
            let token = self.peek_token()?.clone();
            match token.kind {
                TokenKind::Anchor(name) if anchor.is_none() => {
                    anchor = Some(name);
                    self.skip();
                }
                TokenKind::Tag { handle, suffix } if tag.is_none() => {
                    tag = Some((handle, suffix, token.start, token.end));
                    self.skip();
                }
                _ => break,
            }
        }

        let has_properties = anchor.is_some() || tag.is_some();

        let mut tag_name: Option<String> = None;
        if let Some((handle, suffix, tag_start, tag_end)) = tag {
            if handle.is_empty() {
                tag_name = Some(suffix);
            } else if let Some(directive) = self.tag_directives.get(&handle) {
                tag_name = Some(format!("{}{}", directive.prefix, suffix));
            } else {
                return Err(Error::semantic(
                    tag_start,
                    tag_end,
                    "while parsing a node, found an undefined tag handle",
                ));
            }
        }
        if matches!(&tag_name, Some(name) if name.is_empty()) {
            tag_name = None;
        }

        let anchor_name = anchor.filter(|name| !name.is_empty());
        let is_implicit = tag_name.is_none();

        let token = self.peek_token()?.clone();

        if is_indentless_sequence && matches!(token.kind, TokenKind::BlockEntry) {
            self.state = State::IndentlessSequenceEntry;
            return Ok(SequenceStart {
                anchor: anchor_name,
                tag: tag_name,
                implicit: is_implicit,
                style: CollectionStyle::Block,
                start,
                end: token.end,
            }
            .into());
        }

        if let TokenKind::Scalar { value, style } = token.kind {
            // A plain untagged scalar, or any scalar tagged with the
            // non-specific '!', resolves the way a plain scalar would.
            let mut plain_implicit = false;
            let mut quoted_implicit = false;
            if (style == ScalarStyle::Plain && tag_name.is_none())
                || tag_name.as_deref() == Some(DEFAULT_HANDLE)
            {
                plain_implicit = true;
            } else if tag_name.is_none() {
                quoted_implicit = true;
            }

            self.state = self.pop_state();
            let event = Scalar {
                anchor: anchor_name,
                tag: tag_name,
                value,
                style,
                plain_implicit,
                quoted_implicit,
                start,
                end: token.end,
            };
            self.skip();
            return Ok(event.into());
        }

        match token.kind {
            TokenKind::FlowSequenceStart => {
                self.state = State::FlowSequenceFirstEntry;
                Ok(SequenceStart {
                    anchor: anchor_name,
                    tag: tag_name,
                    implicit: is_implicit,
                    style: CollectionStyle::Flow,
                    start,
                    end: token.end,
                }
                .into())
            }
            TokenKind::FlowMappingStart => {
                self.state = State::FlowMappingFirstKey;
                Ok(MappingStart {
                    anchor: anchor_name,
                    tag: tag_name,
                    implicit: is_implicit,
                    style: CollectionStyle::Flow,
                    start,
                    end: token.end,
                }
                .into())
            }
            TokenKind::BlockSequenceStart if is_block => {
                self.state = State::BlockSequenceFirstEntry;
                Ok(SequenceStart {
                    anchor: anchor_name,
                    tag: tag_name,
                    implicit: is_implicit,
                    style: CollectionStyle::Block,
                    start,
                    end: token.end,
                }
                .into())
            }
            TokenKind::BlockMappingStart if is_block => {
                self.state = State::BlockMappingFirstKey;
                Ok(MappingStart {
                    anchor: anchor_name,
                    tag: tag_name,
                    implicit: is_implicit,
                    style: CollectionStyle::Block,
                    start,
                    end: token.end,
                }
                .into())
            }
            _ if has_properties => {
                // An anchor or tag with no content stands for an empty node.
                self.state = self.pop_state();
                Ok(Scalar {
                    anchor: anchor_name,
                    tag: tag_name,
                    value: String::new(),
                    style: ScalarStyle::Plain,
                    plain_implicit: is_implicit,
                    quoted_implicit: false,
                    start,
                    end: token.end,
                }
                .into())
            }
            _ => Err(Error::semantic(
                token.start,
                token.end,
                "while parsing a node, did not find expected node content",
            )),
        }
    }

    /// block_sequence ::= BLOCK-SEQUENCE-START (BLOCK-ENTRY block_node?)* BLOCK-END
    fn parse_block_sequence_entry(&mut self, is_first: bool) -> Result<Event> {
        if is_first {
            self.peek_token()?;
            self.skip();
        }

        let token = self.peek_token()?.clone();
        match token.kind {
            TokenKind::BlockEntry => {
                let mark = token.end;
                self.skip();
                if !matches!(
                    self.peek_token()?.kind,
                    TokenKind::BlockEntry | TokenKind::BlockEnd
                ) {
                    self.states.push(State::BlockSequenceEntry);
                    self.parse_node(true, false)
                } else {
                    self.state = State::BlockSequenceEntry;
                    Ok(empty_scalar(mark))
                }
            }
            TokenKind::BlockEnd => {
                self.state = self.pop_state();
                self.skip();
                Ok(SequenceEnd {
                    start: token.start,
                    end: token.end,
                }
                .into())
            }
            _ => Err(Error::semantic(
                token.start,
                token.end,
                "while parsing a block collection, did not find expected '-' indicator",
            )),
        }
    }

    /// indentless_sequence ::= (BLOCK-ENTRY block_node?)+
    fn parse_indentless_sequence_entry(&mut self) -> Result<Event> {
        let token = self.peek_token()?.clone();
        if matches!(token.kind, TokenKind::BlockEntry) {
            let mark = token.end;
            self.skip();

            if !matches!(
                self.peek_token()?.kind,
                TokenKind::BlockEntry | TokenKind::Key | TokenKind::Value | TokenKind::BlockEnd
            ) {
                self.states.push(State::IndentlessSequenceEntry);
                self.parse_node(true, false)
            } else {
                self.state = State::IndentlessSequenceEntry;
                Ok(empty_scalar(mark))
            }
        } else {
            // The sequence ends at whatever token follows; it is not
            // consumed here.
            self.state = self.pop_state();
            Ok(SequenceEnd {
                start: token.start,
                end: token.end,
            }
            .into())
        }
    }

    /// block_mapping ::= BLOCK-MAPPING-START
    ///                   ((KEY block_node_or_indentless_sequence?)?
    ///                   (VALUE block_node_or_indentless_sequence?)?)*
    ///                   BLOCK-END
    fn parse_block_mapping_key(&mut self, is_first: bool) -> Result<Event> {
        if is_first {
            self.peek_token()?;
            self.skip();
        }

        let token = self.peek_token()?.clone();
        match token.kind {
            TokenKind::Key => {
                let mark = token.end;
                self.skip();
                if !matches!(
                    self.peek_token()?.kind,
                    TokenKind::Key | TokenKind::Value | TokenKind::BlockEnd
                ) {
                    self.states.push(State::BlockMappingValue);
                    self.parse_node(true, true)
                } else {
                    self.state = State::BlockMappingValue;
                    Ok(empty_scalar(mark))
                }
            }
            TokenKind::BlockEnd => {
                self.state = self.pop_state();
                self.skip();
                Ok(MappingEnd {
                    start: token.start,
                    end: token.end,
                }
                .into())
            }
            _ => Err(Error::semantic(
                token.start,
                token.end,
                "while parsing a block mapping, did not find expected key",
            )),
        }
    }

    fn parse_block_mapping_value(&mut self) -> Result<Event> {
        let token = self.peek_token()?.clone();
        if matches!(token.kind, TokenKind::Value) {
            let mark = token.end;
            self.skip();

            if !matches!(
                self.peek_token()?.kind,
                TokenKind::Key | TokenKind::Value | TokenKind::BlockEnd
            ) {
                self.states.push(State::BlockMappingKey);
                self.parse_node(true, true)
            } else {
                self.state = State::BlockMappingKey;
                Ok(empty_scalar(mark))
            }
        } else {
            self.state = State::BlockMappingKey;
            Ok(empty_scalar(token.start))
        }
    }

    /// flow_sequence ::= FLOW-SEQUENCE-START
    ///                   (flow_sequence_entry FLOW-ENTRY)*
    ///                   flow_sequence_entry?
    ///                   FLOW-SEQUENCE-END
    /// flow_sequence_entry ::= flow_node | KEY flow_node? (VALUE flow_node?)?
    fn parse_flow_sequence_entry(&mut self, is_first: bool) -> Result<Event> {
        if is_first {
            self.peek_token()?;
            self.skip();
        }

        if !matches!(self.peek_token()?.kind, TokenKind::FlowSequenceEnd) {
            if !is_first {
                let token = self.peek_token()?;
                let (start, end) = (token.start, token.end);
                if matches!(token.kind, TokenKind::FlowEntry) {
                    self.skip();
                } else {
                    return Err(Error::semantic(
                        start,
                        end,
                        "while parsing a flow sequence, did not find expected ',' or ']'",
                    ));
                }
            }

            let token = self.peek_token()?.clone();
            if matches!(token.kind, TokenKind::Key) {
                // A single key/value pair inside a flow sequence is an
                // implicit mapping of one entry.
                self.state = State::FlowSequenceEntryMappingKey;
                self.skip();
                return Ok(MappingStart {
                    anchor: None,
                    tag: None,
                    implicit: true,
                    style: CollectionStyle::Flow,
                    start: token.start,
                    end: token.end,
                }
                .into());
            } else if !matches!(token.kind, TokenKind::FlowSequenceEnd) {
                self.states.push(State::FlowSequenceEntry);
                return self.parse_node(false, false);
            }
        }

        let token = self.peek_token()?;
        let event = SequenceEnd {
            start: token.start,
            end: token.end,
        };
        self.state = self.pop_state();
        self.skip();
        Ok(event.into())
    }

    fn parse_flow_sequence_entry_mapping_key(&mut self) -> Result<Event> {
        let token = self.peek_token()?.clone();
        if !matches!(
            token.kind,
            TokenKind::Value | TokenKind::FlowEntry | TokenKind::FlowSequenceEnd
        ) {
            self.states.push(State::FlowSequenceEntryMappingValue);
            self.parse_node(false, false)
        } else {
            let mark = token.end;
            self.skip();
            self.state = State::FlowSequenceEntryMappingValue;
            Ok(empty_scalar(mark))
        }
    }

    fn parse_flow_sequence_entry_mapping_value(&mut self) -> Result<Event> {
        if matches!(self.peek_token()?.kind, TokenKind::Value) {
            self.skip();
            if !matches!(
                self.peek_token()?.kind,
                TokenKind::FlowEntry | TokenKind::FlowSequenceEnd
            ) {
                self.states.push(State::FlowSequenceEntryMappingEnd);
                return self.parse_node(false, false);
            }
        }
        self.state = State::FlowSequenceEntryMappingEnd;
        let position = self.peek_token()?.start;
        Ok(empty_scalar(position))
    }

    fn parse_flow_sequence_entry_mapping_end(&mut self) -> Result<Event> {
        self.state = State::FlowSequenceEntry;
        let token = self.peek_token()?;
        Ok(MappingEnd {
            start: token.start,
            end: token.end,
        }
        .into())
    }

    /// flow_mapping ::= FLOW-MAPPING-START
    ///                  (flow_mapping_entry FLOW-ENTRY)*
    ///                  flow_mapping_entry?
    ///                  FLOW-MAPPING-END
    /// flow_mapping_entry ::= flow_node | KEY flow_node? (VALUE flow_node?)?
    fn parse_flow_mapping_key(&mut self, is_first: bool) -> Result<Event> {
        if is_first {
            self.peek_token()?;
            self.skip();
        }

        if !matches!(self.peek_token()?.kind, TokenKind::FlowMappingEnd) {
            if !is_first {
                let token = self.peek_token()?;
                let (start, end) = (token.start, token.end);
                if matches!(token.kind, TokenKind::FlowEntry) {
                    self.skip();
                } else {
                    return Err(Error::semantic(
                        start,
                        end,
                        "while parsing a flow mapping, did not find expected ',' or '}'",
                    ));
                }
            }

            let token = self.peek_token()?.clone();
            if matches!(token.kind, TokenKind::Key) {
                self.skip();

                if !matches!(
                    self.peek_token()?.kind,
                    TokenKind::Value | TokenKind::FlowEntry | TokenKind::FlowMappingEnd
                ) {
                    self.states.push(State::FlowMappingValue);
                    return self.parse_node(false, false);
                } else {
                    self.state = State::FlowMappingValue;
                    let position = self.peek_token()?.start;
                    return Ok(empty_scalar(position));
                }
            } else if !matches!(token.kind, TokenKind::FlowMappingEnd) {
                // A bare node in a flow mapping is a key with an empty value.
                self.states.push(State::FlowMappingEmptyValue);
                return self.parse_node(false, false);
            }
        }

        let token = self.peek_token()?;
        let event = MappingEnd {
            start: token.start,
            end: token.end,
        };
        self.state = self.pop_state();
        self.skip();
        Ok(event.into())
    }

    fn parse_flow_mapping_value(&mut self, is_empty: bool) -> Result<Event> {
        if is_empty {
            self.state = State::FlowMappingKey;
            let position = self.peek_token()?.start;
            return Ok(empty_scalar(position));
        }

        if matches!(self.peek_token()?.kind, TokenKind::Value) {
            self.skip();
            if !matches!(
                self.peek_token()?.kind,
                TokenKind::FlowEntry | TokenKind::FlowMappingEnd
            ) {
                self.states.push(State::FlowMappingKey);
                return self.parse_node(false, false);
            }
        }

        self.state = State::FlowMappingKey;
        let position = self.peek_token()?.start;
        Ok(empty_scalar(position))
    }
}

/// The empty plain scalar that stands in for a missing node.
fn empty_scalar(position: Mark) -> Event {
    Scalar {
        anchor: None,
        tag: None,
        value: String::new(),
        style: ScalarStyle::Plain,
        plain_implicit: true,
        quoted_implicit: false,
        start: position,
        end: position,
    }
    .into()
}

impl<I: Iterator<Item = char>> EventSource for Parser<I> {
    fn next_event(&mut self) -> Result<Option<Event>> {
        if self.state == State::End {
            return Ok(None);
        }
        self.state_machine().map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(input: &str) -> Vec<Event> {
        let mut parser = Parser::new(input.chars());
        let mut out = Vec::new();
        while let Some(event) = parser.next_event().unwrap() {
            out.push(event);
        }
        out
    }

    fn descriptions(input: &str) -> Vec<&'static str> {
        events(input).iter().map(|e| e.description()).collect()
    }

    fn parse_error(input: &str) -> Error {
        let mut parser = Parser::new(input.chars());
        loop {
            match parser.next_event() {
                Ok(Some(_)) => continue,
                Ok(None) => panic!("expected an error"),
                Err(error) => return error,
            }
        }
    }

    #[test]
    fn block_mapping_event_shape() {
        assert_eq!(
            descriptions("a: 1\nb: 2\n"),
            [
                "STREAM-START",
                "DOCUMENT-START",
                "MAPPING-START",
                "SCALAR",
                "SCALAR",
                "SCALAR",
                "SCALAR",
                "MAPPING-END",
                "DOCUMENT-END",
                "STREAM-END",
            ]
        );
    }

    #[test]
    fn block_sequence_event_shape() {
        assert_eq!(
            descriptions("- 1\n- 2\n"),
            [
                "STREAM-START",
                "DOCUMENT-START",
                "SEQUENCE-START",
                "SCALAR",
                "SCALAR",
                "SEQUENCE-END",
                "DOCUMENT-END",
                "STREAM-END",
            ]
        );
    }

    #[test]
    fn scalar_values_and_styles() {
        let events = events("a: 1\n");
        let keys: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                Event::Scalar(s) => Some((s.value.as_str(), s.style, s.plain_implicit)),
                _ => None,
            })
            .collect();
        assert_eq!(
            keys,
            [("a", ScalarStyle::Plain, true), ("1", ScalarStyle::Plain, true)]
        );
    }

    #[test]
    fn implicit_document_flags() {
        let events = events("x\n");
        match &events[1] {
            Event::DocumentStart(doc) => {
                assert!(doc.implicit);
                assert!(doc.version.is_none());
            }
            other => panic!("expected DOCUMENT-START, got {}", other.description()),
        }
        match &events[3] {
            Event::DocumentEnd(doc) => assert!(doc.implicit),
            other => panic!("expected DOCUMENT-END, got {}", other.description()),
        }
    }

    #[test]
    fn explicit_document_markers() {
        let events = events("---\nx\n...\n");
        match &events[1] {
            Event::DocumentStart(doc) => assert!(!doc.implicit),
            other => panic!("expected DOCUMENT-START, got {}", other.description()),
        }
        match &events[3] {
            Event::DocumentEnd(doc) => assert!(!doc.implicit),
            other => panic!("expected DOCUMENT-END, got {}", other.description()),
        }
    }

    #[test]
    fn multiple_documents() {
        assert_eq!(
            descriptions("---\na\n---\nb\n"),
            [
                "STREAM-START",
                "DOCUMENT-START",
                "SCALAR",
                "DOCUMENT-END",
                "DOCUMENT-START",
                "SCALAR",
                "DOCUMENT-END",
                "STREAM-END",
            ]
        );
    }

    #[test]
    fn secondary_handle_resolves_to_core_namespace() {
        let events = events("!!str x\n");
        match &events[2] {
            Event::Scalar(scalar) => {
                assert_eq!(scalar.tag.as_deref(), Some("tag:yaml.org,2002:str"));
                assert!(!scalar.plain_implicit);
                assert!(!scalar.quoted_implicit);
            }
            other => panic!("expected SCALAR, got {}", other.description()),
        }
    }

    #[test]
    fn custom_tag_directive_resolves_prefix() {
        let events = events("%TAG !e! tag:example.com,2000:\n---\n!e!thing x\n");
        match &events[2] {
            Event::Scalar(scalar) => {
                assert_eq!(scalar.tag.as_deref(), Some("tag:example.com,2000:thing"));
            }
            other => panic!("expected SCALAR, got {}", other.description()),
        }
    }

    #[test]
    fn undefined_tag_handle_is_a_semantic_error() {
        assert!(matches!(
            parse_error("!x!thing value\n"),
            Error::Semantic { .. }
        ));
    }

    #[test]
    fn incompatible_version_is_a_semantic_error() {
        let error = parse_error("%YAML 1.2\n---\nx\n");
        match error {
            Error::Semantic { message, .. } => {
                assert_eq!(message, "found an incompatible YAML document");
            }
            other => panic!("expected a semantic error, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_version_directive_is_a_semantic_error() {
        assert!(matches!(
            parse_error("%YAML 1.1\n%YAML 1.1\n---\nx\n"),
            Error::Semantic { .. }
        ));
    }

    #[test]
    fn duplicate_tag_handle_is_a_semantic_error() {
        assert!(matches!(
            parse_error("%TAG !e! tag:a:\n%TAG !e! tag:b:\n---\nx\n"),
            Error::Semantic { .. }
        ));
    }

    #[test]
    fn anchors_and_aliases() {
        let events = events("- &a x\n- *a\n");
        match &events[3] {
            Event::Scalar(scalar) => assert_eq!(scalar.anchor.as_deref(), Some("a")),
            other => panic!("expected SCALAR, got {}", other.description()),
        }
        match &events[4] {
            Event::Alias(alias) => assert_eq!(alias.anchor, "a"),
            other => panic!("expected ALIAS, got {}", other.description()),
        }
    }

    #[test]
    fn missing_value_becomes_empty_scalar() {
        let events = events("a:\nb: 1\n");
        match &events[4] {
            Event::Scalar(scalar) => {
                assert_eq!(scalar.value, "");
                assert!(scalar.plain_implicit);
            }
            other => panic!("expected SCALAR, got {}", other.description()),
        }
    }

    #[test]
    fn indentless_sequence_inside_mapping() {
        assert_eq!(
            descriptions("key:\n- 1\n- 2\n"),
            [
                "STREAM-START",
                "DOCUMENT-START",
                "MAPPING-START",
                "SCALAR",
                "SEQUENCE-START",
                "SCALAR",
                "SCALAR",
                "SEQUENCE-END",
                "MAPPING-END",
                "DOCUMENT-END",
                "STREAM-END",
            ]
        );
    }

    #[test]
    fn flow_collections() {
        assert_eq!(
            descriptions("{a: [1, 2], b: {c: 3}}\n"),
            [
                "STREAM-START",
                "DOCUMENT-START",
                "MAPPING-START",
                "SCALAR",
                "SEQUENCE-START",
                "SCALAR",
                "SCALAR",
                "SEQUENCE-END",
                "SCALAR",
                "MAPPING-START",
                "SCALAR",
                "SCALAR",
                "MAPPING-END",
                "MAPPING-END",
                "DOCUMENT-END",
                "STREAM-END",
            ]
        );
    }

    #[test]
    fn single_pair_in_flow_sequence_is_an_implicit_mapping() {
        assert_eq!(
            descriptions("[a: 1]\n"),
            [
                "STREAM-START",
                "DOCUMENT-START",
                "SEQUENCE-START",
                "MAPPING-START",
                "SCALAR",
                "SCALAR",
                "MAPPING-END",
                "SEQUENCE-END",
                "DOCUMENT-END",
                "STREAM-END",
            ]
        );
    }

    #[test]
    fn collection_styles_are_reported() {
        let events = events("a: [1]\n");
        let styles: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                Event::MappingStart(m) => Some(m.style),
                Event::SequenceStart(s) => Some(s.style),
                _ => None,
            })
            .collect();
        assert_eq!(styles, [CollectionStyle::Block, CollectionStyle::Flow]);
    }

    #[test]
    fn quoted_scalars_are_quoted_implicit() {
        let events = events("'x'\n");
        match &events[2] {
            Event::Scalar(scalar) => {
                assert_eq!(scalar.style, ScalarStyle::SingleQuoted);
                assert!(!scalar.plain_implicit);
                assert!(scalar.quoted_implicit);
            }
            other => panic!("expected SCALAR, got {}", other.description()),
        }
    }

    #[test]
    fn no_events_after_stream_end() {
        let mut parser = Parser::new("x\n".chars());
        assert!(!parser.is_end_of_stream());
        while parser.next_event().unwrap().is_some() {}
        assert!(parser.is_end_of_stream());
        assert!(parser.next_event().unwrap().is_none());
    }

    #[test]
    fn marks_cover_the_source() {
        let events = events("a: 1\n");
        for event in &events {
            assert!(event.start().index <= event.end().index);
        }
        match &events[2] {
            Event::MappingStart(mapping) => {
                assert_eq!(mapping.start, Mark::new(0, 0, 0));
            }
            other => panic!("expected MAPPING-START, got {}", other.description()),
        }
    }
}
