//! Converts a sequence of characters into a sequence of YAML tokens.
//!
//! The scanner is a single forward pass over the input with bounded
//! lookahead. Its two sources of retroactivity are handled with bookkeeping
//! rather than backtracking: block structure tokens are synthesized from an
//! indentation stack, and a plain `key: value` mapping key is recognized only
//! when the `:` arrives, at which point a KEY token (and possibly a
//! BLOCK-MAPPING-START) is inserted into the token queue at the position the
//! key started.

use crate::buffer::LookAheadBuffer;
use crate::directives::{TagDirective, VersionDirective};
use crate::error::{Error, Result};
use crate::events::ScalarStyle;
use crate::mark::Mark;
use crate::queue::InsertionQueue;
use crate::tokens::{Token, TokenKind};

const MAX_VERSION_NUMBER_LENGTH: usize = 9;

/// A simple key is limited to a single line and 1024 characters.
const MAX_SIMPLE_KEY_DISTANCE: usize = 1024;

/// A candidate position where a `key:` mapping key may have started.
///
/// One slot is tracked per flow level. `required` marks a key at the exact
/// indentation column of a block mapping, which must resolve to a real key
/// or the document is in error.
#[derive(Debug, Clone, Copy, Default)]
struct SimpleKey {
    possible: bool,
    required: bool,
    token_number: usize,
    mark: Mark,
}

/// Resolve a single-character escape in a double-quoted scalar.
fn simple_escape(ch: char) -> Option<char> {
    match ch {
        '0' => Some('\0'),
        'a' => Some('\x07'),
        'b' => Some('\x08'),
        't' | '\t' => Some('\x09'),
        'n' => Some('\n'),
        'v' => Some('\x0B'),
        'f' => Some('\x0C'),
        'r' => Some('\r'),
        'e' => Some('\x1B'),
        ' ' => Some(' '),
        '"' => Some('"'),
        '\'' => Some('\''),
        '\\' => Some('\\'),
        'N' => Some('\u{85}'),
        '_' => Some('\u{A0}'),
        'L' => Some('\u{2028}'),
        'P' => Some('\u{2029}'),
        _ => None,
    }
}

/// The tokenizer. Pull tokens with [`next_token`](Scanner::next_token) or
/// inspect the upcoming one with [`peek_token`](Scanner::peek_token).
///
/// Errors are terminal: after an `Err` the scanner state is unspecified and
/// the stream must be abandoned.
pub struct Scanner<I> {
    buffer: LookAheadBuffer<I>,
    mark: Mark,
    tokens: InsertionQueue<Token>,
    tokens_parsed: usize,
    token_available: bool,
    indent: i64,
    indents: Vec<i64>,
    flow_level: usize,
    simple_keys: Vec<SimpleKey>,
    simple_key_allowed: bool,
    stream_start_produced: bool,
    stream_end_produced: bool,
}

impl<I: Iterator<Item = char>> Scanner<I> {
    pub fn new(source: I) -> Self {
        Self {
            buffer: LookAheadBuffer::new(source),
            mark: Mark::default(),
            tokens: InsertionQueue::new(),
            tokens_parsed: 0,
            token_available: false,
            indent: -1,
            indents: Vec::new(),
            flow_level: 0,
            // One slot per flow level, seeded for the block context.
            simple_keys: vec![SimpleKey::default()],
            simple_key_allowed: false,
            stream_start_produced: false,
            stream_end_produced: false,
        }
    }

    /// The current position inside the input stream.
    pub fn current_position(&self) -> Mark {
        self.mark
    }

    /// The next token, without consuming it.
    pub fn peek_token(&mut self) -> Result<Option<&Token>> {
        if !self.token_available && !self.stream_end_produced {
            self.fetch_more_tokens()?;
        }
        Ok(self.tokens.front())
    }

    /// Consume and return the next token, or `None` past STREAM-END.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        if !self.token_available && !self.stream_end_produced {
            self.fetch_more_tokens()?;
        }
        match self.tokens.dequeue() {
            Some(token) => {
                self.token_available = false;
                self.tokens_parsed += 1;
                Ok(Some(token))
            }
            None => Ok(None),
        }
    }

    fn fetch_more_tokens(&mut self) -> Result<()> {
        loop {
            let mut needs_more_tokens = false;

            if self.tokens.is_empty() {
                needs_more_tokens = true;
            } else {
                // A potential simple key may still occupy the head position.
                self.stale_simple_keys()?;
                for key in &self.simple_keys {
                    if key.possible && key.token_number == self.tokens_parsed {
                        needs_more_tokens = true;
                        break;
                    }
                }
            }

            if !needs_more_tokens {
                break;
            }

            self.fetch_next_token()?;
        }
        self.token_available = true;
        Ok(())
    }

    /// Retire potential simple keys whose position has passed out of range:
    /// past the end of their line, or more than 1024 characters back.
    fn stale_simple_keys(&mut self) -> Result<()> {
        let mark = self.mark;
        for key in &mut self.simple_keys {
            if key.possible
                && (key.mark.line < mark.line || key.mark.index + MAX_SIMPLE_KEY_DISTANCE < mark.index)
            {
                if key.required {
                    return Err(Error::syntax(
                        mark,
                        mark,
                        "while scanning a simple key, could not find expected ':'",
                    ));
                }
                key.possible = false;
            }
        }
        Ok(())
    }

    fn fetch_next_token(&mut self) -> Result<()> {
        if !self.stream_start_produced {
            self.fetch_stream_start();
            return Ok(());
        }

        // Eat whitespace and comments until we reach the next token.
        self.scan_to_next_token();

        self.stale_simple_keys()?;

        // Close any block collections that ended at this column.
        self.unroll_indent(self.mark.column as i64);

        // Four characters cover the longest indicators, '--- ' and '... '.
        self.buffer.cache(4);

        if self.buffer.end_of_input() {
            self.fetch_stream_end()?;
            return Ok(());
        }

        if self.mark.column == 0 && self.buffer.check('%', 0) {
            return self.fetch_directive();
        }

        let is_document_start = self.mark.column == 0
            && self.buffer.check('-', 0)
            && self.buffer.check('-', 1)
            && self.buffer.check('-', 2)
            && self.buffer.is_blank_or_break_or_zero(3);
        if is_document_start {
            return self.fetch_document_indicator(true);
        }

        let is_document_end = self.mark.column == 0
            && self.buffer.check('.', 0)
            && self.buffer.check('.', 1)
            && self.buffer.check('.', 2)
            && self.buffer.is_blank_or_break_or_zero(3);
        if is_document_end {
            return self.fetch_document_indicator(false);
        }

        if self.buffer.check('[', 0) {
            return self.fetch_flow_collection_start(true);
        }
        if self.buffer.check('{', 0) {
            return self.fetch_flow_collection_start(false);
        }
        if self.buffer.check(']', 0) {
            return self.fetch_flow_collection_end(true);
        }
        if self.buffer.check('}', 0) {
            return self.fetch_flow_collection_end(false);
        }
        if self.buffer.check(',', 0) {
            return self.fetch_flow_entry();
        }
        if self.buffer.check('-', 0) && self.buffer.is_blank_or_break_or_zero(1) {
            return self.fetch_block_entry();
        }
        if self.buffer.check('?', 0)
            && (self.flow_level > 0 || self.buffer.is_blank_or_break_or_zero(1))
        {
            return self.fetch_key();
        }
        if self.buffer.check(':', 0)
            && (self.flow_level > 0 || self.buffer.is_blank_or_break_or_zero(1))
        {
            return self.fetch_value();
        }
        if self.buffer.check('*', 0) {
            return self.fetch_anchor(true);
        }
        if self.buffer.check('&', 0) {
            return self.fetch_anchor(false);
        }
        if self.buffer.check('!', 0) {
            return self.fetch_tag();
        }
        if self.buffer.check('|', 0) && self.flow_level == 0 {
            return self.fetch_block_scalar(true);
        }
        if self.buffer.check('>', 0) && self.flow_level == 0 {
            return self.fetch_block_scalar(false);
        }
        if self.buffer.check('\'', 0) {
            return self.fetch_flow_scalar(true);
        }
        if self.buffer.check('"', 0) {
            return self.fetch_flow_scalar(false);
        }

        // A plain scalar may not start with an indicator character, except
        // that '-', and in the block context '?' and ':', may start one when
        // followed by a non-blank character.
        let is_invalid_plain_start = self.buffer.is_blank_or_break_or_zero(0)
            || self.buffer.check_any("-?:,[]{}#&*!|>'\"%@`", 0);
        let is_plain_scalar = !is_invalid_plain_start
            || (self.buffer.check('-', 0) && !self.buffer.is_blank(1))
            || (self.flow_level == 0
                && self.buffer.check_any("?:", 0)
                && !self.buffer.is_blank_or_break_or_zero(1));
        if is_plain_scalar {
            return self.fetch_plain_scalar();
        }

        Err(Error::syntax(
            self.mark,
            self.mark,
            "while scanning for the next token, found a character that cannot start any token",
        ))
    }

    /// Advance over one character, updating the mark.
    fn skip(&mut self) {
        self.mark.index += 1;
        self.mark.column += 1;
        self.buffer.skip(1);
    }

    /// Advance over one line break (CR LF counts as one).
    fn skip_line(&mut self) {
        if self.buffer.is_crlf(0) {
            self.mark.index += 2;
            self.mark.column = 0;
            self.mark.line += 1;
            self.buffer.skip(2);
        } else if self.buffer.is_break(0) {
            self.mark.index += 1;
            self.mark.column = 0;
            self.mark.line += 1;
            self.buffer.skip(1);
        } else {
            debug_assert!(self.buffer.is_zero(0), "not at a break");
        }
    }

    fn read_char(&mut self) -> char {
        let ch = self.buffer.peek(0);
        self.skip();
        ch
    }

    /// Consume a line break, normalizing CR, CR LF, and NEL to LF. LS and PS
    /// are kept as themselves.
    fn read_line(&mut self, dest: &mut String) {
        if self.buffer.check_any("\r\n\u{85}", 0) {
            self.skip_line();
            dest.push('\n');
        } else {
            let ch = self.buffer.peek(0);
            self.skip_line();
            dest.push(ch);
        }
    }

    /// Whitespace that separates tokens. Tabs qualify in the flow context,
    /// and in the block context anywhere a simple key could not start.
    fn check_white_space(&mut self) -> bool {
        self.buffer.check(' ', 0)
            || ((self.flow_level > 0 || !self.simple_key_allowed) && self.buffer.check('\t', 0))
    }

    /// A `---` or `...` at column zero followed by a blank, break, or EOF.
    fn is_document_indicator(&mut self) -> bool {
        if self.mark.column == 0 && self.buffer.is_blank_or_break_or_zero(3) {
            let is_start = self.buffer.check('-', 0)
                && self.buffer.check('-', 1)
                && self.buffer.check('-', 2);
            let is_end = self.buffer.check('.', 0)
                && self.buffer.check('.', 1)
                && self.buffer.check('.', 2);
            is_start || is_end
        } else {
            false
        }
    }

    fn scan_to_next_token(&mut self) {
        loop {
            while self.check_white_space() {
                self.skip();
            }

            // Eat a comment until the line break.
            if self.buffer.check('#', 0) {
                while !self.buffer.is_break_or_zero(0) {
                    self.skip();
                }
            }

            if self.buffer.is_break(0) {
                self.skip_line();

                // In the block context, a new line may start a simple key.
                if self.flow_level == 0 {
                    self.simple_key_allowed = true;
                }
            } else {
                break;
            }
        }
    }

    fn fetch_stream_start(&mut self) {
        self.simple_key_allowed = true;
        self.stream_start_produced = true;
        self.tokens
            .enqueue(Token::new(TokenKind::StreamStart, self.mark, self.mark));
    }

    /// Pop indentation levels greater than `column`, appending a BLOCK-END
    /// token for each.
    fn unroll_indent(&mut self, column: i64) {
        if self.flow_level > 0 {
            return;
        }
        while self.indent > column {
            self.tokens
                .enqueue(Token::new(TokenKind::BlockEnd, self.mark, self.mark));
            self.indent = self.indents.pop().unwrap_or(-1);
        }
    }

    /// Push the indentation level and emit a block collection start token if
    /// `column` opens a deeper level. `number` positions a retroactive
    /// BLOCK-MAPPING-START; `None` appends.
    fn roll_indent(&mut self, column: i64, number: Option<usize>, is_sequence: bool, position: Mark) {
        if self.flow_level > 0 {
            return;
        }
        if self.indent < column {
            self.indents.push(self.indent);
            self.indent = column;

            let kind = if is_sequence {
                TokenKind::BlockSequenceStart
            } else {
                TokenKind::BlockMappingStart
            };
            let token = Token::new(kind, position, position);
            match number {
                None => self.tokens.enqueue(token),
                Some(number) => self.tokens.insert(number - self.tokens_parsed, token),
            }
        }
    }

    fn fetch_stream_end(&mut self) -> Result<()> {
        // Force a new line.
        if self.mark.column != 0 {
            self.mark.column = 0;
            self.mark.line += 1;
        }

        self.unroll_indent(-1);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;

        self.stream_end_produced = true;
        self.tokens
            .enqueue(Token::new(TokenKind::StreamEnd, self.mark, self.mark));
        Ok(())
    }

    fn fetch_directive(&mut self) -> Result<()> {
        self.unroll_indent(-1);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;

        let token = self.scan_directive()?;
        self.tokens.enqueue(token);
        Ok(())
    }

    /// Scan a `%YAML` or `%TAG` directive, through the end of its line.
    fn scan_directive(&mut self) -> Result<Token> {
        let start = self.mark;
        self.skip();

        let name = self.scan_directive_name(start)?;

        let token = match name.as_str() {
            "YAML" => self.scan_version_directive_value(start)?,
            "TAG" => self.scan_tag_directive_value(start)?,
            _ => {
                return Err(Error::syntax(
                    start,
                    self.mark,
                    "while scanning a directive, found an unknown directive name",
                ))
            }
        };

        // Eat the rest of the line, including any comment.
        while self.buffer.is_blank(0) {
            self.skip();
        }
        if self.buffer.check('#', 0) {
            while !self.buffer.is_break_or_zero(0) {
                self.skip();
            }
        }
        if !self.buffer.is_break_or_zero(0) {
            return Err(Error::syntax(
                start,
                self.mark,
                "while scanning a directive, did not find expected comment or line break",
            ));
        }
        if self.buffer.is_break(0) {
            self.skip_line();
        }

        Ok(token)
    }

    fn scan_directive_name(&mut self, start: Mark) -> Result<String> {
        let mut name = String::new();
        while self.buffer.is_alpha(0) {
            name.push(self.read_char());
        }

        if name.is_empty() {
            return Err(Error::syntax(
                start,
                self.mark,
                "while scanning a directive, could not find expected directive name",
            ));
        }
        if !self.buffer.is_blank_or_break_or_zero(0) {
            return Err(Error::syntax(
                start,
                self.mark,
                "while scanning a directive, found unexpected non-alphabetical character",
            ));
        }

        Ok(name)
    }

    fn skip_whitespaces(&mut self) {
        while self.buffer.is_blank(0) {
            self.skip();
        }
    }

    fn scan_version_directive_value(&mut self, start: Mark) -> Result<Token> {
        self.skip_whitespaces();

        let major = self.scan_version_directive_number(start)?;

        if !self.buffer.check('.', 0) {
            return Err(Error::syntax(
                start,
                self.mark,
                "while scanning a %YAML directive, did not find expected digit or '.' character",
            ));
        }
        self.skip();

        let minor = self.scan_version_directive_number(start)?;

        Ok(Token::new(
            TokenKind::VersionDirective(VersionDirective::new(major, minor)),
            start,
            start,
        ))
    }

    fn scan_version_directive_number(&mut self, start: Mark) -> Result<u32> {
        let mut value: u32 = 0;
        let mut length = 0;

        while self.buffer.is_digit(0) {
            length += 1;
            if length > MAX_VERSION_NUMBER_LENGTH {
                return Err(Error::syntax(
                    start,
                    self.mark,
                    "while scanning a %YAML directive, found an extremely long version number",
                ));
            }
            value = value * 10 + self.buffer.as_digit(0);
            self.skip();
        }

        if length == 0 {
            return Err(Error::syntax(
                start,
                self.mark,
                "while scanning a %YAML directive, did not find expected version number",
            ));
        }

        Ok(value)
    }

    fn scan_tag_directive_value(&mut self, start: Mark) -> Result<Token> {
        self.skip_whitespaces();

        let handle = self.scan_tag_handle(true, start)?;

        if !self.buffer.is_blank(0) {
            return Err(Error::syntax(
                start,
                self.mark,
                "while scanning a %TAG directive, did not find expected whitespace",
            ));
        }
        self.skip_whitespaces();

        let prefix = self.scan_tag_uri(None, start)?;

        if !self.buffer.is_blank_or_break_or_zero(0) {
            return Err(Error::syntax(
                start,
                self.mark,
                "while scanning a %TAG directive, did not find expected whitespace or line break",
            ));
        }

        Ok(Token::new(
            TokenKind::TagDirective(TagDirective::new(handle, prefix)),
            start,
            start,
        ))
    }

    fn fetch_document_indicator(&mut self, is_start_token: bool) -> Result<()> {
        self.unroll_indent(-1);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;

        let start = self.mark;
        self.skip();
        self.skip();
        self.skip();

        let token = if is_start_token {
            Token::new(TokenKind::DocumentStart, start, self.mark)
        } else {
            Token::new(TokenKind::DocumentEnd, start, start)
        };
        self.tokens.enqueue(token);
        Ok(())
    }

    fn fetch_flow_collection_start(&mut self, is_sequence_token: bool) -> Result<()> {
        // '[' and '{' may themselves be the start of a simple key.
        self.save_simple_key()?;

        self.increase_flow_level();
        self.simple_key_allowed = true;

        let start = self.mark;
        self.skip();

        let kind = if is_sequence_token {
            TokenKind::FlowSequenceStart
        } else {
            TokenKind::FlowMappingStart
        };
        self.tokens.enqueue(Token::new(kind, start, start));
        Ok(())
    }

    fn increase_flow_level(&mut self) {
        self.simple_keys.push(SimpleKey::default());
        self.flow_level += 1;
    }

    fn fetch_flow_collection_end(&mut self, is_sequence_token: bool) -> Result<()> {
        self.remove_simple_key()?;
        self.decrease_flow_level();
        self.simple_key_allowed = false;

        let start = self.mark;
        self.skip();

        let kind = if is_sequence_token {
            TokenKind::FlowSequenceEnd
        } else {
            TokenKind::FlowMappingEnd
        };
        self.tokens.enqueue(Token::new(kind, start, start));
        Ok(())
    }

    fn decrease_flow_level(&mut self) {
        if self.flow_level > 0 {
            self.flow_level -= 1;
            self.simple_keys.pop();
        }
    }

    fn fetch_flow_entry(&mut self) -> Result<()> {
        self.remove_simple_key()?;
        self.simple_key_allowed = true;

        let start = self.mark;
        self.skip();
        self.tokens
            .enqueue(Token::new(TokenKind::FlowEntry, start, self.mark));
        Ok(())
    }

    fn fetch_block_entry(&mut self) -> Result<()> {
        if self.flow_level == 0 {
            if !self.simple_key_allowed {
                return Err(Error::syntax(
                    self.mark,
                    self.mark,
                    "block sequence entries are not allowed in this context",
                ));
            }
            self.roll_indent(self.mark.column as i64, None, true, self.mark);
        }
        // A '-' in the flow context is an error, but the parser reports it
        // with better context than we could here.

        self.remove_simple_key()?;
        self.simple_key_allowed = true;

        let start = self.mark;
        self.skip();
        self.tokens
            .enqueue(Token::new(TokenKind::BlockEntry, start, self.mark));
        Ok(())
    }

    fn fetch_key(&mut self) -> Result<()> {
        if self.flow_level == 0 {
            if !self.simple_key_allowed {
                return Err(Error::syntax(
                    self.mark,
                    self.mark,
                    "mapping keys are not allowed in this context",
                ));
            }
            self.roll_indent(self.mark.column as i64, None, false, self.mark);
        }

        self.remove_simple_key()?;

        // Simple keys are allowed after '?' in the block context only.
        self.simple_key_allowed = self.flow_level == 0;

        let start = self.mark;
        self.skip();
        self.tokens
            .enqueue(Token::new(TokenKind::Key, start, self.mark));
        Ok(())
    }

    fn fetch_value(&mut self) -> Result<()> {
        let key = self.simple_keys.last().copied().unwrap_or_default();

        if key.possible {
            // The simple key becomes a real one: insert the KEY token back at
            // the position where the key started.
            self.tokens.insert(
                key.token_number - self.tokens_parsed,
                Token::new(TokenKind::Key, key.mark, key.mark),
            );

            self.roll_indent(key.mark.column as i64, Some(key.token_number), false, key.mark);

            if let Some(slot) = self.simple_keys.last_mut() {
                slot.possible = false;
            }

            // A simple key cannot follow another simple key.
            self.simple_key_allowed = false;
        } else {
            // The ':' follows a complex key.
            if self.flow_level == 0 {
                if !self.simple_key_allowed {
                    return Err(Error::syntax(
                        self.mark,
                        self.mark,
                        "mapping values are not allowed in this context",
                    ));
                }
                self.roll_indent(self.mark.column as i64, None, false, self.mark);
            }
            self.simple_key_allowed = self.flow_level == 0;
        }

        let start = self.mark;
        self.skip();
        self.tokens
            .enqueue(Token::new(TokenKind::Value, start, self.mark));
        Ok(())
    }

    fn fetch_anchor(&mut self, is_alias: bool) -> Result<()> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;

        let token = self.scan_anchor(is_alias)?;
        self.tokens.enqueue(token);
        Ok(())
    }

    fn scan_anchor(&mut self, is_alias: bool) -> Result<Token> {
        let start = self.mark;
        self.skip();

        let mut value = String::new();
        while self.buffer.is_alpha(0) {
            value.push(self.read_char());
        }

        // The name must be non-empty and followed by whitespace or one of
        // the indicators '?', ':', ',', ']', '}', '%', '@', '`'.
        if value.is_empty()
            || !(self.buffer.is_blank_or_break_or_zero(0) || self.buffer.check_any("?:,]}%@`", 0))
        {
            return Err(Error::syntax(
                start,
                self.mark,
                "while scanning an anchor or alias, did not find expected alphabetic or numeric character",
            ));
        }

        let kind = if is_alias {
            TokenKind::Alias(value)
        } else {
            TokenKind::Anchor(value)
        };
        Ok(Token::new(kind, start, self.mark))
    }

    fn fetch_tag(&mut self) -> Result<()> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;

        let token = self.scan_tag()?;
        self.tokens.enqueue(token);
        Ok(())
    }

    fn scan_tag(&mut self) -> Result<Token> {
        let start = self.mark;

        let handle;
        let mut suffix;

        if self.buffer.check('<', 1) {
            // Verbatim form: '!<uri>'.
            handle = String::new();

            self.skip();
            self.skip();

            suffix = self.scan_tag_uri(None, start)?;

            if !self.buffer.check('>', 0) {
                return Err(Error::syntax(
                    start,
                    self.mark,
                    "while scanning a tag, did not find the expected '>'",
                ));
            }
            self.skip();
        } else {
            // Either the '!suffix' or the '!handle!suffix' form.
            let first_part = self.scan_tag_handle(false, start)?;

            if first_part.len() > 1 && first_part.starts_with('!') && first_part.ends_with('!') {
                handle = first_part;
                suffix = self.scan_tag_uri(None, start)?;
            } else {
                suffix = self.scan_tag_uri(Some(&first_part), start)?;

                if suffix.is_empty() {
                    // The bare '!' tag.
                    suffix = "!".to_string();
                    handle = String::new();
                } else {
                    handle = "!".to_string();
                }
            }
        }

        if !self.buffer.is_blank_or_break_or_zero(0) {
            return Err(Error::syntax(
                start,
                self.mark,
                "while scanning a tag, did not find expected whitespace or line break",
            ));
        }

        Ok(Token::new(TokenKind::Tag { handle, suffix }, start, self.mark))
    }

    fn scan_tag_handle(&mut self, is_directive: bool, start: Mark) -> Result<String> {
        if !self.buffer.check('!', 0) {
            return Err(Error::syntax(
                start,
                self.mark,
                "while scanning a tag, did not find expected '!'",
            ));
        }

        let mut handle = String::new();
        handle.push(self.read_char());

        while self.buffer.is_alpha(0) {
            handle.push(self.read_char());
        }

        if self.buffer.check('!', 0) {
            handle.push(self.read_char());
        } else if is_directive && handle != "!" {
            // In a %TAG directive the handle must be closed; in a node tag
            // the characters so far are part of the URI.
            return Err(Error::syntax(
                start,
                self.mark,
                "while parsing a tag directive, did not find expected '!'",
            ));
        }

        Ok(handle)
    }

    /// Scan a tag URI, decoding `%HH` escapes. `head` carries characters
    /// already consumed by a failed handle scan, minus its leading '!'.
    fn scan_tag_uri(&mut self, head: Option<&str>, start: Mark) -> Result<String> {
        let mut tag = String::new();
        if let Some(head) = head {
            if head.len() > 1 {
                tag.push_str(&head[1..]);
            }
        }

        while self.buffer.is_alpha(0) || self.buffer.check_any(";/?:@&=+$,.!~*'()[]%", 0) {
            if self.buffer.check('%', 0) {
                tag.push(self.scan_uri_escapes(start)?);
            } else {
                tag.push(self.read_char());
            }
        }

        if tag.is_empty() {
            return Err(Error::syntax(
                start,
                self.mark,
                "while parsing a tag, did not find expected tag URI",
            ));
        }

        Ok(tag)
    }

    /// Decode a run of `%HH` escapes that together form one UTF-8 character.
    fn scan_uri_escapes(&mut self, start: Mark) -> Result<char> {
        let mut bytes = Vec::new();
        let mut width = 0usize;

        loop {
            if !(self.buffer.check('%', 0) && self.buffer.is_hex(1) && self.buffer.is_hex(2)) {
                return Err(Error::syntax(
                    start,
                    self.mark,
                    "while parsing a tag, did not find a URI-escaped octet",
                ));
            }

            let octet = ((self.buffer.as_hex(1) << 4) + self.buffer.as_hex(2)) as u8;

            if width == 0 {
                // The leading octet determines the sequence length.
                width = if octet & 0x80 == 0x00 {
                    1
                } else if octet & 0xE0 == 0xC0 {
                    2
                } else if octet & 0xF0 == 0xE0 {
                    3
                } else if octet & 0xF8 == 0xF0 {
                    4
                } else {
                    return Err(Error::syntax(
                        start,
                        self.mark,
                        "while parsing a tag, found an incorrect leading UTF-8 octet",
                    ));
                };
            } else if octet & 0xC0 != 0x80 {
                return Err(Error::syntax(
                    start,
                    self.mark,
                    "while parsing a tag, found an incorrect trailing UTF-8 octet",
                ));
            }

            bytes.push(octet);

            self.skip();
            self.skip();
            self.skip();

            width -= 1;
            if width == 0 {
                break;
            }
        }

        let decoded = std::str::from_utf8(&bytes)
            .ok()
            .and_then(|text| {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => Some(ch),
                    _ => None,
                }
            });
        match decoded {
            Some(ch) => Ok(ch),
            None => Err(Error::syntax(
                start,
                self.mark,
                "while parsing a tag, found an incorrect UTF-8 sequence",
            )),
        }
    }

    fn fetch_block_scalar(&mut self, is_literal: bool) -> Result<()> {
        self.remove_simple_key()?;

        // A simple key may follow a block scalar.
        self.simple_key_allowed = true;

        let token = self.scan_block_scalar(is_literal)?;
        self.tokens.enqueue(token);
        Ok(())
    }

    fn scan_block_scalar(&mut self, is_literal: bool) -> Result<Token> {
        let mut value = String::new();
        let mut leading_break = String::new();
        let mut trailing_breaks = String::new();

        let mut chomping: i32 = 0;
        let mut increment: i64 = 0;
        let mut current_indent: i64 = 0;
        let mut leading_blank = false;

        // Eat the indicator '|' or '>'.
        let start = self.mark;
        self.skip();

        // The chomping and indentation indicators may come in either order.
        if self.buffer.check_any("+-", 0) {
            chomping = if self.buffer.check('+', 0) { 1 } else { -1 };
            self.skip();

            if self.buffer.is_digit(0) {
                if self.buffer.check('0', 0) {
                    return Err(Error::syntax(
                        start,
                        self.mark,
                        "while scanning a block scalar, found an indentation indicator equal to 0",
                    ));
                }
                increment = self.buffer.as_digit(0) as i64;
                self.skip();
            }
        } else if self.buffer.is_digit(0) {
            if self.buffer.check('0', 0) {
                return Err(Error::syntax(
                    start,
                    self.mark,
                    "while scanning a block scalar, found an indentation indicator equal to 0",
                ));
            }
            increment = self.buffer.as_digit(0) as i64;
            self.skip();

            if self.buffer.check_any("+-", 0) {
                chomping = if self.buffer.check('+', 0) { 1 } else { -1 };
                self.skip();
            }
        }

        // Eat whitespace and a comment to the end of the line.
        while self.buffer.is_blank(0) {
            self.skip();
        }
        if self.buffer.check('#', 0) {
            while !self.buffer.is_break_or_zero(0) {
                self.skip();
            }
        }
        if !self.buffer.is_break_or_zero(0) {
            return Err(Error::syntax(
                start,
                self.mark,
                "while scanning a block scalar, did not find expected comment or line break",
            ));
        }
        if self.buffer.is_break(0) {
            self.skip_line();
        }

        let mut end = self.mark;

        if increment != 0 {
            current_indent = if self.indent >= 0 {
                self.indent + increment
            } else {
                increment
            };
        }

        // Scan the leading line breaks, settling the indentation level if it
        // was not given explicitly.
        current_indent =
            self.scan_block_scalar_breaks(current_indent, &mut trailing_breaks, start, &mut end)?;

        while self.mark.column as i64 == current_indent && !self.buffer.is_zero(0) {
            // At the beginning of a non-empty line.
            let trailing_blank = self.buffer.is_blank(0);

            // Fold the leading break unless either adjoining line is blank.
            if !is_literal
                && (leading_break.starts_with('\r') || leading_break.starts_with('\n'))
                && !leading_blank
                && !trailing_blank
            {
                if trailing_breaks.is_empty() {
                    value.push(' ');
                }
                leading_break.clear();
            } else {
                value.push_str(&leading_break);
                leading_break.clear();
            }

            value.push_str(&trailing_breaks);
            trailing_breaks.clear();

            leading_blank = self.buffer.is_blank(0);

            while !self.buffer.is_break_or_zero(0) {
                value.push(self.read_char());
            }

            self.read_line(&mut leading_break);

            current_indent =
                self.scan_block_scalar_breaks(current_indent, &mut trailing_breaks, start, &mut end)?;
        }

        // Chomp the tail.
        if chomping != -1 {
            value.push_str(&leading_break);
        }
        if chomping == 1 {
            value.push_str(&trailing_breaks);
        }

        let style = if is_literal {
            ScalarStyle::Literal
        } else {
            ScalarStyle::Folded
        };
        Ok(Token::new(TokenKind::Scalar { value, style }, start, end))
    }

    /// Eat indentation spaces and line breaks between block scalar lines,
    /// deciding the auto-detected indentation level on the way.
    fn scan_block_scalar_breaks(
        &mut self,
        mut current_indent: i64,
        breaks: &mut String,
        start: Mark,
        end: &mut Mark,
    ) -> Result<i64> {
        let mut max_indent: i64 = 0;

        *end = self.mark;

        loop {
            while (current_indent == 0 || (self.mark.column as i64) < current_indent)
                && self.buffer.is_space(0)
            {
                self.skip();
            }

            if self.mark.column as i64 > max_indent {
                max_indent = self.mark.column as i64;
            }

            // A tab where an indentation space is expected breaks the scalar.
            if (current_indent == 0 || (self.mark.column as i64) < current_indent)
                && self.buffer.is_tab(0)
            {
                return Err(Error::syntax(
                    start,
                    self.mark,
                    "while scanning a block scalar, found a tab character where an indentation space is expected",
                ));
            }

            if !self.buffer.is_break(0) {
                break;
            }

            self.read_line(breaks);
            *end = self.mark;
        }

        if current_indent == 0 {
            current_indent = max_indent.max(self.indent + 1).max(1);
        }

        Ok(current_indent)
    }

    fn fetch_flow_scalar(&mut self, is_single_quoted: bool) -> Result<()> {
        // A quoted scalar could be a simple key.
        self.save_simple_key()?;
        self.simple_key_allowed = false;

        let token = self.scan_flow_scalar(is_single_quoted)?;
        self.tokens.enqueue(token);
        Ok(())
    }

    fn scan_flow_scalar(&mut self, is_single_quoted: bool) -> Result<Token> {
        let quote = if is_single_quoted { '\'' } else { '"' };

        // Eat the left quote.
        let start = self.mark;
        self.skip();

        let mut value = String::new();
        let mut whitespaces = String::new();
        let mut leading_break = String::new();
        let mut trailing_breaks = String::new();

        loop {
            if self.is_document_indicator() {
                return Err(Error::syntax(
                    start,
                    self.mark,
                    "while scanning a quoted scalar, found an unexpected document indicator",
                ));
            }
            if self.buffer.is_zero(0) {
                return Err(Error::syntax(
                    start,
                    self.mark,
                    "while scanning a quoted scalar, found unexpected end of stream",
                ));
            }

            let mut has_leading_blanks = false;

            // Consume non-blank characters.
            while !self.buffer.is_blank_or_break_or_zero(0) {
                if is_single_quoted && self.buffer.check('\'', 0) && self.buffer.check('\'', 1) {
                    // An escaped single quote.
                    value.push('\'');
                    self.skip();
                    self.skip();
                } else if self.buffer.check(quote, 0) {
                    break;
                } else if !is_single_quoted && self.buffer.check('\\', 0) && self.buffer.is_break(1)
                {
                    // An escaped line break joins the lines without a space.
                    self.skip();
                    self.skip_line();
                    has_leading_blanks = true;
                    break;
                } else if !is_single_quoted && self.buffer.check('\\', 0) {
                    let escape_character = self.buffer.peek(1);
                    let code_length = match escape_character {
                        'x' => 2,
                        'u' => 4,
                        'U' => 8,
                        _ => {
                            match simple_escape(escape_character) {
                                Some(unescaped) => value.push(unescaped),
                                None => {
                                    return Err(Error::syntax(
                                        start,
                                        self.mark,
                                        "while parsing a quoted scalar, found an unknown escape character",
                                    ));
                                }
                            }
                            0
                        }
                    };

                    self.skip();
                    self.skip();

                    if code_length > 0 {
                        let mut character: u32 = 0;
                        for k in 0..code_length {
                            if !self.buffer.is_hex(k) {
                                return Err(Error::syntax(
                                    start,
                                    self.mark,
                                    "while parsing a quoted scalar, did not find expected hexadecimal number",
                                ));
                            }
                            character = (character << 4) + self.buffer.as_hex(k);
                        }

                        // Surrogates and out-of-range code points are not
                        // valid escapes.
                        let decoded = match character {
                            0xD800..=0xDFFF => None,
                            _ => char::from_u32(character),
                        };
                        match decoded {
                            Some(ch) => value.push(ch),
                            None => {
                                return Err(Error::syntax(
                                    start,
                                    self.mark,
                                    "while parsing a quoted scalar, found an invalid Unicode character escape code",
                                ));
                            }
                        }

                        for _ in 0..code_length {
                            self.skip();
                        }
                    }
                } else {
                    value.push(self.read_char());
                }
            }

            // The closing quote ends the scalar.
            if self.buffer.check(quote, 0) {
                break;
            }

            // Consume blank characters.
            while self.buffer.is_blank(0) || self.buffer.is_break(0) {
                if self.buffer.is_blank(0) {
                    if !has_leading_blanks {
                        whitespaces.push(self.read_char());
                    } else {
                        self.skip();
                    }
                } else if !has_leading_blanks {
                    whitespaces.clear();
                    self.read_line(&mut leading_break);
                    has_leading_blanks = true;
                } else {
                    self.read_line(&mut trailing_breaks);
                }
            }

            // Join the whitespaces or fold the line breaks.
            if has_leading_blanks {
                if leading_break.starts_with('\n') {
                    if trailing_breaks.is_empty() {
                        value.push(' ');
                    } else {
                        value.push_str(&trailing_breaks);
                    }
                } else {
                    value.push_str(&leading_break);
                    value.push_str(&trailing_breaks);
                }
                leading_break.clear();
                trailing_breaks.clear();
            } else {
                value.push_str(&whitespaces);
                whitespaces.clear();
            }
        }

        // Eat the right quote.
        self.skip();

        let style = if is_single_quoted {
            ScalarStyle::SingleQuoted
        } else {
            ScalarStyle::DoubleQuoted
        };
        Ok(Token::new(
            TokenKind::Scalar { value, style },
            start,
            self.mark,
        ))
    }

    fn fetch_plain_scalar(&mut self) -> Result<()> {
        // A plain scalar could be a simple key.
        self.save_simple_key()?;
        self.simple_key_allowed = false;

        let token = self.scan_plain_scalar()?;
        self.tokens.enqueue(token);
        Ok(())
    }

    fn scan_plain_scalar(&mut self) -> Result<Token> {
        let mut value = String::new();
        let mut whitespaces = String::new();
        let mut leading_break = String::new();
        let mut trailing_breaks = String::new();

        let mut has_leading_blanks = false;
        let current_indent = self.indent + 1;

        let start = self.mark;
        let mut end = self.mark;

        loop {
            if self.is_document_indicator() {
                break;
            }
            if self.buffer.check('#', 0) {
                break;
            }

            // Consume non-blank characters.
            while !self.buffer.is_blank_or_break_or_zero(0) {
                // 'x:x' is forbidden in the flow context.
                if self.flow_level > 0
                    && self.buffer.check(':', 0)
                    && !self.buffer.is_blank_or_break_or_zero(1)
                {
                    return Err(Error::syntax(
                        start,
                        self.mark,
                        "while scanning a plain scalar, found unexpected ':'",
                    ));
                }

                // Indicators that end a plain scalar.
                if (self.buffer.check(':', 0) && self.buffer.is_blank_or_break_or_zero(1))
                    || (self.flow_level > 0 && self.buffer.check_any(",:?[]{}", 0))
                {
                    break;
                }

                if has_leading_blanks || !whitespaces.is_empty() {
                    if has_leading_blanks {
                        if leading_break.starts_with('\n') {
                            // Fold the break, or replace it with the
                            // trailing empty lines.
                            if trailing_breaks.is_empty() {
                                value.push(' ');
                            } else {
                                value.push_str(&trailing_breaks);
                            }
                        } else {
                            value.push_str(&leading_break);
                            value.push_str(&trailing_breaks);
                        }
                        leading_break.clear();
                        trailing_breaks.clear();
                        has_leading_blanks = false;
                    } else {
                        value.push_str(&whitespaces);
                        whitespaces.clear();
                    }
                }

                value.push(self.read_char());
                end = self.mark;
            }

            if !(self.buffer.is_blank(0) || self.buffer.is_break(0)) {
                break;
            }

            // Consume blank characters.
            while self.buffer.is_blank(0) || self.buffer.is_break(0) {
                if self.buffer.is_blank(0) {
                    // A tab may not be used as continuation indentation.
                    if has_leading_blanks
                        && (self.mark.column as i64) < current_indent
                        && self.buffer.is_tab(0)
                    {
                        return Err(Error::syntax(
                            start,
                            self.mark,
                            "while scanning a plain scalar, found a tab character that violates indentation",
                        ));
                    }

                    if !has_leading_blanks {
                        whitespaces.push(self.read_char());
                    } else {
                        self.skip();
                    }
                } else if !has_leading_blanks {
                    whitespaces.clear();
                    self.read_line(&mut leading_break);
                    has_leading_blanks = true;
                } else {
                    self.read_line(&mut trailing_breaks);
                }
            }

            // A line at a shallower indentation ends the scalar.
            if self.flow_level == 0 && (self.mark.column as i64) < current_indent {
                break;
            }
        }

        // A multi-line plain scalar lets a simple key start on the next line.
        if has_leading_blanks {
            self.simple_key_allowed = true;
        }

        Ok(Token::new(
            TokenKind::Scalar {
                value,
                style: ScalarStyle::Plain,
            },
            start,
            end,
        ))
    }

    /// Retire the potential simple key at the current flow level.
    fn remove_simple_key(&mut self) -> Result<()> {
        if let Some(key) = self.simple_keys.last_mut() {
            if key.possible && key.required {
                return Err(Error::syntax(
                    key.mark,
                    key.mark,
                    "while scanning a simple key, could not find expected ':'",
                ));
            }
            key.possible = false;
        }
        Ok(())
    }

    /// Record that a simple key may start at the current position.
    fn save_simple_key(&mut self) -> Result<()> {
        // A simple key is required when the scanner is in the block context
        // and the current column coincides with the indentation level.
        let required = self.flow_level == 0 && self.indent == self.mark.column as i64;

        // A simple key is required only as the first token of its line, where
        // one is always allowed.
        debug_assert!(
            self.simple_key_allowed || !required,
            "a required simple key must be allowed"
        );

        if self.simple_key_allowed {
            let key = SimpleKey {
                possible: true,
                required,
                token_number: self.tokens_parsed + self.tokens.len(),
                mark: self.mark,
            };

            self.remove_simple_key()?;
            if let Some(slot) = self.simple_keys.last_mut() {
                *slot = key;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        let mut scanner = Scanner::new(input.chars());
        let mut out = Vec::new();
        while let Some(token) = scanner.next_token().unwrap() {
            out.push(token.kind);
        }
        out
    }

    fn scalar(value: &str, style: ScalarStyle) -> TokenKind {
        TokenKind::Scalar {
            value: value.to_string(),
            style,
        }
    }

    #[test]
    fn empty_stream() {
        assert_eq!(kinds(""), [TokenKind::StreamStart, TokenKind::StreamEnd]);
    }

    #[test]
    fn block_mapping_with_simple_keys() {
        assert_eq!(
            kinds("a: 1\nb: 2\n"),
            [
                TokenKind::StreamStart,
                TokenKind::BlockMappingStart,
                TokenKind::Key,
                scalar("a", ScalarStyle::Plain),
                TokenKind::Value,
                scalar("1", ScalarStyle::Plain),
                TokenKind::Key,
                scalar("b", ScalarStyle::Plain),
                TokenKind::Value,
                scalar("2", ScalarStyle::Plain),
                TokenKind::BlockEnd,
                TokenKind::StreamEnd,
            ]
        );
    }

    #[test]
    fn block_sequence() {
        assert_eq!(
            kinds("- 1\n- 2\n"),
            [
                TokenKind::StreamStart,
                TokenKind::BlockSequenceStart,
                TokenKind::BlockEntry,
                scalar("1", ScalarStyle::Plain),
                TokenKind::BlockEntry,
                scalar("2", ScalarStyle::Plain),
                TokenKind::BlockEnd,
                TokenKind::StreamEnd,
            ]
        );
    }

    #[test]
    fn flow_sequence() {
        assert_eq!(
            kinds("[1, 2]"),
            [
                TokenKind::StreamStart,
                TokenKind::FlowSequenceStart,
                scalar("1", ScalarStyle::Plain),
                TokenKind::FlowEntry,
                scalar("2", ScalarStyle::Plain),
                TokenKind::FlowSequenceEnd,
                TokenKind::StreamEnd,
            ]
        );
    }

    #[test]
    fn flow_mapping() {
        assert_eq!(
            kinds("{a: 1}"),
            [
                TokenKind::StreamStart,
                TokenKind::FlowMappingStart,
                TokenKind::Key,
                scalar("a", ScalarStyle::Plain),
                TokenKind::Value,
                scalar("1", ScalarStyle::Plain),
                TokenKind::FlowMappingEnd,
                TokenKind::StreamEnd,
            ]
        );
    }

    #[test]
    fn document_markers() {
        assert_eq!(
            kinds("---\nx\n...\n"),
            [
                TokenKind::StreamStart,
                TokenKind::DocumentStart,
                scalar("x", ScalarStyle::Plain),
                TokenKind::DocumentEnd,
                TokenKind::StreamEnd,
            ]
        );
    }

    #[test]
    fn directives() {
        assert_eq!(
            kinds("%YAML 1.1\n%TAG !e! tag:example.com,2000:\n---\nx\n"),
            [
                TokenKind::StreamStart,
                TokenKind::VersionDirective(VersionDirective::new(1, 1)),
                TokenKind::TagDirective(TagDirective::new("!e!", "tag:example.com,2000:")),
                TokenKind::DocumentStart,
                scalar("x", ScalarStyle::Plain),
                TokenKind::StreamEnd,
            ]
        );
    }

    #[test]
    fn anchors_aliases_and_tags() {
        assert_eq!(
            kinds("- &a !!str x\n- *a\n"),
            [
                TokenKind::StreamStart,
                TokenKind::BlockSequenceStart,
                TokenKind::BlockEntry,
                TokenKind::Anchor("a".to_string()),
                TokenKind::Tag {
                    handle: "!!".to_string(),
                    suffix: "str".to_string(),
                },
                scalar("x", ScalarStyle::Plain),
                TokenKind::BlockEntry,
                TokenKind::Alias("a".to_string()),
                TokenKind::BlockEnd,
                TokenKind::StreamEnd,
            ]
        );
    }

    #[test]
    fn verbatim_tag() {
        assert_eq!(
            kinds("!<tag:example.com,2000:x> y\n"),
            [
                TokenKind::StreamStart,
                TokenKind::Tag {
                    handle: String::new(),
                    suffix: "tag:example.com,2000:x".to_string(),
                },
                scalar("y", ScalarStyle::Plain),
                TokenKind::StreamEnd,
            ]
        );
    }

    #[test]
    fn tag_uri_percent_escapes() {
        assert_eq!(
            kinds("!e%C3%A9 x\n"),
            [
                TokenKind::StreamStart,
                TokenKind::Tag {
                    handle: "!".to_string(),
                    suffix: "e\u{e9}".to_string(),
                },
                scalar("x", ScalarStyle::Plain),
                TokenKind::StreamEnd,
            ]
        );
    }

    #[test]
    fn literal_block_scalar_clips_by_default() {
        assert_eq!(
            kinds("|\n  a\n  b\n\n"),
            [
                TokenKind::StreamStart,
                scalar("a\nb\n", ScalarStyle::Literal),
                TokenKind::StreamEnd,
            ]
        );
    }

    #[test]
    fn literal_block_scalar_chomping() {
        assert_eq!(
            kinds("|+\n  a\n\n"),
            [
                TokenKind::StreamStart,
                scalar("a\n\n", ScalarStyle::Literal),
                TokenKind::StreamEnd,
            ]
        );
        assert_eq!(
            kinds("|-\n  a\n\n"),
            [
                TokenKind::StreamStart,
                scalar("a", ScalarStyle::Literal),
                TokenKind::StreamEnd,
            ]
        );
    }

    #[test]
    fn folded_block_scalar_joins_lines() {
        assert_eq!(
            kinds(">\n  a\n  b\n"),
            [
                TokenKind::StreamStart,
                scalar("a b\n", ScalarStyle::Folded),
                TokenKind::StreamEnd,
            ]
        );
    }

    #[test]
    fn block_scalar_explicit_indent_zero_is_an_error() {
        let mut scanner = Scanner::new("|0\n  a\n".chars());
        let mut last = scanner.next_token();
        while let Ok(Some(_)) = last {
            last = scanner.next_token();
        }
        assert!(matches!(last, Err(Error::Syntax { .. })));
    }

    #[test]
    fn double_quoted_escapes() {
        assert_eq!(
            kinds(r#""a\tb\u00e9\x41""#),
            [
                TokenKind::StreamStart,
                scalar("a\tb\u{e9}A", ScalarStyle::DoubleQuoted),
                TokenKind::StreamEnd,
            ]
        );
    }

    #[test]
    fn single_quoted_doubled_quote() {
        assert_eq!(
            kinds("'it''s'"),
            [
                TokenKind::StreamStart,
                scalar("it's", ScalarStyle::SingleQuoted),
                TokenKind::StreamEnd,
            ]
        );
    }

    #[test]
    fn invalid_escape_is_a_syntax_error() {
        let mut scanner = Scanner::new(r#""\q""#.chars());
        let mut last = scanner.next_token();
        while let Ok(Some(_)) = last {
            last = scanner.next_token();
        }
        assert!(matches!(last, Err(Error::Syntax { .. })));
    }

    #[test]
    fn surrogate_escape_is_a_syntax_error() {
        let mut scanner = Scanner::new(r#""\ud800""#.chars());
        let mut last = scanner.next_token();
        while let Ok(Some(_)) = last {
            last = scanner.next_token();
        }
        assert!(matches!(last, Err(Error::Syntax { .. })));
    }

    #[test]
    fn multiline_plain_scalar_folds() {
        assert_eq!(
            kinds("a\n b\n"),
            [
                TokenKind::StreamStart,
                scalar("a b", ScalarStyle::Plain),
                TokenKind::StreamEnd,
            ]
        );
    }

    #[test]
    fn simple_key_must_stay_on_one_line() {
        let mut scanner = Scanner::new("a: 1\nb\n: 2\n".chars());
        // The stray key 'b' at the mapping indentation level never finds its
        // ':' on the same line.
        let mut last = scanner.next_token();
        while let Ok(Some(_)) = last {
            last = scanner.next_token();
        }
        assert!(matches!(last, Err(Error::Syntax { .. })));
    }

    #[test]
    fn simple_key_must_stay_within_1024_characters() {
        let input = format!("a: 1\n{}: 2\n", "b".repeat(1100));
        let mut scanner = Scanner::new(input.chars());
        let mut last = scanner.next_token();
        while let Ok(Some(_)) = last {
            last = scanner.next_token();
        }
        assert!(matches!(last, Err(Error::Syntax { .. })));
    }

    #[test]
    fn reserved_indicator_cannot_start_a_token() {
        let mut scanner = Scanner::new("@x\n".chars());
        let mut last = scanner.next_token();
        while let Ok(Some(_)) = last {
            last = scanner.next_token();
        }
        assert!(matches!(last, Err(Error::Syntax { .. })));
    }

    #[test]
    fn dash_may_start_a_plain_scalar() {
        assert_eq!(
            kinds("-1\n"),
            [
                TokenKind::StreamStart,
                scalar("-1", ScalarStyle::Plain),
                TokenKind::StreamEnd,
            ]
        );
    }

    #[test]
    fn marks_advance_through_lines() {
        let mut scanner = Scanner::new("a: 1\nb: 2\n".chars());
        let mut last_start = Mark::default();
        while let Some(token) = scanner.next_token().unwrap() {
            assert!(token.start.index >= last_start.index);
            last_start = token.start;
        }
        assert_eq!(last_start.line, 2);
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("# leading\na: 1 # trailing\n"),
            [
                TokenKind::StreamStart,
                TokenKind::BlockMappingStart,
                TokenKind::Key,
                scalar("a", ScalarStyle::Plain),
                TokenKind::Value,
                scalar("1", ScalarStyle::Plain),
                TokenKind::BlockEnd,
                TokenKind::StreamEnd,
            ]
        );
    }

    #[test]
    fn nested_block_collections_unroll() {
        assert_eq!(
            kinds("a:\n  b: 1\nc: 2\n"),
            [
                TokenKind::StreamStart,
                TokenKind::BlockMappingStart,
                TokenKind::Key,
                scalar("a", ScalarStyle::Plain),
                TokenKind::Value,
                TokenKind::BlockMappingStart,
                TokenKind::Key,
                scalar("b", ScalarStyle::Plain),
                TokenKind::Value,
                scalar("1", ScalarStyle::Plain),
                TokenKind::BlockEnd,
                TokenKind::Key,
                scalar("c", ScalarStyle::Plain),
                TokenKind::Value,
                scalar("2", ScalarStyle::Plain),
                TokenKind::BlockEnd,
                TokenKind::StreamEnd,
            ]
        );
    }
}
