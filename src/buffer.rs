//! Bounded character lookahead.
//!
//! The scanner classifies the next token from at most four characters of
//! lookahead, and scalar scanning never looks further ahead than an escape
//! sequence. A small fixed-capacity ring buffer over the character source is
//! therefore enough for the whole engine: `peek` lazily pulls characters from
//! the source, `skip` discards consumed ones, and a NUL character stands in
//! for end of input so that classification code never branches on `Option`.

/// Capacity of the lookahead ring buffer.
pub const LOOKAHEAD_CAPACITY: usize = 8;

/// A fixed-capacity circular buffer over a character source, with the
/// character-class predicates the scanner and emitter share.
///
/// `peek` and `skip` with an offset at or beyond [`LOOKAHEAD_CAPACITY`] are
/// programming-contract violations and panic.
pub struct LookAheadBuffer<I> {
    source: I,
    chars: [char; LOOKAHEAD_CAPACITY],
    head: usize,
    count: usize,
    source_exhausted: bool,
}

impl<I: Iterator<Item = char>> LookAheadBuffer<I> {
    /// Wrap a character source.
    pub fn new(source: I) -> Self {
        Self {
            source,
            chars: ['\0'; LOOKAHEAD_CAPACITY],
            head: 0,
            count: 0,
            source_exhausted: false,
        }
    }

    /// True only once the source is exhausted and every buffered character
    /// has been consumed.
    pub fn end_of_input(&self) -> bool {
        self.source_exhausted && self.count == 0
    }

    /// Pull characters until `length` are buffered or the source runs dry.
    pub fn cache(&mut self, length: usize) {
        assert!(
            length <= LOOKAHEAD_CAPACITY,
            "lookahead of {length} exceeds buffer capacity"
        );
        while self.count < length && !self.source_exhausted {
            self.fill_one();
        }
    }

    /// The character `offset` positions ahead, or NUL past end of input.
    pub fn peek(&mut self, offset: usize) -> char {
        assert!(
            offset < LOOKAHEAD_CAPACITY,
            "lookahead offset {offset} exceeds buffer capacity"
        );
        self.cache(offset + 1);
        if offset < self.count {
            self.chars[(self.head + offset) % LOOKAHEAD_CAPACITY]
        } else {
            '\0'
        }
    }

    /// Discard `length` consumed characters.
    pub fn skip(&mut self, length: usize) {
        assert!(
            length <= LOOKAHEAD_CAPACITY,
            "skip of {length} exceeds buffer capacity"
        );
        self.cache(length);
        let consumed = length.min(self.count);
        self.head = (self.head + consumed) % LOOKAHEAD_CAPACITY;
        self.count -= consumed;
    }

    fn fill_one(&mut self) {
        match self.source.next() {
            Some(ch) => {
                self.chars[(self.head + self.count) % LOOKAHEAD_CAPACITY] = ch;
                self.count += 1;
            }
            None => self.source_exhausted = true,
        }
    }

    /// Check the character at `offset` against an expected one.
    pub fn check(&mut self, expected: char, offset: usize) -> bool {
        self.peek(offset) == expected
    }

    /// Check whether the character at `offset` is any of `set`.
    pub fn check_any(&mut self, set: &str, offset: usize) -> bool {
        let ch = self.peek(offset);
        set.contains(ch)
    }

    /// Alphanumeric, `_`, or `-` (anchor names, directive names, handles).
    pub fn is_alpha(&mut self, offset: usize) -> bool {
        let ch = self.peek(offset);
        ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
    }

    pub fn is_digit(&mut self, offset: usize) -> bool {
        self.peek(offset).is_ascii_digit()
    }

    /// Decimal value of the digit at `offset`.
    pub fn as_digit(&mut self, offset: usize) -> u32 {
        self.peek(offset) as u32 - '0' as u32
    }

    pub fn is_hex(&mut self, offset: usize) -> bool {
        self.peek(offset).is_ascii_hexdigit()
    }

    /// Numeric value of the hex digit at `offset`.
    pub fn as_hex(&mut self, offset: usize) -> u32 {
        self.peek(offset).to_digit(16).unwrap_or(0)
    }

    pub fn is_space(&mut self, offset: usize) -> bool {
        self.peek(offset) == ' '
    }

    pub fn is_tab(&mut self, offset: usize) -> bool {
        self.peek(offset) == '\t'
    }

    /// Space or tab.
    pub fn is_blank(&mut self, offset: usize) -> bool {
        is_blank_char(self.peek(offset))
    }

    /// CR, LF, NEL, LS, or PS.
    pub fn is_break(&mut self, offset: usize) -> bool {
        is_break_char(self.peek(offset))
    }

    /// NUL, i.e. past the end of input.
    pub fn is_zero(&mut self, offset: usize) -> bool {
        self.peek(offset) == '\0'
    }

    pub fn is_break_or_zero(&mut self, offset: usize) -> bool {
        self.is_break(offset) || self.is_zero(offset)
    }

    pub fn is_blank_or_break_or_zero(&mut self, offset: usize) -> bool {
        self.is_blank(offset) || self.is_break_or_zero(offset)
    }

    /// A CR LF pair starting at `offset`.
    pub fn is_crlf(&mut self, offset: usize) -> bool {
        self.peek(offset) == '\r' && self.peek(offset + 1) == '\n'
    }

    pub fn is_ascii(&mut self, offset: usize) -> bool {
        self.peek(offset).is_ascii()
    }

    /// YAML-printable per the 1.1 character set.
    pub fn is_printable(&mut self, offset: usize) -> bool {
        is_printable_char(self.peek(offset))
    }
}

/// Space or tab.
pub fn is_blank_char(ch: char) -> bool {
    ch == ' ' || ch == '\t'
}

/// Member of the YAML line-break set: CR, LF, NEL, LS, PS.
pub fn is_break_char(ch: char) -> bool {
    matches!(ch, '\r' | '\n' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

/// YAML-printable: 0x20–0x7E plus tab, LF, CR, NEL, and the printable
/// non-surrogate BMP ranges.
pub fn is_printable_char(ch: char) -> bool {
    matches!(ch,
        '\x20'..='\x7E'
        | '\x09'
        | '\x0A'
        | '\x0D'
        | '\u{85}'
        | '\u{A0}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(text: &str) -> LookAheadBuffer<std::str::Chars<'_>> {
        LookAheadBuffer::new(text.chars())
    }

    #[test]
    fn peek_and_skip() {
        let mut buf = buffer("abc");
        assert_eq!(buf.peek(0), 'a');
        assert_eq!(buf.peek(2), 'c');
        buf.skip(1);
        assert_eq!(buf.peek(0), 'b');
        buf.skip(2);
        assert_eq!(buf.peek(0), '\0');
    }

    #[test]
    fn nul_past_end_of_input() {
        let mut buf = buffer("x");
        assert_eq!(buf.peek(1), '\0');
        assert_eq!(buf.peek(7), '\0');
    }

    #[test]
    fn end_of_input_requires_drained_buffer() {
        let mut buf = buffer("ab");
        buf.cache(4);
        assert!(!buf.end_of_input());
        buf.skip(2);
        assert!(buf.end_of_input());
    }

    #[test]
    fn wraps_around_capacity() {
        let mut buf = buffer("abcdefghij");
        for expected in "abcdefghij".chars() {
            assert_eq!(buf.peek(0), expected);
            buf.skip(1);
        }
        assert!(buf.end_of_input());
    }

    #[test]
    #[should_panic(expected = "lookahead offset")]
    fn peek_beyond_capacity_panics() {
        buffer("abcdefghij").peek(LOOKAHEAD_CAPACITY);
    }

    #[test]
    fn classification() {
        let mut buf = buffer("a1-_ \t\r\n\u{85}");
        assert!(buf.is_alpha(0));
        assert!(buf.is_digit(1));
        assert!(buf.is_alpha(2));
        assert!(buf.is_alpha(3));
        assert!(buf.is_space(4));
        assert!(buf.is_tab(5));
        assert!(buf.is_blank(5));
        assert!(buf.is_crlf(6));
        assert!(is_break_char('\u{2029}'));
        assert!(!is_printable_char('\u{01}'));
        assert!(is_printable_char('\u{85}'));
    }

    #[test]
    fn hex_extraction() {
        let mut buf = buffer("fF0");
        assert!(buf.is_hex(0));
        assert_eq!(buf.as_hex(0), 15);
        assert_eq!(buf.as_hex(1), 15);
        assert_eq!(buf.as_digit(2), 0);
    }
}
