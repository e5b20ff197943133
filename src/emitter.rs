//! Serializes an event stream into YAML text.
//!
//! The emitter is the structural inverse of the parser: fed the event
//! sequence the parser produces, it writes an equivalent document. Events are
//! buffered just far enough to answer layout questions before any text is
//! written: one extra event to detect an empty document, two for an empty
//! sequence, three for an empty mapping. Each scalar is analyzed for which
//! styles can represent it, and a requested style that cannot is downgraded
//! along a fixed chain (plain to single-quoted to double-quoted; literal and
//! folded to double-quoted) so the output always re-parses to the same value.

use std::collections::VecDeque;
use std::fmt::Write;

use crate::buffer::{is_blank_char, is_break_char, is_printable_char};
use crate::directives::{
    default_tag_directives, TagDirective, TagDirectiveCollection, MAJOR_VERSION, MINOR_VERSION,
};
use crate::error::{Error, Result};
use crate::events::{CollectionStyle, Event, Scalar, ScalarStyle};

/// The smallest accepted indentation step.
pub const MIN_BEST_INDENT: usize = 2;

/// The largest accepted indentation step. A block scalar's explicit
/// indentation indicator is a single digit, so the step must stay below 10.
pub const MAX_BEST_INDENT: usize = 9;

/// Longest node, in characters, still written as a simple key. Longer keys
/// fall back to the explicit `?` form.
const MAX_SIMPLE_KEY_LENGTH: usize = 128;

/// Output layout knobs, validated by [`Emitter::with_settings`].
#[derive(Debug, Clone)]
pub struct EmitterSettings {
    /// Indentation step, between [`MIN_BEST_INDENT`] and [`MAX_BEST_INDENT`].
    pub best_indent: usize,
    /// Preferred line width; must exceed `2 * best_indent`. Long lines break
    /// at the next safe space past this column.
    pub best_width: usize,
    /// Write every document explicitly delimited, every collection in flow
    /// style, and every scalar double-quoted.
    pub canonical: bool,
    /// Keep block sequences nested in a mapping at the mapping's own
    /// indentation instead of indenting them one more step.
    pub force_indent_less: bool,
    /// Write non-ASCII characters raw. When false they count as special
    /// characters and force double-quoted, escaped output.
    pub allow_unicode: bool,
}

impl Default for EmitterSettings {
    fn default() -> Self {
        Self {
            best_indent: MIN_BEST_INDENT,
            best_width: usize::MAX,
            canonical: false,
            force_indent_less: false,
            allow_unicode: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    StreamStart,
    FirstDocumentStart,
    DocumentStart,
    DocumentContent,
    DocumentEnd,
    FlowSequenceFirstItem,
    FlowSequenceItem,
    FlowMappingFirstKey,
    FlowMappingKey,
    FlowMappingSimpleValue,
    FlowMappingValue,
    BlockSequenceFirstItem,
    BlockSequenceItem,
    BlockMappingFirstKey,
    BlockMappingKey,
    BlockMappingSimpleValue,
    BlockMappingValue,
    End,
}

#[derive(Debug, Default)]
struct AnchorData {
    anchor: Option<String>,
    is_alias: bool,
}

#[derive(Debug, Default)]
struct TagData {
    handle: Option<String>,
    suffix: Option<String>,
}

#[derive(Debug, Default)]
struct ScalarData {
    value: String,
    multiline: bool,
    flow_plain_allowed: bool,
    block_plain_allowed: bool,
    single_quoted_allowed: bool,
    fold_allowed: bool,
    literal_allowed: bool,
    style: ScalarStyle,
}

/// Writes an event stream as YAML text.
///
/// Events are pushed one at a time with [`emit`](Emitter::emit); the emitter
/// holds back just enough of them to make its layout decisions and writes the
/// rest through to the output. The stream must be well formed
/// (`STREAM-START document* STREAM-END`); anything else is reported as an
/// [`Error::Emitter`] contract violation.
pub struct Emitter<W> {
    output: W,

    canonical: bool,
    best_indent: usize,
    best_width: usize,
    force_indent_less: bool,
    allow_unicode: bool,

    state: State,
    states: Vec<State>,
    events: VecDeque<Event>,
    indents: Vec<i64>,
    tag_directives: TagDirectiveCollection,
    indent: i64,
    flow_level: usize,
    mapping_context: bool,
    simple_key_context: bool,
    root_context: bool,

    column: usize,
    whitespace: bool,
    indentation: bool,
    open_ended: bool,

    anchor_data: AnchorData,
    tag_data: TagData,
    scalar_data: ScalarData,
}

impl<W: Write> Emitter<W> {
    /// An emitter with default settings.
    pub fn new(output: W) -> Self {
        Self {
            output,
            canonical: false,
            best_indent: MIN_BEST_INDENT,
            best_width: usize::MAX,
            force_indent_less: false,
            allow_unicode: true,
            state: State::StreamStart,
            states: Vec::new(),
            events: VecDeque::new(),
            indents: Vec::new(),
            tag_directives: TagDirectiveCollection::new(),
            indent: -1,
            flow_level: 0,
            mapping_context: false,
            simple_key_context: false,
            root_context: false,
            column: 0,
            whitespace: true,
            indentation: true,
            open_ended: false,
            anchor_data: AnchorData::default(),
            tag_data: TagData::default(),
            scalar_data: ScalarData::default(),
        }
    }

    /// An emitter with explicit settings.
    pub fn with_settings(output: W, settings: EmitterSettings) -> Result<Self> {
        if settings.best_indent < MIN_BEST_INDENT || settings.best_indent > MAX_BEST_INDENT {
            return Err(Error::emitter(format!(
                "the indentation step must be between {} and {}",
                MIN_BEST_INDENT, MAX_BEST_INDENT
            )));
        }
        if settings.best_width <= settings.best_indent * 2 {
            return Err(Error::emitter(
                "the preferred width must be greater than twice the indentation step",
            ));
        }
        let mut emitter = Self::new(output);
        emitter.best_indent = settings.best_indent;
        emitter.best_width = settings.best_width;
        emitter.canonical = settings.canonical;
        emitter.force_indent_less = settings.force_indent_less;
        emitter.allow_unicode = settings.allow_unicode;
        Ok(emitter)
    }

    /// Consume the emitter and return the output it was writing to.
    pub fn into_inner(self) -> W {
        self.output
    }

    /// Push one event. Text is written as soon as enough lookahead has
    /// accumulated for the layout decisions the event depends on.
    pub fn emit(&mut self, event: impl Into<Event>) -> Result<()> {
        self.events.push_back(event.into());

        while !self.need_more_events() {
            let current = match self.events.front() {
                Some(event) => event.clone(),
                None => break,
            };
            self.analyze_event(&current);
            self.state_machine(current)?;

            // The current event stays queued through the state machine so
            // that the empty-collection and simple-key checks can see it.
            self.events.pop_front();
        }
        Ok(())
    }

    /// Whether emission must wait for more events: one extra for
    /// DOCUMENT-START, two for SEQUENCE-START, three for MAPPING-START,
    /// unless the buffered events already close the opened node.
    fn need_more_events(&self) -> bool {
        let accumulate = match self.events.front() {
            None => return true,
            Some(Event::DocumentStart(_)) => 1,
            Some(Event::SequenceStart(_)) => 2,
            Some(Event::MappingStart(_)) => 3,
            Some(_) => return false,
        };

        if self.events.len() > accumulate {
            return false;
        }

        let mut level = 0;
        for event in &self.events {
            level += event.nesting_increase();
            if level == 0 {
                return false;
            }
        }
        true
    }

    fn analyze_event(&mut self, event: &Event) {
        self.anchor_data = AnchorData::default();
        self.tag_data = TagData::default();

        match event {
            Event::Alias(alias) => {
                self.anchor_data.anchor = Some(alias.anchor.clone());
                self.anchor_data.is_alias = true;
            }
            Event::Scalar(scalar) => {
                self.analyze_scalar(&scalar.value);
                self.anchor_data.anchor = scalar.anchor.clone();
                let tag_needed = self.canonical
                    || (!scalar.plain_implicit && !scalar.quoted_implicit);
                if let Some(tag) = scalar.tag.as_deref().filter(|tag| !tag.is_empty()) {
                    if tag_needed {
                        self.analyze_tag(tag);
                    }
                }
            }
            Event::SequenceStart(sequence) => {
                self.anchor_data.anchor = sequence.anchor.clone();
                if let Some(tag) = sequence.tag.as_deref().filter(|tag| !tag.is_empty()) {
                    if self.canonical || !sequence.implicit {
                        self.analyze_tag(tag);
                    }
                }
            }
            Event::MappingStart(mapping) => {
                self.anchor_data.anchor = mapping.anchor.clone();
                if let Some(tag) = mapping.tag.as_deref().filter(|tag| !tag.is_empty()) {
                    if self.canonical || !mapping.implicit {
                        self.analyze_tag(tag);
                    }
                }
            }
            _ => {}
        }
    }

    /// Decide which styles can represent `value`.
    fn analyze_scalar(&mut self, value: &str) {
        self.scalar_data.value = value.to_string();

        if value.is_empty() {
            self.scalar_data.multiline = false;
            self.scalar_data.flow_plain_allowed = false;
            self.scalar_data.block_plain_allowed = true;
            self.scalar_data.single_quoted_allowed = true;
            self.scalar_data.fold_allowed = false;
            self.scalar_data.literal_allowed = false;
            return;
        }

        let mut block_indicators = false;
        let mut flow_indicators = false;
        let mut line_breaks = false;
        let mut special_characters = false;
        let mut tabs = false;

        let mut leading_space = false;
        let mut leading_break = false;
        let mut trailing_space = false;
        let mut trailing_break = false;
        let mut break_space = false;
        let mut space_break = false;

        let mut previous_space = false;
        let mut previous_break = false;

        if value.starts_with("---") || value.starts_with("...") {
            block_indicators = true;
            flow_indicators = true;
        }

        let chars: Vec<char> = value.chars().collect();
        let mut preceded_by_whitespace = true;
        let mut followed_by_whitespace = chars
            .get(1)
            .map_or(true, |&next| is_blank_break_or_zero(next));

        for index in 0..chars.len() {
            let character = chars[index];
            let is_first = index == 0;
            let is_last = index == chars.len() - 1;

            if is_first {
                if "#,[]{}&*!|>\\\"%@`".contains(character) {
                    flow_indicators = true;
                    block_indicators = true;
                }
                if character == '?' || character == ':' {
                    flow_indicators = true;
                    if followed_by_whitespace {
                        block_indicators = true;
                    }
                }
                if character == '-' && followed_by_whitespace {
                    flow_indicators = true;
                    block_indicators = true;
                }
            } else {
                if ",?[]{}".contains(character) {
                    flow_indicators = true;
                }
                if character == ':' {
                    flow_indicators = true;
                    if followed_by_whitespace {
                        block_indicators = true;
                    }
                }
                if character == '#' && preceded_by_whitespace {
                    flow_indicators = true;
                    block_indicators = true;
                }
            }

            if !is_printable_char(character) || (!character.is_ascii() && !self.allow_unicode) {
                special_characters = true;
            }
            if character == '\t' {
                tabs = true;
            }
            if is_break_char(character) {
                line_breaks = true;
            }

            if character == ' ' {
                if is_first {
                    leading_space = true;
                }
                if is_last {
                    trailing_space = true;
                }
                if previous_break {
                    break_space = true;
                }
                previous_space = true;
                previous_break = false;
            } else if is_break_char(character) {
                if is_first {
                    leading_break = true;
                }
                if is_last {
                    trailing_break = true;
                }
                if previous_space {
                    space_break = true;
                }
                previous_space = false;
                previous_break = true;
            } else {
                previous_space = false;
                previous_break = false;
            }

            preceded_by_whitespace = is_blank_break_or_zero(character);
            followed_by_whitespace = chars
                .get(index + 2)
                .map_or(true, |&next| is_blank_break_or_zero(next));
        }

        self.scalar_data.multiline = line_breaks;

        self.scalar_data.flow_plain_allowed = true;
        self.scalar_data.block_plain_allowed = true;
        self.scalar_data.single_quoted_allowed = true;
        self.scalar_data.fold_allowed = true;
        self.scalar_data.literal_allowed = true;

        if leading_space || leading_break || trailing_space || trailing_break {
            self.scalar_data.flow_plain_allowed = false;
            self.scalar_data.block_plain_allowed = false;
        }
        if trailing_space {
            self.scalar_data.fold_allowed = false;
        }
        if break_space {
            self.scalar_data.flow_plain_allowed = false;
            self.scalar_data.block_plain_allowed = false;
            self.scalar_data.single_quoted_allowed = false;
        }
        if space_break || special_characters || tabs {
            self.scalar_data.flow_plain_allowed = false;
            self.scalar_data.block_plain_allowed = false;
            self.scalar_data.single_quoted_allowed = false;
            self.scalar_data.fold_allowed = false;
        }
        if special_characters {
            self.scalar_data.literal_allowed = false;
        }
        if line_breaks {
            self.scalar_data.flow_plain_allowed = false;
            self.scalar_data.block_plain_allowed = false;
        }
        if flow_indicators {
            self.scalar_data.flow_plain_allowed = false;
        }
        if block_indicators {
            self.scalar_data.block_plain_allowed = false;
        }
    }

    /// Split a full tag into the shortest handle + suffix form the current
    /// `%TAG` directives allow, or keep it whole for verbatim output.
    fn analyze_tag(&mut self, tag: &str) {
        let mut handle = tag.to_string();
        let mut suffix = None;
        for directive in self.tag_directives.iter() {
            if let Some(rest) = tag.strip_prefix(directive.prefix.as_str()) {
                handle = directive.handle.clone();
                suffix = Some(rest.to_string());
                break;
            }
        }
        self.tag_data.handle = Some(handle);
        self.tag_data.suffix = suffix;
    }

    fn state_machine(&mut self, event: Event) -> Result<()> {
        match self.state {
            State::StreamStart => self.emit_stream_start(event),
            State::FirstDocumentStart => self.emit_document_start(event, true),
            State::DocumentStart => self.emit_document_start(event, false),
            State::DocumentContent => self.emit_document_content(event),
            State::DocumentEnd => self.emit_document_end(event),
            State::FlowSequenceFirstItem => self.emit_flow_sequence_item(event, true),
            State::FlowSequenceItem => self.emit_flow_sequence_item(event, false),
            State::FlowMappingFirstKey => self.emit_flow_mapping_key(event, true),
            State::FlowMappingKey => self.emit_flow_mapping_key(event, false),
            State::FlowMappingSimpleValue => self.emit_flow_mapping_value(event, true),
            State::FlowMappingValue => self.emit_flow_mapping_value(event, false),
            State::BlockSequenceFirstItem => self.emit_block_sequence_item(event, true),
            State::BlockSequenceItem => self.emit_block_sequence_item(event, false),
            State::BlockMappingFirstKey => self.emit_block_mapping_key(event, true),
            State::BlockMappingKey => self.emit_block_mapping_key(event, false),
            State::BlockMappingSimpleValue => self.emit_block_mapping_value(event, true),
            State::BlockMappingValue => self.emit_block_mapping_value(event, false),
            State::End => Err(Error::emitter("expected nothing after STREAM-END")),
        }
    }

    fn pop_state(&mut self) -> State {
        self.states.pop().unwrap_or(State::End)
    }

    fn emit_stream_start(&mut self, event: Event) -> Result<()> {
        if !matches!(event, Event::StreamStart(_)) {
            return Err(Error::emitter("expected STREAM-START"));
        }

        self.indent = -1;
        self.column = 0;
        self.whitespace = true;
        self.indentation = true;

        self.state = State::FirstDocumentStart;
        Ok(())
    }

    fn emit_document_start(&mut self, event: Event, is_first: bool) -> Result<()> {
        match event {
            Event::DocumentStart(document) => {
                let mut implicit = document.implicit && is_first && !self.canonical;

                if document.version.is_some() && self.open_ended {
                    self.write_indicator("...", true, false, false)?;
                    self.write_indent()?;
                }

                if let Some(version) = document.version {
                    if !version.is_compatible() {
                        return Err(Error::emitter("incompatible %YAML directive"));
                    }
                    implicit = false;
                    self.write_indicator("%YAML", true, false, false)?;
                    let version = format!("{}.{}", MAJOR_VERSION, MINOR_VERSION);
                    self.write_indicator(&version, true, false, false)?;
                    self.write_indent()?;
                }

                for directive in document.tags.iter() {
                    self.append_tag_directive(directive.clone(), false)?;
                }
                for directive in default_tag_directives() {
                    self.append_tag_directive(directive, true)?;
                }

                if !document.tags.is_empty() && !document.tags.is_default() {
                    implicit = false;
                    for directive in document.tags.iter() {
                        self.write_indicator("%TAG", true, false, false)?;
                        self.write_tag_handle(&directive.handle)?;
                        self.write_tag_content(&directive.prefix, true)?;
                        self.write_indent()?;
                    }
                }

                if self.check_empty_document() {
                    implicit = false;
                }

                if !implicit {
                    self.write_indent()?;
                    self.write_indicator("---", true, false, false)?;
                    if self.canonical {
                        self.write_indent()?;
                    }
                }

                self.state = State::DocumentContent;
                Ok(())
            }
            Event::StreamEnd(_) => {
                if self.open_ended {
                    self.write_indicator("...", true, false, false)?;
                    self.write_indent()?;
                }
                self.state = State::End;
                Ok(())
            }
            _ => Err(Error::emitter("expected DOCUMENT-START or STREAM-END")),
        }
    }

    /// Whether the buffered document holds nothing but an empty scalar.
    fn check_empty_document(&self) -> bool {
        match self.events.get(1) {
            Some(Event::Scalar(scalar)) => scalar.value.is_empty(),
            _ => false,
        }
    }

    fn check_empty_sequence(&self) -> bool {
        matches!(
            (self.events.front(), self.events.get(1)),
            (Some(Event::SequenceStart(_)), Some(Event::SequenceEnd(_)))
        )
    }

    fn check_empty_mapping(&self) -> bool {
        matches!(
            (self.events.front(), self.events.get(1)),
            (Some(Event::MappingStart(_)), Some(Event::MappingEnd(_)))
        )
    }

    fn append_tag_directive(&mut self, directive: TagDirective, allow_duplicates: bool) -> Result<()> {
        if self.tag_directives.contains_handle(&directive.handle) {
            if allow_duplicates {
                return Ok(());
            }
            return Err(Error::emitter("duplicate %TAG directive"));
        }
        self.tag_directives.add(directive);
        Ok(())
    }

    fn emit_document_content(&mut self, event: Event) -> Result<()> {
        self.states.push(State::DocumentEnd);
        self.emit_node(event, true, false, false)
    }

    fn emit_document_end(&mut self, event: Event) -> Result<()> {
        match event {
            Event::DocumentEnd(document) => {
                self.write_indent()?;
                if !document.implicit {
                    self.write_indicator("...", true, false, false)?;
                    self.write_indent()?;
                }
                self.state = State::DocumentStart;
                self.tag_directives.clear();
                Ok(())
            }
            _ => Err(Error::emitter("expected DOCUMENT-END")),
        }
    }

    fn emit_node(
        &mut self,
        event: Event,
        is_root: bool,
        is_mapping: bool,
        is_simple_key: bool,
    ) -> Result<()> {
        self.root_context = is_root;
        self.mapping_context = is_mapping;
        self.simple_key_context = is_simple_key;

        match event {
            Event::Alias(_) => self.emit_alias(),
            Event::Scalar(scalar) => self.emit_scalar(&scalar),
            Event::SequenceStart(sequence) => self.emit_sequence_start(sequence.style),
            Event::MappingStart(mapping) => self.emit_mapping_start(mapping.style),
            other => Err(Error::emitter(format!(
                "expected SCALAR, SEQUENCE-START, MAPPING-START, or ALIAS, got {}",
                other.description()
            ))),
        }
    }

    fn emit_alias(&mut self) -> Result<()> {
        self.process_anchor()?;
        self.state = self.pop_state();
        Ok(())
    }

    fn emit_scalar(&mut self, scalar: &Scalar) -> Result<()> {
        self.select_scalar_style(scalar)?;
        self.process_anchor()?;
        self.process_tag()?;
        self.increase_indent(true, false);
        self.process_scalar()?;

        self.indent = self.indents.pop().unwrap_or(-1);
        self.state = self.pop_state();
        Ok(())
    }

    fn emit_sequence_start(&mut self, style: CollectionStyle) -> Result<()> {
        self.process_anchor()?;
        self.process_tag()?;

        if self.flow_level != 0
            || self.canonical
            || style == CollectionStyle::Flow
            || self.check_empty_sequence()
        {
            self.state = State::FlowSequenceFirstItem;
        } else {
            self.state = State::BlockSequenceFirstItem;
        }
        Ok(())
    }

    fn emit_mapping_start(&mut self, style: CollectionStyle) -> Result<()> {
        self.process_anchor()?;
        self.process_tag()?;

        if self.flow_level != 0
            || self.canonical
            || style == CollectionStyle::Flow
            || self.check_empty_mapping()
        {
            self.state = State::FlowMappingFirstKey;
        } else {
            self.state = State::BlockMappingFirstKey;
        }
        Ok(())
    }

    /// Narrow the requested style to one the analyzed value admits.
    fn select_scalar_style(&mut self, scalar: &Scalar) -> Result<()> {
        let mut style = scalar.style;
        let no_tag = self.tag_data.handle.is_none() && self.tag_data.suffix.is_none();

        if no_tag && !scalar.plain_implicit && !scalar.quoted_implicit {
            return Err(Error::emitter(
                "neither a tag nor an implicitness flag is specified",
            ));
        }

        if style == ScalarStyle::Any {
            style = if self.scalar_data.multiline {
                ScalarStyle::Literal
            } else {
                ScalarStyle::Plain
            };
        }

        if self.canonical {
            style = ScalarStyle::DoubleQuoted;
        }

        // A one-character multiline scalar is just a break; block styles
        // would tangle it with their own trailing break handling.
        if (self.simple_key_context || scalar.value.chars().count() <= 1)
            && self.scalar_data.multiline
        {
            style = ScalarStyle::DoubleQuoted;
        }

        if style == ScalarStyle::Plain {
            if (self.flow_level != 0 && !self.scalar_data.flow_plain_allowed)
                || (self.flow_level == 0 && !self.scalar_data.block_plain_allowed)
            {
                style = ScalarStyle::SingleQuoted;
            }
            if self.scalar_data.value.is_empty()
                && (self.flow_level != 0 || self.simple_key_context)
            {
                style = ScalarStyle::SingleQuoted;
            }
            if no_tag && !scalar.plain_implicit {
                style = ScalarStyle::SingleQuoted;
            }
        }

        if style == ScalarStyle::SingleQuoted && !self.scalar_data.single_quoted_allowed {
            style = ScalarStyle::DoubleQuoted;
        }

        if style == ScalarStyle::Literal || style == ScalarStyle::Folded {
            if (style == ScalarStyle::Folded && !self.scalar_data.fold_allowed)
                || (style == ScalarStyle::Literal && !self.scalar_data.literal_allowed)
                || self.flow_level != 0
                || self.simple_key_context
            {
                style = ScalarStyle::DoubleQuoted;
            }
        }

        self.scalar_data.style = style;
        Ok(())
    }

    fn process_anchor(&mut self) -> Result<()> {
        if let Some(anchor) = self.anchor_data.anchor.clone() {
            let indicator = if self.anchor_data.is_alias { "*" } else { "&" };
            self.write_indicator(indicator, true, false, false)?;
            self.write_anchor(&anchor)?;
        }
        Ok(())
    }

    fn process_tag(&mut self) -> Result<()> {
        match (self.tag_data.handle.clone(), self.tag_data.suffix.clone()) {
            (Some(handle), suffix) => {
                self.write_tag_handle(&handle)?;
                if let Some(suffix) = suffix {
                    self.write_tag_content(&suffix, false)?;
                }
            }
            (None, Some(suffix)) => {
                self.write_indicator("!<", true, false, false)?;
                self.write_tag_content(&suffix, false)?;
                self.write_indicator(">", false, false, false)?;
            }
            (None, None) => {}
        }
        Ok(())
    }

    fn process_scalar(&mut self) -> Result<()> {
        let value = self.scalar_data.value.clone();
        let allow_breaks = !self.simple_key_context;
        match self.scalar_data.style {
            ScalarStyle::Plain => self.write_plain_scalar(&value, allow_breaks),
            ScalarStyle::SingleQuoted => self.write_single_quoted_scalar(&value, allow_breaks),
            ScalarStyle::DoubleQuoted => self.write_double_quoted_scalar(&value, allow_breaks),
            ScalarStyle::Literal => self.write_literal_scalar(&value),
            ScalarStyle::Folded => self.write_folded_scalar(&value),
            ScalarStyle::Any => Err(Error::emitter("no scalar style was selected")),
        }
    }

    /// Whether the buffered node is short and simple enough to stand before
    /// the `:` of a mapping entry without the explicit `?` form.
    fn check_simple_key(&self) -> bool {
        let anchor_length = self.anchor_data.anchor.as_deref().map_or(0, str::len);
        let tag_length = self.tag_data.handle.as_deref().map_or(0, str::len)
            + self.tag_data.suffix.as_deref().map_or(0, str::len);

        let length = match self.events.front() {
            Some(Event::Alias(_)) => anchor_length,
            Some(Event::Scalar(_)) => {
                if self.scalar_data.multiline {
                    return false;
                }
                anchor_length + tag_length + self.scalar_data.value.len()
            }
            Some(Event::SequenceStart(_)) => {
                if !self.check_empty_sequence() {
                    return false;
                }
                anchor_length + tag_length
            }
            Some(Event::MappingStart(_)) => {
                if !self.check_empty_mapping() {
                    return false;
                }
                anchor_length + tag_length
            }
            _ => return false,
        };

        length <= MAX_SIMPLE_KEY_LENGTH
    }

    fn emit_flow_sequence_item(&mut self, event: Event, is_first: bool) -> Result<()> {
        if is_first {
            self.write_indicator("[", true, true, false)?;
            self.increase_indent(true, false);
            self.flow_level += 1;
        }

        if matches!(event, Event::SequenceEnd(_)) {
            self.flow_level -= 1;
            self.indent = self.indents.pop().unwrap_or(-1);
            if self.canonical && !is_first {
                self.write_indicator(",", false, false, false)?;
                self.write_indent()?;
            }
            self.write_indicator("]", false, false, false)?;
            self.state = self.pop_state();
            return Ok(());
        }

        if !is_first {
            self.write_indicator(",", false, false, false)?;
        }
        if self.canonical || self.column > self.best_width {
            self.write_indent()?;
        }

        self.states.push(State::FlowSequenceItem);
        self.emit_node(event, false, false, false)
    }

    fn emit_flow_mapping_key(&mut self, event: Event, is_first: bool) -> Result<()> {
        if is_first {
            self.write_indicator("{", true, true, false)?;
            self.increase_indent(true, false);
            self.flow_level += 1;
        }

        if matches!(event, Event::MappingEnd(_)) {
            self.flow_level -= 1;
            self.indent = self.indents.pop().unwrap_or(-1);
            if self.canonical && !is_first {
                self.write_indicator(",", false, false, false)?;
                self.write_indent()?;
            }
            self.write_indicator("}", false, false, false)?;
            self.state = self.pop_state();
            return Ok(());
        }

        if !is_first {
            self.write_indicator(",", false, false, false)?;
        }
        if self.canonical || self.column > self.best_width {
            self.write_indent()?;
        }

        if !self.canonical && self.check_simple_key() {
            self.states.push(State::FlowMappingSimpleValue);
            self.emit_node(event, false, true, true)
        } else {
            self.write_indicator("?", true, false, false)?;
            self.states.push(State::FlowMappingValue);
            self.emit_node(event, false, true, false)
        }
    }

    fn emit_flow_mapping_value(&mut self, event: Event, is_simple: bool) -> Result<()> {
        if is_simple {
            self.write_indicator(":", false, false, false)?;
        } else {
            if self.canonical || self.column > self.best_width {
                self.write_indent()?;
            }
            self.write_indicator(":", true, false, false)?;
        }
        self.states.push(State::FlowMappingKey);
        self.emit_node(event, false, true, false)
    }

    fn emit_block_sequence_item(&mut self, event: Event, is_first: bool) -> Result<()> {
        if is_first {
            self.increase_indent(false, self.mapping_context && !self.indentation);
        }

        if matches!(event, Event::SequenceEnd(_)) {
            self.indent = self.indents.pop().unwrap_or(-1);
            self.state = self.pop_state();
            return Ok(());
        }

        self.write_indent()?;
        self.write_indicator("-", true, false, true)?;
        self.states.push(State::BlockSequenceItem);
        self.emit_node(event, false, false, false)
    }

    fn emit_block_mapping_key(&mut self, event: Event, is_first: bool) -> Result<()> {
        if is_first {
            self.increase_indent(false, false);
        }

        if matches!(event, Event::MappingEnd(_)) {
            self.indent = self.indents.pop().unwrap_or(-1);
            self.state = self.pop_state();
            return Ok(());
        }

        self.write_indent()?;

        if self.check_simple_key() {
            self.states.push(State::BlockMappingSimpleValue);
            self.emit_node(event, false, true, true)
        } else {
            self.write_indicator("?", true, false, true)?;
            self.states.push(State::BlockMappingValue);
            self.emit_node(event, false, true, false)
        }
    }

    fn emit_block_mapping_value(&mut self, event: Event, is_simple: bool) -> Result<()> {
        if is_simple {
            self.write_indicator(":", false, false, false)?;
        } else {
            self.write_indent()?;
            self.write_indicator(":", true, false, true)?;
        }
        self.states.push(State::BlockMappingKey);
        self.emit_node(event, false, true, false)
    }

    fn increase_indent(&mut self, is_flow: bool, is_indentless: bool) {
        self.indents.push(self.indent);

        if self.indent < 0 {
            self.indent = if is_flow { self.best_indent as i64 } else { 0 };
        } else if !is_indentless || !self.force_indent_less {
            self.indent += self.best_indent as i64;
        }
    }

    fn write_raw(&mut self, value: char) -> Result<()> {
        self.output.write_char(value)?;
        self.column += 1;
        Ok(())
    }

    fn write_raw_str(&mut self, value: &str) -> Result<()> {
        self.output.write_str(value)?;
        self.column += value.chars().count();
        Ok(())
    }

    fn write_break(&mut self) -> Result<()> {
        self.output.write_char('\n')?;
        self.column = 0;
        Ok(())
    }

    fn write_indicator(
        &mut self,
        indicator: &str,
        need_whitespace: bool,
        whitespace: bool,
        indentation: bool,
    ) -> Result<()> {
        if need_whitespace && !self.whitespace {
            self.write_raw(' ')?;
        }

        self.write_raw_str(indicator)?;

        self.whitespace = whitespace;
        self.indentation &= indentation;
        self.open_ended = false;
        Ok(())
    }

    fn write_indent(&mut self) -> Result<()> {
        let current_indent = self.indent.max(0) as usize;

        if !self.indentation
            || self.column > current_indent
            || (self.column == current_indent && !self.whitespace)
        {
            self.write_break()?;
        }
        while self.column < current_indent {
            self.write_raw(' ')?;
        }

        self.whitespace = true;
        self.indentation = true;
        Ok(())
    }

    fn write_anchor(&mut self, value: &str) -> Result<()> {
        self.write_raw_str(value)?;
        self.whitespace = false;
        self.indentation = false;
        Ok(())
    }

    fn write_tag_handle(&mut self, value: &str) -> Result<()> {
        if !self.whitespace {
            self.write_raw(' ')?;
        }
        self.write_raw_str(value)?;
        self.whitespace = false;
        self.indentation = false;
        Ok(())
    }

    fn write_tag_content(&mut self, value: &str, needs_whitespace: bool) -> Result<()> {
        if needs_whitespace && !self.whitespace {
            self.write_raw(' ')?;
        }
        self.write_raw_str(&url_encode(value))?;
        self.whitespace = false;
        self.indentation = false;
        Ok(())
    }

    fn write_plain_scalar(&mut self, value: &str, allow_breaks: bool) -> Result<()> {
        if !self.whitespace {
            self.write_raw(' ')?;
        }

        let chars: Vec<char> = value.chars().collect();
        let mut previous_space = false;
        let mut previous_break = false;

        for index in 0..chars.len() {
            let character = chars[index];

            if character == ' ' {
                if allow_breaks
                    && !previous_space
                    && self.column > self.best_width
                    && chars.get(index + 1).map_or(false, |&next| next != ' ')
                {
                    self.write_indent()?;
                } else {
                    self.write_raw(character)?;
                }
                previous_space = true;
            } else if is_break_char(character) {
                if !previous_break && character == '\n' {
                    self.write_break()?;
                }
                self.write_break()?;
                self.indentation = true;
                previous_break = true;
            } else {
                if previous_break {
                    self.write_indent()?;
                }
                self.write_raw(character)?;
                self.indentation = false;
                previous_space = false;
                previous_break = false;
            }
        }

        self.whitespace = false;
        self.indentation = false;

        if self.root_context {
            self.open_ended = true;
        }
        Ok(())
    }

    fn write_single_quoted_scalar(&mut self, value: &str, allow_breaks: bool) -> Result<()> {
        self.write_indicator("'", true, false, false)?;

        let chars: Vec<char> = value.chars().collect();
        let mut previous_space = false;
        let mut previous_break = false;

        for index in 0..chars.len() {
            let character = chars[index];

            if character == ' ' {
                if allow_breaks
                    && !previous_space
                    && self.column > self.best_width
                    && index != 0
                    && chars.get(index + 1).map_or(false, |&next| next != ' ')
                {
                    self.write_indent()?;
                } else {
                    self.write_raw(character)?;
                }
                previous_space = true;
            } else if is_break_char(character) {
                if !previous_break && character == '\n' {
                    self.write_break()?;
                }
                self.write_break()?;
                self.indentation = true;
                previous_break = true;
            } else {
                if previous_break {
                    self.write_indent()?;
                }
                if character == '\'' {
                    self.write_raw(character)?;
                }
                self.write_raw(character)?;
                self.indentation = false;
                previous_space = false;
                previous_break = false;
            }
        }

        self.write_indicator("'", false, false, false)?;
        self.whitespace = false;
        self.indentation = false;
        Ok(())
    }

    fn write_double_quoted_scalar(&mut self, value: &str, allow_breaks: bool) -> Result<()> {
        self.write_indicator("\"", true, false, false)?;

        let chars: Vec<char> = value.chars().collect();
        let mut previous_space = false;

        for index in 0..chars.len() {
            let character = chars[index];

            if !is_printable_char(character)
                || (!character.is_ascii() && !self.allow_unicode)
                || is_break_char(character)
                || character == '\t'
                || character == '"'
                || character == '\\'
            {
                self.write_raw('\\')?;
                match character {
                    '\0' => self.write_raw('0')?,
                    '\u{7}' => self.write_raw('a')?,
                    '\u{8}' => self.write_raw('b')?,
                    '\t' => self.write_raw('t')?,
                    '\n' => self.write_raw('n')?,
                    '\u{b}' => self.write_raw('v')?,
                    '\u{c}' => self.write_raw('f')?,
                    '\r' => self.write_raw('r')?,
                    '\u{1b}' => self.write_raw('e')?,
                    '"' => self.write_raw('"')?,
                    '\\' => self.write_raw('\\')?,
                    '\u{85}' => self.write_raw('N')?,
                    '\u{a0}' => self.write_raw('_')?,
                    '\u{2028}' => self.write_raw('L')?,
                    '\u{2029}' => self.write_raw('P')?,
                    other => {
                        let code = other as u32;
                        if code <= 0xFF {
                            self.write_raw('x')?;
                            self.write_raw_str(&format!("{:02X}", code))?;
                        } else if code <= 0xFFFF {
                            self.write_raw('u')?;
                            self.write_raw_str(&format!("{:04X}", code))?;
                        } else {
                            self.write_raw('U')?;
                            self.write_raw_str(&format!("{:08X}", code))?;
                        }
                    }
                }
                previous_space = false;
            } else if character == ' ' {
                if allow_breaks
                    && !previous_space
                    && self.column > self.best_width
                    && index > 0
                    && index + 1 < chars.len()
                {
                    self.write_indent()?;
                    if chars[index + 1] == ' ' {
                        self.write_raw('\\')?;
                    }
                } else {
                    self.write_raw(character)?;
                }
                previous_space = true;
            } else {
                self.write_raw(character)?;
                previous_space = false;
            }
        }

        self.write_indicator("\"", false, false, false)?;
        self.whitespace = false;
        self.indentation = false;
        Ok(())
    }

    fn write_literal_scalar(&mut self, value: &str) -> Result<()> {
        self.write_indicator("|", true, false, false)?;
        let chars: Vec<char> = value.chars().collect();
        self.write_block_scalar_hints(&chars)?;
        self.write_break()?;

        self.indentation = true;
        self.whitespace = true;

        let mut previous_break = true;
        let mut index = 0;
        while index < chars.len() {
            let character = chars[index];

            // CRLF counts as a single break.
            if character == '\r' && chars.get(index + 1) == Some(&'\n') {
                index += 1;
                continue;
            }
            if is_break_char(character) {
                self.write_break()?;
                self.indentation = true;
                previous_break = true;
            } else {
                if previous_break {
                    self.write_indent()?;
                }
                self.write_raw(character)?;
                self.indentation = false;
                previous_break = false;
            }
            index += 1;
        }
        Ok(())
    }

    fn write_folded_scalar(&mut self, value: &str) -> Result<()> {
        self.write_indicator(">", true, false, false)?;
        let chars: Vec<char> = value.chars().collect();
        self.write_block_scalar_hints(&chars)?;
        self.write_break()?;

        self.indentation = true;
        self.whitespace = true;

        let mut previous_break = true;
        let mut leading_spaces = true;
        let mut index = 0;
        while index < chars.len() {
            let character = chars[index];

            // CRLF counts as a single break.
            if character == '\r' && chars.get(index + 1) == Some(&'\n') {
                index += 1;
                continue;
            }
            if is_break_char(character) {
                // A break between two non-blank lines folds back into a
                // space on input, so it has to be doubled on output.
                if !previous_break && !leading_spaces && character == '\n' {
                    let mut ahead = index;
                    while ahead < chars.len() && is_break_char(chars[ahead]) {
                        ahead += 1;
                    }
                    if ahead < chars.len()
                        && !is_blank_char(chars[ahead])
                        && !is_break_char(chars[ahead])
                    {
                        self.write_break()?;
                    }
                }
                self.write_break()?;
                self.indentation = true;
                previous_break = true;
            } else {
                if previous_break {
                    self.write_indent()?;
                    leading_spaces = is_blank_char(character);
                }
                if !previous_break
                    && character == ' '
                    && chars.get(index + 1).map_or(false, |&next| next != ' ')
                    && self.column > self.best_width
                {
                    self.write_indent()?;
                } else {
                    self.write_raw(character)?;
                }
                self.indentation = false;
                previous_break = false;
            }
            index += 1;
        }
        Ok(())
    }

    /// Write the indentation and chomping indicators the scanner reads back.
    fn write_block_scalar_hints(&mut self, chars: &[char]) -> Result<()> {
        if chars
            .first()
            .map_or(false, |&first| is_blank_char(first) || is_break_char(first))
        {
            let hint = self.best_indent.to_string();
            self.write_indicator(&hint, false, false, false)?;
        }

        self.open_ended = false;

        let last_is_break = chars.last().copied().map_or(false, is_break_char);
        if !last_is_break {
            self.write_indicator("-", false, false, false)?;
        } else if chars.len() == 1
            || chars
                .get(chars.len() - 2)
                .copied()
                .map_or(false, is_break_char)
        {
            self.open_ended = true;
            self.write_indicator("+", false, false, false)?;
        }
        Ok(())
    }
}

fn is_blank_break_or_zero(character: char) -> bool {
    character == '\0' || is_blank_char(character) || is_break_char(character)
}

/// Percent-encode the characters YAML does not allow raw in a tag.
fn url_encode(text: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";

    fn is_allowed(character: char) -> bool {
        character.is_ascii_alphanumeric() || "_-;?@=$~\\)]/:&+,.*([!".contains(character)
    }

    let mut encoded = String::with_capacity(text.len());
    let mut utf8 = [0u8; 4];
    for character in text.chars() {
        if is_allowed(character) {
            encoded.push(character);
        } else {
            for &byte in character.encode_utf8(&mut utf8).as_bytes() {
                encoded.push('%');
                encoded.push(HEX[(byte >> 4) as usize] as char);
                encoded.push(HEX[(byte & 0xF) as usize] as char);
            }
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{DocumentEnd, DocumentStart, Scalar, StreamEnd, StreamStart};
    use crate::parser::{EventSource, Parser};

    fn reemit(input: &str) -> String {
        let mut parser = Parser::new(input.chars());
        let mut emitter = Emitter::new(String::new());
        while let Some(event) = parser.next_event().unwrap() {
            emitter.emit(event).unwrap();
        }
        emitter.into_inner()
    }

    fn emit_events(events: Vec<Event>) -> String {
        let mut emitter = Emitter::new(String::new());
        for event in events {
            emitter.emit(event).unwrap();
        }
        emitter.into_inner()
    }

    fn document(node: Vec<Event>) -> Vec<Event> {
        let mut events: Vec<Event> = vec![
            StreamStart::default().into(),
            DocumentStart::new(None, TagDirectiveCollection::new(), true).into(),
        ];
        events.extend(node);
        events.push(DocumentEnd::new(true).into());
        events.push(StreamEnd::default().into());
        events
    }

    #[test]
    fn block_mapping() {
        assert_eq!(reemit("a: 1\nb: 2\n"), "a: 1\nb: 2\n");
    }

    #[test]
    fn block_sequence() {
        assert_eq!(reemit("- 1\n- 2\n"), "- 1\n- 2\n");
    }

    #[test]
    fn nested_block_mapping_is_indented() {
        assert_eq!(reemit("a:\n  b: 1\n"), "a:\n  b: 1\n");
    }

    #[test]
    fn sequence_under_a_mapping_key() {
        assert_eq!(reemit("a:\n  - 1\n  - 2\n"), "a:\n  - 1\n  - 2\n");
    }

    #[test]
    fn flow_collections_are_preserved() {
        assert_eq!(reemit("[1, 2]\n"), "[1, 2]\n");
        assert_eq!(reemit("{a: 1}\n"), "{a: 1}\n");
    }

    #[test]
    fn empty_collections_are_written_flow() {
        assert_eq!(reemit("a: []\n"), "a: []\n");
        assert_eq!(reemit("a: {}\n"), "a: {}\n");
    }

    #[test]
    fn literal_scalar_round_trips() {
        assert_eq!(reemit("a: |\n  one\n  two\n"), "a: |\n  one\n  two\n");
    }

    #[test]
    fn only_breaks_selects_literal_with_keep_chomping() {
        let scalar = Scalar::new(None, None, "\n\n", ScalarStyle::Any, true, false);
        let output = emit_events(document(vec![scalar.into()]));
        assert_eq!(output, "|2+\n\n\n");
    }

    #[test]
    fn multiline_any_style_becomes_literal() {
        let scalar = Scalar::new(None, None, "one\ntwo", ScalarStyle::Any, true, false);
        let output = emit_events(document(vec![scalar.into()]));
        assert_eq!(output, "|-\n  one\n  two\n");
    }

    #[test]
    fn plain_with_comment_lookalike_is_single_quoted() {
        let scalar = Scalar::plain("x #y");
        let output = emit_events(document(vec![scalar.into()]));
        assert_eq!(output, "'x #y'\n");
    }

    #[test]
    fn special_characters_force_double_quotes() {
        let scalar = Scalar::new(None, None, "a\tb\u{1}", ScalarStyle::Any, true, false);
        let output = emit_events(document(vec![scalar.into()]));
        assert_eq!(output, "\"a\\tb\\x01\"\n");

        let scalar = Scalar::new(None, None, "\u{b}x", ScalarStyle::Any, true, false);
        let output = emit_events(document(vec![scalar.into()]));
        assert_eq!(output, "\"\\vx\"\n");
    }

    #[test]
    fn ascii_only_output_escapes_non_ascii() {
        // A plain root scalar leaves the document open ended, so the stream
        // is closed with an explicit '...'.
        let output = emit_events(document(vec![Scalar::plain("h\u{e9}llo").into()]));
        assert_eq!(output, "h\u{e9}llo\n...\n");

        let mut emitter = Emitter::with_settings(
            String::new(),
            EmitterSettings {
                allow_unicode: false,
                ..EmitterSettings::default()
            },
        )
        .unwrap();
        for event in document(vec![Scalar::plain("h\u{e9}llo").into()]) {
            emitter.emit(event).unwrap();
        }
        assert_eq!(emitter.into_inner(), "\"h\\xE9llo\"\n");
    }

    #[test]
    fn multi_document_stream() {
        assert_eq!(reemit("one\n---\ntwo\n"), "one\n--- two\n...\n");
    }

    #[test]
    fn anchors_and_aliases_round_trip() {
        assert_eq!(reemit("a: &x 1\nb: *x\n"), "a: &x 1\nb: *x\n");
    }

    #[test]
    fn explicit_tag_uses_the_shortest_handle() {
        assert_eq!(reemit("!!str a\n"), "!!str a\n...\n");
    }

    #[test]
    fn tag_directives_are_written_and_applied() {
        let output = reemit("%TAG !e! tag:example.com,2000:\n---\n!e!foo bar\n");
        assert_eq!(
            output,
            "%TAG !e! tag:example.com,2000:\n\
             %TAG ! !\n\
             %TAG !! tag:yaml.org,2002:\n\
             --- !e!foo bar\n\
             ...\n"
        );
    }

    #[test]
    fn canonical_output_is_explicit_and_quoted() {
        let mut emitter = Emitter::with_settings(
            String::new(),
            EmitterSettings {
                canonical: true,
                ..EmitterSettings::default()
            },
        )
        .unwrap();
        for event in document(vec![Scalar::plain("a").into()]) {
            emitter.emit(event).unwrap();
        }
        assert_eq!(emitter.into_inner(), "---\n\"a\"\n");
    }

    #[test]
    fn long_plain_scalars_wrap_at_the_preferred_width() {
        let mut emitter = Emitter::with_settings(
            String::new(),
            EmitterSettings {
                best_width: 10,
                ..EmitterSettings::default()
            },
        )
        .unwrap();
        for event in document(vec![Scalar::plain("aaa bbb ccc ddd").into()]) {
            emitter.emit(event).unwrap();
        }
        assert_eq!(emitter.into_inner(), "aaa bbb ccc\n  ddd\n...\n");
    }

    #[test]
    fn settings_are_validated() {
        assert!(Emitter::with_settings(
            String::new(),
            EmitterSettings {
                best_indent: 1,
                ..EmitterSettings::default()
            }
        )
        .is_err());
        assert!(Emitter::with_settings(
            String::new(),
            EmitterSettings {
                best_indent: 10,
                ..EmitterSettings::default()
            }
        )
        .is_err());
        assert!(Emitter::with_settings(
            String::new(),
            EmitterSettings {
                best_indent: 2,
                best_width: 4,
                ..EmitterSettings::default()
            }
        )
        .is_err());
    }

    #[test]
    fn first_event_must_be_stream_start() {
        let mut emitter = Emitter::new(String::new());
        assert!(emitter.emit(Scalar::plain("x")).is_err());
    }

    #[test]
    fn events_after_stream_end_are_rejected() {
        let mut emitter = Emitter::new(String::new());
        emitter.emit(StreamStart::default()).unwrap();
        emitter.emit(StreamEnd::default()).unwrap();
        let err = emitter.emit(StreamEnd::default()).unwrap_err();
        assert!(matches!(err, Error::Emitter(_)));
    }

    #[test]
    fn url_encoding_of_tag_content() {
        assert_eq!(url_encode("tag:yaml.org,2002:str"), "tag:yaml.org,2002:str");
        assert_eq!(url_encode("hello world"), "hello%20world");
        assert_eq!(url_encode("h\u{e9}llo"), "h%C3%A9llo");
    }
}
