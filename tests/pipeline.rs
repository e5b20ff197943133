//! End-to-end checks of the scan/parse/emit pipeline.
//!
//! Each round-trip case pushes text through the full decode pipeline,
//! re-emits the resulting events, and decodes the output again: the two
//! event sequences must agree once presentation detail (marks, styles,
//! implicitness) is set aside.

use yaml11::{
    emit_to_string, parse_events, Emitter, EmitterSettings, Error, Event, EventReader, Parser,
    Scanner, TokenKind,
};

/// A comparable rendering of an event that ignores marks and styles.
fn fingerprint(event: &Event) -> String {
    match event {
        Event::StreamStart(_) => "+stream".to_string(),
        Event::StreamEnd(_) => "-stream".to_string(),
        Event::DocumentStart(_) => "+doc".to_string(),
        Event::DocumentEnd(_) => "-doc".to_string(),
        Event::SequenceStart(event) => {
            format!("+seq anchor={:?} tag={:?}", event.anchor, event.tag)
        }
        Event::SequenceEnd(_) => "-seq".to_string(),
        Event::MappingStart(event) => {
            format!("+map anchor={:?} tag={:?}", event.anchor, event.tag)
        }
        Event::MappingEnd(_) => "-map".to_string(),
        Event::Scalar(event) => format!(
            "=val anchor={:?} tag={:?} value={:?}",
            event.anchor, event.tag, event.value
        ),
        Event::Alias(event) => format!("=ali *{}", event.anchor),
    }
}

fn shape(events: &[Event]) -> Vec<String> {
    events.iter().map(fingerprint).collect()
}

/// Parse, emit, and parse again; the node structure must survive.
fn assert_round_trip(input: &str) {
    let events = parse_events(input).unwrap();
    let text = emit_to_string(events.clone()).unwrap();
    let reparsed = parse_events(&text).unwrap();
    assert_eq!(
        shape(&events),
        shape(&reparsed),
        "round trip changed the structure of {input:?}; emitted {text:?}"
    );
}

#[test]
fn round_trip_block_structures() {
    assert_round_trip("a: 1\nb: 2\n");
    assert_round_trip("a:\n  b: 1\n  c: 2\n");
    assert_round_trip("- 1\n- 2\n- 3\n");
    assert_round_trip("a:\n  - 1\n  - b: 2\n");
    assert_round_trip("a:\nb: 1\n");
}

#[test]
fn round_trip_flow_structures() {
    assert_round_trip("[1, 2, [3, 4]]\n");
    assert_round_trip("{a: 1, b: {c: 2}}\n");
    assert_round_trip("a: [x, {y: z}]\n");
    assert_round_trip("[a: 1]\n");
}

#[test]
fn round_trip_scalar_styles() {
    assert_round_trip("plain\n");
    assert_round_trip("'single quoted #not a comment'\n");
    assert_round_trip("\"escapes: \\t \\n \\x07\"\n");
    assert_round_trip("a: |\n  line one\n  line two\n");
    assert_round_trip("a: >\n  folded into\n  one line\n");
}

#[test]
fn round_trip_block_scalar_chomping() {
    assert_round_trip("a: |\n  x\n");
    assert_round_trip("a: |-\n  x\n");
    assert_round_trip("a: |+\n  x\n\n");
}

#[test]
fn round_trip_anchors_and_aliases() {
    assert_round_trip("a: &x 1\nb: *x\n");
    assert_round_trip("- &a [1, 2]\n- *a\n");
}

#[test]
fn round_trip_tags() {
    assert_round_trip("!!str a\n");
    assert_round_trip("!local a\n");
    assert_round_trip("%TAG !e! tag:example.com,2000:\n---\n!e!thing value\n");
}

#[test]
fn round_trip_multiple_documents() {
    assert_round_trip("one\n---\ntwo\n");
    assert_round_trip("one\n---\ntwo\n...\n---\nthree\n");
}

#[test]
fn mapping_events_have_the_expected_shape() {
    let events = parse_events("a: 1\n").unwrap();
    assert_eq!(
        shape(&events),
        [
            "+stream",
            "+doc",
            "+map anchor=None tag=None",
            "=val anchor=None tag=None value=\"a\"",
            "=val anchor=None tag=None value=\"1\"",
            "-map",
            "-doc",
            "-stream",
        ]
    );
}

#[test]
fn incompatible_version_directive_is_rejected() {
    let err = parse_events("%YAML 1.2\n---\nx\n").unwrap_err();
    assert!(matches!(err, Error::Semantic { .. }));
}

#[test]
fn unterminated_flow_sequence_is_rejected() {
    assert!(parse_events("[1, 2\n").is_err());
}

#[test]
fn canonical_output_is_deterministic() {
    let input = "b: [2, 1]\na: x\n";
    let emit_canonical = || {
        let events = parse_events(input).unwrap();
        let mut emitter = Emitter::with_settings(
            String::new(),
            EmitterSettings {
                canonical: true,
                ..EmitterSettings::default()
            },
        )
        .unwrap();
        for event in events {
            emitter.emit(event).unwrap();
        }
        emitter.into_inner()
    };

    let first = emit_canonical();
    let second = emit_canonical();
    assert_eq!(first, second);
    assert!(first.starts_with("---"));

    let reparsed = parse_events(&first).unwrap();
    assert_eq!(shape(&parse_events(input).unwrap()), shape(&reparsed));
}

#[test]
fn block_structure_tokens_balance() {
    let mut scanner = Scanner::new("a:\n  - 1\n  - b: 2\nc: 3\n".chars());
    let mut opened = 0;
    let mut closed = 0;
    while let Some(token) = scanner.next_token().unwrap() {
        match token.kind {
            TokenKind::BlockSequenceStart | TokenKind::BlockMappingStart => opened += 1,
            TokenKind::BlockEnd => closed += 1,
            _ => {}
        }
    }
    assert_eq!(opened, closed);
}

#[test]
fn event_reader_walks_the_public_pipeline() {
    use yaml11::events::{DocumentStart, MappingEnd, MappingStart, Scalar, StreamStart};

    let mut reader = EventReader::new(Parser::new("a: [1, 2]\n".chars()));
    reader.expect::<StreamStart>().unwrap();
    reader.expect::<DocumentStart>().unwrap();
    reader.expect::<MappingStart>().unwrap();
    assert_eq!(reader.expect::<Scalar>().unwrap().value, "a");
    reader.skip_this_and_nested().unwrap();
    reader.expect::<MappingEnd>().unwrap();
}
