use crate::{ParserError, ParserOptions, StreamingParser};

fn feed_one(source: &str) -> Result<(), ParserError> {
    let mut parser = StreamingParser::new(ParserOptions::default());
    parser.feed(source).map(|_| ())
}

#[test]
fn comma_in_key_position() {
    assert!(matches!(
        feed_one("{,}"),
        Err(ParserError::Syntax { .. })
    ));
}

#[test]
fn trailing_commas_are_rejected_in_strict_mode() {
    assert!(matches!(
        feed_one("{\"a\":1,}"),
        Err(ParserError::Syntax { .. })
    ));
    assert!(matches!(feed_one("[1,]"), Err(ParserError::Syntax { .. })));
}

#[test]
fn mismatched_delimiters() {
    assert!(matches!(feed_one("{]"), Err(ParserError::Syntax { .. })));
    assert!(matches!(feed_one("[1}"), Err(ParserError::Syntax { .. })));
}

#[test]
fn missing_colon_is_fatal_in_strict_mode() {
    assert!(matches!(
        feed_one("{\"a\" 1}"),
        Err(ParserError::Syntax { .. })
    ));
}

#[test]
fn missing_comma_is_fatal_in_strict_mode() {
    assert!(matches!(
        feed_one("[1 2]"),
        Err(ParserError::Syntax { .. })
    ));
}

#[test]
fn unquoted_keys_are_rejected_in_strict_mode() {
    assert!(matches!(
        feed_one("{name: 1}"),
        Err(ParserError::Syntax { .. })
    ));
}

#[test]
fn stray_characters_are_fatal_in_strict_mode() {
    assert!(matches!(feed_one("@"), Err(ParserError::Syntax { .. })));
}

#[test]
fn content_after_the_document_is_rejected() {
    let mut parser = StreamingParser::new(ParserOptions::default());
    parser.feed("{}").unwrap();
    assert!(matches!(
        parser.feed("{}"),
        Err(ParserError::Syntax { .. })
    ));
}

#[test]
fn depth_ceiling_is_fatal() {
    let mut parser = StreamingParser::new(ParserOptions {
        max_depth: 2,
        ..Default::default()
    });
    let err = parser.feed(r#"{"a":{"b":{"c":1}}}"#).unwrap_err();
    assert_eq!(err, ParserError::DepthExceeded(2));
}

#[test]
fn depth_ceiling_holds_in_lenient_mode_too() {
    let mut parser = StreamingParser::new(ParserOptions {
        llm_mode: true,
        max_depth: 3,
        ..Default::default()
    });
    let err = parser.feed("[[[[").unwrap_err();
    assert_eq!(err, ParserError::DepthExceeded(3));
}

#[test]
fn result_before_completion_is_incomplete() {
    let mut parser = StreamingParser::new(ParserOptions::default());
    parser.feed("{\"a\":").unwrap();
    assert_eq!(parser.result().unwrap_err(), ParserError::Incomplete);
}

#[test]
fn feeding_after_a_fatal_error_repeats_it() {
    let mut parser = StreamingParser::new(ParserOptions::default());
    let first = parser.feed("}").unwrap_err();
    let second = parser.feed("{}").unwrap_err();
    assert_eq!(first, second);
    assert_eq!(parser.state(), crate::ParseState::Error);
}

#[test]
fn malformed_number_is_fatal_in_strict_mode() {
    assert!(matches!(
        feed_one("[1.2.3]"),
        Err(ParserError::Syntax { .. })
    ));
}
