use super::finish_seq_with;
use crate::{Map, ParserOptions, StreamingParser, Value};

fn llm_options() -> ParserOptions {
    ParserOptions {
        llm_mode: true,
        ..Default::default()
    }
}

#[test]
fn llm_output_with_unquoted_keys_and_trailing_comma() {
    let mut map = Map::new();
    map.insert("name".into(), Value::String("John".into()));
    map.insert("age".into(), Value::Number(30.0));

    let mut parser = StreamingParser::new(llm_options());
    let result = parser.feed("{name: \"John\", age: 30,}").unwrap();
    assert!(result.complete);
    assert!(result.errors.is_empty());
    assert_eq!(result.data, Some(Value::Object(map)));
}

#[test]
fn single_quoted_strings_and_keys() {
    let mut map = Map::new();
    map.insert("a".into(), Value::String("it's".into()));
    assert_eq!(
        finish_seq_with(llm_options(), &["{'a': 'it\\'s'}"]),
        Value::Object(map)
    );
}

#[test]
fn missing_colon_is_tolerated() {
    let mut map = Map::new();
    map.insert("a".into(), Value::Number(1.0));
    assert_eq!(
        finish_seq_with(llm_options(), &["{\"a\" 1}"]),
        Value::Object(map)
    );
}

#[test]
fn missing_commas_are_tolerated() {
    let mut map = Map::new();
    map.insert("a".into(), Value::Number(1.0));
    map.insert("b".into(), Value::Number(2.0));
    assert_eq!(
        finish_seq_with(llm_options(), &["{\"a\":1 \"b\":2}"]),
        Value::Object(map)
    );
    assert_eq!(
        finish_seq_with(llm_options(), &["[1 2 3]"]),
        Value::Array(vec![
            Value::Number(1.0),
            Value::Number(2.0),
            Value::Number(3.0),
        ])
    );
}

#[test]
fn dangling_key_is_dropped_on_close() {
    assert_eq!(
        finish_seq_with(llm_options(), &["{\"a\": }"]),
        Value::Object(Map::new())
    );
}

#[test]
fn trailing_comma_in_arrays() {
    assert_eq!(
        finish_seq_with(llm_options(), &["[1, 2,]"]),
        Value::Array(vec![Value::Number(1.0), Value::Number(2.0)])
    );
}

#[test]
fn junk_between_tokens_is_silently_skipped() {
    let mut parser = StreamingParser::new(llm_options());
    let result = parser.feed("[1, @@ 2]").unwrap();
    assert!(result.complete);
    assert!(result.errors.is_empty());
    assert_eq!(
        result.data,
        Some(Value::Array(vec![Value::Number(1.0), Value::Number(2.0)]))
    );
}

#[test]
fn individual_flags_work_without_llm_mode() {
    let options = ParserOptions {
        allow_trailing_commas: Some(true),
        ..Default::default()
    };
    assert_eq!(
        finish_seq_with(options, &["[1,]"]),
        Value::Array(vec![Value::Number(1.0)])
    );

    let options = ParserOptions {
        allow_single_quotes: Some(true),
        ..Default::default()
    };
    assert_eq!(
        finish_seq_with(options, &["['x']"]),
        Value::Array(vec![Value::String("x".into())])
    );
}

#[test]
fn explicit_false_overrides_llm_mode() {
    let mut parser = StreamingParser::new(ParserOptions {
        llm_mode: true,
        allow_trailing_commas: Some(false),
        ..Default::default()
    });
    let result = parser.feed("{\"a\":1,}").unwrap();
    // Lenient mode keeps the error non-fatal, but the trailing comma is
    // still reported.
    assert!(result.errors.iter().any(|e| e.keyword == "syntax"));
}

#[test]
fn malformed_lexemes_are_recorded_and_recovered_from() {
    let mut parser = StreamingParser::new(llm_options());
    let result = parser.feed("[12e, 3]").unwrap();
    assert!(result.complete);
    assert!(result.errors.iter().any(|e| e.keyword == "syntax"));
}

#[test]
fn syntax_errors_accumulate_instead_of_raising() {
    let mut parser = StreamingParser::new(llm_options());
    let result = parser.feed("{\"a\": 1 ] }").unwrap();
    assert!(result.errors.iter().any(|e| e.keyword == "syntax"));
    assert!(result.complete);
}
