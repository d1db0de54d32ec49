use super::*;

fn tokenizer() -> Tokenizer {
    Tokenizer::new(TokenizerOptions::default())
}

fn lenient_tokenizer() -> Tokenizer {
    Tokenizer::new(TokenizerOptions {
        lenient: true,
        allow_single_quotes: true,
        allow_unquoted_keys: true,
    })
}

fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
    tokens.iter().map(|t| t.kind).collect()
}

#[test]
fn structural_tokens() {
    let mut t = tokenizer();
    let tokens = t.feed("{}[]:,");
    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::ObjectOpen,
            TokenKind::ObjectClose,
            TokenKind::ArrayOpen,
            TokenKind::ArrayClose,
            TokenKind::Colon,
            TokenKind::Comma,
        ]
    );
    assert!(t.is_drained());
}

#[test]
fn whitespace_is_skipped_between_tokens() {
    let mut t = tokenizer();
    let tokens = t.feed(" \t\r\n[ \n ]");
    assert_eq!(kinds(&tokens), vec![TokenKind::ArrayOpen, TokenKind::ArrayClose]);
}

#[test]
fn complete_string_decodes_escapes() {
    let mut t = tokenizer();
    let tokens = t.feed(r#""a\nb\t\"c\\d\/""#);
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(
        tokens[0].value,
        Some(Value::String("a\nb\t\"c\\d/".into()))
    );
    assert_eq!(tokens[0].raw, r#""a\nb\t\"c\\d\/""#);
}

#[test]
fn string_split_across_feeds() {
    let mut t = tokenizer();
    assert!(t.feed("\"hel").is_empty());
    assert!(t.feed("lo wor").is_empty());
    let tokens = t.feed("ld\"");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].value, Some(Value::String("hello world".into())));
}

#[test]
fn partial_string_classification_is_idempotent() {
    let mut t = tokenizer();
    t.feed("\"par");
    let first = t.partial_token().unwrap();
    let second = t.partial_token().unwrap();
    assert_eq!(first, second);
    assert_eq!(first.kind, TokenKind::PartialString);
    assert_eq!(first.value, Some(Value::String("par".into())));
    assert!(first.is_partial);

    // Classification never consumes: the string still completes normally.
    let tokens = t.feed("tial\"");
    assert_eq!(tokens[0].value, Some(Value::String("partial".into())));
}

#[test]
fn expecting_key_classifies_strings_as_keys() {
    let mut t = tokenizer();
    t.set_expecting_key(true);
    let tokens = t.feed("\"name\"");
    assert_eq!(tokens[0].kind, TokenKind::Key);

    t.feed("\"par");
    assert_eq!(t.partial_token().unwrap().kind, TokenKind::PartialKey);
}

#[test]
fn unicode_escape_decodes() {
    let mut t = tokenizer();
    let tokens = t.feed(r#""\u0041\u00e9""#);
    assert_eq!(tokens[0].value, Some(Value::String("Aé".into())));
}

#[test]
fn surrogate_pair_survives_a_chunk_boundary() {
    let mut t = tokenizer();
    assert!(t.feed(r#""\uD83D"#).is_empty());
    let tokens = t.feed(r#"\uDE00""#);
    assert_eq!(tokens[0].value, Some(Value::String("\u{1F600}".into())));
}

#[test]
fn lone_surrogate_is_an_error() {
    let mut t = tokenizer();
    let tokens = t.feed(r#""\uDC00""#);
    assert_eq!(tokens[0].kind, TokenKind::Error);
}

#[test]
fn number_waits_for_a_terminator() {
    let mut t = tokenizer();
    assert!(t.feed("123").is_empty());
    let partial = t.partial_token().unwrap();
    assert_eq!(partial.kind, TokenKind::PartialNumber);
    assert_eq!(partial.value, Some(Value::Number(123.0)));

    let tokens = t.feed(" ");
    assert_eq!(tokens[0].kind, TokenKind::Number);
    assert_eq!(tokens[0].value, Some(Value::Number(123.0)));
}

#[test]
fn number_split_across_feeds() {
    let mut t = tokenizer();
    assert!(t.feed("-1").is_empty());
    assert!(t.feed(".5e").is_empty());
    let tokens = t.feed("2,");
    assert_eq!(tokens[0].value, Some(Value::Number(-1.5e2)));
    assert_eq!(tokens[1].kind, TokenKind::Comma);
}

#[test]
fn number_with_trailing_exponent_marker_is_malformed() {
    let mut t = tokenizer();
    let tokens = t.feed("12e,");
    assert_eq!(tokens[0].kind, TokenKind::Error);
    assert_eq!(tokens[0].raw, "12e");
}

#[test]
fn keywords_emit_on_exact_match() {
    let mut t = tokenizer();
    let tokens = t.feed("true false null");
    assert_eq!(
        kinds(&tokens),
        vec![TokenKind::Boolean, TokenKind::Boolean, TokenKind::Null]
    );
    assert_eq!(tokens[0].value, Some(Value::Boolean(true)));
    assert_eq!(tokens[1].value, Some(Value::Boolean(false)));
    assert_eq!(tokens[2].value, Some(Value::Null));
}

#[test]
fn keyword_prefix_stays_buffered() {
    let mut t = tokenizer();
    assert!(t.feed("tru").is_empty());
    // No partial classification exists for keywords.
    assert!(t.partial_token().is_none());
    let tokens = t.feed("e");
    assert_eq!(tokens[0].value, Some(Value::Boolean(true)));
}

#[test]
fn keyword_followed_by_word_character_is_not_a_keyword() {
    let mut t = tokenizer();
    let tokens = t.feed("nullx ");
    assert!(tokens.iter().all(|t| t.kind == TokenKind::Error));
}

#[test]
fn unrecognized_character_becomes_an_error_token() {
    let mut t = tokenizer();
    let tokens = t.feed("@");
    assert_eq!(tokens[0].kind, TokenKind::Error);
    assert_eq!(tokens[0].raw, "@");
    assert_eq!(tokens[0].position, 0);
}

#[test]
fn lenient_mode_skips_unrecognized_characters() {
    let mut t = lenient_tokenizer();
    let tokens = t.feed("@ # 1,");
    assert_eq!(kinds(&tokens), vec![TokenKind::Number, TokenKind::Comma]);
}

#[test]
fn single_quoted_strings_in_lenient_mode() {
    let mut t = lenient_tokenizer();
    let tokens = t.feed("'it\\'s'");
    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].value, Some(Value::String("it's".into())));
}

#[test]
fn unquoted_keys_require_the_expecting_key_hint() {
    let mut t = lenient_tokenizer();
    t.set_expecting_key(true);
    let tokens = t.feed("name:");
    assert_eq!(tokens[0].kind, TokenKind::Key);
    assert_eq!(tokens[0].value, Some(Value::String("name".into())));
    assert_eq!(tokens[1].kind, TokenKind::Colon);

    // Without the hint the same text is lexed as a (failed) keyword.
    let mut t = lenient_tokenizer();
    let tokens = t.feed("name:");
    assert!(!tokens.iter().any(|t| t.kind == TokenKind::Key));
}

#[test]
fn partial_unquoted_key() {
    let mut t = lenient_tokenizer();
    t.set_expecting_key(true);
    assert!(t.feed("na").is_empty());
    let partial = t.partial_token().unwrap();
    assert_eq!(partial.kind, TokenKind::PartialKey);
    assert_eq!(partial.value, Some(Value::String("na".into())));
}

#[test]
fn positions_are_feed_relative() {
    let mut t = tokenizer();
    let tokens = t.feed("  {\"a\"");
    assert_eq!(tokens[0].position, 2);
    assert_eq!(tokens[1].position, 3);

    let tokens = t.feed(" :");
    assert_eq!(tokens[0].position, 1);
}

#[test]
fn reset_clears_the_carry_buffer() {
    let mut t = tokenizer();
    t.feed("\"dangling");
    assert!(!t.is_drained());
    t.reset();
    assert!(t.is_drained());
    assert!(t.partial_token().is_none());
}

#[test]
fn control_characters_in_strings_are_rejected_in_strict_mode() {
    let mut t = tokenizer();
    let tokens = t.feed("\"a\u{0001}b\"");
    assert_eq!(tokens[0].kind, TokenKind::Error);
}
