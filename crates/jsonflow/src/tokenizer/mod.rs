//! The streaming tokenizer.
//!
//! Converts an append-only character stream into a token stream, deferring
//! classification of any lexeme whose terminator has not yet arrived. The
//! unconsumed tail lives in a carry buffer that persists across feeds, so
//! chunk boundaries may fall anywhere, including inside a string escape or
//! between the digits of a number.
//!
//! The parser drives the tokenizer one token at a time through
//! [`Tokenizer::next_token`] so it can resynchronize the expecting-key hint
//! between tokens; [`Tokenizer::feed`] is the batch form of the same loop.

mod escape;
#[cfg(test)]
mod tests;

use std::collections::VecDeque;

use crate::value::Value;
use escape::{scan_unicode_escape, UnicodeScan};

/// Classification of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    ObjectOpen,
    ObjectClose,
    ArrayOpen,
    ArrayClose,
    Colon,
    Comma,
    String,
    Number,
    Boolean,
    Null,
    Key,
    PartialString,
    PartialNumber,
    PartialKey,
    Error,
}

/// A lexeme recognized (or partially recognized) by the tokenizer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// The decoded value for value-bearing kinds; best-effort content for
    /// partial kinds.
    pub value: Option<Value>,
    /// The raw source text of the lexeme, undecoded.
    pub raw: String,
    /// Character offset of the lexeme within the current feed's buffer.
    pub position: usize,
    pub is_partial: bool,
}

/// Tokenizer behavior flags, resolved by the parser from its own options.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenizerOptions {
    /// Skip unrecognized characters instead of producing error tokens.
    pub lenient: bool,
    /// Admit `'` as a string delimiter.
    pub allow_single_quotes: bool,
    /// Recognize unquoted identifier keys while the expecting-key hint is
    /// set.
    pub allow_unquoted_keys: bool,
}

/// The streaming tokenizer. See the module docs for the feeding model.
#[derive(Debug)]
pub struct Tokenizer {
    carry: VecDeque<char>,
    /// Characters consumed since the current feed began.
    pos: usize,
    expecting_key: bool,
    options: TokenizerOptions,
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

fn is_number_continuation(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E')
}

/// Result of scanning a string lexeme from the carry buffer.
enum StringScan {
    /// Terminator seen; `len` counts consumed characters including both
    /// quotes.
    Complete { value: String, len: usize },
    /// Buffer ended first; `value` holds the content decoded so far.
    Partial { value: String },
    /// An unrecoverable character or escape at offset `at`.
    Invalid { at: usize },
}

enum NumberScan {
    Complete { value: f64, len: usize },
    /// The buffer ended inside the number; nothing is consumable yet.
    Partial,
    /// A terminator arrived but the lexeme cannot be a number.
    Malformed { len: usize },
}

enum KeywordScan {
    Complete { value: Value, len: usize },
    /// The buffer ended on a strict prefix of a keyword.
    Partial,
    NoMatch,
}

impl Tokenizer {
    #[must_use]
    pub fn new(options: TokenizerOptions) -> Self {
        Self {
            carry: VecDeque::new(),
            pos: 0,
            expecting_key: false,
            options,
        }
    }

    /// Appends a chunk to the carry buffer and resets the feed-relative
    /// position counter. Use [`Tokenizer::next_token`] to consume tokens.
    pub fn append(&mut self, chunk: &str) {
        self.carry.reserve(chunk.len());
        self.carry.extend(chunk.chars());
        self.pos = 0;
    }

    /// Appends a chunk and returns every token fully recognizable from the
    /// accumulated buffer. The unconsumable tail (a lexeme still awaiting
    /// its terminator) remains buffered for the next feed.
    pub fn feed(&mut self, chunk: &str) -> Vec<Token> {
        self.append(chunk);
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        tokens
    }

    /// Hint from the parser: completed quoted strings become [`TokenKind::Key`]
    /// tokens, and (with unquoted keys enabled) an identifier character may
    /// begin a bare key.
    pub fn set_expecting_key(&mut self, expecting: bool) {
        self.expecting_key = expecting;
    }

    /// Empties the carry buffer and clears the expecting-key hint.
    pub fn reset(&mut self) {
        self.carry.clear();
        self.pos = 0;
        self.expecting_key = false;
    }

    /// Whether the carry buffer is empty.
    #[must_use]
    pub fn is_drained(&self) -> bool {
        self.carry.is_empty()
    }

    /// Recognizes and consumes the next token, or returns `None` when the
    /// buffered tail needs more input (or the buffer is empty).
    pub fn next_token(&mut self) -> Option<Token> {
        loop {
            while matches!(self.carry.front(), Some(' ' | '\t' | '\r' | '\n')) {
                self.carry.pop_front();
                self.pos += 1;
            }
            let c = *self.carry.front()?;
            let position = self.pos;

            if let Some(kind) = structural_kind(c) {
                let raw = self.drain_raw(1);
                return Some(Token {
                    kind,
                    value: None,
                    raw,
                    position,
                    is_partial: false,
                });
            }

            if c == '"' || (c == '\'' && self.options.allow_single_quotes) {
                return self.take_string(position);
            }

            if self.expecting_key && self.options.allow_unquoted_keys && is_ident_char(c) {
                return self.take_unquoted_key(position);
            }

            if c == '-' || c.is_ascii_digit() {
                return self.take_number(position);
            }

            if matches!(c, 't' | 'f' | 'n') {
                match self.scan_keyword(0) {
                    KeywordScan::Complete { value, len } => {
                        let kind = if value.is_null() {
                            TokenKind::Null
                        } else {
                            TokenKind::Boolean
                        };
                        let raw = self.drain_raw(len);
                        return Some(Token {
                            kind,
                            value: Some(value),
                            raw,
                            position,
                            is_partial: false,
                        });
                    }
                    KeywordScan::Partial => return None,
                    KeywordScan::NoMatch => {}
                }
            }

            if self.options.lenient {
                tracing::trace!(character = %c, position, "skipping unrecognized character");
                self.carry.pop_front();
                self.pos += 1;
                continue;
            }

            let raw = self.drain_raw(1);
            return Some(Token {
                kind: TokenKind::Error,
                value: None,
                raw,
                position,
                is_partial: false,
            });
        }
    }

    /// Classifies the buffered tail as a partial string, key, or number
    /// without consuming anything. Idempotent; the carry buffer and scan
    /// position are left untouched.
    #[must_use]
    pub fn partial_token(&self) -> Option<Token> {
        let mut i = 0;
        while matches!(self.carry.get(i), Some(' ' | '\t' | '\r' | '\n')) {
            i += 1;
        }
        let c = *self.carry.get(i)?;
        let position = self.pos + i;

        if c == '"' || (c == '\'' && self.options.allow_single_quotes) {
            let StringScan::Partial { value } = self.scan_string(i) else {
                return None;
            };
            let kind = if self.expecting_key {
                TokenKind::PartialKey
            } else {
                TokenKind::PartialString
            };
            return Some(Token {
                kind,
                value: Some(Value::String(value)),
                raw: self.raw_from(i),
                position,
                is_partial: true,
            });
        }

        if self.expecting_key && self.options.allow_unquoted_keys && is_ident_char(c) {
            let text: String = self.carry.iter().skip(i).copied().collect();
            if !text.chars().all(is_ident_char) {
                return None;
            }
            return Some(Token {
                kind: TokenKind::PartialKey,
                value: Some(Value::String(text.clone())),
                raw: text,
                position,
                is_partial: true,
            });
        }

        if c == '-' || c.is_ascii_digit() {
            let raw = self.raw_from(i);
            if !raw.chars().all(is_number_continuation) {
                return None;
            }
            let trimmed = raw.trim_end_matches(['e', 'E', '.', '-', '+']);
            let value = trimmed.parse::<f64>().ok().map(Value::Number);
            return Some(Token {
                kind: TokenKind::PartialNumber,
                value,
                raw,
                position,
                is_partial: true,
            });
        }

        None
    }

    fn raw_from(&self, start: usize) -> String {
        self.carry.iter().skip(start).copied().collect()
    }

    fn drain_raw(&mut self, n: usize) -> String {
        self.pos += n;
        self.carry.drain(..n).collect()
    }

    fn take_string(&mut self, position: usize) -> Option<Token> {
        match self.scan_string(0) {
            StringScan::Complete { value, len } => {
                let raw = self.drain_raw(len);
                let kind = if self.expecting_key {
                    TokenKind::Key
                } else {
                    TokenKind::String
                };
                Some(Token {
                    kind,
                    value: Some(Value::String(value)),
                    raw,
                    position,
                    is_partial: false,
                })
            }
            StringScan::Partial { .. } => None,
            StringScan::Invalid { at } => {
                let raw = self.drain_raw(at + 1);
                Some(Token {
                    kind: TokenKind::Error,
                    value: None,
                    raw,
                    position,
                    is_partial: false,
                })
            }
        }
    }

    /// Scans a string lexeme whose opening quote sits at `start`.
    fn scan_string(&self, start: usize) -> StringScan {
        let quote = self.carry[start];
        let mut out = String::new();
        let mut i = start + 1;
        loop {
            let Some(&c) = self.carry.get(i) else {
                return StringScan::Partial { value: out };
            };
            if c == quote {
                return StringScan::Complete {
                    value: out,
                    len: i + 1 - start,
                };
            }
            if c == '\\' {
                let Some(&e) = self.carry.get(i + 1) else {
                    return StringScan::Partial { value: out };
                };
                match e {
                    '"' | '\'' | '\\' | '/' => out.push(e),
                    'n' => out.push('\n'),
                    'r' => out.push('\r'),
                    't' => out.push('\t'),
                    'b' => out.push('\u{0008}'),
                    'f' => out.push('\u{000C}'),
                    'u' => match scan_unicode_escape(&self.carry, i + 2) {
                        UnicodeScan::Decoded { ch, consumed } => {
                            out.push(ch);
                            i += 2 + consumed;
                            continue;
                        }
                        UnicodeScan::NeedMore => return StringScan::Partial { value: out },
                        UnicodeScan::Invalid => return StringScan::Invalid { at: i + 1 },
                    },
                    other if self.options.lenient => out.push(other),
                    _ => return StringScan::Invalid { at: i + 1 },
                }
                i += 2;
                continue;
            }
            // JSON forbids unescaped control characters inside strings.
            if c < '\u{20}' && !self.options.lenient {
                return StringScan::Invalid { at: i };
            }
            out.push(c);
            i += 1;
        }
    }

    fn take_number(&mut self, position: usize) -> Option<Token> {
        match self.scan_number(0) {
            NumberScan::Complete { value, len } => {
                let raw = self.drain_raw(len);
                Some(Token {
                    kind: TokenKind::Number,
                    value: Some(Value::Number(value)),
                    raw,
                    position,
                    is_partial: false,
                })
            }
            NumberScan::Partial => None,
            NumberScan::Malformed { len } => {
                let raw = self.drain_raw(len);
                Some(Token {
                    kind: TokenKind::Error,
                    value: None,
                    raw,
                    position,
                    is_partial: false,
                })
            }
        }
    }

    /// Scans a number lexeme starting at `start`. A number is only emitted
    /// once a non-continuation character follows it; at buffer end the
    /// lexeme stays buffered for the next feed.
    fn scan_number(&self, start: usize) -> NumberScan {
        let mut i = start + 1;
        while self
            .carry
            .get(i)
            .is_some_and(|&c| is_number_continuation(c))
        {
            i += 1;
        }
        if self.carry.get(i).is_none() {
            return NumberScan::Partial;
        }
        let len = i - start;
        let raw: String = self.carry.iter().skip(start).take(len).copied().collect();
        // A trailing sign, exponent marker, or decimal point can never
        // complete into a number, whatever follows.
        if raw.ends_with(['e', 'E', '.', '-', '+']) {
            return NumberScan::Malformed { len };
        }
        match raw.parse::<f64>() {
            Ok(value) => NumberScan::Complete { value, len },
            Err(_) => NumberScan::Malformed { len },
        }
    }

    /// Matches `true`, `false`, or `null` at `start`. Keywords only emit on
    /// an exact-length match followed by a non-word character or buffer
    /// end; a strict prefix at buffer end stays buffered.
    fn scan_keyword(&self, start: usize) -> KeywordScan {
        let (keyword, value) = match self.carry[start] {
            't' => ("true", Value::Boolean(true)),
            'f' => ("false", Value::Boolean(false)),
            'n' => ("null", Value::Null),
            _ => return KeywordScan::NoMatch,
        };
        for (offset, expected) in keyword.chars().enumerate() {
            match self.carry.get(start + offset) {
                None => return KeywordScan::Partial,
                Some(&c) if c == expected => {}
                Some(_) => return KeywordScan::NoMatch,
            }
        }
        match self.carry.get(start + keyword.len()) {
            Some(&c) if is_ident_char(c) => KeywordScan::NoMatch,
            _ => KeywordScan::Complete {
                value,
                len: keyword.len(),
            },
        }
    }

    fn take_unquoted_key(&mut self, position: usize) -> Option<Token> {
        let mut i = 0;
        while self.carry.get(i).is_some_and(|&c| is_ident_char(c)) {
            i += 1;
        }
        // The key terminates at the first non-identifier character,
        // typically a colon or whitespace.
        self.carry.get(i)?;
        let raw = self.drain_raw(i);
        Some(Token {
            kind: TokenKind::Key,
            value: Some(Value::String(raw.clone())),
            raw,
            position,
            is_partial: false,
        })
    }
}

fn structural_kind(c: char) -> Option<TokenKind> {
    match c {
        '{' => Some(TokenKind::ObjectOpen),
        '}' => Some(TokenKind::ObjectClose),
        '[' => Some(TokenKind::ArrayOpen),
        ']' => Some(TokenKind::ArrayClose),
        ':' => Some(TokenKind::Colon),
        ',' => Some(TokenKind::Comma),
        _ => None,
    }
}
