//! Incremental JSON parsing with integrated JSON-Schema validation.
//!
//! `jsonflow` consumes JSON arriving in arbitrarily small fragments, down
//! to single bytes, and exposes a useful partial view of the growing value
//! at every step. It is built for the output of generative language models,
//! where consumers want to render or act on fields as soon as they complete
//! rather than waiting for the whole document.
//!
//! Three pieces cooperate:
//!
//! - the [`Tokenizer`] turns a character stream into tokens, carrying any
//!   unfinished lexeme across feed boundaries;
//! - the [`StreamingParser`] builds the value tree, tracks per-path
//!   completion, and recovers from the loosely formed JSON that LLMs emit
//!   (`llm_mode`);
//! - the [`Validator`] checks values against a JSON-Schema draft-07 subset
//!   as they materialize, including early rejection of containers that can
//!   never satisfy the schema at their path.
//!
//! # Examples
//!
//! ```
//! use jsonflow::{ParserOptions, Schema, StreamingParser};
//!
//! let schema = Schema::parse(
//!     r#"{"type": "object", "properties": {"age": {"type": "number"}}}"#,
//! )
//! .unwrap();
//!
//! let mut parser = StreamingParser::new(ParserOptions {
//!     schema: Some(schema),
//!     ..Default::default()
//! });
//!
//! let snapshot = parser.feed(r#"{"age": 3"#).unwrap();
//! assert!(!snapshot.complete);
//! assert!(snapshot.pending_fields.iter().any(|p| p == "age"));
//!
//! let snapshot = parser.feed("0}").unwrap();
//! assert!(snapshot.complete && snapshot.valid);
//! assert_eq!(snapshot.data.unwrap().to_string(), r#"{"age":30}"#);
//! ```

mod parser;
mod path;
mod schema;
mod tokenizer;
mod validator;
mod value;

pub use parser::{
    ParseResult, ParseState, ParserError, ParserEvents, ParserOptions, StreamingParser,
};
pub use path::{join_path, Path, PathComponent};
pub use schema::{Items, Schema, SchemaOrBool, SchemaRef, TypeName, TypeSet};
pub use tokenizer::{Token, TokenKind, Tokenizer, TokenizerOptions};
pub use validator::{ValidationError, Validator, ValidatorOptions};
pub use value::{Array, Map, Value, ValueKind};

#[cfg(test)]
mod tests;
