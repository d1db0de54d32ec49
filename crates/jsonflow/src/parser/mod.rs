//! The streaming parser.
//!
//! [`StreamingParser`] consumes tokens from the tokenizer, builds the value
//! tree frame by frame, tracks which paths are complete and which are still
//! pending, runs the validator as values materialize, and dispatches
//! progress events. Each [`StreamingParser::feed`] call returns a
//! [`ParseResult`] snapshot of everything known so far.
//!
//! # Examples
//!
//! ```
//! use jsonflow::{ParserOptions, StreamingParser};
//!
//! let mut parser = StreamingParser::new(ParserOptions::default());
//! let first = parser.feed(r#"{"name": "Jo"#).unwrap();
//! assert!(!first.complete);
//!
//! let last = parser.feed(r#"hn"}"#).unwrap();
//! assert!(last.complete);
//! assert_eq!(last.data.unwrap().to_string(), r#"{"name":"John"}"#);
//! ```

mod error;
mod events;
mod options;
mod result;

pub use error::ParserError;
pub use events::ParserEvents;
pub use options::ParserOptions;
pub use result::ParseResult;

use std::collections::BTreeSet;
use std::mem;

use crate::path::{join_path, Path, PathComponent};
use crate::schema::SchemaRef;
use crate::tokenizer::{Token, TokenKind, Tokenizer};
use crate::validator::{ValidationError, Validator};
use crate::value::{Map, Value, ValueKind};

/// The parser's position in the document grammar. The state is the sole
/// authority on what the next token may be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    Initial,
    ExpectingKey,
    ExpectingColon,
    ExpectingValue,
    InArray,
    ExpectingCommaOrEnd,
    Complete,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContainerKind {
    Object,
    Array,
}

/// One open container on the stack.
struct Frame {
    kind: ContainerKind,
    value: Value,
    /// For objects: the key whose value is currently being constructed.
    pending_key: Option<String>,
    /// For objects: keys already assigned.
    seen_keys: BTreeSet<String>,
    /// For arrays: the index the next element will land at.
    index: usize,
    /// Sub-schema resolved for this frame's path at push time.
    schema: Option<SchemaRef>,
}

impl Frame {
    fn new(kind: ContainerKind, schema: Option<SchemaRef>) -> Self {
        let value = match kind {
            ContainerKind::Object => Value::Object(Map::new()),
            ContainerKind::Array => Value::Array(Vec::new()),
        };
        Self {
            kind,
            value,
            pending_key: None,
            seen_keys: BTreeSet::new(),
            index: 0,
            schema,
        }
    }

    /// The slot inside this frame where the value under construction will
    /// land, if one is determined yet.
    fn slot(&self) -> Option<PathComponent> {
        match self.kind {
            ContainerKind::Object => self.pending_key.clone().map(PathComponent::Key),
            ContainerKind::Array => Some(PathComponent::Index(self.index)),
        }
    }
}

/// The incremental JSON parser.
///
/// Feed it input in chunks of any size, down to single bytes, and read
/// progress from the returned [`ParseResult`]s. A parser is single-use:
/// after reaching [`ParseState::Complete`] (or a fatal error), call
/// [`StreamingParser::reset`] before parsing another document.
pub struct StreamingParser {
    tokenizer: Tokenizer,
    options: ParserOptions,
    validator: Option<Validator>,
    events: Option<Box<dyn ParserEvents>>,

    state: ParseState,
    stack: Vec<Frame>,
    root: Option<Value>,

    /// Dot-joined paths of fully parsed values.
    completed: BTreeSet<String>,
    /// Dot-joined paths of values under construction.
    pending: BTreeSet<String>,
    /// Classification of the tokenizer's buffered tail, refreshed on every
    /// feed rather than accumulated.
    partial_pending: Option<String>,

    errors: Vec<ValidationError>,
    bytes_processed: usize,

    /// The previous token was a comma; consulted by the closing-delimiter
    /// transitions to reject trailing commas in strict mode.
    after_comma: bool,
    /// Lenient recovery: skip tokens until the next structural one.
    resyncing: bool,
    fatal: Option<ParserError>,
}

impl StreamingParser {
    #[must_use]
    pub fn new(options: ParserOptions) -> Self {
        let tokenizer = Tokenizer::new(options.tokenizer_options());
        let validator = options.schema.clone().map(Validator::new);
        Self {
            tokenizer,
            options,
            validator,
            events: None,
            state: ParseState::Initial,
            stack: Vec::new(),
            root: None,
            completed: BTreeSet::new(),
            pending: BTreeSet::new(),
            partial_pending: None,
            errors: Vec::new(),
            bytes_processed: 0,
            after_comma: false,
            resyncing: false,
            fatal: None,
        }
    }

    /// Creates a parser with a progress observer installed.
    #[must_use]
    pub fn with_events(options: ParserOptions, events: Box<dyn ParserEvents>) -> Self {
        let mut parser = Self::new(options);
        parser.events = Some(events);
        parser
    }

    /// Current parser state.
    #[must_use]
    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Whether the root value has been fully parsed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state == ParseState::Complete
    }

    /// The final value.
    ///
    /// # Errors
    ///
    /// [`ParserError::Incomplete`] while the parse has not reached
    /// [`ParseState::Complete`].
    pub fn result(&self) -> Result<&Value, ParserError> {
        if self.state != ParseState::Complete {
            return Err(ParserError::Incomplete);
        }
        self.root.as_ref().ok_or(ParserError::Incomplete)
    }

    /// Restores the parser to its initial state, keeping schema and
    /// options. Required before reusing a parser after completion.
    pub fn reset(&mut self) {
        self.tokenizer.reset();
        self.state = ParseState::Initial;
        self.stack.clear();
        self.root = None;
        self.completed.clear();
        self.pending.clear();
        self.partial_pending = None;
        self.errors.clear();
        self.bytes_processed = 0;
        self.after_comma = false;
        self.resyncing = false;
        self.fatal = None;
    }

    /// Feeds a chunk of input and returns a snapshot of progress.
    ///
    /// # Errors
    ///
    /// Strict-mode syntax errors and depth violations are fatal: the parser
    /// transitions to [`ParseState::Error`] and every further `feed`
    /// returns the same error. In lenient mode syntax errors accumulate on
    /// the snapshot instead.
    pub fn feed(&mut self, chunk: &str) -> Result<ParseResult, ParserError> {
        if let Some(fatal) = &self.fatal {
            return Err(fatal.clone());
        }
        self.bytes_processed += chunk.chars().count();
        self.tokenizer.append(chunk);

        loop {
            self.tokenizer
                .set_expecting_key(self.state == ParseState::ExpectingKey);
            let Some(token) = self.tokenizer.next_token() else {
                break;
            };
            if let Err(fatal) = self.process_token(token) {
                self.state = ParseState::Error;
                self.fatal = Some(fatal.clone());
                if let Some(events) = self.events.as_deref_mut() {
                    events.on_error(&fatal);
                }
                return Err(fatal);
            }
        }

        self.refresh_partial_pending();
        Ok(self.snapshot())
    }

    /// Feeds the final chunk and returns the completed root value.
    ///
    /// # Errors
    ///
    /// Any [`StreamingParser::feed`] error, or [`ParserError::Incomplete`]
    /// when the accumulated input does not form a whole document.
    pub fn feed_complete(&mut self, chunk: &str) -> Result<Value, ParserError> {
        let result = self.feed(chunk)?;
        if !result.complete {
            return Err(ParserError::Incomplete);
        }
        self.result().cloned()
    }

    /// All validation errors accumulated so far.
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    // --------------------------------------------------------------------
    // Token dispatch
    // --------------------------------------------------------------------

    fn process_token(&mut self, token: Token) -> Result<(), ParserError> {
        if token.kind == TokenKind::Error {
            let message = format!("unexpected input {:?}", token.raw);
            if self.options.lenient() {
                self.record_syntax_error(message, token.position);
                self.resyncing = true;
                return Ok(());
            }
            return Err(ParserError::Syntax {
                message,
                position: token.position,
            });
        }

        if self.resyncing {
            if matches!(
                token.kind,
                TokenKind::ObjectOpen
                    | TokenKind::ArrayOpen
                    | TokenKind::ObjectClose
                    | TokenKind::ArrayClose
            ) {
                self.resyncing = false;
            } else {
                tracing::trace!(kind = ?token.kind, "discarding token during resynchronization");
                return Ok(());
            }
        }

        self.dispatch(token)
    }

    #[allow(clippy::too_many_lines)]
    fn dispatch(&mut self, token: Token) -> Result<(), ParserError> {
        use ParseState::*;

        let was_after_comma = mem::replace(&mut self.after_comma, false);

        match self.state {
            Initial => match token.kind {
                TokenKind::ObjectOpen => self.push_container(ContainerKind::Object),
                TokenKind::ArrayOpen => self.push_container(ContainerKind::Array),
                TokenKind::String | TokenKind::Number | TokenKind::Boolean | TokenKind::Null => {
                    self.complete_root(scalar_value(token))
                }
                _ => self.syntax_or_recover(&token, "expected a value"),
            },

            ExpectingKey => match token.kind {
                TokenKind::Key | TokenKind::String => {
                    let key = scalar_value(token)
                        .as_str()
                        .unwrap_or_default()
                        .to_string();
                    let mut target = self.container_path();
                    target.push(PathComponent::Key(key.clone()));
                    self.mark_pending(&target);
                    if let Some(frame) = self.stack.last_mut() {
                        if frame.seen_keys.contains(&key) {
                            tracing::debug!(key = %key, "duplicate object key; later value wins");
                        }
                        frame.pending_key = Some(key);
                    }
                    self.state = ExpectingColon;
                    Ok(())
                }
                TokenKind::ObjectClose => {
                    if was_after_comma && !self.options.trailing_commas() {
                        return self.syntax_or_recover(&token, "trailing comma before '}'");
                    }
                    self.close_container(ContainerKind::Object, &token)
                }
                _ => self.syntax_or_recover(&token, "expected a property name"),
            },

            ExpectingColon => match token.kind {
                TokenKind::Colon => {
                    self.state = ExpectingValue;
                    Ok(())
                }
                _ if self.options.lenient() => {
                    tracing::debug!(position = token.position, "missing ':' tolerated");
                    self.state = ExpectingValue;
                    self.dispatch(token)
                }
                _ => self.syntax_or_recover(&token, "expected ':'"),
            },

            ExpectingValue => match token.kind {
                TokenKind::ObjectOpen => self.push_container(ContainerKind::Object),
                TokenKind::ArrayOpen => self.push_container(ContainerKind::Array),
                TokenKind::String | TokenKind::Number | TokenKind::Boolean | TokenKind::Null => {
                    self.assign_scalar(scalar_value(token))
                }
                // This state is only entered while an object key awaits its
                // value, so the top frame is always an object here.
                TokenKind::ObjectClose if self.options.lenient() => {
                    self.drop_dangling_key();
                    self.close_container(ContainerKind::Object, &token)
                }
                _ => self.syntax_or_recover(&token, "expected a value"),
            },

            InArray => match token.kind {
                TokenKind::ArrayClose => {
                    if was_after_comma && !self.options.trailing_commas() {
                        return self.syntax_or_recover(&token, "trailing comma before ']'");
                    }
                    self.close_container(ContainerKind::Array, &token)
                }
                TokenKind::ObjectOpen => self.push_container(ContainerKind::Object),
                TokenKind::ArrayOpen => self.push_container(ContainerKind::Array),
                TokenKind::String | TokenKind::Number | TokenKind::Boolean | TokenKind::Null => {
                    self.append_scalar(scalar_value(token))
                }
                _ => self.syntax_or_recover(&token, "expected an array element"),
            },

            ExpectingCommaOrEnd => match token.kind {
                TokenKind::Comma => {
                    self.after_comma = true;
                    self.state = match self.top_kind() {
                        Some(ContainerKind::Object) => ExpectingKey,
                        _ => InArray,
                    };
                    Ok(())
                }
                TokenKind::ObjectClose if self.top_kind() == Some(ContainerKind::Object) => {
                    self.close_container(ContainerKind::Object, &token)
                }
                TokenKind::ArrayClose if self.top_kind() == Some(ContainerKind::Array) => {
                    self.close_container(ContainerKind::Array, &token)
                }
                TokenKind::ObjectClose | TokenKind::ArrayClose => {
                    self.syntax_or_recover(&token, "mismatched closing delimiter")
                }
                _ if self.options.lenient() => {
                    tracing::debug!(position = token.position, "missing ',' tolerated");
                    self.state = match self.top_kind() {
                        Some(ContainerKind::Object) => ExpectingKey,
                        _ => InArray,
                    };
                    self.dispatch(token)
                }
                _ => self.syntax_or_recover(&token, "expected ',' or a closing delimiter"),
            },

            Complete => self.syntax_or_recover(&token, "unexpected content after the document"),

            Error => Ok(()),
        }
    }

    // --------------------------------------------------------------------
    // Transitions
    // --------------------------------------------------------------------

    fn push_container(&mut self, kind: ContainerKind) -> Result<(), ParserError> {
        if self.stack.len() >= self.options.max_depth {
            return Err(ParserError::DepthExceeded(self.options.max_depth));
        }

        let path = self.target_path();
        let schema = self
            .validator
            .as_ref()
            .and_then(|validator| validator.schema_at(&path));

        // Early type rejection: a container that can never satisfy the
        // schema at its path is reported as soon as it opens, not when it
        // closes. Parsing continues regardless. The message matches the
        // validator's own `type` error so the close-time revalidation
        // deduplicates against it.
        let value_kind = match kind {
            ContainerKind::Object => ValueKind::Object,
            ContainerKind::Array => ValueKind::Array,
        };
        if let Some(schema) = &schema {
            if !Validator::admits_kind(schema, value_kind) {
                let message = match &schema.schema_type {
                    Some(types) => {
                        let expected: Vec<String> =
                            types.iter().map(|t| t.to_string()).collect();
                        format!("expected {} but got {value_kind}", expected.join(" or "))
                    }
                    None => format!("a value of type {value_kind} is not permitted here"),
                };
                let error = ValidationError {
                    path: path.iter().map(ToString::to_string).collect(),
                    message,
                    keyword: "type",
                    schema: Some(schema.clone()),
                    value: None,
                };
                self.push_validation_error(error);
            }
        }

        self.mark_pending(&path);
        self.stack.push(Frame::new(kind, schema));
        self.state = match kind {
            ContainerKind::Object => ParseState::ExpectingKey,
            ContainerKind::Array => ParseState::InArray,
        };
        Ok(())
    }

    /// Pops the top frame, validates its completed value, and assigns it to
    /// the parent slot (or makes it the root).
    fn close_container(
        &mut self,
        expected: ContainerKind,
        token: &Token,
    ) -> Result<(), ParserError> {
        if self.top_kind() != Some(expected) {
            return self.syntax_or_recover(token, "mismatched closing delimiter");
        }

        let path = self.container_path();
        let Some(frame) = self.stack.pop() else {
            return self.syntax_or_recover(token, "no open container to close");
        };
        let value = frame.value;

        let errors = match (&self.validator, &frame.schema) {
            (Some(validator), Some(schema)) => validator.validate_with(schema, &value, &path),
            _ => Vec::new(),
        };
        for error in errors {
            self.push_validation_error(error);
        }

        self.mark_completed(&path);
        if let Some(events) = self.events.as_deref_mut() {
            events.on_partial_object(&value, &path);
        }

        if let Some(parent) = self.stack.last_mut() {
            match parent.kind {
                ContainerKind::Object => {
                    let Some(key) = parent.pending_key.take() else {
                        unreachable!("a closing child requires a pending key on its parent");
                    };
                    parent.seen_keys.insert(key.clone());
                    if let Value::Object(map) = &mut parent.value {
                        map.insert(key.clone(), value.clone());
                    }
                    let parent_path = &path[..path.len() - 1];
                    if let Some(events) = self.events.as_deref_mut() {
                        events.on_complete_field(&key, &value, parent_path);
                    }
                }
                ContainerKind::Array => {
                    if let Value::Array(items) = &mut parent.value {
                        items.push(value);
                    }
                    parent.index += 1;
                }
            }
            self.state = ParseState::ExpectingCommaOrEnd;
        } else {
            self.state = ParseState::Complete;
            if let Some(events) = self.events.as_deref_mut() {
                events.on_complete(&value);
            }
            self.root = Some(value);
        }
        Ok(())
    }

    /// A scalar landed on the pending key of the top object frame.
    fn assign_scalar(&mut self, value: Value) -> Result<(), ParserError> {
        let target = self.target_path();
        self.validate_at(&value, &target);

        let parent_path = self.container_path();
        let Some(frame) = self.stack.last_mut() else {
            unreachable!("scalar assignment requires an open object");
        };
        let Some(key) = frame.pending_key.take() else {
            unreachable!("scalar assignment requires a pending key");
        };
        frame.seen_keys.insert(key.clone());
        if let Value::Object(map) = &mut frame.value {
            map.insert(key.clone(), value.clone());
        }

        self.mark_completed(&target);
        if let Some(events) = self.events.as_deref_mut() {
            events.on_complete_field(&key, &value, &parent_path);
        }
        self.state = ParseState::ExpectingCommaOrEnd;
        Ok(())
    }

    /// A scalar landed at the next index of the top array frame.
    fn append_scalar(&mut self, value: Value) -> Result<(), ParserError> {
        let target = self.target_path();
        self.validate_at(&value, &target);

        let Some(frame) = self.stack.last_mut() else {
            unreachable!("array append requires an open array");
        };
        if let Value::Array(items) = &mut frame.value {
            items.push(value);
        }
        frame.index += 1;

        self.mark_completed(&target);
        self.state = ParseState::ExpectingCommaOrEnd;
        Ok(())
    }

    /// A scalar is the whole document.
    fn complete_root(&mut self, value: Value) -> Result<(), ParserError> {
        self.validate_at(&value, &[]);
        self.mark_completed(&[]);
        self.state = ParseState::Complete;
        if let Some(events) = self.events.as_deref_mut() {
            events.on_complete(&value);
        }
        self.root = Some(value);
        Ok(())
    }

    /// Lenient `{"a": }`: the key never received a value; forget its
    /// pending entry before closing.
    fn drop_dangling_key(&mut self) {
        let target = self.target_path();
        if let Some(frame) = self.stack.last_mut() {
            if frame.pending_key.take().is_some() {
                self.pending.remove(&join_path(&target));
            }
        }
    }

    // --------------------------------------------------------------------
    // Paths and bookkeeping
    // --------------------------------------------------------------------

    /// Path of the value currently under construction: every frame
    /// contributes the slot its child occupies, including the top frame's.
    fn target_path(&self) -> Path {
        self.stack
            .iter()
            .filter_map(Frame::slot)
            .collect()
    }

    /// Path of the innermost open container: the slots of every frame
    /// below the top one.
    fn container_path(&self) -> Path {
        let below_top = self.stack.len().saturating_sub(1);
        self.stack[..below_top]
            .iter()
            .filter_map(Frame::slot)
            .collect()
    }

    fn top_kind(&self) -> Option<ContainerKind> {
        self.stack.last().map(|f| f.kind)
    }

    /// Keys containing `.` can collide with an already-completed path in
    /// the dot-joined form; completion wins so the two views stay disjoint.
    fn mark_pending(&mut self, path: &[PathComponent]) {
        let joined = join_path(path);
        if !self.completed.contains(&joined) {
            self.pending.insert(joined);
        }
    }

    fn mark_completed(&mut self, path: &[PathComponent]) {
        let joined = join_path(path);
        self.pending.remove(&joined);
        self.completed.insert(joined);
    }

    fn validate_at(&mut self, value: &Value, path: &[PathComponent]) {
        let Some(validator) = &self.validator else {
            return;
        };
        for error in validator.validate_at(value, path) {
            self.push_validation_error(error);
        }
    }

    /// Records an error unless an identical one is already present. A
    /// value revalidated when its enclosing container closes would
    /// otherwise double-report.
    fn push_validation_error(&mut self, error: ValidationError) {
        let duplicate = self.errors.iter().any(|e| {
            e.keyword == error.keyword && e.path == error.path && e.message == error.message
        });
        if duplicate {
            return;
        }
        if let Some(events) = self.events.as_deref_mut() {
            events.on_validation_error(&error);
        }
        self.errors.push(error);
    }

    fn record_syntax_error(&mut self, message: String, position: usize) {
        tracing::debug!(position, %message, "syntax error tolerated");
        let path = self.container_path();
        self.push_validation_error(ValidationError {
            path: path.iter().map(ToString::to_string).collect(),
            message: format!("{message} at position {position}"),
            keyword: "syntax",
            schema: None,
            value: None,
        });
    }

    fn syntax_or_recover(&mut self, token: &Token, expected: &str) -> Result<(), ParserError> {
        let message = format!("{expected}, found {:?}", token.raw);
        if self.options.lenient() {
            self.record_syntax_error(message, token.position);
            self.resyncing = true;
            return Ok(());
        }
        Err(ParserError::Syntax {
            message,
            position: token.position,
        })
    }

    // --------------------------------------------------------------------
    // Snapshots
    // --------------------------------------------------------------------

    /// Folds the tokenizer's current partial classification into the
    /// pending view. Replaced wholesale on every feed: a partially buffered
    /// key spelled `"na` today is `"name"` tomorrow.
    fn refresh_partial_pending(&mut self) {
        self.partial_pending = None;
        let Some(partial) = self.tokenizer.partial_token() else {
            return;
        };
        let path = match partial.kind {
            TokenKind::PartialKey => {
                let text = partial
                    .value
                    .as_ref()
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                let mut path = self.container_path();
                path.push(PathComponent::Key(text.to_string()));
                path
            }
            TokenKind::PartialString | TokenKind::PartialNumber => self.target_path(),
            _ => return,
        };
        let joined = join_path(&path);
        if !self.completed.contains(&joined) {
            self.partial_pending = Some(joined);
        }
    }

    fn snapshot(&self) -> ParseResult {
        let mut pending_fields: Vec<String> = self.pending.iter().cloned().collect();
        if let Some(partial) = &self.partial_pending {
            if !self.pending.contains(partial) {
                pending_fields.push(partial.clone());
                pending_fields.sort();
            }
        }
        ParseResult {
            complete: self.state == ParseState::Complete,
            valid: self.errors.is_empty(),
            data: self.snapshot_data(),
            completed_fields: self.completed.iter().cloned().collect(),
            pending_fields,
            errors: self.errors.clone(),
            depth: self.stack.len(),
            bytes_processed: self.bytes_processed,
        }
    }

    /// Stitches the open container stack into one value: each frame's
    /// snapshot is inserted at its slot in the frame below, bottoming out
    /// at the root.
    fn snapshot_data(&self) -> Option<Value> {
        if let Some(root) = &self.root {
            return Some(root.clone());
        }
        let mut child: Option<Value> = None;
        for frame in self.stack.iter().rev() {
            let mut value = frame.value.clone();
            if let Some(inner) = child.take() {
                match (&mut value, frame.slot()) {
                    (Value::Object(map), Some(PathComponent::Key(key))) => {
                        map.insert(key, inner);
                    }
                    (Value::Array(items), _) => items.push(inner),
                    _ => {}
                }
            }
            child = Some(value);
        }
        child
    }
}

fn scalar_value(token: Token) -> Value {
    token.value.unwrap_or_default()
}
