use crate::parser::error::ParserError;
use crate::path::PathComponent;
use crate::validator::ValidationError;
use crate::value::Value;

/// Progress observer for a streaming parse.
///
/// All methods default to no-ops; implement the ones you care about and
/// install the observer with
/// [`StreamingParser::with_events`](crate::StreamingParser::with_events).
/// Events fire in the order their triggering transitions occur, strictly
/// before `feed` returns.
///
/// Paths are delivered as [`PathComponent`] slices, the authoritative
/// form, unambiguous even for keys containing `.`.
pub trait ParserEvents {
    /// A container closed; `value` is its complete contents.
    fn on_partial_object(&mut self, value: &Value, path: &[PathComponent]) {
        let _ = (value, path);
    }

    /// A scalar or nested container was assigned to an object key.
    fn on_complete_field(&mut self, key: &str, value: &Value, parent_path: &[PathComponent]) {
        let _ = (key, value, parent_path);
    }

    /// A validation (or lenient-mode syntax) error was recorded.
    fn on_validation_error(&mut self, error: &ValidationError) {
        let _ = error;
    }

    /// The root value is complete.
    fn on_complete(&mut self, root: &Value) {
        let _ = root;
    }

    /// A fatal error stopped the parse.
    fn on_error(&mut self, error: &ParserError) {
        let _ = error;
    }
}
