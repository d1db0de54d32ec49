use crate::validator::ValidationError;
use crate::value::Value;

/// Snapshot of parser progress, returned by every
/// [`StreamingParser::feed`](crate::StreamingParser::feed) call.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseResult {
    /// The root value has been fully parsed.
    pub complete: bool,
    /// No validation (or lenient-mode syntax) errors so far.
    pub valid: bool,
    /// The partial or final root. For an open root container this is the
    /// growing value with all currently open descendants stitched in; for
    /// a root scalar it stays `None` until the parse completes.
    pub data: Option<Value>,
    /// Dot-joined paths whose values are fully parsed. The root is the
    /// empty string. Grows monotonically within one parse.
    pub completed_fields: Vec<String>,
    /// Dot-joined paths currently under construction, including the
    /// classification of any partially buffered lexeme.
    pub pending_fields: Vec<String>,
    /// All errors accumulated so far, in discovery order.
    pub errors: Vec<ValidationError>,
    /// Current container stack depth.
    pub depth: usize,
    /// Cumulative characters fed across all `feed` calls.
    pub bytes_processed: usize,
}
