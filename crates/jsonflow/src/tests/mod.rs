mod lenient;
mod parse_bad;
mod property_partition;

use crate::{ParserOptions, StreamingParser, Value};

/// Feeds every chunk and returns the completed root value, panicking on
/// anything short of a clean parse.
pub(crate) fn finish_seq(chunks: &[&str]) -> Value {
    finish_seq_with(ParserOptions::default(), chunks)
}

pub(crate) fn finish_seq_with(options: ParserOptions, chunks: &[&str]) -> Value {
    let mut parser = StreamingParser::new(options);
    for &chunk in chunks {
        parser.feed(chunk).expect("feed failed");
    }
    parser.result().expect("expected a complete document").clone()
}
