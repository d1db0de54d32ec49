//! Reacts to fields of a streamed LLM tool-call response as they complete.
//!
//! The simulated assistant response is one JSON document delivered in small,
//! irregular chunks, the way `chat.completions`-style APIs hand out partial
//! tokens. A schema validates the payload *while it streams*: a wrongly
//! typed field is reported the moment it completes, not after the whole
//! response has arrived. Fields are printed as soon as they finish.
//!
//! Run with
//!
//! ```bash
//! cargo run -p jsonflow --example llm_stream
//! ```

use jsonflow::{
    ParserEvents, ParserOptions, PathComponent, Schema, StreamingParser, ValidationError, Value,
};

struct Printer;

impl ParserEvents for Printer {
    fn on_complete_field(&mut self, key: &str, value: &Value, parent_path: &[PathComponent]) {
        let location = jsonflow::join_path(parent_path);
        if location.is_empty() {
            println!("field ready: {key} = {value}");
        } else {
            println!("field ready: {location}.{key} = {value}");
        }
    }

    fn on_validation_error(&mut self, error: &ValidationError) {
        eprintln!("validation: {error}");
    }

    fn on_complete(&mut self, root: &Value) {
        println!("document complete: {root}");
    }
}

fn main() {
    let schema = Schema::parse(
        r#"{
            "type": "object",
            "required": ["tool", "arguments"],
            "properties": {
                "tool": {"type": "string"},
                "arguments": {
                    "type": "object",
                    "properties": {
                        "city": {"type": "string"},
                        "days": {"type": "integer", "minimum": 1, "maximum": 14}
                    }
                }
            }
        }"#,
    )
    .expect("schema is valid JSON");

    // LLM output is loosely formed often enough that lenient mode is the
    // right default for this workload.
    let mut parser = StreamingParser::with_events(
        ParserOptions {
            schema: Some(schema),
            llm_mode: true,
            ..Default::default()
        },
        Box::new(Printer),
    );

    let simulated_stream = [
        r#"{"tool": "get_wea"#,
        r#"ther", "arguments": {"ci"#,
        r#"ty": "Osa"#,
        r#"ka", "days": 2"#,
        r#"1}}"#,
    ];

    for chunk in simulated_stream {
        let snapshot = parser.feed(chunk).expect("lenient mode never raises here");
        println!(
            "  …pending: [{}]  depth: {}",
            snapshot.pending_fields.join(", "),
            snapshot.depth
        );
    }

    let result = parser.result().expect("stream ended mid-document");
    println!(
        "tool = {}",
        result
            .as_object()
            .and_then(|m| m.get("tool"))
            .map(ToString::to_string)
            .unwrap_or_default()
    );
}
