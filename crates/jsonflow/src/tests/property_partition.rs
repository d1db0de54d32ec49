use quickcheck::QuickCheck;

use crate::{ParserOptions, StreamingParser, Value};

/// Property: feeding a document in arbitrarily sized chunks yields the same
/// value as the original, with every snapshot invariant holding along the
/// way. Since the partition is arbitrary, equality with the source value
/// also establishes chunking invariance between any two partitions.
#[test]
fn partition_roundtrip_quickcheck() {
    fn prop(value: Value, splits: Vec<usize>) -> bool {
        let src = value.to_string();

        // The serialized form must be plain valid JSON.
        let reference: Value = match serde_json::from_str::<serde_json::Value>(&src) {
            Ok(parsed) => Value::from(parsed),
            Err(_) => return false,
        };
        if reference != value {
            return false;
        }

        let mut parser = StreamingParser::new(ParserOptions::default());
        let chars: Vec<char> = src.chars().collect();
        let mut index = 0;
        let mut remaining = chars.len();
        let mut previously_completed: Vec<String> = Vec::new();

        for split in splits {
            if remaining == 0 {
                break;
            }
            let size = 1 + (split % remaining);
            let chunk: String = chars[index..index + size].iter().collect();
            let Ok(result) = parser.feed(&chunk) else {
                return false;
            };

            // Monotonicity: completed paths never disappear.
            if !previously_completed
                .iter()
                .all(|p| result.completed_fields.contains(p))
            {
                return false;
            }
            previously_completed = result.completed_fields.clone();

            // Disjointness of the completed and pending views.
            if result
                .pending_fields
                .iter()
                .any(|p| result.completed_fields.contains(p))
            {
                return false;
            }

            index += size;
            remaining -= size;
        }
        if remaining > 0 {
            let chunk: String = chars[index..].iter().collect();
            if parser.feed(&chunk).is_err() {
                return false;
            }
        }

        // Root numbers stay buffered until a terminator arrives; trailing
        // whitespace is a no-op for every other document.
        let Ok(last) = parser.feed(" ") else {
            return false;
        };

        last.complete && last.errors.is_empty() && parser.result().ok() == Some(&value)
    }

    QuickCheck::new()
        .tests(500)
        .quickcheck(prop as fn(Value, Vec<usize>) -> bool);
}

/// Property: the validator returns identical error lists on repeated calls
/// with the same inputs.
#[test]
fn validator_idempotence_quickcheck() {
    use crate::{Schema, Validator};

    fn prop(value: Value) -> bool {
        let schema = Schema::parse(
            r#"{"type": "object",
                "required": ["id"],
                "properties": {"id": {"type": "integer", "minimum": 0}},
                "additionalProperties": {"type": "string"}}"#,
        )
        .unwrap();
        let validator = Validator::new(schema);
        validator.validate(&value) == validator.validate(&value)
    }

    QuickCheck::new()
        .tests(200)
        .quickcheck(prop as fn(Value) -> bool);
}
