//! Benchmark – `jsonflow::StreamingParser`
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use jsonflow::{ParserOptions, Schema, StreamingParser};

/// Produce a deterministic JSON document whose textual representation is
/// exactly `target_len` bytes, so every scenario operates on the same amount
/// of data.
fn make_json_payload(target_len: usize) -> String {
    // One large string property inside an object keeps the document valid
    // for any requested length.
    let overhead = "{\"data\":\"\"}".len();
    assert!(target_len >= overhead, "target_len must be >= {overhead}");

    let content_len = target_len - overhead;
    let mut s = String::with_capacity(target_len);
    s.push_str("{\"data\":\"");
    s.extend(std::iter::repeat('a').take(content_len));
    s.push_str("\"}");
    debug_assert_eq!(s.len(), target_len);
    s
}

/// Feed `payload` in `parts` chunks and return the completed-field count so
/// criterion has something to black-box.
fn run_streaming_parser(payload: &str, parts: usize, options: ParserOptions) -> usize {
    assert!(parts > 0);
    let chunk_size = payload.len().div_ceil(parts);

    let mut parser = StreamingParser::new(options);
    let mut completed = 0;
    for chunk in payload.as_bytes().chunks(chunk_size) {
        let text = std::str::from_utf8(chunk).expect("ascii payload");
        let result = parser.feed(text).expect("valid payload");
        completed = result.completed_fields.len();
    }
    assert!(parser.is_complete());
    completed
}

fn bench_chunk_counts(c: &mut Criterion) {
    let payload = make_json_payload(64 * 1024);
    let mut group = c.benchmark_group("streaming_chunks");

    for parts in [1usize, 16, 256] {
        group.bench_with_input(BenchmarkId::from_parameter(parts), &parts, |b, &parts| {
            b.iter(|| {
                run_streaming_parser(
                    black_box(&payload),
                    parts,
                    ParserOptions::default(),
                )
            });
        });
    }
    group.finish();
}

fn bench_with_schema(c: &mut Criterion) {
    let payload = make_json_payload(64 * 1024);
    let schema = Schema::parse(
        r#"{"type": "object", "properties": {"data": {"type": "string"}}}"#,
    )
    .unwrap();

    c.bench_function("streaming_with_schema", |b| {
        b.iter(|| {
            run_streaming_parser(
                black_box(&payload),
                16,
                ParserOptions {
                    schema: Some(schema.clone()),
                    ..Default::default()
                },
            )
        });
    });
}

criterion_group!(benches, bench_chunk_counts, bench_with_schema);
criterion_main!(benches);
