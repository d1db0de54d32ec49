//! Decoding of `\uXXXX` escape sequences, including surrogate pairs.

use std::collections::VecDeque;

/// Outcome of scanning a unicode escape in the carry buffer.
#[derive(Debug, PartialEq)]
pub(crate) enum UnicodeScan {
    /// A scalar value was decoded; `consumed` counts the characters read
    /// after the introducing `\u` (4 for a BMP escape, 10 for a pair).
    Decoded { ch: char, consumed: usize },
    /// The buffer ended inside the escape; retry once more input arrives.
    NeedMore,
    /// The escape cannot form a scalar value (bad hex digit, lone or
    /// mismatched surrogate).
    Invalid,
}

fn hex_val(c: char) -> Option<u32> {
    c.to_digit(16)
}

/// Reads exactly four hex digits starting at `at`.
fn read_hex4(buf: &VecDeque<char>, at: usize) -> Option<Result<u32, ()>> {
    let mut acc = 0u32;
    for offset in 0..4 {
        let c = *buf.get(at + offset)?;
        match hex_val(c) {
            Some(d) => acc = (acc << 4) | d,
            None => return Some(Err(())),
        }
    }
    Some(Ok(acc))
}

/// Scans the escape body starting at `at`, which must point just past a
/// `\u` introducer. High surrogates require an immediately following
/// `\uXXXX` low surrogate and decode to the combined supplementary
/// character.
pub(crate) fn scan_unicode_escape(buf: &VecDeque<char>, at: usize) -> UnicodeScan {
    let first = match read_hex4(buf, at) {
        None => return UnicodeScan::NeedMore,
        Some(Err(())) => return UnicodeScan::Invalid,
        Some(Ok(v)) => v,
    };

    match first {
        // Lone low surrogate half.
        0xDC00..=0xDFFF => UnicodeScan::Invalid,
        0xD800..=0xDBFF => {
            // A pair: the low half must follow as another `\uXXXX`.
            match (buf.get(at + 4), buf.get(at + 5)) {
                (None, _) | (Some('\\'), None) => UnicodeScan::NeedMore,
                (Some('\\'), Some('u')) => match read_hex4(buf, at + 6) {
                    None => UnicodeScan::NeedMore,
                    Some(Err(())) => UnicodeScan::Invalid,
                    Some(Ok(low @ 0xDC00..=0xDFFF)) => {
                        let code = 0x10000 + ((first - 0xD800) << 10) + (low - 0xDC00);
                        match char::from_u32(code) {
                            Some(ch) => UnicodeScan::Decoded { ch, consumed: 10 },
                            None => UnicodeScan::Invalid,
                        }
                    }
                    Some(Ok(_)) => UnicodeScan::Invalid,
                },
                _ => UnicodeScan::Invalid,
            }
        }
        code => match char::from_u32(code) {
            Some(ch) => UnicodeScan::Decoded { ch, consumed: 4 },
            None => UnicodeScan::Invalid,
        },
    }
}
