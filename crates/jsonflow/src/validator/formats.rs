//! Regex-backed `format` checks.
//!
//! Only the formats listed here are asserted; unrecognized format names pass
//! silently, as draft-07 permits.

use std::sync::LazyLock;

use regex::Regex;

static DATE_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})$").unwrap()
});

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})?$").unwrap());

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

static URI_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*:").unwrap());

static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$").unwrap()
});

static IPV4_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{1,3}\.){3}\d{1,3}$").unwrap());

static IPV6_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([0-9a-f]{1,4}:){7}[0-9a-f]{1,4}$").unwrap());

/// Checks `value` against a named format. Returns `None` for formats this
/// validator does not recognize.
pub(crate) fn check(format: &str, value: &str) -> Option<bool> {
    let re: &Regex = match format {
        "date-time" => &DATE_TIME_RE,
        "date" => &DATE_RE,
        "time" => &TIME_RE,
        "email" => &EMAIL_RE,
        "uri" => &URI_RE,
        "uuid" => &UUID_RE,
        "ipv4" => &IPV4_RE,
        "ipv6" => &IPV6_RE,
        _ => return None,
    };
    Some(re.is_match(value))
}
