//! HTTP cache validation module
//!
//! `ETag` and `Last-Modified` validators for stored files, and the
//! conditional-request checks that turn into 304 responses.

use chrono::{DateTime, Utc};

/// `Cache-Control` value for files under the static prefix
pub const STATIC_CACHE_CONTROL: &str = "public, max-age=3600";

/// Build an `ETag` from file size and modification time
///
/// Stored videos are never rewritten in place by a reader, so size plus
/// mtime identifies a version without hashing the content.
pub fn generate_etag(size: u64, modified: Option<DateTime<Utc>>) -> String {
    let stamp = modified.map_or(0, |m| m.timestamp_micros());
    format!("\"{size:x}-{stamp:x}\"")
}

/// Format a timestamp as an HTTP date (RFC 7231 IMF-fixdate)
pub fn format_http_date(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Supports a single `ETag`, a comma-separated list, and the `*` wildcard.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag
            .split(',')
            .map(str::trim)
            .any(|e| e == etag || e == "*" || e.strip_prefix("W/") == Some(etag))
    })
}

/// Whether the file is unchanged since the client's `If-Modified-Since`
///
/// Unparseable dates are treated as absent.
pub fn not_modified_since(if_modified_since: Option<&str>, modified: Option<DateTime<Utc>>) -> bool {
    let (Some(header), Some(modified)) = (if_modified_since, modified) else {
        return false;
    };
    DateTime::parse_from_rfc2822(header.trim())
        .is_ok_and(|since| modified.timestamp() <= since.timestamp())
}

/// Evaluate conditional headers; `If-None-Match` takes precedence
pub fn is_not_modified(
    if_none_match: Option<&str>,
    if_modified_since: Option<&str>,
    etag: &str,
    modified: Option<DateTime<Utc>>,
) -> bool {
    if if_none_match.is_some() {
        return check_etag_match(if_none_match, etag);
    }
    not_modified_since(if_modified_since, modified)
}
