//! HTTP Range request parsing module
//!
//! Single byte-range requests (RFC 7233) so browsers can seek in videos.

/// Inclusive byte range resolved against a known file size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered
    pub const fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` header value
    pub fn content_range(&self, total_size: u64) -> String {
        format!("bytes {}-{}/{total_size}", self.start, self.end)
    }
}

/// Outcome of evaluating a Range header
#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseResult {
    /// No usable Range header: serve the whole file
    Full,
    /// Serve this slice with 206
    Partial(ByteRange),
    /// Syntactically valid but outside the file: 416
    NotSatisfiable,
}

/// Parse HTTP Range header (single range only, bytes unit)
///
/// Supported forms: `bytes=start-end`, `bytes=start-`, `bytes=-suffix`.
/// Other units, multiple ranges and malformed values fall back to the
/// full content.
///
/// # Examples
/// ```
/// use emergency_video_server::http::range::{parse_range_header, ByteRange, RangeParseResult};
///
/// let result = parse_range_header(Some("bytes=0-99"), 1000);
/// assert_eq!(result, RangeParseResult::Partial(ByteRange { start: 0, end: 99 }));
///
/// assert_eq!(parse_range_header(None, 1000), RangeParseResult::Full);
/// ```
pub fn parse_range_header(range_header: Option<&str>, file_size: u64) -> RangeParseResult {
    let Some(ranges) = range_header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return RangeParseResult::Full;
    };

    if ranges.contains(',') {
        return RangeParseResult::Full;
    }

    let Some((first, last)) = ranges.split_once('-') else {
        return RangeParseResult::Full;
    };
    let (first, last) = (first.trim(), last.trim());

    if first.is_empty() {
        return suffix_range(last, file_size);
    }

    bounded_range(first, last, file_size)
}

/// `-N`: the last N bytes
fn suffix_range(suffix: &str, file_size: u64) -> RangeParseResult {
    let Ok(suffix) = suffix.parse::<u64>() else {
        return RangeParseResult::Full;
    };

    if suffix == 0 || file_size == 0 {
        return RangeParseResult::NotSatisfiable;
    }

    RangeParseResult::Partial(ByteRange {
        start: file_size.saturating_sub(suffix),
        end: file_size - 1,
    })
}

/// `A-` or `A-B`, with B clamped to the last byte
fn bounded_range(first: &str, last: &str, file_size: u64) -> RangeParseResult {
    let Ok(start) = first.parse::<u64>() else {
        return RangeParseResult::Full;
    };

    if start >= file_size {
        return RangeParseResult::NotSatisfiable;
    }

    let end = if last.is_empty() {
        file_size - 1
    } else {
        match last.parse::<u64>() {
            Ok(end) if end < start => return RangeParseResult::Full,
            Ok(end) => end.min(file_size - 1),
            Err(_) => return RangeParseResult::Full,
        }
    };

    RangeParseResult::Partial(ByteRange { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_range() {
        assert_eq!(parse_range_header(None, 100), RangeParseResult::Full);
    }

    #[test]
    fn test_bounded_range() {
        let RangeParseResult::Partial(r) = parse_range_header(Some("bytes=0-9"), 100) else {
            panic!("Expected Partial");
        };
        assert_eq!(r, ByteRange { start: 0, end: 9 });
        assert_eq!(r.len(), 10);
        assert_eq!(r.content_range(100), "bytes 0-9/100");
    }

    #[test]
    fn test_open_range() {
        assert_eq!(
            parse_range_header(Some("bytes=50-"), 100),
            RangeParseResult::Partial(ByteRange { start: 50, end: 99 })
        );
    }

    #[test]
    fn test_end_clamped_to_file() {
        assert_eq!(
            parse_range_header(Some("bytes=90-500"), 100),
            RangeParseResult::Partial(ByteRange { start: 90, end: 99 })
        );
    }

    #[test]
    fn test_suffix_range() {
        assert_eq!(
            parse_range_header(Some("bytes=-20"), 100),
            RangeParseResult::Partial(ByteRange { start: 80, end: 99 })
        );
        // Suffix longer than the file covers all of it
        assert_eq!(
            parse_range_header(Some("bytes=-500"), 100),
            RangeParseResult::Partial(ByteRange { start: 0, end: 99 })
        );
    }

    #[test]
    fn test_not_satisfiable() {
        assert_eq!(
            parse_range_header(Some("bytes=200-"), 100),
            RangeParseResult::NotSatisfiable
        );
        assert_eq!(
            parse_range_header(Some("bytes=-0"), 100),
            RangeParseResult::NotSatisfiable
        );
        assert_eq!(
            parse_range_header(Some("bytes=0-"), 0),
            RangeParseResult::NotSatisfiable
        );
        assert_eq!(
            parse_range_header(Some("bytes=-5"), 0),
            RangeParseResult::NotSatisfiable
        );
    }

    #[test]
    fn test_ignored_forms() {
        assert_eq!(parse_range_header(Some("bytes=a-b"), 100), RangeParseResult::Full);
        assert_eq!(
            parse_range_header(Some("bytes=0-9,20-29"), 100),
            RangeParseResult::Full
        );
        assert_eq!(parse_range_header(Some("items=0-9"), 100), RangeParseResult::Full);
        assert_eq!(parse_range_header(Some("bytes=9-0"), 100), RangeParseResult::Full);
    }
}
