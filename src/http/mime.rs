//! MIME type detection module
//!
//! Content-Type for files served from the storage directory, keyed by
//! extension.

use std::path::Path;

/// Media type every upload must declare
pub const MP4_CONTENT_TYPE: &str = "video/mp4";

/// Get MIME Content-Type based on file extension
///
/// # Examples
/// ```
/// use emergency_video_server::http::mime::get_content_type;
/// assert_eq!(get_content_type(Some("mp4")), "video/mp4");
/// assert_eq!(get_content_type(Some("MP4")), "video/mp4");
/// assert_eq!(get_content_type(None), "application/octet-stream");
/// ```
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    let Some(ext) = extension else {
        return "application/octet-stream";
    };

    match ext.to_ascii_lowercase().as_str() {
        "mp4" | "m4v" => MP4_CONTENT_TYPE,
        "webm" => "video/webm",
        "ogv" => "video/ogg",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "m4a" => "audio/mp4",
        "html" | "htm" => "text/html; charset=utf-8",
        "txt" => "text/plain; charset=utf-8",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}

/// Content-Type for a stored file path
pub fn content_type_for(path: &Path) -> &'static str {
    get_content_type(path.extension().and_then(|e| e.to_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_types() {
        assert_eq!(get_content_type(Some("mp4")), "video/mp4");
        assert_eq!(get_content_type(Some("webm")), "video/webm");
        assert_eq!(get_content_type(Some("mov")), "video/quicktime");
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(get_content_type(Some("xyz")), "application/octet-stream");
        assert_eq!(get_content_type(None), "application/octet-stream");
    }

    #[test]
    fn test_content_type_for_path() {
        assert_eq!(
            content_type_for(Path::new("emergency_videos/1700000000000.mp4")),
            "video/mp4"
        );
        assert_eq!(
            content_type_for(Path::new("emergency_videos/README")),
            "application/octet-stream"
        );
    }
}
