//! Static file serving module
//!
//! Serves stored videos under the static prefix with MIME detection,
//! conditional requests and single byte-range support. Bodies are streamed
//! from disk in chunks, limited to the requested slice.

use crate::error::VideoError;
use crate::handler::router::RequestContext;
use crate::http::{
    self, cache, mime, range::RangeParseResult, FileHeaders, HttpResponse, ResponseBody,
};
use crate::storage::{decode_segment, VideoStore};
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use http_body_util::{BodyExt, StreamBody};
use hyper::body::Frame;
use std::io::{self, SeekFrom};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

pub async fn serve_stored_file(
    ctx: &RequestContext<'_>,
    raw_name: &str,
    store: &VideoStore,
) -> Result<HttpResponse, VideoError> {
    let path = decode_segment(raw_name)
        .and_then(|name| store.resolve(&name))
        .ok_or(VideoError::RouteNotFound)?;

    let file = match File::open(&path).await {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(VideoError::RouteNotFound),
        Err(e) => return Err(e.into()),
    };

    let metadata = file.metadata().await?;
    if !metadata.is_file() {
        return Err(VideoError::RouteNotFound);
    }

    let size = metadata.len();
    let modified: Option<DateTime<Utc>> = metadata.modified().ok().map(DateTime::from);
    let etag = cache::generate_etag(size, modified);
    let last_modified = modified.map(cache::format_http_date);
    let headers = FileHeaders {
        content_type: mime::content_type_for(&path),
        etag: &etag,
        last_modified: last_modified.as_deref(),
    };

    if cache::is_not_modified(ctx.if_none_match, ctx.if_modified_since, &etag, modified) {
        return Ok(http::build_304_response(&headers));
    }

    match http::parse_range_header(ctx.range_header, size) {
        RangeParseResult::Partial(range) => {
            let body = if ctx.is_head {
                http::empty_body()
            } else {
                slice_body(file, range.start, range.len()).await?
            };
            Ok(http::build_partial_response(body, range, size, &headers))
        }
        RangeParseResult::NotSatisfiable => Ok(http::build_416_response(size)),
        RangeParseResult::Full => {
            let body = if ctx.is_head {
                http::empty_body()
            } else {
                slice_body(file, 0, size).await?
            };
            Ok(http::build_file_response(body, size, &headers))
        }
    }
}

/// Stream `len` bytes starting at `start`
async fn slice_body(mut file: File, start: u64, len: u64) -> io::Result<ResponseBody> {
    file.seek(SeekFrom::Start(start)).await?;
    let chunks = ReaderStream::new(file.take(len)).map_ok(Frame::data);
    Ok(StreamBody::new(chunks).boxed_unsync())
}
