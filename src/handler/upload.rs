//! Video upload handler
//!
//! `POST /upload` takes a multipart body whose `file` part must declare
//! `video/mp4`. The part is streamed to `<storage>/<millis>.mp4` and the
//! generated name is returned as JSON.
//!
//! Two uploads landing in the same millisecond share a name; the later one
//! overwrites the earlier file.
//!
//! The part's `Content-Type` header is compared byte for byte, so
//! `Video/MP4` or `video/mp4; codecs=avc1` are rejected.

use crate::config::AppState;
use crate::error::VideoError;
use crate::http::mime::MP4_CONTENT_TYPE;
use crate::http::{self, HttpResponse};
use crate::logger;
use crate::storage::VideoStore;
use futures_util::{stream, Stream};
use http_body_util::BodyExt;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::http::request::Parts;
use hyper::StatusCode;
use multer::{Constraints, Field, Multipart, SizeLimit};
use serde::Serialize;
use std::error::Error as StdError;
use std::io;
use std::time::Duration;

/// Name of the multipart part carrying the video
pub const FILE_FIELD: &str = "file";

/// Successful upload body, `{"filename": "<millis>.mp4"}`
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub filename: String,
}

pub async fn upload_video<B>(
    parts: &Parts,
    body: B,
    state: &AppState,
) -> Result<HttpResponse, VideoError>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn StdError + Send + Sync>> + 'static,
{
    let max_body_size = state.config.http.max_body_size;
    check_body_size(parts, max_body_size)?;

    let boundary = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok())
        .ok_or_else(|| VideoError::MalformedBody {
            reason: "missing or non-multipart Content-Type".to_string(),
        })?;

    let constraints = Constraints::new().size_limit(SizeLimit::new().whole_stream(max_body_size));
    let mut multipart = Multipart::with_constraints(body.into_data_stream(), boundary, constraints);

    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(FILE_FIELD) {
            return save_field(field, state).await;
        }
    }

    Err(VideoError::MissingFile)
}

/// Validate the declared type and persist the part under a timestamp name
async fn save_field(field: Field<'static>, state: &AppState) -> Result<HttpResponse, VideoError> {
    let declared = field.headers().get(CONTENT_TYPE).map(HeaderValue::as_bytes);
    if declared != Some(MP4_CONTENT_TYPE.as_bytes()) {
        logger::log_upload_rejected(declared.map(String::from_utf8_lossy).as_deref());
        return Err(VideoError::NotMp4);
    }

    let filename = VideoStore::file_name_for(state.clock.now_millis());
    let chunks = with_idle_timeout(field, state.config.body_idle_timeout());
    let written = state.store.write(&filename, chunks).await?;
    logger::log_upload_saved(&filename, written);

    Ok(http::build_json_response(
        StatusCode::OK,
        &UploadResponse { filename },
    ))
}

/// Yield the part's chunks, failing if the client stalls longer than `idle`
/// between two of them
fn with_idle_timeout(
    field: Field<'static>,
    idle: Duration,
) -> impl Stream<Item = Result<Bytes, VideoError>> {
    stream::unfold(Some(field), move |field| async move {
        let mut field = field?;
        match tokio::time::timeout(idle, field.chunk()).await {
            Ok(Ok(Some(chunk))) => Some((Ok(chunk), Some(field))),
            Ok(Ok(None)) => None,
            Ok(Err(e)) => Some((Err(e.into()), None)),
            Err(_) => Some((
                Err(VideoError::Io(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("upload stalled for more than {} seconds", idle.as_secs()),
                ))),
                None,
            )),
        }
    })
}

/// Reject a declared Content-Length above the limit before reading the body
fn check_body_size(parts: &Parts, max_body_size: u64) -> Result<(), VideoError> {
    let Some(content_length) = parts.headers.get(CONTENT_LENGTH) else {
        return Ok(());
    };

    match content_length.to_str().ok().map(str::parse::<u64>) {
        Some(Ok(size)) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Err(VideoError::PayloadTooLarge)
        }
        Some(Ok(_)) => Ok(()),
        _ => {
            logger::log_warning("Invalid Content-Length header, skipping size check");
            Ok(())
        }
    }
}
