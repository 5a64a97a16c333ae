//! HTTP response building module
//!
//! Builders for every response shape the service emits. Building never
//! panics: a builder failure is logged and replaced by an empty 500.
//!
//! Bodies are boxed so in-memory payloads and file streams share one
//! response type.

use crate::error::VideoError;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full};
use hyper::body::Bytes;
use hyper::header::{
    ACCEPT_RANGES, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, ALLOW, CACHE_CONTROL, CONTENT_LENGTH,
    CONTENT_RANGE, CONTENT_TYPE, ETAG, LAST_MODIFIED,
};
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::io;

use super::cache::STATIC_CACHE_CONTROL;
use super::range::ByteRange;

pub type ResponseBody = UnsyncBoxBody<Bytes, io::Error>;
pub type HttpResponse = Response<ResponseBody>;

/// Body holding `data` in memory
pub fn full_body(data: impl Into<Bytes>) -> ResponseBody {
    Full::<Bytes>::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

pub fn empty_body() -> ResponseBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Methods accepted somewhere in the router
pub const ALLOWED_METHODS: &str = "GET, HEAD, POST, OPTIONS";

/// Error body, `{"detail": "..."}`
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub detail: &'a str,
}

/// Validators and type of a stored file
#[derive(Debug, Clone)]
pub struct FileHeaders<'a> {
    pub content_type: &'a str,
    pub etag: &'a str,
    pub last_modified: Option<&'a str>,
}

/// Build a JSON response from any serializable value
pub fn build_json_response<T: Serialize>(status: StatusCode, value: &T) -> HttpResponse {
    let body = match serde_json::to_vec(value) {
        Ok(body) => body,
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize JSON response: {e}"));
            return build_500_response();
        }
    };

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .header(CONTENT_LENGTH, body.len())
        .body(full_body(body))
        .unwrap_or_else(|e| fallback(status.as_str(), &e))
}

/// Convert a handler error into its response
pub fn build_error_response(err: &VideoError) -> HttpResponse {
    let Some(detail) = err.detail() else {
        return build_500_response();
    };

    let mut response = build_json_response(err.status(), &ErrorBody { detail: &detail });
    if let VideoError::MethodNotAllowed { allow } = err {
        if let Ok(value) = allow.parse() {
            response.headers_mut().insert(ALLOW, value);
        }
    }
    response
}

/// Build 500 Internal Server Error response
pub fn build_500_response() -> HttpResponse {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(full_body(Bytes::from_static(b"Internal Server Error")))
        .unwrap_or_else(|e| fallback("500", &e))
}

/// Build generic HTML response
pub fn build_html_response(content: String, is_head: bool) -> HttpResponse {
    let content_length = content.len();
    let body = if is_head {
        empty_body()
    } else {
        full_body(content)
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/html; charset=utf-8")
        .header(CONTENT_LENGTH, content_length)
        .body(body)
        .unwrap_or_else(|e| fallback("HTML", &e))
}

/// Build plain-text health probe response
pub fn build_health_response(status: StatusCode, text: &'static str) -> HttpResponse {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(CACHE_CONTROL, "no-store")
        .body(full_body(Bytes::from_static(text.as_bytes())))
        .unwrap_or_else(|e| fallback("health", &e))
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(enable_cors: bool) -> HttpResponse {
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(ALLOW, ALLOWED_METHODS);

    if enable_cors {
        builder = builder
            .header(ACCESS_CONTROL_ALLOW_ORIGIN, "*")
            .header(ACCESS_CONTROL_ALLOW_METHODS, ALLOWED_METHODS)
            .header(ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type, Range")
            .header(ACCESS_CONTROL_MAX_AGE, "86400");
    }

    builder
        .body(empty_body())
        .unwrap_or_else(|e| fallback("OPTIONS", &e))
}

/// Build 304 Not Modified response
pub fn build_304_response(headers: &FileHeaders<'_>) -> HttpResponse {
    let mut builder = Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header(ETAG, headers.etag)
        .header(CACHE_CONTROL, STATIC_CACHE_CONTROL);
    if let Some(last_modified) = headers.last_modified {
        builder = builder.header(LAST_MODIFIED, last_modified);
    }

    builder
        .body(empty_body())
        .unwrap_or_else(|e| fallback("304", &e))
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(file_size: u64) -> HttpResponse {
    Response::builder()
        .status(StatusCode::RANGE_NOT_SATISFIABLE)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(CONTENT_RANGE, format!("bytes */{file_size}"))
        .body(full_body(Bytes::from_static(b"Range Not Satisfiable")))
        .unwrap_or_else(|e| fallback("416", &e))
}

/// Build 200 response for a whole stored file
///
/// `size` is the file length; `body` is empty for HEAD requests.
pub fn build_file_response(body: ResponseBody, size: u64, headers: &FileHeaders<'_>) -> HttpResponse {
    file_response_builder(StatusCode::OK, size, headers)
        .body(body)
        .unwrap_or_else(|e| fallback("200", &e))
}

/// Build 206 Partial Content response
pub fn build_partial_response(
    body: ResponseBody,
    range: ByteRange,
    total_size: u64,
    headers: &FileHeaders<'_>,
) -> HttpResponse {
    file_response_builder(StatusCode::PARTIAL_CONTENT, range.len(), headers)
        .header(CONTENT_RANGE, range.content_range(total_size))
        .body(body)
        .unwrap_or_else(|e| fallback("206", &e))
}

fn file_response_builder(
    status: StatusCode,
    content_length: u64,
    headers: &FileHeaders<'_>,
) -> hyper::http::response::Builder {
    let mut builder = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, headers.content_type)
        .header(CONTENT_LENGTH, content_length)
        .header(ACCEPT_RANGES, "bytes")
        .header(ETAG, headers.etag)
        .header(CACHE_CONTROL, STATIC_CACHE_CONTROL);
    if let Some(last_modified) = headers.last_modified {
        builder = builder.header(LAST_MODIFIED, last_modified);
    }
    builder
}

/// Log response build error and fall back to an empty 500
fn fallback(kind: &str, error: &hyper::http::Error) -> HttpResponse {
    crate::logger::log_error(&format!("Failed to build {kind} response: {error}"));
    let mut response = Response::new(empty_body());
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}
