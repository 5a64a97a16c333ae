//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: path matching, method checks,
//! error-to-response conversion and access logging.

use crate::config::AppState;
use crate::error::VideoError;
use crate::handler::{static_files, upload, video_page};
use crate::http::{self, HttpResponse};
use crate::logger::{self, AccessLogEntry};
use hyper::body::{Body, Bytes};
use hyper::header::{
    HeaderName, HeaderValue, CONTENT_LENGTH, IF_MODIFIED_SINCE, IF_NONE_MATCH, RANGE, SERVER,
};
use hyper::http::request::Parts;
use hyper::{Method, Request, StatusCode};
use std::convert::Infallible;
use std::error::Error as StdError;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

pub const UPLOAD_PATH: &str = "/upload";
pub const VIDEO_PAGE_PREFIX: &str = "/emergency-videos/";
pub const STATIC_PREFIX: &str = "/static/emergency-videos/";

const UPLOAD_ALLOW: &str = "POST, OPTIONS";
const READ_ALLOW: &str = "GET, HEAD, OPTIONS";

/// Request data the read-only handlers need
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub if_none_match: Option<&'a str>,
    pub if_modified_since: Option<&'a str>,
    pub range_header: Option<&'a str>,
}

impl<'a> RequestContext<'a> {
    pub fn from_parts(parts: &'a Parts) -> Self {
        let header = move |name: HeaderName| parts.headers.get(name).and_then(|v| v.to_str().ok());
        Self {
            path: parts.uri.path(),
            is_head: parts.method == Method::HEAD,
            if_none_match: header(IF_NONE_MATCH),
            if_modified_since: header(IF_MODIFIED_SINCE),
            range_header: header(RANGE),
        }
    }
}

/// Main entry point for HTTP request handling
///
/// Generic over the body so the router can be driven without a socket.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<HttpResponse, Infallible>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn StdError + Send + Sync>> + 'static,
{
    let started = Instant::now();
    let (parts, body) = req.into_parts();
    let access_log = state.config.logging.access_log;
    let mut entry = access_log.then(|| AccessLogEntry::from_request(&parts, peer_addr));

    let mut response = match route(&parts, body, &state).await {
        Ok(response) => response,
        Err(err) => {
            if let VideoError::Io(ref io_err) = err {
                logger::log_error(&format!("{} {}: {io_err}", parts.method, parts.uri.path()));
            } else if let VideoError::MalformedBody { ref reason } = err {
                logger::log_warning(&format!("Malformed upload body: {reason}"));
            }
            http::build_error_response(&err)
        }
    };

    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server);
    }

    if let Some(entry) = entry.as_mut() {
        entry.status = response.status().as_u16();
        entry.body_bytes = response_length(&response);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Declared body length, falling back to the body's exact size hint
fn response_length(response: &HttpResponse) -> u64 {
    response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .or_else(|| response.body().size_hint().exact())
        .unwrap_or(0)
}

/// Route request based on path and method
async fn route<B>(parts: &Parts, body: B, state: &AppState) -> Result<HttpResponse, VideoError>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn StdError + Send + Sync>> + 'static,
{
    let ctx = RequestContext::from_parts(parts);

    if parts.method == Method::OPTIONS {
        return Ok(http::build_options_response(state.config.http.enable_cors));
    }

    // Health check endpoints (highest priority, always fast)
    let health = &state.config.routes.health;
    if health.enabled {
        if ctx.path == health.liveness_path {
            return Ok(http::build_health_response(StatusCode::OK, "ok"));
        }
        if ctx.path == health.readiness_path {
            return Ok(if state.store.is_available().await {
                http::build_health_response(StatusCode::OK, "ok")
            } else {
                http::build_health_response(StatusCode::SERVICE_UNAVAILABLE, "unavailable")
            });
        }
    }

    if ctx.path == UPLOAD_PATH {
        if parts.method != Method::POST {
            return Err(VideoError::MethodNotAllowed {
                allow: UPLOAD_ALLOW,
            });
        }
        return upload::upload_video(parts, body, state).await;
    }

    if let Some(video_id) = single_segment(ctx.path, VIDEO_PAGE_PREFIX) {
        require_read_method(&parts.method)?;
        return video_page::serve_video_page(&ctx, video_id, &state.store).await;
    }

    if let Some(name) = single_segment(ctx.path, STATIC_PREFIX) {
        require_read_method(&parts.method)?;
        return static_files::serve_stored_file(&ctx, name, &state.store).await;
    }

    Err(VideoError::RouteNotFound)
}

/// The non-empty path segment following `prefix`, if it is the last one
fn single_segment<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    path.strip_prefix(prefix)
        .filter(|rest| !rest.is_empty() && !rest.contains('/'))
}

fn require_read_method(method: &Method) -> Result<(), VideoError> {
    if *method == Method::GET || *method == Method::HEAD {
        Ok(())
    } else {
        Err(VideoError::MethodNotAllowed { allow: READ_ALLOW })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::storage::VideoStore;
    use http_body_util::{BodyExt, Full};
    use hyper::header::{ALLOW, CONTENT_TYPE};

    async fn test_state(dir: &std::path::Path) -> Arc<AppState> {
        let mut config = Config::load_from("definitely-missing-config-file").unwrap();
        config.logging.access_log = false;
        let store = VideoStore::open(dir).await.unwrap();
        Arc::new(AppState::new(config, store))
    }

    async fn send(state: &Arc<AppState>, method: Method, uri: &str) -> HttpResponse {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .body(Full::new(Bytes::new()))
            .unwrap();
        handle_request(req, Arc::clone(state), "127.0.0.1:40000".parse().unwrap())
            .await
            .unwrap()
    }

    async fn body_string(response: HttpResponse) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_single_segment() {
        assert_eq!(single_segment("/emergency-videos/12", VIDEO_PAGE_PREFIX), Some("12"));
        assert_eq!(single_segment("/emergency-videos/", VIDEO_PAGE_PREFIX), None);
        assert_eq!(single_segment("/emergency-videos/a/b", VIDEO_PAGE_PREFIX), None);
        assert_eq!(single_segment("/upload", VIDEO_PAGE_PREFIX), None);
    }

    #[test]
    fn test_response_length() {
        let json = http::build_error_response(&VideoError::VideoNotFound);
        assert_eq!(response_length(&json), 28);

        let streamed = hyper::Response::new(
            http_body_util::StreamBody::new(futures_util::stream::empty::<
                Result<hyper::body::Frame<Bytes>, std::io::Error>,
            >())
            .boxed_unsync(),
        );
        assert_eq!(response_length(&streamed), 0);
    }

    #[tokio::test]
    async fn test_unknown_path_is_404_json() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(tmp.path()).await;

        let response = send(&state, Method::GET, "/nope").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(SERVER).unwrap(),
            "emergency-video-server"
        );
        assert_eq!(body_string(response).await, r#"{"detail":"Not Found"}"#);
    }

    #[tokio::test]
    async fn test_wrong_methods() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(tmp.path()).await;

        let response = send(&state, Method::GET, "/upload").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(ALLOW).unwrap(), "POST, OPTIONS");

        let response = send(&state, Method::DELETE, "/emergency-videos/1").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            body_string(response).await,
            r#"{"detail":"Method Not Allowed"}"#
        );
    }

    #[tokio::test]
    async fn test_options() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(tmp.path()).await;

        let response = send(&state, Method::OPTIONS, "/upload").await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().get(ALLOW).is_some());
    }

    #[tokio::test]
    async fn test_health_probes() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("videos");
        let state = test_state(&dir).await;

        let response = send(&state, Method::GET, "/healthz").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "ok");

        let response = send(&state, Method::GET, "/readyz").await;
        assert_eq!(response.status(), StatusCode::OK);

        std::fs::remove_dir(&dir).unwrap();
        let response = send(&state, Method::GET, "/readyz").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_upload_rejects_non_multipart() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(tmp.path()).await;

        let req = Request::builder()
            .method(Method::POST)
            .uri("/upload")
            .header(CONTENT_TYPE, "video/mp4")
            .body(Full::new(Bytes::from_static(b"raw bytes")))
            .unwrap();
        let response = handle_request(req, Arc::clone(&state), "127.0.0.1:1".parse().unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_string(response).await,
            r#"{"detail":"There was an error parsing the body"}"#
        );
    }
}
