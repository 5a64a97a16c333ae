//! Request error types
//!
//! Every failure a handler can produce, with the status code and the
//! client-facing `detail` message it maps to.

use hyper::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VideoError {
    /// Upload part did not declare `video/mp4`
    #[error("Uploaded file must be an mp4 video")]
    NotMp4,

    #[error("Video not found")]
    VideoNotFound,

    /// Multipart body had no `file` part
    #[error("Field required: file")]
    MissingFile,

    #[error("There was an error parsing the body")]
    MalformedBody { reason: String },

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Not Found")]
    RouteNotFound,

    #[error("Method Not Allowed")]
    MethodNotAllowed { allow: &'static str },

    /// Unhandled storage failure, surfaced without a custom message
    #[error("storage I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

impl VideoError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotMp4 | Self::MalformedBody { .. } => StatusCode::BAD_REQUEST,
            Self::VideoNotFound | Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::MissingFile => StatusCode::UNPROCESSABLE_ENTITY,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message for the `{"detail": ...}` body, `None` for server faults
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::Io(_) => None,
            other => Some(other.to_string()),
        }
    }
}

impl From<multer::Error> for VideoError {
    fn from(err: multer::Error) -> Self {
        match err {
            multer::Error::StreamSizeExceeded { .. } | multer::Error::FieldSizeExceeded { .. } => {
                Self::PayloadTooLarge
            }
            other => Self::MalformedBody {
                reason: other.to_string(),
            },
        }
    }
}
