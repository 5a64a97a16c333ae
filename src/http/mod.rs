//! HTTP protocol layer module
//!
//! Protocol helpers shared by the handlers: response builders, cache
//! validators, range parsing and MIME detection.

pub mod cache;
pub mod mime;
pub mod range;
pub mod response;

pub use range::parse_range_header;
pub use response::{
    build_304_response, build_416_response, build_500_response, build_error_response,
    build_file_response, build_health_response, build_html_response, build_json_response,
    build_options_response, build_partial_response, empty_body, full_body, FileHeaders,
    HttpResponse, ResponseBody,
};
