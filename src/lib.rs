//! Emergency video server
//!
//! A small HTTP service that accepts MP4 uploads, stores them under
//! millisecond-timestamp names and serves them back through an HTML player
//! page and a static file route.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
pub mod storage;
