//! Request handler module
//!
//! Routing plus the three handlers: upload, video page and the static
//! file server for the storage directory.

pub mod router;
pub mod static_files;
pub mod upload;
pub mod video_page;

// Re-export main entry point
pub use router::handle_request;
