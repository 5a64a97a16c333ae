//! Video storage module
//!
//! A single flat directory owns every uploaded video. There is no in-memory
//! index: existence is answered by the filesystem on each request.

mod clock;

pub use clock::{Clock, FixedClock, SystemClock};

use crate::error::VideoError;
use futures_util::{Stream, StreamExt};
use hyper::body::Bytes;
use percent_encoding::percent_decode_str;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncWriteExt, BufWriter};

/// Extension carried by every stored video
pub const VIDEO_EXTENSION: &str = ".mp4";

/// Percent-decode a raw URL path segment into a stored name
///
/// Invalid UTF-8 yields `None`. The result still has to pass
/// [`VideoStore::resolve`] before it touches the filesystem.
pub fn decode_segment(raw: &str) -> Option<String> {
    percent_decode_str(raw)
        .decode_utf8()
        .ok()
        .map(std::borrow::Cow::into_owned)
}

/// Handle to the verified storage directory
#[derive(Debug, Clone)]
pub struct VideoStore {
    root: PathBuf,
}

impl VideoStore {
    /// Create the storage directory if missing and return a handle to it
    ///
    /// Fails when the path exists but is not a directory.
    pub async fn open(dir: impl AsRef<Path>) -> io::Result<Self> {
        let root = dir.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;

        let metadata = fs::metadata(&root).await?;
        if !metadata.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("storage path '{}' is not a directory", root.display()),
            ));
        }

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Name given to a video uploaded at `millis`
    pub fn file_name_for(millis: i64) -> String {
        format!("{millis}{VIDEO_EXTENSION}")
    }

    /// Append `.mp4` to an identifier unless it already ends with it
    pub fn normalize(identifier: &str) -> String {
        if identifier.ends_with(VIDEO_EXTENSION) {
            identifier.to_string()
        } else {
            format!("{identifier}{VIDEO_EXTENSION}")
        }
    }

    /// Map a stored name to its path, refusing names that leave the directory
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
            return None;
        }
        Some(self.root.join(name))
    }

    /// Whether a regular file with this name exists
    pub async fn exists(&self, name: &str) -> bool {
        let Some(path) = self.resolve(name) else {
            return false;
        };
        fs::metadata(path).await.is_ok_and(|m| m.is_file())
    }

    /// Whether the storage directory itself is still present
    pub async fn is_available(&self) -> bool {
        fs::metadata(&self.root).await.is_ok_and(|m| m.is_dir())
    }

    /// Stream chunks into `<root>/<name>`, replacing any existing file
    ///
    /// The file is written at its final path. If the stream fails midway the
    /// truncated file stays behind. Returns the number of bytes written.
    pub async fn write<S, E>(&self, name: &str, chunks: S) -> Result<u64, VideoError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        VideoError: From<E>,
    {
        let path = self.resolve(name).ok_or_else(|| {
            VideoError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid video name '{name}'"),
            ))
        })?;

        let file = fs::File::create(&path).await?;
        let mut writer = BufWriter::new(file);
        let mut chunks = std::pin::pin!(chunks);
        let mut written = 0u64;

        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            writer.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        writer.flush().await?;
        Ok(written)
    }
}
