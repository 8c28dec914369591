//! Dropped-file port and data-URL production.
//!
//! [`DroppedFile`] models the single-shot reads the import pipeline relies
//! on: a file yields its decoded text or a base64 data-URL exactly once per
//! call, and a failed read is not retried.

use std::io;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

/// Error reading a dropped file.
#[derive(Debug, Error)]
#[error("failed to read dropped file {name}")]
pub struct FileReadError {
    /// File name as presented to the format registry.
    pub name: String,
    /// Underlying IO failure.
    #[source]
    pub source: io::Error,
}

/// A file handed to the import pipeline.
#[async_trait(?Send)]
pub trait DroppedFile {
    /// File name used for format matching.
    fn name(&self) -> &str;

    /// Read the whole file as UTF-8 text.
    async fn read_text(&self) -> Result<String, FileReadError>;

    /// Read the whole file as a `data:` URL carrying its binary content.
    async fn read_data_url(&self) -> Result<String, FileReadError>;
}

/// Dropped file backed by a path on disk.
#[derive(Debug, Clone)]
pub struct DiskFile {
    path: Utf8PathBuf,
    name: String,
}

impl DiskFile {
    /// Wrap a path; the registry sees the final path component.
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        let path = path.into();
        let name = path.file_name().unwrap_or(path.as_str()).to_owned();
        Self { path, name }
    }

    /// Path on disk.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn read_error(&self, source: io::Error) -> FileReadError {
        FileReadError {
            name: self.name.clone(),
            source,
        }
    }
}

#[async_trait(?Send)]
impl DroppedFile for DiskFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read_text(&self) -> Result<String, FileReadError> {
        std::fs::read_to_string(&self.path).map_err(|source| self.read_error(source))
    }

    async fn read_data_url(&self) -> Result<String, FileReadError> {
        let bytes = std::fs::read(&self.path).map_err(|source| self.read_error(source))?;
        Ok(data_url(&self.name, &bytes))
    }
}

/// Dropped file held in memory, for tests and embedding applications.
#[derive(Debug, Clone)]
pub struct MemoryFile {
    name: String,
    bytes: Vec<u8>,
}

impl MemoryFile {
    /// Create a file from a name and raw bytes.
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

#[async_trait(?Send)]
impl DroppedFile for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read_text(&self) -> Result<String, FileReadError> {
        String::from_utf8(self.bytes.clone()).map_err(|error| FileReadError {
            name: self.name.clone(),
            source: io::Error::new(io::ErrorKind::InvalidData, error),
        })
    }

    async fn read_data_url(&self) -> Result<String, FileReadError> {
        Ok(data_url(&self.name, &self.bytes))
    }
}

/// Build a `data:<mime>;base64,<payload>` URL for a file's bytes.
///
/// The mime type is inferred from the file extension; tiles are the only
/// binary format, so everything that is not a PNG falls back to the octet
/// stream type.
#[must_use]
pub fn data_url(name: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_for(name), STANDARD.encode(bytes))
}

fn mime_for(name: &str) -> &'static str {
    if name.ends_with(".png") {
        "image/png"
    } else {
        "application/octet-stream"
    }
}
