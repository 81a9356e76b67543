//! Named byte sources attached to a request.
//!
//! A [`Document`] pairs the filename the service will see with a way to
//! produce the bytes. Path-backed documents are opened lazily on every
//! [`Document::open`] call so large files never sit in memory until the
//! request is encoded; string and byte documents hand out a fresh cursor
//! each time; reader-backed documents are one-shot.

use crate::error::{GotenbergError, Result};
use bytes::Bytes;
use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tokio::io::AsyncRead;
use tracing::debug;

/// A readable stream produced by [`Document::open`].
pub type DocumentReader = Box<dyn AsyncRead + Send + Unpin>;

enum Source {
    Path(PathBuf),
    Memory(Bytes),
    Reader(Option<DocumentReader>),
}

/// A named input for a conversion request.
pub struct Document {
    name: String,
    source: Source,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &self.source {
            Source::Path(p) => format!("path({})", p.display()),
            Source::Memory(b) => format!("memory({} bytes)", b.len()),
            Source::Reader(Some(_)) => "reader".to_string(),
            Source::Reader(None) => "reader(consumed)".to_string(),
        };
        f.debug_struct("Document")
            .field("name", &self.name)
            .field("source", &source)
            .finish()
    }
}

impl Document {
    /// A document read from `path` each time it is opened.
    ///
    /// Fails with [`GotenbergError::DocumentNotFound`] if nothing exists
    /// at `path` now; the file is checked again when opened.
    pub fn from_path(name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let name = checked_name(name)?;
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(GotenbergError::DocumentNotFound { name, path });
        }
        Ok(Self {
            name,
            source: Source::Path(path),
        })
    }

    /// A document backed by an in-memory string.
    pub fn from_string(name: impl Into<String>, data: impl Into<String>) -> Result<Self> {
        Self::from_bytes(name, Bytes::from(data.into()))
    }

    /// A document backed by an in-memory byte buffer.
    pub fn from_bytes(name: impl Into<String>, data: impl Into<Bytes>) -> Result<Self> {
        let name = checked_name(name)?;
        let data = data.into();
        if data.is_empty() {
            return Err(GotenbergError::EmptyContent { name });
        }
        Ok(Self {
            name,
            source: Source::Memory(data),
        })
    }

    /// A document wrapping a caller-supplied stream.
    ///
    /// The stream is consumed by the first [`open`](Self::open); opening
    /// again fails with [`GotenbergError::ReaderConsumed`].
    pub fn from_reader<R>(name: impl Into<String>, reader: R) -> Result<Self>
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        let name = checked_name(name)?;
        Ok(Self {
            name,
            source: Source::Reader(Some(Box::new(reader))),
        })
    }

    /// The filename sent with the multipart part.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True for one-shot reader-backed documents.
    pub fn is_one_shot(&self) -> bool {
        matches!(self.source, Source::Reader(_))
    }

    /// Produce a fresh stream over the document's bytes.
    pub async fn open(&mut self) -> Result<DocumentReader> {
        match &mut self.source {
            Source::Path(path) => {
                let file = tokio::fs::File::open(&*path).await.map_err(|source| {
                    GotenbergError::DocumentUnreadable {
                        name: self.name.clone(),
                        source,
                    }
                })?;
                debug!("Opened document '{}' from {}", self.name, path.display());
                Ok(Box::new(file))
            }
            Source::Memory(data) => Ok(Box::new(Cursor::new(data.clone()))),
            Source::Reader(reader) => reader.take().ok_or_else(|| GotenbergError::ReaderConsumed {
                name: self.name.clone(),
            }),
        }
    }

    /// Same document, different part filename.
    pub(crate) fn renamed(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }
}

fn checked_name(name: impl Into<String>) -> Result<String> {
    let name = name.into();
    if name.is_empty() {
        return Err(GotenbergError::EmptyDocumentName);
    }
    Ok(name)
}
