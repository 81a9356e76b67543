//! Streaming delivery: hand the response body to the caller as it arrives.
//!
//! Generated archives and large merged PDFs can be hundreds of megabytes.
//! [`ByteStream`] lets callers forward them (to object storage, another
//! HTTP response, a hasher) without buffering the whole artifact or
//! touching the disk. Dropping the stream closes the connection.

use crate::error::{GotenbergError, Result};
use bytes::Bytes;
use futures::stream::StreamExt;
use std::pin::Pin;
use tokio_stream::Stream;

/// A boxed stream of response body chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Wrap a successful response's body.
pub(crate) fn body_stream(response: reqwest::Response) -> ByteStream {
    Box::pin(
        response
            .bytes_stream()
            .map(|chunk| chunk.map_err(GotenbergError::ResponseReadFailed)),
    )
}

/// Drain a [`ByteStream`] into memory.
///
/// Convenient for small artifacts such as metadata JSON.
pub async fn collect(mut stream: ByteStream) -> Result<Bytes> {
    let mut buf = Vec::new();
    while let Some(chunk) = stream.next().await {
        buf.extend_from_slice(&chunk?);
    }
    Ok(Bytes::from(buf))
}
