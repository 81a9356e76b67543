//! Error types for the gotenberg-client library.
//!
//! A single fatal error type, [`GotenbergError`], covers every phase of a
//! submission. Variants are grouped by the phase that produced them so a
//! caller can tell from the variant alone whether the request never left
//! the process (configuration, document, encoding, usage) or whether the
//! service was reached (transport, protocol, output).

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the gotenberg-client library.
#[derive(Debug, Error)]
pub enum GotenbergError {
    // ── Configuration errors ──────────────────────────────────────────────
    /// The client was constructed without a hostname.
    #[error("Gotenberg hostname is empty\nPass the service root, e.g. http://localhost:3000")]
    EmptyHostname,

    /// The hostname could not be parsed as an http(s) URL.
    #[error("Invalid Gotenberg hostname '{hostname}': {reason}")]
    InvalidHostname { hostname: String, reason: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A cookie record is missing a required attribute.
    #[error("Invalid cookie: {reason}")]
    InvalidCookie { reason: String },

    /// A structured option could not be serialised to JSON.
    #[error("Failed to serialise {context} to JSON: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A header value contains characters HTTP does not allow.
    #[error("Invalid value for header '{header}'")]
    InvalidHeaderValue { header: String },

    // ── Document errors ───────────────────────────────────────────────────
    /// Documents must carry a non-empty name; it becomes the part filename.
    #[error("Document name is empty")]
    EmptyDocumentName,

    /// A path-backed document points at a file that does not exist.
    #[error("Document '{name}' not found at '{}'", .path.display())]
    DocumentNotFound { name: String, path: PathBuf },

    /// A string- or bytes-backed document was given no content.
    #[error("Document '{name}' has empty content")]
    EmptyContent { name: String },

    /// The document source could not be opened for reading.
    #[error("Cannot read document '{name}': {source}")]
    DocumentUnreadable {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// A reader-backed document was opened a second time.
    #[error("Document '{name}' wraps a one-shot reader that was already consumed")]
    ReaderConsumed { name: String },

    // ── Encoding errors ───────────────────────────────────────────────────
    /// Copying a document's bytes into the multipart body failed.
    #[error("Failed to copy document '{name}' into the multipart body: {source}")]
    CopyFailed {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing a plain form field failed.
    #[error("Failed to write form field '{field}': {source}")]
    FieldWriteFailed {
        field: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing the closing boundary failed.
    #[error("Failed to finalise the multipart body: {0}")]
    EncoderCloseFailed(#[source] std::io::Error),

    // ── Usage errors ──────────────────────────────────────────────────────
    /// Store/stream was called on a request that delivers to a webhook.
    #[error("Webhook is not allowed for this delivery mode\nThe service posts the result to the webhook, not to the response body.")]
    WebhookNotAllowed,

    // ── Transport errors ──────────────────────────────────────────────────
    /// The request could not be sent (DNS, connection refused, TLS …).
    #[error("Failed to send request to '{url}': {source}")]
    SendFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The request exceeded the configured timeout.
    #[error("Request to '{url}' timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    /// The response body could not be read to completion.
    #[error("Failed to read response body: {0}")]
    ResponseReadFailed(#[source] reqwest::Error),

    // ── Protocol errors ───────────────────────────────────────────────────
    /// The service answered with anything other than HTTP 200.
    #[error("Resulting file could not be generated: HTTP {status}\n{body}")]
    GenerationFailed { status: u16, body: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the destination file.
    #[error("Failed to write output file '{}': {source}", .path.display())]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GotenbergError {
    /// HTTP status carried by a [`GotenbergError::GenerationFailed`].
    pub fn status(&self) -> Option<u16> {
        match self {
            GotenbergError::GenerationFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the error was raised before any network activity.
    pub fn is_client_side(&self) -> bool {
        !matches!(
            self,
            GotenbergError::SendFailed { .. }
                | GotenbergError::Timeout { .. }
                | GotenbergError::ResponseReadFailed(_)
                | GotenbergError::GenerationFailed { .. }
                | GotenbergError::OutputWriteFailed { .. }
        )
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = GotenbergError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_failed_display() {
        let e = GotenbergError::GenerationFailed {
            status: 409,
            body: "Chromium failed".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("409"), "got: {msg}");
        assert!(msg.contains("Chromium failed"));
        assert_eq!(e.status(), Some(409));
    }

    #[test]
    fn document_not_found_display() {
        let e = GotenbergError::DocumentNotFound {
            name: "index.html".into(),
            path: PathBuf::from("/nope/index.html"),
        };
        assert!(e.to_string().contains("index.html"));
        assert!(e.to_string().contains("/nope"));
        assert_eq!(e.status(), None);
    }

    #[test]
    fn timeout_display() {
        let e = GotenbergError::Timeout {
            url: "http://localhost:3000/forms/pdfengines/merge".into(),
            secs: 30,
        };
        assert!(e.to_string().contains("30s"));
        assert!(!e.is_client_side());
    }

    #[test]
    fn webhook_not_allowed_is_client_side() {
        assert!(GotenbergError::WebhookNotAllowed.is_client_side());
        assert!(GotenbergError::EmptyContent { name: "a".into() }.is_client_side());
    }
}
