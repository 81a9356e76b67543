//! Submission core: encode a request, send it, deliver the result.
//!
//! Every capability goes through the same path:
//!
//! ```text
//! builder ──into_form──▶ FormData ──encode──▶ multipart body ──POST──▶ service
//!                                                               │
//!            send / screenshot ◀── raw response ◀────────────────┤
//!            store / store_screenshot ◀── 200 body → file ◀──────┤
//!            stream / stream_screenshot ◀── 200 body chunks ◀────┘
//! ```
//!
//! Nothing is retried. Dropping a returned future aborts the in-flight
//! request; [`ClientConfig::timeout_secs`] bounds the whole exchange.

use crate::config::ClientConfig;
use crate::error::{GotenbergError, Result};
use crate::form::HttpHeader;
use crate::multipart::{self, EncodedForm};
use crate::output;
use crate::request::{CommonOptions, FormData, MultipartRequest, ScreenshotRequest};
use crate::stream::{self, ByteStream};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Handle to one Gotenberg service.
///
/// Cheap to clone; clones share the connection pool. Independent requests
/// may be submitted concurrently from any number of tasks.
///
/// # Example
/// ```rust,no_run
/// use gotenberg_client::{Client, Document, HtmlRequest, ChromiumOptions};
///
/// # async fn run() -> Result<(), gotenberg_client::GotenbergError> {
/// let client = Client::new("http://localhost:3000")?;
/// let index = Document::from_string("index.html", "<h1>Hello</h1>")?;
/// let request = HtmlRequest::new(index).landscape(true);
/// client.store(request, "hello.pdf").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    config: ClientConfig,
    /// Seconds reported by [`GotenbergError::Timeout`]; `None` when the
    /// transport's timeouts are not ours to know.
    timeout_secs: Option<u64>,
}

impl Client {
    /// Client with default settings for `hostname`.
    pub fn new(hostname: impl Into<String>) -> Result<Self> {
        Self::from_config(ClientConfig::new(hostname)?)
    }

    /// Build the HTTP transport from `config`. The transport is created once
    /// and owned by this client.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| GotenbergError::InvalidConfig(format!("HTTP client: {e}")))?;
        let timeout_secs = Some(config.timeout_secs.unwrap_or(config.connect_timeout_secs));
        Ok(Self {
            http,
            config,
            timeout_secs,
        })
    }

    /// Use a caller-supplied transport; its own timeouts and proxies apply.
    ///
    /// The timeout settings of [`ClientConfig`] are ignored, and a timeout
    /// raised by the transport surfaces as [`GotenbergError::SendFailed`].
    pub fn with_http_client(hostname: impl Into<String>, http: reqwest::Client) -> Result<Self> {
        Ok(Self {
            http,
            config: ClientConfig::new(hostname)?,
            timeout_secs: None,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // ── Conversion endpoints ─────────────────────────────────────────────

    /// Submit `request` and return the response unread, whatever its status.
    ///
    /// This is the only delivery mode that works with a webhook; the
    /// service then answers `204 No Content` and calls the webhook later.
    pub async fn send<R: MultipartRequest>(&self, request: R) -> Result<reqwest::Response> {
        let endpoint = request.endpoint();
        self.submit(endpoint, request.into_form()).await
    }

    /// Submit `request` and write the artifact to `dest`.
    ///
    /// Returns the number of bytes written.
    pub async fn store<R: MultipartRequest>(&self, request: R, dest: impl AsRef<Path>) -> Result<u64> {
        let body = self.stream(request).await?;
        self.write_artifact(dest.as_ref(), body).await
    }

    /// Submit `request` and return the artifact as a stream of chunks.
    pub async fn stream<R: MultipartRequest>(&self, request: R) -> Result<ByteStream> {
        ensure_no_webhook(&request)?;
        let endpoint = request.endpoint();
        let response = self.submit(endpoint, request.into_form()).await?;
        Ok(stream::body_stream(self.require_ok(response).await?))
    }

    // ── Screenshot endpoints ─────────────────────────────────────────────

    /// Like [`send`](Self::send), against the capability's screenshot endpoint.
    pub async fn screenshot<R: ScreenshotRequest>(&self, request: R) -> Result<reqwest::Response> {
        let endpoint = request.screenshot_endpoint();
        self.submit(endpoint, request.into_form()).await
    }

    /// Like [`store`](Self::store), against the screenshot endpoint.
    pub async fn store_screenshot<R: ScreenshotRequest>(
        &self,
        request: R,
        dest: impl AsRef<Path>,
    ) -> Result<u64> {
        let body = self.stream_screenshot(request).await?;
        self.write_artifact(dest.as_ref(), body).await
    }

    /// Like [`stream`](Self::stream), against the screenshot endpoint.
    pub async fn stream_screenshot<R: ScreenshotRequest>(&self, request: R) -> Result<ByteStream> {
        ensure_no_webhook(&request)?;
        let endpoint = request.screenshot_endpoint();
        let response = self.submit(endpoint, request.into_form()).await?;
        Ok(stream::body_stream(self.require_ok(response).await?))
    }

    // ── Internals ────────────────────────────────────────────────────────

    async fn submit(&self, endpoint: &str, form: FormData) -> Result<reqwest::Response> {
        let url = self.config.endpoint_url(endpoint);
        let encoded = multipart::encode(form).await?;
        info!(
            "POST {}: {} files, {} embeds, {} fields",
            url, encoded.file_count, encoded.embed_count, encoded.field_count
        );
        let EncodedForm {
            content_type,
            body,
            headers: custom,
            ..
        } = encoded;

        let mut headers = header_map(&custom)?;
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_str(&content_type).map_err(|_| GotenbergError::InvalidHeaderValue {
                header: CONTENT_TYPE.to_string(),
            })?,
        );

        let started = Instant::now();
        let response = self
            .http
            .post(&url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| self.transport_error(&url, e))?;

        info!(
            "{} answered {} in {:.2?}",
            url,
            response.status().as_u16(),
            started.elapsed()
        );
        Ok(response)
    }

    /// Pass a 200 through; read and report anything else.
    async fn require_ok(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status().as_u16();
        if status == 200 {
            return Ok(response);
        }
        let body = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                debug!("Could not read error body: {}", e);
                String::new()
            }
        };
        warn!("Generation failed with HTTP {}: {}", status, body.trim());
        Err(GotenbergError::GenerationFailed { status, body })
    }

    async fn write_artifact(&self, dest: &Path, body: ByteStream) -> Result<u64> {
        let written = output::write_stream(dest, body).await?;
        info!("Stored {} bytes at {}", written, dest.display());
        Ok(written)
    }

    fn transport_error(&self, url: &str, e: reqwest::Error) -> GotenbergError {
        match self.timeout_secs {
            Some(secs) if e.is_timeout() => GotenbergError::Timeout {
                url: url.to_string(),
                secs,
            },
            _ => GotenbergError::SendFailed {
                url: url.to_string(),
                source: e,
            },
        }
    }
}

/// Store and stream read the body; a webhook would leave it empty.
fn ensure_no_webhook<R: CommonOptions>(request: &R) -> Result<()> {
    if request.has_webhook() {
        return Err(GotenbergError::WebhookNotAllowed);
    }
    Ok(())
}

fn header_map(custom: &BTreeMap<HttpHeader, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(custom.len() + 1);
    for (header, value) in custom {
        let invalid = || GotenbergError::InvalidHeaderValue {
            header: header.as_str().to_string(),
        };
        let name = HeaderName::from_bytes(header.as_str().as_bytes()).map_err(|_| invalid())?;
        let value = HeaderValue::from_str(value).map_err(|_| invalid())?;
        map.insert(name, value);
    }
    Ok(map)
}
