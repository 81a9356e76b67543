//! # gotenberg-client
//!
//! Async client for the [Gotenberg](https://gotenberg.dev) document
//! conversion API.
//!
//! ## Why this crate?
//!
//! Gotenberg turns HTML, Markdown, URLs and office documents into PDFs and
//! manipulates existing PDFs, all behind a `multipart/form-data` HTTP API
//! with some eighty form fields and eight custom headers. Getting a field
//! name wrong is silent: the service just ignores it. This crate gives every
//! field a typed setter, every capability its own builder, and every failure
//! a variant that says which phase went wrong.
//!
//! ## Request Flow
//!
//! ```text
//! Document(s) + options
//!  │
//!  ├─ 1. Build     capability builder (HtmlRequest, MergeRequest, …)
//!  ├─ 2. Encode    multipart body: `files`, `embeds`, text fields
//!  ├─ 3. Send      POST <hostname><endpoint> with Gotenberg-* headers
//!  └─ 4. Deliver   raw response │ file on disk │ byte stream
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gotenberg_client::{
//!     ChromiumOptions, Client, CommonOptions, Document, HtmlRequest, PaperDimensions,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new("http://localhost:3000")?;
//!
//!     let index = Document::from_path("index.html", "site/index.html")?;
//!     let request = HtmlRequest::new(index)
//!         .paper_size(PaperDimensions::A4)
//!         .print_background(true)
//!         .trace("invoice-42");
//!
//!     let bytes = client.store(request, "out/invoice.pdf").await?;
//!     eprintln!("wrote {bytes} bytes");
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `gotenberg` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! gotenberg-client = { version = "0.1", default-features = false }
//! ```
//!
//! ## Capabilities
//!
//! | Builder | Endpoint |
//! |---------|----------|
//! | [`HtmlRequest`] | `/forms/chromium/convert/html` (+ `screenshot/html`) |
//! | [`MarkdownRequest`] | `/forms/chromium/convert/markdown` (+ `screenshot/markdown`) |
//! | [`UrlRequest`] | `/forms/chromium/convert/url` (+ `screenshot/url`) |
//! | [`LibreOfficeRequest`] | `/forms/libreoffice/convert` |
//! | [`MergeRequest`] | `/forms/pdfengines/merge` |
//! | [`SplitPagesRequest`], [`SplitIntervalsRequest`] | `/forms/pdfengines/split` |
//! | [`FlattenRequest`] | `/forms/pdfengines/flatten` |
//! | [`EncryptRequest`] | `/forms/pdfengines/encrypt` |
//! | [`EmbedRequest`] | `/forms/pdfengines/embed` |
//! | [`ReadMetadataRequest`] | `/forms/pdfengines/metadata/read` |
//! | [`WriteMetadataRequest`] | `/forms/pdfengines/metadata/write` |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod client;
pub mod config;
pub mod document;
pub mod error;
pub mod form;
pub mod multipart;
pub mod output;
pub mod request;
pub mod stream;
pub mod types;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use client::Client;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use document::{Document, DocumentReader};
pub use error::{GotenbergError, Result};
pub use form::{FormField, HttpHeader};
pub use multipart::{encode, EncodedForm, MultipartEncoder};
pub use request::{
    ChromiumOptions, CommonOptions, Cookie, DownloadFrom, EmbedOptions, EmbedRequest,
    EncryptRequest, FlattenRequest, FormData, HtmlRequest, LibreOfficeRequest, MarkdownRequest,
    MergeRequest, MultipartRequest, PdfOptions, ReadMetadataRequest, RequestOptions, SameSite,
    ScreenshotOptions, ScreenshotRequest, SplitIntervalsRequest, SplitOptions, SplitPagesRequest,
    UrlRequest, WriteMetadataRequest,
};
pub use stream::{collect, ByteStream};
pub use types::{
    ImageFormat, MediaType, PageMargins, PaperDimensions, PdfAFormat, SplitMode, Unit,
    WebhookMethod,
};
