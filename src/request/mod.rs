//! Request builders, one per service capability.
//!
//! Every capability request owns a [`RequestOptions`] bag (custom headers
//! plus form fields) and whatever documents that capability takes. Shared
//! setters live on extension traits with default methods so each builder
//! chains by value and keeps its concrete type:
//!
//! ```text
//! CommonOptions      every request   auth, trace, output filename, webhooks, downloadFrom
//! PdfOptions         PDF producers   pdfa, pdfua, metadata, flatten, encryption
//! SplitOptions       conversions     splitMode / splitSpan / splitUnify
//! EmbedOptions       most requests   auxiliary files under the `embeds` part
//! ChromiumOptions    html/md/url     page geometry, waits, cookies, header/footer
//! ScreenshotOptions  html/md/url     image size, format, quality
//! ```
//!
//! Builders do no I/O. They are consumed by [`crate::Client`], which turns
//! them into a [`FormData`] and encodes it.

pub mod chromium;
pub mod libreoffice;
pub mod pdfengines;

use crate::document::Document;
use crate::error::Result;
use crate::form::{encode_bool, encode_json, FormField, HttpHeader};
use crate::types::{PdfAFormat, SplitMode, WebhookMethod};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use std::collections::BTreeMap;

pub use chromium::{
    ChromiumOptions, Cookie, HtmlRequest, MarkdownRequest, SameSite, ScreenshotOptions, UrlRequest,
};
pub use libreoffice::LibreOfficeRequest;
pub use pdfengines::{
    EmbedRequest, EncryptRequest, FlattenRequest, MergeRequest, ReadMetadataRequest,
    SplitIntervalsRequest, SplitPagesRequest, WriteMetadataRequest,
};

// ── Option bag ───────────────────────────────────────────────────────────

/// Custom headers and form fields accumulated by a builder.
///
/// Setting a key twice overwrites it; the last write wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    headers: BTreeMap<HttpHeader, String>,
    fields: BTreeMap<FormField, String>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(&self, header: HttpHeader) -> Option<&str> {
        self.headers.get(&header).map(String::as_str)
    }

    pub fn field(&self, field: FormField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn headers(&self) -> &BTreeMap<HttpHeader, String> {
        &self.headers
    }

    pub fn fields(&self) -> &BTreeMap<FormField, String> {
        &self.fields
    }

    pub(crate) fn set_header(&mut self, header: HttpHeader, value: impl Into<String>) {
        self.headers.insert(header, value.into());
    }

    pub(crate) fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        self.fields.insert(field, value.into());
    }

    pub(crate) fn remove_field(&mut self, field: FormField) {
        self.fields.remove(&field);
    }

    /// A webhook is configured when the webhook URL header is present and
    /// non-empty. Synchronous delivery is then refused.
    pub fn has_webhook(&self) -> bool {
        self.header(HttpHeader::WebhookUrl)
            .is_some_and(|url| !url.is_empty())
    }
}

// ── Encodable form ───────────────────────────────────────────────────────

/// Everything the multipart encoder needs from a request.
///
/// `files` and `embeds` are keyed by part filename; a later document with
/// the same name replaces an earlier one.
#[derive(Debug, Default)]
pub struct FormData {
    pub(crate) headers: BTreeMap<HttpHeader, String>,
    pub(crate) fields: BTreeMap<FormField, String>,
    pub(crate) files: BTreeMap<String, Document>,
    pub(crate) embeds: BTreeMap<String, Document>,
}

impl FormData {
    pub(crate) fn new(options: RequestOptions) -> Self {
        Self {
            headers: options.headers,
            fields: options.fields,
            files: BTreeMap::new(),
            embeds: BTreeMap::new(),
        }
    }

    pub(crate) fn file(mut self, doc: Document) -> Self {
        self.files.insert(doc.name().to_string(), doc);
        self
    }

    pub(crate) fn file_as(self, name: &str, doc: Document) -> Self {
        self.file(doc.renamed(name))
    }

    pub(crate) fn files(mut self, docs: impl IntoIterator<Item = Document>) -> Self {
        for doc in docs {
            self = self.file(doc);
        }
        self
    }

    pub(crate) fn embeds(mut self, docs: impl IntoIterator<Item = Document>) -> Self {
        for doc in docs {
            self.embeds.insert(doc.name().to_string(), doc);
        }
        self
    }

    pub fn headers(&self) -> &BTreeMap<HttpHeader, String> {
        &self.headers
    }

    pub fn fields(&self) -> &BTreeMap<FormField, String> {
        &self.fields
    }

    /// Part filenames of the primary inputs, sorted.
    pub fn file_names(&self) -> Vec<&str> {
        self.files.keys().map(String::as_str).collect()
    }

    /// Part filenames of the embedded attachments, sorted.
    pub fn embed_names(&self) -> Vec<&str> {
        self.embeds.keys().map(String::as_str).collect()
    }
}

// ── Sealed accessors ─────────────────────────────────────────────────────

mod sealed {
    use super::RequestOptions;
    use crate::document::Document;

    pub trait HasOptions {
        fn options(&self) -> &RequestOptions;
        fn options_mut(&mut self) -> &mut RequestOptions;
    }

    pub trait HasEmbeds {
        fn embeds_mut(&mut self) -> &mut Vec<Document>;
    }

    pub trait HasPageDecorations {
        fn set_header_document(&mut self, doc: Document);
        fn set_footer_document(&mut self, doc: Document);
    }
}

// ── Submission traits ────────────────────────────────────────────────────

/// A request that can be submitted to a fixed service endpoint.
pub trait MultipartRequest: CommonOptions + Send {
    /// Path below the service root, e.g. `/forms/pdfengines/merge`.
    fn endpoint(&self) -> &'static str;

    /// Consume the builder into its encodable parts.
    fn into_form(self) -> FormData;
}

/// A Chromium request that can also be rendered as an image.
pub trait ScreenshotRequest: MultipartRequest {
    fn screenshot_endpoint(&self) -> &'static str;
}

// ── Common options ───────────────────────────────────────────────────────

/// One remote source for the service to download before converting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadFrom {
    pub url: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_http_headers: BTreeMap<String, String>,
    /// Attach the download as an embedded file instead of converting it.
    pub embedded: bool,
}

impl DownloadFrom {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_http_headers.insert(name.into(), value.into());
        self
    }

    pub fn embedded(mut self, embedded: bool) -> Self {
        self.embedded = embedded;
        self
    }
}

/// Setters every capability shares.
pub trait CommonOptions: sealed::HasOptions + Sized {
    /// Inspect what has been set so far.
    fn request_options(&self) -> &RequestOptions {
        self.options()
    }

    /// Override the generated output filename. The service appends the
    /// extension itself.
    fn output_filename(mut self, filename: impl Into<String>) -> Self {
        self.options_mut()
            .set_header(HttpHeader::OutputFilename, filename);
        self
    }

    /// Override the request id the service writes to its logs.
    fn trace(mut self, trace: impl Into<String>) -> Self {
        self.options_mut().set_header(HttpHeader::Trace, trace);
        self
    }

    fn basic_auth(mut self, username: &str, password: &str) -> Self {
        let token = STANDARD.encode(format!("{username}:{password}"));
        self.options_mut()
            .set_header(HttpHeader::Authorization, format!("Basic {token}"));
        self
    }

    /// Deliver the result to `url` and errors to `error_url` instead of
    /// the response body.
    fn use_webhook(mut self, url: impl Into<String>, error_url: impl Into<String>) -> Self {
        let opts = self.options_mut();
        opts.set_header(HttpHeader::WebhookUrl, url);
        opts.set_header(HttpHeader::WebhookErrorUrl, error_url);
        self
    }

    /// Verb used for the success webhook; unsupported verbs become `GET`.
    fn webhook_method(mut self, method: impl Into<WebhookMethod>) -> Self {
        self.options_mut()
            .set_header(HttpHeader::WebhookMethod, method.into().as_str());
        self
    }

    /// Verb used for the error webhook; unsupported verbs become `GET`.
    fn webhook_error_method(mut self, method: impl Into<WebhookMethod>) -> Self {
        self.options_mut()
            .set_header(HttpHeader::WebhookErrorMethod, method.into().as_str());
        self
    }

    /// Extra headers the service sends along with both webhook calls.
    fn webhook_extra_headers<K, V, I>(mut self, headers: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let headers: BTreeMap<String, String> = headers
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let json = encode_json(&headers, "webhook extra headers")?;
        self.options_mut()
            .set_header(HttpHeader::WebhookExtraHttpHeaders, json);
        Ok(self)
    }

    /// Have the service fetch inputs itself. Each URL must answer with a
    /// `Content-Disposition` header carrying a filename.
    fn download_from(mut self, sources: impl IntoIterator<Item = DownloadFrom>) -> Result<Self> {
        let sources: Vec<DownloadFrom> = sources.into_iter().collect();
        let json = encode_json(&sources, "downloadFrom")?;
        self.options_mut().set_field(FormField::DownloadFrom, json);
        Ok(self)
    }

    fn has_webhook(&self) -> bool {
        self.options().has_webhook()
    }
}

impl<T: sealed::HasOptions> CommonOptions for T {}

// ── PDF output options ───────────────────────────────────────────────────

/// Post-processing applied to any request that produces PDFs.
pub trait PdfOptions: sealed::HasOptions + Sized {
    fn pdfa(mut self, format: PdfAFormat) -> Self {
        self.options_mut().set_field(FormField::PdfA, format.as_str());
        self
    }

    /// PDF/UA (Universal Accessibility).
    fn pdfua(mut self, enabled: bool) -> Self {
        self.options_mut()
            .set_field(FormField::PdfUa, encode_bool(enabled));
        self
    }

    /// Metadata to write into the resulting PDF, as a JSON object.
    fn metadata<T: Serialize + ?Sized>(mut self, metadata: &T) -> Result<Self> {
        let json = encode_json(metadata, "metadata")?;
        self.options_mut().set_field(FormField::Metadata, json);
        Ok(self)
    }

    /// Metadata already serialised as JSON, passed through untouched.
    fn metadata_json(mut self, json: impl Into<String>) -> Self {
        self.options_mut().set_field(FormField::Metadata, json);
        self
    }

    fn flatten(mut self, enabled: bool) -> Self {
        self.options_mut()
            .set_field(FormField::Flatten, encode_bool(enabled));
        self
    }

    /// Protect the output. An empty owner password is omitted.
    fn encrypt(mut self, user_password: impl Into<String>, owner_password: impl Into<String>) -> Self {
        let owner = owner_password.into();
        let opts = self.options_mut();
        opts.set_field(FormField::UserPassword, user_password);
        if owner.is_empty() {
            opts.remove_field(FormField::OwnerPassword);
        } else {
            opts.set_field(FormField::OwnerPassword, owner);
        }
        self
    }
}

/// Split the PDF a conversion produces.
pub trait SplitOptions: sealed::HasOptions + Sized {
    /// Fixed-size chunks of `span` pages.
    fn split_intervals(mut self, span: u32) -> Self {
        let opts = self.options_mut();
        opts.set_field(FormField::SplitMode, SplitMode::Intervals.as_str());
        opts.set_field(FormField::SplitSpan, span.to_string());
        opts.remove_field(FormField::SplitUnify);
        self
    }

    /// Explicit page ranges such as `"1-3,5"`; `unify` puts every range
    /// into a single file.
    fn split_pages(mut self, span: impl Into<String>, unify: bool) -> Self {
        let opts = self.options_mut();
        opts.set_field(FormField::SplitMode, SplitMode::Pages.as_str());
        opts.set_field(FormField::SplitSpan, span);
        opts.set_field(FormField::SplitUnify, encode_bool(unify));
        self
    }
}

/// Attach auxiliary files to the output under the `embeds` part.
pub trait EmbedOptions: sealed::HasEmbeds + Sized {
    fn embeds(mut self, docs: impl IntoIterator<Item = Document>) -> Self {
        self.embeds_mut().extend(docs);
        self
    }
}

impl<T: sealed::HasEmbeds> EmbedOptions for T {}

/// Shared `HasOptions` impl for builders whose option bag is `self.options`.
macro_rules! impl_has_options {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::request::sealed::HasOptions for $ty {
                fn options(&self) -> &$crate::request::RequestOptions {
                    &self.options
                }
                fn options_mut(&mut self) -> &mut $crate::request::RequestOptions {
                    &mut self.options
                }
            }
        )+
    };
}

/// Shared `HasEmbeds` impl for builders whose attachments are `self.embeds`.
macro_rules! impl_has_embeds {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::request::sealed::HasEmbeds for $ty {
                fn embeds_mut(&mut self) -> &mut Vec<$crate::document::Document> {
                    &mut self.embeds
                }
            }
        )+
    };
}

pub(crate) use impl_has_embeds;
pub(crate) use impl_has_options;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Probe {
        options: RequestOptions,
    }

    impl_has_options!(Probe);
    impl PdfOptions for Probe {}
    impl SplitOptions for Probe {}

    #[test]
    fn last_write_wins() {
        let p = Probe::default().trace("first").trace("second");
        assert_eq!(p.request_options().header(HttpHeader::Trace), Some("second"));
        assert_eq!(p.request_options().headers().len(), 1);
    }

    #[test]
    fn basic_auth_is_base64() {
        let p = Probe::default().basic_auth("foo", "bar");
        assert_eq!(
            p.request_options().header(HttpHeader::Authorization),
            Some("Basic Zm9vOmJhcg==")
        );
    }

    #[test]
    fn webhook_presence_requires_non_empty_url() {
        let p = Probe::default();
        assert!(!p.has_webhook());
        let p = p.use_webhook("", "http://err");
        assert!(!p.has_webhook());
        let p = p.use_webhook("http://hook", "http://err");
        assert!(p.has_webhook());
    }

    #[test]
    fn webhook_methods_are_coerced() {
        let p = Probe::default()
            .webhook_method("put")
            .webhook_error_method("DELETE");
        let opts = p.request_options();
        assert_eq!(opts.header(HttpHeader::WebhookMethod), Some("PUT"));
        assert_eq!(opts.header(HttpHeader::WebhookErrorMethod), Some("GET"));
    }

    #[test]
    fn webhook_extra_headers_are_json() {
        let p = Probe::default()
            .webhook_extra_headers([("X-Token", "abc")])
            .unwrap();
        assert_eq!(
            p.request_options().header(HttpHeader::WebhookExtraHttpHeaders),
            Some(r#"{"X-Token":"abc"}"#)
        );
    }

    #[test]
    fn download_from_is_json_array() {
        let p = Probe::default()
            .download_from([DownloadFrom::new("http://host/a.pdf")
                .header("X-Foo", "Bar")
                .embedded(true)])
            .unwrap();
        assert_eq!(
            p.request_options().field(FormField::DownloadFrom),
            Some(r#"[{"url":"http://host/a.pdf","extraHttpHeaders":{"X-Foo":"Bar"},"embedded":true}]"#)
        );
    }

    #[test]
    fn encrypt_omits_empty_owner_password() {
        let p = Probe::default().encrypt("user", "owner").encrypt("user2", "");
        let opts = p.request_options();
        assert_eq!(opts.field(FormField::UserPassword), Some("user2"));
        assert_eq!(opts.field(FormField::OwnerPassword), None);
    }

    #[test]
    fn split_modes_set_span_semantics() {
        let p = Probe::default().split_pages("1-2", false);
        let opts = p.request_options();
        assert_eq!(opts.field(FormField::SplitMode), Some("pages"));
        assert_eq!(opts.field(FormField::SplitSpan), Some("1-2"));
        assert_eq!(opts.field(FormField::SplitUnify), Some("false"));

        let p = p.split_intervals(3);
        let opts = p.request_options();
        assert_eq!(opts.field(FormField::SplitMode), Some("intervals"));
        assert_eq!(opts.field(FormField::SplitSpan), Some("3"));
        assert_eq!(opts.field(FormField::SplitUnify), None);
    }

    #[test]
    fn metadata_serialises_any_json_value() {
        let p = Probe::default()
            .metadata(&serde_json::json!({"Author": "Jane"}))
            .unwrap()
            .pdfua(true)
            .pdfa(PdfAFormat::A2b);
        let opts = p.request_options();
        assert_eq!(opts.field(FormField::Metadata), Some(r#"{"Author":"Jane"}"#));
        assert_eq!(opts.field(FormField::PdfUa), Some("true"));
        assert_eq!(opts.field(FormField::PdfA), Some("PDF/A-2b"));
    }
}
