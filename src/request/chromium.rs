//! Chromium-backed conversions: HTML, Markdown and URL to PDF or image.

use super::sealed::{HasOptions, HasPageDecorations};
use super::{impl_has_embeds, impl_has_options, FormData, MultipartRequest, PdfOptions, RequestOptions, ScreenshotRequest, SplitOptions};
use crate::document::Document;
use crate::error::{GotenbergError, Result};
use crate::form::{encode_bool, encode_duration, encode_float, encode_json, FormField};
use crate::types::{ImageFormat, MediaType, PageMargins, PaperDimensions};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

const HTML_CONVERT: &str = "/forms/chromium/convert/html";
const HTML_SCREENSHOT: &str = "/forms/chromium/screenshot/html";
const MARKDOWN_CONVERT: &str = "/forms/chromium/convert/markdown";
const MARKDOWN_SCREENSHOT: &str = "/forms/chromium/screenshot/markdown";
const URL_CONVERT: &str = "/forms/chromium/convert/url";
const URL_SCREENSHOT: &str = "/forms/chromium/screenshot/url";

// ── Cookies ──────────────────────────────────────────────────────────────

/// `SameSite` attribute of a [`Cookie`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    /// Exact, case-sensitive match on `Strict`, `Lax` or `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Strict" => Some(SameSite::Strict),
            "Lax" => Some(SameSite::Lax),
            "None" => Some(SameSite::None),
            _ => None,
        }
    }
}

/// A cookie placed in Chromium's jar before the page loads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub secure: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub http_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub same_site: Option<SameSite>,
}

impl Cookie {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
            ..Self::default()
        }
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    /// Unrecognised values clear the attribute instead of failing.
    pub fn same_site(mut self, same_site: &str) -> Self {
        self.same_site = SameSite::parse(same_site);
        self
    }

    fn validate(&self) -> Result<()> {
        let missing = [
            ("name", &self.name),
            ("value", &self.value),
            ("domain", &self.domain),
        ]
        .into_iter()
        .find(|(_, v)| v.is_empty());

        match missing {
            Some((attr, _)) => Err(GotenbergError::InvalidCookie {
                reason: format!("cookie '{}' has an empty {attr}", self.name),
            }),
            None => Ok(()),
        }
    }
}

// ── Shared Chromium options ──────────────────────────────────────────────

/// Page loading and PDF layout options shared by the Chromium requests.
///
/// Setters that take structured values serialise them to JSON and return
/// `Result` so a bad value is reported before anything is sent.
pub trait ChromiumOptions: HasOptions + HasPageDecorations + Sized {
    /// Extra time to wait after the page loads, e.g. for animations.
    fn wait_delay(mut self, delay: Duration) -> Self {
        self.options_mut()
            .set_field(FormField::WaitDelay, encode_duration(delay));
        self
    }

    /// Wait until this JavaScript expression evaluates to true.
    fn wait_for_expression(mut self, expression: impl Into<String>) -> Self {
        self.options_mut()
            .set_field(FormField::WaitForExpression, expression);
        self
    }

    fn emulated_media_type(mut self, media: MediaType) -> Self {
        self.options_mut()
            .set_field(FormField::EmulatedMediaType, media.as_str());
        self
    }

    /// Every cookie must have a name, value and domain; one bad cookie
    /// rejects the whole set.
    fn cookies(mut self, cookies: impl IntoIterator<Item = Cookie>) -> Result<Self> {
        let cookies: Vec<Cookie> = cookies.into_iter().collect();
        for cookie in &cookies {
            cookie.validate()?;
        }
        let json = encode_json(&cookies, "cookies")?;
        self.options_mut().set_field(FormField::Cookies, json);
        Ok(self)
    }

    fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.options_mut().set_field(FormField::UserAgent, user_agent);
        self
    }

    /// Headers Chromium sends with every request while loading the page.
    fn extra_http_headers<K, V, I>(mut self, headers: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let headers: BTreeMap<String, String> = headers
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let json = encode_json(&headers, "extra HTTP headers")?;
        self.options_mut().set_field(FormField::ExtraHttpHeaders, json);
        Ok(self)
    }

    /// Answer 409 when the main page returns one of these statuses.
    fn fail_on_http_status_codes(mut self, codes: impl IntoIterator<Item = u16>) -> Result<Self> {
        let codes: Vec<u16> = codes.into_iter().collect();
        let json = encode_json(&codes, "HTTP status codes")?;
        self.options_mut()
            .set_field(FormField::FailOnHttpStatusCodes, json);
        Ok(self)
    }

    /// Answer 409 when any sub-resource returns one of these statuses.
    fn fail_on_resource_http_status_codes(
        mut self,
        codes: impl IntoIterator<Item = u16>,
    ) -> Result<Self> {
        let codes: Vec<u16> = codes.into_iter().collect();
        let json = encode_json(&codes, "resource HTTP status codes")?;
        self.options_mut()
            .set_field(FormField::FailOnResourceHttpStatusCodes, json);
        Ok(self)
    }

    fn fail_on_console_exceptions(mut self, enabled: bool) -> Self {
        self.options_mut()
            .set_field(FormField::FailOnConsoleExceptions, encode_bool(enabled));
        self
    }

    fn fail_on_resource_loading_failed(mut self, enabled: bool) -> Self {
        self.options_mut()
            .set_field(FormField::FailOnResourceLoadingFailed, encode_bool(enabled));
        self
    }

    fn skip_network_idle_event(mut self, skip: bool) -> Self {
        self.options_mut()
            .set_field(FormField::SkipNetworkIdleEvent, encode_bool(skip));
        self
    }

    /// Print the whole page onto one sheet.
    fn single_page(mut self, enabled: bool) -> Self {
        self.options_mut()
            .set_field(FormField::SinglePage, encode_bool(enabled));
        self
    }

    fn paper_size(mut self, size: PaperDimensions) -> Self {
        let opts = self.options_mut();
        opts.set_field(FormField::PaperWidth, size.unit.encode(size.width));
        opts.set_field(FormField::PaperHeight, size.unit.encode(size.height));
        self
    }

    fn margins(mut self, margins: PageMargins) -> Self {
        let unit = margins.unit;
        let opts = self.options_mut();
        opts.set_field(FormField::MarginTop, unit.encode(margins.top));
        opts.set_field(FormField::MarginBottom, unit.encode(margins.bottom));
        opts.set_field(FormField::MarginLeft, unit.encode(margins.left));
        opts.set_field(FormField::MarginRight, unit.encode(margins.right));
        self
    }

    fn prefer_css_page_size(mut self, enabled: bool) -> Self {
        self.options_mut()
            .set_field(FormField::PreferCssPageSize, encode_bool(enabled));
        self
    }

    fn print_background(mut self, enabled: bool) -> Self {
        self.options_mut()
            .set_field(FormField::PrintBackground, encode_bool(enabled));
        self
    }

    /// Drop the default white background so the PDF can be transparent.
    fn omit_background(mut self, enabled: bool) -> Self {
        self.options_mut()
            .set_field(FormField::OmitBackground, encode_bool(enabled));
        self
    }

    fn landscape(mut self, enabled: bool) -> Self {
        self.options_mut()
            .set_field(FormField::Landscape, encode_bool(enabled));
        self
    }

    fn scale(mut self, factor: f64) -> Self {
        self.options_mut()
            .set_field(FormField::Scale, encode_float(factor));
        self
    }

    /// Pages to print, e.g. `"1-5, 8, 11-13"`.
    fn native_page_ranges(mut self, ranges: impl Into<String>) -> Self {
        self.options_mut()
            .set_field(FormField::NativePageRanges, ranges);
        self
    }

    fn generate_document_outline(mut self, enabled: bool) -> Self {
        self.options_mut()
            .set_field(FormField::GenerateDocumentOutline, encode_bool(enabled));
        self
    }

    fn generate_tagged_pdf(mut self, enabled: bool) -> Self {
        self.options_mut()
            .set_field(FormField::GenerateTaggedPdf, encode_bool(enabled));
        self
    }

    /// Printed at the top of every page; sent as `header.html`.
    fn header(mut self, doc: Document) -> Self {
        self.set_header_document(doc);
        self
    }

    /// Printed at the bottom of every page; sent as `footer.html`.
    fn footer(mut self, doc: Document) -> Self {
        self.set_footer_document(doc);
        self
    }
}

/// Image options, honoured by the screenshot endpoints only.
pub trait ScreenshotOptions: HasOptions + Sized {
    /// Device screen width in pixels.
    fn screenshot_width(mut self, width: u32) -> Self {
        self.options_mut()
            .set_field(FormField::Width, width.to_string());
        self
    }

    /// Device screen height in pixels.
    fn screenshot_height(mut self, height: u32) -> Self {
        self.options_mut()
            .set_field(FormField::Height, height.to_string());
        self
    }

    /// Clip the capture to the device dimensions.
    fn screenshot_clip(mut self, enabled: bool) -> Self {
        self.options_mut()
            .set_field(FormField::Clip, encode_bool(enabled));
        self
    }

    fn screenshot_format(mut self, format: ImageFormat) -> Self {
        self.options_mut()
            .set_field(FormField::Format, format.as_str());
        self
    }

    /// Compression quality, 0–100. JPEG only.
    fn screenshot_quality(mut self, quality: u8) -> Self {
        self.options_mut()
            .set_field(FormField::Quality, quality.to_string());
        self
    }

    fn screenshot_optimize_for_speed(mut self, enabled: bool) -> Self {
        self.options_mut()
            .set_field(FormField::OptimizeForSpeed, encode_bool(enabled));
        self
    }
}

/// Header and footer documents, renamed to the filenames Chromium expects.
#[derive(Debug, Default)]
struct Decorations {
    header: Option<Document>,
    footer: Option<Document>,
}

impl Decorations {
    fn attach(self, mut form: FormData) -> FormData {
        if let Some(header) = self.header {
            form = form.file_as("header.html", header);
        }
        if let Some(footer) = self.footer {
            form = form.file_as("footer.html", footer);
        }
        form
    }
}

macro_rules! chromium_request {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl HasPageDecorations for $ty {
                fn set_header_document(&mut self, doc: Document) {
                    self.decorations.header = Some(doc);
                }
                fn set_footer_document(&mut self, doc: Document) {
                    self.decorations.footer = Some(doc);
                }
            }
            impl ChromiumOptions for $ty {}
            impl ScreenshotOptions for $ty {}
            impl PdfOptions for $ty {}
            impl SplitOptions for $ty {}
        )+
        impl_has_options!($($ty),+);
        impl_has_embeds!($($ty),+);
    };
}

// ── HTML ─────────────────────────────────────────────────────────────────

/// Convert an HTML page. The index document is always sent as `index.html`.
#[derive(Debug)]
pub struct HtmlRequest {
    index: Document,
    assets: Vec<Document>,
    decorations: Decorations,
    embeds: Vec<Document>,
    options: RequestOptions,
}

impl HtmlRequest {
    pub fn new(index: Document) -> Self {
        Self {
            index,
            assets: Vec::new(),
            decorations: Decorations::default(),
            embeds: Vec::new(),
            options: RequestOptions::new(),
        }
    }

    /// Images, fonts and stylesheets referenced by the page, by filename.
    pub fn assets(mut self, assets: impl IntoIterator<Item = Document>) -> Self {
        self.assets.extend(assets);
        self
    }
}

impl MultipartRequest for HtmlRequest {
    fn endpoint(&self) -> &'static str {
        HTML_CONVERT
    }

    fn into_form(self) -> FormData {
        let form = FormData::new(self.options).file_as("index.html", self.index);
        self.decorations
            .attach(form)
            .files(self.assets)
            .embeds(self.embeds)
    }
}

impl ScreenshotRequest for HtmlRequest {
    fn screenshot_endpoint(&self) -> &'static str {
        HTML_SCREENSHOT
    }
}

// ── Markdown ─────────────────────────────────────────────────────────────

/// Convert Markdown files rendered through an HTML template.
///
/// The template (sent as `index.html`) pulls each markdown file in by
/// name with `{{ toHTML "file.md" }}`.
#[derive(Debug)]
pub struct MarkdownRequest {
    index: Document,
    markdowns: Vec<Document>,
    assets: Vec<Document>,
    decorations: Decorations,
    embeds: Vec<Document>,
    options: RequestOptions,
}

impl MarkdownRequest {
    pub fn new(index: Document, markdowns: impl IntoIterator<Item = Document>) -> Self {
        Self {
            index,
            markdowns: markdowns.into_iter().collect(),
            assets: Vec::new(),
            decorations: Decorations::default(),
            embeds: Vec::new(),
            options: RequestOptions::new(),
        }
    }

    pub fn assets(mut self, assets: impl IntoIterator<Item = Document>) -> Self {
        self.assets.extend(assets);
        self
    }
}

impl MultipartRequest for MarkdownRequest {
    fn endpoint(&self) -> &'static str {
        MARKDOWN_CONVERT
    }

    fn into_form(self) -> FormData {
        let form = FormData::new(self.options)
            .file_as("index.html", self.index)
            .files(self.markdowns);
        self.decorations
            .attach(form)
            .files(self.assets)
            .embeds(self.embeds)
    }
}

impl ScreenshotRequest for MarkdownRequest {
    fn screenshot_endpoint(&self) -> &'static str {
        MARKDOWN_SCREENSHOT
    }
}

// ── URL ──────────────────────────────────────────────────────────────────

/// Convert a remote page that the service loads itself.
#[derive(Debug)]
pub struct UrlRequest {
    decorations: Decorations,
    embeds: Vec<Document>,
    options: RequestOptions,
}

impl UrlRequest {
    pub fn new(url: impl Into<String>) -> Self {
        let mut options = RequestOptions::new();
        options.set_field(FormField::Url, url);
        Self {
            decorations: Decorations::default(),
            embeds: Vec::new(),
            options,
        }
    }
}

impl MultipartRequest for UrlRequest {
    fn endpoint(&self) -> &'static str {
        URL_CONVERT
    }

    fn into_form(self) -> FormData {
        self.decorations
            .attach(FormData::new(self.options))
            .embeds(self.embeds)
    }
}

impl ScreenshotRequest for UrlRequest {
    fn screenshot_endpoint(&self) -> &'static str {
        URL_SCREENSHOT
    }
}

chromium_request!(HtmlRequest, MarkdownRequest, UrlRequest);
