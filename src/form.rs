//! Wire vocabulary: form-field and header names, plus value encoding.
//!
//! Field and header names are closed enums rather than strings so a typo
//! can never produce a field the service silently ignores. Several
//! capabilities share a wire name (`landscape`, `pdfa`, `flatten` …); each
//! wire name appears exactly once here.

use crate::error::{GotenbergError, Result};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Every multipart text field the client knows how to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    // Common
    Metadata,
    DownloadFrom,
    Url,

    // Chromium
    WaitDelay,
    WaitForExpression,
    EmulatedMediaType,
    Cookies,
    UserAgent,
    ExtraHttpHeaders,
    FailOnHttpStatusCodes,
    FailOnResourceHttpStatusCodes,
    FailOnConsoleExceptions,
    FailOnResourceLoadingFailed,
    SkipNetworkIdleEvent,
    GenerateTaggedPdf,
    PaperWidth,
    PaperHeight,
    MarginTop,
    MarginBottom,
    MarginLeft,
    MarginRight,
    Landscape,
    NativePageRanges,
    Scale,
    SinglePage,
    PreferCssPageSize,
    PrintBackground,
    OmitBackground,
    GenerateDocumentOutline,

    // Screenshot
    Width,
    Height,
    Clip,
    Format,
    Quality,
    OptimizeForSpeed,

    // LibreOffice
    Password,
    ExportFormFields,
    AllowDuplicateFieldNames,
    ExportBookmarks,
    ExportBookmarksToPdfDestination,
    ExportPlaceholders,
    ExportNotes,
    ExportNotesPages,
    ExportOnlyNotesPages,
    ExportNotesInMargin,
    ConvertOooTargetToPdfTarget,
    ExportLinksRelativeFsys,
    ExportHiddenSlides,
    SkipEmptyPages,
    AddOriginalDocumentAsStream,
    SinglePageSheets,
    LosslessImageCompression,
    ReduceImageResolution,
    MaxImageResolution,
    Merge,
    UpdateIndexes,

    // PDF output
    PdfA,
    PdfUa,
    Flatten,
    UserPassword,
    OwnerPassword,

    // Split
    SplitMode,
    SplitSpan,
    SplitUnify,
}

impl FormField {
    /// The exact field name the service expects.
    pub fn as_str(self) -> &'static str {
        match self {
            FormField::Metadata => "metadata",
            FormField::DownloadFrom => "downloadFrom",
            FormField::Url => "url",
            FormField::WaitDelay => "waitDelay",
            FormField::WaitForExpression => "waitForExpression",
            FormField::EmulatedMediaType => "emulatedMediaType",
            FormField::Cookies => "cookies",
            FormField::UserAgent => "userAgent",
            FormField::ExtraHttpHeaders => "extraHttpHeaders",
            FormField::FailOnHttpStatusCodes => "failOnHttpStatusCodes",
            FormField::FailOnResourceHttpStatusCodes => "failOnResourceHttpStatusCodes",
            FormField::FailOnConsoleExceptions => "failOnConsoleExceptions",
            FormField::FailOnResourceLoadingFailed => "failOnResourceLoadingFailed",
            FormField::SkipNetworkIdleEvent => "skipNetworkIdleEvent",
            FormField::GenerateTaggedPdf => "generateTaggedPdf",
            FormField::PaperWidth => "paperWidth",
            FormField::PaperHeight => "paperHeight",
            FormField::MarginTop => "marginTop",
            FormField::MarginBottom => "marginBottom",
            FormField::MarginLeft => "marginLeft",
            FormField::MarginRight => "marginRight",
            FormField::Landscape => "landscape",
            FormField::NativePageRanges => "nativePageRanges",
            FormField::Scale => "scale",
            FormField::SinglePage => "singlePage",
            FormField::PreferCssPageSize => "preferCssPageSize",
            FormField::PrintBackground => "printBackground",
            FormField::OmitBackground => "omitBackground",
            FormField::GenerateDocumentOutline => "generateDocumentOutline",
            FormField::Width => "width",
            FormField::Height => "height",
            FormField::Clip => "clip",
            FormField::Format => "format",
            FormField::Quality => "quality",
            FormField::OptimizeForSpeed => "optimizeForSpeed",
            FormField::Password => "password",
            FormField::ExportFormFields => "exportFormFields",
            FormField::AllowDuplicateFieldNames => "allowDuplicateFieldNames",
            FormField::ExportBookmarks => "exportBookmarks",
            FormField::ExportBookmarksToPdfDestination => "exportBookmarksToPdfDestination",
            FormField::ExportPlaceholders => "exportPlaceholders",
            FormField::ExportNotes => "exportNotes",
            FormField::ExportNotesPages => "exportNotesPages",
            FormField::ExportOnlyNotesPages => "exportOnlyNotesPages",
            FormField::ExportNotesInMargin => "exportNotesInMargin",
            FormField::ConvertOooTargetToPdfTarget => "convertOooTargetToPdfTarget",
            FormField::ExportLinksRelativeFsys => "exportLinksRelativeFsys",
            FormField::ExportHiddenSlides => "exportHiddenSlides",
            FormField::SkipEmptyPages => "skipEmptyPages",
            FormField::AddOriginalDocumentAsStream => "addOriginalDocumentAsStream",
            FormField::SinglePageSheets => "singlePageSheets",
            FormField::LosslessImageCompression => "losslessImageCompression",
            FormField::ReduceImageResolution => "reduceImageResolution",
            FormField::MaxImageResolution => "maxImageResolution",
            FormField::Merge => "merge",
            FormField::UpdateIndexes => "updateIndexes",
            FormField::PdfA => "pdfa",
            FormField::PdfUa => "pdfua",
            FormField::Flatten => "flatten",
            FormField::UserPassword => "userPassword",
            FormField::OwnerPassword => "ownerPassword",
            FormField::SplitMode => "splitMode",
            FormField::SplitSpan => "splitSpan",
            FormField::SplitUnify => "splitUnify",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every custom HTTP header the client sets on a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HttpHeader {
    Authorization,
    OutputFilename,
    Trace,
    WebhookUrl,
    WebhookErrorUrl,
    WebhookMethod,
    WebhookErrorMethod,
    WebhookExtraHttpHeaders,
}

impl HttpHeader {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpHeader::Authorization => "Authorization",
            HttpHeader::OutputFilename => "Gotenberg-Output-Filename",
            HttpHeader::Trace => "Gotenberg-Trace",
            HttpHeader::WebhookUrl => "Gotenberg-Webhook-Url",
            HttpHeader::WebhookErrorUrl => "Gotenberg-Webhook-Error-Url",
            HttpHeader::WebhookMethod => "Gotenberg-Webhook-Method",
            HttpHeader::WebhookErrorMethod => "Gotenberg-Webhook-Error-Method",
            HttpHeader::WebhookExtraHttpHeaders => "Gotenberg-Webhook-Extra-Http-Headers",
        }
    }
}

impl fmt::Display for HttpHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Value encoding ───────────────────────────────────────────────────────

pub(crate) fn encode_bool(value: bool) -> String {
    if value { "true" } else { "false" }.to_string()
}

/// Six fixed decimals, the same rendering the service's own clients emit.
pub(crate) fn encode_float(value: f64) -> String {
    format!("{:.6}", value)
}

pub(crate) fn encode_json<T: Serialize + ?Sized>(
    value: &T,
    context: &'static str,
) -> Result<String> {
    serde_json::to_string(value).map_err(|source| GotenbergError::Json { context, source })
}

/// Render a duration the way the service parses it: `"500ms"`, `"1.5s"`,
/// `"1m30s"`, `"2h0m0s"`.
pub(crate) fn encode_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }

    const MICRO: u128 = 1_000;
    const MILLI: u128 = 1_000_000;
    const SECOND: u128 = 1_000_000_000;

    if nanos < MICRO {
        return format!("{nanos}ns");
    }
    if nanos < MILLI {
        return format!("{}µs", fraction(nanos, MICRO));
    }
    if nanos < SECOND {
        return format!("{}ms", fraction(nanos, MILLI));
    }

    let hours = nanos / (3600 * SECOND);
    let rem = nanos % (3600 * SECOND);
    let minutes = rem / (60 * SECOND);
    let secs = fraction(rem % (60 * SECOND), SECOND);

    if hours > 0 {
        format!("{hours}h{minutes}m{secs}s")
    } else if minutes > 0 {
        format!("{minutes}m{secs}s")
    } else {
        format!("{secs}s")
    }
}

/// `value / unit` printed with the shortest exact decimal fraction.
fn fraction(value: u128, unit: u128) -> String {
    let whole = value / unit;
    let rem = value % unit;
    if rem == 0 {
        return whole.to_string();
    }
    let width = unit.ilog10() as usize;
    let digits = format!("{rem:0width$}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}
