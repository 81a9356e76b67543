//! Typed option values: page geometry, formats, and small closed sets.
//!
//! These are passed through to the service verbatim; the client checks
//! type, not meaning. The service decides which values it accepts.

use crate::form::encode_float;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length unit for paper sizes and margins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Unit {
    /// Points.
    Pt,
    /// Pixels.
    Px,
    /// Inches. (default)
    #[default]
    In,
    /// Millimetres.
    Mm,
    /// Centimetres.
    Cm,
    /// Picas.
    Pc,
}

impl Unit {
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Pt => "pt",
            Unit::Px => "px",
            Unit::In => "in",
            Unit::Mm => "mm",
            Unit::Cm => "cm",
            Unit::Pc => "pc",
        }
    }

    /// `"<value><unit>"`, e.g. `8.500000in`.
    pub(crate) fn encode(self, value: f64) -> String {
        format!("{}{}", encode_float(value), self.as_str())
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Paper width and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaperDimensions {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub unit: Unit,
}

impl PaperDimensions {
    pub const A0: Self = Self::inches(33.1, 46.8);
    pub const A1: Self = Self::inches(23.4, 33.1);
    pub const A2: Self = Self::inches(16.5, 23.4);
    pub const A3: Self = Self::inches(11.7, 16.5);
    pub const A4: Self = Self::inches(8.27, 11.7);
    pub const A5: Self = Self::inches(5.8, 8.3);
    pub const A6: Self = Self::inches(4.1, 5.8);
    pub const LETTER: Self = Self::inches(8.5, 11.0);
    pub const LEGAL: Self = Self::inches(8.5, 14.0);
    pub const TABLOID: Self = Self::inches(11.0, 17.0);
    pub const LEDGER: Self = Self::inches(17.0, 11.0);

    pub const fn new(width: f64, height: f64, unit: Unit) -> Self {
        Self {
            width,
            height,
            unit,
        }
    }

    pub const fn inches(width: f64, height: f64) -> Self {
        Self::new(width, height, Unit::In)
    }

    /// Look up a named preset (`"a4"`, `"letter"` …), case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let size = match name.to_ascii_lowercase().as_str() {
            "a0" => Self::A0,
            "a1" => Self::A1,
            "a2" => Self::A2,
            "a3" => Self::A3,
            "a4" => Self::A4,
            "a5" => Self::A5,
            "a6" => Self::A6,
            "letter" => Self::LETTER,
            "legal" => Self::LEGAL,
            "tabloid" => Self::TABLOID,
            "ledger" => Self::LEDGER,
            _ => return None,
        };
        Some(size)
    }
}

/// Page margins; all four sides share one unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageMargins {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
    #[serde(default)]
    pub unit: Unit,
}

impl PageMargins {
    pub const NONE: Self = Self::uniform(0.0, Unit::In);
    pub const NORMAL: Self = Self::uniform(1.0, Unit::In);
    pub const LARGE: Self = Self::uniform(2.0, Unit::In);

    pub const fn uniform(margin: f64, unit: Unit) -> Self {
        Self {
            top: margin,
            bottom: margin,
            left: margin,
            right: margin,
            unit,
        }
    }
}

/// PDF/A conformance level of the resulting PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PdfAFormat {
    /// LibreOffice dropped PDF/A-1a in 7.6; 1b remains.
    A1b,
    A2b,
    A3b,
}

impl PdfAFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            PdfAFormat::A1b => "PDF/A-1b",
            PdfAFormat::A2b => "PDF/A-2b",
            PdfAFormat::A3b => "PDF/A-3b",
        }
    }
}

/// Screenshot image encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl ImageFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Webp => "webp",
        }
    }
}

/// CSS media type Chromium emulates while rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaType {
    Print,
    Screen,
}

impl MediaType {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Print => "print",
            MediaType::Screen => "screen",
        }
    }
}

/// How a PDF is partitioned by the split operation.
///
/// The mode changes what `splitSpan` means: a page-range expression for
/// [`SplitMode::Pages`], a page count per chunk for [`SplitMode::Intervals`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitMode {
    Pages,
    Intervals,
}

impl SplitMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SplitMode::Pages => "pages",
            SplitMode::Intervals => "intervals",
        }
    }
}

/// HTTP verb the service uses when calling a webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WebhookMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
}

impl WebhookMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            WebhookMethod::Get => "GET",
            WebhookMethod::Post => "POST",
            WebhookMethod::Put => "PUT",
            WebhookMethod::Patch => "PATCH",
        }
    }

    /// Parse a verb, falling back to `GET` for anything unsupported.
    pub fn parse_lossy(method: &str) -> Self {
        match method.trim().to_ascii_uppercase().as_str() {
            "POST" => WebhookMethod::Post,
            "PUT" => WebhookMethod::Put,
            "PATCH" => WebhookMethod::Patch,
            _ => WebhookMethod::Get,
        }
    }
}

impl From<&str> for WebhookMethod {
    fn from(method: &str) -> Self {
        Self::parse_lossy(method)
    }
}
