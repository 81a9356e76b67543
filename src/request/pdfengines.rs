//! Operations on existing PDFs: merge, split, flatten, encrypt, embed and
//! metadata read/write.

use super::{impl_has_embeds, impl_has_options, FormData, MultipartRequest, PdfOptions, RequestOptions};
use crate::document::Document;
use crate::form::{encode_bool, FormField};
use crate::types::SplitMode;

const MERGE: &str = "/forms/pdfengines/merge";
const SPLIT: &str = "/forms/pdfengines/split";
const FLATTEN: &str = "/forms/pdfengines/flatten";
const ENCRYPT: &str = "/forms/pdfengines/encrypt";
const EMBED: &str = "/forms/pdfengines/embed";
const METADATA_READ: &str = "/forms/pdfengines/metadata/read";
const METADATA_WRITE: &str = "/forms/pdfengines/metadata/write";

fn pdf_form(options: RequestOptions, pdfs: Vec<Document>, embeds: Vec<Document>) -> FormData {
    FormData::new(options).files(pdfs).embeds(embeds)
}

// ── Merge ────────────────────────────────────────────────────────────────

/// Merge PDFs into one, in alphabetical order of their filenames.
#[derive(Debug)]
pub struct MergeRequest {
    pdfs: Vec<Document>,
    embeds: Vec<Document>,
    options: RequestOptions,
}

impl MergeRequest {
    pub fn new(pdfs: impl IntoIterator<Item = Document>) -> Self {
        Self {
            pdfs: pdfs.into_iter().collect(),
            embeds: Vec::new(),
            options: RequestOptions::new(),
        }
    }
}

impl MultipartRequest for MergeRequest {
    fn endpoint(&self) -> &'static str {
        MERGE
    }

    fn into_form(self) -> FormData {
        pdf_form(self.options, self.pdfs, self.embeds)
    }
}

// ── Split ────────────────────────────────────────────────────────────────

/// Split PDFs by explicit page ranges.
#[derive(Debug)]
pub struct SplitPagesRequest {
    pdfs: Vec<Document>,
    embeds: Vec<Document>,
    options: RequestOptions,
}

impl SplitPagesRequest {
    /// `span` is a page-range expression such as `"1-2"` or `"1-3,5"`.
    pub fn new(pdfs: impl IntoIterator<Item = Document>, span: impl Into<String>) -> Self {
        let mut options = RequestOptions::new();
        options.set_field(FormField::SplitMode, SplitMode::Pages.as_str());
        options.set_field(FormField::SplitSpan, span);
        Self {
            pdfs: pdfs.into_iter().collect(),
            embeds: Vec::new(),
            options,
        }
    }

    /// Put every selected range into one file instead of one file per range.
    pub fn unify(mut self, unify: bool) -> Self {
        self.options
            .set_field(FormField::SplitUnify, encode_bool(unify));
        self
    }
}

impl MultipartRequest for SplitPagesRequest {
    fn endpoint(&self) -> &'static str {
        SPLIT
    }

    fn into_form(self) -> FormData {
        pdf_form(self.options, self.pdfs, self.embeds)
    }
}

/// Split PDFs into chunks of a fixed number of pages.
#[derive(Debug)]
pub struct SplitIntervalsRequest {
    pdfs: Vec<Document>,
    embeds: Vec<Document>,
    options: RequestOptions,
}

impl SplitIntervalsRequest {
    pub fn new(pdfs: impl IntoIterator<Item = Document>, span: u32) -> Self {
        let mut options = RequestOptions::new();
        options.set_field(FormField::SplitMode, SplitMode::Intervals.as_str());
        options.set_field(FormField::SplitSpan, span.to_string());
        Self {
            pdfs: pdfs.into_iter().collect(),
            embeds: Vec::new(),
            options,
        }
    }
}

impl MultipartRequest for SplitIntervalsRequest {
    fn endpoint(&self) -> &'static str {
        SPLIT
    }

    fn into_form(self) -> FormData {
        pdf_form(self.options, self.pdfs, self.embeds)
    }
}

// ── Flatten / Encrypt ────────────────────────────────────────────────────

/// Merge interactive form fields and annotations into the page content.
#[derive(Debug)]
pub struct FlattenRequest {
    pdfs: Vec<Document>,
    options: RequestOptions,
}

impl FlattenRequest {
    pub fn new(pdfs: impl IntoIterator<Item = Document>) -> Self {
        Self {
            pdfs: pdfs.into_iter().collect(),
            options: RequestOptions::new(),
        }
    }
}

impl MultipartRequest for FlattenRequest {
    fn endpoint(&self) -> &'static str {
        FLATTEN
    }

    fn into_form(self) -> FormData {
        pdf_form(self.options, self.pdfs, Vec::new())
    }
}

/// Password-protect PDFs.
#[derive(Debug)]
pub struct EncryptRequest {
    pdfs: Vec<Document>,
    options: RequestOptions,
}

impl EncryptRequest {
    /// An empty `owner_password` is not sent; the service then reuses the
    /// user password.
    pub fn new(
        user_password: impl Into<String>,
        owner_password: impl Into<String>,
        pdfs: impl IntoIterator<Item = Document>,
    ) -> Self {
        let mut options = RequestOptions::new();
        options.set_field(FormField::UserPassword, user_password);
        let owner = owner_password.into();
        if !owner.is_empty() {
            options.set_field(FormField::OwnerPassword, owner);
        }
        Self {
            pdfs: pdfs.into_iter().collect(),
            options,
        }
    }
}

impl MultipartRequest for EncryptRequest {
    fn endpoint(&self) -> &'static str {
        ENCRYPT
    }

    fn into_form(self) -> FormData {
        pdf_form(self.options, self.pdfs, Vec::new())
    }
}

// ── Embed ────────────────────────────────────────────────────────────────

/// Attach files to existing PDFs.
#[derive(Debug)]
pub struct EmbedRequest {
    pdfs: Vec<Document>,
    embeds: Vec<Document>,
    options: RequestOptions,
}

impl EmbedRequest {
    pub fn new(
        pdfs: impl IntoIterator<Item = Document>,
        embeds: impl IntoIterator<Item = Document>,
    ) -> Self {
        Self {
            pdfs: pdfs.into_iter().collect(),
            embeds: embeds.into_iter().collect(),
            options: RequestOptions::new(),
        }
    }
}

impl MultipartRequest for EmbedRequest {
    fn endpoint(&self) -> &'static str {
        EMBED
    }

    fn into_form(self) -> FormData {
        pdf_form(self.options, self.pdfs, self.embeds)
    }
}

// ── Metadata ─────────────────────────────────────────────────────────────

/// Read the metadata of PDFs. The service answers with a JSON object keyed
/// by filename.
#[derive(Debug)]
pub struct ReadMetadataRequest {
    pdfs: Vec<Document>,
    options: RequestOptions,
}

impl ReadMetadataRequest {
    pub fn new(pdfs: impl IntoIterator<Item = Document>) -> Self {
        Self {
            pdfs: pdfs.into_iter().collect(),
            options: RequestOptions::new(),
        }
    }
}

impl MultipartRequest for ReadMetadataRequest {
    fn endpoint(&self) -> &'static str {
        METADATA_READ
    }

    fn into_form(self) -> FormData {
        pdf_form(self.options, self.pdfs, Vec::new())
    }
}

/// Write metadata into PDFs; set it with [`PdfOptions::metadata`].
#[derive(Debug)]
pub struct WriteMetadataRequest {
    pdfs: Vec<Document>,
    embeds: Vec<Document>,
    options: RequestOptions,
}

impl WriteMetadataRequest {
    pub fn new(pdfs: impl IntoIterator<Item = Document>) -> Self {
        Self {
            pdfs: pdfs.into_iter().collect(),
            embeds: Vec::new(),
            options: RequestOptions::new(),
        }
    }
}

impl MultipartRequest for WriteMetadataRequest {
    fn endpoint(&self) -> &'static str {
        METADATA_WRITE
    }

    fn into_form(self) -> FormData {
        pdf_form(self.options, self.pdfs, self.embeds)
    }
}

impl_has_options!(
    MergeRequest,
    SplitPagesRequest,
    SplitIntervalsRequest,
    FlattenRequest,
    EncryptRequest,
    EmbedRequest,
    ReadMetadataRequest,
    WriteMetadataRequest,
);

impl_has_embeds!(
    MergeRequest,
    SplitPagesRequest,
    SplitIntervalsRequest,
    EmbedRequest,
    WriteMetadataRequest,
);

impl PdfOptions for MergeRequest {}
impl PdfOptions for SplitPagesRequest {}
impl PdfOptions for SplitIntervalsRequest {}
impl PdfOptions for WriteMetadataRequest {}
