//! Office document conversion through LibreOffice.

use super::{impl_has_embeds, impl_has_options, FormData, MultipartRequest, PdfOptions, RequestOptions, SplitOptions};
use crate::document::Document;
use crate::form::{encode_bool, FormField};

const OFFICE_CONVERT: &str = "/forms/libreoffice/convert";

/// Convert one or more office documents (`.docx`, `.xlsx`, `.odt` …) to PDF.
///
/// With several inputs the service returns a ZIP archive unless
/// [`merge`](Self::merge) is enabled.
#[derive(Debug)]
pub struct LibreOfficeRequest {
    docs: Vec<Document>,
    embeds: Vec<Document>,
    options: RequestOptions,
}

/// Boolean export toggles that map one-to-one onto a form field.
macro_rules! toggles {
    ($($(#[$doc:meta])* $name:ident => $field:ident;)+) => {
        $(
            $(#[$doc])*
            pub fn $name(mut self, enabled: bool) -> Self {
                self.options.set_field(FormField::$field, encode_bool(enabled));
                self
            }
        )+
    };
}

impl LibreOfficeRequest {
    pub fn new(docs: impl IntoIterator<Item = Document>) -> Self {
        Self {
            docs: docs.into_iter().collect(),
            embeds: Vec::new(),
            options: RequestOptions::new(),
        }
    }

    /// Password that opens the source documents.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.options.set_field(FormField::Password, password);
        self
    }

    /// Pages to export, e.g. `"1-4"`.
    pub fn native_page_ranges(mut self, ranges: impl Into<String>) -> Self {
        self.options.set_field(FormField::NativePageRanges, ranges);
        self
    }

    /// JPEG export quality, 1–100.
    pub fn quality(mut self, quality: u8) -> Self {
        self.options
            .set_field(FormField::Quality, quality.to_string());
        self
    }

    /// Target DPI when [`reduce_image_resolution`](Self::reduce_image_resolution)
    /// is on. The service accepts 75, 150, 300, 600 and 1200.
    pub fn max_image_resolution(mut self, dpi: u32) -> Self {
        self.options
            .set_field(FormField::MaxImageResolution, dpi.to_string());
        self
    }

    toggles! {
        landscape => Landscape;
        export_form_fields => ExportFormFields;
        allow_duplicate_field_names => AllowDuplicateFieldNames;
        export_bookmarks => ExportBookmarks;
        /// Export bookmarks as named destinations.
        export_bookmarks_to_pdf_destination => ExportBookmarksToPdfDestination;
        export_placeholders => ExportPlaceholders;
        export_notes => ExportNotes;
        /// Impress documents only.
        export_notes_pages => ExportNotesPages;
        export_only_notes_pages => ExportOnlyNotesPages;
        export_notes_in_margin => ExportNotesInMargin;
        /// Rewrite `.od[tpgs]` link targets to `.pdf`.
        convert_ooo_target_to_pdf_target => ConvertOooTargetToPdfTarget;
        export_links_relative_fsys => ExportLinksRelativeFsys;
        export_hidden_slides => ExportHiddenSlides;
        /// Writer documents only.
        skip_empty_pages => SkipEmptyPages;
        /// Store the source document inside the PDF for archiving.
        add_original_document_as_stream => AddOriginalDocumentAsStream;
        single_page_sheets => SinglePageSheets;
        lossless_image_compression => LosslessImageCompression;
        reduce_image_resolution => ReduceImageResolution;
        /// Merge every converted document into one PDF.
        merge => Merge;
        /// Updating indexes can leave broken links in the result.
        update_indexes => UpdateIndexes;
    }
}

impl MultipartRequest for LibreOfficeRequest {
    fn endpoint(&self) -> &'static str {
        OFFICE_CONVERT
    }

    fn into_form(self) -> FormData {
        FormData::new(self.options)
            .files(self.docs)
            .embeds(self.embeds)
    }
}

impl_has_options!(LibreOfficeRequest);
impl_has_embeds!(LibreOfficeRequest);
impl PdfOptions for LibreOfficeRequest {}
impl SplitOptions for LibreOfficeRequest {}
