//! `multipart/form-data` encoding of a [`FormData`].
//!
//! The encoder writes into any [`AsyncWrite`]; [`encode`] drives it into an
//! in-memory buffer for submission. Each document is opened just before its
//! part is written and its stream is dropped as soon as the copy ends, on
//! success and failure alike.
//!
//! Wire layout, CRLF line endings:
//!
//! ```text
//! --<boundary>
//! Content-Disposition: form-data; name="files"; filename="index.html"
//! Content-Type: application/octet-stream
//!
//! <bytes>
//! --<boundary>
//! Content-Disposition: form-data; name="landscape"
//!
//! true
//! --<boundary>--
//! ```

use crate::document::Document;
use crate::error::{GotenbergError, Result};
use crate::form::HttpHeader;
use crate::request::FormData;
use bytes::Bytes;
use std::collections::BTreeMap;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Part name for primary inputs.
pub const FILES_FIELD: &str = "files";
/// Part name for embedded attachments.
pub const EMBEDS_FIELD: &str = "embeds";

/// A fully encoded request body and the headers that go with it.
#[derive(Debug, Clone)]
pub struct EncodedForm {
    /// `multipart/form-data; boundary=…`
    pub content_type: String,
    pub body: Bytes,
    /// Custom headers carried over from the request builder.
    pub headers: BTreeMap<HttpHeader, String>,
    pub file_count: usize,
    pub embed_count: usize,
    pub field_count: usize,
}

/// Encode every file, embed and field of `form` into one body.
///
/// Any document that cannot be opened or copied aborts the whole encode
/// with an error naming that document.
pub async fn encode(form: FormData) -> Result<EncodedForm> {
    let FormData {
        headers,
        fields,
        files,
        embeds,
    } = form;

    let mut encoder = MultipartEncoder::new(Vec::new());
    let content_type = encoder.content_type();

    let (file_count, embed_count, field_count) = (files.len(), embeds.len(), fields.len());

    for (_, mut doc) in files {
        encoder.write_file(FILES_FIELD, &mut doc).await?;
    }
    for (_, mut doc) in embeds {
        encoder.write_file(EMBEDS_FIELD, &mut doc).await?;
    }
    for (field, value) in &fields {
        encoder.write_field(field.as_str(), value).await?;
    }

    let body = encoder.finish().await?;
    debug!(
        "Encoded multipart body: {} files, {} embeds, {} fields, {} bytes",
        file_count,
        embed_count,
        field_count,
        body.len()
    );

    Ok(EncodedForm {
        content_type,
        body: Bytes::from(body),
        headers,
        file_count,
        embed_count,
        field_count,
    })
}

/// Streaming multipart writer.
pub struct MultipartEncoder<W> {
    writer: W,
    boundary: String,
}

impl<W: AsyncWrite + Unpin> MultipartEncoder<W> {
    /// Encoder with a fresh random boundary.
    pub fn new(writer: W) -> Self {
        Self::with_boundary(writer, generate_boundary())
    }

    pub fn with_boundary(writer: W, boundary: impl Into<String>) -> Self {
        Self {
            writer,
            boundary: boundary.into(),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Write one plain text field.
    pub async fn write_field(&mut self, name: &str, value: &str) -> Result<()> {
        let part = format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
            self.boundary,
            escape_quoted(name),
            value
        );
        self.writer
            .write_all(part.as_bytes())
            .await
            .map_err(|source| GotenbergError::FieldWriteFailed {
                field: name.to_string(),
                source,
            })
    }

    /// Open `doc`, write it as a file part under `field`, and close it.
    ///
    /// Returns the number of content bytes copied.
    pub async fn write_file(&mut self, field: &str, doc: &mut Document) -> Result<u64> {
        let mut reader = doc.open().await?;
        let name = doc.name().to_string();
        let copy_failed = |source| GotenbergError::CopyFailed {
            name: name.clone(),
            source,
        };

        let head = format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            self.boundary,
            escape_quoted(field),
            escape_quoted(&name)
        );
        self.writer
            .write_all(head.as_bytes())
            .await
            .map_err(copy_failed)?;
        let copied = tokio::io::copy(&mut reader, &mut self.writer)
            .await
            .map_err(copy_failed)?;
        self.writer.write_all(b"\r\n").await.map_err(copy_failed)?;

        debug!("Wrote {} part '{}' ({} bytes)", field, name, copied);
        Ok(copied)
    }

    /// Write the closing boundary, flush and shut the writer down.
    pub async fn finish(mut self) -> Result<W> {
        let trailer = format!("--{}--\r\n", self.boundary);
        self.writer
            .write_all(trailer.as_bytes())
            .await
            .map_err(GotenbergError::EncoderCloseFailed)?;
        self.writer
            .flush()
            .await
            .map_err(GotenbergError::EncoderCloseFailed)?;
        self.writer
            .shutdown()
            .await
            .map_err(GotenbergError::EncoderCloseFailed)?;
        Ok(self.writer)
    }
}

fn generate_boundary() -> String {
    format!("gotenberg-{:016x}{:016x}", fastrand::u64(..), fastrand::u64(..))
}

/// Backslash-quote a value for a quoted `Content-Disposition` parameter.
///
/// CR and LF cannot be quoted and would end the header line, so they are
/// percent-escaped instead.
fn escape_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\r' => out.push_str("%0D"),
            '\n' => out.push_str("%0A"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{EmbedOptions, MergeRequest, MultipartRequest, PdfOptions};
    use std::io;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::task::{Context, Poll};
    use tokio::io::{AsyncRead, ReadBuf};

    fn body_text(encoded: &EncodedForm) -> String {
        String::from_utf8(encoded.body.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn exact_framing_with_fixed_boundary() {
        let mut enc = MultipartEncoder::with_boundary(Vec::new(), "XYZ");
        let mut doc = Document::from_string("index.html", "<p>hi</p>").unwrap();
        enc.write_file(FILES_FIELD, &mut doc).await.unwrap();
        enc.write_field("landscape", "true").await.unwrap();
        let out = enc.finish().await.unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "--XYZ\r\n\
             Content-Disposition: form-data; name=\"files\"; filename=\"index.html\"\r\n\
             Content-Type: application/octet-stream\r\n\
             \r\n\
             <p>hi</p>\r\n\
             --XYZ\r\n\
             Content-Disposition: form-data; name=\"landscape\"\r\n\
             \r\n\
             true\r\n\
             --XYZ--\r\n"
        );
    }

    #[tokio::test]
    async fn files_and_embeds_use_separate_part_names() {
        let form = MergeRequest::new([Document::from_string("doc.pdf", "%PDF").unwrap()])
            .embeds([Document::from_string("data.xml", "<x/>").unwrap()])
            .flatten(true)
            .into_form();

        let encoded = encode(form).await.unwrap();
        let text = body_text(&encoded);
        assert!(text.contains("name=\"files\"; filename=\"doc.pdf\""));
        assert!(text.contains("name=\"embeds\"; filename=\"data.xml\""));
        assert!(text.contains("name=\"flatten\"\r\n\r\ntrue\r\n"));
        assert_eq!((encoded.file_count, encoded.embed_count, encoded.field_count), (1, 1, 1));
        assert!(encoded.content_type.starts_with("multipart/form-data; boundary=gotenberg-"));
        assert!(text.ends_with("--\r\n"));
    }

    #[tokio::test]
    async fn same_content_under_two_names_is_sent_twice() {
        let pdf = b"%PDF-1.4 three pages".to_vec();
        let form = MergeRequest::new([
            Document::from_bytes("pdf1.pdf", pdf.clone()).unwrap(),
            Document::from_bytes("pdf2.pdf", pdf).unwrap(),
        ])
        .into_form();
        let text = body_text(&encode(form).await.unwrap());
        assert_eq!(text.matches("%PDF-1.4 three pages").count(), 2);
    }

    #[test]
    fn boundaries_differ() {
        assert_ne!(generate_boundary(), generate_boundary());
    }

    #[test]
    fn quotes_and_backslashes_in_filenames_are_escaped() {
        assert_eq!(escape_quoted(r#"C:\reports\q"1".pdf"#), r#"C:\\reports\\q\"1\".pdf"#);
        assert_eq!(escape_quoted("a\r\n.pdf"), "a%0D%0A.pdf");
    }

    #[tokio::test]
    async fn escaped_filename_reaches_the_part_header() {
        let mut enc = MultipartEncoder::with_boundary(Vec::new(), "XYZ");
        let mut doc = Document::from_string(r#"C:\reports\q"1".pdf"#, "%PDF").unwrap();
        enc.write_file(FILES_FIELD, &mut doc).await.unwrap();
        let text = String::from_utf8(enc.finish().await.unwrap()).unwrap();
        assert!(
            text.contains(r#"name="files"; filename="C:\\reports\\q\"1\".pdf""#),
            "got: {text}"
        );
    }

    struct BrokenReader;

    impl AsyncRead for BrokenReader {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "source gone")))
        }
    }

    #[tokio::test]
    async fn copy_failure_names_the_document() {
        let mut enc = MultipartEncoder::new(Vec::new());
        let mut doc = Document::from_reader("stream.pdf", BrokenReader).unwrap();
        let err = enc.write_file(FILES_FIELD, &mut doc).await.unwrap_err();
        assert!(
            matches!(err, GotenbergError::CopyFailed { ref name, .. } if name == "stream.pdf"),
            "got: {err:?}"
        );
    }

    #[tokio::test]
    async fn unreadable_document_aborts_encode() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let doc = Document::from_path("gone.pdf", tmp.path()).unwrap();
        drop(tmp);
        let err = encode(MergeRequest::new([doc]).into_form()).await.unwrap_err();
        assert!(matches!(err, GotenbergError::DocumentUnreadable { .. }), "got: {err:?}");
    }

    /// Serves `data`, optionally failing after it, and counts its drops.
    struct CountedReader {
        data: io::Cursor<Vec<u8>>,
        fail_at_end: bool,
        drops: Arc<AtomicUsize>,
    }

    impl CountedReader {
        fn new(data: &[u8], fail_at_end: bool, drops: &Arc<AtomicUsize>) -> Self {
            Self {
                data: io::Cursor::new(data.to_vec()),
                fail_at_end,
                drops: Arc::clone(drops),
            }
        }
    }

    impl AsyncRead for CountedReader {
        fn poll_read(
            mut self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            let exhausted = self.data.position() as usize >= self.data.get_ref().len();
            if exhausted && self.fail_at_end {
                return Poll::Ready(Err(io::Error::new(io::ErrorKind::ConnectionReset, "cut")));
            }
            Pin::new(&mut self.data).poll_read(cx, buf)
        }
    }

    impl Drop for CountedReader {
        fn drop(&mut self) {
            self.drops.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn reader_is_closed_after_a_successful_copy() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mut enc = MultipartEncoder::new(Vec::new());
        let mut doc =
            Document::from_reader("a.pdf", CountedReader::new(b"%PDF", false, &drops)).unwrap();

        assert_eq!(enc.write_file(FILES_FIELD, &mut doc).await.unwrap(), 4);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
        drop(doc);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn reader_is_closed_when_the_copy_fails() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mut enc = MultipartEncoder::new(Vec::new());
        let mut doc =
            Document::from_reader("a.pdf", CountedReader::new(b"%PDF", true, &drops)).unwrap();

        let err = enc.write_file(FILES_FIELD, &mut doc).await.unwrap_err();
        assert!(matches!(err, GotenbergError::CopyFailed { .. }), "got: {err:?}");
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn every_reader_is_closed_when_a_later_document_fails() {
        let drops = Arc::new(AtomicUsize::new(0));
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let gone = Document::from_path("b.pdf", tmp.path()).unwrap();
        drop(tmp);

        // Files are written in name order: a.pdf copies, b.pdf fails to
        // open, c.pdf is never opened.
        let form = MergeRequest::new([
            Document::from_reader("a.pdf", CountedReader::new(b"%PDF-a", false, &drops)).unwrap(),
            gone,
            Document::from_reader("c.pdf", CountedReader::new(b"%PDF-c", false, &drops)).unwrap(),
        ])
        .embeds([
            Document::from_reader("d.xml", CountedReader::new(b"<d/>", false, &drops)).unwrap(),
        ])
        .into_form();

        let err = encode(form).await.unwrap_err();
        assert!(
            matches!(err, GotenbergError::DocumentUnreadable { ref name, .. } if name == "b.pdf"),
            "got: {err:?}"
        );
        assert_eq!(drops.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn every_reader_is_closed_after_a_full_encode() {
        let drops = Arc::new(AtomicUsize::new(0));
        let form = MergeRequest::new([
            Document::from_reader("a.pdf", CountedReader::new(b"%PDF-a", false, &drops)).unwrap(),
            Document::from_reader("b.pdf", CountedReader::new(b"%PDF-b", false, &drops)).unwrap(),
        ])
        .embeds([
            Document::from_reader("d.xml", CountedReader::new(b"<d/>", false, &drops)).unwrap(),
        ])
        .into_form();

        let text = body_text(&encode(form).await.unwrap());
        assert!(text.contains("%PDF-a") && text.contains("%PDF-b") && text.contains("<d/>"));
        assert_eq!(drops.load(Ordering::SeqCst), 3);
    }

    /// Accepts writes but fails to shut down.
    struct ShutdownFails(Vec<u8>);

    impl AsyncWrite for ShutdownFails {
        fn poll_write(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            self.0.extend_from_slice(buf);
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::Other, "disk full")))
        }
    }

    #[tokio::test]
    async fn close_failure_after_copy_is_reported() {
        let mut enc = MultipartEncoder::new(ShutdownFails(Vec::new()));
        let mut doc = Document::from_string("a.html", "x").unwrap();
        enc.write_file(FILES_FIELD, &mut doc).await.unwrap();
        let err = enc.finish().await.err().unwrap();
        assert!(matches!(err, GotenbergError::EncoderCloseFailed(_)), "got: {err:?}");
    }
}
