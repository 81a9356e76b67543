//! End-to-end tests against a running Gotenberg service.
//!
//! These tests make live HTTP calls, so they are gated behind the
//! `E2E_ENABLED` environment variable and do not run in CI unless
//! explicitly requested.
//!
//! Start a service and run:
//!   docker run --rm -p 3000:3000 gotenberg/gotenberg:8
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture
//!
//! Point at another instance with `GOTENBERG_URL`.

use gotenberg_client::{
    collect, ChromiumOptions, Client, CommonOptions, Document, EncryptRequest, FlattenRequest,
    GotenbergError, HtmlRequest, ImageFormat, LibreOfficeRequest, MarkdownRequest, MergeRequest,
    PageMargins, PaperDimensions, PdfOptions, ReadMetadataRequest, ScreenshotOptions,
    SplitIntervalsRequest, SplitPagesRequest, UrlRequest, WriteMetadataRequest,
};
use std::path::{Path, PathBuf};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Skip this test unless E2E_ENABLED is set; otherwise yield a client.
macro_rules! e2e_client_or_skip {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        let url =
            std::env::var("GOTENBERG_URL").unwrap_or_else(|_| "http://localhost:3000".into());
        Client::new(url).expect("valid service url")
    }};
}

fn output_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("temp dir")
}

const HTML: &str = r#"<!doctype html>
<html><head><link rel="stylesheet" href="style.css"></head>
<body><h1>Quarterly report</h1><p>Figures attached.</p></body></html>"#;

const MARKDOWN_WRAPPER: &str = r#"<!doctype html>
<html><body>{{ toHTML "notes.md" }}</body></html>"#;

fn index() -> Document {
    Document::from_string("report.html", HTML).unwrap()
}

fn stylesheet() -> Document {
    Document::from_string("style.css", "h1 { color: teal; }").unwrap()
}

/// Assert that `path` holds a PDF.
fn assert_pdf(path: &Path, context: &str) {
    let bytes = std::fs::read(path).unwrap_or_else(|e| panic!("[{context}] read failed: {e}"));
    assert!(
        bytes.starts_with(b"%PDF-"),
        "[{context}] output is not a PDF ({} bytes)",
        bytes.len()
    );
    println!("[{context}] ✓  {} bytes", bytes.len());
}

/// Render a small PDF through Chromium for the PDF-engine tests.
async fn rendered_pdf(client: &Client, dir: &Path, name: &str) -> PathBuf {
    let dest = dir.join(name);
    client
        .store(HtmlRequest::new(index()).assets([stylesheet()]), &dest)
        .await
        .expect("html conversion should succeed");
    dest
}

// ── Chromium ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn html_to_pdf() {
    let client = e2e_client_or_skip!();
    let dir = output_dir();
    let dest = dir.path().join("report.pdf");

    let req = HtmlRequest::new(index())
        .assets([stylesheet()])
        .paper_size(PaperDimensions::A4)
        .margins(PageMargins::NORMAL)
        .print_background(true)
        .trace("e2e-html");
    let n = client.store(req, &dest).await.expect("store should succeed");

    assert!(n > 0);
    assert_pdf(&dest, "html");
}

#[tokio::test]
async fn markdown_to_pdf() {
    let client = e2e_client_or_skip!();
    let dir = output_dir();
    let dest = dir.path().join("notes.pdf");

    let req = MarkdownRequest::new(
        Document::from_string("wrapper.html", MARKDOWN_WRAPPER).unwrap(),
        [Document::from_string("notes.md", "# Notes\n\n- one\n- two\n").unwrap()],
    );
    client.store(req, &dest).await.expect("store should succeed");
    assert_pdf(&dest, "markdown");
}

#[tokio::test]
async fn html_screenshot() {
    let client = e2e_client_or_skip!();
    let dir = output_dir();
    let dest = dir.path().join("shot.png");

    let req = HtmlRequest::new(index())
        .screenshot_width(800)
        .screenshot_height(600)
        .screenshot_format(ImageFormat::Png);
    client
        .store_screenshot(req, &dest)
        .await
        .expect("screenshot should succeed");

    let bytes = std::fs::read(&dest).unwrap();
    assert!(bytes.starts_with(b"\x89PNG"), "expected PNG signature");
}

#[tokio::test]
async fn url_failing_status_is_reported() {
    let client = e2e_client_or_skip!();

    let req = UrlRequest::new("http://localhost:1/unreachable")
        .fail_on_http_status_codes([499, 599])
        .unwrap();
    let err = client.stream(req).await.err().expect("conversion should fail");

    match err {
        GotenbergError::GenerationFailed { status, ref body } => {
            assert!(status >= 400, "unexpected status {status}");
            println!("[url] service said {status}: {}", body.trim());
        }
        other => panic!("expected GenerationFailed, got {other:?}"),
    }
}

// ── LibreOffice ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn office_text_to_pdf() {
    let client = e2e_client_or_skip!();
    let dir = output_dir();
    let dest = dir.path().join("letter.pdf");

    let doc = Document::from_string("letter.txt", "Dear reader,\n\nThis is a letter.\n").unwrap();
    let req = LibreOfficeRequest::new([doc]).landscape(true);
    client.store(req, &dest).await.expect("store should succeed");
    assert_pdf(&dest, "office");
}

// ── PDF engines ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn merge_two_pdfs() {
    let client = e2e_client_or_skip!();
    let dir = output_dir();
    let a = rendered_pdf(&client, dir.path(), "a.pdf").await;
    let b = rendered_pdf(&client, dir.path(), "b.pdf").await;
    let dest = dir.path().join("merged.pdf");

    let req = MergeRequest::new([
        Document::from_path("1.pdf", &a).unwrap(),
        Document::from_path("2.pdf", &b).unwrap(),
    ]);
    client.store(req, &dest).await.expect("merge should succeed");
    assert_pdf(&dest, "merge");
}

#[tokio::test]
async fn split_and_flatten() {
    let client = e2e_client_or_skip!();
    let dir = output_dir();
    let src = rendered_pdf(&client, dir.path(), "src.pdf").await;

    let dest = dir.path().join("page1.pdf");
    let req = SplitPagesRequest::new([Document::from_path("src.pdf", &src).unwrap()], "1").unify(true);
    client.store(req, &dest).await.expect("split pages should succeed");
    assert_pdf(&dest, "split pages");

    let req = SplitIntervalsRequest::new([Document::from_path("src.pdf", &src).unwrap()], 1);
    let resp = client.send(req).await.expect("split intervals should send");
    assert_eq!(resp.status().as_u16(), 200);

    let dest = dir.path().join("flat.pdf");
    let req = FlattenRequest::new([Document::from_path("src.pdf", &src).unwrap()]);
    client.store(req, &dest).await.expect("flatten should succeed");
    assert_pdf(&dest, "flatten");
}

#[tokio::test]
async fn encrypt_pdf() {
    let client = e2e_client_or_skip!();
    let dir = output_dir();
    let src = rendered_pdf(&client, dir.path(), "src.pdf").await;
    let dest = dir.path().join("locked.pdf");

    let req = EncryptRequest::new("open-sesame", "", [Document::from_path("src.pdf", &src).unwrap()]);
    client.store(req, &dest).await.expect("encrypt should succeed");
    assert_pdf(&dest, "encrypt");
}

#[tokio::test]
async fn metadata_round_trip() {
    let client = e2e_client_or_skip!();
    let dir = output_dir();
    let src = rendered_pdf(&client, dir.path(), "src.pdf").await;
    let dest = dir.path().join("tagged.pdf");

    let req = WriteMetadataRequest::new([Document::from_path("src.pdf", &src).unwrap()])
        .metadata(&serde_json::json!({ "Author": "E2E Suite" }))
        .unwrap()
        .pdfua(false);
    client.store(req, &dest).await.expect("write metadata should succeed");

    let stream = client
        .stream(ReadMetadataRequest::new([Document::from_path("tagged.pdf", &dest).unwrap()]))
        .await
        .expect("read metadata should succeed");
    let body = collect(stream).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).expect("metadata is JSON");

    assert_eq!(json["tagged.pdf"]["Author"], "E2E Suite", "got: {json}");
}
