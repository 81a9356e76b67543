//! CLI binary for gotenberg-client.
//!
//! A thin shim over the library crate: each subcommand builds one request,
//! applies the global options, and stores the result.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use gotenberg_client::{
    collect, ChromiumOptions, Client, ClientConfig, CommonOptions, Document, EmbedRequest,
    EncryptRequest, FlattenRequest, HtmlRequest, ImageFormat, LibreOfficeRequest,
    MarkdownRequest, MergeRequest, MultipartRequest, PageMargins, PaperDimensions, PdfAFormat,
    PdfOptions, ReadMetadataRequest, ScreenshotOptions, ScreenshotRequest, SplitIntervalsRequest,
    SplitPagesRequest, Unit, UrlRequest, WriteMetadataRequest,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

// ── CLI definition ───────────────────────────────────────────────────────

const AFTER_HELP: &str = "\
EXAMPLES:
  gotenberg html index.html --asset style.css -o page.pdf
  gotenberg url https://example.com --screenshot --format png -o shot.png
  gotenberg office report.docx sheet.xlsx --merge -o report.pdf
  gotenberg merge a.pdf b.pdf -o merged.pdf
  gotenberg split big.pdf --pages 1-3 -o first-pages.zip
  gotenberg read-metadata a.pdf

ENVIRONMENT:
  GOTENBERG_URL        Service root (default http://localhost:3000)
  GOTENBERG_USERNAME   Basic auth user
  GOTENBERG_PASSWORD   Basic auth password
  RUST_LOG             Log filter, e.g. gotenberg_client=debug";

#[derive(Parser, Debug)]
#[command(
    name = "gotenberg",
    version,
    about = "Convert documents to PDF and manipulate PDFs with a Gotenberg service",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Gotenberg service root.
    #[arg(long, global = true, env = "GOTENBERG_URL", default_value = "http://localhost:3000")]
    url: String,

    /// Basic auth username.
    #[arg(long, global = true, env = "GOTENBERG_USERNAME")]
    username: Option<String>,

    /// Basic auth password.
    #[arg(long, global = true, env = "GOTENBERG_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Request id written to the service logs.
    #[arg(long, global = true)]
    trace: Option<String>,

    /// Whole-request timeout in seconds.
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Destination file. Required except for read-metadata, which prints JSON.
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Errors only; no spinner.
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert an HTML page with Chromium.
    Html {
        /// Main page; sent as index.html.
        index: PathBuf,
        /// Images, fonts, stylesheets referenced by the page.
        #[arg(long = "asset")]
        assets: Vec<PathBuf>,
        #[command(flatten)]
        chromium: ChromiumArgs,
    },
    /// Convert Markdown files through an HTML template.
    Markdown {
        /// Template; sent as index.html.
        index: PathBuf,
        /// Markdown files referenced by the template.
        #[arg(required = true)]
        markdowns: Vec<PathBuf>,
        #[arg(long = "asset")]
        assets: Vec<PathBuf>,
        #[command(flatten)]
        chromium: ChromiumArgs,
    },
    /// Convert a remote page with Chromium.
    Url {
        target: String,
        #[command(flatten)]
        chromium: ChromiumArgs,
    },
    /// Convert office documents with LibreOffice.
    Office {
        #[arg(required = true)]
        docs: Vec<PathBuf>,
        /// Merge the converted documents into one PDF.
        #[arg(long)]
        merge: bool,
        #[arg(long)]
        landscape: bool,
        /// Pages to export, e.g. 1-4.
        #[arg(long)]
        page_ranges: Option<String>,
        #[command(flatten)]
        pdf: PdfArgs,
    },
    /// Merge PDFs in alphabetical filename order.
    Merge {
        #[arg(required = true)]
        pdfs: Vec<PathBuf>,
        #[command(flatten)]
        pdf: PdfArgs,
    },
    /// Split PDFs by page ranges or fixed intervals.
    Split {
        #[arg(required = true)]
        pdfs: Vec<PathBuf>,
        /// Page ranges, e.g. 1-3,5.
        #[arg(long, conflicts_with = "every", required_unless_present = "every")]
        pages: Option<String>,
        /// Put all selected ranges in one file.
        #[arg(long, requires = "pages")]
        unify: bool,
        /// Chunk size in pages.
        #[arg(long)]
        every: Option<u32>,
    },
    /// Flatten form fields and annotations.
    Flatten {
        #[arg(required = true)]
        pdfs: Vec<PathBuf>,
    },
    /// Password-protect PDFs.
    Encrypt {
        #[arg(required = true)]
        pdfs: Vec<PathBuf>,
        #[arg(long)]
        user_password: String,
        #[arg(long, default_value = "")]
        owner_password: String,
    },
    /// Attach files to PDFs.
    Embed {
        #[arg(required = true)]
        pdfs: Vec<PathBuf>,
        #[arg(long = "file", required = true)]
        files: Vec<PathBuf>,
    },
    /// Print PDF metadata as JSON.
    ReadMetadata {
        #[arg(required = true)]
        pdfs: Vec<PathBuf>,
    },
    /// Write metadata given as a JSON object.
    WriteMetadata {
        #[arg(required = true)]
        pdfs: Vec<PathBuf>,
        /// e.g. '{"Author":"Jane"}'
        #[arg(long)]
        metadata: String,
    },
}

#[derive(Args, Debug)]
struct ChromiumArgs {
    /// Paper preset: a0–a6, letter, legal, tabloid, ledger.
    #[arg(long)]
    paper: Option<String>,
    /// Uniform margin in inches.
    #[arg(long)]
    margin: Option<f64>,
    #[arg(long)]
    landscape: bool,
    #[arg(long)]
    print_background: bool,
    /// Wait this many milliseconds after load before printing.
    #[arg(long)]
    wait_delay_ms: Option<u64>,
    /// Header page; sent as header.html.
    #[arg(long)]
    header: Option<PathBuf>,
    /// Footer page; sent as footer.html.
    #[arg(long)]
    footer: Option<PathBuf>,
    /// Produce an image instead of a PDF.
    #[arg(long)]
    screenshot: bool,
    /// Screenshot image format.
    #[arg(long, value_enum, default_value = "png")]
    format: FormatArg,
    #[command(flatten)]
    pdf: PdfArgs,
}

#[derive(Args, Debug)]
struct PdfArgs {
    /// PDF/A conformance of the result.
    #[arg(long, value_enum)]
    pdfa: Option<PdfAArg>,
    /// PDF/UA accessibility.
    #[arg(long)]
    pdfua: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Png,
    Jpeg,
    Webp,
}

impl From<FormatArg> for ImageFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Png => ImageFormat::Png,
            FormatArg::Jpeg => ImageFormat::Jpeg,
            FormatArg::Webp => ImageFormat::Webp,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PdfAArg {
    #[value(name = "1b")]
    A1b,
    #[value(name = "2b")]
    A2b,
    #[value(name = "3b")]
    A3b,
}

impl From<PdfAArg> for PdfAFormat {
    fn from(p: PdfAArg) -> Self {
        match p {
            PdfAArg::A1b => PdfAFormat::A1b,
            PdfAArg::A2b => PdfAFormat::A2b,
            PdfAArg::A3b => PdfAFormat::A3b,
        }
    }
}

// ── Request assembly ─────────────────────────────────────────────────────

/// Path-backed document named after the file.
fn doc(path: &Path) -> Result<Document> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("'{}' has no file name", path.display()))?;
    Document::from_path(name, path).with_context(|| format!("Cannot use '{}'", path.display()))
}

fn docs(paths: &[PathBuf]) -> Result<Vec<Document>> {
    paths.iter().map(|p| doc(p)).collect()
}

fn apply_common<R: CommonOptions>(mut req: R, cli: &Cli) -> R {
    if let Some(user) = &cli.username {
        req = req.basic_auth(user, cli.password.as_deref().unwrap_or_default());
    }
    if let Some(trace) = &cli.trace {
        req = req.trace(trace.as_str());
    }
    req
}

fn apply_pdf<R: PdfOptions>(mut req: R, args: &PdfArgs) -> R {
    if let Some(pdfa) = args.pdfa {
        req = req.pdfa(pdfa.into());
    }
    if args.pdfua {
        req = req.pdfua(true);
    }
    req
}

fn apply_chromium<R>(mut req: R, args: &ChromiumArgs) -> Result<R>
where
    R: ChromiumOptions + ScreenshotOptions + PdfOptions,
{
    if let Some(name) = &args.paper {
        let size = PaperDimensions::from_name(name)
            .with_context(|| format!("Unknown paper size '{name}'"))?;
        req = req.paper_size(size);
    }
    if let Some(margin) = args.margin {
        req = req.margins(PageMargins::uniform(margin, Unit::In));
    }
    if args.landscape {
        req = req.landscape(true);
    }
    if args.print_background {
        req = req.print_background(true);
    }
    if let Some(ms) = args.wait_delay_ms {
        req = req.wait_delay(Duration::from_millis(ms));
    }
    if let Some(path) = &args.header {
        req = req.header(doc(path)?);
    }
    if let Some(path) = &args.footer {
        req = req.footer(doc(path)?);
    }
    if args.screenshot {
        req = req.screenshot_format(args.format.into());
    }
    Ok(apply_pdf(req, &args.pdf))
}

// ── Delivery ─────────────────────────────────────────────────────────────

fn spinner(quiet: bool, label: &str) -> Option<ProgressBar> {
    if quiet {
        return None;
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix("Gotenberg");
    bar.set_message(label.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    Some(bar)
}

fn require_output(cli: &Cli) -> Result<&Path> {
    match &cli.output {
        Some(p) => Ok(p.as_path()),
        None => bail!("--output is required for this command"),
    }
}

async fn store<R: MultipartRequest>(client: &Client, cli: &Cli, req: R) -> Result<()> {
    let dest = require_output(cli)?;
    let label = req.endpoint().to_string();
    let bar = spinner(cli.quiet, &label);
    let started = Instant::now();
    let result = client.store(apply_common(req, cli), dest).await;
    finish(bar, cli.quiet, dest, started, result)
}

async fn store_screenshot<R: ScreenshotRequest>(client: &Client, cli: &Cli, req: R) -> Result<()> {
    let dest = require_output(cli)?;
    let label = req.screenshot_endpoint().to_string();
    let bar = spinner(cli.quiet, &label);
    let started = Instant::now();
    let result = client.store_screenshot(apply_common(req, cli), dest).await;
    finish(bar, cli.quiet, dest, started, result)
}

fn finish(
    bar: Option<ProgressBar>,
    quiet: bool,
    dest: &Path,
    started: Instant,
    result: gotenberg_client::Result<u64>,
) -> Result<()> {
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }
    match result {
        Ok(bytes) => {
            if !quiet {
                eprintln!(
                    "{} {}  {}",
                    green("✓"),
                    dest.display(),
                    dim(&format!("{bytes} bytes in {:.1?}", started.elapsed()))
                );
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", red("✗"), e);
            Err(e).context("Conversion failed")
        }
    }
}

async fn chromium<R>(client: &Client, cli: &Cli, req: R, args: &ChromiumArgs) -> Result<()>
where
    R: ScreenshotRequest + ChromiumOptions + ScreenshotOptions + PdfOptions,
{
    let req = apply_chromium(req, args)?;
    if args.screenshot {
        store_screenshot(client, cli, req).await
    } else {
        store(client, cli, req).await
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner covers normal progress; library logs only show on -v.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let mut config = ClientConfig::builder().hostname(cli.url.as_str());
    if let Some(secs) = cli.timeout {
        config = config.timeout_secs(secs);
    }
    let client = Client::from_config(config.build().context("Invalid --url")?)?;

    match &cli.command {
        Command::Html {
            index,
            assets,
            chromium: args,
        } => {
            let req = HtmlRequest::new(doc(index)?).assets(docs(assets)?);
            chromium(&client, &cli, req, args).await
        }
        Command::Markdown {
            index,
            markdowns,
            assets,
            chromium: args,
        } => {
            let req = MarkdownRequest::new(doc(index)?, docs(markdowns)?).assets(docs(assets)?);
            chromium(&client, &cli, req, args).await
        }
        Command::Url {
            target,
            chromium: args,
        } => chromium(&client, &cli, UrlRequest::new(target.as_str()), args).await,
        Command::Office {
            docs: paths,
            merge,
            landscape,
            page_ranges,
            pdf,
        } => {
            let mut req = LibreOfficeRequest::new(docs(paths)?)
                .merge(*merge)
                .landscape(*landscape);
            if let Some(ranges) = page_ranges {
                req = req.native_page_ranges(ranges.as_str());
            }
            store(&client, &cli, apply_pdf(req, pdf)).await
        }
        Command::Merge { pdfs, pdf } => {
            store(&client, &cli, apply_pdf(MergeRequest::new(docs(pdfs)?), pdf)).await
        }
        Command::Split {
            pdfs,
            pages,
            unify,
            every,
        } => match (pages, every) {
            (Some(span), _) => {
                let req = SplitPagesRequest::new(docs(pdfs)?, span.as_str()).unify(*unify);
                store(&client, &cli, req).await
            }
            (None, Some(n)) => store(&client, &cli, SplitIntervalsRequest::new(docs(pdfs)?, *n)).await,
            (None, None) => bail!("Pass --pages or --every"),
        },
        Command::Flatten { pdfs } => store(&client, &cli, FlattenRequest::new(docs(pdfs)?)).await,
        Command::Encrypt {
            pdfs,
            user_password,
            owner_password,
        } => {
            let req = EncryptRequest::new(user_password.as_str(), owner_password.as_str(), docs(pdfs)?);
            store(&client, &cli, req).await
        }
        Command::Embed { pdfs, files } => {
            store(&client, &cli, EmbedRequest::new(docs(pdfs)?, docs(files)?)).await
        }
        Command::WriteMetadata { pdfs, metadata } => {
            let value: serde_json::Value =
                serde_json::from_str(metadata).context("--metadata must be a JSON object")?;
            let req = WriteMetadataRequest::new(docs(pdfs)?).metadata(&value)?;
            store(&client, &cli, req).await
        }
        Command::ReadMetadata { pdfs } => {
            let req = apply_common(ReadMetadataRequest::new(docs(pdfs)?), &cli);
            let bar = spinner(cli.quiet, "reading metadata");
            let result = client.stream(req).await;
            if let Some(bar) = bar {
                bar.finish_and_clear();
            }
            let body = collect(result?).await?;
            match &cli.output {
                Some(path) => std::fs::write(path, &body)
                    .with_context(|| format!("Cannot write '{}'", path.display()))?,
                None => {
                    let mut out = io::stdout().lock();
                    out.write_all(&body)?;
                    writeln!(out)?;
                }
            }
            Ok(())
        }
    }
}
