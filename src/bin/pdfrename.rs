//! CLI binary for pdf-student-rename.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `RenameConfig`, shows progress and turns the batch status into the
//! process exit code.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf_student_rename::pipeline::input::list_documents;
use pdf_student_rename::{
    planned_targets, rename_directory, BatchProgressCallback, BatchStatus, BatchTally,
    DocumentOutcome, DocumentStatus, OcrEngine, ProgressCallback, RenameConfig, SpellingFixes,
};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: one bar for the batch plus a log line per document.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS),
        );
        bar.set_prefix("Scanning");
        bar.set_message("Listing documents…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Renaming");
        self.bar.reset_eta();
        if total > 0 {
            self.bar.println(format!(
                "{} {}",
                cyan("◆"),
                bold(&format!("Found {total} documents"))
            ));
        }
    }

    fn on_document_start(&self, _index: usize, _total: usize, source: &Path) {
        self.bar.set_message(file_name(source));
    }

    fn on_document_complete(&self, index: usize, total: usize, outcome: &DocumentOutcome) {
        let src = file_name(&outcome.source);
        let line = match &outcome.status {
            DocumentStatus::Renamed { target, dry_run } => format!(
                "  {} [{:>3}/{:<3}] {}  →  {}{}",
                green("✓"),
                index,
                total,
                src,
                bold(&file_name(target)),
                if *dry_run { dim("  (dry run)") } else { String::new() },
            ),
            DocumentStatus::AlreadyNamed => format!(
                "  {} [{:>3}/{:<3}] {}  {}",
                green("✓"),
                index,
                total,
                src,
                dim("already named"),
            ),
            DocumentStatus::Failed { error } => format!(
                "  {} [{:>3}/{:<3}] {}  {}",
                red("✗"),
                index,
                total,
                src,
                red(&error.to_string()),
            ),
        };
        self.bar.println(line);
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, _tally: &BatchTally) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Rename every PDF in a folder
  pdfrename ~/scans

  # See what would happen without touching anything
  pdfrename --dry-run ~/scans

  # Keep page images and transcripts next to each PDF for debugging
  pdfrename --keep-artifacts ~/scans

  # Use a vision model instead of tesseract
  pdfrename --engine vision --provider openai --model gpt-4.1-mini ~/scans

  # A different form layout
  pdfrename --pattern '(?i)aluno:\s*(.+?)\s+turma' ~/scans

SPELLING FIXES FILE (--fixes):
  One WRONG=RIGHT rule per line, applied in order after the built-in table.
  Both sides may contain only letters and spaces.
  Lines starting with # are ignored.

EXIT STATUS:
  0  at least one document was found (whether or not it could be renamed)
  1  no matching documents in the folder, or a fatal error

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key (vision engine)
  EDGEQUAKE_LLM_PROVIDER  Override provider for the vision engine
  EDGEQUAKE_MODEL         Override model for the vision engine
  PDFIUM_LIB_PATH         Path to an existing libpdfium — skips auto-download
  RUST_LOG                Fine-grained log filter (overrides -v / -q)
"#;

/// Rename scanned PDFs after the student named on their first page.
#[derive(Parser, Debug)]
#[command(
    name = "pdfrename",
    version,
    about = "Rename scanned PDFs after the student named on their first page",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Folder containing the scanned documents.
    directory: PathBuf,

    /// Extension of the documents to process (case-insensitive).
    #[arg(long, env = "PDFRENAME_EXTENSION", default_value = "pdf")]
    extension: String,

    /// Transcription engine.
    #[arg(long, env = "PDFRENAME_ENGINE", value_enum, default_value = "tesseract")]
    engine: EngineArg,

    /// Tesseract language code(s).
    #[arg(long, env = "PDFRENAME_LANG", default_value = "por")]
    lang: String,

    /// Path to the tesseract binary.
    #[arg(long, env = "TESSERACT_PATH", default_value = "tesseract")]
    tesseract_path: PathBuf,

    /// Rendering DPI for the first page (72–600).
    #[arg(long, env = "PDFRENAME_DPI", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// PDF user password for encrypted scans.
    #[arg(long, env = "PDFRENAME_PASSWORD")]
    password: Option<String>,

    /// Name-extraction regex; the first capture group is the name.
    #[arg(long, env = "PDFRENAME_PATTERN")]
    pattern: Option<String>,

    /// File of extra WRONG=RIGHT spelling fixes.
    #[arg(long, env = "PDFRENAME_FIXES")]
    fixes: Option<PathBuf>,

    /// Vision provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// Vision model ID.
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// Report what would be renamed without renaming anything.
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Write <name>.jpg and <name>.txt next to each document.
    #[arg(long, env = "PDFRENAME_KEEP_ARTIFACTS")]
    keep_artifacts: bool,

    /// Print the batch report as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDFRENAME_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFRENAME_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFRENAME_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum EngineArg {
    Tesseract,
    Vision,
}

impl From<EngineArg> for OcrEngine {
    fn from(v: EngineArg) -> Self {
        match v {
            EngineArg::Tesseract => OcrEngine::Tesseract,
            EngineArg::Vision => OcrEngine::Vision,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", red("error:"), e);
            ExitCode::from(1)
        }
    }
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar already shows per-document results, so library INFO
    // logs are only useful when it is off.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let mut config = build_config(&cli)?;

    // ── Ensure PDFium engine is available ───────────────────────────────────
    // Only needed when there is something to render; an empty folder must
    // report "no documents" even offline.
    let pending = list_documents(&cli.directory, &config.extension)
        .await
        .context("Batch rename failed")?;
    if !pending.is_empty() {
        #[cfg(feature = "bundled")]
        {
            tokio::task::block_in_place(|| pdfium_auto::ensure_pdfium_bundled())
                .context("Failed to extract bundled PDFium engine")?;
        }

        #[cfg(not(feature = "bundled"))]
        ensure_pdfium(cli.quiet)?;
    }

    // ── Run ──────────────────────────────────────────────────────────────
    if show_progress {
        config.progress_callback = Some(CliProgressCallback::new() as ProgressCallback);
    }
    let report = rename_directory(&cli.directory, &config)
        .await
        .context("Batch rename failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else if !cli.quiet {
        if !show_progress {
            for (from, to) in planned_targets(&report) {
                eprintln!("{} → {}", from.display(), to.display());
            }
            for failed in report.failures() {
                if let Some(err) = failed.error() {
                    eprintln!("{}: {}", failed.source.display(), err);
                }
            }
        }
        print_summary(&report.directory, &report.tally, report.status(), cli.dry_run);
    }

    Ok(ExitCode::from(report.status().exit_code() as u8))
}

fn print_summary(dir: &Path, tally: &BatchTally, status: BatchStatus, dry_run: bool) {
    if status == BatchStatus::NoDocuments {
        eprintln!(
            "{} No matching documents found in '{}'",
            red("✘"),
            dir.display()
        );
        return;
    }

    eprintln!();
    eprintln!("--- Summary ---");
    eprintln!(
        "{} {} succeeded  {}",
        if tally.failed == 0 { green("✔") } else { cyan("⚠") },
        bold(&tally.succeeded.to_string()),
        dim(&format!(
            "({} {}, {} already named)",
            tally.renamed,
            if dry_run { "would be renamed" } else { "renamed" },
            tally.already_named
        )),
    );
    eprintln!(
        "{} {} failed",
        if tally.failed == 0 { dim("·") } else { red("✗") },
        bold(&tally.failed.to_string())
    );
    eprintln!("---------------");
}

#[cfg(not(feature = "bundled"))]
fn ensure_pdfium(quiet: bool) -> Result<()> {
    if pdfium_auto::is_pdfium_cached() {
        return Ok(());
    }
    if quiet {
        tokio::task::block_in_place(|| pdfium_auto::ensure_pdfium_library(None))
            .context("Failed to download PDFium engine")?;
        return Ok(());
    }

    let dl_bar = ProgressBar::new(0);
    dl_bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {bytes}/{total_bytes}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS),
    );
    dl_bar.set_prefix("PDF engine");
    dl_bar.enable_steady_tick(Duration::from_millis(80));

    let bar = dl_bar.clone();
    tokio::task::block_in_place(|| {
        pdfium_auto::ensure_pdfium_library(Some(&|downloaded, total| {
            if let Some(t) = total {
                if bar.length().unwrap_or(0) != t {
                    bar.set_length(t);
                }
            }
            bar.set_position(downloaded);
        }))
    })
    .context("Failed to download PDFium engine")?;

    dl_bar.finish_with_message("ready ✓");
    Ok(())
}

/// Map CLI args to `RenameConfig`.
fn build_config(cli: &Cli) -> Result<RenameConfig> {
    let mut fixes = SpellingFixes::default();
    if let Some(ref path) = cli.fixes {
        let extra = SpellingFixes::from_file(path)
            .with_context(|| format!("Failed to load spelling fixes from {:?}", path))?;
        fixes.extend(extra);
    }

    let mut builder = RenameConfig::builder()
        .extension(cli.extension.as_str())
        .engine(cli.engine.clone().into())
        .language(cli.lang.as_str())
        .tesseract_path(cli.tesseract_path.clone())
        .dpi(cli.dpi)
        .spelling_fixes(fixes)
        .dry_run(cli.dry_run)
        .keep_artifacts(cli.keep_artifacts);

    if let Some(ref pattern) = cli.pattern {
        builder = builder.pattern(pattern.as_str());
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.as_str());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.as_str());
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model.as_str());
    }

    builder.build().context("Invalid configuration")
}
