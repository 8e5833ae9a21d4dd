//! The per-page job pipeline.
//!
//! Drives OCR page by page, persists inspection artifacts, composes the
//! output document, and cleans up the working directory no matter how
//! the run went. Per-page errors are recorded and skipped; only
//! failures that prevent producing any output at all are fatal.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use sandwich_compose::{ComposeError, DocumentAssembler, FontResource, PageArtifact};
use sandwich_core::hocr::hocr_page;
use sandwich_core::{PlacementOptions, TextPlacement, normalize_page, plan_page};
use tempfile::TempDir;
use thiserror::Error;
use tracing::{info, warn};

use crate::engine::OcrEngine;
use crate::pages::parse_page_range;
use crate::raster::{PageImage, RasterError, Rasterizer};

/// Options for a conversion job.
#[derive(Debug, Clone)]
pub struct JobOptions {
    /// Placement planning (font sizing, confidence floor).
    pub placement: PlacementOptions,
    /// Optional 1-indexed page selection, e.g. `"1,3-5"`.
    pub pages: Option<String>,
    /// Strict empty-page policy: drop pages with zero usable words
    /// instead of composing them with background only.
    pub skip_empty_pages: bool,
    /// Leave the working directory and its artifacts on disk.
    pub keep_artifacts: bool,
    /// Explicit working directory. Default: a unique temporary
    /// directory next to the output file. Must not be shared between
    /// concurrently running jobs.
    pub workdir: Option<PathBuf>,
    /// Font backing the invisible text layer.
    pub font: FontResource,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            placement: PlacementOptions::default(),
            pages: None,
            skip_empty_pages: false,
            keep_artifacts: false,
            workdir: None,
            font: FontResource::builtin(),
        }
    }
}

/// What went wrong with a single page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageFailureKind {
    /// The OCR call failed or returned an invalid result.
    Ocr,
    /// The page had no usable words under the strict empty-page policy.
    NoUsableWords,
    /// An intermediate artifact could not be written, or was empty
    /// after writing.
    ArtifactWrite,
    /// The page raster could not be read back.
    Raster,
    /// The page could not be drawn into the output document.
    Compose,
}

impl PageFailureKind {
    /// Short human-readable label.
    pub fn as_str(&self) -> &'static str {
        match self {
            PageFailureKind::Ocr => "OCR failure",
            PageFailureKind::NoUsableWords => "no usable words",
            PageFailureKind::ArtifactWrite => "artifact write failure",
            PageFailureKind::Raster => "raster failure",
            PageFailureKind::Compose => "compose failure",
        }
    }
}

impl fmt::Display for PageFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded, non-fatal page-level failure.
#[derive(Debug, Clone, PartialEq)]
pub struct PageFailure {
    /// 0-indexed page number.
    pub page: usize,
    /// Failure category.
    pub kind: PageFailureKind,
    /// Diagnostic detail.
    pub detail: String,
}

impl PageFailure {
    fn new(page: usize, kind: PageFailureKind, detail: impl Into<String>) -> Self {
        Self {
            page,
            kind,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for PageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page {}: {}: {}", self.page + 1, self.kind, self.detail)
    }
}

/// Outcome of a completed job.
#[derive(Debug, Clone)]
pub struct JobReport {
    /// Pages the job attempted to process.
    pub pages_total: usize,
    /// Pages present in the output document.
    pub pages_written: usize,
    /// Per-page failures, in page order.
    pub failures: Vec<PageFailure>,
    /// Error from working-directory cleanup, if any. Cleanup problems
    /// never invalidate the output document.
    pub cleanup_error: Option<String>,
}

impl JobReport {
    /// True when every page was written and cleanup succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.cleanup_error.is_none()
    }
}

/// Fatal error: no output document could be produced.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("invalid page selection: {0}")]
    PageSelection(String),

    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error("no pages could be processed")]
    NoPages,

    #[error("failed to compose output document: {0}")]
    Compose(#[from] ComposeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convert `input` into a searchable PDF at `output`.
///
/// The working directory is created up front, owned exclusively by this
/// job, and removed when the job ends — success or failure — unless
/// `keep_artifacts` is set. The output file is written via a temporary
/// sibling and renamed into place, so a failed job never leaves a
/// half-written document behind.
pub fn run_job(
    input: &Path,
    output: &Path,
    options: &JobOptions,
    rasterizer: &dyn Rasterizer,
    engine: &dyn OcrEngine,
) -> Result<JobReport, JobError> {
    if !input.exists() {
        return Err(JobError::InputNotFound(input.to_path_buf()));
    }

    let workdir = Workdir::create(options, output)?;
    let result = process(input, output, options, rasterizer, engine, workdir.path());

    let cleanup_error = workdir.cleanup(options.keep_artifacts);
    if let Some(ref e) = cleanup_error {
        warn!("working directory cleanup failed: {e}");
    }

    let mut report = result?;
    report.cleanup_error = cleanup_error;
    Ok(report)
}

fn process(
    input: &Path,
    output: &Path,
    options: &JobOptions,
    rasterizer: &dyn Rasterizer,
    engine: &dyn OcrEngine,
    workdir: &Path,
) -> Result<JobReport, JobError> {
    let images = rasterizer.rasterize(input, workdir)?;

    let selected: Vec<PageImage> = match &options.pages {
        Some(expr) => {
            let wanted = parse_page_range(expr, images.len()).map_err(JobError::PageSelection)?;
            wanted
                .into_iter()
                .filter_map(|i| images.get(i).cloned())
                .collect()
        }
        None => images,
    };

    let mut failures = Vec::new();
    let mut prepared = Vec::new();
    for image in &selected {
        match prepare_page(image, workdir, engine, options) {
            Ok(page) => {
                info!(page = page.index + 1, words = page.placements.len(), "page processed");
                prepared.push(page);
            }
            Err(failure) => {
                warn!("{failure}");
                failures.push(failure);
            }
        }
    }

    if prepared.is_empty() {
        return Err(JobError::NoPages);
    }

    let mut assembler = DocumentAssembler::new(options.font.clone());
    for page in &prepared {
        if let Err(e) = assembler.add_page(&page.artifact, &page.placements) {
            let failure = PageFailure::new(page.index, PageFailureKind::Compose, e.to_string());
            warn!("{failure}");
            failures.push(failure);
        }
    }

    if assembler.page_count() == 0 {
        return Err(JobError::NoPages);
    }

    let pages_written = assembler.page_count();
    let bytes = assembler.finish()?;

    let staging = output.with_extension("tmp");
    fs::write(&staging, &bytes)?;
    fs::rename(&staging, output)?;

    Ok(JobReport {
        pages_total: selected.len(),
        pages_written,
        failures,
        cleanup_error: None,
    })
}

struct PreparedPage {
    index: usize,
    artifact: PageArtifact,
    placements: Vec<TextPlacement>,
}

fn prepare_page(
    image: &PageImage,
    workdir: &Path,
    engine: &dyn OcrEngine,
    options: &JobOptions,
) -> Result<PreparedPage, PageFailure> {
    let page = image.index;

    let raw = engine
        .recognize(&image.path)
        .map_err(|e| PageFailure::new(page, PageFailureKind::Ocr, e.to_string()))?;
    let words = normalize_page(&raw);

    let words_json = serde_json::to_string_pretty(&words)
        .map_err(|e| PageFailure::new(page, PageFailureKind::ArtifactWrite, e.to_string()))?;
    write_artifact(
        workdir.join(format!("words_{:04}.json", page + 1)),
        words_json.as_bytes(),
    )
    .map_err(|e| PageFailure::new(page, PageFailureKind::ArtifactWrite, e))?;

    let hocr = hocr_page(&words, page + 1);
    write_artifact(
        workdir.join(format!("page_{:04}.hocr", page + 1)),
        hocr.as_bytes(),
    )
    .map_err(|e| PageFailure::new(page, PageFailureKind::ArtifactWrite, e))?;

    let raster = fs::read(&image.path)
        .map_err(|e| PageFailure::new(page, PageFailureKind::Raster, e.to_string()))?;
    if raster.is_empty() {
        return Err(PageFailure::new(
            page,
            PageFailureKind::Raster,
            "page image file is empty",
        ));
    }

    if options.skip_empty_pages && words.usable_count() == 0 {
        return Err(PageFailure::new(
            page,
            PageFailureKind::NoUsableWords,
            format!("no usable words among {} records", words.len()),
        ));
    }

    let placements = plan_page(&words, f64::from(image.height), &options.placement);

    Ok(PreparedPage {
        index: page,
        artifact: PageArtifact {
            raster,
            width: image.width,
            height: image.height,
        },
        placements,
    })
}

/// Write an artifact and confirm it landed non-empty on disk.
fn write_artifact(path: PathBuf, bytes: &[u8]) -> Result<(), String> {
    fs::write(&path, bytes).map_err(|e| format!("failed to write {}: {e}", path.display()))?;
    let len = fs::metadata(&path)
        .map_err(|e| format!("failed to stat {}: {e}", path.display()))?
        .len();
    if len == 0 {
        return Err(format!("artifact {} is empty after writing", path.display()));
    }
    Ok(())
}

/// The job's working directory: created before the first page, removed
/// after the last, whatever happened in between.
struct Workdir {
    root: PathBuf,
    temp: Option<TempDir>,
}

impl Workdir {
    fn create(options: &JobOptions, output: &Path) -> Result<Self, JobError> {
        match &options.workdir {
            Some(dir) => {
                fs::create_dir_all(dir)?;
                Ok(Self {
                    root: dir.clone(),
                    temp: None,
                })
            }
            None => {
                let parent = output
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from("."));
                let temp = tempfile::Builder::new()
                    .prefix(".sandwich-")
                    .tempdir_in(parent)?;
                Ok(Self {
                    root: temp.path().to_path_buf(),
                    temp: Some(temp),
                })
            }
        }
    }

    fn path(&self) -> &Path {
        &self.root
    }

    fn cleanup(self, keep_artifacts: bool) -> Option<String> {
        if keep_artifacts {
            if let Some(temp) = self.temp {
                let _kept = temp.keep();
            }
            return None;
        }
        match self.temp {
            Some(temp) => temp.close().err().map(|e| e.to_string()),
            None => fs::remove_dir_all(&self.root).err().map(|e| e.to_string()),
        }
    }
}
