//! Page rasterization seam.
//!
//! The source PDF is turned into one raster image per page before any
//! OCR runs. The default implementation shells out to poppler's
//! `pdftoppm`; anything that can produce ordered page images with known
//! pixel dimensions can stand in for it.

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

/// Error type for page rasterization.
#[derive(Debug, Error)]
pub enum RasterError {
    /// The rasterization backend is not installed.
    #[error("rasterizer not available: {0}")]
    NotAvailable(String),

    /// The backend ran but failed or produced nothing.
    #[error("rasterization failed: {0}")]
    Failed(String),

    /// I/O error invoking the backend or reading its output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The raster image of one source page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageImage {
    /// 0-indexed page number in the source document.
    pub index: usize,
    /// Path of the image file on disk.
    pub path: PathBuf,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Converts a PDF into ordered page raster images.
pub trait Rasterizer {
    /// Rasterize every page of `pdf` into `out_dir`, returning the
    /// images in page order.
    fn rasterize(&self, pdf: &Path, out_dir: &Path) -> Result<Vec<PageImage>, RasterError>;

    /// Whether the backend can run on this machine.
    fn is_available(&self) -> bool {
        true
    }
}

/// Rasterizer backed by poppler's `pdftoppm` binary.
#[derive(Debug, Clone)]
pub struct PopplerRasterizer {
    dpi: u32,
}

impl PopplerRasterizer {
    /// Create a rasterizer rendering at the given resolution.
    pub fn new(dpi: u32) -> Self {
        Self { dpi }
    }
}

impl Rasterizer for PopplerRasterizer {
    fn rasterize(&self, pdf: &Path, out_dir: &Path) -> Result<Vec<PageImage>, RasterError> {
        let prefix = out_dir.join("page");

        let status = Command::new("pdftoppm")
            .args(["-png", "-r", &self.dpi.to_string()])
            .arg(pdf)
            .arg(&prefix)
            .status();

        match status {
            Ok(s) if s.success() => collect_page_images(out_dir),
            Ok(_) => Err(RasterError::Failed(
                "pdftoppm could not convert the document".to_string(),
            )),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(RasterError::NotAvailable(
                "pdftoppm not found (install poppler-utils)".to_string(),
            )),
            Err(e) => Err(RasterError::Io(e)),
        }
    }

    fn is_available(&self) -> bool {
        which::which("pdftoppm").is_ok()
    }
}

/// Gather `page-NNN.png` files produced by pdftoppm, in page order.
fn collect_page_images(out_dir: &Path) -> Result<Vec<PageImage>, RasterError> {
    let mut numbered: Vec<(usize, PathBuf)> = Vec::new();

    for entry in std::fs::read_dir(out_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(number) = name
            .strip_prefix("page-")
            .and_then(|rest| rest.strip_suffix(".png"))
            .and_then(|digits| digits.parse::<usize>().ok())
        else {
            continue;
        };
        numbered.push((number, path));
    }

    if numbered.is_empty() {
        return Err(RasterError::Failed(
            "pdftoppm produced no page images".to_string(),
        ));
    }

    numbered.sort_by_key(|(number, _)| *number);

    let mut images = Vec::with_capacity(numbered.len());
    for (number, path) in numbered {
        let (width, height) = image::image_dimensions(&path)
            .map_err(|e| RasterError::Failed(format!("unreadable page image {number}: {e}")))?;
        images.push(PageImage {
            index: number - 1,
            path,
            width,
            height,
        });
    }
    Ok(images)
}
