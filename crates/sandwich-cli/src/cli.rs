use std::path::PathBuf;

use clap::Parser;

/// Convert a scanned PDF into a searchable PDF.
///
/// The output keeps every page's original raster and adds an invisible
/// text layer aligned with the printed words, so selection, copy, and
/// search work as on a born-digital document.
#[derive(Debug, Parser)]
#[command(name = "sandwich", about, version)]
pub struct Cli {
    /// Path to the scanned input PDF
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Path of the searchable output PDF
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// OCR language passed to tesseract
    #[arg(long, default_value = "eng")]
    pub lang: String,

    /// Rasterization resolution in DPI
    #[arg(long, default_value_t = 300)]
    pub dpi: u32,

    /// Page selection (e.g. '1,3-5'). Default: all pages
    #[arg(long)]
    pub pages: Option<String>,

    /// TrueType font to embed for the text layer.
    /// Default: built-in Helvetica (WinAnsi coverage only)
    #[arg(long, value_name = "TTF")]
    pub font: Option<PathBuf>,

    /// Smallest font size used for placed words
    #[arg(long, default_value_t = 6.0)]
    pub min_font_size: f64,

    /// Largest font size used for placed words
    #[arg(long, default_value_t = 32.0)]
    pub max_font_size: f64,

    /// Drop words with a recognition score below this (0-1)
    #[arg(long, default_value_t = 0.0)]
    pub min_confidence: f64,

    /// Skip pages with no recognized words instead of including
    /// them with background only
    #[arg(long)]
    pub skip_empty_pages: bool,

    /// Keep the working directory and intermediate artifacts
    #[arg(long)]
    pub keep_artifacts: bool,

    /// Working directory for intermediate artifacts.
    /// Default: a unique temporary directory next to OUTPUT
    #[arg(long, value_name = "DIR")]
    pub workdir: Option<PathBuf>,
}
