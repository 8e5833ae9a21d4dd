//! OCR engine seam.
//!
//! An engine takes a page raster and returns a loosely-shaped JSON
//! value; the normalization boundary in `sandwich-core` is what gives
//! it a guaranteed shape. The default implementation shells out to the
//! `tesseract` binary in TSV mode.

use std::path::Path;
use std::process::Command;

use serde_json::{Value, json};
use thiserror::Error;

/// Error type for OCR invocations.
#[derive(Debug, Error)]
pub enum OcrError {
    /// The OCR backend is not installed.
    #[error("OCR engine not available: {0}")]
    NotAvailable(String),

    /// The backend ran but reported failure.
    #[error("OCR failed: {0}")]
    Failed(String),

    /// I/O error invoking the backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Recognizes text on a single page raster.
///
/// The returned value is intentionally untyped — engines disagree about
/// result shapes, and shapes drift between releases. Callers must pass
/// it through `sandwich_core::normalize_page` before use.
pub trait OcrEngine {
    /// Run recognition on the image at `image_path`.
    fn recognize(&self, image_path: &Path) -> Result<Value, OcrError>;

    /// Whether the backend can run on this machine.
    fn is_available(&self) -> bool {
        true
    }
}

/// OCR engine backed by the `tesseract` binary in TSV output mode.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    lang: String,
}

impl TesseractOcr {
    /// Create an engine for the given tesseract language code.
    pub fn new(lang: impl Into<String>) -> Self {
        Self { lang: lang.into() }
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, image_path: &Path) -> Result<Value, OcrError> {
        let output = Command::new("tesseract")
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.lang, "tsv"])
            .output();

        match output {
            Ok(output) if output.status.success() => {
                let tsv = String::from_utf8_lossy(&output.stdout);
                Ok(parse_tsv(&tsv))
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(OcrError::Failed(format!("tesseract failed: {stderr}")))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(OcrError::NotAvailable(
                "tesseract not found (install tesseract-ocr)".to_string(),
            )),
            Err(e) => Err(OcrError::Io(e)),
        }
    }

    fn is_available(&self) -> bool {
        which::which("tesseract").is_ok()
    }
}

/// Convert tesseract TSV output into the canonical loose word shape.
///
/// TSV columns: level, page_num, block_num, par_num, line_num,
/// word_num, left, top, width, height, conf, text. Words are level-5
/// rows; rows with negative confidence are layout artifacts, not words.
/// Tesseract reports one confidence per word, so only `rec_score` is
/// emitted; the normalization defaults cover the rest.
fn parse_tsv(tsv: &str) -> Value {
    let mut words = Vec::new();

    for line in tsv.lines().skip(1) {
        let cols: Vec<&str> = line.split('\t').collect();
        if cols.len() < 12 || cols[0] != "5" {
            continue;
        }

        let (Some(left), Some(top), Some(width), Some(height)) = (
            cols[6].parse::<f64>().ok(),
            cols[7].parse::<f64>().ok(),
            cols[8].parse::<f64>().ok(),
            cols[9].parse::<f64>().ok(),
        ) else {
            continue;
        };

        let conf: f64 = cols[10].parse().unwrap_or(-1.0);
        if conf < 0.0 {
            continue;
        }

        let content = cols[11];
        if content.trim().is_empty() {
            continue;
        }

        words.push(json!({
            "content": content,
            "points": [
                [left, top],
                [left + width, top],
                [left + width, top + height],
                [left, top + height],
            ],
            "rec_score": conf / 100.0,
        }));
    }

    json!({ "words": words })
}
