//! sandwich: scanned PDF in, searchable PDF out.
//!
//! The visible content of every output page is the source page raster;
//! underneath it sits an invisible text layer positioned so that
//! selection, copy, and search line up with the printed words.
//!
//! The heavy collaborators are behind seams: [`Rasterizer`] turns the
//! source PDF into page images (default: poppler's `pdftoppm`) and
//! [`OcrEngine`] turns a page image into recognized words (default:
//! `tesseract`). [`run_job`] drives the per-page pipeline with strict
//! page isolation — no single page's failure aborts the run — and
//! cleans up every intermediate artifact regardless of outcome.
//!
//! ```no_run
//! use std::path::Path;
//! use sandwich::{JobOptions, PopplerRasterizer, TesseractOcr, run_job};
//!
//! let rasterizer = PopplerRasterizer::new(300);
//! let engine = TesseractOcr::new("eng");
//! let report = run_job(
//!     Path::new("scanned.pdf"),
//!     Path::new("searchable.pdf"),
//!     &JobOptions::default(),
//!     &rasterizer,
//!     &engine,
//! )?;
//! println!("{} of {} pages written", report.pages_written, report.pages_total);
//! # Ok::<(), sandwich::JobError>(())
//! ```

pub mod engine;
pub mod job;
pub mod pages;
pub mod raster;

pub use engine::{OcrEngine, OcrError, TesseractOcr};
pub use job::{JobError, JobOptions, JobReport, PageFailure, PageFailureKind, run_job};
pub use pages::parse_page_range;
pub use raster::{PageImage, PopplerRasterizer, RasterError, Rasterizer};

pub use sandwich_compose::FontResource;
pub use sandwich_core::{FontSizing, PlacementOptions};
