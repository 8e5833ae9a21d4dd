//! End-to-end pipeline tests with scripted collaborators.
//!
//! The rasterizer and OCR engine are replaced by in-process stubs so
//! the page-isolation, artifact-lifecycle, and policy behavior can be
//! exercised without poppler or tesseract installed.

use std::fs;
use std::path::{Path, PathBuf};

use sandwich::{
    JobError, JobOptions, OcrEngine, OcrError, PageFailureKind, PageImage, RasterError,
    Rasterizer, run_job,
};
use serde_json::{Value, json};

/// Rasterizer stub: emits one white PNG per configured page size.
struct StubRasterizer {
    sizes: Vec<(u32, u32)>,
}

impl Rasterizer for StubRasterizer {
    fn rasterize(&self, _pdf: &Path, out_dir: &Path) -> Result<Vec<PageImage>, RasterError> {
        let mut images = Vec::new();
        for (i, &(width, height)) in self.sizes.iter().enumerate() {
            let path = out_dir.join(format!("page-{}.png", i + 1));
            let img = image::RgbImage::from_pixel(width, height, image::Rgb([255, 255, 255]));
            img.save(&path)
                .map_err(|e| RasterError::Failed(e.to_string()))?;
            images.push(PageImage {
                index: i,
                path,
                width,
                height,
            });
        }
        Ok(images)
    }
}

/// OCR stub scripted per 1-indexed page number (taken from the image
/// file name).
struct ScriptedOcr {
    fail_on: Vec<usize>,
    empty_on: Vec<usize>,
}

impl ScriptedOcr {
    fn normal() -> Self {
        Self {
            fail_on: Vec::new(),
            empty_on: Vec::new(),
        }
    }
}

fn page_number(image_path: &Path) -> usize {
    image_path
        .file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| s.strip_prefix("page-"))
        .and_then(|s| s.parse().ok())
        .unwrap()
}

impl OcrEngine for ScriptedOcr {
    fn recognize(&self, image_path: &Path) -> Result<Value, OcrError> {
        let n = page_number(image_path);
        if self.fail_on.contains(&n) {
            return Err(OcrError::Failed(format!("scripted failure on page {n}")));
        }
        if self.empty_on.contains(&n) {
            return Ok(json!({ "words": [] }));
        }
        Ok(json!({
            "words": [{
                "content": format!("word{n}"),
                "points": [[10, 10], [60, 10], [60, 30], [10, 30]],
                "rec_score": 0.9
            }]
        }))
    }
}

/// A workspace holding a dummy input file and an output path.
struct Workspace {
    dir: tempfile::TempDir,
    input: PathBuf,
    output: PathBuf,
}

fn workspace() -> Workspace {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("scan.pdf");
    // The stubs never parse the input; it just has to exist.
    fs::write(&input, b"%PDF-1.5 stub").unwrap();
    let output = dir.path().join("searchable.pdf");
    Workspace { dir, input, output }
}

fn output_page_dims(bytes: &[u8]) -> Vec<(f32, f32)> {
    let doc = lopdf::Document::load_mem(bytes).unwrap();
    let pages = doc.get_pages();
    let mut dims = Vec::new();
    for (_, page_id) in pages {
        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
        let values: Vec<f32> = media_box
            .iter()
            .map(|obj| match obj {
                lopdf::Object::Integer(i) => *i as f32,
                lopdf::Object::Real(r) => *r,
                other => panic!("non-numeric object: {other:?}"),
            })
            .collect();
        dims.push((values[2], values[3]));
    }
    dims
}

#[test]
fn three_page_job_writes_three_pages() {
    let ws = workspace();
    let rasterizer = StubRasterizer {
        sizes: vec![(100, 100), (110, 110), (120, 120)],
    };
    let report = run_job(
        &ws.input,
        &ws.output,
        &JobOptions::default(),
        &rasterizer,
        &ScriptedOcr::normal(),
    )
    .unwrap();

    assert_eq!(report.pages_total, 3);
    assert_eq!(report.pages_written, 3);
    assert!(report.is_clean());

    let bytes = fs::read(&ws.output).unwrap();
    assert_eq!(output_page_dims(&bytes).len(), 3);
}

#[test]
fn failing_page_is_isolated_and_order_preserved() {
    let ws = workspace();
    let rasterizer = StubRasterizer {
        sizes: vec![(100, 100), (110, 110), (120, 120)],
    };
    let engine = ScriptedOcr {
        fail_on: vec![2],
        empty_on: Vec::new(),
    };
    let report = run_job(
        &ws.input,
        &ws.output,
        &JobOptions::default(),
        &rasterizer,
        &engine,
    )
    .unwrap();

    assert_eq!(report.pages_total, 3);
    assert_eq!(report.pages_written, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].page, 1);
    assert_eq!(report.failures[0].kind, PageFailureKind::Ocr);

    // No placeholder page: pages 1 and 3 survive, in order.
    let bytes = fs::read(&ws.output).unwrap();
    let dims = output_page_dims(&bytes);
    assert_eq!(dims, vec![(100.0, 100.0), (120.0, 120.0)]);
}

#[test]
fn empty_page_is_included_with_background_only_by_default() {
    let ws = workspace();
    let rasterizer = StubRasterizer {
        sizes: vec![(90, 90)],
    };
    let engine = ScriptedOcr {
        fail_on: Vec::new(),
        empty_on: vec![1],
    };
    let report = run_job(
        &ws.input,
        &ws.output,
        &JobOptions::default(),
        &rasterizer,
        &engine,
    )
    .unwrap();

    assert_eq!(report.pages_written, 1);
    assert!(report.is_clean());

    let bytes = fs::read(&ws.output).unwrap();
    let doc = lopdf::Document::load_mem(&bytes).unwrap();
    let pages = doc.get_pages();
    let content = doc.get_page_content(pages[&1]).unwrap();
    let content_str = String::from_utf8_lossy(&content);
    assert!(!content_str.contains("BT"));
}

#[test]
fn strict_policy_drops_empty_pages() {
    let ws = workspace();
    let rasterizer = StubRasterizer {
        sizes: vec![(90, 90), (95, 95)],
    };
    let engine = ScriptedOcr {
        fail_on: Vec::new(),
        empty_on: vec![1],
    };
    let options = JobOptions {
        skip_empty_pages: true,
        ..JobOptions::default()
    };
    let report = run_job(&ws.input, &ws.output, &options, &rasterizer, &engine).unwrap();

    assert_eq!(report.pages_written, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].kind, PageFailureKind::NoUsableWords);

    let bytes = fs::read(&ws.output).unwrap();
    assert_eq!(output_page_dims(&bytes), vec![(95.0, 95.0)]);
}

#[test]
fn all_pages_failing_is_fatal() {
    let ws = workspace();
    let rasterizer = StubRasterizer {
        sizes: vec![(90, 90), (95, 95)],
    };
    let engine = ScriptedOcr {
        fail_on: vec![1, 2],
        empty_on: Vec::new(),
    };
    let err = run_job(
        &ws.input,
        &ws.output,
        &JobOptions::default(),
        &rasterizer,
        &engine,
    )
    .unwrap_err();

    assert!(matches!(err, JobError::NoPages));
    assert!(!ws.output.exists());
}

#[test]
fn missing_input_is_reported() {
    let ws = workspace();
    let missing = ws.dir.path().join("nope.pdf");
    let err = run_job(
        &missing,
        &ws.output,
        &JobOptions::default(),
        &StubRasterizer {
            sizes: vec![(10, 10)],
        },
        &ScriptedOcr::normal(),
    )
    .unwrap_err();

    assert!(matches!(err, JobError::InputNotFound(_)));
}

#[test]
fn working_directory_is_removed_after_success() {
    let ws = workspace();
    let rasterizer = StubRasterizer {
        sizes: vec![(50, 50)],
    };
    run_job(
        &ws.input,
        &ws.output,
        &JobOptions::default(),
        &rasterizer,
        &ScriptedOcr::normal(),
    )
    .unwrap();

    let leftovers: Vec<String> = fs::read_dir(ws.dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(".sandwich-"))
        .collect();
    assert!(leftovers.is_empty(), "workdir left behind: {leftovers:?}");
}

#[test]
fn working_directory_is_removed_after_failure() {
    let ws = workspace();
    let rasterizer = StubRasterizer {
        sizes: vec![(50, 50)],
    };
    let engine = ScriptedOcr {
        fail_on: vec![1],
        empty_on: Vec::new(),
    };
    let _ = run_job(
        &ws.input,
        &ws.output,
        &JobOptions::default(),
        &rasterizer,
        &engine,
    );

    let leftovers: Vec<String> = fs::read_dir(ws.dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(".sandwich-"))
        .collect();
    assert!(leftovers.is_empty(), "workdir left behind: {leftovers:?}");
}

#[test]
fn keep_artifacts_retains_word_and_hocr_files() {
    let ws = workspace();
    let workdir = ws.dir.path().join("work");
    let options = JobOptions {
        keep_artifacts: true,
        workdir: Some(workdir.clone()),
        ..JobOptions::default()
    };
    run_job(
        &ws.input,
        &ws.output,
        &options,
        &StubRasterizer {
            sizes: vec![(50, 50)],
        },
        &ScriptedOcr::normal(),
    )
    .unwrap();

    assert!(workdir.join("words_0001.json").exists());
    assert!(workdir.join("page_0001.hocr").exists());
    assert!(workdir.join("page-1.png").exists());
}

#[test]
fn explicit_workdir_is_removed_without_keep_flag() {
    let ws = workspace();
    let workdir = ws.dir.path().join("work");
    let options = JobOptions {
        workdir: Some(workdir.clone()),
        ..JobOptions::default()
    };
    run_job(
        &ws.input,
        &ws.output,
        &options,
        &StubRasterizer {
            sizes: vec![(50, 50)],
        },
        &ScriptedOcr::normal(),
    )
    .unwrap();

    assert!(!workdir.exists());
}

#[test]
fn word_artifact_uses_canonical_fields() {
    let ws = workspace();
    let workdir = ws.dir.path().join("work");
    let options = JobOptions {
        keep_artifacts: true,
        workdir: Some(workdir.clone()),
        ..JobOptions::default()
    };
    run_job(
        &ws.input,
        &ws.output,
        &options,
        &StubRasterizer {
            sizes: vec![(50, 50)],
        },
        &ScriptedOcr::normal(),
    )
    .unwrap();

    let json: Value =
        serde_json::from_str(&fs::read_to_string(workdir.join("words_0001.json")).unwrap())
            .unwrap();
    let word = &json["words"][0];
    assert_eq!(word["content"], "word1");
    assert_eq!(word["points"].as_array().unwrap().len(), 4);
    assert!(word["rec_score"].is_number());
    assert!(word["det_score"].is_number());
    assert!(word["direction"].is_string());
}

#[test]
fn page_selection_limits_output() {
    let ws = workspace();
    let rasterizer = StubRasterizer {
        sizes: vec![(100, 100), (110, 110), (120, 120)],
    };
    let options = JobOptions {
        pages: Some("2".to_string()),
        ..JobOptions::default()
    };
    let report = run_job(
        &ws.input,
        &ws.output,
        &options,
        &rasterizer,
        &ScriptedOcr::normal(),
    )
    .unwrap();

    assert_eq!(report.pages_total, 1);
    let bytes = fs::read(&ws.output).unwrap();
    assert_eq!(output_page_dims(&bytes), vec![(110.0, 110.0)]);
}

#[test]
fn invalid_page_selection_is_fatal() {
    let ws = workspace();
    let options = JobOptions {
        pages: Some("0".to_string()),
        ..JobOptions::default()
    };
    let err = run_job(
        &ws.input,
        &ws.output,
        &options,
        &StubRasterizer {
            sizes: vec![(50, 50)],
        },
        &ScriptedOcr::normal(),
    )
    .unwrap_err();

    assert!(matches!(err, JobError::PageSelection(_)));
}

#[test]
fn rerun_produces_identical_documents() {
    let ws = workspace();
    let rasterizer = StubRasterizer {
        sizes: vec![(100, 100), (110, 110)],
    };

    run_job(
        &ws.input,
        &ws.output,
        &JobOptions::default(),
        &rasterizer,
        &ScriptedOcr::normal(),
    )
    .unwrap();
    let first = fs::read(&ws.output).unwrap();

    run_job(
        &ws.input,
        &ws.output,
        &JobOptions::default(),
        &rasterizer,
        &ScriptedOcr::normal(),
    )
    .unwrap();
    let second = fs::read(&ws.output).unwrap();

    assert_eq!(first, second);
}

#[test]
fn text_layer_contains_recognized_words() {
    let ws = workspace();
    run_job(
        &ws.input,
        &ws.output,
        &JobOptions::default(),
        &StubRasterizer {
            sizes: vec![(100, 100)],
        },
        &ScriptedOcr::normal(),
    )
    .unwrap();

    let bytes = fs::read(&ws.output).unwrap();
    let doc = lopdf::Document::load_mem(&bytes).unwrap();
    let pages = doc.get_pages();
    let content = doc.get_page_content(pages[&1]).unwrap();
    let content_str = String::from_utf8_lossy(&content);

    assert!(content_str.contains("3 Tr"));
    assert!(content_str.contains("word1"));
    // anchor: x_min = 10, y = 100 - 30 = 70
    assert!(content_str.contains("10 70 Tm"));
}
