//! hOCR-style positional markup for inspection artifacts.
//!
//! One HTML document per page listing every usable word with its
//! resolved bounding box and recognition confidence. These files are
//! debugging aids written into the job's working directory; they are
//! not part of the output document.

use crate::geometry::PlacementBox;
use crate::word::PageWords;

/// Render the hOCR markup for one page. `page_number` is 1-indexed.
///
/// Words whose polygon cannot be resolved are omitted, matching the
/// placement planner's skip policy.
pub fn hocr_page(page: &PageWords, page_number: usize) -> String {
    let mut out = vec![
        "<!DOCTYPE html>".to_string(),
        "<html>".to_string(),
        "<head>".to_string(),
        "<meta charset=\"UTF-8\">".to_string(),
        format!("<title>hOCR output - Page {page_number}</title>"),
        "</head>".to_string(),
        "<body>".to_string(),
        format!("<div class=\"ocr_page\" id=\"page_{page_number}\">"),
    ];

    for (i, word) in page.words.iter().enumerate() {
        let Some(bbox) = PlacementBox::from_points(&word.points) else {
            continue;
        };
        let conf = (word.rec_score * 100.0) as i32;
        out.push(format!(
            "<span class=\"ocrx_word\" id=\"word_{}\" title=\"bbox {} {} {} {}; x_wconf {}\">{}</span>",
            i + 1,
            bbox.x_min,
            bbox.y_min,
            bbox.x_max,
            bbox.y_max,
            conf,
            escape(&word.content),
        ));
    }

    out.push("</div>".to_string());
    out.push("</body>".to_string());
    out.push("</html>".to_string());
    out.join("\n")
}

/// Minimal HTML escaping for text interpolated into markup.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
