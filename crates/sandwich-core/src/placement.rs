//! Placement planning: from normalized word records to page-space draw
//! positions.

use crate::geometry::{FontSizing, PlacementBox};
use crate::word::PageWords;

/// A single word ready to be drawn into the invisible text layer.
///
/// `x`/`y` are in page space (bottom-left origin, 1 pixel = 1 point).
#[derive(Debug, Clone, PartialEq)]
pub struct TextPlacement {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
}

/// Options for placement planning.
#[derive(Debug, Clone)]
pub struct PlacementOptions {
    /// Font size clamping policy.
    pub sizing: FontSizing,
    /// Words with `rec_score` below this are left out of the text layer.
    pub min_confidence: f64,
}

impl Default for PlacementOptions {
    fn default() -> Self {
        Self {
            sizing: FontSizing::default(),
            min_confidence: 0.0,
        }
    }
}

/// Compute placements for every usable word on a page of pixel height
/// `page_height`.
///
/// Records with empty content, fewer than 3 polygon points, or a
/// recognition score under the configured floor are skipped silently;
/// none of these conditions is an error.
pub fn plan_page(
    page: &PageWords,
    page_height: f64,
    options: &PlacementOptions,
) -> Vec<TextPlacement> {
    page.words
        .iter()
        .filter_map(|word| {
            if word.content.is_empty() || word.rec_score < options.min_confidence {
                return None;
            }
            let bbox = PlacementBox::from_points(&word.points)?;
            let (x, y) = bbox.anchor(page_height);
            Some(TextPlacement {
                text: word.content.clone(),
                x,
                y,
                font_size: options.sizing.size_for(&bbox),
            })
        })
        .collect()
}
