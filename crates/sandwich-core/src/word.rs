use serde::{Deserialize, Serialize};

/// Reading direction reported by the OCR engine for a word.
///
/// Engines that do not report orientation leave this as
/// [`Unspecified`](Direction::Unspecified); any unrecognized value
/// deserializes to it as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Direction {
    Horizontal,
    Vertical,
    #[default]
    Unspecified,
}

impl From<String> for Direction {
    fn from(s: String) -> Self {
        match s.as_str() {
            "horizontal" => Direction::Horizontal,
            "vertical" => Direction::Vertical,
            _ => Direction::Unspecified,
        }
    }
}

/// One recognized text span with its polygon and confidence scores.
///
/// Every field is optional on the wire; missing fields take the
/// defaults below. A record whose `points` has fewer than 3 entries is
/// geometrically unusable and is skipped by placement planning rather
/// than treated as an error.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WordRecord {
    /// Recognized text; may be empty.
    pub content: String,
    /// Polygon corners in pixel space (top-left origin, y-down),
    /// nominally 4 forming a quadrilateral.
    pub points: Vec<[f64; 2]>,
    /// Recognition confidence in [0, 1].
    pub rec_score: f64,
    /// Region detection confidence in [0, 1].
    pub det_score: f64,
    /// Reading direction.
    pub direction: Direction,
}

impl WordRecord {
    /// Whether the polygon has enough corners to resolve a bounding box.
    pub fn has_usable_geometry(&self) -> bool {
        self.points.len() >= 3
    }
}

/// The recognized words of one source page, in detection order.
///
/// May be empty (nothing detected) but is never absent: an OCR failure
/// for a page is recorded at the job level, not represented as a
/// missing result.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PageWords {
    #[serde(default)]
    pub words: Vec<WordRecord>,
}

impl PageWords {
    /// Number of word records on this page.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// True if no words were detected.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Number of records with usable geometry and non-empty content.
    pub fn usable_count(&self) -> usize {
        self.words
            .iter()
            .filter(|w| w.has_usable_geometry() && !w.content.is_empty())
            .count()
    }
}
