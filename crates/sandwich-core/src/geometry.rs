/// Axis-aligned bounding box in image pixel space.
///
/// Coordinates follow raster convention:
/// - origin at the top-left of the page image
/// - `y` increases downward
///
/// Resolved from an OCR polygon by taking the min/max over all corners,
/// so point ordering and non-rectangular quadrilaterals do not matter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl PlacementBox {
    /// Resolve the bounding box of a polygon.
    ///
    /// Returns `None` when fewer than 3 points are given: such a record
    /// is geometrically unusable and must be skipped, never drawn.
    pub fn from_points(points: &[[f64; 2]]) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }

        let mut bbox = PlacementBox {
            x_min: f64::INFINITY,
            y_min: f64::INFINITY,
            x_max: f64::NEG_INFINITY,
            y_max: f64::NEG_INFINITY,
        };
        for &[x, y] in points {
            bbox.x_min = bbox.x_min.min(x);
            bbox.y_min = bbox.y_min.min(y);
            bbox.x_max = bbox.x_max.max(x);
            bbox.y_max = bbox.y_max.max(y);
        }
        Some(bbox)
    }

    /// Width of the bounding box.
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Height of the bounding box.
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Map the box into page space (bottom-left origin, y-up), returning
    /// the text anchor for a page of pixel height `page_height`.
    ///
    /// The anchor is the bottom-left corner of the box: `x = x_min`,
    /// `y = page_height - y_max`. Pages are composed at a 1 pixel = 1
    /// point scale, so no further scaling is involved. Skipping the
    /// inversion would mirror the text layer vertically relative to the
    /// visible raster.
    pub fn anchor(&self, page_height: f64) -> (f64, f64) {
        (self.x_min, page_height - self.y_max)
    }
}

/// Clamping policy for font sizes estimated from box heights.
///
/// Detection noise can produce boxes far taller or shorter than the
/// glyphs they cover; the estimate `y_max - y_min` is clamped into
/// `[min, max]` before use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSizing {
    pub min: f64,
    pub max: f64,
}

impl Default for FontSizing {
    fn default() -> Self {
        Self {
            min: 6.0,
            max: 32.0,
        }
    }
}

impl FontSizing {
    /// Font size for a word occupying `bbox`.
    pub fn size_for(&self, bbox: &PlacementBox) -> f64 {
        bbox.height().clamp(self.min, self.max)
    }
}
