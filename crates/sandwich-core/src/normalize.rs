//! Normalization boundary for loosely-shaped OCR results.
//!
//! OCR engine output shape can vary release to release. Everything the
//! rest of the pipeline consumes goes through [`normalize_page`], which
//! validates raw values against the optional-field schema of
//! [`WordRecord`](crate::word::WordRecord) and never fails: anything
//! unrecognizable collapses to an empty page.

use serde_json::Value;

use crate::word::{PageWords, WordRecord};

/// Convert a raw OCR result value into a canonical [`PageWords`].
///
/// Tolerated inputs, all yielding an empty page: `null`, non-objects, an
/// object without a `"words"` key, and a `"words"` value that is not an
/// array. Individual entries that do not fit the word-record schema at
/// all (e.g. a bare number) are dropped; entries that merely lack fields
/// take the schema defaults.
pub fn normalize_page(raw: &Value) -> PageWords {
    let Some(entries) = raw.get("words").and_then(Value::as_array) else {
        return PageWords::default();
    };

    let words = entries
        .iter()
        .filter_map(|entry| serde_json::from_value::<WordRecord>(entry.clone()).ok())
        .collect();

    PageWords { words }
}
