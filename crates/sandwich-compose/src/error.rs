//! Error types for the composition layer.

use thiserror::Error;

/// Error type for document composition.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// A page raster could not be decoded or re-encoded.
    #[error("image error: {0}")]
    Image(String),

    /// A font resource could not be parsed or encoded against.
    #[error("font error: {0}")]
    Font(String),
}
