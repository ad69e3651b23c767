//! Error types for description rendering.

use std::path::PathBuf;

use featuredesc_core::{Feature, TemplateError};
use thiserror::Error;

/// Result type alias for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while describing a feature.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The metadata file could not be read.
    #[error("failed to read metadata file {path}: {source}")]
    MetadataRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The metadata file is not valid JSON of the expected shape.
    #[error("failed to parse metadata file {path}: {source}")]
    MetadataParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A primitive's description template could not be rendered.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// The feature tree does not have the shape its kind requires.
    #[error("malformed feature {feature}: {reason}")]
    MalformedFeature { feature: String, reason: String },
}

impl RenderError {
    pub(crate) fn malformed(feature: &Feature, reason: impl Into<String>) -> Self {
        Self::MalformedFeature {
            feature: feature.unique_name(),
            reason: reason.into(),
        }
    }
}
