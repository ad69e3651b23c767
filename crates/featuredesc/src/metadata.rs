//! Metadata files carrying description overrides.
//!
//! ```json
//! {
//!   "feature_descriptions": { "customers: age": "the age of the customer" },
//!   "primitive_templates": { "mean": "the mean of {}" }
//! }
//! ```
//!
//! Both keys are optional and any other top-level key is ignored. Template
//! values may be a single string or a list of per-slice strings.

use std::collections::HashMap;
use std::path::Path;

use featuredesc_core::Template;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RenderError, RenderResult};
use crate::overrides::{FeatureDescriptions, PrimitiveTemplates};

/// Parsed contents of a metadata file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Unique feature name -> description.
    #[serde(default)]
    pub feature_descriptions: HashMap<String, String>,
    /// Primitive name -> template.
    #[serde(default)]
    pub primitive_templates: HashMap<String, Template>,
}

impl Metadata {
    /// Read and parse a metadata file.
    pub fn load(path: &Path) -> RenderResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| RenderError::MetadataRead {
            path: path.to_path_buf(),
            source,
        })?;
        let metadata: Metadata =
            serde_json::from_str(&contents).map_err(|source| RenderError::MetadataParse {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(
            path = %path.display(),
            feature_descriptions = metadata.feature_descriptions.len(),
            primitive_templates = metadata.primitive_templates.len(),
            "Loaded description metadata"
        );
        Ok(metadata)
    }

    /// Convert into name-keyed override mappings.
    pub fn into_overrides(self) -> (FeatureDescriptions, PrimitiveTemplates) {
        (
            FeatureDescriptions::from_names(self.feature_descriptions),
            PrimitiveTemplates::from_names(self.primitive_templates),
        )
    }
}

/// Load the two override mappings from a metadata file.
pub fn parse_json_metadata(path: &Path) -> RenderResult<(FeatureDescriptions, PrimitiveTemplates)> {
    Ok(Metadata::load(path)?.into_overrides())
}

#[cfg(test)]
mod tests {
    use super::*;
    use featuredesc_core::FeatureId;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_metadata(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_both_mappings() {
        let file = write_metadata(
            r#"{
                "feature_descriptions": { "customers: age": "the age of the customer" },
                "primitive_templates": {
                    "mean": "the mean of {}",
                    "n_most_common": ["the top values of {}", "the top value of {}"]
                },
                "unrelated": 42
            }"#,
        );

        let (descriptions, templates) = parse_json_metadata(file.path()).unwrap();
        let key = FeatureId::Node(0);
        assert_eq!(
            descriptions.lookup(&key, "customers: age").map(String::as_str),
            Some("the age of the customer")
        );
        assert_eq!(templates.len(), 2);
        assert!(matches!(
            templates.lookup(&featuredesc_core::PrimitiveId(0), "n_most_common"),
            Some(Template::Sliced(list)) if list.len() == 2
        ));
    }

    #[test]
    fn test_missing_keys_default_to_empty() {
        let file = write_metadata("{}");
        let (descriptions, templates) = parse_json_metadata(file.path()).unwrap();
        assert!(descriptions.is_empty());
        assert!(templates.is_empty());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_json_metadata(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, RenderError::MetadataRead { .. }));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let file = write_metadata("{ not json");
        let err = parse_json_metadata(file.path()).unwrap_err();
        assert!(matches!(err, RenderError::MetadataParse { .. }));

        let file = write_metadata(r#"{ "feature_descriptions": ["a", "b"] }"#);
        let err = parse_json_metadata(file.path()).unwrap_err();
        assert!(matches!(err, RenderError::MetadataParse { .. }));
    }
}
