//! Describe command implementation.
//!
//! Loads a definitions document, builds its feature trees against the
//! standard primitive library and prints one description per feature.

use std::path::Path;

use anyhow::{Context, Result};
use featuredesc::FeatureDescriber;
use featuredesc_core::{Feature, FeatureDefinitions};
use serde::Serialize;
use tracing::info;

use crate::config::OutputFormat;

/// One described feature, as printed in JSON output.
#[derive(Debug, Serialize)]
pub struct DescribedFeature {
    pub feature: String,
    pub description: String,
}

/// Describe the features of `definitions`.
///
/// `only` restricts output to the given unique names, in document order.
pub fn execute(
    definitions: &Path,
    metadata: Option<&Path>,
    only: &[String],
    format: OutputFormat,
) -> Result<()> {
    let described = describe_file(definitions, metadata, only)?;
    let output = render(&described, format)?;
    println!("{output}");
    Ok(())
}

/// Load, build and describe; no printing.
pub fn describe_file(
    definitions: &Path,
    metadata: Option<&Path>,
    only: &[String],
) -> Result<Vec<DescribedFeature>> {
    let document = FeatureDefinitions::load(definitions)
        .with_context(|| format!("Failed to load definitions from {}", definitions.display()))?;
    let features = document
        .build_standard()
        .with_context(|| format!("Invalid feature definitions in {}", definitions.display()))?;
    let features = select(features, only)?;

    let describer = match metadata {
        Some(path) => FeatureDescriber::new()
            .with_metadata_file(path)
            .with_context(|| format!("Failed to load metadata from {}", path.display()))?,
        None => FeatureDescriber::new(),
    };

    info!(
        definitions = %definitions.display(),
        features = features.len(),
        "Describing features"
    );

    features
        .iter()
        .map(|feature| {
            let description = describer
                .describe(feature)
                .with_context(|| format!("Failed to describe {}", feature.unique_name()))?;
            Ok(DescribedFeature {
                feature: feature.unique_name(),
                description,
            })
        })
        .collect()
}

fn select(features: Vec<Feature>, only: &[String]) -> Result<Vec<Feature>> {
    if only.is_empty() {
        return Ok(features);
    }
    if let Some(missing) = only
        .iter()
        .find(|name| !features.iter().any(|f| &f.unique_name() == *name))
    {
        anyhow::bail!("Unknown feature: {}", missing);
    }
    Ok(features
        .into_iter()
        .filter(|feature| only.contains(&feature.unique_name()))
        .collect())
}

fn render(described: &[DescribedFeature], format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => described
            .iter()
            .map(|d| format!("{}: {}", d.feature, d.description))
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Json => serde_json::to_string_pretty(described)?,
    })
}
