//! Error types for the feature model.

use thiserror::Error;

/// Result type alias for feature construction.
pub type FeatureResult<T> = Result<T, FeatureError>;

/// Errors raised while rendering a description template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// A placeholder referenced an input phrase that was not supplied.
    #[error("template {template:?} references input {index} but only {available} were given")]
    MissingInput {
        template: String,
        index: usize,
        available: usize,
    },

    /// A named placeholder other than `nth_slice` was used.
    #[error("unknown placeholder {{{name}}} in template {template:?}")]
    UnknownPlaceholder { template: String, name: String },

    /// A `{` or `}` without its partner.
    #[error("unbalanced brace in template {template:?}")]
    UnbalancedBrace { template: String },

    /// A slice was requested past the end of a multi-output template list.
    #[error("slice {slice} is out of range of a template list with {len} entries")]
    SliceOutOfRange { slice: usize, len: usize },

    /// A template list without any entries.
    #[error("template list is empty")]
    EmptyTemplate,
}

/// Errors raised when a feature is constructed with an invalid shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeatureError {
    /// Direct and aggregation features need at least one hop.
    #[error("{kind} feature on {entity:?} needs a non-empty relationship path")]
    EmptyRelationshipPath { kind: &'static str, entity: String },

    /// Transforms take their entity from the first base feature.
    #[error("transform {primitive:?} needs at least one base feature")]
    MissingBaseFeatures { primitive: String },

    /// `where` and `use_previous` only apply to aggregations.
    #[error("{option} only applies to aggregation features, not {kind} features")]
    NotAggregation {
        option: &'static str,
        kind: &'static str,
    },

    /// Slice index beyond the number of primitive outputs.
    #[error("slice {n} is out of range for {feature:?} with {outputs} outputs")]
    SliceOutOfRange {
        feature: String,
        n: usize,
        outputs: usize,
    },

    /// Only primitive-backed features can be sliced.
    #[error("feature {feature:?} has no primitive outputs to slice")]
    NotSliceable { feature: String },
}

/// Errors raised while building features from a definitions document.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("unknown entity {0:?}")]
    UnknownEntity(String),

    #[error("unknown primitive {0:?}")]
    UnknownPrimitive(String),

    /// A scalar primitive was referenced without a `value`.
    #[error("scalar primitive {0:?} needs a value")]
    MissingScalarValue(String),

    /// A `value` was given to a primitive that does not take one.
    #[error("primitive {0:?} does not take a scalar value")]
    NotScalar(String),

    #[error("failed to read definitions: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid feature: {0}")]
    Feature(#[from] FeatureError),

    #[error("definitions JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
