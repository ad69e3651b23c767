//! English descriptions of feature definitions.
//!
//! Given a feature tree from `featuredesc-core`, this crate renders a single
//! English sentence explaining what the feature computes:
//!
//! ```
//! use featuredesc::describe_feature;
//! use featuredesc_core::{Entity, Feature};
//!
//! let age = Feature::identity(Entity::new("customers", "id"), "age");
//! assert_eq!(describe_feature(&age, None, None, None).unwrap(), "The \"age\".");
//! ```
//!
//! Descriptions can be overridden per feature and templates per primitive,
//! either in code ([`FeatureDescriptions`], [`PrimitiveTemplates`]) or through
//! a JSON metadata file (see [`metadata`]).

pub mod description;
pub mod error;
pub mod metadata;
pub mod overrides;

pub use description::{
    describe_feature, generate_description, get_aggregation_groupby, get_direct_description,
    FeatureDescriber,
};
pub use error::{RenderError, RenderResult};
pub use metadata::{parse_json_metadata, Metadata};
pub use overrides::{FeatureDescriptions, Overrides, PrimitiveTemplates};
