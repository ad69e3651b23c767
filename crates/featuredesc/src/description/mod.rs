//! Description generation.
//!
//! - **Generation**: recursive rendering of a feature tree into one phrase
//! - **Describer**: a reusable holder of override mappings

mod generator;

pub use generator::{
    describe_feature, generate_description, get_aggregation_groupby, get_direct_description,
    FeatureDescriber,
};
