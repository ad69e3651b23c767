//! Core feature-definition model shared across the featuredesc workspace.
//!
//! A feature is a recursively composed computation over raw data columns. This
//! crate models the *definition* of such features (never their values):
//!
//! - **Entity**: a table with an id and an index column
//! - **RelationshipHop**: one parent/child step of a relationship path
//! - **Window**: a trailing "use previous" window for aggregations
//! - **Primitive**: the function underlying a feature, with its English template
//! - **Feature**: the recursive tree itself, a tagged union over feature kinds
//!
//! Feature trees can be built directly with the constructors on [`Feature`], or
//! loaded from a JSON [`FeatureDefinitions`] document.

mod definitions;
mod error;
mod feature;
mod primitive;
mod standard;
mod template;

use serde::{Deserialize, Serialize};

pub use definitions::{EntityDef, FeatureDef, FeatureDefinitions, HopDef, PrimitiveDef};
pub use error::{DefinitionError, FeatureError, FeatureResult, TemplateError};
pub use feature::{Feature, FeatureId, FeatureKind};
pub use primitive::{display_value, Primitive, PrimitiveId, PrimitiveRef, TemplatePrimitive};
pub use standard::{
    equal_scalar, is_scalar_primitive, n_most_common, scalar_primitive, standard_primitives,
    PrimitiveRegistry,
};
pub use template::{convert_to_nth, format_template, Template};

// =============================================================================
// Entity Types
// =============================================================================

/// A table in the entity set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    /// Entity (table) name.
    pub id: String,
    /// Name of the index column.
    pub index: String,
}

impl Entity {
    pub fn new(id: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            index: index.into(),
        }
    }
}

/// One hop of a relationship path between two entities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationshipHop {
    /// The "one" side of the relationship.
    pub parent_entity: String,
    /// The "many" side of the relationship.
    pub child_entity: String,
}

impl RelationshipHop {
    pub fn new(parent_entity: impl Into<String>, child_entity: impl Into<String>) -> Self {
        Self {
            parent_entity: parent_entity.into(),
            child_entity: child_entity.into(),
        }
    }
}

// =============================================================================
// Time Windows
// =============================================================================

/// Unit of a "use previous" window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowUnit {
    Observations,
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
    Years,
}

impl WindowUnit {
    /// Capitalized plural label.
    pub fn label(&self) -> &'static str {
        match self {
            WindowUnit::Observations => "Observations",
            WindowUnit::Seconds => "Seconds",
            WindowUnit::Minutes => "Minutes",
            WindowUnit::Hours => "Hours",
            WindowUnit::Days => "Days",
            WindowUnit::Weeks => "Weeks",
            WindowUnit::Months => "Months",
            WindowUnit::Years => "Years",
        }
    }
}

/// Trailing window an aggregation is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Window {
    pub value: u32,
    pub unit: WindowUnit,
}

impl Window {
    pub fn new(value: u32, unit: WindowUnit) -> Self {
        Self { value, unit }
    }

    /// Human readable name, e.g. `"3 Days"` or `"1 Month"`.
    pub fn name(&self) -> String {
        let label = self.unit.label();
        if self.value == 1 {
            format!("{} {}", self.value, &label[..label.len() - 1])
        } else {
            format!("{} {}", self.value, label)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_name_pluralizes() {
        assert_eq!(Window::new(3, WindowUnit::Days).name(), "3 Days");
        assert_eq!(Window::new(1, WindowUnit::Months).name(), "1 Month");
        assert_eq!(Window::new(0, WindowUnit::Hours).name(), "0 Hours");
        assert_eq!(
            Window::new(1, WindowUnit::Observations).name(),
            "1 Observation"
        );
    }

    #[test]
    fn window_unit_serializes_snake_case() {
        let json = serde_json::to_string(&WindowUnit::Days).unwrap();
        assert_eq!(json, "\"days\"");
    }
}
