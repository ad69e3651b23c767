//! Serialized feature definitions.
//!
//! A definitions document names the entities and any custom primitives, then
//! lists feature trees:
//!
//! ```json
//! {
//!   "entities": { "customers": { "index": "id" }, "transactions": { "index": "transaction_id" } },
//!   "primitives": { "big_spend": { "name": "equal_scalar", "value": true,
//!                                  "description_template": "whether {} equals True" } },
//!   "features": [
//!     { "type": "aggregation", "primitive": "mean",
//!       "relationship_path": [ { "parent": "customers", "child": "transactions" } ],
//!       "base_features": [ { "type": "identity", "entity": "transactions", "column": "amount" } ] }
//!   ]
//! }
//! ```
//!
//! Primitive names resolve against the document's `primitives` table first and
//! then against the registry passed to [`FeatureDefinitions::build`]. A
//! transform carrying a `value` builds a scalar primitive instead:
//!
//! ```json
//! { "type": "transform", "primitive": "equal_scalar", "value": true,
//!   "base_features": [ { "type": "identity", "entity": "transactions", "column": "fraud" } ] }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{DefinitionError, FeatureError};
use crate::feature::Feature;
use crate::primitive::{PrimitiveRef, TemplatePrimitive};
use crate::standard::{
    is_scalar_primitive, scalar_primitive, standard_primitives, PrimitiveRegistry,
};
use crate::template::Template;
use crate::{Entity, RelationshipHop, Window};

/// Root of a definitions document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureDefinitions {
    #[serde(default)]
    pub entities: BTreeMap<String, EntityDef>,
    #[serde(default)]
    pub primitives: BTreeMap<String, PrimitiveDef>,
    #[serde(default)]
    pub features: Vec<FeatureDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityDef {
    /// Index column of the entity.
    pub index: String,
}

/// A custom primitive declared in the document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrimitiveDef {
    /// Primitive name; defaults to the key it is declared under.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description_template: Option<Template>,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default = "default_outputs")]
    pub number_output_features: usize,
}

fn default_outputs() -> usize {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HopDef {
    pub parent: String,
    pub child: String,
}

impl From<&HopDef> for RelationshipHop {
    fn from(hop: &HopDef) -> Self {
        RelationshipHop::new(hop.parent.clone(), hop.child.clone())
    }
}

/// One node of a serialized feature tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeatureDef {
    Identity {
        entity: String,
        column: String,
        #[serde(default)]
        name: Option<String>,
    },
    /// The feature lives on the first hop's child entity.
    Direct {
        base: Box<FeatureDef>,
        relationship_path: Vec<HopDef>,
        #[serde(default)]
        name: Option<String>,
    },
    /// The feature lives on the first hop's parent entity.
    Aggregation {
        primitive: String,
        relationship_path: Vec<HopDef>,
        #[serde(default)]
        base_features: Vec<FeatureDef>,
        #[serde(default)]
        use_previous: Option<Window>,
        #[serde(default, rename = "where")]
        where_feature: Option<Box<FeatureDef>>,
        #[serde(default)]
        name: Option<String>,
    },
    /// With a `value`, `primitive` names a scalar primitive such as `equal_scalar`.
    Transform {
        primitive: String,
        base_features: Vec<FeatureDef>,
        #[serde(default)]
        value: Option<Value>,
        #[serde(default)]
        name: Option<String>,
    },
    GroupByTransform {
        primitive: String,
        #[serde(default)]
        base_features: Vec<FeatureDef>,
        groupby: Box<FeatureDef>,
        #[serde(default)]
        name: Option<String>,
    },
    OutputSlice {
        base: Box<FeatureDef>,
        n: usize,
        #[serde(default)]
        name: Option<String>,
    },
}

impl FeatureDefinitions {
    pub fn from_json(json: &str) -> Result<Self, DefinitionError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a definitions file.
    pub fn load(path: &Path) -> Result<Self, DefinitionError> {
        let contents = std::fs::read_to_string(path)?;
        let definitions = Self::from_json(&contents)?;
        debug!(
            path = %path.display(),
            features = definitions.features.len(),
            "Loaded feature definitions"
        );
        Ok(definitions)
    }

    /// Build every feature, resolving primitives against the standard library.
    pub fn build_standard(&self) -> Result<Vec<Feature>, DefinitionError> {
        self.build(&standard_primitives())
    }

    /// Build every feature tree in document order.
    pub fn build(&self, registry: &PrimitiveRegistry) -> Result<Vec<Feature>, DefinitionError> {
        let mut builder = Builder {
            definitions: self,
            registry,
            resolved: HashMap::new(),
        };
        self.features
            .iter()
            .map(|def| builder.build(def))
            .collect()
    }
}

struct Builder<'a> {
    definitions: &'a FeatureDefinitions,
    registry: &'a PrimitiveRegistry,
    resolved: HashMap<String, PrimitiveRef>,
}

impl Builder<'_> {
    fn entity(&self, id: &str) -> Result<Entity, DefinitionError> {
        self.definitions
            .entities
            .get(id)
            .map(|def| Entity::new(id, def.index.clone()))
            .ok_or_else(|| DefinitionError::UnknownEntity(id.to_string()))
    }

    /// Resolve a primitive by name, creating each document primitive once.
    fn primitive(&mut self, key: &str) -> Result<PrimitiveRef, DefinitionError> {
        if let Some(primitive) = self.resolved.get(key) {
            return Ok(primitive.clone());
        }

        let primitive = match self.definitions.primitives.get(key) {
            Some(def) => {
                let mut primitive =
                    TemplatePrimitive::new(def.name.clone().unwrap_or_else(|| key.to_string()))
                        .with_outputs(def.number_output_features);
                if let Some(template) = &def.description_template {
                    primitive = primitive.with_template(template.clone());
                }
                if let Some(value) = &def.value {
                    primitive = primitive.with_value(value.clone());
                }
                primitive.into_ref()
            }
            None if is_scalar_primitive(key) => {
                return Err(DefinitionError::MissingScalarValue(key.to_string()))
            }
            None => self
                .registry
                .get(key)
                .ok_or_else(|| DefinitionError::UnknownPrimitive(key.to_string()))?,
        };

        self.resolved.insert(key.to_string(), primitive.clone());
        Ok(primitive)
    }

    fn build_all(&mut self, defs: &[FeatureDef]) -> Result<Vec<Feature>, DefinitionError> {
        defs.iter().map(|def| self.build(def)).collect()
    }

    fn build(&mut self, def: &FeatureDef) -> Result<Feature, DefinitionError> {
        let (feature, name) = match def {
            FeatureDef::Identity {
                entity,
                column,
                name,
            } => (Feature::identity(self.entity(entity)?, column.clone()), name),
            FeatureDef::Direct {
                base,
                relationship_path,
                name,
            } => {
                let first = first_hop(relationship_path, "direct")?;
                let entity = self.entity(&first.child)?;
                let base = self.build(base)?;
                let path = relationship_path.iter().map(RelationshipHop::from).collect();
                (Feature::direct(base, entity, path)?, name)
            }
            FeatureDef::Aggregation {
                primitive,
                relationship_path,
                base_features,
                use_previous,
                where_feature,
                name,
            } => {
                let first = first_hop(relationship_path, "aggregation")?;
                let entity = self.entity(&first.parent)?;
                let primitive = self.primitive(primitive)?;
                let bases = self.build_all(base_features)?;
                let path = relationship_path.iter().map(RelationshipHop::from).collect();

                let mut feature = Feature::aggregation(bases, primitive, entity, path)?;
                if let Some(where_def) = where_feature {
                    feature = feature.with_where(self.build(where_def)?)?;
                }
                if let Some(window) = use_previous {
                    feature = feature.with_use_previous(*window)?;
                }
                (feature, name)
            }
            FeatureDef::Transform {
                primitive,
                base_features,
                value,
                name,
            } => {
                let primitive = match value {
                    Some(value) => scalar_primitive(primitive, value.clone())
                        .ok_or_else(|| DefinitionError::NotScalar(primitive.clone()))?,
                    None => self.primitive(primitive)?,
                };
                let bases = self.build_all(base_features)?;
                (Feature::transform(bases, primitive)?, name)
            }
            FeatureDef::GroupByTransform {
                primitive,
                base_features,
                groupby,
                name,
            } => {
                let primitive = self.primitive(primitive)?;
                let bases = self.build_all(base_features)?;
                let groupby = self.build(groupby)?;
                (Feature::group_by_transform(bases, primitive, groupby), name)
            }
            FeatureDef::OutputSlice { base, n, name } => {
                let base = self.build(base)?;
                (Feature::output_slice(base, *n)?, name)
            }
        };

        Ok(match name {
            Some(name) => feature.rename(name.clone()),
            None => feature,
        })
    }
}

fn first_hop<'a>(path: &'a [HopDef], kind: &'static str) -> Result<&'a HopDef, DefinitionError> {
    path.first().ok_or_else(|| {
        DefinitionError::Feature(FeatureError::EmptyRelationshipPath {
            kind,
            entity: String::new(),
        })
    })
}
