//! The recursive feature tree.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, FeatureResult};
use crate::primitive::PrimitiveRef;
use crate::{Entity, RelationshipHop, Window};

static NEXT_FEATURE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a feature.
///
/// Identity features are identified by the column they read, so two identity
/// features over the same column are the same feature. Everything else gets a
/// process-unique node id at construction; clones keep it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeatureId {
    Column { entity: String, column: String },
    Node(u64),
}

impl FeatureId {
    fn next_node() -> Self {
        FeatureId::Node(NEXT_FEATURE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A node in a feature tree.
#[derive(Debug, Clone)]
pub struct Feature {
    id: FeatureId,
    entity: Entity,
    custom_name: Option<String>,
    kind: FeatureKind,
}

/// The closed set of feature kinds.
#[derive(Debug, Clone)]
pub enum FeatureKind {
    /// A raw column value.
    Identity { column: String },
    /// A value pulled from a related parent record.
    Direct {
        base: Box<Feature>,
        relationship_path: Vec<RelationshipHop>,
    },
    /// A summary of many child records per parent record.
    Aggregation {
        base_features: Vec<Feature>,
        primitive: PrimitiveRef,
        relationship_path: Vec<RelationshipHop>,
        use_previous: Option<Window>,
        where_feature: Option<Box<Feature>>,
    },
    /// A row-wise computation.
    Transform {
        base_features: Vec<Feature>,
        primitive: PrimitiveRef,
    },
    /// A per-group computation; the last base feature is the group-by key.
    GroupByTransform {
        base_features: Vec<Feature>,
        primitive: PrimitiveRef,
    },
    /// One output column of a multi-output feature.
    OutputSlice { base: Box<Feature>, n: usize },
}

impl FeatureKind {
    fn label(&self) -> &'static str {
        match self {
            FeatureKind::Identity { .. } => "identity",
            FeatureKind::Direct { .. } => "direct",
            FeatureKind::Aggregation { .. } => "aggregation",
            FeatureKind::Transform { .. } => "transform",
            FeatureKind::GroupByTransform { .. } => "group-by transform",
            FeatureKind::OutputSlice { .. } => "output slice",
        }
    }
}

impl Feature {
    // -------------------------------------------------------------------------
    // Constructors
    // -------------------------------------------------------------------------

    /// A feature reading `column` of `entity` unchanged.
    pub fn identity(entity: Entity, column: impl Into<String>) -> Self {
        let column = column.into();
        Self {
            id: FeatureId::Column {
                entity: entity.id.clone(),
                column: column.clone(),
            },
            entity,
            custom_name: None,
            kind: FeatureKind::Identity { column },
        }
    }

    /// Pull `base` onto `entity` (the child) along `relationship_path`.
    pub fn direct(
        base: Feature,
        entity: Entity,
        relationship_path: Vec<RelationshipHop>,
    ) -> FeatureResult<Self> {
        if relationship_path.is_empty() {
            return Err(FeatureError::EmptyRelationshipPath {
                kind: "direct",
                entity: entity.id,
            });
        }
        Ok(Self::node(
            entity,
            FeatureKind::Direct {
                base: Box::new(base),
                relationship_path,
            },
        ))
    }

    /// Summarize `base_features` of the child entity onto `entity` (the parent).
    pub fn aggregation(
        base_features: Vec<Feature>,
        primitive: PrimitiveRef,
        entity: Entity,
        relationship_path: Vec<RelationshipHop>,
    ) -> FeatureResult<Self> {
        if relationship_path.is_empty() {
            return Err(FeatureError::EmptyRelationshipPath {
                kind: "aggregation",
                entity: entity.id,
            });
        }
        Ok(Self::node(
            entity,
            FeatureKind::Aggregation {
                base_features,
                primitive,
                relationship_path,
                use_previous: None,
                where_feature: None,
            },
        ))
    }

    /// Apply `primitive` row-wise to `base_features`.
    pub fn transform(base_features: Vec<Feature>, primitive: PrimitiveRef) -> FeatureResult<Self> {
        let entity = base_features
            .first()
            .map(|base| base.entity.clone())
            .ok_or_else(|| FeatureError::MissingBaseFeatures {
                primitive: primitive.name().to_string(),
            })?;
        Ok(Self::node(
            entity,
            FeatureKind::Transform {
                base_features,
                primitive,
            },
        ))
    }

    /// Apply `primitive` to `base_features` within each group of `groupby`.
    pub fn group_by_transform(
        mut base_features: Vec<Feature>,
        primitive: PrimitiveRef,
        groupby: Feature,
    ) -> Self {
        let entity = groupby.entity.clone();
        base_features.push(groupby);
        Self::node(
            entity,
            FeatureKind::GroupByTransform {
                base_features,
                primitive,
            },
        )
    }

    /// Select output `n` of a multi-output feature.
    pub fn output_slice(base: Feature, n: usize) -> FeatureResult<Self> {
        let primitive = match (&base.kind, base.primitive()) {
            (FeatureKind::OutputSlice { .. }, _) | (_, None) => None,
            (_, Some(primitive)) => Some(primitive),
        };
        let Some(primitive) = primitive else {
            return Err(FeatureError::NotSliceable {
                feature: base.unique_name(),
            });
        };
        let outputs = primitive.number_output_features();
        if n >= outputs {
            return Err(FeatureError::SliceOutOfRange {
                feature: base.unique_name(),
                n,
                outputs,
            });
        }
        Ok(Self::node(
            base.entity.clone(),
            FeatureKind::OutputSlice {
                base: Box::new(base),
                n,
            },
        ))
    }

    fn node(entity: Entity, kind: FeatureKind) -> Self {
        Self {
            id: FeatureId::next_node(),
            entity,
            custom_name: None,
            kind,
        }
    }

    // -------------------------------------------------------------------------
    // Aggregation options
    // -------------------------------------------------------------------------

    /// Restrict an aggregation to child records where `where_feature` holds.
    pub fn with_where(mut self, where_feature: Feature) -> FeatureResult<Self> {
        match &mut self.kind {
            FeatureKind::Aggregation {
                where_feature: slot,
                ..
            } => {
                *slot = Some(Box::new(where_feature));
                Ok(self)
            }
            other => Err(FeatureError::NotAggregation {
                option: "where",
                kind: other.label(),
            }),
        }
    }

    /// Restrict an aggregation to a trailing window.
    pub fn with_use_previous(mut self, window: Window) -> FeatureResult<Self> {
        match &mut self.kind {
            FeatureKind::Aggregation { use_previous, .. } => {
                *use_previous = Some(window);
                Ok(self)
            }
            other => Err(FeatureError::NotAggregation {
                option: "use_previous",
                kind: other.label(),
            }),
        }
    }

    /// Give the feature a custom name. The identity is unchanged.
    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.custom_name = Some(name.into());
        self
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn id(&self) -> &FeatureId {
        &self.id
    }

    pub fn kind(&self) -> &FeatureKind {
        &self.kind
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn entity_id(&self) -> &str {
        &self.entity.id
    }

    /// Ordered child features.
    pub fn base_features(&self) -> &[Feature] {
        match &self.kind {
            FeatureKind::Identity { .. } => &[],
            FeatureKind::Direct { base, .. } | FeatureKind::OutputSlice { base, .. } => {
                std::slice::from_ref(base.as_ref())
            }
            FeatureKind::Aggregation { base_features, .. }
            | FeatureKind::Transform { base_features, .. }
            | FeatureKind::GroupByTransform { base_features, .. } => base_features,
        }
    }

    /// The primitive, if any. An output slice reports its base's primitive.
    pub fn primitive(&self) -> Option<&PrimitiveRef> {
        match &self.kind {
            FeatureKind::Identity { .. } | FeatureKind::Direct { .. } => None,
            FeatureKind::Aggregation { primitive, .. }
            | FeatureKind::Transform { primitive, .. }
            | FeatureKind::GroupByTransform { primitive, .. } => Some(primitive),
            FeatureKind::OutputSlice { base, .. } => base.primitive(),
        }
    }

    pub fn relationship_path(&self) -> &[RelationshipHop] {
        match &self.kind {
            FeatureKind::Direct {
                relationship_path, ..
            }
            | FeatureKind::Aggregation {
                relationship_path, ..
            } => relationship_path,
            _ => &[],
        }
    }

    pub fn where_feature(&self) -> Option<&Feature> {
        match &self.kind {
            FeatureKind::Aggregation { where_feature, .. } => where_feature.as_deref(),
            _ => None,
        }
    }

    pub fn use_previous(&self) -> Option<&Window> {
        match &self.kind {
            FeatureKind::Aggregation { use_previous, .. } => use_previous.as_ref(),
            _ => None,
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self.kind, FeatureKind::Identity { .. })
    }

    pub fn is_direct(&self) -> bool {
        matches!(self.kind, FeatureKind::Direct { .. })
    }

    pub fn number_output_features(&self) -> usize {
        match &self.kind {
            FeatureKind::Identity { .. } | FeatureKind::OutputSlice { .. } => 1,
            FeatureKind::Direct { base, .. } => base.number_output_features(),
            _ => self
                .primitive()
                .map(|primitive| primitive.number_output_features())
                .unwrap_or(1),
        }
    }

    // -------------------------------------------------------------------------
    // Naming
    // -------------------------------------------------------------------------

    /// Display name of the feature, e.g. `MEAN(transactions.amount)`.
    pub fn get_name(&self) -> String {
        match &self.custom_name {
            Some(name) => name.clone(),
            None => self.generate_name(),
        }
    }

    /// Name qualified by the feature's entity, e.g. `customers: MEAN(transactions.amount)`.
    pub fn unique_name(&self) -> String {
        format!("{}: {}", self.entity.id, self.get_name())
    }

    fn generate_name(&self) -> String {
        match &self.kind {
            FeatureKind::Identity { column } => column.clone(),
            FeatureKind::Direct {
                base,
                relationship_path,
            } => {
                let path: Vec<&str> = relationship_path
                    .iter()
                    .map(|hop| hop.parent_entity.as_str())
                    .collect();
                format!("{}.{}", path.join("."), base.get_name())
            }
            FeatureKind::Aggregation {
                base_features,
                primitive,
                relationship_path,
                use_previous,
                where_feature,
            } => {
                let path: Vec<&str> = relationship_path
                    .iter()
                    .map(|hop| hop.child_entity.as_str())
                    .collect();
                let mut inner = path.join(".");
                if !base_features.is_empty() {
                    inner.push('.');
                    inner.push_str(&join_names(base_features));
                }
                if let Some(where_feature) = where_feature {
                    inner.push_str(" WHERE ");
                    inner.push_str(&where_feature.get_name());
                }
                if let Some(window) = use_previous {
                    inner.push_str(", Last ");
                    inner.push_str(&window.name());
                }
                format!("{}({})", primitive.name().to_uppercase(), inner)
            }
            FeatureKind::Transform {
                base_features,
                primitive,
            } => primitive.generate_name(&names(base_features)),
            FeatureKind::GroupByTransform {
                base_features,
                primitive,
            } => match base_features.split_last() {
                Some((groupby, inputs)) => format!(
                    "{} by {}",
                    primitive.generate_name(&names(inputs)),
                    groupby.get_name()
                ),
                None => primitive.generate_name(&[]),
            },
            FeatureKind::OutputSlice { base, n } => format!("{}[{}]", base.get_name(), n),
        }
    }
}

fn names(features: &[Feature]) -> Vec<String> {
    features.iter().map(Feature::get_name).collect()
}

fn join_names(features: &[Feature]) -> String {
    names(features).join(", ")
}
