//! Recursive generation of English feature descriptions.
//!
//! A feature tree is rendered bottom-up: every base feature is described first
//! and the phrases are handed to the primitive's template. Aggregations then
//! get an entity clause, an optional where clause and a group-by clause:
//!
//! ```text
//! the average of the "amount" | of all instances of "transactions" | where ... is ... | for each "id" in "customers"
//! ```

use std::path::Path;

use featuredesc_core::{display_value, Feature, FeatureKind};
use tracing::debug;

use crate::error::{RenderError, RenderResult};
use crate::metadata::parse_json_metadata;
use crate::overrides::{FeatureDescriptions, PrimitiveTemplates};

/// Describes features using a fixed set of overrides.
#[derive(Debug, Clone, Default)]
pub struct FeatureDescriber {
    feature_descriptions: FeatureDescriptions,
    primitive_templates: PrimitiveTemplates,
}

impl FeatureDescriber {
    /// Create a describer without overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a describer with caller-supplied overrides.
    pub fn with_overrides(
        feature_descriptions: FeatureDescriptions,
        primitive_templates: PrimitiveTemplates,
    ) -> Self {
        Self {
            feature_descriptions,
            primitive_templates,
        }
    }

    /// Layer the overrides of a metadata file underneath the current ones.
    ///
    /// Entries already held by the describer win over entries from the file.
    pub fn with_metadata_file(self, path: &Path) -> RenderResult<Self> {
        let (file_descriptions, file_templates) = parse_json_metadata(path)?;
        let describer = Self {
            feature_descriptions: self.feature_descriptions.merged_over(&file_descriptions),
            primitive_templates: self.primitive_templates.merged_over(&file_templates),
        };
        debug!(
            path = %path.display(),
            feature_descriptions = describer.feature_descriptions.len(),
            primitive_templates = describer.primitive_templates.len(),
            "Merged metadata overrides"
        );
        Ok(describer)
    }

    pub fn feature_descriptions(&self) -> &FeatureDescriptions {
        &self.feature_descriptions
    }

    pub fn primitive_templates(&self) -> &PrimitiveTemplates {
        &self.primitive_templates
    }

    /// Describe `feature` as a sentence: capitalized and ending in a period.
    pub fn describe(&self, feature: &Feature) -> RenderResult<String> {
        let phrase = self.generate(feature)?;
        Ok(to_sentence(&phrase))
    }

    /// Describe `feature` as a bare phrase.
    pub fn generate(&self, feature: &Feature) -> RenderResult<String> {
        generate_description(
            feature,
            &self.feature_descriptions,
            &self.primitive_templates,
        )
    }
}

/// Generate an English description of `feature`.
///
/// Mappings loaded from `metadata_file` form the base; mappings passed in
/// directly win on collisions. Fails if the metadata file cannot be read or
/// parsed, or if a primitive template cannot be rendered.
pub fn describe_feature(
    feature: &Feature,
    feature_descriptions: Option<&FeatureDescriptions>,
    primitive_templates: Option<&PrimitiveTemplates>,
    metadata_file: Option<&Path>,
) -> RenderResult<String> {
    let mut describer = FeatureDescriber::with_overrides(
        feature_descriptions.cloned().unwrap_or_default(),
        primitive_templates.cloned().unwrap_or_default(),
    );
    if let Some(path) = metadata_file {
        describer = describer.with_metadata_file(path)?;
    }
    describer.describe(feature)
}

/// Generate the uncapitalized, unpunctuated phrase describing `feature`.
pub fn generate_description(
    feature: &Feature,
    feature_descriptions: &FeatureDescriptions,
    primitive_templates: &PrimitiveTemplates,
) -> RenderResult<String> {
    if let Some(description) = feature_descriptions.for_feature(feature) {
        return Ok(description.clone());
    }

    match feature.kind() {
        FeatureKind::Identity { .. } => Ok(format!("the \"{}\"", feature.get_name())),
        FeatureKind::Direct { .. } => {
            let (base, direct_description) = get_direct_description(feature)?;
            let base_description =
                generate_description(base, feature_descriptions, primitive_templates)?;
            Ok(base_description + &direct_description)
        }
        _ => describe_computed(feature, feature_descriptions, primitive_templates),
    }
}

/// Aggregations, transforms, group-by transforms and output slices.
fn describe_computed(
    feature: &Feature,
    feature_descriptions: &FeatureDescriptions,
    primitive_templates: &PrimitiveTemplates,
) -> RenderResult<String> {
    let (feature, slice_num) = match feature.kind() {
        FeatureKind::OutputSlice { base, n } => (base.as_ref(), Some(*n)),
        _ => (feature, None),
    };
    let primitive = feature
        .primitive()
        .ok_or_else(|| RenderError::malformed(feature, "feature has no primitive"))?;

    let mut input_descriptions = feature
        .base_features()
        .iter()
        .map(|base| generate_description(base, feature_descriptions, primitive_templates))
        .collect::<RenderResult<Vec<_>>>()?;

    // The group-by key is the last base feature, not a primitive input.
    let groupby_description = match feature.kind() {
        FeatureKind::GroupByTransform { .. } => Some(input_descriptions.pop().ok_or_else(|| {
            RenderError::malformed(feature, "group-by transform has no group-by feature")
        })?),
        _ => None,
    };

    let template_override = primitive_templates.for_primitive(primitive.as_ref());
    let primitive_description =
        primitive.get_description(&input_descriptions, slice_num, template_override)?;

    let is_aggregation = matches!(feature.kind(), FeatureKind::Aggregation { .. });

    let groupby = match groupby_description {
        _ if is_aggregation => format!(
            "for each {}",
            get_aggregation_groupby(feature, feature_descriptions)
        ),
        Some(description) => format!("for each {description}"),
        None => String::new(),
    };

    let entity_description = if is_aggregation {
        let child = feature
            .relationship_path()
            .last()
            .map(|hop| hop.child_entity.as_str())
            .ok_or_else(|| RenderError::malformed(feature, "empty relationship path"))?;
        match feature.use_previous() {
            Some(window) => format!(
                "of the previous {} of \"{}\"",
                window.name().to_lowercase(),
                child
            ),
            None => format!("of all instances of \"{child}\""),
        }
    } else {
        String::new()
    };

    let where_description = match feature.where_feature() {
        Some(where_feature) => {
            let value = where_feature
                .primitive()
                .and_then(|primitive| primitive.value())
                .ok_or_else(|| {
                    RenderError::malformed(where_feature, "where feature has no value to compare")
                })?;
            let column = match feature_descriptions.for_feature(where_feature) {
                Some(description) => description.clone(),
                None => {
                    let base = where_feature.base_features().first().ok_or_else(|| {
                        RenderError::malformed(where_feature, "where feature has no base feature")
                    })?;
                    generate_description(base, feature_descriptions, primitive_templates)?
                }
            };
            format!("where {} is {}", column, display_value(value))
        }
        None => String::new(),
    };

    let description = [
        primitive_description,
        entity_description,
        where_description,
        groupby,
    ]
    .into_iter()
    .filter(|phrase| !phrase.is_empty())
    .collect::<Vec<_>>()
    .join(" ");

    Ok(description)
}

/// Unwind a chain of direct features.
///
/// Returns the first non-direct base feature and the relationship phrase, e.g.
/// ` of the instance of "customers" associated with this instance of "sessions"`.
pub fn get_direct_description(feature: &Feature) -> RenderResult<(&Feature, String)> {
    let (mut base, parent) = direct_parts(feature)?;
    let mut description = format!(
        " the instance of \"{}\" associated with this instance of \"{}\"",
        parent,
        feature.entity_id()
    );

    while base.is_direct() {
        let (next, parent) = direct_parts(base)?;
        description = format!(" the instance of \"{parent}\" associated with{description}");
        base = next;
    }

    Ok((base, format!(" of{description}")))
}

/// Base feature and last-hop parent entity of a direct feature.
fn direct_parts(feature: &Feature) -> RenderResult<(&Feature, &str)> {
    match feature.kind() {
        FeatureKind::Direct {
            base,
            relationship_path,
        } => {
            let hop = relationship_path
                .last()
                .ok_or_else(|| RenderError::malformed(feature, "empty relationship path"))?;
            Ok((base.as_ref(), hop.parent_entity.as_str()))
        }
        _ => Err(RenderError::malformed(feature, "not a direct feature")),
    }
}

/// Phrase naming the group-by key of an aggregation.
///
/// An override for the identity feature over the entity's index is used with
/// a leading `"the "` removed; otherwise `"<index>" in "<entity>"`.
pub fn get_aggregation_groupby(
    feature: &Feature,
    feature_descriptions: &FeatureDescriptions,
) -> String {
    let entity = feature.entity();
    let groupby_feature = Feature::identity(entity.clone(), entity.index.clone());
    match feature_descriptions.for_feature(&groupby_feature) {
        Some(description) => description
            .strip_prefix("the ")
            .unwrap_or(description)
            .to_string(),
        None => format!("\"{}\" in \"{}\"", entity.index, entity.id),
    }
}

/// Uppercase the first character and append a period.
fn to_sentence(phrase: &str) -> String {
    let mut chars = phrase.chars();
    let mut sentence = String::with_capacity(phrase.len() + 1);
    if let Some(first) = chars.next() {
        sentence.extend(first.to_uppercase());
        sentence.push_str(chars.as_str());
    }
    sentence.push('.');
    sentence
}

#[cfg(test)]
mod tests {
    use super::*;
    use featuredesc_core::{Entity, RelationshipHop, TemplatePrimitive};

    fn customers() -> Entity {
        Entity::new("customers", "id")
    }

    fn sessions() -> Entity {
        Entity::new("sessions", "session_id")
    }

    fn transactions() -> Entity {
        Entity::new("transactions", "transaction_id")
    }

    fn empty() -> (FeatureDescriptions, PrimitiveTemplates) {
        (FeatureDescriptions::new(), PrimitiveTemplates::new())
    }

    #[test]
    fn test_to_sentence() {
        assert_eq!(to_sentence("the \"age\""), "The \"age\".");
        assert_eq!(to_sentence("Already"), "Already.");
        assert_eq!(to_sentence(""), ".");
        assert_eq!(to_sentence("éclair"), "Éclair.");
    }

    #[test]
    fn test_identity() {
        let (fd, pt) = empty();
        let age = Feature::identity(customers(), "age");
        assert_eq!(generate_description(&age, &fd, &pt).unwrap(), "the \"age\"");
    }

    #[test]
    fn test_single_hop_direct() {
        let age = Feature::identity(customers(), "age");
        let direct = Feature::direct(
            age,
            sessions(),
            vec![RelationshipHop::new("customers", "sessions")],
        )
        .unwrap();

        let (base, phrase) = get_direct_description(&direct).unwrap();
        assert_eq!(base.get_name(), "age");
        assert_eq!(
            phrase,
            " of the instance of \"customers\" associated with this instance of \"sessions\""
        );
    }

    #[test]
    fn test_two_hop_direct_chain() {
        let age = Feature::identity(customers(), "age");
        let on_sessions = Feature::direct(
            age,
            sessions(),
            vec![RelationshipHop::new("customers", "sessions")],
        )
        .unwrap();
        let on_transactions = Feature::direct(
            on_sessions,
            transactions(),
            vec![RelationshipHop::new("sessions", "transactions")],
        )
        .unwrap();

        let (fd, pt) = empty();
        assert_eq!(
            generate_description(&on_transactions, &fd, &pt).unwrap(),
            "the \"age\" of the instance of \"customers\" associated with \
             the instance of \"sessions\" associated with this instance of \"transactions\""
        );
    }

    #[test]
    fn test_groupby_default_and_override() {
        let count = TemplatePrimitive::new("count")
            .with_template("the number")
            .into_ref();
        let agg = Feature::aggregation(
            vec![],
            count,
            customers(),
            vec![RelationshipHop::new("customers", "transactions")],
        )
        .unwrap();

        let fd = FeatureDescriptions::new();
        assert_eq!(get_aggregation_groupby(&agg, &fd), "\"id\" in \"customers\"");

        let fd = FeatureDescriptions::new().with_name("customers: id", "the customer");
        assert_eq!(get_aggregation_groupby(&agg, &fd), "customer");

        let fd = FeatureDescriptions::new().with_name("customers: id", "each customer");
        assert_eq!(get_aggregation_groupby(&agg, &fd), "each customer");

        let mut fd = FeatureDescriptions::new();
        fd.insert_feature(&Feature::identity(customers(), "id"), "the \"id\"");
        assert_eq!(get_aggregation_groupby(&agg, &fd), "\"id\"");
    }

    #[test]
    fn test_where_feature_without_value_is_malformed() {
        let mean = TemplatePrimitive::new("mean")
            .with_template("the average of {}")
            .into_ref();
        let negate = TemplatePrimitive::new("negate").into_ref();
        let flag = Feature::transform(
            vec![Feature::identity(transactions(), "flag")],
            negate,
        )
        .unwrap();
        let agg = Feature::aggregation(
            vec![Feature::identity(transactions(), "amount")],
            mean,
            customers(),
            vec![RelationshipHop::new("customers", "transactions")],
        )
        .unwrap()
        .with_where(flag)
        .unwrap();

        let (fd, pt) = empty();
        let err = generate_description(&agg, &fd, &pt).unwrap_err();
        assert!(matches!(err, RenderError::MalformedFeature { .. }));
    }

    #[test]
    fn test_template_errors_propagate() {
        let broken = TemplatePrimitive::new("broken")
            .with_template("{} and {}")
            .into_ref();
        let f = Feature::transform(vec![Feature::identity(customers(), "age")], broken).unwrap();

        let (fd, pt) = empty();
        let err = generate_description(&f, &fd, &pt).unwrap_err();
        assert!(matches!(err, RenderError::Template(_)));
    }
}
