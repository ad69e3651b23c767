//! User-supplied override mappings.
//!
//! Overrides can target one specific object (a feature or primitive, by
//! identity) or everything sharing a name (a feature's unique name or a
//! primitive's name). Lookups always try identity first, then name.

use std::collections::HashMap;
use std::hash::Hash;

use featuredesc_core::{Feature, FeatureId, Primitive, PrimitiveId, Template};

/// Custom descriptions for features.
pub type FeatureDescriptions = Overrides<FeatureId, String>;

/// Custom description templates for primitives.
pub type PrimitiveTemplates = Overrides<PrimitiveId, Template>;

/// A mapping keyed either by object identity or by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Overrides<K: Eq + Hash, V> {
    by_key: HashMap<K, V>,
    by_name: HashMap<String, V>,
}

impl<K: Eq + Hash, V> Default for Overrides<K, V> {
    fn default() -> Self {
        Self {
            by_key: HashMap::new(),
            by_name: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, V> Overrides<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name-keyed overrides, as loaded from a metadata file.
    pub fn from_names(by_name: HashMap<String, V>) -> Self {
        Self {
            by_key: HashMap::new(),
            by_name,
        }
    }

    /// Override one object by identity.
    pub fn insert(&mut self, key: K, value: impl Into<V>) {
        self.by_key.insert(key, value.into());
    }

    /// Override every object with the given name.
    pub fn insert_name(&mut self, name: impl Into<String>, value: impl Into<V>) {
        self.by_name.insert(name.into(), value.into());
    }

    /// Override by name (builder pattern).
    pub fn with_name(mut self, name: impl Into<String>, value: impl Into<V>) -> Self {
        self.insert_name(name, value);
        self
    }

    /// Look up by identity, falling back to name.
    pub fn lookup(&self, key: &K, name: &str) -> Option<&V> {
        self.by_key.get(key).or_else(|| self.by_name.get(name))
    }

    /// Like [`Overrides::lookup`], but an empty identity entry defers to the
    /// name entry. The empty entry is still returned when no name entry exists.
    pub fn lookup_filled(
        &self,
        key: &K,
        name: &str,
        is_empty: impl Fn(&V) -> bool,
    ) -> Option<&V> {
        match self.by_key.get(key) {
            Some(value) if !is_empty(value) => Some(value),
            by_key => self.by_name.get(name).or(by_key),
        }
    }

    pub fn contains(&self, key: &K, name: &str) -> bool {
        self.lookup(key, name).is_some()
    }

    pub fn len(&self) -> usize {
        self.by_key.len() + self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty() && self.by_name.is_empty()
    }
}

impl<K: Eq + Hash + Clone, V: Clone> Overrides<K, V> {
    /// Combine with `base`; entries in `self` win on collisions.
    pub fn merged_over(&self, base: &Self) -> Self {
        let mut merged = base.clone();
        merged
            .by_key
            .extend(self.by_key.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
            .by_name
            .extend(self.by_name.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }
}

impl FeatureDescriptions {
    /// Describe this exact feature with `description`.
    pub fn insert_feature(&mut self, feature: &Feature, description: impl Into<String>) {
        self.insert(feature.id().clone(), description);
    }

    /// Description for `feature`, by identity then unique name.
    pub fn for_feature(&self, feature: &Feature) -> Option<&String> {
        self.lookup_filled(feature.id(), &feature.unique_name(), String::is_empty)
    }
}

impl PrimitiveTemplates {
    /// Use `template` for this exact primitive object.
    pub fn insert_primitive(&mut self, primitive: &dyn Primitive, template: impl Into<Template>) {
        self.insert(primitive.id(), template);
    }

    /// Template for `primitive`, by identity then name. Empty templates are
    /// skipped so the primitive's own template applies.
    pub fn for_primitive(&self, primitive: &dyn Primitive) -> Option<&Template> {
        self.lookup_filled(&primitive.id(), primitive.name(), Template::is_empty)
            .filter(|template| !template.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use featuredesc_core::{Entity, TemplatePrimitive};

    #[test]
    fn test_identity_wins_over_name() {
        let age = Feature::identity(Entity::new("customers", "id"), "age");
        let mut descriptions = FeatureDescriptions::new().with_name("customers: age", "by name");
        assert_eq!(descriptions.for_feature(&age).map(String::as_str), Some("by name"));

        descriptions.insert_feature(&age, "by identity");
        assert_eq!(
            descriptions.for_feature(&age).map(String::as_str),
            Some("by identity")
        );
        assert_eq!(descriptions.len(), 2);
    }

    #[test]
    fn test_primitive_lookup() {
        let mean = TemplatePrimitive::new("mean");
        let other_mean = TemplatePrimitive::new("mean");

        let mut templates = PrimitiveTemplates::new();
        templates.insert_primitive(&mean, "the typical {}");
        assert_eq!(
            templates.for_primitive(&mean),
            Some(&Template::from("the typical {}"))
        );
        assert!(templates.for_primitive(&other_mean).is_none());

        templates.insert_name("mean", "the mean of {}");
        assert_eq!(
            templates.for_primitive(&other_mean),
            Some(&Template::from("the mean of {}"))
        );
    }

    #[test]
    fn test_empty_identity_entry_defers_to_name() {
        let age = Feature::identity(Entity::new("customers", "id"), "age");
        let mut descriptions = FeatureDescriptions::new();
        descriptions.insert_feature(&age, "");
        assert_eq!(descriptions.for_feature(&age).map(String::as_str), Some(""));

        descriptions.insert_name("customers: age", "the age");
        assert_eq!(
            descriptions.for_feature(&age).map(String::as_str),
            Some("the age")
        );
    }

    #[test]
    fn test_empty_template_is_skipped() {
        let mean = TemplatePrimitive::new("mean");
        let mut templates = PrimitiveTemplates::new();
        templates.insert_primitive(&mean, "");
        assert!(templates.for_primitive(&mean).is_none());

        templates.insert_name("mean", "the mean of {}");
        assert_eq!(
            templates.for_primitive(&mean),
            Some(&Template::from("the mean of {}"))
        );

        let mut templates = PrimitiveTemplates::new();
        templates.insert_name("mean", Template::Sliced(vec![]));
        assert!(templates.for_primitive(&mean).is_none());
    }

    #[test]
    fn test_merged_over_prefers_self() {
        let base = FeatureDescriptions::new()
            .with_name("a", "from base")
            .with_name("b", "only in base");
        let top = FeatureDescriptions::new().with_name("a", "from top");

        let merged = top.merged_over(&base);
        let key = FeatureId::Node(u64::MAX);
        assert_eq!(merged.lookup(&key, "a").map(String::as_str), Some("from top"));
        assert_eq!(
            merged.lookup(&key, "b").map(String::as_str),
            Some("only in base")
        );
        // Inputs untouched.
        assert_eq!(base.lookup(&key, "a").map(String::as_str), Some("from base"));
    }

    #[test]
    fn test_empty_default() {
        let templates = PrimitiveTemplates::default();
        assert!(templates.is_empty());
        assert!(!templates.contains(&PrimitiveId(1), "mean"));
    }
}
