//! Registry of primitives and the standard primitive library.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::primitive::{display_value, PrimitiveRef, TemplatePrimitive};

/// Primitives addressable by name.
#[derive(Clone, Default)]
pub struct PrimitiveRegistry {
    primitives: BTreeMap<String, PrimitiveRef>,
}

impl PrimitiveRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a primitive under its own name, replacing any previous one.
    pub fn register(&mut self, primitive: PrimitiveRef) {
        self.primitives
            .insert(primitive.name().to_string(), primitive);
    }

    /// Register a primitive (builder pattern).
    pub fn with_primitive(mut self, primitive: PrimitiveRef) -> Self {
        self.register(primitive);
        self
    }

    /// Get a primitive by name. Repeated lookups return the same object.
    pub fn get(&self, name: &str) -> Option<PrimitiveRef> {
        self.primitives.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.primitives.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.primitives.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}

impl fmt::Debug for PrimitiveRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrimitiveRegistry")
            .field("primitive_count", &self.primitives.len())
            .field("primitives", &self.primitives.keys().collect::<Vec<_>>())
            .finish()
    }
}

const AGGREGATIONS: &[(&str, &str)] = &[
    ("all", "whether all of {} are true"),
    ("any", "whether any of {} are true"),
    ("count", "the number"),
    ("first", "the first instance of {}"),
    ("last", "the last instance of {}"),
    ("max", "the maximum of {}"),
    ("mean", "the average of {}"),
    ("median", "the median of {}"),
    ("min", "the minimum of {}"),
    ("mode", "the most frequently occurring value of {}"),
    ("num_true", "the number of times {} is true"),
    ("num_unique", "the number of unique elements in {}"),
    ("percent_true", "the percentage of true values in {}"),
    ("skew", "the skewness of {}"),
    ("std", "the standard deviation of {}"),
    ("sum", "the sum of {}"),
];

const TRANSFORMS: &[(&str, &str)] = &[
    ("absolute", "the absolute value of {}"),
    ("add_numeric", "the sum of {} and {}"),
    ("cum_count", "the cumulative count"),
    ("cum_max", "the cumulative maximum of {}"),
    ("cum_mean", "the cumulative mean of {}"),
    ("cum_min", "the cumulative minimum of {}"),
    ("cum_sum", "the cumulative sum of {}"),
    ("day", "the day of {}"),
    ("divide_numeric", "the ratio of {} to {}"),
    ("hour", "the hour value of {}"),
    ("is_null", "whether {} is null"),
    ("month", "the month of {}"),
    ("multiply_numeric", "the product of {} and {}"),
    ("negate", "the negation of {}"),
    ("not", "the negation of {}"),
    ("subtract_numeric", "the result of {} minus {}"),
    ("weekday", "the day of the week of {}"),
    ("year", "the year of {}"),
];

/// The standard primitive library with English templates.
///
/// Each call builds fresh primitive objects.
pub fn standard_primitives() -> PrimitiveRegistry {
    let mut registry = PrimitiveRegistry::new();
    for (name, template) in AGGREGATIONS.iter().chain(TRANSFORMS) {
        registry.register(TemplatePrimitive::new(*name).with_template(*template).into_ref());
    }
    registry.register(n_most_common(3));
    registry
}

/// The `n` most common values, one output per rank.
pub fn n_most_common(n: usize) -> PrimitiveRef {
    let n = n.max(1);
    let mut templates = Vec::with_capacity(n + 1);
    templates.push(format!("the {n} most common values of {{}}"));
    templates.push("the most common value of {}".to_string());
    for _ in 1..n {
        templates.push("the {nth_slice} most common value of {}".to_string());
    }
    TemplatePrimitive::new("n_most_common")
        .with_template(templates)
        .with_outputs(n)
        .into_ref()
}

/// Scalar comparisons: name, English verb, naming operator.
const SCALARS: &[(&str, &str, &str)] = &[
    ("equal_scalar", "equals", "="),
    ("not_equal_scalar", "does not equal", "!="),
    ("greater_than_scalar", "is greater than", ">"),
    ("greater_than_equal_to_scalar", "is greater than or equal to", ">="),
    ("less_than_scalar", "is less than", "<"),
    ("less_than_equal_to_scalar", "is less than or equal to", "<="),
];

/// Whether `name` is a scalar primitive that must be built with a value.
pub fn is_scalar_primitive(name: &str) -> bool {
    SCALARS.iter().any(|(scalar, _, _)| *scalar == name)
}

/// Build the scalar primitive `name` comparing against `value`.
///
/// Scalar primitives carry their value, so they are built per feature rather
/// than shared through the registry. Returns `None` for other names.
pub fn scalar_primitive(name: &str, value: impl Into<Value>) -> Option<PrimitiveRef> {
    let (name, verb, operator) = SCALARS.iter().find(|(scalar, _, _)| *scalar == name)?;
    let value = value.into();
    let template = format!("whether {{}} {} {}", verb, display_value(&value));
    Some(
        TemplatePrimitive::new(*name)
            .with_template(template)
            .with_value(value)
            .with_operator(*operator)
            .into_ref(),
    )
}

/// Scalar equality test, usable as an aggregation's where-filter.
pub fn equal_scalar(value: impl Into<Value>) -> PrimitiveRef {
    let value = value.into();
    let template = format!("whether {{}} equals {}", display_value(&value));
    TemplatePrimitive::new("equal_scalar")
        .with_template(template)
        .with_value(value)
        .with_operator("=")
        .into_ref()
}
