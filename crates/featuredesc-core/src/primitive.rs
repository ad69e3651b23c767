//! Primitives: the functions underlying features.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TemplateError;
use crate::template::{convert_to_nth, Template};

static NEXT_PRIMITIVE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a primitive object.
///
/// Every constructed primitive gets a fresh id. Features sharing the same
/// `Arc` share the id, which is what identity-keyed template overrides match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PrimitiveId(pub u64);

impl PrimitiveId {
    /// Allocate a new, process-unique id.
    pub fn next() -> Self {
        Self(NEXT_PRIMITIVE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Shared handle to a primitive.
pub type PrimitiveRef = Arc<dyn Primitive>;

/// A computational function underlying a feature (average, count, ...).
pub trait Primitive: fmt::Debug + Send + Sync {
    /// Object identity of this primitive.
    fn id(&self) -> PrimitiveId;

    /// Lowercase primitive name, e.g. `"mean"`.
    fn name(&self) -> &str;

    /// Literal value for scalar primitives; used in "where" clauses.
    fn value(&self) -> Option<&Value> {
        None
    }

    /// The primitive's own English template, if it has one.
    fn description_template(&self) -> Option<&Template> {
        None
    }

    /// How many output columns the primitive produces.
    fn number_output_features(&self) -> usize {
        1
    }

    /// Render the English fragment for this primitive applied to `inputs`.
    ///
    /// `template_override` wins over the primitive's own template. Without any
    /// template a generic "the result of applying NAME to ..." phrase is used.
    fn get_description(
        &self,
        inputs: &[String],
        slice_num: Option<usize>,
        template_override: Option<&Template>,
    ) -> Result<String, TemplateError> {
        if let Some(template) = template_override.or_else(|| self.description_template()) {
            return template.render(inputs, slice_num);
        }

        let name = self.name().to_uppercase();
        let joined = inputs.join(", ");
        Ok(match slice_num {
            Some(slice) => format!(
                "the {} output from applying {} to {}",
                convert_to_nth(slice + 1),
                name,
                joined
            ),
            None => format!("the result of applying {name} to {joined}"),
        })
    }

    /// Name of a feature built from this primitive over `base_names`.
    fn generate_name(&self, base_names: &[String]) -> String {
        match self.value() {
            Some(value) => format!("{} = {}", base_names.join(", "), display_value(value)),
            None => format!("{}({})", self.name().to_uppercase(), base_names.join(", ")),
        }
    }
}

/// Plain-text rendering of a primitive value.
///
/// Strings are unquoted and booleans and null read `True`, `False` and
/// `None`. Numbers, arrays and objects print as JSON text.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Null => "None".to_string(),
        other => other.to_string(),
    }
}

/// Data-driven primitive: a name plus an optional template and value.
#[derive(Debug, Clone)]
pub struct TemplatePrimitive {
    id: PrimitiveId,
    name: String,
    description_template: Option<Template>,
    value: Option<Value>,
    operator: Option<String>,
    number_output_features: usize,
}

impl TemplatePrimitive {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PrimitiveId::next(),
            name: name.into(),
            description_template: None,
            value: None,
            operator: None,
            number_output_features: 1,
        }
    }

    pub fn with_template(mut self, template: impl Into<Template>) -> Self {
        self.description_template = Some(template.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Comparison symbol used when naming a scalar feature, e.g. `!=`.
    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    pub fn with_outputs(mut self, number_output_features: usize) -> Self {
        self.number_output_features = number_output_features.max(1);
        self
    }

    /// Wrap into a shared handle.
    pub fn into_ref(self) -> PrimitiveRef {
        Arc::new(self)
    }
}

impl Primitive for TemplatePrimitive {
    fn id(&self) -> PrimitiveId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    fn description_template(&self) -> Option<&Template> {
        self.description_template.as_ref()
    }

    fn number_output_features(&self) -> usize {
        self.number_output_features
    }

    fn generate_name(&self, base_names: &[String]) -> String {
        let joined = base_names.join(", ");
        match &self.value {
            Some(value) => format!(
                "{} {} {}",
                joined,
                self.operator.as_deref().unwrap_or("="),
                display_value(value)
            ),
            None => format!("{}({})", self.name.to_uppercase(), joined),
        }
    }
}
