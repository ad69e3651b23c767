//! Primitive description templates.
//!
//! Templates are plain format strings with positional placeholders:
//!
//! ```text
//! "the average of {}"                      -> one input phrase
//! "the sum of {0} and {1}"                 -> explicit input indices
//! "the {nth_slice} most common value of {}" -> ordinal of the requested slice
//! ```
//!
//! Multi-output primitives carry a list of templates: entry 0 describes the
//! whole output, entry `i` describes slice `i - 1`.

use serde::{Deserialize, Serialize};

use crate::error::TemplateError;

/// A description template, either one string or one per output slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Template {
    Single(String),
    Sliced(Vec<String>),
}

impl Template {
    /// An empty string or an empty list.
    pub fn is_empty(&self) -> bool {
        match self {
            Template::Single(template) => template.is_empty(),
            Template::Sliced(list) => list.is_empty(),
        }
    }

    /// Render the template for the given input phrases.
    pub fn render(
        &self,
        inputs: &[String],
        slice_num: Option<usize>,
    ) -> Result<String, TemplateError> {
        let list = match self {
            Template::Single(template) => return format_template(template, inputs, None),
            Template::Sliced(list) => list,
        };

        let first = list.first().ok_or(TemplateError::EmptyTemplate)?;
        let Some(slice) = slice_num else {
            return format_template(first, inputs, None);
        };

        let slice_index = slice + 1;
        let nth = convert_to_nth(slice_index);
        if let Some(template) = list.get(slice_index) {
            return format_template(template, inputs, Some(&nth));
        }
        // Two-entry lists share entry 1 across every slice.
        match list.get(1) {
            Some(template) if list.len() == 2 => format_template(template, inputs, Some(&nth)),
            _ => Err(TemplateError::SliceOutOfRange {
                slice,
                len: list.len(),
            }),
        }
    }
}

impl From<&str> for Template {
    fn from(value: &str) -> Self {
        Template::Single(value.to_string())
    }
}

impl From<String> for Template {
    fn from(value: String) -> Self {
        Template::Single(value)
    }
}

impl From<Vec<String>> for Template {
    fn from(value: Vec<String>) -> Self {
        Template::Sliced(value)
    }
}

/// Substitute placeholders in `template`.
///
/// `{}` takes the next input, `{N}` takes input `N`, `{nth_slice}` takes
/// `nth_slice` when given. `{{` and `}}` are literal braces.
pub fn format_template(
    template: &str,
    inputs: &[String],
    nth_slice: Option<&str>,
) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    let mut next_auto = 0usize;

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut field = String::new();
                let mut closed = false;
                for inner in chars.by_ref() {
                    if inner == '}' {
                        closed = true;
                        break;
                    }
                    field.push(inner);
                }
                if !closed {
                    return Err(TemplateError::UnbalancedBrace {
                        template: template.to_string(),
                    });
                }

                let index = if field.is_empty() {
                    next_auto += 1;
                    next_auto - 1
                } else if let Ok(index) = field.parse::<usize>() {
                    index
                } else if field == "nth_slice" {
                    match nth_slice {
                        Some(nth) => {
                            out.push_str(nth);
                            continue;
                        }
                        None => {
                            return Err(TemplateError::UnknownPlaceholder {
                                template: template.to_string(),
                                name: field,
                            })
                        }
                    }
                } else {
                    return Err(TemplateError::UnknownPlaceholder {
                        template: template.to_string(),
                        name: field,
                    });
                };

                let input = inputs.get(index).ok_or_else(|| TemplateError::MissingInput {
                    template: template.to_string(),
                    index,
                    available: inputs.len(),
                })?;
                out.push_str(input);
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => {
                return Err(TemplateError::UnbalancedBrace {
                    template: template.to_string(),
                })
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

/// Ordinal form of a positive integer: `1st`, `2nd`, `3rd`, `4th`, `11th`, `21st`.
pub fn convert_to_nth(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (1, hundreds) if hundreds != 11 => "st",
        (2, hundreds) if hundreds != 12 => "nd",
        (3, hundreds) if hundreds != 13 => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}
