//! Structured validation issues returned in 400 responses

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use validator::{ValidationErrors, ValidationErrorsKind};

/// Property name used when an issue concerns the payload as a whole
pub const ROOT_PROPERTY: &str = "$";

/// One failing property of a request payload
///
/// Serialized as:
/// ```json
/// { "property": "name", "value": 123, "constraints": { "type": "..." } }
/// ```
/// Bulk payloads add the `index` of the offending element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub property: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,

    pub value: Value,

    /// Failed rule code -> human readable message
    pub constraints: BTreeMap<String, String>,
}

impl ValidationIssue {
    pub fn new(
        property: impl Into<String>,
        value: Value,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let mut constraints = BTreeMap::new();
        constraints.insert(code.into(), message.into());
        Self {
            property: property.into(),
            index: None,
            value,
            constraints,
        }
    }

    pub fn at_index(mut self, index: Option<usize>) -> Self {
        self.index = index;
        self
    }

    /// Issue for a payload that could not be deserialized into the target shape
    pub fn from_shape_error(payload: &Value, error: &serde_json::Error) -> Self {
        Self::new(ROOT_PROPERTY, payload.clone(), "type", error.to_string())
    }

    /// Flatten `validator` errors into one issue per failing property.
    ///
    /// Nested structs and lists produce dotted (`address.city`) and indexed
    /// (`items[2].sku`) property paths.
    pub fn from_validation_errors(payload: &Value, errors: &ValidationErrors) -> Vec<Self> {
        let mut issues = Vec::new();
        collect(payload, errors, "", &mut issues);
        issues.sort_by(|a, b| a.property.cmp(&b.property));
        issues
    }
}

fn collect(payload: &Value, errors: &ValidationErrors, prefix: &str, out: &mut Vec<ValidationIssue>) {
    for (field, kind) in errors.errors() {
        let field: &str = field.as_ref();
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        let value = payload.get(field).cloned().unwrap_or(Value::Null);

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let constraints = field_errors
                    .iter()
                    .map(|error| {
                        let message = error
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("{} failed '{}' validation", path, error.code));
                        (error.code.to_string(), message)
                    })
                    .collect();
                out.push(ValidationIssue {
                    property: path,
                    index: None,
                    value,
                    constraints,
                });
            }
            ValidationErrorsKind::Struct(nested) => {
                collect(&value, nested, &path, out);
            }
            ValidationErrorsKind::List(items) => {
                for (position, nested) in items {
                    let item = value.get(*position).cloned().unwrap_or(Value::Null);
                    collect(&item, nested, &format!("{}[{}]", path, position), out);
                }
            }
        }
    }
}
