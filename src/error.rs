//! Error types for form construction and field access.

use crate::state::Property;
use thiserror::Error;

/// Errors raised by the form-state engine.
///
/// Everything except `UnknownField` on a runtime lookup is an authoring
/// defect in a panel definition and is detected while the form is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// A rule, cascade, constraint or lookup names a field the form lacks.
    #[error("unknown field '{field}' referenced by {context}")]
    UnknownField { field: String, context: String },

    /// Two field descriptors share a name.
    #[error("field '{0}' is declared more than once")]
    DuplicateField(String),

    /// A property token is neither `allowBlank` nor `readOnly`.
    #[error("unknown property '{0}' (expected allowBlank or readOnly)")]
    UnknownProperty(String),

    /// A rule has no targets or no property operations.
    #[error("correlation rule #{rule} has no targets or no property operations")]
    EmptyRule { rule: usize },

    /// Two rules claim the same property of the same field and can both be
    /// satisfied at once.
    #[error(
        "correlation rules #{first} and #{second} both set {property} on '{field}' under overlapping conditions"
    )]
    ConflictingRules {
        field: String,
        property: Property,
        first: usize,
        second: usize,
    },
}

impl FormError {
    pub(crate) fn unknown(field: &str, context: impl Into<String>) -> Self {
        FormError::UnknownField {
            field: field.to_string(),
            context: context.into(),
        }
    }
}
