//! Submit-time cross-field validation

use serde::{Deserialize, Serialize};

use super::field::FieldValue;
use super::registry::FieldRegistry;
use crate::error::FormError;

const RANGE_NOT_ALLOWED: &str = "Ranges of numbers are not allowed";
const REQUIRED: &str = "This field is required";

/// User-facing validation result attached to one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// `wildcard_field == sentinel` and `flag_field == true` may not hold together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionConstraint {
    pub wildcard_field: String,
    pub flag_field: String,
    pub sentinel: FieldValue,
    pub message: String,
}

impl ExclusionConstraint {
    pub fn new(wildcard_field: &str, flag_field: &str, sentinel: impl Into<FieldValue>) -> Self {
        Self {
            wildcard_field: wildcard_field.to_string(),
            flag_field: flag_field.to_string(),
            sentinel: sentinel.into(),
            message: RANGE_NOT_ALLOWED.to_string(),
        }
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.message = message.to_string();
        self
    }

    pub fn is_violated(&self, registry: &FieldRegistry) -> Result<bool, FormError> {
        Ok(*registry.get(&self.wildcard_field)? == self.sentinel
            && registry.get(&self.flag_field)?.is_true())
    }
}

/// Two fields must hold the same value, e.g. a password and its confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchConstraint {
    pub field: String,
    pub confirm_field: String,
    pub message: String,
}

impl MatchConstraint {
    pub fn new(field: &str, confirm_field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            confirm_field: confirm_field.to_string(),
            message: message.to_string(),
        }
    }

    pub fn is_violated(&self, registry: &FieldRegistry) -> Result<bool, FormError> {
        Ok(registry.get(&self.field)? != registry.get(&self.confirm_field)?)
    }
}

/// Checks a form before submission. Never mutates values; only attaches and
/// clears violation markers.
#[derive(Debug, Clone, Default)]
pub struct CrossFieldValidator {
    exclusions: Vec<ExclusionConstraint>,
    matches: Vec<MatchConstraint>,
}

impl CrossFieldValidator {
    /// Bind constraints to a registry, failing fast on unknown fields.
    pub fn new(
        exclusions: Vec<ExclusionConstraint>,
        matches: Vec<MatchConstraint>,
        registry: &FieldRegistry,
    ) -> Result<Self, FormError> {
        for exclusion in &exclusions {
            let context = format!("exclusion on '{}'", exclusion.wildcard_field);
            registry.require(&exclusion.wildcard_field, &context)?;
            registry.require(&exclusion.flag_field, &context)?;
        }
        for constraint in &matches {
            let context = format!("match constraint on '{}'", constraint.field);
            registry.require(&constraint.field, &context)?;
            registry.require(&constraint.confirm_field, &context)?;
        }
        Ok(Self {
            exclusions,
            matches,
        })
    }

    pub fn exclusions(&self) -> &[ExclusionConstraint] {
        &self.exclusions
    }

    /// Compute violations without touching the registry.
    ///
    /// Required fields are checked first, against their effective
    /// constraints; the cross-field constraints only run once every required
    /// field has a value.
    pub fn check(&self, registry: &FieldRegistry) -> Vec<Violation> {
        let required: Vec<Violation> = registry
            .fields()
            .iter()
            .filter(|f| f.effective().is_required() && f.value.is_blank())
            .map(|f| Violation::new(&f.name, REQUIRED))
            .collect();
        if !required.is_empty() {
            return required;
        }

        let mut violations = Vec::new();
        // Fields were verified at construction, so lookups cannot fail
        for exclusion in &self.exclusions {
            if exclusion.is_violated(registry).unwrap_or(false) {
                violations.push(Violation::new(&exclusion.wildcard_field, &exclusion.message));
                violations.push(Violation::new(&exclusion.flag_field, &exclusion.message));
            }
        }
        for constraint in &self.matches {
            if constraint.is_violated(registry).unwrap_or(false) {
                violations.push(Violation::new(&constraint.field, &constraint.message));
                violations.push(Violation::new(&constraint.confirm_field, &constraint.message));
            }
        }
        violations
    }

    /// Check and refresh the violation markers: fields no longer in
    /// violation lose their marker.
    pub fn validate(&self, registry: &mut FieldRegistry) -> Vec<Violation> {
        let violations = self.check(registry);
        registry.clear_invalid();
        for violation in &violations {
            if let Err(err) = registry.mark_invalid(&violation.field, &violation.message) {
                tracing::warn!(%err, "violation for unregistered field");
            }
        }
        violations
    }
}
