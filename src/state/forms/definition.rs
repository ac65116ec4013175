//! Declarative description of one form

use super::cascade::CascadeSpec;
use super::field::FormField;
use super::rule::{CorrelationRule, RuleSet};
use super::validator::{ExclusionConstraint, MatchConstraint};

/// Everything needed to build a `FormState`: fields, correlation rules,
/// cascades and cross-field constraints
#[derive(Debug, Clone, Default)]
pub struct FormDefinition {
    pub title: String,
    pub fields: Vec<FormField>,
    pub rules: RuleSet,
    pub cascades: Vec<CascadeSpec>,
    pub exclusions: Vec<ExclusionConstraint>,
    pub matches: Vec<MatchConstraint>,
}

impl FormDefinition {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }

    pub fn field(mut self, field: FormField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = FormField>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn rule(mut self, rule: CorrelationRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(mut self, rules: impl IntoIterator<Item = CorrelationRule>) -> Self {
        for rule in rules {
            self.rules.push(rule);
        }
        self
    }

    pub fn cascade(mut self, cascade: CascadeSpec) -> Self {
        self.cascades.push(cascade);
        self
    }

    pub fn exclusion(mut self, exclusion: ExclusionConstraint) -> Self {
        self.exclusions.push(exclusion);
        self
    }

    pub fn must_match(mut self, constraint: MatchConstraint) -> Self {
        self.matches.push(constraint);
        self
    }

    /// Change a field declared earlier, e.g. to make it read-only in edit mode
    pub fn adjust(mut self, name: &str, f: impl FnOnce(FormField) -> FormField) -> Self {
        if let Some(pos) = self.fields.iter().position(|field| field.name == name) {
            let field = self.fields.remove(pos);
            self.fields.insert(pos, f(field));
        }
        self
    }
}
