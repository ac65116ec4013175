//! Form state: one registry plus the evaluators bound to it

use std::collections::{BTreeMap, BTreeSet};

use uuid::Uuid;

use super::cascade::CascadeResolver;
use super::correlation::{CorrelationEngine, FieldObserver};
use super::definition::FormDefinition;
use super::field::{Constraints, FieldValue, FormField, SelectOption};
use super::registry::{ChangeKind, FieldChange, FieldRegistry};
use super::validator::{CrossFieldValidator, Violation};
use crate::error::FormError;

/// Upper bound on propagation passes per mutation
const MAX_PASSES: usize = 16;

/// Trait for common form operations
pub trait Form {
    fn field_count(&self) -> usize;
    fn active_field(&self) -> usize;
    fn set_active_field(&mut self, index: usize);
    fn next_field(&mut self) {
        let count = self.field_count();
        if count == 0 {
            return;
        }
        let current = self.active_field();
        self.set_active_field((current + 1) % count);
    }
    fn prev_field(&mut self) {
        let count = self.field_count();
        if count == 0 {
            return;
        }
        let current = self.active_field();
        if current == 0 {
            self.set_active_field(count - 1);
        } else {
            self.set_active_field(current - 1);
        }
    }
    fn get_field(&self, index: usize) -> Option<&FormField>;
}

/// Everything one mutation changed, including what propagation changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    changes: Vec<FieldChange>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn changes(&self) -> &[FieldChange] {
        &self.changes
    }

    /// Names of all touched fields
    pub fn fields(&self) -> BTreeSet<&str> {
        self.changes.iter().map(|c| c.field.as_str()).collect()
    }

    pub fn touched(&self, field: &str, kind: ChangeKind) -> bool {
        self.changes.iter().any(|c| c.field == field && c.kind == kind)
    }
}

/// A live form instance
///
/// Every mutation goes through here so that the correlation engine and the
/// cascades see it before the call returns.
#[derive(Debug)]
pub struct FormState {
    pub id: Uuid,
    pub title: String,
    registry: FieldRegistry,
    /// Correlation first, then cascades in declaration order
    observers: Vec<Box<dyn FieldObserver>>,
    validator: CrossFieldValidator,
    pub active_field_index: usize,
}

impl FormState {
    pub fn build(definition: FormDefinition) -> Result<Self, FormError> {
        let FormDefinition {
            title,
            fields,
            rules,
            cascades,
            exclusions,
            matches,
        } = definition;

        let registry = FieldRegistry::new(fields)?;
        let mut observers: Vec<Box<dyn FieldObserver>> = Vec::new();
        if !rules.is_empty() {
            observers.push(Box::new(CorrelationEngine::new(rules, &registry)?));
        }
        for cascade in cascades {
            observers.push(Box::new(CascadeResolver::new(cascade, &registry)?));
        }
        let validator = CrossFieldValidator::new(exclusions, matches, &registry)?;

        let mut form = Self {
            id: Uuid::new_v4(),
            title,
            registry,
            observers,
            validator,
            active_field_index: 0,
        };
        form.refresh()?;
        form.registry.commit();
        tracing::info!(
            form = %form.title,
            fields = form.registry.len(),
            observers = form.observers.len(),
            "form built"
        );
        Ok(form)
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    pub fn fields(&self) -> &[FormField] {
        self.registry.fields()
    }

    pub fn field(&self, name: &str) -> Result<&FormField, FormError> {
        self.registry.field(name)
    }

    pub fn get(&self, name: &str) -> Result<&FieldValue, FormError> {
        self.registry.get(name)
    }

    /// Store a value and propagate until nothing else changes.
    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<ChangeSet, FormError> {
        if !self.registry.set(name, value.into())? {
            return Ok(ChangeSet::default());
        }
        let initial = self.registry.take_changes();
        self.propagate(initial)
    }

    pub fn constraints_of(&self, name: &str) -> Result<Constraints, FormError> {
        self.registry.constraints_of(name)
    }

    pub fn options(&self, name: &str) -> Result<&[SelectOption], FormError> {
        self.registry.options(name)
    }

    pub fn reset_to_baseline(&mut self, name: &str) -> Result<ChangeSet, FormError> {
        self.registry.reset_to_baseline(name)?;
        let initial = self.registry.take_changes();
        let mut changes = self.propagate(initial)?;
        // Reset may have dropped a rule override that still holds
        changes.changes.extend(self.refresh()?.changes);
        Ok(changes)
    }

    /// Populate the form from stored data, then treat the result as committed.
    ///
    /// Values are written raw and evaluated once at the end, so that the
    /// order of `values` does not matter (a stored bond primary survives even
    /// if it arrives before the slaves it depends on). Unknown names are
    /// skipped.
    pub fn load(&mut self, values: BTreeMap<String, FieldValue>) -> Result<(), FormError> {
        for (name, value) in values {
            if self.registry.contains(&name) {
                self.registry.set(&name, value)?;
            } else {
                tracing::debug!(form = %self.title, field = %name, "ignoring unknown stored field");
            }
        }
        self.registry.take_changes();
        self.refresh()?;
        self.registry.commit();
        Ok(())
    }

    /// Seed a select's option list from the data layer, keeping the current
    /// value (or, for multi-selects, each chosen item) only if it is still
    /// offered.
    pub fn set_options(
        &mut self,
        name: &str,
        options: Vec<SelectOption>,
    ) -> Result<ChangeSet, FormError> {
        let prior = self.registry.get(name)?.clone();
        let next = match &prior {
            FieldValue::List(items) => FieldValue::List(
                items
                    .iter()
                    .filter(|item| options.iter().any(|o| o.value.as_text() == item.as_str()))
                    .cloned()
                    .collect(),
            ),
            _ if options.iter().any(|o| o.value == prior) => prior.clone(),
            _ => prior.cleared(),
        };
        self.registry.replace_options(name, options)?;
        self.registry.set(name, next)?;
        let initial = self.registry.take_changes();
        self.propagate(initial)
    }

    /// Run every observer against the current values, as if every field had
    /// just changed.
    pub fn refresh(&mut self) -> Result<ChangeSet, FormError> {
        let all: BTreeSet<String> = self.registry.fields().iter().map(|f| f.name.clone()).collect();
        for observer in &self.observers {
            observer.on_change(&mut self.registry, &all)?;
        }
        let initial = self.registry.take_changes();
        self.propagate(initial)
    }

    pub fn commit(&mut self) {
        self.registry.commit();
        tracing::info!(form = %self.title, "values committed");
    }

    pub fn is_dirty(&self) -> bool {
        self.registry.is_dirty()
    }

    pub fn values(&self) -> BTreeMap<String, FieldValue> {
        self.registry.values()
    }

    /// Check violations without marking fields
    pub fn check(&self) -> Vec<Violation> {
        self.validator.check(&self.registry)
    }

    /// Submit-time check; refreshes the violation markers on every field
    pub fn validate(&mut self) -> Vec<Violation> {
        let violations = self.validator.validate(&mut self.registry);
        if !violations.is_empty() {
            tracing::debug!(form = %self.title, count = violations.len(), "validation failed");
        }
        violations
    }

    pub fn violation_of(&self, name: &str) -> Result<Option<&str>, FormError> {
        self.registry.violation_of(name)
    }

    pub fn active(&self) -> Option<&FormField> {
        self.get_field(self.active_field_index)
    }

    fn propagate(&mut self, initial: Vec<FieldChange>) -> Result<ChangeSet, FormError> {
        let mut all = initial.clone();
        let mut pending = initial;
        for pass in 0..MAX_PASSES {
            let changed: BTreeSet<String> = pending
                .iter()
                .filter(|c| c.kind == ChangeKind::Value)
                .map(|c| c.field.clone())
                .collect();
            if changed.is_empty() {
                return Ok(ChangeSet { changes: all });
            }
            for observer in &self.observers {
                if changed.iter().any(|f| observer.watches(f)) {
                    tracing::trace!(observer = observer.name(), pass, "dispatching changes");
                    observer.on_change(&mut self.registry, &changed)?;
                }
            }
            pending = self.registry.take_changes();
            all.extend(pending.iter().cloned());
        }
        tracing::warn!(
            form = %self.title,
            passes = MAX_PASSES,
            "propagation did not settle; check the form for cascade cycles"
        );
        Ok(ChangeSet { changes: all })
    }
}

impl Form for FormState {
    fn field_count(&self) -> usize {
        self.registry.len()
    }
    fn active_field(&self) -> usize {
        self.active_field_index
    }
    fn set_active_field(&mut self, index: usize) {
        self.active_field_index = index;
    }
    fn get_field(&self, index: usize) -> Option<&FormField> {
        self.registry.fields().get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::forms::cascade::CascadeSpec;
    use crate::state::forms::rule::{CorrelationRule, PropertyOp};
    use crate::state::forms::validator::ExclusionConstraint;
    use pretty_assertions::assert_eq;

    fn primary_options(values: &[&FieldValue]) -> Vec<SelectOption> {
        match values {
            [slaves, mode] if matches!(mode.as_number(), Some(1 | 5 | 6)) => slaves
                .as_list()
                .iter()
                .map(|s| SelectOption::named(s))
                .collect(),
            _ => vec![SelectOption::new("None", "")],
        }
    }

    fn bond() -> FormDefinition {
        FormDefinition::new("Bond")
            .field(FormField::multi_select("slaves", "Slaves", vec![]).required())
            .field(FormField::select("bondmode", "Mode", vec![], 1))
            .field(FormField::select(
                "bondprimary",
                "Primary",
                vec![SelectOption::new("None", "")],
                "",
            ))
            .rule(
                CorrelationRule::new(["bondprimary"])
                    .when_any("bondmode", [1, 5, 6])
                    .with(PropertyOp::REQUIRED),
            )
            .cascade(CascadeSpec::new(
                &["slaves", "bondmode"],
                "bondprimary",
                primary_options,
            ))
    }

    mod build {
        use super::*;

        #[test]
        fn test_build_evaluates_initial_state() {
            let form = FormState::build(bond()).unwrap();
            assert!(form.constraints_of("bondprimary").unwrap().is_required());
            assert!(form.options("bondprimary").unwrap().is_empty());
            assert!(!form.is_dirty());
        }

        #[test]
        fn test_build_rejects_unknown_cascade_driver() {
            let def = bond().cascade(CascadeSpec::new(&["mode"], "bondprimary", primary_options));
            assert!(matches!(
                FormState::build(def),
                Err(FormError::UnknownField { field, .. }) if field == "mode"
            ));
        }

        #[test]
        fn test_build_rejects_unknown_exclusion_field() {
            let def = bond().exclusion(ExclusionConstraint::new("minute", "everynminute", "*"));
            assert!(FormState::build(def).is_err());
        }
    }

    mod propagation {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_set_runs_cascade_and_rules() {
            let mut form = FormState::build(bond()).unwrap();
            form.set("slaves", FieldValue::from(&["eth1", "eth2"][..])).unwrap();
            form.set("bondprimary", "eth2").unwrap();

            let changes = form.set("bondmode", 0).unwrap();
            assert_eq!(form.get("bondprimary").unwrap(), &FieldValue::from(""));
            assert_eq!(
                form.options("bondprimary").unwrap(),
                &[SelectOption::new("None", "")]
            );
            assert!(!form.constraints_of("bondprimary").unwrap().is_required());
            assert!(changes.touched("bondprimary", ChangeKind::Value));
            assert!(changes.touched("bondprimary", ChangeKind::Constraints));
        }

        #[test]
        fn test_identical_set_reports_nothing() {
            let mut form = FormState::build(bond()).unwrap();
            assert!(form.set("bondmode", 1).unwrap().is_empty());
        }

        #[test]
        fn test_set_unknown_field_fails() {
            let mut form = FormState::build(bond()).unwrap();
            assert!(form.set("bondmod", 1).is_err());
        }

        #[test]
        fn test_reset_restores_default_and_reapplies_rules() {
            let mut form = FormState::build(bond()).unwrap();
            form.set("bondmode", 0).unwrap();
            form.reset_to_baseline("bondmode").unwrap();
            assert_eq!(form.get("bondmode").unwrap(), &FieldValue::Number(1));
            assert!(form.constraints_of("bondprimary").unwrap().is_required());
        }

        #[test]
        fn test_reset_keeps_live_override() {
            let mut form = FormState::build(bond()).unwrap();
            form.reset_to_baseline("bondprimary").unwrap();
            // mode is still 1, so the rule still holds
            assert!(form.constraints_of("bondprimary").unwrap().is_required());
        }
    }

    mod load {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_load_is_order_independent() {
            let mut form = FormState::build(bond()).unwrap();
            let values = BTreeMap::from([
                ("bondprimary".to_string(), FieldValue::from("eth2")),
                ("bondmode".to_string(), FieldValue::Number(5)),
                ("slaves".to_string(), FieldValue::from(&["eth1", "eth2"][..])),
                ("mystery".to_string(), FieldValue::Bool(true)),
            ]);
            form.load(values).unwrap();
            assert_eq!(form.get("bondprimary").unwrap(), &FieldValue::from("eth2"));
            assert_eq!(form.options("bondprimary").unwrap().len(), 2);
            assert!(!form.is_dirty());
        }

        #[test]
        fn test_set_options_clears_missing_value() {
            let mut form = FormState::build(bond()).unwrap();
            form.set("slaves", FieldValue::from(&["eth1"][..])).unwrap();
            form.set_options("slaves", vec![SelectOption::named("eth3")])
                .unwrap();
            assert_eq!(form.get("slaves").unwrap(), &FieldValue::List(vec![]));
        }
    }

    mod navigation {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_next_and_prev_wrap() {
            let mut form = FormState::build(bond()).unwrap();
            form.prev_field();
            assert_eq!(form.active_field(), 2);
            form.next_field();
            assert_eq!(form.active_field(), 0);
            assert_eq!(form.active().map(|f| f.name.as_str()), Some("slaves"));
        }
    }
}
