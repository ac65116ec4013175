//! Field registry: the single owner of a form instance's field state

use std::collections::{BTreeMap, HashMap};

use super::field::{Constraints, FieldValue, FormField, Property, SelectOption};
use crate::error::FormError;

/// What changed about a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Value,
    Constraints,
    Options,
}

/// One change notification recorded by the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub field: String,
    pub kind: ChangeKind,
}

/// Holds every field of one form instance.
///
/// Mutations record `FieldChange` notifications in an outbox that the owning
/// `FormState` drains and dispatches to its observers before `set` returns.
/// Writes that leave a field unchanged record nothing.
#[derive(Debug, Clone)]
pub struct FieldRegistry {
    fields: Vec<FormField>,
    index: HashMap<String, usize>,
    outbox: Vec<FieldChange>,
}

impl FieldRegistry {
    pub fn new(fields: Vec<FormField>) -> Result<Self, FormError> {
        let mut index = HashMap::with_capacity(fields.len());
        for (i, field) in fields.iter().enumerate() {
            if index.insert(field.name.clone(), i).is_some() {
                return Err(FormError::DuplicateField(field.name.clone()));
            }
        }
        Ok(Self {
            fields,
            index,
            outbox: Vec::new(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Fail with `UnknownField` unless `name` is registered
    pub fn require(&self, name: &str, context: &str) -> Result<(), FormError> {
        if self.contains(name) {
            Ok(())
        } else {
            Err(FormError::unknown(name, context))
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Result<&FormField, FormError> {
        self.index
            .get(name)
            .map(|&i| &self.fields[i])
            .ok_or_else(|| FormError::unknown(name, "field lookup"))
    }

    fn field_mut(&mut self, name: &str) -> Result<&mut FormField, FormError> {
        match self.index.get(name) {
            Some(&i) => Ok(&mut self.fields[i]),
            None => Err(FormError::unknown(name, "field update")),
        }
    }

    pub fn get(&self, name: &str) -> Result<&FieldValue, FormError> {
        self.field(name).map(|f| &f.value)
    }

    /// Store a new value. Returns false, and records nothing, if the value is
    /// identical to the current one.
    pub fn set(&mut self, name: &str, value: FieldValue) -> Result<bool, FormError> {
        let field = self.field_mut(name)?;
        if field.value == value {
            return Ok(false);
        }
        field.value = value;
        self.record(name, ChangeKind::Value);
        Ok(true)
    }

    pub fn constraints_of(&self, name: &str) -> Result<Constraints, FormError> {
        self.field(name).map(|f| f.effective)
    }

    pub fn baseline_of(&self, name: &str) -> Result<Constraints, FormError> {
        self.field(name).map(|f| f.baseline)
    }

    /// Override one effective property. Returns true if it changed.
    pub(crate) fn apply_constraint(
        &mut self,
        name: &str,
        property: Property,
        value: bool,
    ) -> Result<bool, FormError> {
        let changed = self.field_mut(name)?.effective.set(property, value);
        if changed {
            self.record(name, ChangeKind::Constraints);
        }
        Ok(changed)
    }

    /// Restore both the form default value and the baseline constraints.
    pub fn reset_to_baseline(&mut self, name: &str) -> Result<(), FormError> {
        let field = self.field_mut(name)?;
        let value_changed = field.value != field.default;
        let constraints_changed = field.effective != field.baseline;
        field.value = field.default.clone();
        field.effective = field.baseline;
        if value_changed {
            self.record(name, ChangeKind::Value);
        }
        if constraints_changed {
            self.record(name, ChangeKind::Constraints);
        }
        Ok(())
    }

    pub fn options(&self, name: &str) -> Result<&[SelectOption], FormError> {
        self.field(name).map(|f| f.options.as_slice())
    }

    pub(crate) fn replace_options(
        &mut self,
        name: &str,
        options: Vec<SelectOption>,
    ) -> Result<bool, FormError> {
        let field = self.field_mut(name)?;
        if field.options == options {
            return Ok(false);
        }
        field.options = options;
        self.record(name, ChangeKind::Options);
        Ok(true)
    }

    /// Accept the current values as the committed snapshot.
    pub fn commit(&mut self) {
        for field in &mut self.fields {
            field.committed = field.value.clone();
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.fields.iter().any(FormField::is_dirty)
    }

    /// Current values keyed by field name
    pub fn values(&self) -> BTreeMap<String, FieldValue> {
        self.fields
            .iter()
            .map(|f| (f.name.clone(), f.value.clone()))
            .collect()
    }

    pub fn violation_of(&self, name: &str) -> Result<Option<&str>, FormError> {
        self.field(name).map(FormField::violation)
    }

    pub(crate) fn mark_invalid(&mut self, name: &str, message: &str) -> Result<(), FormError> {
        let field = self.field_mut(name)?;
        // First message wins, matching what the rendering layer shows
        if field.violation.is_none() {
            field.violation = Some(message.to_string());
        }
        Ok(())
    }

    pub(crate) fn clear_invalid(&mut self) {
        for field in &mut self.fields {
            field.violation = None;
        }
    }

    /// Drain pending change notifications
    pub(crate) fn take_changes(&mut self) -> Vec<FieldChange> {
        std::mem::take(&mut self.outbox)
    }

    fn record(&mut self, name: &str, kind: ChangeKind) {
        self.outbox.push(FieldChange {
            field: name.to_string(),
            kind,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn registry() -> FieldRegistry {
        FieldRegistry::new(vec![
            FormField::text("method", "Method").with_default("manual"),
            FormField::text("address", "Address").read_only(true),
            FormField::number("mtu", "MTU", 1500),
        ])
        .unwrap()
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let result = FieldRegistry::new(vec![
            FormField::text("address", "Address"),
            FormField::text("address", "Address again"),
        ]);
        assert_eq!(
            result.unwrap_err(),
            FormError::DuplicateField("address".to_string())
        );
    }

    #[test]
    fn test_get_unknown_field_fails() {
        let reg = registry();
        assert!(matches!(
            reg.get("gateway"),
            Err(FormError::UnknownField { field, .. }) if field == "gateway"
        ));
    }

    #[test]
    fn test_set_records_change_and_dirty() {
        let mut reg = registry();
        assert!(reg.set("method", "static".into()).unwrap());
        assert!(reg.is_dirty());
        assert_eq!(
            reg.take_changes(),
            vec![FieldChange {
                field: "method".to_string(),
                kind: ChangeKind::Value,
            }]
        );
    }

    #[test]
    fn test_identical_set_is_noop() {
        let mut reg = registry();
        assert!(!reg.set("method", "manual".into()).unwrap());
        assert!(reg.take_changes().is_empty());
        assert!(!reg.is_dirty());
    }

    #[test]
    fn test_commit_clears_dirty() {
        let mut reg = registry();
        reg.set("mtu", FieldValue::Number(9000)).unwrap();
        reg.commit();
        assert!(!reg.is_dirty());
        reg.set("mtu", FieldValue::Number(1500)).unwrap();
        assert!(reg.field("mtu").unwrap().is_dirty());
    }

    #[test]
    fn test_apply_constraint_and_reset() {
        let mut reg = registry();
        assert!(reg
            .apply_constraint("address", Property::ReadOnly, false)
            .unwrap());
        reg.set("address", "10.0.0.2".into()).unwrap();
        assert!(!reg.constraints_of("address").unwrap().read_only);

        reg.take_changes();
        reg.reset_to_baseline("address").unwrap();
        assert_eq!(reg.get("address").unwrap(), &FieldValue::from(""));
        assert_eq!(
            reg.constraints_of("address").unwrap(),
            reg.baseline_of("address").unwrap()
        );
        assert_eq!(reg.take_changes().len(), 2);
    }

    #[test]
    fn test_replace_options_noop_when_equal() {
        let mut reg = registry();
        let options = vec![SelectOption::named("eth0")];
        assert!(reg.replace_options("method", options.clone()).unwrap());
        assert!(!reg.replace_options("method", options).unwrap());
    }

    #[test]
    fn test_mark_invalid_keeps_first_message() {
        let mut reg = registry();
        reg.mark_invalid("method", "first").unwrap();
        reg.mark_invalid("method", "second").unwrap();
        assert_eq!(reg.violation_of("method").unwrap(), Some("first"));
        reg.clear_invalid();
        assert_eq!(reg.violation_of("method").unwrap(), None);
    }

    #[test]
    fn test_values_snapshot() {
        let reg = registry();
        let values = reg.values();
        assert_eq!(values.get("mtu"), Some(&FieldValue::Number(1500)));
        assert_eq!(values.len(), 3);
    }
}
