//! Correlation engine: keeps effective constraints in line with the rule set

use std::collections::{BTreeMap, BTreeSet};

use super::field::Property;
use super::registry::FieldRegistry;
use super::rule::RuleSet;
use crate::error::FormError;

/// Subscription contract between the registry's owner and the components
/// that react to value changes.
///
/// Observers run synchronously, in registration order, within the `set` that
/// caused the change. They may mutate the registry; anything they change is
/// dispatched in the next propagation pass.
pub trait FieldObserver: std::fmt::Debug {
    /// Short name used in log output
    fn name(&self) -> &str;

    /// Whether a change of `field` concerns this observer
    fn watches(&self, field: &str) -> bool;

    /// React to the fields whose values changed in this pass
    fn on_change(
        &self,
        registry: &mut FieldRegistry,
        changed: &BTreeSet<String>,
    ) -> Result<(), FormError>;
}

/// Applies a rule set to a registry
#[derive(Debug, Clone)]
pub struct CorrelationEngine {
    rules: RuleSet,
    watched: BTreeSet<String>,
}

impl CorrelationEngine {
    /// Bind a rule set to a registry, failing fast on authoring defects.
    pub fn new(rules: RuleSet, registry: &FieldRegistry) -> Result<Self, FormError> {
        rules.check(registry)?;
        let watched = rules
            .watched_fields()
            .into_iter()
            .map(str::to_string)
            .collect();
        Ok(Self { rules, watched })
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Recompute every claimed (field, property) pair from one snapshot of
    /// the condition values and apply the result. Returns the fields whose
    /// effective constraints changed.
    ///
    /// A pair starts at its baseline and only a satisfied rule moves it, so
    /// nothing survives once the rule that set it stops holding.
    pub fn evaluate(&self, registry: &mut FieldRegistry) -> Result<Vec<String>, FormError> {
        let satisfied = self
            .rules
            .rules()
            .iter()
            .map(|rule| rule.is_satisfied(registry))
            .collect::<Result<Vec<_>, _>>()?;

        let mut desired: BTreeMap<(&str, Property), bool> = BTreeMap::new();
        for (rule, &is_satisfied) in self.rules.rules().iter().zip(&satisfied) {
            for target in &rule.targets {
                let baseline = registry.baseline_of(target)?;
                for op in &rule.ops {
                    let slot = desired
                        .entry((target.as_str(), op.property))
                        .or_insert_with(|| baseline.get(op.property));
                    if is_satisfied {
                        *slot = op.value();
                    }
                }
            }
        }

        let mut changed = Vec::new();
        for ((target, property), value) in desired {
            if registry.apply_constraint(target, property, value)? {
                tracing::debug!(field = target, %property, value, "constraint updated");
                if !changed.iter().any(|c| c == target) {
                    changed.push(target.to_string());
                }
            }
        }
        Ok(changed)
    }
}

impl FieldObserver for CorrelationEngine {
    fn name(&self) -> &str {
        "correlation"
    }

    fn watches(&self, field: &str) -> bool {
        self.watched.contains(field)
    }

    fn on_change(
        &self,
        registry: &mut FieldRegistry,
        _changed: &BTreeSet<String>,
    ) -> Result<(), FormError> {
        self.evaluate(registry).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::forms::field::{Constraints, FieldValue, FormField};
    use crate::state::forms::rule::{CorrelationRule, PropertyOp};
    use pretty_assertions::assert_eq;

    fn registry() -> FieldRegistry {
        FieldRegistry::new(vec![
            FormField::text("method", "Method").with_default("manual"),
            FormField::text("address", "Address").read_only(true),
            FormField::text("netmask", "Netmask").read_only(true),
            FormField::text("gateway", "Gateway").read_only(true),
            FormField::checkbox("enable", "Enable", false),
            FormField::checkbox("authenable", "Authentication", false),
            FormField::text("username", "Username").read_only(true),
        ])
        .unwrap()
    }

    fn static_rules() -> RuleSet {
        RuleSet::new(vec![
            CorrelationRule::new(["address", "netmask"])
                .when("method", "static")
                .with(PropertyOp::REQUIRED)
                .with(PropertyOp::EDITABLE),
            CorrelationRule::new(["gateway"])
                .when("method", "static")
                .with(PropertyOp::EDITABLE),
            CorrelationRule::new(["username"])
                .when("authenable", true)
                .with(PropertyOp::EDITABLE),
            CorrelationRule::new(["username"])
                .when("enable", true)
                .when("authenable", true)
                .with(PropertyOp::REQUIRED),
        ])
    }

    fn snapshot(reg: &FieldRegistry) -> Vec<(String, Constraints)> {
        reg.fields()
            .iter()
            .map(|f| (f.name.clone(), f.effective()))
            .collect()
    }

    #[test]
    fn test_new_rejects_unknown_field() {
        let rules = RuleSet::new(vec![CorrelationRule::new(["gateway6"])
            .when("method", "static")
            .with(PropertyOp::EDITABLE)]);
        assert!(matches!(
            CorrelationEngine::new(rules, &registry()),
            Err(FormError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_satisfied_rule_overrides() {
        let mut reg = registry();
        let engine = CorrelationEngine::new(static_rules(), &reg).unwrap();
        reg.set("method", "static".into()).unwrap();
        let changed = engine.evaluate(&mut reg).unwrap();

        assert_eq!(changed, vec!["address", "gateway", "netmask"]);
        let address = reg.constraints_of("address").unwrap();
        assert!(address.is_required());
        assert!(!address.read_only);
        let gateway = reg.constraints_of("gateway").unwrap();
        assert!(gateway.allow_blank);
        assert!(!gateway.read_only);
    }

    #[test]
    fn test_unsatisfied_rule_reverts_to_baseline() {
        let mut reg = registry();
        let engine = CorrelationEngine::new(static_rules(), &reg).unwrap();
        reg.set("method", "static".into()).unwrap();
        engine.evaluate(&mut reg).unwrap();
        reg.set("method", "dhcp".into()).unwrap();
        engine.evaluate(&mut reg).unwrap();

        for name in ["address", "netmask", "gateway"] {
            assert_eq!(
                reg.constraints_of(name).unwrap(),
                reg.baseline_of(name).unwrap(),
                "{name} kept a stale override"
            );
        }
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let mut reg = registry();
        let engine = CorrelationEngine::new(static_rules(), &reg).unwrap();
        reg.set("method", "static".into()).unwrap();
        reg.set("authenable", FieldValue::Bool(true)).unwrap();

        engine.evaluate(&mut reg).unwrap();
        let first = snapshot(&reg);
        let changed = engine.evaluate(&mut reg).unwrap();
        assert!(changed.is_empty());
        assert_eq!(snapshot(&reg), first);
    }

    #[test]
    fn test_multiple_conditions_all_required() {
        let mut reg = registry();
        let engine = CorrelationEngine::new(static_rules(), &reg).unwrap();
        reg.set("authenable", FieldValue::Bool(true)).unwrap();
        engine.evaluate(&mut reg).unwrap();
        let username = reg.constraints_of("username").unwrap();
        assert!(!username.read_only);
        assert!(username.allow_blank);

        reg.set("enable", FieldValue::Bool(true)).unwrap();
        engine.evaluate(&mut reg).unwrap();
        assert!(reg.constraints_of("username").unwrap().is_required());
    }

    #[test]
    fn test_no_stale_overrides_across_all_method_values() {
        let mut reg = registry();
        let engine = CorrelationEngine::new(static_rules(), &reg).unwrap();
        for method in ["static", "dhcp", "static", "manual", "static", "static", "dhcp"] {
            reg.set("method", method.into()).unwrap();
            engine.evaluate(&mut reg).unwrap();
            let active = method == "static";
            for name in ["address", "netmask"] {
                let effective = reg.constraints_of(name).unwrap();
                if active {
                    assert!(effective.is_required() && !effective.read_only);
                } else {
                    assert_eq!(effective, reg.baseline_of(name).unwrap());
                }
            }
        }
    }

    #[test]
    fn test_watches_only_condition_fields() {
        let engine = CorrelationEngine::new(static_rules(), &registry()).unwrap();
        assert!(engine.watches("method"));
        assert!(engine.watches("authenable"));
        assert!(!engine.watches("address"));
    }
}
