//! Declarative field correlation rules

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use super::field::{FieldValue, Property};
use super::registry::FieldRegistry;
use crate::error::FormError;

/// What a condition's source field must hold
///
/// A JSON array means membership, anything else equality, the way panel
/// definitions write `"value": [1, 5, 6]` or `"value": "static"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatchSpec {
    OneOf(Vec<FieldValue>),
    Equals(FieldValue),
}

impl MatchSpec {
    pub fn matches(&self, value: &FieldValue) -> bool {
        match self {
            MatchSpec::Equals(expected) => expected == value,
            MatchSpec::OneOf(candidates) => candidates.contains(value),
        }
    }

    /// Every value this spec accepts
    fn accepted(&self) -> &[FieldValue] {
        match self {
            MatchSpec::Equals(expected) => std::slice::from_ref(expected),
            MatchSpec::OneOf(candidates) => candidates,
        }
    }
}

impl From<FieldValue> for MatchSpec {
    fn from(value: FieldValue) -> Self {
        MatchSpec::Equals(value)
    }
}

/// `(sourceField, matchSpec)` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(rename = "name")]
    pub field: String,
    #[serde(rename = "value")]
    pub spec: MatchSpec,
}

/// A `propName` or `!propName` token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PropertyOp {
    pub property: Property,
    pub negated: bool,
}

impl PropertyOp {
    /// `!allowBlank`
    pub const REQUIRED: PropertyOp = PropertyOp {
        property: Property::AllowBlank,
        negated: true,
    };

    /// `!readOnly`
    pub const EDITABLE: PropertyOp = PropertyOp {
        property: Property::ReadOnly,
        negated: true,
    };

    /// Value applied while the owning rule is satisfied
    pub fn value(&self) -> bool {
        !self.negated
    }
}

impl FromStr for PropertyOp {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        let (negated, name) = match token.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, token),
        };
        Ok(PropertyOp {
            property: name.parse()?,
            negated,
        })
    }
}

impl TryFrom<String> for PropertyOp {
    type Error = FormError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PropertyOp> for String {
    fn from(op: PropertyOp) -> Self {
        op.to_string()
    }
}

impl fmt::Display for PropertyOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            f.write_str("!")?;
        }
        f.write_str(self.property.as_str())
    }
}

/// Declarative dependency: while every condition holds, each target gets
/// the listed property overrides; otherwise the targets fall back to their
/// baseline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationRule {
    #[serde(rename = "name")]
    pub targets: Vec<String>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(rename = "properties")]
    pub ops: Vec<PropertyOp>,
}

impl CorrelationRule {
    pub fn new<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            targets: targets.into_iter().map(Into::into).collect(),
            conditions: Vec::new(),
            ops: Vec::new(),
        }
    }

    /// Add an equality condition
    pub fn when(mut self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.conditions.push(Condition {
            field: field.to_string(),
            spec: MatchSpec::Equals(value.into()),
        });
        self
    }

    /// Add a membership condition
    pub fn when_any<I, V>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        self.conditions.push(Condition {
            field: field.to_string(),
            spec: MatchSpec::OneOf(values.into_iter().map(Into::into).collect()),
        });
        self
    }

    pub fn with(mut self, op: PropertyOp) -> Self {
        self.ops.push(op);
        self
    }

    /// Parse `propName` / `!propName` tokens as written in panel definitions
    pub fn with_tokens(mut self, tokens: &[&str]) -> Result<Self, FormError> {
        for token in tokens {
            self.ops.push(token.parse()?);
        }
        Ok(self)
    }

    /// All conditions hold against the current values
    pub fn is_satisfied(&self, registry: &FieldRegistry) -> Result<bool, FormError> {
        for condition in &self.conditions {
            if !condition.spec.matches(registry.get(&condition.field)?) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// `(target, property)` pairs this rule can override
    pub fn claims(&self) -> impl Iterator<Item = (&str, Property)> + '_ {
        self.targets
            .iter()
            .flat_map(move |t| self.ops.iter().map(move |op| (t.as_str(), op.property)))
    }

    /// Whether some assignment of values satisfies both rules at once.
    ///
    /// Every spec lists its accepted values, so a field constrained by both
    /// rules has a common value only if one of the listed values passes every
    /// spec on that field.
    fn can_overlap(&self, other: &CorrelationRule) -> bool {
        let mut by_field: BTreeMap<&str, Vec<&MatchSpec>> = BTreeMap::new();
        for condition in self.conditions.iter().chain(&other.conditions) {
            by_field
                .entry(condition.field.as_str())
                .or_default()
                .push(&condition.spec);
        }
        by_field.values().all(|specs| {
            specs
                .iter()
                .flat_map(|spec| spec.accepted())
                .any(|candidate| specs.iter().all(|spec| spec.matches(candidate)))
        })
    }
}

/// Ordered rules of one form, fixed at construction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<CorrelationRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<CorrelationRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[CorrelationRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn push(&mut self, rule: CorrelationRule) {
        self.rules.push(rule);
    }

    /// Fields read by any rule's conditions
    pub fn watched_fields(&self) -> BTreeSet<&str> {
        self.rules
            .iter()
            .flat_map(|r| r.conditions.iter().map(|c| c.field.as_str()))
            .collect()
    }

    /// Construction-time validation against the registry the rules will be
    /// bound to: every referenced field exists, no rule is empty, and no two
    /// rules can claim the same (field, property) at the same time.
    pub fn check(&self, registry: &FieldRegistry) -> Result<(), FormError> {
        for (i, rule) in self.rules.iter().enumerate() {
            if rule.targets.is_empty() || rule.ops.is_empty() {
                return Err(FormError::EmptyRule { rule: i });
            }
            let context = format!("correlation rule #{i}");
            for target in &rule.targets {
                registry.require(target, &context)?;
            }
            for condition in &rule.conditions {
                registry.require(&condition.field, &context)?;
            }
        }

        for (i, first) in self.rules.iter().enumerate() {
            let first_claims: BTreeSet<(&str, Property)> = first.claims().collect();
            for (j, second) in self.rules.iter().enumerate().skip(i + 1) {
                let shared = second.claims().find(|c| first_claims.contains(c));
                if let Some((field, property)) = shared {
                    if first.can_overlap(second) {
                        return Err(FormError::ConflictingRules {
                            field: field.to_string(),
                            property,
                            first: i,
                            second: j,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

impl From<Vec<CorrelationRule>> for RuleSet {
    fn from(rules: Vec<CorrelationRule>) -> Self {
        Self::new(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::forms::field::FormField;
    use pretty_assertions::assert_eq;

    fn registry() -> FieldRegistry {
        FieldRegistry::new(vec![
            FormField::text("method", "Method").with_default("manual"),
            FormField::text("address", "Address"),
            FormField::text("gateway", "Gateway"),
            FormField::number("bondmode", "Mode", 1),
            FormField::text("bondprimary", "Primary"),
        ])
        .unwrap()
    }

    mod property_op {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_parse_tokens() {
            assert_eq!("!allowBlank".parse::<PropertyOp>(), Ok(PropertyOp::REQUIRED));
            assert_eq!("!readOnly".parse::<PropertyOp>(), Ok(PropertyOp::EDITABLE));
            let op: PropertyOp = "readOnly".parse().unwrap();
            assert!(op.value());
            assert_eq!(op.to_string(), "readOnly");
        }

        #[test]
        fn test_parse_unknown_property() {
            assert_eq!(
                "!disabled".parse::<PropertyOp>(),
                Err(FormError::UnknownProperty("disabled".to_string()))
            );
        }
    }

    mod match_spec {
        use super::*;

        #[test]
        fn test_equality_and_membership() {
            let eq = MatchSpec::Equals("static".into());
            assert!(eq.matches(&"static".into()));
            assert!(!eq.matches(&"dhcp".into()));

            let any = MatchSpec::OneOf(vec![1.into(), 5.into(), 6.into()]);
            assert!(any.matches(&FieldValue::Number(5)));
            assert!(!any.matches(&FieldValue::Number(0)));
        }
    }

    mod rules {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_satisfied_requires_all_conditions() {
            let mut reg = registry();
            let rule = CorrelationRule::new(["gateway"])
                .when("method", "static")
                .when_any("bondmode", [1, 5, 6])
                .with(PropertyOp::EDITABLE);
            assert!(!rule.is_satisfied(&reg).unwrap());
            reg.set("method", "static".into()).unwrap();
            assert!(rule.is_satisfied(&reg).unwrap());
            reg.set("bondmode", FieldValue::Number(0)).unwrap();
            assert!(!rule.is_satisfied(&reg).unwrap());
        }

        #[test]
        fn test_no_conditions_is_always_satisfied() {
            let rule = CorrelationRule::new(["gateway"]).with(PropertyOp::EDITABLE);
            assert!(rule.is_satisfied(&registry()).unwrap());
        }

        #[test]
        fn test_with_tokens() {
            let rule = CorrelationRule::new(["address"])
                .with_tokens(&["!allowBlank", "!readOnly"])
                .unwrap();
            assert_eq!(rule.ops, vec![PropertyOp::REQUIRED, PropertyOp::EDITABLE]);
        }

        #[test]
        fn test_deserialize_panel_json() {
            let json = r#"[{
                "name": ["address", "gateway"],
                "conditions": [{ "name": "method", "value": "static" }],
                "properties": ["!allowBlank", "!readOnly"]
            }, {
                "name": ["bondprimary"],
                "conditions": [{ "name": "bondmode", "value": [1, 5, 6] }],
                "properties": ["!allowBlank"]
            }]"#;
            let rules: RuleSet = serde_json::from_str(json).unwrap();
            assert_eq!(rules.rules().len(), 2);
            assert_eq!(
                rules.rules()[1].conditions[0].spec,
                MatchSpec::OneOf(vec![1.into(), 5.into(), 6.into()])
            );
            assert!(rules.check(&registry()).is_ok());
        }

        #[test]
        fn test_deserialize_rejects_unknown_property() {
            let json = r#"[{ "name": ["address"], "properties": ["hidden"] }]"#;
            assert!(serde_json::from_str::<RuleSet>(json).is_err());
        }
    }

    mod check {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_unknown_target_fails_fast() {
            let rules = RuleSet::new(vec![CorrelationRule::new(["netmask"])
                .when("method", "static")
                .with(PropertyOp::REQUIRED)]);
            assert_eq!(
                rules.check(&registry()),
                Err(FormError::UnknownField {
                    field: "netmask".to_string(),
                    context: "correlation rule #0".to_string(),
                })
            );
        }

        #[test]
        fn test_unknown_condition_field_fails_fast() {
            let rules = RuleSet::new(vec![CorrelationRule::new(["address"])
                .when("method6", "static")
                .with(PropertyOp::REQUIRED)]);
            assert!(matches!(
                rules.check(&registry()),
                Err(FormError::UnknownField { field, .. }) if field == "method6"
            ));
        }

        #[test]
        fn test_empty_rule_rejected() {
            let rules = RuleSet::new(vec![CorrelationRule::new(["address"]).when("method", "static")]);
            assert_eq!(
                rules.check(&registry()),
                Err(FormError::EmptyRule { rule: 0 })
            );
        }

        #[test]
        fn test_overlapping_claims_rejected() {
            let rules = RuleSet::new(vec![
                CorrelationRule::new(["address"])
                    .when("method", "static")
                    .with(PropertyOp::REQUIRED),
                CorrelationRule::new(["gateway", "address"])
                    .when_any("method", ["static", "dhcp"])
                    .with(PropertyOp::REQUIRED),
            ]);
            assert_eq!(
                rules.check(&registry()),
                Err(FormError::ConflictingRules {
                    field: "address".to_string(),
                    property: Property::AllowBlank,
                    first: 0,
                    second: 1,
                })
            );
        }

        #[test]
        fn test_disjoint_conditions_may_share_claims() {
            let rules = RuleSet::new(vec![
                CorrelationRule::new(["address"])
                    .when("method", "static")
                    .with(PropertyOp::REQUIRED),
                CorrelationRule::new(["address"])
                    .when("method", "dhcp")
                    .with(PropertyOp::REQUIRED),
            ]);
            assert!(rules.check(&registry()).is_ok());
        }

        #[test]
        fn test_different_properties_do_not_conflict() {
            let rules = RuleSet::new(vec![
                CorrelationRule::new(["address"])
                    .when("method", "static")
                    .with(PropertyOp::REQUIRED),
                CorrelationRule::new(["address"])
                    .when("method", "static")
                    .with(PropertyOp::EDITABLE),
            ]);
            assert!(rules.check(&registry()).is_ok());
        }

        #[test]
        fn test_unrelated_condition_fields_overlap() {
            let rules = RuleSet::new(vec![
                CorrelationRule::new(["bondprimary"])
                    .when("method", "static")
                    .with(PropertyOp::REQUIRED),
                CorrelationRule::new(["bondprimary"])
                    .when("bondmode", 1)
                    .with(PropertyOp::REQUIRED),
            ]);
            assert!(matches!(
                rules.check(&registry()),
                Err(FormError::ConflictingRules { .. })
            ));
        }

        #[test]
        fn test_watched_fields() {
            let rules = RuleSet::new(vec![CorrelationRule::new(["address"])
                .when("method", "static")
                .when("bondmode", 1)
                .with(PropertyOp::REQUIRED)]);
            let watched: Vec<&str> = rules.watched_fields().into_iter().collect();
            assert_eq!(watched, vec!["bondmode", "method"]);
        }
    }
}
