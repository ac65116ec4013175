//! Form domain layer
//!
//! Field registry, correlation rules, cascading selectors and submit-time
//! validation, tied together by `FormState`.

mod cascade;
mod correlation;
mod definition;
mod field;
mod form_state;
mod registry;
mod rule;
mod validator;

pub use cascade::{CascadeResolver, CascadeSpec, ComputeOptions};
pub use correlation::{CorrelationEngine, FieldObserver};
pub use definition::FormDefinition;
pub use field::{Constraints, FieldKind, FieldValue, FormField, Property, SelectOption};
pub use form_state::{ChangeSet, Form, FormState};
pub use registry::{ChangeKind, FieldChange, FieldRegistry};
pub use rule::{Condition, CorrelationRule, MatchSpec, PropertyOp, RuleSet};
pub use validator::{CrossFieldValidator, ExclusionConstraint, MatchConstraint, Violation};
