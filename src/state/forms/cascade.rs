//! Cascading option resolver for dependent selectors

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use super::correlation::FieldObserver;
use super::field::{FieldValue, SelectOption};
use super::registry::FieldRegistry;
use crate::error::FormError;

/// Pure, total function from driver values (in `driver_fields` order) to
/// the dependent field's options
pub type ComputeOptions = Arc<dyn Fn(&[&FieldValue]) -> Vec<SelectOption> + Send + Sync>;

/// Describes one dependent-selector recomputation
#[derive(Clone)]
pub struct CascadeSpec {
    pub driver_fields: Vec<String>,
    pub dependent_field: String,
    compute: ComputeOptions,
}

impl fmt::Debug for CascadeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CascadeSpec")
            .field("driver_fields", &self.driver_fields)
            .field("dependent_field", &self.dependent_field)
            .finish_non_exhaustive()
    }
}

impl CascadeSpec {
    pub fn new<F>(driver_fields: &[&str], dependent_field: &str, compute: F) -> Self
    where
        F: Fn(&[&FieldValue]) -> Vec<SelectOption> + Send + Sync + 'static,
    {
        Self {
            driver_fields: driver_fields.iter().map(|s| s.to_string()).collect(),
            dependent_field: dependent_field.to_string(),
            compute: Arc::new(compute),
        }
    }

    pub fn compute_options(&self, driver_values: &[&FieldValue]) -> Vec<SelectOption> {
        (self.compute)(driver_values)
    }

    fn check(&self, registry: &FieldRegistry) -> Result<(), FormError> {
        let context = format!("cascade into '{}'", self.dependent_field);
        registry.require(&self.dependent_field, &context)?;
        for driver in &self.driver_fields {
            registry.require(driver, &context)?;
        }
        Ok(())
    }
}

/// Binds one `CascadeSpec` to a registry
#[derive(Debug, Clone)]
pub struct CascadeResolver {
    spec: CascadeSpec,
}

impl CascadeResolver {
    pub fn new(spec: CascadeSpec, registry: &FieldRegistry) -> Result<Self, FormError> {
        spec.check(registry)?;
        Ok(Self { spec })
    }

    pub fn spec(&self) -> &CascadeSpec {
        &self.spec
    }

    /// Replace the dependent field's options from the current driver values
    /// and keep its value only if one of the new options still carries it.
    pub fn recompute(&self, registry: &mut FieldRegistry) -> Result<(), FormError> {
        let options = {
            let driver_values = self
                .spec
                .driver_fields
                .iter()
                .map(|name| registry.get(name))
                .collect::<Result<Vec<_>, _>>()?;
            self.spec.compute_options(&driver_values)
        };

        let dependent = &self.spec.dependent_field;
        let prior = registry.get(dependent)?.clone();
        let keep = options.iter().any(|o| o.value == prior);
        registry.replace_options(dependent, options)?;

        if !keep && registry.set(dependent, prior.cleared())? {
            tracing::debug!(field = %dependent, prior = %prior, "selection cleared by cascade");
        }
        Ok(())
    }
}

impl FieldObserver for CascadeResolver {
    fn name(&self) -> &str {
        &self.spec.dependent_field
    }

    fn watches(&self, field: &str) -> bool {
        self.spec.driver_fields.iter().any(|d| d == field)
    }

    fn on_change(
        &self,
        registry: &mut FieldRegistry,
        _changed: &BTreeSet<String>,
    ) -> Result<(), FormError> {
        self.recompute(registry)
    }
}
