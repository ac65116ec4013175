//! nas-console - form-state engine and panel definitions for a NAS
//! administration console.
//!
//! The engine keeps the effective constraints and option lists of a form's
//! interdependent fields consistent with their live values:
//! - `state::forms::FieldRegistry` owns the fields of one form instance
//! - `state::forms::CorrelationEngine` applies declarative rules
//! - `state::forms::CascadeResolver` recomputes dependent option lists
//! - `state::forms::CrossFieldValidator` runs the submit-time checks
//!
//! `panels` holds the data-only form definitions, `source` the boundary to
//! the data layer that fills them.

pub mod config;
pub mod error;
pub mod panels;
pub mod source;
pub mod state;

pub use error::FormError;
