//! Form rendering module
//!
//! - `field_renderer`: one bordered box per field
//! - `panel_form`: the paged field list of the current panel

mod field_renderer;
mod panel_form;

pub use panel_form::draw_panel_form;
