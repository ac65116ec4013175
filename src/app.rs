//! Application state and core logic

use std::sync::Arc;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use nas_console::config::ConsoleConfig;
use nas_console::panels::PanelKind;
use nas_console::source::{self, DataSource};
use nas_console::state::{FieldKind, FieldValue, Form, FormField, FormState, Violation};

/// Main application struct
pub struct App {
    /// Panel currently shown
    pub panel: PanelKind,
    /// Live form of the current panel
    pub form: FormState,
    /// Data layer the panels are filled from
    source: Arc<dyn DataSource>,
    pub config: ConsoleConfig,
    /// Whether the app should quit
    quit: bool,
    /// One-line feedback shown in the status bar
    pub status_message: Option<String>,
    /// Result of the last validation run
    pub violations: Vec<Violation>,
    /// Highlighted option of the active multi-select
    pub option_cursor: usize,
}

impl App {
    /// Create a new App instance showing the configured initial panel
    pub async fn new(config: ConsoleConfig, source: Arc<dyn DataSource>) -> Result<Self> {
        let panel = config.initial_panel();
        let form = source::open_panel(source.as_ref(), panel).await?;
        Ok(Self {
            panel,
            form,
            source,
            config,
            quit: false,
            status_message: None,
            violations: Vec::new(),
            option_cursor: 0,
        })
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Replace the current form with a freshly loaded one
    pub async fn switch_panel(&mut self, panel: PanelKind) -> Result<()> {
        if self.form.is_dirty() {
            tracing::info!(panel = self.panel.label(), "discarding unsaved changes");
        }
        self.form = source::open_panel(self.source.as_ref(), panel).await?;
        self.panel = panel;
        self.violations.clear();
        self.option_cursor = 0;
        self.status_message = None;
        Ok(())
    }

    /// Handle a key event
    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => self.quit = true,
            KeyCode::F(2) => self.switch_panel(self.panel.prev()).await?,
            KeyCode::F(3) => self.switch_panel(self.panel.next()).await?,
            KeyCode::Char('s') if ctrl => self.submit(),
            KeyCode::Char('r') if ctrl => self.reset_active()?,
            KeyCode::Tab | KeyCode::Down => {
                self.form.next_field();
                self.option_cursor = 0;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.form.prev_field();
                self.option_cursor = 0;
            }
            _ => self.edit_active(key.code)?,
        }
        Ok(())
    }

    /// Run the submit-time checks; commit when the form is clean
    pub fn submit(&mut self) {
        self.violations = self.form.validate();
        if self.violations.is_empty() {
            self.form.commit();
            self.status_message = Some("Saved".to_string());
        } else {
            self.status_message = Some(format!(
                "{} field(s) need attention",
                self.violations.len()
            ));
        }
    }

    fn reset_active(&mut self) -> Result<()> {
        let Some(name) = self.form.active().map(|f| f.name.clone()) else {
            return Ok(());
        };
        self.form.reset_to_baseline(&name)?;
        self.after_edit();
        Ok(())
    }

    fn edit_active(&mut self, code: KeyCode) -> Result<()> {
        let Some(field) = self.form.active() else {
            return Ok(());
        };

        if field.kind == FieldKind::MultiSelect {
            let count = field.options.len();
            match code {
                KeyCode::Right if count > 0 => {
                    self.option_cursor = (self.option_cursor + 1) % count;
                    return Ok(());
                }
                KeyCode::Left if count > 0 => {
                    self.option_cursor = (self.option_cursor + count - 1) % count;
                    return Ok(());
                }
                _ => {}
            }
        }

        let Some(value) = edited_value(field, code, self.option_cursor) else {
            return Ok(());
        };
        if field.effective().read_only {
            self.status_message = Some(format!("{} is read-only", field.label));
            return Ok(());
        }
        let name = field.name.clone();
        self.form.set(&name, value)?;
        self.after_edit();
        Ok(())
    }

    fn after_edit(&mut self) {
        self.status_message = None;
        if self.config.validate_on_change() {
            self.violations = self.form.validate();
        }
    }
}

/// Value a key press would give `field`, or `None` if the key does not
/// edit this kind of field
pub fn edited_value(field: &FormField, code: KeyCode, option_cursor: usize) -> Option<FieldValue> {
    match (field.kind, code) {
        (FieldKind::Checkbox, KeyCode::Char(' ') | KeyCode::Enter) => {
            Some(FieldValue::Bool(!field.value.is_true()))
        }
        (FieldKind::MultiSelect, KeyCode::Char(' ') | KeyCode::Enter) => field
            .options
            .get(option_cursor)
            .map(|o| field.value.toggled_item(o.value.as_text())),
        (FieldKind::Select, KeyCode::Left | KeyCode::Right) => {
            let count = field.options.len();
            if count == 0 {
                return None;
            }
            let current = field.options.iter().position(|o| o.value == field.value);
            let index = match (current, code) {
                (None, _) => 0,
                (Some(i), KeyCode::Right) => (i + 1) % count,
                (Some(i), _) => (i + count - 1) % count,
            };
            Some(field.options[index].value.clone())
        }
        (FieldKind::Text | FieldKind::Password | FieldKind::Number, KeyCode::Char(c)) => {
            Some(field.value.pushed(c))
        }
        (FieldKind::Text | FieldKind::Password | FieldKind::Number, KeyCode::Backspace) => {
            Some(field.value.popped())
        }
        _ => None,
    }
}
