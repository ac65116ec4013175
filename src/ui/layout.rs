//! Layout components (sidebar, status bar)

use super::components::{render_sidebar_button, BUTTON_HEIGHT};
use crate::app::App;
use nas_console::panels::PanelKind;
use nas_console::state::FieldKind;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Create the main layout with sidebar
pub fn create_layout(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(22), // Sidebar
            Constraint::Min(0),     // Main content
        ])
        .split(area);

    // Reserve bottom line for status bar
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(chunks[1]);

    let sidebar_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Sidebar content
            Constraint::Length(1), // Status bar continuation
        ])
        .split(chunks[0]);

    (sidebar_chunks[0], main_chunks[0])
}

/// Draw the sidebar with one boxed button per panel
pub fn draw_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let mut constraints = vec![Constraint::Min(0)];
    constraints.extend(PanelKind::ALL.iter().map(|_| Constraint::Length(BUTTON_HEIGHT)));
    constraints.push(Constraint::Min(0));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (idx, panel) in PanelKind::ALL.iter().enumerate() {
        render_sidebar_button(
            frame,
            chunks[idx + 1],
            &(idx + 1).to_string(),
            panel.label(),
            *panel == app.panel,
            app.form.is_dirty(),
        );
    }
}

/// Draw the status bar
pub fn draw_status_bar(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let status_area = Rect {
        x: 0,
        y: area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    };

    let mut spans = vec![Span::raw(" ")];

    let kind = app.form.active().map(|f| f.kind);
    spans.push(Span::styled(
        get_field_hints(kind),
        Style::default().fg(Color::Gray),
    ));

    if let Some(msg) = &app.status_message {
        let color = if app.violations.is_empty() {
            Color::Green
        } else {
            Color::Red
        };
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(msg, Style::default().fg(color)));
    } else if let Some(info) = app.form.active().and_then(|f| f.info.as_deref()) {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(info, Style::default().fg(Color::Blue)));
    }

    let quit_hint = " Esc:quit ";

    let status = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status, status_area);

    let quit_area = Rect {
        x: area.width.saturating_sub(quit_hint.len() as u16),
        y: area.height.saturating_sub(1),
        width: quit_hint.len() as u16,
        height: 1,
    };
    let quit_widget =
        Paragraph::new(quit_hint).style(Style::default().bg(Color::DarkGray).fg(Color::Gray));
    frame.render_widget(quit_widget, quit_area);
}

/// Get keyboard hints for the active field
fn get_field_hints(kind: Option<FieldKind>) -> &'static str {
    match kind {
        Some(FieldKind::Checkbox) => "Tab:next  Space:toggle  ^S:save  ^R:reset  F2/F3:panel",
        Some(FieldKind::Select) => "Tab:next  \u{2190}/\u{2192}:choose  ^S:save  ^R:reset  F2/F3:panel",
        Some(FieldKind::MultiSelect) => {
            "Tab:next  \u{2190}/\u{2192}:move  Space:pick  ^S:save  ^R:reset  F2/F3:panel"
        }
        Some(_) => "Tab:next  type to edit  ^S:save  ^R:reset  F2/F3:panel",
        None => "F2/F3:panel",
    }
}
