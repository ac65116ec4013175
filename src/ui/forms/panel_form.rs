//! Current panel's form

use super::field_renderer::{draw_field, FIELD_HEIGHT};
use crate::app::App;
use nas_console::state::Form;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders},
    Frame,
};

/// Draw the active panel's fields, one page at a time
pub fn draw_panel_form(frame: &mut Frame, area: Rect, app: &App) {
    let form = &app.form;
    let dirty = if form.is_dirty() { " (modified)" } else { "" };
    let block = Block::default()
        .title(format!(" {}{dirty} ", form.title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let per_page = usize::from((inner.height / FIELD_HEIGHT).max(1));
    let active = form.active_field();
    let start = (active / per_page) * per_page;
    let end = (start + per_page).min(form.field_count());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            (start..end)
                .map(|_| Constraint::Length(FIELD_HEIGHT))
                .chain(std::iter::once(Constraint::Min(0))),
        )
        .split(inner);

    for (row, index) in (start..end).enumerate() {
        if let Some(field) = form.get_field(index) {
            draw_field(frame, chunks[row], field, index == active, app.option_cursor);
        }
    }
}
