//! Field rendering utilities for forms

use nas_console::state::{FieldKind, FormField};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Rows taken by one field box
pub const FIELD_HEIGHT: u16 = 3;

/// Draw a form field with its effective constraints and violation marker
pub fn draw_field(
    frame: &mut Frame,
    area: Rect,
    field: &FormField,
    is_active: bool,
    option_cursor: usize,
) {
    let constraints = field.effective();
    let violation = field.violation();

    let style = if constraints.read_only {
        Style::default().fg(Color::DarkGray)
    } else if is_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let border_style = if violation.is_some() {
        Style::default().fg(Color::Red)
    } else if is_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let mut title = format!(" {}", field.label);
    if constraints.is_required() {
        title.push_str(" *");
    }
    if constraints.read_only {
        title.push_str(" (read-only)");
    }
    title.push(' ');

    let content = match field.kind {
        FieldKind::MultiSelect => multi_select_line(field, is_active, option_cursor),
        _ => {
            let display_value = field.display_value();
            let display_str = if display_value.is_empty() && !is_active {
                "(empty)".to_string()
            } else {
                display_value
            };
            let cursor = if is_active && !constraints.read_only {
                "▌"
            } else {
                ""
            };
            Line::from(vec![
                Span::styled(display_str, style),
                Span::styled(cursor, Style::default().fg(Color::Cyan)),
            ])
        }
    };

    let mut block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);
    if let Some(message) = violation {
        block = block.title_bottom(Line::styled(
            format!(" {message} "),
            Style::default().fg(Color::Red),
        ));
    }

    frame.render_widget(Paragraph::new(content).block(block), area);
}

/// `[x] eth1  [ ] eth2` with the cursor item highlighted
fn multi_select_line(field: &FormField, is_active: bool, option_cursor: usize) -> Line<'static> {
    if field.options.is_empty() {
        return Line::styled("(no candidates)", Style::default().fg(Color::DarkGray));
    }
    let chosen = field.value.as_list();
    let spans: Vec<Span> = field
        .options
        .iter()
        .enumerate()
        .flat_map(|(i, option)| {
            let mark = if chosen.iter().any(|c| c == option.value.as_text()) {
                "[x]"
            } else {
                "[ ]"
            };
            let style = if is_active && i == option_cursor {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            [
                Span::styled(format!("{mark} {}", option.label), style),
                Span::raw("  "),
            ]
        })
        .collect();
    Line::from(spans)
}
