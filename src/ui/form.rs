//! Wizard rendering

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::widgets;
use crate::form::{FieldKind, FormField, FormStep, FormWorkflow, PhotoState};
use crate::shell::AppState;
use crate::text;

pub fn render_form(frame: &mut Frame, area: Rect, state: &AppState) {
    let form = &state.form;
    let width = area.width.min(72);
    let panel = Rect {
        x: area.x + (area.width - width) / 2,
        width,
        ..area
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(Span::styled(
            " Birthday Card ",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);

    let inner = block.inner(panel);
    frame.render_widget(block, panel);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Progress
            Constraint::Min(4),    // Fields
            Constraint::Length(2), // Actions
        ])
        .split(inner);

    render_progress(frame, chunks[0], form.step());
    render_fields(frame, chunks[1], form);
    render_actions(frame, chunks[2], form);
}

fn render_progress(frame: &mut Frame, area: Rect, step: FormStep) {
    let mut spans = Vec::new();
    for number in 1..=FormStep::COUNT {
        let (dot, style) = if number == step.number() {
            ("●", Style::default().fg(Color::Magenta))
        } else if number < step.number() {
            ("●", Style::default().fg(Color::Rgb(0xf9, 0xa8, 0xd4)))
        } else {
            ("○", Style::default().fg(Color::DarkGray))
        };
        spans.push(Span::styled(format!("{} ", dot), style));
    }
    spans.push(Span::styled(
        step.title(),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_fields(frame: &mut Frame, area: Rect, form: &FormWorkflow) {
    let focused = form.focused_field();
    let value_width = (area.width as usize).saturating_sub(26).max(8);

    let mut lines = Vec::new();
    for &field in form.step().fields() {
        let is_selected = field == focused && !form.is_submitting();
        let value = field_value(form, field, is_selected, value_width);
        let hint = field_hint(form, field, is_selected);
        lines.push(widgets::setting_line(
            field.label(),
            value,
            is_selected,
            field.is_required(),
            hint,
        ));
        lines.push(Line::from(""));
    }

    if let Some(status) = photo_line(form) {
        lines.push(status);
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn field_value(
    form: &FormWorkflow,
    field: FormField,
    is_selected: bool,
    max_width: usize,
) -> Vec<Span<'static>> {
    let value = form.text_value(field);
    match field.kind() {
        FieldKind::Choice => {
            let arrow = if is_selected {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            vec![
                Span::styled("◀ ", arrow),
                Span::styled(value, Style::default().fg(Color::White)),
                Span::styled(" ▶", arrow),
            ]
        }
        FieldKind::Text | FieldKind::Path => {
            // Keep the tail visible while typing
            let shown = if text::display_width(&value) > max_width {
                let tail: String = value.chars().rev().collect();
                let tail = text::truncate_to_width(&tail, max_width.saturating_sub(1));
                format!("…{}", tail.chars().rev().collect::<String>())
            } else {
                value
            };
            let mut spans = vec![Span::styled(shown, Style::default().fg(Color::White))];
            if is_selected {
                spans.push(Span::styled(
                    "▏",
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::SLOW_BLINK),
                ));
            }
            spans
        }
    }
}

fn field_hint(form: &FormWorkflow, field: FormField, is_selected: bool) -> Option<&'static str> {
    if !is_selected {
        return None;
    }
    match field {
        FormField::Photo => Some(if form.photo_pending() {
            "(processing...)"
        } else {
            "(Enter to attach, Del to remove)"
        }),
        FormField::FavMemory => Some("(the funnier the better)"),
        _ => None,
    }
}

fn photo_line(form: &FormWorkflow) -> Option<Line<'static>> {
    if form.step() != FormStep::Personalize {
        return None;
    }
    let line = match form.photo_state() {
        PhotoState::Empty => return None,
        PhotoState::Loading { .. } => Line::from(Span::styled(
            "  Preparing photo...",
            Style::default().fg(Color::Yellow),
        )),
        PhotoState::Ready { path } => Line::from(vec![
            Span::styled("  ✓ ", Style::default().fg(Color::Green)),
            Span::styled(
                text::ellipsize(&path.display().to_string(), 48),
                Style::default().fg(Color::Green),
            ),
        ]),
        PhotoState::Failed { error, .. } => Line::from(vec![
            Span::styled("  ✗ ", Style::default().fg(Color::Red)),
            Span::styled(text::ellipsize(error, 60), Style::default().fg(Color::Red)),
        ]),
    };
    Some(line)
}

fn render_actions(frame: &mut Frame, area: Rect, form: &FormWorkflow) {
    let line = if form.is_submitting() {
        Line::from(Span::styled(
            "🎂 Baking your surprise...",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ))
    } else {
        let mut spans = Vec::new();
        if form.step() != FormStep::BasicInfo {
            spans.extend(widgets::action_spans("[Esc]", "Back", true));
        }
        if form.step() == FormStep::Personalize {
            spans.extend(widgets::action_spans("[PgDn]", "Generate Card", form.can_submit()));
        } else {
            spans.extend(widgets::action_spans("[PgDn]", "Next", form.can_advance()));
        }
        spans.extend(widgets::action_spans("[Tab]", "Next field", true));
        Line::from(spans)
    };

    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}
