//! UI module
//!
//! Contains all UI rendering components using Ratatui.

mod card;
mod form;
mod help;
mod widgets;

use std::time::Instant;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::form::FormStep;
use crate::shell::{AppState, View};
use crate::text;

/// Main render function - draws the entire UI
pub fn render(frame: &mut Frame, state: &AppState, now: Instant) {
    let size = frame.area();

    // Check minimum size
    if size.width < 40 || size.height < 15 {
        render_size_warning(frame, size);
        return;
    }

    // Main layout: title bar, content, status bar
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title bar
            Constraint::Min(10),   // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(size);

    render_title_bar(frame, main_chunks[0], state);
    match state.view {
        View::Form => form::render_form(frame, main_chunks[1], state),
        View::Card => card::render_card(frame, main_chunks[1], state, now),
    }
    render_status_bar(frame, main_chunks[2], state);

    if state.show_help {
        help::render_help_overlay(frame, size);
    }

    if let Some(alert) = &state.alert {
        render_alert(frame, size, alert);
    }
}

/// Render warning when terminal is too small
fn render_size_warning(frame: &mut Frame, area: Rect) {
    let warning = Paragraph::new("Terminal too small!\nMinimum: 40x15")
        .style(Style::default().fg(Color::Red))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(warning, area);
}

fn title_context(state: &AppState) -> String {
    match (state.view, &state.card) {
        (View::Card, Some(card)) => {
            format!("A Special Surprise For {}", card.card().recipient_name)
        }
        _ => {
            let step = state.form.step();
            format!("Step {}/{}: {}", step.number(), FormStep::COUNT, step.title())
        }
    }
}

/// Render the title bar
fn render_title_bar(frame: &mut Frame, area: Rect, state: &AppState) {
    let context = text::ellipsize(&title_context(state), (area.width as usize).saturating_sub(40));
    let music = if state.audio.is_playing() { "♪ " } else { "  " };

    let title = Line::from(vec![
        Span::styled(
            " AmourCard ",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("v1.0", Style::default().fg(Color::DarkGray)),
        Span::raw(" │ "),
        Span::styled(context.clone(), Style::default().fg(Color::Yellow)),
        Span::raw(" ".repeat(
            (area.width as usize)
                .saturating_sub(38)
                .saturating_sub(text::display_width(&context)),
        )),
        Span::styled(music, Style::default().fg(Color::Magenta)),
        Span::styled("[F1]", Style::default().fg(Color::Green)),
        Span::raw(" Help  "),
        Span::styled("[Q]", Style::default().fg(Color::Red)),
        Span::raw(" Quit "),
    ]);

    let title_widget = Paragraph::new(title)
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(title_widget, area);
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState) {
    let status_color = if state.status_is_error {
        Color::Red
    } else {
        Color::White
    };

    let color_info = state.capabilities.color_support.name();
    let status = text::ellipsize(
        &state.status_message,
        (area.width as usize).saturating_sub(color_info.len() + 4),
    );
    let spacing = (area.width as usize)
        .saturating_sub(text::display_width(&status))
        .saturating_sub(color_info.len())
        .saturating_sub(2);

    let line = Line::from(vec![
        Span::raw(" "),
        Span::styled(status, Style::default().fg(status_color)),
        Span::raw(" ".repeat(spacing)),
        Span::styled(color_info, Style::default().fg(Color::DarkGray)),
        Span::raw(" "),
    ]);

    let widget = Paragraph::new(line).style(Style::default().bg(Color::Black).fg(Color::White));

    frame.render_widget(widget, area);
}

/// Blocking alert; every other key waits until it is dismissed
fn render_alert(frame: &mut Frame, area: Rect, alert: &str) {
    let width = area.width.min(50);
    let body = text::wrap_to_width(alert, width.saturating_sub(4) as usize);
    let height = body.len() as u16 + 4;
    let alert_area = widgets::centered_rect(width, height, area);

    frame.render_widget(Clear, alert_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(Span::styled(
            " Oops ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);

    let mut lines: Vec<Line> = body.into_iter().map(Line::from).collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[Enter] OK",
        Style::default().fg(Color::Green),
    )));

    let widget = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, alert_area);
}
