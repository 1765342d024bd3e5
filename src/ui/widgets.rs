//! Shared widget helpers

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use crate::color_space::{terminal_color, Rgb};
use crate::stylize::{gradient_graphemes, Gradient};
use crate::terminal_capabilities::ColorSupport;

/// A theme colour as the terminal can show it
pub fn paint(rgb: Rgb, support: ColorSupport) -> Color {
    terminal_color(rgb, support)
}

/// Form row with label, value, and optional hint
pub fn setting_line(
    label: &str,
    value: Vec<Span<'static>>,
    is_selected: bool,
    is_required: bool,
    hint: Option<&str>,
) -> Line<'static> {
    let indicator = if is_selected { "▸" } else { " " };
    let indicator_style = Style::default().fg(Color::Cyan);

    let label_style = if is_selected {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };

    let mut spans = vec![
        Span::styled(format!("{} ", indicator), indicator_style),
        Span::styled(label.to_string(), label_style),
    ];
    if is_required {
        spans.push(Span::styled("*", Style::default().fg(Color::Magenta)));
    }
    spans.push(Span::raw(": "));
    spans.extend(value);

    if let Some(hint_text) = hint {
        spans.push(Span::styled(
            format!("  {}", hint_text),
            Style::default().fg(Color::DarkGray),
        ));
    }

    Line::from(spans)
}

/// Button-like key hint; disabled hints are dimmed
pub fn action_spans(key: &str, label: &str, enabled: bool) -> Vec<Span<'static>> {
    let (key_style, label_style) = if enabled {
        (
            Style::default().fg(Color::Green),
            Style::default().fg(Color::White),
        )
    } else {
        (
            Style::default().fg(Color::DarkGray),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::DIM),
        )
    };

    vec![
        Span::styled(key.to_string(), key_style),
        Span::styled(format!(" {}  ", label), label_style),
    ]
}

/// Text coloured grapheme by grapheme
pub fn gradient_spans(text: &str, gradient: Gradient, support: ColorSupport) -> Vec<Span<'static>> {
    gradient_graphemes(text, gradient)
        .into_iter()
        .map(|(grapheme, rgb)| {
            Span::styled(
                grapheme,
                Style::default()
                    .fg(paint(rgb, support))
                    .add_modifier(Modifier::BOLD),
            )
        })
        .collect()
}

/// Create a centered rectangle
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let horizontal_padding = area.width.saturating_sub(width) / 2;
    let vertical_padding = area.height.saturating_sub(height) / 2;

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(vertical_padding),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(horizontal_padding),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vertical[1])[1]
}
