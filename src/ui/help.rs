//! Help overlay rendering

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::widgets::centered_rect;

/// Render the help overlay
pub fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let overlay_width = (area.width as f32 * 0.7).min(64.0) as u16;
    let overlay_height = (area.height as f32 * 0.8).min(30.0) as u16;

    let overlay_area = centered_rect(overlay_width, overlay_height, area);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            " Keyboard Shortcuts ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let widget = Paragraph::new(create_help_text()).style(Style::default().fg(Color::White));
    frame.render_widget(widget, inner);
}

fn create_help_text() -> Vec<Line<'static>> {
    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let mut lines = Vec::new();
    let sections: [(&str, &[(&str, &str)]); 3] = [
        (
            "Global",
            &[
                ("F1", "Toggle help overlay"),
                ("Ctrl+C", "Quit application"),
                ("Enter / Esc", "Dismiss an alert"),
            ],
        ),
        (
            "Form",
            &[
                ("Tab / ↓", "Next field"),
                ("Shift+Tab / ↑", "Previous field"),
                ("← →", "Change a choice"),
                ("Enter / PgDn", "Next step / Generate card"),
                ("Esc", "Previous step"),
                ("Enter (photo)", "Attach the typed path"),
                ("Del (photo)", "Remove the photo"),
            ],
        ),
        (
            "Card",
            &[
                ("Enter / Space", "Open the gift / flip"),
                ("F", "Flip the card"),
                ("S", "Download image of this side"),
                ("M", "Music on/off"),
                ("C", "Copy message to clipboard"),
                ("N", "Create a new card"),
                ("Q", "Quit"),
            ],
        ),
    ];

    for (title, keys) in sections {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(title, section_style)));
        for &(key, desc) in keys {
            lines.push(help_line(key, desc));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "       [Press F1 or Esc to close]",
        Style::default().fg(Color::DarkGray),
    )));
    lines
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<16}", key), Style::default().fg(Color::Green)),
        Span::styled(desc, Style::default().fg(Color::White)),
    ])
}
