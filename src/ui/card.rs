//! Card view rendering: the wrapped gift, both faces, and the confetti

use std::time::Instant;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use super::widgets::{self, paint};
use crate::effects::ConfettiBurst;
use crate::presentation::{CardPhase, CardView, Face};
use crate::shell::AppState;
use crate::terminal_capabilities::ColorSupport;
use crate::text;
use crate::theme::{CardTheme, GIFT_BOX, GIFT_RIBBON};

const CARD_WIDTH: u16 = 60;
const GIFT_WIDTH: usize = 20;
const GIFT_HEIGHT: usize = 6;
/// Rows the lid rises by the end of the opening animation
const LID_LIFT: f32 = 3.0;
const CONFETTI_SYMBOLS: [&str; 3] = ["▪", "•", "▴"];

pub fn render_card(frame: &mut Frame, area: Rect, state: &AppState, now: Instant) {
    let Some(view) = &state.card else {
        return;
    };
    let support = state.capabilities.color_support;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),    // Card
            Constraint::Length(1), // Buttons
        ])
        .split(area);

    let card_area = widgets::centered_rect(CARD_WIDTH, chunks[0].height, chunks[0]);

    match view.phase() {
        CardPhase::Closed => render_gift(frame, card_area, 0.0, support),
        CardPhase::Opening { .. } => {
            let progress = view.opening_progress(now).unwrap_or(1.0);
            render_gift(frame, card_area, progress, support);
        }
        CardPhase::Open { face } => {
            render_face(frame, card_area, view, face, support);
        }
    }

    render_buttons(frame, chunks[1], state, view);

    if let Some(burst) = view.confetti() {
        render_confetti(frame.buffer_mut(), area, burst, support);
    }
}

/// The wrapped present; `progress` lifts the lid.
fn render_gift(frame: &mut Frame, area: Rect, progress: f32, support: ColorSupport) {
    let box_color = paint(GIFT_BOX, support);
    let ribbon_color = paint(GIFT_RIBBON, support);
    let ribbon_at = GIFT_WIDTH / 2 - 1;

    let row = |width: usize, fill: &'static str| -> Line<'static> {
        let ribbon_start = ribbon_at + (width - GIFT_WIDTH) / 2;
        let mut spans = Vec::new();
        spans.push(Span::styled(
            fill.repeat(ribbon_start),
            Style::default().fg(box_color),
        ));
        spans.push(Span::styled("██", Style::default().fg(ribbon_color)));
        spans.push(Span::styled(
            fill.repeat(width - ribbon_start - 2),
            Style::default().fg(box_color),
        ));
        Line::from(spans)
    };

    let lift = (progress.clamp(0.0, 1.0) * LID_LIFT).round() as usize;

    let mut lines = Vec::new();
    lines.push(Line::from(Span::styled(
        "▚▞",
        Style::default().fg(ribbon_color),
    )));
    lines.push(row(GIFT_WIDTH + 2, "▄"));
    for _ in 0..lift {
        lines.push(Line::from(""));
    }
    for _ in 0..GIFT_HEIGHT {
        lines.push(row(GIFT_WIDTH, "█"));
    }
    lines.push(Line::from(""));

    if progress > 0.0 {
        lines.push(Line::from(Span::styled(
            "Opening...",
            Style::default().fg(box_color).add_modifier(Modifier::ITALIC),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "[Enter] Tap to open your gift",
            Style::default().fg(box_color).add_modifier(Modifier::BOLD),
        )));
    }

    let height = (lines.len() as u16).min(area.height);
    let top = area.y + area.height.saturating_sub(height) / 2;
    let gift_area = Rect {
        y: top,
        height,
        ..area
    };

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), gift_area);
}

fn render_face(frame: &mut Frame, area: Rect, view: &CardView, face: Face, support: ColorSupport) {
    let theme = view.theme();
    paint_background(frame.buffer_mut(), area, theme, support);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(paint(theme.border, support)));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match face {
        Face::Front => render_front(frame, inner, view, support),
        Face::Back => render_back(frame, inner, view, support),
    }
}

/// Diagonal gradient, top-left to bottom-right
fn paint_background(buf: &mut Buffer, area: Rect, theme: &CardTheme, support: ColorSupport) {
    const STEPS: usize = 32;
    let ramp: Vec<_> = theme
        .background_ramp(STEPS)
        .into_iter()
        .map(|rgb| paint(rgb, support))
        .collect();

    let w = area.width.saturating_sub(1).max(1) as f32;
    let h = area.height.saturating_sub(1).max(1) as f32;

    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            let t = ((x - area.x) as f32 / w + (y - area.y) as f32 / h) / 2.0;
            let index = ((t * (STEPS - 1) as f32).round() as usize).min(STEPS - 1);
            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_bg(ramp[index]);
            }
        }
    }
}

fn render_front(frame: &mut Frame, area: Rect, view: &CardView, support: ColorSupport) {
    let theme = view.theme();
    let card = view.card();
    let text_style = Style::default().fg(paint(theme.text, support));
    let muted_style = Style::default().fg(paint(theme.muted, support));
    let accent_style = Style::default()
        .fg(paint(theme.accent, support))
        .add_modifier(Modifier::BOLD);

    let name = theme.letter_style.apply(&card.recipient_name);
    let name = text::ellipsize(&name, area.width.saturating_sub(2) as usize);

    let lines = vec![
        Line::from(Span::styled(
            "✧ CELEBRATING YOU ✧",
            muted_style.add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(widgets::gradient_spans(&name, theme.name_gradient, support)),
        Line::from(""),
        Line::from(Span::styled("🎂", text_style)),
        Line::from(""),
        Line::from(Span::styled("Happy Birthday", accent_style)),
        Line::from(""),
        Line::from(Span::styled(
            "[F] flip the magic",
            muted_style.add_modifier(Modifier::ITALIC),
        )),
    ];

    let height = (lines.len() as u16).min(area.height);
    let content = Rect {
        y: area.y + area.height.saturating_sub(height) / 2,
        height,
        ..area
    };
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), content);

    render_corner_glyphs(frame.buffer_mut(), area, theme.glyph, text_style);
}

fn render_corner_glyphs(buf: &mut Buffer, area: Rect, glyph: &str, style: Style) {
    if area.width < 6 || area.height < 2 {
        return;
    }
    let right = area.right().saturating_sub(3);
    let bottom = area.bottom().saturating_sub(1);
    for (x, y) in [
        (area.x + 1, area.y),
        (right, area.y),
        (area.x + 1, bottom),
        (right, bottom),
    ] {
        buf.set_string(x, y, glyph, style);
    }
}

fn render_back(frame: &mut Frame, area: Rect, view: &CardView, support: ColorSupport) {
    let theme = view.theme();
    let card = view.card();

    let photo_height = (area.height * 2 / 5).max(3);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(photo_height),
            Constraint::Length(1),
            Constraint::Min(3),
        ])
        .split(area);

    match view.photo() {
        Some(image) => {
            let cells = crate::photo::half_block_cells(
                image,
                chunks[1].width.saturating_sub(4) as usize,
                chunks[1].height as usize,
            );
            render_half_blocks(frame.buffer_mut(), chunks[1], &cells, support);
        }
        None => {
            let placeholder = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "🎁",
                    Style::default().fg(paint(theme.accent, support)),
                )),
            ])
            .alignment(Alignment::Center);
            frame.render_widget(placeholder, chunks[1]);
        }
    }

    let message = card.ai_message.as_deref().unwrap_or_default();
    let wrap_width = chunks[3].width.saturating_sub(6) as usize;
    let message_style = Style::default()
        .fg(paint(theme.text, support))
        .add_modifier(Modifier::ITALIC);
    let muted_style = Style::default().fg(paint(theme.muted, support));

    let mut lines: Vec<Line> = text::wrap_to_width(&format!("“{}”", message), wrap_width)
        .into_iter()
        .map(|line| Line::from(Span::styled(line, message_style)))
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("With all my love,", muted_style)));
    lines.push(Line::from(Span::styled(
        card.sender_name.clone(),
        Style::default()
            .fg(paint(theme.accent, support))
            .add_modifier(Modifier::BOLD),
    )));

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), chunks[3]);
}

/// Each cell shows two pixels: upper half as foreground, lower as background.
fn render_half_blocks(
    buf: &mut Buffer,
    area: Rect,
    cells: &[Vec<(crate::color_space::Rgb, crate::color_space::Rgb)>],
    support: ColorSupport,
) {
    let columns = cells.first().map_or(0, |row| row.len()) as u16;
    let left = area.x + area.width.saturating_sub(columns) / 2;

    for (dy, row) in cells.iter().enumerate().take(area.height as usize) {
        for (dx, (top, bottom)) in row.iter().enumerate() {
            let x = left + dx as u16;
            if x >= area.right() {
                break;
            }
            if let Some(cell) = buf.cell_mut((x, area.y + dy as u16)) {
                cell.set_symbol("▀")
                    .set_fg(paint(*top, support))
                    .set_bg(paint(*bottom, support));
            }
        }
    }
}

fn render_confetti(buf: &mut Buffer, area: Rect, burst: &ConfettiBurst, support: ColorSupport) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let w = area.width.saturating_sub(1) as f32;
    let h = area.height.saturating_sub(1) as f32;

    for (i, particle) in burst.particles().iter().enumerate() {
        if !particle.is_visible() {
            continue;
        }
        let x = area.x + (particle.x * w).round() as u16;
        let y = area.y + (particle.y * h).round() as u16;
        if let Some(cell) = buf.cell_mut((x, y)) {
            cell.set_symbol(CONFETTI_SYMBOLS[i % CONFETTI_SYMBOLS.len()])
                .set_fg(paint(particle.color, support));
        }
    }
}

fn render_buttons(frame: &mut Frame, area: Rect, state: &AppState, view: &CardView) {
    let mut spans = Vec::new();
    match view.phase() {
        CardPhase::Open { face } => {
            spans.extend(widgets::action_spans("[F]", face.flip_label(), true));
            let save_label = if view.is_exporting() {
                "Saving..."
            } else {
                "Download Image"
            };
            spans.extend(widgets::action_spans("[S]", save_label, !view.is_exporting()));
        }
        CardPhase::Closed | CardPhase::Opening { .. } => {}
    }

    let music = if state.audio.is_playing() {
        "Music ♪ On"
    } else {
        "Music Off"
    };
    spans.extend(widgets::action_spans("[M]", music, state.audio.is_available()));
    spans.extend(widgets::action_spans("[C]", "Copy Message", true));
    spans.extend(widgets::action_spans("[N]", "Create New Card", true));

    frame.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_confetti_lands_inside_area() {
        let start = Instant::now();
        let mut burst = ConfettiBurst::with_seed(start, Duration::from_secs(3), 7);
        burst.tick(start + Duration::from_millis(50));
        burst.tick(start + Duration::from_millis(100));

        let area = Rect::new(0, 0, 40, 20);
        let mut buf = Buffer::empty(area);
        render_confetti(&mut buf, area, &burst, ColorSupport::TrueColor);

        let visible = burst.particles().iter().filter(|p| p.is_visible()).count();
        let drawn = buf
            .content()
            .iter()
            .filter(|cell| CONFETTI_SYMBOLS.contains(&cell.symbol()))
            .count();
        assert!(drawn <= visible);
        assert_eq!(visible > 0, drawn > 0);
    }

    #[test]
    fn test_background_fills_every_cell() {
        let area = Rect::new(0, 0, 12, 6);
        let mut buf = Buffer::empty(area);
        let theme = CardTheme::for_vibe(crate::card::Vibe::VibrantParty);
        paint_background(&mut buf, area, &theme, ColorSupport::TrueColor);

        let first = buf.cell((0, 0)).map(|c| c.bg);
        let last = buf.cell((11, 5)).map(|c| c.bg);
        assert_eq!(first, Some(paint(theme.background.0, ColorSupport::TrueColor)));
        assert_eq!(last, Some(paint(theme.background.1, ColorSupport::TrueColor)));
    }
}
