//! PNG export of a card face
//!
//! Faces are rasterized directly: a diagonal gradient background, a framed
//! border, text through `ab_glyph` and the embedded photo composited on top.

use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use image::{imageops, DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size,
};
use imageproc::rect::Rect;

use crate::card::CardData;
use crate::color_space::Rgb;
use crate::config::ExportPreferences;
use crate::error::{CardError, Result};
use crate::presentation::{ExportRequest, Face};
use crate::theme::CardTheme;

/// Tried in order when no font is configured
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

const RAMP_STEPS: usize = 256;
const BORDER_THICKNESS: u32 = 4;

/// Load the configured font, or the first system font that exists.
pub fn load_font(prefs: &ExportPreferences) -> Result<FontVec> {
    if let Some(path) = &prefs.font_path {
        return read_font(path);
    }

    FONT_CANDIDATES
        .iter()
        .map(Path::new)
        .filter(|path| path.exists())
        .find_map(|path| read_font(path).ok())
        .ok_or_else(|| {
            CardError::Font("no usable system font found; set export.font_path".to_string())
        })
}

fn read_font(path: &Path) -> Result<FontVec> {
    let bytes = std::fs::read(path)
        .map_err(|e| CardError::Font(format!("{}: {}", path.display(), e)))?;
    FontVec::try_from_vec(bytes).map_err(|e| CardError::Font(format!("{}: {}", path.display(), e)))
}

/// Run an export request end to end.
pub fn save_face(request: &ExportRequest, prefs: &ExportPreferences) -> Result<PathBuf> {
    let font = load_font(prefs)?;
    let image = render_face(
        &request.card,
        request.face,
        &request.theme,
        &font,
        prefs.width,
        prefs.height,
    );
    write_png(&image, &request.path)?;

    tracing::info!(path = %request.path.display(), face = ?request.face, "card exported");
    Ok(request.path.clone())
}

fn write_png(image: &RgbaImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| CardError::Export(format!("{}: {}", path.display(), e)))
}

/// Rasterize one face of the card.
pub fn render_face(
    card: &CardData,
    face: Face,
    theme: &CardTheme,
    font: &FontVec,
    width: u32,
    height: u32,
) -> RgbaImage {
    let width = width.max(64);
    let height = height.max(64);

    let mut canvas = gradient_background(theme, width, height);
    draw_frame(&mut canvas, theme);

    let painter = Painter { font, width, height };
    match face {
        Face::Front => draw_front(&mut canvas, &painter, card, theme),
        Face::Back => draw_back(&mut canvas, &painter, card, theme),
    }

    canvas
}

fn rgba(color: Rgb) -> Rgba<u8> {
    Rgba([color.r, color.g, color.b, 255])
}

fn gradient_background(theme: &CardTheme, width: u32, height: u32) -> RgbaImage {
    let ramp: Vec<Rgba<u8>> = theme
        .background_ramp(RAMP_STEPS)
        .into_iter()
        .map(rgba)
        .collect();
    let span = (width + height).saturating_sub(2).max(1) as usize;

    RgbaImage::from_fn(width, height, |x, y| {
        let idx = (x + y) as usize * (RAMP_STEPS - 1) / span;
        ramp[idx.min(RAMP_STEPS - 1)]
    })
}

fn draw_frame(canvas: &mut RgbaImage, theme: &CardTheme) {
    let (width, height) = canvas.dimensions();
    let inset = (width.min(height) / 32).max(BORDER_THICKNESS + 1);
    let border = rgba(theme.border);

    for i in 0..BORDER_THICKNESS {
        let offset = inset + i;
        let w = width.saturating_sub(offset * 2);
        let h = height.saturating_sub(offset * 2);
        if w == 0 || h == 0 {
            break;
        }
        draw_hollow_rect_mut(
            canvas,
            Rect::at(offset as i32, offset as i32).of_size(w, h),
            border,
        );
    }

    let accent = rgba(theme.accent);
    let radius = (inset as i32 / 2).max(3);
    let near = (inset * 2) as i32;
    let far_x = width as i32 - near;
    let far_y = height as i32 - near;
    for (cx, cy) in [(near, near), (far_x, near), (near, far_y), (far_x, far_y)] {
        draw_filled_circle_mut(canvas, (cx, cy), radius, accent);
    }
}

struct Painter<'a> {
    font: &'a FontVec,
    width: u32,
    height: u32,
}

impl Painter<'_> {
    fn scale(&self, fraction: f32) -> PxScale {
        PxScale::from((self.height as f32 * fraction).max(8.0))
    }

    fn max_text_width(&self) -> u32 {
        self.width * 4 / 5
    }

    /// Draw a line centred horizontally at `y`, shrinking it until it fits.
    /// Returns the line height.
    fn centered(&self, canvas: &mut RgbaImage, text: &str, y: u32, scale: PxScale, color: Rgb) -> u32 {
        let mut scale = scale;
        let (mut w, mut h) = text_size(scale, self.font, text);
        while w > self.max_text_width() && scale.y > 10.0 {
            scale = PxScale::from(scale.y * 0.9);
            (w, h) = text_size(scale, self.font, text);
        }

        let x = self.width.saturating_sub(w) / 2;
        draw_text_mut(canvas, rgba(color), x as i32, y as i32, scale, self.font, text);
        h
    }

    /// Greedy word wrap against the rendered width.
    fn wrap(&self, text: &str, scale: PxScale) -> Vec<String> {
        let max = self.max_text_width();
        let mut lines = Vec::new();
        let mut current = String::new();

        for word in text.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };

            if text_size(scale, self.font, &candidate).0 <= max || current.is_empty() {
                current = candidate;
            } else {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }

    /// Wrap `text` into the band between `top` and `bottom`, shrinking the
    /// scale until it fits. At the smallest scale the tail is cut off.
    fn fit_block(&self, text: &str, top: u32, bottom: u32, scale: PxScale) -> TextBlock {
        let room = bottom.saturating_sub(top);
        let mut scale = scale;
        loop {
            let line_height = line_height(scale);
            let lines = self.wrap(text, scale);
            if lines.len() as u32 * line_height <= room || scale.y <= MIN_TEXT_PX {
                let mut block = TextBlock {
                    scale,
                    line_height,
                    lines,
                };
                block.truncate_to((room / line_height).max(1) as usize);
                return block;
            }
            scale = PxScale::from((scale.y * 0.9).max(MIN_TEXT_PX));
        }
    }
}

/// Smallest text size the message shrinks to
const MIN_TEXT_PX: f32 = 8.0;

fn line_height(scale: PxScale) -> u32 {
    ((scale.y * 1.35) as u32).max(1)
}

/// Wrapped lines laid out at one scale
struct TextBlock {
    scale: PxScale,
    line_height: u32,
    lines: Vec<String>,
}

impl TextBlock {
    fn height(&self) -> u32 {
        self.lines.len() as u32 * self.line_height
    }

    fn truncate_to(&mut self, max_lines: usize) {
        if self.lines.len() <= max_lines {
            return;
        }
        self.lines.truncate(max_lines);
        if let Some(last) = self.lines.last_mut() {
            last.push('\u{2026}');
        }
    }
}

fn draw_front(canvas: &mut RgbaImage, painter: &Painter, card: &CardData, theme: &CardTheme) {
    let h = painter.height;

    painter.centered(
        canvas,
        "CELEBRATING YOU",
        h * 18 / 100,
        painter.scale(0.028),
        theme.muted,
    );
    painter.centered(
        canvas,
        card.recipient_name.trim(),
        h * 24 / 100,
        painter.scale(0.085),
        theme.text,
    );

    draw_cake(canvas, painter.width / 2, h * 52 / 100, painter.width / 5, theme);

    painter.centered(
        canvas,
        "Happy Birthday",
        h * 70 / 100,
        painter.scale(0.06),
        theme.accent,
    );
}

/// Two tiers, a candle and a flame
fn draw_cake(canvas: &mut RgbaImage, center_x: u32, center_y: u32, size: u32, theme: &CardTheme) {
    let size = size.max(20);
    let cx = center_x as i32;
    let cy = center_y as i32;
    let s = size as i32;

    let bottom = Rect::at(cx - s / 2, cy).of_size(size, size / 3);
    let top = Rect::at(cx - s / 3, cy - s / 4).of_size(size * 2 / 3, size / 4);
    let candle = Rect::at(cx - s / 24, cy - s / 2).of_size((size / 12).max(2), size / 4);

    draw_filled_rect_mut(canvas, bottom, rgba(theme.border));
    draw_filled_rect_mut(canvas, top, rgba(theme.accent));
    draw_filled_rect_mut(canvas, candle, rgba(theme.text));
    draw_filled_circle_mut(canvas, (cx, cy - s / 2 - s / 16), (s / 14).max(2), rgba(theme.accent));
}

fn draw_back(canvas: &mut RgbaImage, painter: &Painter, card: &CardData, theme: &CardTheme) {
    let h = painter.height;
    let box_size = painter.width.min(h) * 2 / 5;
    let box_x = (painter.width - box_size) / 2;
    let box_y = h / 10;

    match card.photo.as_ref().map(|photo| photo.decode()) {
        Some(Ok(photo)) => draw_photo(canvas, &photo, box_x, box_y, box_size),
        Some(Err(error)) => {
            tracing::warn!(%error, "embedded photo could not be decoded for export");
            draw_gift_placeholder(canvas, box_x, box_y, box_size, theme);
        }
        None => draw_gift_placeholder(canvas, box_x, box_y, box_size, theme),
    }

    let message = card.ai_message.as_deref().unwrap_or_default();
    let quoted = format!("\u{201c}{}\u{201d}", message.trim());
    let sign_off_y = h * 80 / 100;

    let mut y = box_y + box_size + h / 20;
    let block = painter.fit_block(&quoted, y, sign_off_y - h / 30, painter.scale(0.032));
    for line in &block.lines {
        painter.centered(canvas, line, y, block.scale, theme.text);
        y += block.line_height;
    }

    painter.centered(
        canvas,
        "With all my love,",
        sign_off_y,
        painter.scale(0.028),
        theme.muted,
    );
    painter.centered(
        canvas,
        card.sender_name.trim(),
        sign_off_y + h / 22,
        painter.scale(0.045),
        theme.text,
    );
}

fn draw_photo(canvas: &mut RgbaImage, photo: &DynamicImage, x: u32, y: u32, size: u32) {
    let fitted = photo.thumbnail(size, size).to_rgba8();
    let offset_x = x + (size - fitted.width().min(size)) / 2;
    let offset_y = y + (size - fitted.height().min(size)) / 2;
    imageops::overlay(canvas, &fitted, offset_x as i64, offset_y as i64);
}

fn draw_gift_placeholder(canvas: &mut RgbaImage, x: u32, y: u32, size: u32, theme: &CardTheme) {
    let inner = size / 2;
    let left = x + (size - inner) / 2;
    let top = y + (size - inner) / 2;
    let ribbon = (inner / 8).max(2);

    draw_filled_rect_mut(
        canvas,
        Rect::at(left as i32, top as i32).of_size(inner, inner),
        rgba(theme.border),
    );
    draw_filled_rect_mut(
        canvas,
        Rect::at((left + (inner - ribbon) / 2) as i32, top as i32).of_size(ribbon, inner),
        rgba(theme.accent),
    );
    draw_filled_rect_mut(
        canvas,
        Rect::at(left as i32, (top + (inner - ribbon) / 2) as i32).of_size(inner, ribbon),
        rgba(theme.accent),
    );
}
