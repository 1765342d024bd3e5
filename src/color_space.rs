//! Colour handling
//!
//! Theme colours are authored as 24-bit RGB and downgraded to whatever the
//! terminal can show. Gradients for the exported PNG are mixed in linear
//! light with `palette`.

use palette::{LinSrgb, Mix, Srgb};
use ratatui::style::Color;

use crate::terminal_capabilities::ColorSupport;

/// RGB color type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Convert RGB to perceptual luminance (0.0 to 1.0)
///
/// Uses ITU-R BT.709 coefficients.
pub fn rgb_to_luminance(r: u8, g: u8, b: u8) -> f32 {
    0.2126 * (r as f32 / 255.0) + 0.7152 * (g as f32 / 255.0) + 0.0722 * (b as f32 / 255.0)
}

/// Quantize RGB to ANSI 256-color palette
pub fn quantize_to_ansi256(rgb: Rgb) -> u8 {
    let Rgb { r, g, b } = rgb;

    // Near-gray values use the 24 step grayscale ramp (232-255)
    let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;
    let gray_diff = (r as i16 - avg as i16)
        .abs()
        .max((g as i16 - avg as i16).abs())
        .max((b as i16 - avg as i16).abs());

    if gray_diff < 10 {
        let gray_index = (avg as f32 / 255.0 * 23.0).round() as u8;
        return 232 + gray_index;
    }

    // 6x6x6 color cube (16-231)
    let r_index = (r as f32 / 255.0 * 5.0).round() as u8;
    let g_index = (g as f32 / 255.0 * 5.0).round() as u8;
    let b_index = (b as f32 / 255.0 * 5.0).round() as u8;

    16 + 36 * r_index + 6 * g_index + b_index
}

/// Quantize RGB to one of the 16 named ANSI colours
pub fn quantize_to_ansi16(rgb: Rgb) -> Color {
    let luminance = rgb_to_luminance(rgb.r, rgb.g, rgb.b);
    let bright = luminance > 0.5;

    let r = rgb.r as f32 / 255.0;
    let g = rgb.g as f32 / 255.0;
    let b = rgb.b as f32 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let saturation = if max > 0.0 { (max - min) / max } else { 0.0 };

    if saturation < 0.2 {
        return if luminance > 0.7 {
            Color::White
        } else if luminance > 0.3 {
            Color::Gray
        } else {
            Color::Black
        };
    }

    match (r >= g && r >= b, g >= r && g >= b, bright) {
        (true, _, false) if g > b => Color::Yellow,
        (true, _, true) if g > b => Color::LightYellow,
        (true, _, false) => Color::Red,
        (true, _, true) => Color::LightRed,
        (_, true, false) if b > r => Color::Cyan,
        (_, true, true) if b > r => Color::LightCyan,
        (_, true, false) => Color::Green,
        (_, true, true) => Color::LightGreen,
        (_, _, false) if r > g => Color::Magenta,
        (_, _, true) if r > g => Color::LightMagenta,
        (_, _, false) => Color::Blue,
        (_, _, true) => Color::LightBlue,
    }
}

/// Map a theme colour onto the terminal's capabilities
pub fn terminal_color(rgb: Rgb, support: ColorSupport) -> Color {
    match support {
        ColorSupport::NoColor => Color::Reset,
        ColorSupport::Color16 => quantize_to_ansi16(rgb),
        ColorSupport::Color256 => Color::Indexed(quantize_to_ansi256(rgb)),
        ColorSupport::TrueColor => Color::Rgb(rgb.r, rgb.g, rgb.b),
    }
}

/// Interpolate between two colours in linear light
pub fn mix(start: Rgb, end: Rgb, t: f32) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let a: LinSrgb<f32> = Srgb::new(start.r, start.g, start.b)
        .into_format::<f32>()
        .into_linear();
    let b: LinSrgb<f32> = Srgb::new(end.r, end.g, end.b)
        .into_format::<f32>()
        .into_linear();

    let mixed: Srgb<f32> = Srgb::from_linear(a.mix(b, t));
    let mixed: Srgb<u8> = mixed.into_format();
    Rgb::new(mixed.red, mixed.green, mixed.blue)
}
