//! Vibe themes
//!
//! Static palettes applied to both card faces, in the terminal and in the
//! exported PNG.

use crate::card::Vibe;
use crate::color_space::{mix, Rgb};
use crate::stylize::{Gradient, LetterStyle};

/// Gift box colours, shared by every vibe
pub const GIFT_BOX: Rgb = Rgb::new(0xec, 0x48, 0x99);
pub const GIFT_RIBBON: Rgb = Rgb::new(0xfd, 0xe0, 0x47);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardTheme {
    pub vibe: Vibe,
    /// Top-left and bottom-right of the diagonal background gradient
    pub background: (Rgb, Rgb),
    pub border: Rgb,
    pub text: Rgb,
    /// Secondary lines ("Celebrating You", the sign-off)
    pub muted: Rgb,
    pub accent: Rgb,
    /// Decoration drawn in the card corners
    pub glyph: &'static str,
    pub letter_style: LetterStyle,
    pub name_gradient: Gradient,
}

impl CardTheme {
    pub fn for_vibe(vibe: Vibe) -> Self {
        match vibe {
            Vibe::CyberpunkNeon => Self {
                vibe,
                background: (Rgb::new(0x00, 0x00, 0x00), Rgb::new(0x0b, 0x0f, 0x1a)),
                border: Rgb::new(0x22, 0xd3, 0xee),
                text: Rgb::new(0x22, 0xd3, 0xee),
                muted: Rgb::new(0x67, 0xe8, 0xf9),
                accent: Rgb::new(0xd9, 0x46, 0xef),
                glyph: "⚡",
                letter_style: LetterStyle::Monospace,
                name_gradient: Gradient::Horizontal(
                    Rgb::new(0x22, 0xd3, 0xee),
                    Rgb::new(0xd9, 0x46, 0xef),
                ),
            },
            Vibe::RoyalGold => Self {
                vibe,
                background: (Rgb::new(0xff, 0xfb, 0xeb), Rgb::new(0xfe, 0xf9, 0xc3)),
                border: Rgb::new(0xea, 0xb3, 0x08),
                text: Rgb::new(0x78, 0x35, 0x0f),
                muted: Rgb::new(0xb4, 0x53, 0x09),
                accent: Rgb::new(0xca, 0x8a, 0x04),
                glyph: "👑",
                letter_style: LetterStyle::BoldScript,
                name_gradient: Gradient::Horizontal(
                    Rgb::new(0xb4, 0x53, 0x09),
                    Rgb::new(0xca, 0x8a, 0x04),
                ),
            },
            Vibe::SoftPastel => Self {
                vibe,
                background: (Rgb::new(0xfd, 0xf2, 0xf8), Rgb::new(0xef, 0xf6, 0xff)),
                border: Rgb::new(0xfb, 0xcf, 0xe8),
                text: Rgb::new(0x83, 0x18, 0x43),
                muted: Rgb::new(0xdb, 0x27, 0x77),
                accent: Rgb::new(0x93, 0xc5, 0xfd),
                glyph: "🌸",
                letter_style: LetterStyle::Script,
                name_gradient: Gradient::Horizontal(
                    Rgb::new(0xdb, 0x27, 0x77),
                    Rgb::new(0x60, 0xa5, 0xfa),
                ),
            },
            Vibe::VibrantParty => Self {
                vibe,
                background: (Rgb::new(0xa8, 0x55, 0xf7), Rgb::new(0xec, 0x48, 0x99)),
                border: Rgb::new(0xff, 0xff, 0xff),
                text: Rgb::new(0xff, 0xff, 0xff),
                muted: Rgb::new(0xfc, 0xe7, 0xf3),
                accent: Rgb::new(0xfd, 0xe0, 0x47),
                glyph: "🎉",
                letter_style: LetterStyle::SansSerifBold,
                name_gradient: Gradient::Rainbow,
            },
        }
    }

    /// Background colour at `t` along the gradient (0 = top-left)
    pub fn background_at(&self, t: f32) -> Rgb {
        mix(self.background.0, self.background.1, t)
    }

    /// Precomputed gradient ramp with `steps` entries
    pub fn background_ramp(&self, steps: usize) -> Vec<Rgb> {
        let last = steps.saturating_sub(1).max(1) as f32;
        (0..steps)
            .map(|i| self.background_at(i as f32 / last))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_vibe_has_a_theme() {
        for vibe in Vibe::all() {
            let theme = CardTheme::for_vibe(*vibe);
            assert_eq!(theme.vibe, *vibe);
            assert!(!theme.glyph.is_empty());
        }
    }

    #[test]
    fn test_themes_are_distinct() {
        let borders: Vec<Rgb> = Vibe::all()
            .iter()
            .map(|v| CardTheme::for_vibe(*v).border)
            .collect();
        for (i, a) in borders.iter().enumerate() {
            for b in borders.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_background_ramp_endpoints() {
        let theme = CardTheme::for_vibe(Vibe::VibrantParty);
        let ramp = theme.background_ramp(16);
        assert_eq!(ramp.len(), 16);
        assert_eq!(ramp[0], theme.background.0);
        assert_eq!(ramp[15], theme.background.1);
    }
}
