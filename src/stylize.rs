//! Letter styling for the card front
//!
//! The recipient's name is drawn with Mathematical Alphanumeric Symbols and
//! coloured per grapheme, so each vibe gets its own lettering in the terminal.

use unicode_segmentation::UnicodeSegmentation;

use crate::color_space::{mix, Rgb};

/// Unicode letter styles used by the card themes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LetterStyle {
    /// 𝙰𝙱𝙲 (U+1D670)
    Monospace,
    /// 𝓐𝓑𝓒 (U+1D4D0)
    BoldScript,
    /// 𝒜ℬ𝒞 (U+1D49C)
    Script,
    /// 𝗔𝗕𝗖 (U+1D5D4)
    SansSerifBold,
}

impl LetterStyle {
    fn uppercase_base(&self) -> u32 {
        match self {
            LetterStyle::Monospace => 0x1D670,
            LetterStyle::BoldScript => 0x1D4D0,
            LetterStyle::Script => 0x1D49C,
            LetterStyle::SansSerifBold => 0x1D5D4,
        }
    }

    fn lowercase_base(&self) -> u32 {
        match self {
            LetterStyle::Monospace => 0x1D68A,
            LetterStyle::BoldScript => 0x1D4EA,
            LetterStyle::Script => 0x1D4B6,
            LetterStyle::SansSerifBold => 0x1D5EE,
        }
    }

    fn digit_base(&self) -> Option<u32> {
        match self {
            LetterStyle::Monospace => Some(0x1D7F6),
            LetterStyle::SansSerifBold => Some(0x1D7EC),
            LetterStyle::BoldScript | LetterStyle::Script => None,
        }
    }

    /// Restyle ASCII letters and digits, leaving everything else alone.
    pub fn apply(&self, text: &str) -> String {
        text.chars().map(|c| self.transform_char(c)).collect()
    }

    fn transform_char(&self, c: char) -> char {
        if c.is_ascii_uppercase() {
            let offset = c as u32 - 'A' as u32;
            // Script capitals that live in the Letterlike Symbols block
            let code = match (self, c) {
                (LetterStyle::Script, 'B') => 0x212C,
                (LetterStyle::Script, 'E') => 0x2130,
                (LetterStyle::Script, 'F') => 0x2131,
                (LetterStyle::Script, 'H') => 0x210B,
                (LetterStyle::Script, 'I') => 0x2110,
                (LetterStyle::Script, 'L') => 0x2112,
                (LetterStyle::Script, 'M') => 0x2133,
                (LetterStyle::Script, 'R') => 0x211B,
                _ => self.uppercase_base() + offset,
            };
            return char::from_u32(code).unwrap_or(c);
        }

        if c.is_ascii_lowercase() {
            let offset = c as u32 - 'a' as u32;
            let code = match (self, c) {
                (LetterStyle::Script, 'e') => 0x212F,
                (LetterStyle::Script, 'g') => 0x210A,
                (LetterStyle::Script, 'o') => 0x2134,
                _ => self.lowercase_base() + offset,
            };
            return char::from_u32(code).unwrap_or(c);
        }

        if c.is_ascii_digit() {
            if let Some(base) = self.digit_base() {
                return char::from_u32(base + (c as u32 - '0' as u32)).unwrap_or(c);
            }
        }

        c
    }
}

/// How the name's graphemes are coloured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gradient {
    Horizontal(Rgb, Rgb),
    Rainbow,
}

/// Split `text` into graphemes, each paired with its gradient colour.
pub fn gradient_graphemes(text: &str, gradient: Gradient) -> Vec<(String, Rgb)> {
    let graphemes: Vec<&str> = text.graphemes(true).collect();
    let len = graphemes.len();

    graphemes
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let color = match gradient {
                Gradient::Horizontal(start, end) => {
                    let t = if len > 1 {
                        i as f32 / (len - 1) as f32
                    } else {
                        0.0
                    };
                    mix(start, end, t)
                }
                Gradient::Rainbow => hue_to_rgb((i as f32 / len.max(1) as f32) * 360.0),
            };
            (g.to_string(), color)
        })
        .collect()
}

/// Convert hue (0-360) to a fully saturated RGB colour
fn hue_to_rgb(hue: f32) -> Rgb {
    let h = hue / 60.0;
    let x = 1.0 - ((h % 2.0) - 1.0).abs();

    let (r, g, b) = match h as u32 {
        0 => (1.0, x, 0.0),
        1 => (x, 1.0, 0.0),
        2 => (0.0, 1.0, x),
        3 => (0.0, x, 1.0),
        4 => (x, 0.0, 1.0),
        _ => (1.0, 0.0, x),
    };

    Rgb::new((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sans_bold() {
        assert_eq!(LetterStyle::SansSerifBold.apply("Sam"), "𝗦𝗮𝗺");
    }

    #[test]
    fn test_script_exceptions() {
        let styled = LetterStyle::Script.apply("Bree");
        assert!(styled.starts_with('ℬ'));
        assert!(styled.contains('ℯ'));
    }

    #[test]
    fn test_preserves_spaces_and_accents() {
        let styled = LetterStyle::Monospace.apply("Zoë A");
        assert!(styled.contains('ë'));
        assert!(styled.contains(' '));
    }

    #[test]
    fn test_script_has_no_digits() {
        assert_eq!(LetterStyle::Script.apply("30"), "30");
        assert_eq!(LetterStyle::Monospace.apply("3"), "𝟹");
    }

    #[test]
    fn test_gradient_endpoints() {
        let red = Rgb::new(255, 0, 0);
        let blue = Rgb::new(0, 0, 255);
        let parts = gradient_graphemes("abc", Gradient::Horizontal(red, blue));
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].1, red);
        assert_eq!(parts[2].1, blue);
    }

    #[test]
    fn test_rainbow_starts_red() {
        let parts = gradient_graphemes("ab", Gradient::Rainbow);
        assert_eq!(parts[0].1, Rgb::new(255, 0, 0));
    }
}
