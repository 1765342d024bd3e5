//! Terminal capability detection
//!
//! Detects colour support and terminal size so themes degrade gracefully.

use crossterm::terminal;
use std::env;

/// Level of color support in the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSupport {
    NoColor,
    Color16,
    Color256,
    #[default]
    TrueColor,
}

impl ColorSupport {
    pub fn name(&self) -> &'static str {
        match self {
            ColorSupport::NoColor => "None",
            ColorSupport::Color16 => "16 Colors",
            ColorSupport::Color256 => "256 Colors",
            ColorSupport::TrueColor => "True Color",
        }
    }
}

/// Terminal capabilities
#[derive(Debug, Clone)]
pub struct TerminalCapabilities {
    pub color_support: ColorSupport,
    pub size: (u16, u16),
}

impl Default for TerminalCapabilities {
    fn default() -> Self {
        Self {
            color_support: ColorSupport::TrueColor,
            size: (80, 24),
        }
    }
}

/// Detect terminal capabilities
pub fn detect_capabilities() -> TerminalCapabilities {
    let color_support = color_support_from_env(|key| env::var(key).ok());
    let size = terminal::size().unwrap_or((80, 24));

    TerminalCapabilities {
        color_support,
        size,
    }
}

/// Work out colour support from environment variables.
///
/// `lookup` stands in for `std::env::var` so detection can be tested.
pub fn color_support_from_env(lookup: impl Fn(&str) -> Option<String>) -> ColorSupport {
    // NO_COLOR disables colour regardless of anything else
    if lookup("NO_COLOR").is_some() {
        return ColorSupport::NoColor;
    }

    let colorterm = lookup("COLORTERM").map(|v| v.to_lowercase());
    if let Some(ref colorterm) = colorterm {
        if colorterm.contains("truecolor") || colorterm.contains("24bit") {
            return ColorSupport::TrueColor;
        }
    }

    if let Some(term) = lookup("TERM").map(|v| v.to_lowercase()) {
        if term.contains("kitty")
            || term.contains("alacritty")
            || term.contains("iterm")
            || term.contains("vte")
            || term.contains("256color")
        {
            if colorterm.is_some() {
                return ColorSupport::TrueColor;
            }
            return ColorSupport::Color256;
        }

        if term.contains("xterm") {
            return ColorSupport::Color16;
        }

        if term.contains("screen") || term.contains("tmux") {
            return ColorSupport::Color256;
        }

        if term.contains("linux") || term.contains("console") {
            return ColorSupport::Color16;
        }
    }

    if lookup("WT_SESSION").is_some() {
        return ColorSupport::TrueColor;
    }

    ColorSupport::Color256
}
