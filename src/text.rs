//! Display-width aware text helpers
//!
//! Card text is laid out in fixed-width terminal boxes, so measuring has to
//! account for wide characters and multi-codepoint emoji.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Calculate the display width of a string
pub fn display_width(s: &str) -> usize {
    s.width()
}

/// Truncate a string to fit within a maximum display width
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    for grapheme in s.graphemes(true) {
        let grapheme_width = grapheme.width();
        if current_width + grapheme_width > max_width {
            break;
        }
        result.push_str(grapheme);
        current_width += grapheme_width;
    }

    result
}

/// Truncate with a trailing ellipsis when the text does not fit
pub fn ellipsize(s: &str, max_width: usize) -> String {
    if display_width(s) <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    format!("{}…", truncate_to_width(s, max_width - 1))
}

/// Greedy word wrap. Words longer than a line are split on grapheme
/// boundaries; explicit newlines start a new line.
pub fn wrap_to_width(s: &str, max_width: usize) -> Vec<String> {
    let max_width = max_width.max(1);
    let mut lines = Vec::new();

    for paragraph in s.split('\n') {
        let mut current = String::new();
        let mut current_width = 0;

        for word in paragraph.split_whitespace() {
            let mut word = word.to_string();
            let mut word_width = display_width(&word);

            if current_width > 0 && current_width + 1 + word_width <= max_width {
                current.push(' ');
                current.push_str(&word);
                current_width += 1 + word_width;
                continue;
            }

            if current_width > 0 {
                lines.push(std::mem::take(&mut current));
            }

            while word_width > max_width {
                let head = truncate_to_width(&word, max_width);
                // A single grapheme wider than the line still has to go somewhere
                let head = if head.is_empty() {
                    word.graphemes(true).next().unwrap_or_default().to_string()
                } else {
                    head
                };
                word = word[head.len()..].to_string();
                word_width = display_width(&word);
                lines.push(head);
            }

            current = word;
            current_width = word_width;
        }

        lines.push(current);
    }

    lines
}
