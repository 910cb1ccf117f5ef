use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::Widget;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// A simple single-line text input renderer.
///
/// Renders the prompt + text content, with a cursor indicator at the end.
pub struct TextInput<'a> {
    pub prompt: &'a str,
    pub text: &'a str,
    pub style: Style,
    pub masked: bool,
}

impl<'a> TextInput<'a> {
    pub fn new(prompt: &'a str, text: &'a str) -> Self {
        Self {
            prompt,
            text,
            style: Style::default().fg(Color::White),
            masked: false,
        }
    }

    /// Render every typed char as `*`.
    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }
}

/// Keep the rightmost chars of `s` that fit in `max` columns.
pub fn tail_fitting(s: &str, max: usize) -> &str {
    if s.width() <= max {
        return s;
    }
    let mut used = 0;
    let mut start = s.len();
    for (idx, c) in s.char_indices().rev() {
        let w = c.width().unwrap_or(0);
        if used + w > max {
            break;
        }
        used += w;
        start = idx;
    }
    &s[start..]
}

impl Widget for TextInput<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let text = if self.masked {
            "*".repeat(self.text.chars().count())
        } else {
            self.text.to_string()
        };
        let display = format!("{}{}\u{2588}", self.prompt, text);
        // If the display is wider than the area, show the rightmost portion.
        let visible = tail_fitting(&display, area.width as usize);

        buf.set_string(area.x, area.y, visible, self.style);
    }
}

#[cfg(test)]
mod tests {
    use super::tail_fitting;

    #[test]
    fn short_text_is_unchanged() {
        assert_eq!(tail_fitting(":run", 10), ":run");
    }

    #[test]
    fn long_text_keeps_the_end() {
        assert_eq!(tail_fitting(":load /a/b/c.rs", 6), "b/c.rs");
        assert_eq!(tail_fitting("日本語", 5), "本語");
    }
}
