use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap};
use unicode_width::UnicodeWidthStr;

/// Centered popup with the full message of a failed run.
pub struct ErrorPopup<'a> {
    text: &'a str,
}

impl<'a> ErrorPopup<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }
}

/// A next step for the common failures, if one applies.
fn hint_for(message: &str) -> Option<&'static str> {
    let lower = message.to_ascii_lowercase();
    if ["api key", "api-key", "authentication", "401"]
        .iter()
        .any(|needle| lower.contains(needle))
    {
        Some("Check the API key in settings (Tab, then API key).")
    } else if lower.contains("rate limit") || lower.contains("429") || lower.contains("overloaded") {
        Some("The API is busy. Wait a moment and press Ctrl-S again.")
    } else if lower.contains("connect") || lower.contains("http error") {
        Some("Is the gateway running? Start it with `copycode serve`.")
    } else {
        None
    }
}

fn wrapped_height(text: &str, width: usize) -> usize {
    text.lines()
        .map(|line| {
            if line.is_empty() || width == 0 {
                1
            } else {
                line.width().div_ceil(width)
            }
        })
        .sum::<usize>()
        .max(1)
}

impl Widget for ErrorPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let max_width = 70u16.min(area.width.saturating_sub(4));
        let inner_width = max_width.saturating_sub(2) as usize;
        let hint = hint_for(self.text);

        let mut text_lines = wrapped_height(self.text, inner_width);
        if let Some(hint) = hint {
            text_lines += 1 + wrapped_height(hint, inner_width);
        }

        // Borders plus the dismiss line and the blank line above it.
        let content_height = (text_lines as u16) + 4;
        let max_height = (area.height * 3 / 5).max(8);
        let height = content_height
            .min(max_height)
            .min(area.height.saturating_sub(2));

        let x = area.x + (area.width.saturating_sub(max_width)) / 2;
        let y = area.y + (area.height.saturating_sub(height)) / 2;
        let panel = Rect::new(x, y, max_width, height);

        Clear.render(panel, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Request Failed ")
            .title_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
            .border_style(Style::default().fg(Color::Red));

        let inner = block.inner(panel);
        block.render(panel, buf);

        if inner.height < 2 {
            return;
        }
        let text_area = Rect::new(inner.x, inner.y, inner.width, inner.height - 1);
        let dismiss_area = Rect::new(inner.x, inner.y + inner.height - 1, inner.width, 1);

        let mut lines: Vec<Line<'_>> = self.text.lines().map(Line::from).collect();
        if let Some(hint) = hint {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(hint, Style::default().fg(Color::Yellow))));
        }
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(text_area, buf);

        let dismiss = Line::from(Span::styled(
            " Press Esc or Enter to dismiss ",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ));
        Paragraph::new(dismiss).render(dismiss_area, buf);
    }
}
