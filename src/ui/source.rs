use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Widget};
use unicode_width::UnicodeWidthChar;

use crate::app::{App, AppMode, Focus};

const TAB_WIDTH: usize = 4;

/// The editable source pane. Scrolls so the cursor always stays visible.
pub struct SourcePane<'a> {
    pub app: &'a App,
}

impl<'a> SourcePane<'a> {
    pub fn new(app: &'a App) -> Self {
        Self { app }
    }

    fn focused(&self) -> bool {
        self.app.focus == Focus::Editor
            && self.app.mode == AppMode::Normal
            && !self.app.show_help
            && self.app.error_detail.is_none()
    }

    fn block(&self) -> Block<'static> {
        let title = match self.app.detected_language() {
            Some(lang) => format!(" Source ({lang}) "),
            None => " Source ".to_string(),
        };
        let border = if self.app.focus == Focus::Editor {
            Color::Cyan
        } else {
            Color::DarkGray
        };
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .border_style(Style::default().fg(border))
    }

    /// Offsets `(rows, columns)` that keep the cursor inside `inner`.
    fn scroll(&self, inner: Rect) -> (usize, usize) {
        let (row, col) = self.app.form.source.cursor();
        let line = &self.app.form.source.lines()[row];
        let cursor_x = display_width(line.chars().take(col));
        (
            scroll_start(row, inner.height as usize),
            scroll_start(cursor_x, inner.width as usize),
        )
    }

    /// Where the terminal cursor belongs, if this pane has focus.
    pub fn cursor_position(&self, area: Rect) -> Option<Position> {
        if !self.focused() {
            return None;
        }
        let inner = self.block().inner(area);
        if inner.width == 0 || inner.height == 0 {
            return None;
        }

        let (row, col) = self.app.form.source.cursor();
        let (row_off, col_off) = self.scroll(inner);
        let line = &self.app.form.source.lines()[row];
        let x = display_width(line.chars().take(col)) - col_off;
        Some(Position::new(
            inner.x + x as u16,
            inner.y + (row - row_off) as u16,
        ))
    }
}

impl Widget for SourcePane<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = self.block();
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let source = &self.app.form.source;
        if source.is_blank() && !self.focused() {
            buf.set_string(
                inner.x + 1,
                inner.y,
                "Paste or type code here (Tab to focus)",
                Style::default().fg(Color::DarkGray),
            );
            return;
        }

        let (row_off, col_off) = self.scroll(inner);
        let style = Style::default().fg(Color::White);
        for (i, line) in source
            .lines()
            .iter()
            .skip(row_off)
            .take(inner.height as usize)
            .enumerate()
        {
            let visible = visible_slice(line, col_off, inner.width as usize);
            buf.set_string(inner.x, inner.y + i as u16, visible, style);
        }
    }
}

fn char_width(c: char) -> usize {
    if c == '\t' {
        TAB_WIDTH
    } else {
        c.width().unwrap_or(0)
    }
}

fn display_width(chars: impl Iterator<Item = char>) -> usize {
    chars.map(char_width).sum()
}

/// First visible index so that `pos` fits in a window of `len`.
fn scroll_start(pos: usize, len: usize) -> usize {
    if len == 0 {
        return pos;
    }
    (pos + 1).saturating_sub(len)
}

/// The part of `line` between display columns `skip` and `skip + max`.
fn visible_slice(line: &str, skip: usize, max: usize) -> String {
    let mut out = String::new();
    let mut x = 0;
    for c in line.chars() {
        let w = char_width(c);
        if x >= skip {
            if x + w - skip > max {
                break;
            }
            if c == '\t' {
                out.push_str(&" ".repeat(TAB_WIDTH));
            } else {
                out.push(c);
            }
        }
        x += w;
    }
    out
}
