use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;
use unicode_width::UnicodeWidthStr;

use crate::app::{App, AppMode, Focus};
use crate::clipboard::NotificationKind;
use crate::ui::input::tail_fitting;

/// Bottom status bar showing mode, focus, detected language and notifications.
pub struct StatusBar<'a> {
    pub app: &'a App,
}

impl<'a> StatusBar<'a> {
    pub fn new(app: &'a App) -> Self {
        Self { app }
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        // Background
        let bg_style = Style::default().bg(Color::DarkGray).fg(Color::White);
        for x in area.x..area.x + area.width {
            buf[(x, area.y)].set_style(bg_style);
        }

        let mut spans = Vec::new();

        // Mode indicator
        let (mode_str, mode_bg) = match self.app.mode {
            AppMode::Normal => (" FORM ", Color::Blue),
            AppMode::Command => (" COMMAND ", Color::Magenta),
            AppMode::KeyEntry => (" KEY ", Color::Yellow),
        };
        let mode_style = Style::default()
            .bg(mode_bg)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);
        spans.push(Span::styled(mode_str, mode_style));
        spans.push(Span::raw(" "));

        let focus = match self.app.focus {
            Focus::Editor => "Source",
            Focus::Settings => "Settings",
        };
        let language = self.app.detected_language().unwrap_or("-");
        spans.push(Span::styled(
            format!("{focus} | {} | {language}", self.app.form.mode.label()),
            bg_style,
        ));

        if self.app.processing {
            spans.push(Span::styled(
                " [Processing...]",
                Style::default().bg(Color::DarkGray).fg(Color::Yellow),
            ));
        }

        // Notification (right-aligned)
        if let Some((ref note, _)) = self.app.notification {
            let color = match note.kind {
                NotificationKind::Success => Color::Green,
                NotificationKind::Warning => Color::Yellow,
                NotificationKind::Error => Color::Red,
            };
            let left_width: usize = spans.iter().map(|s| s.width()).sum();
            let room = (area.width as usize).saturating_sub(left_width + 1);
            let msg = tail_fitting(&note.message, room);
            let padding = (area.width as usize).saturating_sub(left_width + msg.width());
            if padding > 0 {
                spans.push(Span::styled(" ".repeat(padding), bg_style));
            }
            spans.push(Span::styled(
                msg,
                Style::default().bg(Color::DarkGray).fg(color),
            ));
        }

        let line = Line::from(spans);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}
