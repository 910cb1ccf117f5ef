use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

use crate::app::App;

/// Read-only pane showing the code extracted from the last reply.
pub struct ResultPane<'a> {
    pub app: &'a App,
}

impl<'a> ResultPane<'a> {
    pub fn new(app: &'a App) -> Self {
        Self { app }
    }
}

impl Widget for ResultPane<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = match self.app.result.as_ref().and_then(|r| r.language) {
            Some(lang) => format!(" Result ({lang}) "),
            None => " Result ".to_string(),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_style(
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )
            .border_style(Style::default().fg(Color::DarkGray));

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let Some(result) = &self.app.result else {
            let msg = if self.app.processing {
                "Processing..."
            } else {
                "Processed code appears here (Ctrl-S to run)"
            };
            buf.set_string(inner.x + 1, inner.y, msg, Style::default().fg(Color::DarkGray));
            return;
        };

        // Clamp so scrolling past the end still shows the last screen.
        let lines = result.code.lines().count() as u16;
        let max_scroll = lines.saturating_sub(inner.height);
        let scroll = self.app.result_scroll.min(max_scroll);

        Paragraph::new(result.code.as_str())
            .style(Style::default().fg(Color::White))
            .scroll((scroll, 0))
            .render(inner, buf);
    }
}
