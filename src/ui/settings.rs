use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

use crate::app::{App, Focus, SettingItem};
use crate::credentials::ApiKey;

/// Settings panel: one row per [`SettingItem`], highlighted when focused.
pub struct SettingsPanel<'a> {
    pub app: &'a App,
}

impl<'a> SettingsPanel<'a> {
    pub fn new(app: &'a App) -> Self {
        Self { app }
    }

    fn row(&self, item: SettingItem) -> (&'static str, String) {
        let form = &self.app.form;
        match item {
            SettingItem::Mode => ("Mode", form.mode.label().to_string()),
            SettingItem::Comments => ("Comments", form.comment_level.label().to_string()),
            SettingItem::Preserve => ("Preserve structure", checkbox(form.preserve_structure)),
            SettingItem::Debug => ("Debug", checkbox(form.debug)),
            SettingItem::Optimize => ("Optimize", checkbox(form.optimize)),
            SettingItem::Explain => ("Explain", checkbox(form.explain)),
            SettingItem::ApiKey => ("API key", mask_key(form.api_key.as_ref())),
        }
    }
}

fn checkbox(on: bool) -> String {
    if on { "[x]" } else { "[ ]" }.to_string()
}

/// Show only the tail of a key.
fn mask_key(key: Option<&ApiKey>) -> String {
    let Some(key) = key else {
        return "not set".to_string();
    };
    let chars: Vec<char> = key.expose().chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

impl Widget for SettingsPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let focused = self.app.focus == Focus::Settings;
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Settings ")
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .border_style(Style::default().fg(if focused {
                Color::Cyan
            } else {
                Color::DarkGray
            }));

        let inner = block.inner(area);
        block.render(area, buf);

        let label_width = (inner.width as usize).saturating_sub(12).max(1);
        let mut lines: Vec<Line<'_>> = SettingItem::ALL
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let (label, value) = self.row(*item);
                let selected = focused && i == self.app.settings_index;
                let style = if selected {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                Line::from(vec![
                    Span::styled(format!(" {label:<label_width$}"), style),
                    Span::styled(format!("{value:>10} "), style),
                ])
            })
            .collect();

        lines.push(Line::from(""));
        let hint = if self.app.config.allow_server_key {
            " Server key allowed"
        } else {
            " Key stays in memory only"
        };
        lines.push(Line::from(Span::styled(
            hint,
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));

        Paragraph::new(lines).render(inner, buf);
    }
}
