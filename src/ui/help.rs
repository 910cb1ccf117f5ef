use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};

/// Help overlay showing keybindings and commands.
#[derive(Default)]
pub struct HelpView;

impl HelpView {
    pub fn new() -> Self {
        Self
    }
}

impl Widget for HelpView {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = 64u16.min(area.width.saturating_sub(4));
        let height = 28u16.min(area.height.saturating_sub(2));
        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let y = area.y + (area.height.saturating_sub(height)) / 2;
        let panel = Rect::new(x, y, width, height);

        Clear.render(panel, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Help - Keybindings ")
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .border_style(Style::default().fg(Color::Cyan));

        let inner = block.inner(panel);
        block.render(panel, buf);

        let key_style = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD);
        let desc_style = Style::default().fg(Color::White);
        let section_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);

        let bindings: Vec<Line<'_>> = vec![
            Line::from(Span::styled("Anywhere", section_style)),
            binding_line("Ctrl-S/F5", "Process source", key_style, desc_style),
            binding_line("Ctrl-Y", "Copy result again", key_style, desc_style),
            binding_line("Ctrl-R", "Clear source and result", key_style, desc_style),
            binding_line("Tab", "Switch source/settings", key_style, desc_style),
            binding_line("PgUp/PgDn", "Scroll result", key_style, desc_style),
            binding_line("F1", "This help screen", key_style, desc_style),
            binding_line("Ctrl-C", "Quit", key_style, desc_style),
            Line::from(""),
            Line::from(Span::styled("Settings", section_style)),
            binding_line("j/k", "Move selection", key_style, desc_style),
            binding_line("Space/Enter", "Toggle or edit value", key_style, desc_style),
            binding_line(":", "Command mode", key_style, desc_style),
            binding_line("Esc/i", "Back to source", key_style, desc_style),
            binding_line("q", "Quit", key_style, desc_style),
            Line::from(""),
            Line::from(Span::styled("Commands", section_style)),
            binding_line(":run", "Process source", key_style, desc_style),
            binding_line(":mode M", "code | text", key_style, desc_style),
            binding_line(":comments L", "none | minimal | standard | detailed", key_style, desc_style),
            binding_line(":debug", "Toggle debug (also :optimize,", key_style, desc_style),
            binding_line("", ":explain, :preserve)", key_style, desc_style),
            binding_line(":key K", "Set API key for this session", key_style, desc_style),
            binding_line(":load PATH", "Read source from a file", key_style, desc_style),
            binding_line(":copy :reset", "Same as Ctrl-Y / Ctrl-R", key_style, desc_style),
        ];

        Paragraph::new(bindings).render(inner, buf);
    }
}

fn binding_line<'a>(key: &'a str, desc: &'a str, key_style: Style, desc_style: Style) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("  {key:<14}"), key_style),
        Span::styled(desc, desc_style),
    ])
}
