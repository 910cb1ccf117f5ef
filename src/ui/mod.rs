pub mod command_bar;
pub mod error_popup;
pub mod help;
pub mod input;
pub mod result;
pub mod settings;
pub mod source;
pub mod status_bar;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use crate::app::{App, AppMode};

use command_bar::CommandBar;
use error_popup::ErrorPopup;
use help::HelpView;
use result::ResultPane;
use settings::SettingsPanel;
use source::SourcePane;
use status_bar::StatusBar;

const SETTINGS_WIDTH: u16 = 34;

pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Layout: main content + status bar + optional input bar
    let bottom_height = if app.mode != AppMode::Normal { 2 } else { 1 };

    let [main_area, bottom_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(bottom_height)]).areas(area);

    if app.mode != AppMode::Normal {
        let [status_area, cmd_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(bottom_area);
        frame.render_widget(StatusBar::new(app), status_area);
        frame.render_widget(CommandBar::new(app), cmd_area);
    } else {
        frame.render_widget(StatusBar::new(app), bottom_area);
    }

    // Source and result on the left, settings on the right
    let [left_area, settings_area] =
        Layout::horizontal([Constraint::Min(20), Constraint::Length(SETTINGS_WIDTH)])
            .areas(main_area);
    let [source_area, result_area] =
        Layout::vertical([Constraint::Percentage(55), Constraint::Percentage(45)])
            .areas(left_area);

    let source = SourcePane::new(app);
    if let Some(pos) = source.cursor_position(source_area) {
        frame.set_cursor_position(pos);
    }
    frame.render_widget(source, source_area);
    frame.render_widget(ResultPane::new(app), result_area);
    frame.render_widget(SettingsPanel::new(app), settings_area);

    if app.show_help {
        frame.render_widget(HelpView::new(), main_area);
    }

    // Error detail popup overlay (renders on top of everything)
    if let Some(ref detail) = app.error_detail {
        frame.render_widget(ErrorPopup::new(detail), frame.area());
    }
}
