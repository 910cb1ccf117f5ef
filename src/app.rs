use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::DefaultTerminal;

use crate::client::GatewayClient;
use crate::clipboard::{self, ClipboardError, Notification};
use crate::command::{self, Command};
use crate::config::AppConfig;
use crate::credentials::ApiKey;
use crate::editor::TextBuffer;
use crate::event::{AppEvent, Event, EventHandler, ProcessResult};
use crate::prompt::{CommentLevel, Mode, ProcessingRequest, detect_language};
use crate::session::{self, ProcessedResult, ValidationError};
use crate::ui;

const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

// ---------------------------------------------------------------------------
// Form state
// ---------------------------------------------------------------------------

/// Everything the user can set before submitting.
#[derive(Debug, Clone, Default)]
pub struct Form {
    pub source: TextBuffer,
    pub mode: Mode,
    pub comment_level: CommentLevel,
    pub preserve_structure: bool,
    pub debug: bool,
    pub optimize: bool,
    pub explain: bool,
    pub api_key: Option<ApiKey>,
}

impl Form {
    pub fn new(config: &AppConfig, api_key: Option<ApiKey>) -> Self {
        Self {
            mode: config.default_mode,
            comment_level: config.default_comment_level,
            api_key,
            ..Default::default()
        }
    }

    /// Freeze the form into the value handed to the prompt builder.
    pub fn snapshot(&self) -> ProcessingRequest {
        ProcessingRequest {
            api_key: self.api_key.as_ref().map(|k| k.expose().to_owned()),
            source_text: self.source.text(),
            mode: self.mode,
            comment_level: self.comment_level,
            preserve_structure: self.preserve_structure,
            debug: self.debug,
            optimize: self.optimize,
            explain: self.explain,
        }
    }
}

/// Rows of the settings panel, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingItem {
    Mode,
    Comments,
    Preserve,
    Debug,
    Optimize,
    Explain,
    ApiKey,
}

impl SettingItem {
    pub const ALL: [SettingItem; 7] = [
        SettingItem::Mode,
        SettingItem::Comments,
        SettingItem::Preserve,
        SettingItem::Debug,
        SettingItem::Optimize,
        SettingItem::Explain,
        SettingItem::ApiKey,
    ];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|i| *i == self).unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// App mode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Editor,
    Settings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppMode {
    Normal,
    Command,
    KeyEntry,
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    pub running: bool,
    pub events: EventHandler,
    pub config: AppConfig,

    pub focus: Focus,
    pub mode: AppMode,
    pub show_help: bool,

    // Form and result
    pub form: Form,
    pub settings_index: usize,
    pub result: Option<ProcessedResult>,
    pub result_scroll: u16,

    // Input state
    pub command_input: String,
    pub key_input: String,

    pub client: Option<GatewayClient>,
    copier: fn(&str) -> Result<(), ClipboardError>,

    // Status
    pub processing: bool,
    pub notification: Option<(Notification, Instant)>,
    pub error_detail: Option<String>,
}

impl App {
    pub fn new(config: AppConfig, client: Option<GatewayClient>, api_key: Option<ApiKey>) -> Self {
        let events = EventHandler::new(config.tick_rate_fps);
        Self::with_events(config, client, api_key, events)
    }

    pub fn with_events(
        config: AppConfig,
        client: Option<GatewayClient>,
        api_key: Option<ApiKey>,
        events: EventHandler,
    ) -> Self {
        Self {
            running: true,
            events,
            form: Form::new(&config, api_key),
            config,
            focus: Focus::Editor,
            mode: AppMode::Normal,
            show_help: false,
            settings_index: 0,
            result: None,
            result_scroll: 0,
            command_input: String::new(),
            key_input: String::new(),
            client,
            copier: clipboard::copy_to_clipboard,
            processing: false,
            notification: None,
            error_detail: None,
        }
    }

    // -- Main event loop ----------------------------------------------------

    pub async fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        while self.running {
            terminal.draw(|frame| self.draw(frame))?;
            match self.events.next().await? {
                Event::Tick => self.tick(),
                Event::Crossterm(event) => match event {
                    crossterm::event::Event::Key(key)
                        if key.kind == crossterm::event::KeyEventKind::Press =>
                    {
                        self.handle_key_event(key);
                    }
                    crossterm::event::Event::Paste(text) => self.handle_paste(&text),
                    _ => {}
                },
                Event::App(app_event) => self.handle_app_event(*app_event),
            }
        }
        Ok(())
    }

    fn draw(&self, frame: &mut ratatui::Frame) {
        ui::draw(frame, self);
    }

    fn tick(&mut self) {
        if let Some((_, shown_at)) = &self.notification
            && shown_at.elapsed() >= NOTIFICATION_TTL
        {
            self.notification = None;
        }
    }

    // -- Derived state ------------------------------------------------------

    pub fn detected_language(&self) -> Option<&'static str> {
        detect_language(&self.form.source.text())
    }

    pub fn selected_setting(&self) -> SettingItem {
        SettingItem::ALL[self.settings_index.min(SettingItem::ALL.len() - 1)]
    }

    fn notify(&mut self, notification: Notification) {
        self.notification = Some((notification, Instant::now()));
    }

    // -- Key event routing --------------------------------------------------

    fn handle_key_event(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        // Ctrl-C always quits.
        if ctrl && matches!(key.code, KeyCode::Char('c' | 'C')) {
            self.events.send(AppEvent::Quit);
            return;
        }

        if self.error_detail.is_some() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                self.error_detail = None;
            }
            return;
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('q' | '?')) {
                self.show_help = false;
            }
            return;
        }

        // Form-wide shortcuts, available from any focus outside text prompts.
        if self.mode == AppMode::Normal {
            match key.code {
                KeyCode::Char('s' | 'S') if ctrl => return self.events.send(AppEvent::Submit),
                KeyCode::F(5) => return self.events.send(AppEvent::Submit),
                KeyCode::Char('y' | 'Y') if ctrl => return self.events.send(AppEvent::CopyResult),
                KeyCode::Char('r' | 'R') if ctrl => return self.events.send(AppEvent::Reset),
                KeyCode::F(1) => return self.events.send(AppEvent::ToggleHelp),
                KeyCode::Tab => {
                    self.focus = match self.focus {
                        Focus::Editor => Focus::Settings,
                        Focus::Settings => Focus::Editor,
                    };
                    return;
                }
                KeyCode::PageDown => {
                    self.result_scroll = self.result_scroll.saturating_add(5);
                    return;
                }
                KeyCode::PageUp => {
                    self.result_scroll = self.result_scroll.saturating_sub(5);
                    return;
                }
                _ => {}
            }
        }

        match self.mode {
            AppMode::Normal => match self.focus {
                Focus::Editor => self.handle_editor_key(key),
                Focus::Settings => self.handle_settings_key(key),
            },
            AppMode::Command => self.handle_command_key(key),
            AppMode::KeyEntry => self.handle_key_entry(key),
        }
    }

    fn handle_paste(&mut self, text: &str) {
        match self.mode {
            AppMode::Normal if self.focus == Focus::Editor => self.form.source.insert_str(text),
            AppMode::KeyEntry => self.key_input.push_str(text.trim()),
            AppMode::Command => self.command_input.push_str(text.lines().next().unwrap_or("")),
            AppMode::Normal => {}
        }
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        let source = &mut self.form.source;
        match key.code {
            KeyCode::Esc => self.focus = Focus::Settings,
            KeyCode::Enter => source.insert_newline(),
            KeyCode::Backspace => source.backspace(),
            KeyCode::Delete => source.delete(),
            KeyCode::Left => source.move_left(),
            KeyCode::Right => source.move_right(),
            KeyCode::Up => source.move_up(),
            KeyCode::Down => source.move_down(),
            KeyCode::Home => source.move_home(),
            KeyCode::End => source.move_end(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                source.insert_char(c);
            }
            _ => {}
        }
    }

    fn handle_settings_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if self.settings_index + 1 < SettingItem::ALL.len() {
                    self.settings_index += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.settings_index = self.settings_index.saturating_sub(1);
            }
            KeyCode::Char(' ') | KeyCode::Enter => self.activate_setting(),
            KeyCode::Char(':') => {
                self.mode = AppMode::Command;
                self.command_input.clear();
            }
            KeyCode::Char('?') => self.events.send(AppEvent::ToggleHelp),
            KeyCode::Char('i' | 'e') => self.focus = Focus::Editor,
            KeyCode::Esc => self.focus = Focus::Editor,
            KeyCode::Char('q') => self.events.send(AppEvent::Quit),
            _ => {}
        }
    }

    fn activate_setting(&mut self) {
        let setting = self.selected_setting();
        let form = &mut self.form;
        match setting {
            SettingItem::Mode => form.mode = form.mode.toggled(),
            SettingItem::Comments => form.comment_level = form.comment_level.next(),
            SettingItem::Preserve => form.preserve_structure = !form.preserve_structure,
            SettingItem::Debug => form.debug = !form.debug,
            SettingItem::Optimize => form.optimize = !form.optimize,
            SettingItem::Explain => form.explain = !form.explain,
            SettingItem::ApiKey => {
                self.mode = AppMode::KeyEntry;
                self.key_input.clear();
            }
        }
    }

    fn handle_command_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.mode = AppMode::Normal;
                self.command_input.clear();
            }
            KeyCode::Enter => {
                self.mode = AppMode::Normal;
                self.execute_command();
            }
            KeyCode::Backspace => {
                self.command_input.pop();
            }
            KeyCode::Char(c) => {
                self.command_input.push(c);
            }
            _ => {}
        }
    }

    fn handle_key_entry(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.mode = AppMode::Normal;
                self.key_input.clear();
            }
            KeyCode::Enter => {
                self.mode = AppMode::Normal;
                self.form.api_key = ApiKey::new(std::mem::take(&mut self.key_input));
                let msg = if self.form.api_key.is_some() {
                    "API key set for this session"
                } else {
                    "API key cleared"
                };
                self.notify(Notification::success(msg));
            }
            KeyCode::Backspace => {
                self.key_input.pop();
            }
            KeyCode::Char(c) => {
                self.key_input.push(c);
            }
            _ => {}
        }
    }

    // -- Command execution --------------------------------------------------

    fn execute_command(&mut self) {
        let input = std::mem::take(&mut self.command_input);
        let Some(cmd) = command::parse_command(&input) else {
            self.notify(Notification::error(format!("Unknown command: {input}")));
            return;
        };

        match cmd {
            Command::Run => self.events.send(AppEvent::Submit),
            Command::Copy => self.events.send(AppEvent::CopyResult),
            Command::Reset => self.events.send(AppEvent::Reset),
            Command::Mode(mode) => self.form.mode = mode,
            Command::Comments(level) => self.form.comment_level = level,
            Command::ToggleDebug => self.form.debug = !self.form.debug,
            Command::ToggleOptimize => self.form.optimize = !self.form.optimize,
            Command::ToggleExplain => self.form.explain = !self.form.explain,
            Command::TogglePreserve => {
                self.form.preserve_structure = !self.form.preserve_structure;
            }
            Command::Key(key) => {
                self.form.api_key = ApiKey::new(key);
                self.notify(Notification::success("API key set for this session"));
            }
            Command::Load(path) => self.load_file(&path),
            Command::Settings => self.events.send(AppEvent::FocusSettings),
            Command::Help => self.events.send(AppEvent::ToggleHelp),
            Command::Quit => self.events.send(AppEvent::Quit),
        }
    }

    fn load_file(&mut self, path: &str) {
        let path = expand_home(path);
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                self.form.source.set_text(&contents);
                self.focus = Focus::Editor;
                self.notify(Notification::success(format!("Loaded {}", path.display())));
            }
            Err(e) => {
                self.notify(Notification::error(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )));
            }
        }
    }

    // -- App event handling -------------------------------------------------

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Quit => {
                self.running = false;
            }
            AppEvent::Submit => self.submit(),
            AppEvent::CopyResult => {
                let code = self.result.as_ref().map(|r| r.code.as_str());
                let notification = clipboard::manual_copy(code);
                self.notify(notification);
            }
            AppEvent::Reset => {
                if self.processing {
                    return;
                }
                self.form.source.clear();
                self.result = None;
                self.result_scroll = 0;
                self.focus = Focus::Editor;
            }
            AppEvent::ToggleHelp => {
                self.show_help = !self.show_help;
            }
            AppEvent::FocusSettings => {
                self.focus = Focus::Settings;
            }
            AppEvent::Processed(result) => self.finish(result),
        }
    }

    fn submit(&mut self) {
        if self.processing {
            return;
        }

        let request = self.form.snapshot();
        if let Err(e) = session::validate(&request, self.config.allow_server_key) {
            if e == ValidationError::MissingApiKey {
                self.focus = Focus::Settings;
                self.settings_index = SettingItem::ApiKey.index();
            }
            self.notify(Notification::error(e.to_string()));
            return;
        }

        let Some(client) = self.client.clone() else {
            self.notify(Notification::error(format!(
                "Invalid gateway URL: {}",
                self.config.gateway_url
            )));
            return;
        };

        self.processing = true;
        let sender = self.events.sender();
        let allow_server_key = self.config.allow_server_key;

        tokio::spawn(async move {
            let result: ProcessResult = session::run(&client, request, allow_server_key)
                .await
                .map_err(|e| Arc::new(e.to_string()));
            let _ = sender.send(Event::App(Box::new(AppEvent::Processed(result))));
        });
    }

    fn finish(&mut self, result: ProcessResult) {
        self.processing = false;
        match result {
            Ok(processed) => {
                let copied = (self.copier)(&processed.code);
                let notification = clipboard::processed_notification(&copied);
                self.notify(notification);
                self.result = Some(processed);
                self.result_scroll = 0;
            }
            Err(e) => {
                tracing::error!("processing failed: {e}");
                self.notify(Notification::error(format!("Error: {e}")));
                self.error_detail = Some(e.to_string());
            }
        }
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}
