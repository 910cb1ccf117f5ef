use color_eyre::eyre::OptionExt;
use crossterm::event::Event as CrosstermEvent;
use futures::{FutureExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::session::ProcessedResult;

/// Representation of all possible events.
#[derive(Clone, Debug)]
pub enum Event {
    /// An event that is emitted on a regular schedule.
    Tick,
    /// Crossterm events from the terminal.
    Crossterm(CrosstermEvent),
    /// Application-level events.
    App(Box<AppEvent>),
}

/// Application events: form actions and the result of a processing run.
#[derive(Clone, Debug)]
pub enum AppEvent {
    Quit,
    Submit,
    CopyResult,
    Reset,
    ToggleHelp,
    FocusSettings,

    /// Sent from the spawned request task back to the event loop.
    Processed(ProcessResult),
}

/// Run result using `Arc<String>` so errors are `Clone`.
pub type ProcessResult = Result<ProcessedResult, Arc<String>>;

/// Terminal event handler.
///
/// Spawns a background task that emits tick and crossterm events, and exposes
/// an unbounded channel for application events.
#[derive(Debug)]
pub struct EventHandler {
    /// Event sender channel.
    sender: mpsc::UnboundedSender<Event>,
    /// Event receiver channel.
    receiver: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Constructs a new instance of [`EventHandler`] and spawns the event task.
    pub fn new(tick_rate_fps: f64) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let actor = EventTask::new(sender.clone(), tick_rate_fps);
        tokio::spawn(async { actor.run().await });
        Self { sender, receiver }
    }

    /// Handler with no terminal reader attached; events only arrive via
    /// [`EventHandler::send`].
    #[cfg(test)]
    pub fn detached() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self { sender, receiver }
    }

    /// Receives the next event, blocking until one is available.
    pub async fn next(&mut self) -> color_eyre::Result<Event> {
        self.receiver
            .recv()
            .await
            .ok_or_eyre("Failed to receive event")
    }

    /// Take an already queued event without waiting.
    #[cfg(test)]
    pub fn try_next(&mut self) -> Option<Event> {
        self.receiver.try_recv().ok()
    }

    /// Queue an app event to be processed by the event loop.
    pub fn send(&self, app_event: AppEvent) {
        let _ = self.sender.send(Event::App(Box::new(app_event)));
    }

    /// Clone the underlying sender for use in spawned async tasks.
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.sender.clone()
    }
}

/// Background task that reads crossterm events and emits ticks.
struct EventTask {
    sender: mpsc::UnboundedSender<Event>,
    tick_rate: Duration,
}

impl EventTask {
    fn new(sender: mpsc::UnboundedSender<Event>, tick_rate_fps: f64) -> Self {
        let fps = if tick_rate_fps > 0.0 { tick_rate_fps } else { 30.0 };
        Self {
            sender,
            tick_rate: Duration::from_secs_f64(1.0 / fps),
        }
    }

    async fn run(self) -> color_eyre::Result<()> {
        let mut reader = crossterm::event::EventStream::new();
        let mut tick = tokio::time::interval(self.tick_rate);
        loop {
            let tick_delay = tick.tick();
            let crossterm_event = reader.next().fuse();
            tokio::select! {
                _ = self.sender.closed() => {
                    break;
                }
                _ = tick_delay => {
                    self.send(Event::Tick);
                }
                Some(Ok(evt)) = crossterm_event => {
                    self.send(Event::Crossterm(evt));
                }
            };
        }
        Ok(())
    }

    fn send(&self, event: Event) {
        let _ = self.sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_positive_fps_falls_back_to_default() {
        let (sender, _receiver) = mpsc::unbounded_channel();
        let task = EventTask::new(sender.clone(), 0.0);
        assert_eq!(task.tick_rate, Duration::from_secs_f64(1.0 / 30.0));

        let task = EventTask::new(sender, 10.0);
        assert_eq!(task.tick_rate, Duration::from_millis(100));
    }

    #[test]
    fn sent_app_events_are_queued_in_order() {
        let mut events = EventHandler::detached();
        events.send(AppEvent::Submit);
        events.send(AppEvent::Processed(Err(Arc::new("boom".into()))));

        assert!(matches!(events.try_next(), Some(Event::App(e)) if matches!(*e, AppEvent::Submit)));
        match events.try_next() {
            Some(Event::App(e)) => match *e {
                AppEvent::Processed(Err(msg)) => assert_eq!(msg.as_str(), "boom"),
                other => panic!("unexpected event: {other:?}"),
            },
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(events.try_next().is_none());
    }
}
