use crossterm::event::Event;
use tokio::sync::mpsc;

use crate::gateway::{ExecOutput, GatewayError};
use crate::session::state::RunTicket;

/// Application event consumed by the session event loop.
#[derive(Debug)]
pub enum AppEvent {
    /// A gateway call finished, successfully or not.
    Executed {
        ticket: RunTicket,
        result: Result<ExecOutput, GatewayError>,
    },
    /// The watched source file changed on disk.
    SourceFileChanged,
}

/// Anything the event loop can wake up for.
#[derive(Debug)]
pub enum IoEvent {
    App(AppEvent),
    Terminal(Event),
    /// Both channels are closed; nothing more will arrive.
    Closed,
}

/// Merges application events and terminal events into one stream.
pub struct Io {
    event_rx: mpsc::UnboundedReceiver<AppEvent>,
    term_rx: mpsc::UnboundedReceiver<Event>,
}

impl Io {
    pub fn new(
        event_rx: mpsc::UnboundedReceiver<AppEvent>,
        term_rx: mpsc::UnboundedReceiver<Event>,
    ) -> Self {
        Self { event_rx, term_rx }
    }

    /// Wait for the next event. Application events win ties so a finished
    /// run is shown before further keystrokes are handled.
    pub async fn next_event(&mut self) -> IoEvent {
        tokio::select! {
            biased;
            Some(event) = self.event_rx.recv() => IoEvent::App(event),
            Some(event) = self.term_rx.recv() => IoEvent::Terminal(event),
            else => IoEvent::Closed,
        }
    }
}
