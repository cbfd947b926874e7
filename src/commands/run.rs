use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::display::renderer::Renderer;
use crate::event::Io;
use crate::gateway::ExecutionGateway;
use crate::session::controller::Controller;
use crate::session::event_loop::{self, LoopConfig};
use crate::session::state::Session;
use crate::watch;

use super::RawModeGuard;

pub struct RunConfig {
    /// File to load into the session and watch for edits.
    pub file: Option<PathBuf>,
    /// Name of the persisted session.
    pub session: String,
}

/// Run an interactive session on the terminal.
pub async fn run(
    run: RunConfig,
    config: &Config,
    gateway: Arc<dyn ExecutionGateway>,
) -> Result<()> {
    let store = super::open_store(config, &run.session)?;
    let session = Session::restore(Box::new(store), config.session_options());

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let mut controller = Controller::new(session, gateway, event_tx.clone());

    // Keep the watcher alive for the whole session.
    let _watcher = match &run.file {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            controller.set_source(text);
            Some(watch::watch_source_file(path, event_tx)?)
        }
        None => None,
    };

    let loop_config = LoopConfig {
        watched: run.file,
        download_path: PathBuf::from(&config.session.download_name),
    };

    let mut io = Io::new(event_rx, spawn_terminal_reader());
    let _raw = RawModeGuard::acquire()?;
    let mut renderer = Renderer::new();
    event_loop::run_session(&mut controller, &mut renderer, &mut io, &loop_config).await;
    Ok(())
}

/// Forward crossterm events to a channel from a background task.
fn spawn_terminal_reader() -> mpsc::UnboundedReceiver<Event> {
    let (term_tx, term_rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut stream = EventStream::new();
        while let Some(Ok(event)) = stream.next().await {
            if term_tx.send(event).is_err() {
                return;
            }
        }
    });
    term_rx
}
