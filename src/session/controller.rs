//! Async driver around a [`Session`].
//!
//! The controller issues the [`RunRequest`]s a session produces as tokio
//! tasks on the shared gateway, and feeds their results back through the
//! session's stale check. At most one task is alive: a source change or
//! reset aborts the outstanding one.

use std::sync::Arc;

use anyhow::{Result, bail};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::event::AppEvent;
use crate::gateway::{ExecOutput, ExecutionGateway, GatewayError};
use crate::session::state::{Resolution, RunRequest, RunStatus, RunTicket, Session};

pub struct Controller {
    session: Session,
    gateway: Arc<dyn ExecutionGateway>,
    events: mpsc::UnboundedSender<AppEvent>,
    task: Option<JoinHandle<()>>,
}

impl Controller {
    /// Results are delivered as [`AppEvent::Executed`] on `events`.
    pub fn new(
        session: Session,
        gateway: Arc<dyn ExecutionGateway>,
        events: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            session,
            gateway,
            events,
            task: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn set_source(&mut self, source: impl Into<String>) -> bool {
        let changed = self.session.set_source(source);
        if changed {
            self.abort_in_flight();
        }
        changed
    }

    pub fn reset(&mut self) {
        self.session.reset();
        self.abort_in_flight();
    }

    pub fn set_pending_input(&mut self, text: impl Into<String>) {
        self.session.set_pending_input(text);
    }

    pub fn push_pending(&mut self, c: char) {
        self.session.push_pending(c);
    }

    pub fn pop_pending(&mut self) -> Option<char> {
        self.session.pop_pending()
    }

    pub fn clear_pending_input(&mut self) {
        self.session.clear_pending_input();
    }

    /// Submit the pending input. Returns true if this started a run.
    pub fn submit_input(&mut self) -> bool {
        match self.session.submit_input() {
            Some(request) => {
                self.dispatch(request);
                true
            }
            None => false,
        }
    }

    /// Run now with the inputs collected so far. Returns true if a run started.
    pub fn request_run(&mut self) -> bool {
        match self.session.request_run() {
            Some(request) => {
                self.dispatch(request);
                true
            }
            None => false,
        }
    }

    /// Feed a gateway result back into the session.
    pub fn handle_result(
        &mut self,
        ticket: RunTicket,
        result: Result<ExecOutput, GatewayError>,
    ) -> Resolution {
        let resolution = self.session.resolve(ticket, result);
        if matches!(resolution, Resolution::Applied(_)) {
            self.task = None;
        }
        resolution
    }

    /// Drain `events` until the in-flight run resolves.
    ///
    /// Other events are discarded; callers outside the interactive loop have
    /// nothing else to react to.
    pub async fn wait_for_result(
        &mut self,
        events: &mut mpsc::UnboundedReceiver<AppEvent>,
    ) -> Result<RunStatus> {
        while self.session.status() == RunStatus::Executing {
            let Some(event) = events.recv().await else {
                bail!("event channel closed while a run was in flight");
            };
            if let AppEvent::Executed { ticket, result } = event
                && let Resolution::Applied(status) = self.handle_result(ticket, result)
            {
                return Ok(status);
            }
        }
        bail!("no run in flight")
    }

    fn dispatch(&mut self, request: RunRequest) {
        self.abort_in_flight();
        let gateway = Arc::clone(&self.gateway);
        let events = self.events.clone();
        debug!(ticket = ?request.ticket, "dispatching run");
        self.task = Some(tokio::spawn(async move {
            let result = gateway.execute(&request.source, &request.stdin).await;
            // The receiver may be gone if the session ended mid-run.
            let _ = events.send(AppEvent::Executed {
                ticket: request.ticket,
                result,
            });
        }));
    }

    fn abort_in_flight(&mut self) {
        if let Some(task) = self.task.take() {
            debug!("aborting outstanding gateway call");
            task.abort();
        }
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.abort_in_flight();
    }
}
