//! The per-session state machine.
//!
//! A [`Session`] owns the source text and everything derived from it: the
//! prompt list, the collected inputs, the input being composed, the run
//! status and the display output. It never performs I/O itself beyond the
//! source store. Operations that need the execution gateway return a
//! [`RunRequest`]; the caller issues it and reports back through
//! [`Session::resolve`], which drops results for superseded runs.

use tracing::{debug, info, warn};

use crate::extract::{DEFAULT_PROMPT_FUNCTION, extract_prompts_for};
use crate::gateway::{ExecOutput, GatewayError};
use crate::normalize::normalize_output;
use crate::store::SourceStore;

/// Input line label when no prompt is pending.
pub const DEFAULT_PLACEHOLDER_PROMPT: &str = "> ";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Nothing to collect; runs only on explicit request.
    #[default]
    Idle,
    AwaitingInput,
    Executing,
    Completed,
    Failed,
}

/// Identifies one gateway call and the source revision it was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTicket {
    revision: u64,
    seq: u64,
}

impl RunTicket {
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// A gateway call the caller must issue on the session's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub ticket: RunTicket,
    pub source: String,
    /// Collected inputs joined with `\n`.
    pub stdin: String,
}

/// What happened to a gateway result handed to [`Session::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The result was for the in-flight run and is now reflected in state.
    Applied(RunStatus),
    /// The run was superseded; the result was dropped.
    Stale,
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub prompt_function: String,
    pub placeholder_prompt: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            prompt_function: DEFAULT_PROMPT_FUNCTION.to_string(),
            placeholder_prompt: DEFAULT_PLACEHOLDER_PROMPT.to_string(),
        }
    }
}

pub struct Session {
    source: String,
    prompts: Vec<String>,
    inputs: Vec<String>,
    pending: String,
    status: RunStatus,
    output: Vec<String>,
    /// Bumped on every source change; tickets from older revisions are stale.
    revision: u64,
    next_seq: u64,
    in_flight: Option<RunTicket>,
    options: SessionOptions,
    store: Box<dyn SourceStore>,
}

impl Session {
    /// Start a session, restoring the persisted source if there is one.
    ///
    /// A store that fails to load is logged and treated as empty.
    pub fn restore(store: Box<dyn SourceStore>, options: SessionOptions) -> Self {
        let source = match store.load() {
            Ok(source) => source.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "failed to load persisted source");
                String::new()
            }
        };
        let mut session = Self {
            source,
            prompts: Vec::new(),
            inputs: Vec::new(),
            pending: String::new(),
            status: RunStatus::Idle,
            output: Vec::new(),
            revision: 0,
            next_seq: 0,
            in_flight: None,
            options,
            store,
        };
        session.rederive();
        session
    }

    // --- Accessors ---

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn pending_input(&self) -> &str {
        &self.pending
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn in_flight(&self) -> Option<RunTicket> {
        self.in_flight
    }

    /// Label for the next input slot. An empty prompt still occupies its
    /// slot but is labelled with the placeholder.
    pub fn active_prompt(&self) -> &str {
        match self.prompts.get(self.inputs.len()) {
            Some(prompt) if !prompt.is_empty() => prompt.as_str(),
            _ => self.placeholder_prompt(),
        }
    }

    /// Label for the input line when no prompt applies.
    pub fn placeholder_prompt(&self) -> &str {
        &self.options.placeholder_prompt
    }

    /// Whether an input slot is open and a submission would be collected.
    pub fn awaiting_input(&self) -> bool {
        self.status != RunStatus::Executing && self.inputs.len() < self.prompts.len()
    }

    // --- Source lifecycle ---

    /// Replace the source. Returns `false` if the text is unchanged.
    ///
    /// A change persists the new text, re-extracts prompts, clears inputs
    /// and output, and supersedes any in-flight run.
    pub fn set_source(&mut self, source: impl Into<String>) -> bool {
        let source = source.into();
        if source == self.source {
            return false;
        }
        self.source = source;
        self.revision += 1;
        if let Err(e) = self.store.save(&self.source) {
            warn!(error = %e, "failed to persist source");
        }
        self.rederive();
        info!(
            revision = self.revision,
            prompts = self.prompts.len(),
            "source updated"
        );
        true
    }

    /// Clear the source, all derived state and the persisted entry.
    pub fn reset(&mut self) {
        self.source.clear();
        self.revision += 1;
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear persisted source");
        }
        self.rederive();
        info!(revision = self.revision, "session reset");
    }

    fn rederive(&mut self) {
        if let Some(ticket) = self.in_flight.take() {
            debug!(?ticket, "superseding in-flight run");
        }
        self.prompts = extract_prompts_for(&self.source, &self.options.prompt_function);
        self.inputs.clear();
        self.pending.clear();
        self.output.clear();
        self.status = if self.prompts.is_empty() {
            RunStatus::Idle
        } else {
            RunStatus::AwaitingInput
        };
    }

    // --- Input collection ---

    pub fn set_pending_input(&mut self, text: impl Into<String>) {
        self.pending = text.into();
    }

    pub fn push_pending(&mut self, c: char) {
        self.pending.push(c);
    }

    pub fn pop_pending(&mut self) -> Option<char> {
        self.pending.pop()
    }

    pub fn clear_pending_input(&mut self) {
        self.pending.clear();
    }

    /// Collect the pending input into the next slot.
    ///
    /// Blank input, a full prompt list, or a run in progress make this a
    /// no-op. Filling the last slot starts a run, once per input set.
    pub fn submit_input(&mut self) -> Option<RunRequest> {
        if self.status == RunStatus::Executing {
            debug!("input submitted while executing; ignored");
            return None;
        }
        if self.inputs.len() >= self.prompts.len() {
            debug!("no input slot open; ignored");
            return None;
        }
        let value = self.pending.trim();
        if value.is_empty() {
            return None;
        }

        self.inputs.push(value.to_string());
        self.pending.clear();
        debug!(
            collected = self.inputs.len(),
            expected = self.prompts.len(),
            "input collected"
        );

        (self.inputs.len() == self.prompts.len()).then(|| self.begin_run())
    }

    /// Run now with whatever inputs are collected. Refused while executing.
    pub fn request_run(&mut self) -> Option<RunRequest> {
        if self.status == RunStatus::Executing {
            debug!("run requested while executing; ignored");
            return None;
        }
        Some(self.begin_run())
    }

    fn begin_run(&mut self) -> RunRequest {
        let ticket = RunTicket {
            revision: self.revision,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.in_flight = Some(ticket);
        self.status = RunStatus::Executing;
        info!(?ticket, inputs = self.inputs.len(), "starting run");
        RunRequest {
            ticket,
            source: self.source.clone(),
            stdin: self.inputs.join("\n"),
        }
    }

    // --- Results ---

    /// Apply a gateway result if it belongs to the in-flight run.
    pub fn resolve(
        &mut self,
        ticket: RunTicket,
        result: Result<ExecOutput, GatewayError>,
    ) -> Resolution {
        if self.in_flight != Some(ticket) {
            debug!(?ticket, current = self.revision, "discarding stale result");
            return Resolution::Stale;
        }
        self.in_flight = None;

        match result {
            Ok(exec) => {
                self.output = normalize_output(&exec.output, &self.prompts);
                self.status = RunStatus::Completed;
            }
            Err(e) => {
                warn!(error = %e, "execution failed");
                self.output = vec![e.failure_line().to_string()];
                self.status = RunStatus::Failed;
            }
        }
        info!(?ticket, status = ?self.status, lines = self.output.len(), "run finished");
        Resolution::Applied(self.status)
    }
}
