//! The execution boundary: something that runs a whole program with the
//! collected stdin and hands back its textual output.

pub mod http;
pub mod process;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::{GatewayConfig, GatewayKind};

pub use http::HttpGateway;
pub use process::ProcessGateway;

/// Raw transcript returned by a successful execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    pub output: String,
}

impl ExecOutput {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
        }
    }
}

/// Why an execution could not be completed.
///
/// The display text carries transport details for logs. Users only ever see
/// [`GatewayError::failure_line`].
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("execution service unavailable: {0}")]
    Unavailable(String),
    #[error("execution timed out")]
    Timeout,
    #[error("execution service rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("malformed response from execution service: {0}")]
    Malformed(String),
}

impl GatewayError {
    /// The single output line shown for this failure class.
    pub fn failure_line(&self) -> &'static str {
        match self {
            GatewayError::Unavailable(_) => "Error: Failed to run code (execution service unavailable).",
            GatewayError::Timeout => "Error: Code execution timed out.",
            GatewayError::Rejected { .. } => "Error: Failed to run code (request rejected).",
            GatewayError::Malformed(_) => "Error: Failed to run code (unexpected response).",
        }
    }
}

/// Runs programs on behalf of a session.
#[async_trait]
pub trait ExecutionGateway: Send + Sync {
    /// Run `source` to completion, feeding it `stdin`.
    async fn execute(&self, source: &str, stdin: &str) -> Result<ExecOutput, GatewayError>;

    /// Check that the gateway can accept work.
    async fn ping(&self) -> Result<(), GatewayError>;
}

/// Build the gateway described by `config`.
pub fn connect(config: &GatewayConfig) -> Result<Arc<dyn ExecutionGateway>> {
    let gateway: Arc<dyn ExecutionGateway> = match config.kind {
        GatewayKind::Http => Arc::new(HttpGateway::new(&config.url, config.timeout())?),
        GatewayKind::Process => Arc::new(ProcessGateway::new(
            &config.interpreter,
            config.interpreter_args.clone(),
            config.timeout(),
        )),
    };
    Ok(gateway)
}
