use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tokio::sync::mpsc;
use tracing::warn;

use crate::config::Config;
use crate::gateway::ExecutionGateway;
use crate::session::controller::Controller;
use crate::session::state::{RunStatus, Session};
use crate::store::MemoryStore;

pub struct ExecConfig {
    pub file: PathBuf,
    /// Answers for the file's prompts, in order.
    pub inputs: Vec<String>,
}

/// Run a file once without a terminal session and print its output lines.
///
/// Inputs are submitted in order exactly as typed answers would be, so blank
/// ones are skipped and filling the last prompt starts the run. When the
/// inputs do not complete the prompt list, the run is requested explicitly
/// with what was collected. The session is ephemeral: nothing is persisted.
pub async fn exec<W: Write>(
    exec: ExecConfig,
    config: &Config,
    gateway: Arc<dyn ExecutionGateway>,
    out: &mut W,
) -> Result<RunStatus> {
    let source = std::fs::read_to_string(&exec.file)
        .with_context(|| format!("failed to read {}", exec.file.display()))?;

    let session = Session::restore(Box::new(MemoryStore::new()), config.session_options());
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let mut controller = Controller::new(session, gateway, event_tx);
    controller.set_source(source);

    let mut started = false;
    for input in &exec.inputs {
        if started {
            break;
        }
        controller.set_pending_input(input.as_str());
        started = controller.submit_input();
    }

    let collected = controller.session().inputs().len();
    if collected < exec.inputs.len() {
        warn!(
            given = exec.inputs.len(),
            collected,
            prompts = controller.session().prompts().len(),
            "some inputs were not used"
        );
    }

    if !started && !controller.request_run() {
        bail!("could not start a run");
    }

    let status = controller.wait_for_result(&mut event_rx).await?;
    for line in controller.session().output() {
        writeln!(out, "{line}")?;
    }
    Ok(status)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use super::*;
    use crate::gateway::{ExecOutput, GatewayError};

    /// Replies with the prompts echoed the way an interpreter would.
    #[derive(Default)]
    struct EchoGateway {
        stdin_seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ExecutionGateway for EchoGateway {
        async fn execute(&self, _source: &str, stdin: &str) -> Result<ExecOutput, GatewayError> {
            self.stdin_seen.lock().unwrap().push(stdin.to_string());
            let mut output = String::new();
            for (i, line) in stdin.lines().enumerate() {
                output.push_str(&format!("Q{}:{line}\nA{}={line}\n", i + 1, i + 1));
            }
            Ok(ExecOutput::new(output))
        }

        async fn ping(&self) -> Result<(), GatewayError> {
            Ok(())
        }
    }

    fn write_source(dir: &TempDir, source: &str) -> PathBuf {
        let path = dir.path().join("prog.py");
        std::fs::write(&path, source).unwrap();
        path
    }

    async fn exec_with(source: &str, inputs: &[&str]) -> (RunStatus, String, Vec<String>) {
        let dir = TempDir::new().unwrap();
        let file = write_source(&dir, source);
        let gateway = Arc::new(EchoGateway::default());
        let mut out = Vec::new();
        let status = exec(
            ExecConfig {
                file,
                inputs: inputs.iter().map(ToString::to_string).collect(),
            },
            &Config::default(),
            Arc::clone(&gateway) as Arc<dyn ExecutionGateway>,
            &mut out,
        )
        .await
        .unwrap();
        let seen = gateway.stdin_seen.lock().unwrap().clone();
        (status, String::from_utf8(out).unwrap(), seen)
    }

    #[tokio::test]
    async fn inputs_fill_prompts_and_run_once() {
        let (status, out, seen) =
            exec_with("a = input('Q1:')\nb = input('Q2:')", &["x", "y", "extra"]).await;
        assert_eq!(status, RunStatus::Completed);
        assert_eq!(seen, vec!["x\ny"]);
        assert_eq!(out, "x\nA1=x\ny\nA2=y\n");
    }

    #[tokio::test]
    async fn missing_inputs_run_explicitly() {
        let (status, _, seen) = exec_with("a = input('Q1:')\nb = input('Q2:')", &["only"]).await;
        assert_eq!(status, RunStatus::Completed);
        assert_eq!(seen, vec!["only"]);
    }

    #[tokio::test]
    async fn blank_inputs_are_skipped() {
        let (_, _, seen) = exec_with("a = input('Q1:')", &["  ", "real"]).await;
        assert_eq!(seen, vec!["real"]);
    }

    #[tokio::test]
    async fn no_prompts_runs_with_empty_stdin() {
        let (status, out, seen) = exec_with("print('hi')", &[]).await;
        assert_eq!(status, RunStatus::Completed);
        assert_eq!(seen, vec![""]);
        assert_eq!(out, "");
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let result = exec(
            ExecConfig {
                file: PathBuf::from("/nonexistent/prog.py"),
                inputs: Vec::new(),
            },
            &Config::default(),
            Arc::new(EchoGateway::default()),
            &mut Vec::new(),
        )
        .await;
        assert!(result.is_err());
    }
}
