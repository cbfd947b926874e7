//! Gateway that runs programs with a local interpreter.
//!
//! The source is written to a temporary file and executed as
//! `interpreter [args...] <file>`, with the collected input piped to stdin.
//! The transcript is stdout followed by stderr.

use std::io::Write as _;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::{ExecOutput, ExecutionGateway, GatewayError};

const SOURCE_SUFFIX: &str = ".py";

pub struct ProcessGateway {
    interpreter: String,
    args: Vec<String>,
    timeout: Duration,
}

impl ProcessGateway {
    pub fn new(interpreter: &str, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            interpreter: interpreter.to_string(),
            args,
            timeout,
        }
    }

    fn unavailable(&self, what: &str, err: &std::io::Error) -> GatewayError {
        GatewayError::Unavailable(format!("{what} ({}): {err}", self.interpreter))
    }
}

#[async_trait]
impl ExecutionGateway for ProcessGateway {
    async fn execute(&self, source: &str, stdin: &str) -> Result<ExecOutput, GatewayError> {
        // Held until the child exits; the file is removed on drop.
        let mut file = tempfile::Builder::new()
            .prefix("promptrun-")
            .suffix(SOURCE_SUFFIX)
            .tempfile()
            .map_err(|e| self.unavailable("failed to create source file", &e))?;
        file.write_all(source.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|e| self.unavailable("failed to write source file", &e))?;

        let mut cmd = Command::new(&self.interpreter);
        cmd.args(&self.args)
            .arg(file.path())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(interpreter = %self.interpreter, path = %file.path().display(), "spawning program");
        let mut child = cmd
            .spawn()
            .map_err(|e| self.unavailable("failed to spawn interpreter", &e))?;

        if let Some(mut pipe) = child.stdin.take() {
            let input = stdin.to_string();
            tokio::spawn(async move {
                // The program may exit without reading everything.
                let _ = pipe.write_all(input.as_bytes()).await;
                let _ = pipe.shutdown().await;
            });
        }

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| GatewayError::Timeout)?
            .map_err(|e| self.unavailable("failed to collect program output", &e))?;

        debug!(status = ?output.status.code(), "program exited");
        let mut transcript = String::from_utf8_lossy(&output.stdout).into_owned();
        transcript.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(ExecOutput::new(transcript))
    }

    async fn ping(&self) -> Result<(), GatewayError> {
        let status = Command::new(&self.interpreter)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| self.unavailable("failed to spawn interpreter", &e))?;
        if !status.success() {
            return Err(GatewayError::Unavailable(format!(
                "{} --version exited with {status}",
                self.interpreter
            )));
        }
        Ok(())
    }
}

#[cfg(all(test, unix))]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sh(timeout: Duration) -> ProcessGateway {
        ProcessGateway::new("sh", Vec::new(), timeout)
    }

    #[tokio::test]
    async fn feeds_stdin_lines() {
        let source = "read name\nread age\necho \"$name is $age\"\n";
        let out = sh(Duration::from_secs(5))
            .execute(source, "Alice\n30")
            .await
            .unwrap();
        assert_eq!(out.output, "Alice is 30\n");
    }

    #[tokio::test]
    async fn stderr_follows_stdout() {
        let source = "echo err 1>&2\necho out\n";
        let out = sh(Duration::from_secs(5)).execute(source, "").await.unwrap();
        assert_eq!(out.output, "out\nerr\n");
    }

    #[tokio::test]
    async fn failing_program_still_returns_output() {
        let source = "echo partial\nexit 3\n";
        let out = sh(Duration::from_secs(5)).execute(source, "").await.unwrap();
        assert_eq!(out.output, "partial\n");
    }

    #[tokio::test]
    async fn slow_program_times_out() {
        let err = sh(Duration::from_millis(200))
            .execute("sleep 5\n", "")
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Timeout));
    }

    #[tokio::test]
    async fn ping_requires_successful_exit() {
        let failing = ProcessGateway::new("false", Vec::new(), Duration::from_secs(5));
        assert!(matches!(
            failing.ping().await,
            Err(GatewayError::Unavailable(_))
        ));
        let healthy = ProcessGateway::new("true", Vec::new(), Duration::from_secs(5));
        assert!(healthy.ping().await.is_ok());
    }

    #[tokio::test]
    async fn missing_interpreter_is_unavailable() {
        let gateway = ProcessGateway::new(
            "/nonexistent/promptrun-interpreter",
            Vec::new(),
            Duration::from_secs(1),
        );
        let err = gateway.execute("", "").await.unwrap_err();
        assert!(matches!(err, GatewayError::Unavailable(_)));
        assert!(gateway.ping().await.is_err());
    }
}
