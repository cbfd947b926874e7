use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::gateway::ExecutionGateway;

/// Check that the execution gateway is reachable.
pub async fn ping<W: Write>(gateway: Arc<dyn ExecutionGateway>, out: &mut W) -> Result<()> {
    gateway
        .ping()
        .await
        .context("execution gateway is not reachable")?;
    writeln!(out, "ok")?;
    Ok(())
}
