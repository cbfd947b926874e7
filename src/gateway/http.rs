//! Gateway backed by a remote execution service over HTTP.
//!
//! `POST {url}/run` with `{"code": ..., "input": ...}` answers
//! `{"output": ...}`; `GET {url}/ping` is the health check.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ExecOutput, ExecutionGateway, GatewayError};

#[derive(Serialize)]
struct RunBody<'a> {
    code: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct RunReply {
    #[serde(default)]
    output: Option<String>,
}

pub struct HttpGateway {
    http: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

fn classify(err: &reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout
    } else if err.is_decode() {
        GatewayError::Malformed(err.to_string())
    } else {
        GatewayError::Unavailable(err.to_string())
    }
}

fn rejected(status: StatusCode, body: &str) -> GatewayError {
    if matches!(
        status,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT
    ) {
        return GatewayError::Timeout;
    }
    GatewayError::Rejected {
        status: status.as_u16(),
        body: body.chars().take(200).collect(),
    }
}

#[async_trait]
impl ExecutionGateway for HttpGateway {
    async fn execute(&self, source: &str, stdin: &str) -> Result<ExecOutput, GatewayError> {
        let url = self.endpoint("run");
        debug!(%url, source_len = source.len(), "posting run request");

        let response = self
            .http
            .post(&url)
            .json(&RunBody {
                code: source,
                input: stdin,
            })
            .send()
            .await
            .map_err(|e| classify(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(rejected(status, &body));
        }

        let reply: RunReply = response.json().await.map_err(|e| classify(&e))?;
        Ok(ExecOutput::new(reply.output.unwrap_or_default()))
    }

    async fn ping(&self) -> Result<(), GatewayError> {
        let response = self
            .http
            .get(self.endpoint("ping"))
            .send()
            .await
            .map_err(|e| classify(&e))?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(rejected(status, &body))
        }
    }
}
