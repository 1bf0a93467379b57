use std::error::Error as StdError;
use std::time::Duration;

use anyhow::{bail, Result};
use ashry_types::{ExecutionError, RunRequest};
use async_trait::async_trait;

use crate::ExecutionClient;

/// HTTP client for a remote code-execution server
pub struct HttpExecutionClient {
    base_url: String,
    client: reqwest::Client,
    health_timeout: Duration,
}

impl HttpExecutionClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            health_timeout: Duration::from_secs(1),
        }
    }

    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    pub fn run_url(&self) -> String {
        format!("{}/run", self.base_url)
    }
}

/// Flattens an error and its sources into one line, so the rendered message
/// carries the underlying cause ("... Connection refused").
fn describe(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_str = cause.to_string();
        if !message.contains(&cause_str) {
            message.push_str(": ");
            message.push_str(&cause_str);
        }
        source = cause.source();
    }

    message
}

#[async_trait]
impl ExecutionClient for HttpExecutionClient {
    async fn execute(&self, request: &RunRequest) -> Result<String, ExecutionError> {
        let run_url = self.run_url();
        tracing::debug!(url = %run_url, language = %request.language, "submitting code");

        // No timeout: a run takes as long as the server needs.
        let response = self
            .client
            .post(&run_url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, "execution endpoint is not reachable");
                ExecutionError::transport(describe(&err))
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "execution request failed");
            return Err(ExecutionError::status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|err| ExecutionError::transport(describe(&err)))
    }

    async fn health_check(&self) -> Result<()> {
        let health_url = format!("{}/health", self.base_url);
        let res = self
            .client
            .get(&health_url)
            .timeout(self.health_timeout)
            .send()
            .await;

        let response = match res {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(error = ?err, "execution server is not reachable");
                bail!("Execution server is not reachable: {}", describe(&err));
            }
        };

        if !response.status().is_success() {
            tracing::error!(
                status = response.status().as_u16(),
                "execution server health check failed"
            );
            bail!("Health check failed: {}", response.status());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ashry_types::Language;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_execute_posts_json_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/run")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(
                json!({ "code": "console.log(42)", "language": "javascript" }),
            ))
            .with_status(200)
            .with_body("42\n")
            .create_async()
            .await;

        let client = HttpExecutionClient::new(server.url());
        let body = client
            .execute(&RunRequest::new("console.log(42)", Language::JavaScript))
            .await
            .unwrap();

        assert_eq!(body, "42\n");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_execute_reports_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/run")
            .with_status(500)
            .with_body("SyntaxError: Unexpected token")
            .create_async()
            .await;

        let client = HttpExecutionClient::new(server.url());
        let err = client
            .execute(&RunRequest::new("}", Language::JavaScript))
            .await
            .unwrap_err();

        assert_eq!(err, ExecutionError::status(500));
    }

    #[tokio::test]
    async fn test_execute_reports_transport_failure() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpExecutionClient::new(format!("http://{addr}"));
        let err = client
            .execute(&RunRequest::new("1", Language::JavaScript))
            .await
            .unwrap_err();

        match err {
            ExecutionError::Transport { message } => {
                assert!(message.contains("error sending request"), "{message}");
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_base_url_trailing_slash() {
        let client = HttpExecutionClient::new("http://localhost:6065/".to_string());
        assert_eq!(client.run_url(), "http://localhost:6065/run");
    }

    #[tokio::test]
    async fn test_health_check() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/health")
            .with_status(200)
            .with_body("Server is running")
            .create_async()
            .await;

        let client = HttpExecutionClient::new(server.url());
        assert!(client.health_check().await.is_ok());
    }

    #[tokio::test]
    async fn test_health_check_failure_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/health")
            .with_status(503)
            .create_async()
            .await;

        let client = HttpExecutionClient::new(server.url());
        let err = client.health_check().await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }
}
