//! HTTP client: health probe and question answering against the RAG server.

use std::time::Duration;

use crate::config::Endpoint;
use crate::error::ClientError;
use crate::messages::{
    error_detail, Answer, AnswerResponse, HealthResponse, HealthStatus, QuestionRequest,
};

pub const HEALTH_PATH: &str = "/health";
pub const ASK_PATH: &str = "/api/v1/ask";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Health,
    Ask,
}

/// Client bound to one endpoint. Owns a single keep-alive HTTP client until
/// [`Client::close`] or drop.
#[derive(Debug)]
pub struct Client {
    endpoint: Endpoint,
    http: Option<reqwest::Client>,
}

/// Build a client for `base_url` (or `AISHE_API_URL`, or the local default).
pub fn connect(base_url: Option<&str>, timeout: Duration) -> Result<Client, ClientError> {
    Client::new(Endpoint::resolve(base_url, timeout))
}

impl Client {
    pub fn new(endpoint: Endpoint) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(endpoint.timeout())
            .pool_max_idle_per_host(1)
            .build()
            .map_err(|e| ClientError::Client {
                message: format!("failed to build HTTP client: {}", e),
                source: Some(Box::new(e)),
            })?;
        tracing::debug!(
            base_url = endpoint.base_url(),
            timeout = ?endpoint.timeout(),
            "client created"
        );
        Ok(Self {
            endpoint,
            http: Some(http),
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Release the underlying connection. Returns `false` if already closed.
    pub fn close(&mut self) -> bool {
        let released = self.http.take().is_some();
        if released {
            tracing::debug!(base_url = self.endpoint.base_url(), "client closed");
        }
        released
    }

    pub fn is_closed(&self) -> bool {
        self.http.is_none()
    }

    /// `GET /health`.
    pub async fn probe_health(&self) -> Result<HealthStatus, ClientError> {
        let http = self.http()?;
        let url = self.endpoint.url(HEALTH_PATH);
        tracing::debug!(%url, "probing server health");

        let response = http
            .get(&url)
            .send()
            .await
            .map_err(|e| self.classify(Operation::Health, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::ServerError {
                status: status.as_u16(),
                message: format!("Server returned error: {}", status.as_u16()),
                source: None,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.classify(Operation::Health, e))?;
        let health: HealthResponse = serde_json::from_str(&body)?;
        Ok(health.into())
    }

    /// `POST /api/v1/ask` with the trimmed question.
    ///
    /// A blank question fails with [`ClientError::InvalidInput`] before any
    /// request is made.
    pub async fn ask_question(&self, question: &str) -> Result<Answer, ClientError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ClientError::InvalidInput("Question cannot be empty".into()));
        }

        let http = self.http()?;
        let url = self.endpoint.url(ASK_PATH);
        tracing::debug!(%url, chars = question.len(), "asking question");

        let response = http
            .post(&url)
            .json(&QuestionRequest::new(question))
            .send()
            .await
            .map_err(|e| self.classify(Operation::Ask, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| self.classify(Operation::Ask, e))?;
            let detail = error_detail(&body);
            tracing::debug!(status = status.as_u16(), %detail, "server rejected question");
            return Err(ClientError::ServerError {
                status: status.as_u16(),
                message: format!("Server error ({}): {}", status.as_u16(), detail),
                source: None,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.classify(Operation::Ask, e))?;
        let answer: AnswerResponse = serde_json::from_str(&body)?;
        tracing::debug!(
            sources = answer.sources.len(),
            processing_time = answer.processing_time,
            "answer received"
        );
        Ok(answer.into())
    }

    fn http(&self) -> Result<&reqwest::Client, ClientError> {
        self.http.as_ref().ok_or_else(|| ClientError::Client {
            message: "client is closed".into(),
            source: None,
        })
    }

    /// Connect failures, then timeouts, are unreachability; the rest is generic.
    fn classify(&self, op: Operation, err: reqwest::Error) -> ClientError {
        let base_url = self.endpoint.base_url();
        let secs = self.endpoint.timeout().as_secs_f64();
        if err.is_connect() {
            ClientError::ServerNotReachable {
                message: format!(
                    "Cannot connect to server at {}. Make sure the server is running.",
                    base_url
                ),
                source: Some(Box::new(err)),
            }
        } else if err.is_timeout() {
            let message = match op {
                Operation::Health => {
                    format!("Request to {} timed out after {} seconds.", base_url, secs)
                }
                Operation::Ask => format!(
                    "Request timed out after {} seconds. The question might be too complex.",
                    secs
                ),
            };
            ClientError::ServerNotReachable {
                message,
                source: Some(Box::new(err)),
            }
        } else {
            ClientError::Client {
                message: format!("Unexpected error: {}", err),
                source: Some(Box::new(err)),
            }
        }
    }
}
