//! HTTP message types for the question-answering server. Client ↔ server JSON.

use serde::{Deserialize, Serialize};

/// Client → server: `POST /api/v1/ask` body.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionRequest<'a> {
    pub question: &'a str,
}

impl<'a> QuestionRequest<'a> {
    pub fn new(question: &'a str) -> Self {
        Self { question }
    }
}

/// One cited source. `number` is the citation index used in the answer text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub number: u32,
    pub title: String,
    pub url: String,
}

/// Server → client: `POST /api/v1/ask` success body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AnswerResponse {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<SourceRef>,
    pub processing_time: f64,
}

/// Server → client: `GET /health` body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthResponse {
    pub status: String,
    pub ollama_accessible: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Health of the server and its generation backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
    pub service_accessible: bool,
    pub message: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

impl From<HealthResponse> for HealthStatus {
    fn from(r: HealthResponse) -> Self {
        Self {
            status: r.status,
            service_accessible: r.ollama_accessible,
            message: r.message,
        }
    }
}

/// Generated answer with its citations, in server order.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<SourceRef>,
    pub processing_time_secs: f64,
}

impl From<AnswerResponse> for Answer {
    fn from(r: AnswerResponse) -> Self {
        Self {
            text: r.answer,
            sources: r.sources,
            processing_time_secs: r.processing_time,
        }
    }
}

/// Pull a human-readable message out of an error response body.
///
/// Prefers the JSON `detail` field, then the whole JSON document, then the
/// raw text when the body is not JSON at all.
pub fn error_detail(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => match value.get("detail") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => value.to_string(),
        },
        Err(_) => body.to_string(),
    }
}
