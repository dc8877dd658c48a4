//! Error taxonomy for the transport client.
//!
//! Every failure surfaced by [`crate::Client`] is exactly one of these four
//! kinds. Callers match on the variant; nothing is retried internally.

use thiserror::Error;

/// Lower-level error wrapped by a [`ClientError`].
pub type Cause = Box<dyn std::error::Error + Send + Sync>;

/// Client operation error.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Local precondition failed; no request was sent.
    #[error("{0}")]
    InvalidInput(String),

    /// The server could not be reached (connection refused or timed out).
    #[error("{message}")]
    ServerNotReachable {
        message: String,
        #[source]
        source: Option<Cause>,
    },

    /// The server answered with a non-success status.
    #[error("{message}")]
    ServerError {
        status: u16,
        message: String,
        #[source]
        source: Option<Cause>,
    },

    /// Anything else: malformed payloads, missing fields, a closed client.
    #[error("{message}")]
    Client {
        message: String,
        #[source]
        source: Option<Cause>,
    },
}

impl ClientError {
    pub(crate) fn unexpected<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ClientError::Client {
            message: format!("Unexpected error: {}", err),
            source: Some(Box::new(err)),
        }
    }

    /// Short label used in log events.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientError::InvalidInput(_) => "invalid_input",
            ClientError::ServerNotReachable { .. } => "server_not_reachable",
            ClientError::ServerError { .. } => "server_error",
            ClientError::Client { .. } => "client",
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::unexpected(e)
    }
}
