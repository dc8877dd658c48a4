//! Client library for the AISHE question-answering server (HTTP transport,
//! error taxonomy, interactive console session).
//! Used by the `aishe` binary.

pub mod client;
pub mod config;
pub mod error;
pub mod messages;
pub mod session;

pub use client::{connect, Client};
pub use config::{default_config_path, ApiSection, Config, ConfigError, Endpoint};
pub use error::ClientError;
pub use messages::{Answer, HealthStatus, SourceRef};
pub use session::{Session, SessionExit};
