// src/error.rs
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DashboardError {
    /// Required input missing or unparseable; caught before any request.
    #[error("{0}")]
    Validation(String),

    /// The server answered with an explicit error; the message is passed through verbatim.
    #[error("{0}")]
    Server(String),

    #[error("Server unreachable: {0}")]
    Transport(String),

    /// Payload did not have the shape the renderer expects.
    #[error("Unexpected response: {0}")]
    Render(String),
}

impl DashboardError {
    pub fn validation(message: impl Into<String>) -> Self {
        DashboardError::Validation(message.into())
    }
}

impl From<reqwest::Error> for DashboardError {
    fn from(e: reqwest::Error) -> Self {
        DashboardError::Transport(e.to_string())
    }
}
