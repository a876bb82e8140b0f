use thiserror::Error;

/// Errors that end a run.
///
/// Per-change failures during submit or reviewer-add are not represented here;
/// those are reported and collected by the workflow instead.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed URL, credentials or labels
    #[error("{0}")]
    Config(String),

    /// Nothing to operate on, or a malformed change argument
    #[error("{0}")]
    Usage(String),

    /// The server answered with a status the current step cannot accept
    #[error("Failed to {action} {change} (HTTP {status}): {body}")]
    UnexpectedStatus {
        action: &'static str,
        change: String,
        status: u16,
        body: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode server response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Prompt failed: {0}")]
    Prompt(#[from] inquire::InquireError),

    #[error("Cancelled...")]
    Cancelled,
}

impl Error {
    pub fn unexpected_status(action: &'static str, change: &str, status: u16, body: &str) -> Self {
        Error::UnexpectedStatus {
            action,
            change: change.to_string(),
            status,
            body: body.trim_end().to_string(),
        }
    }

    /// The server's own text for a rejected request, otherwise the full message.
    pub fn detail(&self) -> String {
        match self {
            Error::UnexpectedStatus { status, body, .. } => format!("HTTP {}: {}", status, body),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
