use std::io;
use thiserror::Error;

/// Represent all LeetSync errors
#[derive(Error, Debug)]
pub enum LeetSyncError {
    /// Any Error
    #[error(transparent)]
    Any(#[from] anyhow::Error),

    /// IO Error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serde Error
    #[error("JSON error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Regex Error
    #[error(transparent)]
    Regex(#[from] regex::Error),

    /// Url Error
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Network or protocol failure while talking to a remote service
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// Invalid header value error
    #[error(transparent)]
    InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),

    /// Remote answered with a non-success status
    #[error("{service} returned HTTP {status}: {body}")]
    Http {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// Payload did not have the expected shape
    #[error("Unexpected response data: {0}")]
    Shape(String),

    /// Hosting service rejected a call
    #[error("GitHub API error: {0}")]
    Remote(String),

    /// Local command exited with a non-zero status
    #[error("Command `{command}` failed: {stderr}")]
    Process { command: String, stderr: String },

    /// Required configuration value is absent
    #[error("{0} not set in environment variables")]
    MissingConfig(&'static str),

    /// Configuration value is present but unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Secret sealing failure
    #[error("Failed to encrypt secret: {0}")]
    Crypto(String),

    /// User declined a confirmation prompt
    #[error("Aborted by user")]
    Aborted,
}

/// Handle Result<T, LeetSyncError>
pub type Result<T> = anyhow::Result<T, LeetSyncError>;
