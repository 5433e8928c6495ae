//! Error types for browser workflows

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("WebDriver failed to start: {0}")]
    DriverStartup(String),

    #[error("WebDriver health check failed after {0} attempts")]
    DriverHealthCheck(usize),

    #[error("WebDriver error: {0}")]
    WebDriver(String),

    #[error("No {0}")]
    ElementNotFound(String),

    #[error("More than one {what} ({count} matches)")]
    AmbiguousElement { what: String, count: usize },

    #[error("No route named {0:?}")]
    UnknownRoute(String),

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<fantoccini::error::CmdError> for E2eError {
    fn from(e: fantoccini::error::CmdError) -> Self {
        E2eError::WebDriver(e.to_string())
    }
}

impl From<fantoccini::error::NewSessionError> for E2eError {
    fn from(e: fantoccini::error::NewSessionError) -> Self {
        E2eError::DriverStartup(e.to_string())
    }
}

pub type E2eResult<T> = Result<T, E2eError>;
