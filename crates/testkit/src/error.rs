//! Error types for response checks

use std::path::PathBuf;
use thiserror::Error;

use crate::selector::SelectorError;

/// A line of a page that still carries the unrendered placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderHit {
    /// Zero-based line index
    pub index: usize,
    pub line: String,
}

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("\"{sentinel}\" found in HTML page:\n{}", format_hits(.hits))]
    UnrenderedPlaceholder {
        sentinel: String,
        hits: Vec<PlaceholderHit>,
    },

    #[error("Got status code {actual}, expected {expected}")]
    StatusMismatch { actual: u16, expected: u16 },

    /// Node-count expectation failed; `detail` is the formatted comparison
    #[error("{message}: {detail}")]
    Count {
        message: String,
        detail: String,
        actual: usize,
    },

    #[error("HTML parsing failed: {reason} (content saved to {})", .saved_to.display())]
    Parse { reason: String, saved_to: PathBuf },

    #[error("Internal error: unable to name error artifact from label {0:?}")]
    InvalidLabel(String),

    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Fixture error: {0}")]
    Store(#[from] amy_common::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl CheckError {
    pub(crate) fn count_got(message: &str, actual: usize) -> Self {
        CheckError::Count {
            message: message.to_string(),
            detail: format!("got {}", actual),
            actual,
        }
    }

    pub(crate) fn count_expected(message: &str, expected: usize, actual: usize) -> Self {
        CheckError::Count {
            message: message.to_string(),
            detail: format!("expected {}, got {}", expected, actual),
            actual,
        }
    }
}

fn format_hits(hits: &[PlaceholderHit]) -> String {
    hits.iter()
        .map(|h| format!("{}: \"{}\"", h.index, h.line))
        .collect::<Vec<_>>()
        .join("\n")
}

pub type CheckResult<T> = Result<T, CheckError>;
