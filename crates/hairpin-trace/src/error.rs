//! Error types for trace preparation

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TraceError {
    #[error("{}:{line}: malformed trace line: {reason}", .path.display())]
    MalformedLine {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("{}:{line}: invalid schedule entry: {reason}", .path.display())]
    InvalidSchedule {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Invalid bandwidth sample {value} at period {period}")]
    InvalidBandwidth { period: usize, value: f64 },

    #[error("Window {window} has zero mean bandwidth and cannot be rescaled")]
    ZeroMeanWindow { window: usize },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TraceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TraceError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, line: usize, reason: impl Into<String>) -> Self {
        TraceError::MalformedLine {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TraceError>;
