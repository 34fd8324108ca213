use std::path::PathBuf;

use thiserror::Error;

/// Everything that can abort a ducking run.
#[derive(Debug, Error)]
pub enum DuckError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("unsupported audio layout: {0}")]
    UnsupportedLayout(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("resampling failed: {0}")]
    Resample(String),

    #[error("failed to encode {path}: {reason}")]
    Encode { path: PathBuf, reason: String },

    #[error("mix error: {0}")]
    Mix(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl DuckError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn config(reason: impl Into<String>) -> Self {
        Self::Config(reason.into())
    }
}

pub type Result<T> = std::result::Result<T, DuckError>;
