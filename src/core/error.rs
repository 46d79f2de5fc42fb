use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors a collection window can fail with. All of them are fatal to the
/// current window; nothing is retried internally.
#[derive(Debug, Error)]
pub enum Error {
    /// The store file exists but could not be read or is not a valid
    /// serialized sample list, or a write to it failed.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// Connection failure or a non-2xx response.
    #[error("network error: {0}")]
    Network(String),

    /// Response body was not valid JSON.
    #[error("response is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The expected JSON path or field was absent (e.g. no route found).
    #[error("unexpected response shape: missing {0}")]
    Schema(&'static str),
}

impl Error {
    pub fn storage(path: impl Into<PathBuf>, source: impl Into<anyhow::Error>) -> Self {
        Error::Storage {
            path: path.into(),
            source: source.into(),
        }
    }
}
