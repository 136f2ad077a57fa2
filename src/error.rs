//! Error types shared by every fetch, walk and record operation.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("request to `{url}` failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("`{url}` responded with HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("unexpected response body from `{url}`")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("IO error at `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid zip archive `{0}`")]
    Archive(PathBuf, #[source] zip::result::ZipError),

    #[error("`{archive}` did not unpack to `{expected}`")]
    ArchiveLayout { archive: PathBuf, expected: PathBuf },

    #[error("invalid API URL `{0}`")]
    ApiUrl(String),

    #[error("no home directory for the cache; set TUTORIAL_CACHE_DIR or pass --cache-dir")]
    NoHomeDir,

    #[error("malformed record on line {line} of `{path}`")]
    Record {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    #[error("response has no `{0}`")]
    MissingField(&'static str),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io(path.into(), source)
    }

    pub(crate) fn transport(url: &str, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.to_owned(),
            source,
        }
    }
}
