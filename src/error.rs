//! Error taxonomy for the runtime library.
//!
//! Loader and lookup errors surface to whoever called the lifecycle stage that
//! triggered them. Nothing here is retried or swallowed.

use thiserror::Error;

use crate::runner::RunnerState;
use crate::tiles::TileCoord;

pub type Result<T, E = RuntimeError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("failed to load manifest: {0}")]
    ManifestLoad(#[from] LoadError),

    #[error("unknown sprite '{0}'")]
    UnknownSprite(String),

    #[error("no animated tile registered at {0}")]
    UnknownTileOverride(TileCoord),

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error("cannot {operation} while the runner is {state:?}")]
    Lifecycle {
        operation: &'static str,
        state: RunnerState,
    },

    #[error("display surface error: {0}")]
    Surface(#[from] std::io::Error),

    #[error("failed to decode texture {url}: {source}")]
    Texture {
        url: String,
        #[source]
        source: image::ImageError,
    },
}

impl RuntimeError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        RuntimeError::Configuration(msg.into())
    }
}

/// Fetch or decode failure of a single document.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{url} not found")]
    NotFound { url: String },

    #[error("failed to read {url}: {source}")]
    Io {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {url}: {source}")]
    Json {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure while compiling or running a project script.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("script does not compile: {0}")]
    Compile(String),

    /// The script referenced a name that is not in its namespace.
    #[error("unresolved identifier '{0}'")]
    UnresolvedIdentifier(String),

    #[error("script failed: {0}")]
    Runtime(String),
}
