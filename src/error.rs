//! Error types for loaders, persistence backends and configuration.

use std::error::Error as StdError;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Failure of a single loader invocation.
///
/// Cloneable so the latest failure can be replayed to every subscriber of
/// the `error` channel.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    /// The loader rejected with a plain message.
    #[error("Loader failed: {message}")]
    Failed { message: String },

    /// The loader rejected with an underlying error.
    #[error("Loader backend error: {0}")]
    Backend(#[source] Arc<dyn StdError + Send + Sync>),

    /// A command-style source finished without producing a result.
    #[error("Command produced no result")]
    NoResult,

    /// A command-style source stopped publishing results.
    #[error("Result source closed before producing a result")]
    SourceClosed,
}

impl LoadError {
    pub fn failed(message: impl Into<String>) -> Self {
        LoadError::Failed {
            message: message.into(),
        }
    }

    pub fn backend(err: impl StdError + Send + Sync + 'static) -> Self {
        LoadError::Backend(Arc::new(err))
    }
}

/// Errors raised by persisted-params backends.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Failed to access persisted params '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to (de)serialize persisted params: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Persistence backend error: {message}")]
    Backend { message: String },
}

/// Errors that can occur when loading engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {source}")]
    ParseError {
        path: Option<PathBuf>,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}
