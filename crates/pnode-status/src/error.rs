//! Error types.
//!
//! [`StrategyError`] describes why one upstream strategy produced nothing usable.
//! It is logged and swallowed by the resolver and never reaches its callers.

use std::time::Duration;
use thiserror::Error;

/// Failure of a single resolution strategy.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrategyError {
    /// Connection, TLS or body read failure
    #[error("transport error: {0}")]
    Transport(String),

    /// The call exceeded its time budget and was cancelled
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Upstream answered with a non-2xx status
    #[error("upstream responded with HTTP {0}")]
    Status(u16),

    /// Body was not valid JSON
    #[error("invalid JSON body: {0}")]
    Decode(String),

    /// JSON-RPC level error object
    #[error("RPC error: {message}")]
    Rpc {
        /// JSON-RPC error code, if present
        code: Option<i64>,
        /// Error message reported by the endpoint
        message: String,
    },

    /// Envelope carried neither `result` nor `error`
    #[error("response has no result")]
    MissingResult,

    /// `result` did not have the shape this strategy expects
    #[error("unexpected result shape: expected {0}")]
    UnexpectedShape(&'static str),

    /// Well-formed response without a single usable node
    #[error("no usable nodes in response")]
    Empty,
}

impl StrategyError {
    /// True for failures caused by the network path rather than the payload.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StrategyError::Transport(_) | StrategyError::Timeout(_) | StrategyError::Status(_)
        )
    }
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// File that failed
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config file was neither valid YAML nor JSON
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// Endpoint URL is not a usable http(s) URL
    #[error("invalid endpoint URL {url:?}: {reason}")]
    InvalidUrl {
        /// Offending value
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// Any other out-of-range setting
    #[error("invalid setting {field}: {reason}")]
    Invalid {
        /// Setting name
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}
