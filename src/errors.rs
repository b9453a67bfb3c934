/*!
 * Error types for the ronyaku application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 *
 * Only configuration problems and unknown journal identifiers are treated as
 * hard failures. Fetch, extraction and translation problems degrade: the
 * pipeline keeps going and produces a partial document, logging what was lost.
 */

use thiserror::Error;

/// Errors raised by a browser session implementation
#[derive(Error, Debug)]
pub enum SessionError {
    /// Navigation to a URL failed
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// The remote driver answered with something we could not interpret
    #[error("driver protocol error: {0}")]
    Protocol(String),

    /// The session does not support the requested capability
    #[error("unsupported session capability: {0}")]
    Unsupported(String),
}

/// Errors that can occur while resolving or running a journal crawler
#[derive(Error, Debug)]
pub enum CrawlError {
    /// The explicit journal identifier is not registered
    #[error("unknown journal identifier: {0}")]
    UnknownJournal(String),

    /// The journal type could not be inferred from the page. Recoverable:
    /// the caller may retry with an explicit identifier.
    #[error("could not distinguish the journal type for {0}; pass an explicit identifier")]
    Indistinguishable(String),

    /// Non-2xx response or transport failure. Reported with status and
    /// reason; callers degrade to an empty document instead of aborting.
    #[error("fetch failed ({status}): {reason}")]
    Fetch {
        /// HTTP status code, 0 for transport-level failures
        status: u16,
        /// Status reason or transport error message
        reason: String,
    },

    /// An expected markup element was absent
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// A downloaded source archive could not be unpacked
    #[error("archive error: {0}")]
    Archive(String),

    /// Error from a file operation on the scratch directory
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from the browser session
    #[error("session error: {0}")]
    Session(#[from] SessionError),
}

/// Errors that can occur during gateway passthrough
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The gateway identifier is not registered
    #[error("unknown gateway identifier: {0}")]
    UnknownGateway(String),

    /// Required credentials are absent from both the explicit parameters and
    /// the environment. Raised before any network call.
    #[error("gateway '{gateway}' is missing credentials: {keys:?}")]
    MissingCredentials {
        /// Gateway identifier
        gateway: String,
        /// Credential keys that could not be resolved
        keys: Vec<String>,
    },

    /// Error from the browser session during the authentication flow
    #[error("session error: {0}")]
    Session(#[from] SessionError),
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// The backend identifier is not registered
    #[error("unknown translator backend: {0}")]
    UnknownBackend(String),

    /// The caller requested cancellation; honored at each poll iteration
    /// and chunk boundary.
    #[error("translation cancelled")]
    Cancelled,

    /// Error from the browser session while driving the backend
    #[error("session error: {0}")]
    Session(#[from] SessionError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid or incomplete configuration, detected before any network call
    #[error("configuration error: {0}")]
    Config(String),

    /// Error from a file operation
    #[error("file error: {0}")]
    File(String),

    /// Error from crawling
    #[error("crawl error: {0}")]
    Crawl(#[from] CrawlError),

    /// Error from gateway passthrough
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Error from translation
    #[error("translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
