//! Error types and handling for cfsweep-core operations.
//!
//! All fallible operations in this crate return [`Result<T, Error>`]. Errors
//! are grouped by where they originate:
//!
//! - **Network errors**: transport-level failures from the HTTP client
//! - **API errors**: requests the CDN accepted but rejected (`success: false`
//!   envelopes, unexpected statuses)
//! - **Auth / Config errors**: invalid or missing credentials and flag
//!   combinations, detected before any network call
//! - **Serialization errors**: response bodies that don't match the wire
//!   format
//!
//! Operation-level failures during a purge run (a single zone or key failing)
//! are *not* represented here — those are counted and carried as warnings in
//! batch reports so a run can continue past them.

use thiserror::Error;

/// The main error type for cfsweep-core operations.
///
/// Errors preserve their source chain where one exists (`Network` wraps the
/// underlying `reqwest::Error`) and expose a [`category`](Error::category)
/// for logging plus an [`is_recoverable`](Error::is_recoverable) hint for
/// callers that want to retry transient failures.
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure: connection refused, DNS, timeout, TLS.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The CDN API returned an error envelope or an unexpected status.
    ///
    /// `code` is the API's own error code when an envelope was present,
    /// otherwise the HTTP status.
    #[error("API error {code}: {message}")]
    Api {
        /// Error code reported by the API (or HTTP status as fallback).
        code: i64,
        /// Human-readable message(s) from the error envelope.
        message: String,
    },

    /// Credentials are missing or incomplete.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Invalid configuration or flag combination.
    #[error("configuration error: {0}")]
    Config(String),

    /// A requested resource (zone, namespace, key) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A response body could not be decoded as the expected wire format.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Uncategorized failure.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl Error {
    /// Check if the error might be recoverable through retry logic.
    ///
    /// Connection and timeout failures are typically transient; everything
    /// else (bad credentials, malformed payloads, API rejections) requires
    /// operator action. The purge orchestrators never retry — this hint is
    /// for callers embedding the library.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            // 5xx-range API codes are worth a retry; 4xx and envelope codes are not
            Self::Api { code, .. } => (500..600).contains(code),
            _ => false,
        }
    }

    /// Get the error category as a static string identifier for logging.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Api { .. } => "api",
            Self::Auth(_) => "auth",
            Self::Config(_) => "config",
            Self::NotFound(_) => "not_found",
            Self::Serialization(_) => "serialization",
            Self::Other(_) => "other",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
