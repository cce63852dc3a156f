//! Error types for the server binary.
//!
//! [`StartupError`] is the top-level error type that wraps all possible
//! failure modes during startup and serving.

/// Top-level error for the server binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: trafficlight_core::ConfigError,
    },

    /// The traffic light service rejected its configuration.
    #[error("service error: {source}")]
    Service {
        /// The underlying service error.
        #[from]
        source: trafficlight_core::ServiceError,
    },

    /// The control API failed to bind or serve.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: trafficlight_api::ServerError,
    },

    /// The log subscriber could not be installed.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the logging failure.
        message: String,
    },
}
