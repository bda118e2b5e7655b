//! # Session Error Types
//!
//! Error types for everything the session layer does.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Session Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │    Upstream     │  │     Tasks               │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Http           │  │  Cancelled              │ │
//! │  │  ConfigLoad     │  │  Graphql        │  │  Distance               │ │
//! │  │  ConfigSave     │  │  UpstreamFetch  │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  Core errors (cart rules, validation) pass through as `Core`.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! None of these ends the process. Fetch failures leave the screen in its
//! loading state; retrying is up to the caller (see [`SessionError::is_retryable`]).

use thiserror::Error;

use crumb_core::{CoreError, ValidationError};

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Upstream Errors
    // =========================================================================
    /// Transport-level failure talking to the API.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with GraphQL errors.
    #[error("GraphQL error: {}", messages.join("; "))]
    Graphql { messages: Vec<String> },

    /// The response arrived but had no usable data.
    #[error("Upstream fetch failed: {0}")]
    UpstreamFetch(String),

    // =========================================================================
    // Task Errors
    // =========================================================================
    /// A background task was cancelled before it finished.
    #[error("Task cancelled")]
    Cancelled,

    /// Distance could not be computed.
    #[error("Distance lookup failed: {0}")]
    Distance(String),

    // =========================================================================
    // Domain Errors
    // =========================================================================
    #[error(transparent)]
    Core(#[from] CoreError),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<ValidationError> for SessionError {
    fn from(err: ValidationError) -> Self {
        SessionError::Core(CoreError::Validation(err))
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::UpstreamFetch(err.to_string())
    }
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SessionError {
    fn from(err: toml::de::Error) -> Self {
        SessionError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SessionError {
    fn from(err: toml::ser::Error) -> Self {
        SessionError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization (for retry logic)
// =============================================================================

impl SessionError {
    /// Returns true if the caller may retry the operation.
    ///
    /// ## Retryable Errors
    /// - Transport failures and timeouts
    /// - Empty or malformed upstream responses
    ///
    /// ## Non-Retryable Errors
    /// - Configuration errors
    /// - GraphQL errors (the query itself was rejected)
    /// - Cart rule violations
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SessionError::Http(_) | SessionError::UpstreamFetch(_) | SessionError::Distance(_)
        )
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SessionError::InvalidConfig(_)
                | SessionError::ConfigLoadFailed(_)
                | SessionError::ConfigSaveFailed(_)
        )
    }
}
