//! Error types shared across the crate.
//!
//! Three failure domains exist: configuration (a collaborator is not
//! reachable at all), conversation storage, and text generation. Empty
//! inputs — blank persona text, empty history, blank context fields — are
//! valid states everywhere and never produce an error.

use thiserror::Error;

/// Errors raised before any prompt is built, when a required collaborator
/// is not configured.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// No generation backend credential is available.
    #[error("API key not set: set the {env_var} environment variable or pass a key explicitly")]
    MissingApiKey { env_var: &'static str },

    /// No conversation store is reachable.
    #[error("conversation store is not reachable: {message}")]
    StoreUnavailable { message: String },
}

/// Errors from the conversation store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite failure.
    #[error("conversation store error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Filesystem failure while locating or creating the database.
    #[error("conversation store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from a text-generation backend.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The backend was never configured.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Transport-level failure.
    #[error("generation request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend kept failing after all retries.
    #[error("generation failed after {attempts} attempts: {message}")]
    RetriesExhausted { attempts: u32, message: String },

    /// The backend answered with a body this crate cannot interpret.
    #[error("malformed generation response: {message}")]
    MalformedResponse { message: String },
}
