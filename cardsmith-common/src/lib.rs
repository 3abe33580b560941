//! Common types and utilities shared across Cardsmith crates.
//!
//! This crate defines the shared error taxonomy and the observability
//! initializer used throughout the Cardsmith workspace. It is kept
//! dependency‑minimal so that every crate can depend on it without
//! introducing heavy transitive costs.
//!
//! # Overview
//!
//! - [`CardsmithError`] and [`Result`]: failures of a single generation run
//! - [`GenerationError`]: why the generative service rejected a request
//! - [`observability`]: centralised tracing/logging initialisation
//!
//! # Examples
//!
//! ```rust
//! use cardsmith_common::{CardsmithError, GenerationError};
//!
//! let err = CardsmithError::Generation(GenerationError::RateLimited);
//! assert!(err.to_string().contains("rate limit"));
//! assert!(!err.is_navigation());
//! ```

pub mod observability;

/// Reasons a request to the generative-text service can fail.
#[derive(thiserror::Error, Debug)]
pub enum GenerationError {
    /// The credential was missing, malformed, or rejected.
    #[error("authentication failed: missing or invalid API key")]
    Unauthorized,

    #[error("API access forbidden")]
    Forbidden,

    #[error("rate limit or quota exceeded")]
    RateLimited,

    /// The service refused to answer because of its content filters.
    #[error("response blocked by safety filters")]
    Blocked,

    #[error("service returned no text")]
    EmptyResponse,

    #[error("service returned error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The HTTP client itself could not be constructed.
    #[error("client setup failed: {0}")]
    Client(String),
}

/// Error types surfaced by a single scrape‑then‑generate invocation.
///
/// Every variant is fatal for the invocation that produced it; nothing in
/// the workspace retries on its own.
#[derive(thiserror::Error, Debug)]
pub enum CardsmithError {
    /// Topic was empty or whitespace only.
    #[error("topic must not be empty")]
    EmptyInput,

    /// A browser step failed or timed out.
    #[error("navigation failed at `{stage}`: {message}")]
    Navigation { stage: String, message: String },

    /// The search page offered no result link for the topic.
    #[error("no search results found for `{topic}`")]
    NoResults { topic: String },

    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// Configuration was incomplete or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CardsmithError {
    /// Build a [`CardsmithError::Navigation`] from any displayable failure.
    ///
    /// The alternate form is used so `anyhow` errors keep their context chain.
    pub fn navigation(stage: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Navigation {
            stage: stage.into(),
            message: format!("{err:#}"),
        }
    }

    /// True for failures that happened while driving the browser.
    ///
    /// `NoResults` counts: callers treat it like any other navigation failure.
    pub fn is_navigation(&self) -> bool {
        matches!(self, Self::Navigation { .. } | Self::NoResults { .. })
    }
}

/// Convenient alias for results that use [`CardsmithError`].
pub type Result<T> = std::result::Result<T, CardsmithError>;
