//! Error types
//!
//! Library operations return [`CardError`]; the generation boundary and the
//! form guards have their own narrower enums so callers can match on them.

use thiserror::Error;

/// Errors raised by card construction, export and background work.
#[derive(Debug, Error)]
pub enum CardError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// The configuration file exists but could not be parsed or written.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No usable font was found for rasterizing a card face.
    #[error("Font error: {0}")]
    Font(String),

    #[error("Export error: {0}")]
    Export(String),

    /// The photo data URL was not a base64 PNG/JPEG payload.
    #[error("Invalid embedded photo: {0}")]
    InvalidPhoto(String),

    /// The music player could not be started.
    #[error("Audio error: {0}")]
    Audio(String),

    /// A card may only be finalized once.
    #[error("Card has already been finalized")]
    AlreadyFinalized,

    /// Background worker went away or a task panicked.
    #[error("Worker error: {0}")]
    Worker(String),
}

/// Failures at the text-generation service boundary.
///
/// These never reach the user; `MessageClient` turns them into fallback text.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("No API key configured (set GEMINI_API_KEY)")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Could not decode response: {0}")]
    Decode(String),
}

/// Guards of the form workflow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// Required fields of the current step are empty.
    #[error("Fill in the required fields first")]
    StepIncomplete,

    /// Submit requested from a step other than the last one, while a
    /// photo is still being processed, or with a typed photo path that was
    /// never loaded.
    #[error("The card is not ready to submit")]
    NotReady,

    /// A submission is already in flight.
    #[error("Already baking your card")]
    Busy,
}

pub type Result<T> = std::result::Result<T, CardError>;
