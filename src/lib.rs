//! AmourCard - Birthday cards in the terminal
//!
//! A TUI wizard that collects a few details about someone, asks a text
//! generation service for a personal message, and presents it as a themed
//! card that can be opened, flipped, and saved as a PNG.

pub mod audio;
pub mod card;
pub mod color_space;
pub mod config;
pub mod effects;
pub mod error;
pub mod export;
pub mod form;
pub mod generation;
pub mod input;
pub mod logging;
pub mod photo;
pub mod presentation;
pub mod shell;
pub mod stylize;
pub mod terminal_capabilities;
pub mod text;
pub mod theme;
pub mod ui;
pub mod worker;

// Re-export commonly used types
pub use card::{CardData, Relation, Tone, Vibe};
pub use config::Config;
pub use error::{CardError, Result};
pub use shell::{AppState, View};
