//! Foundational configuration and prompt catalog shared across Fable crates.
//!
//! The relay captures its process environment exactly once at startup into an
//! immutable [`RelayConfig`]; no other crate reads environment variables.

pub mod config;
pub mod prompts;

pub use config::{ConfigError, RelayConfig, DEFAULT_PORT};
pub use prompts::{
    CORRECTION_INSTRUCTION, DUNGEON_MASTER_INSTRUCTION, NO_PREVIOUS_SUMMARY_PLACEHOLDER,
    SUMMARIZE_HISTORY_INSTRUCTION,
};

/// Generation parameters sent with every upstream request.
pub const TEMPERATURE: f32 = 0.75;
pub const MAX_OUTPUT_TOKENS: u32 = 8192;

/// Model and endpoint defaults for the Gemini generateContent API.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-preview-05-20";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
