//! Core types and configuration for echonote.
//!
//! This crate provides the platform-agnostic recording session state,
//! language codes, and configuration shared by all echonote sub-crates.

mod config;
mod language;
mod session;
mod timer;

pub use config::{Config, ConfigManager};
pub use language::{Language, UnknownLanguage};
pub use session::{AudioBlob, RecorderSession, RecorderStatus};
pub use timer::{TickTimer, format_elapsed};

/// Application name
pub const APP_NAME: &str = "echonote";

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";
