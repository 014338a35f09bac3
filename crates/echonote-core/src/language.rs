//! Language codes accepted by the transcription backend.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A language the backend can transcribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English
    #[default]
    En,
    /// Mandarin (Simplified Chinese)
    Zh,
    /// Cantonese
    Yue,
}

impl Language {
    /// Every supported language, in menu order.
    pub const ALL: [Language; 3] = [Language::En, Language::Zh, Language::Yue];

    /// Wire code sent to the backend.
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Zh => "zh",
            Language::Yue => "yue",
        }
    }

    /// Human-readable name for menus and prompts.
    pub fn display_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Zh => "Mandarin (Simplified Chinese)",
            Language::Yue => "Cantonese",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when parsing an unrecognized language code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported language code: {0}")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Language::En),
            "zh" => Ok(Language::Zh),
            "yue" => Ok(Language::Yue),
            other => Err(UnknownLanguage(other.to_string())),
        }
    }
}
