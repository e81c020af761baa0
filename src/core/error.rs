//! Settings errors
//!
//! Gameplay errors live in [`crate::game::error`], puzzle loading errors in
//! [`crate::puzzle`].

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Cannot read settings at {path:?}: {source}")]
    SettingsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write settings to {path:?}: {source}")]
    SettingsWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but is not a settings document
    #[error("Malformed settings: {0}")]
    SettingsFormat(#[from] serde_json::Error),

    /// Parsed fine, but a value is out of range or names something unknown
    #[error("Invalid setting {key}: {message}")]
    InvalidSetting { key: String, message: String },
}

pub type CoreResult<T> = Result<T, CoreError>;
