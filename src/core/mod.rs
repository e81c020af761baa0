//! Core module - configuration and process infrastructure
//!
//! # Contents
//!
//! - [`PracticeSettings`] - persisted user preferences
//! - `settings_persistence` - JSON load/save in the platform config directory
//! - `logging` - tracing subscriber installation for the binary
//! - [`CoreError`] - settings failures

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_persistence;

pub use error::{CoreError, CoreResult};
pub use logging::init_tracing;
pub use settings::PracticeSettings;
pub use settings_persistence::{load_settings, read_settings, save_settings, settings_path};
