//! Settings persistence
//!
//! Saves and loads [`PracticeSettings`] to/from a JSON file.
//!
//! # File Location
//!
//! `settings.json` in the platform configuration directory
//! (e.g. `~/.config/chess-practice/settings.json`), falling back to the
//! working directory when no configuration directory can be resolved.
//!
//! # Error Handling
//!
//! - Load failures fall back to default settings and are logged
//! - Save failures are returned so the caller can report them

use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::error::{CoreError, CoreResult};
use super::settings::PracticeSettings;

/// Settings filename
const SETTINGS_FILENAME: &str = "settings.json";

/// Resolve the default settings file path
pub fn settings_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "trilltino", "chess-practice") {
        proj_dirs.config_dir().join(SETTINGS_FILENAME)
    } else {
        PathBuf::from(SETTINGS_FILENAME)
    }
}

/// Read settings from `path`, propagating any failure
pub fn read_settings(path: &Path) -> CoreResult<PracticeSettings> {
    let contents = fs::read_to_string(path).map_err(|source| CoreError::SettingsRead {
        path: path.to_path_buf(),
        source,
    })?;
    let settings: PracticeSettings = serde_json::from_str(&contents)?;
    settings.validate()?;
    Ok(settings)
}

/// Load settings, using defaults when the file is missing or unusable
pub fn load_settings(path: &Path) -> PracticeSettings {
    if !path.exists() {
        info!("[SETTINGS] No settings file found at {:?}. Using defaults.", path);
        return PracticeSettings::default();
    }
    match read_settings(path) {
        Ok(settings) => {
            info!("[SETTINGS] Loaded settings from {:?}", path);
            settings
        }
        Err(e) => {
            warn!(
                "[SETTINGS] Failed to load settings at {:?}: {}. Using defaults.",
                path, e
            );
            PracticeSettings::default()
        }
    }
}

/// Write settings to `path`, creating its directory if needed
pub fn save_settings(path: &Path, settings: &PracticeSettings) -> CoreResult<()> {
    let write_error = |source| CoreError::SettingsWrite {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json).map_err(write_error)?;
    info!("[SETTINGS] Saved settings to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("chess-practice-test-{}-{}", std::process::id(), name))
            .join(SETTINGS_FILENAME)
    }

    #[test]
    fn test_save_then_load() {
        //! Saved settings come back unchanged
        let path = temp_path("roundtrip");
        let settings = PracticeSettings {
            humanize_delay_ms: 900,
            puzzle_filter: "mate".to_string(),
            ..PracticeSettings::default()
        };
        save_settings(&path, &settings).unwrap();
        assert_eq!(load_settings(&path), settings);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        //! Absent file is not an error
        let path = temp_path("missing");
        assert_eq!(load_settings(&path), PracticeSettings::default());
        assert!(matches!(
            read_settings(&path),
            Err(CoreError::SettingsRead { .. })
        ));
    }

    #[test]
    fn test_corrupt_file_uses_defaults() {
        //! Unparseable JSON falls back to defaults but read_settings reports it
        let path = temp_path("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            read_settings(&path),
            Err(CoreError::SettingsFormat(_))
        ));
        assert_eq!(load_settings(&path), PracticeSettings::default());
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
