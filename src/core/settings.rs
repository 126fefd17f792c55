//! Settings persistence
//!
//! Saves and loads [`GameSettings`] to/from a JSON file.
//!
//! # File Location
//!
//! `settings.json` in the platform configuration directory, e.g.
//! `~/.config/chessduel/settings.json` on Linux. Falls back to a local
//! `settings.json` if the system config dir cannot be found.
//!
//! # Error Handling
//!
//! - Load failures fall back to default settings
//! - Save failures are returned to the caller, which logs them

use chess_engine::Team;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use shared::protocol::SkillLevel;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::core::error::CoreResult;

/// Settings filename
const SETTINGS_FILENAME: &str = "settings.json";

/// User preferences
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct GameSettings {
    pub player_name: String,
    /// Matchmaking tag
    pub skill_level: SkillLevel,
    /// Team claimed first when joining a networked game
    pub preferred_team: Team,
    /// How long matchmaking may take before giving up
    pub connect_timeout_secs: u64,
    /// Default `tracing` filter directive; `RUST_LOG` overrides it
    pub log_filter: String,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            player_name: "Player".to_string(),
            skill_level: SkillLevel::default(),
            preferred_team: Team::White,
            connect_timeout_secs: 10,
            log_filter: "info".to_string(),
        }
    }
}

/// Resolve the settings file path
pub fn settings_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "chessduel", "ChessDuel") {
        proj_dirs.config_dir().join(SETTINGS_FILENAME)
    } else {
        PathBuf::from(SETTINGS_FILENAME)
    }
}

/// Load settings, using defaults when the file is missing or unreadable
pub fn load_settings(path: &Path) -> GameSettings {
    if !path.exists() {
        info!("[SETTINGS] No settings file found at {:?}. Using defaults.", path);
        return GameSettings::default();
    }

    match fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str::<GameSettings>(&contents) {
            Ok(settings) => {
                info!("[SETTINGS] Loaded settings from {:?}", path);
                settings
            }
            Err(e) => {
                warn!(
                    "[SETTINGS] Failed to parse settings file at {:?}: {}. Using defaults.",
                    path, e
                );
                GameSettings::default()
            }
        },
        Err(e) => {
            warn!(
                "[SETTINGS] Failed to read settings file at {:?}: {}. Using defaults.",
                path, e
            );
            GameSettings::default()
        }
    }
}

/// Write settings, creating the parent directory if needed
pub fn save_settings(settings: &GameSettings, path: &Path) -> CoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    info!("[SETTINGS] Saved settings to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("chessduel-{}", uuid::Uuid::new_v4()))
            .join(SETTINGS_FILENAME)
    }

    #[test]
    fn test_save_then_load() {
        let path = scratch_path();
        let settings = GameSettings {
            player_name: "Ada".to_string(),
            skill_level: SkillLevel::Advanced,
            preferred_team: Team::Black,
            ..GameSettings::default()
        };

        save_settings(&settings, &path).unwrap();
        assert_eq!(load_settings(&path), settings);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        assert_eq!(load_settings(&scratch_path()), GameSettings::default());
    }

    #[test]
    fn test_corrupt_file_uses_defaults() {
        let path = scratch_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        assert_eq!(load_settings(&path), GameSettings::default());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let path = scratch_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{ "player_name": "Bo" }"#).unwrap();

        let settings = load_settings(&path);
        assert_eq!(settings.player_name, "Bo");
        assert_eq!(settings.connect_timeout_secs, 10);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
