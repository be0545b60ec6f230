use std::io;
use std::path::{Path, PathBuf};

use iso_engine::storage::{read_text_if_exists, write_text_atomic};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::audio::clamp_volume;

pub(crate) const SETTINGS_FILE_NAME: &str = "user_settings.json";
pub(crate) const NICK_ENV_VAR: &str = "ISO_PRINCE_NICK";
pub(crate) const SEED_ENV_VAR: &str = "ISO_PRINCE_SEED";
pub(crate) const MAX_NICK_CHARS: usize = 12;
const DEFAULT_NICK: &str = "Player";
const DEFAULT_VOLUME: f32 = 0.6;

#[derive(Debug, Error)]
pub(crate) enum SettingsError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path} at {at}: {source}")]
    Parse {
        path: PathBuf,
        at: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where level art comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ArtSource {
    /// Disk images when the image directory exists, placeholders otherwise.
    #[default]
    Auto,
    Disk,
    Procedural,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) volume: f32,
    pub(crate) nick: String,
    /// Fixed RNG seed; fresh entropy per run when unset.
    pub(crate) seed: Option<u64>,
    /// Extra pixels a chasing enemy tolerates past its detection radius.
    pub(crate) chase_dead_zone: f32,
    pub(crate) art: ArtSource,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            volume: DEFAULT_VOLUME,
            nick: DEFAULT_NICK.to_string(),
            seed: None,
            chase_dead_zone: 0.0,
            art: ArtSource::Auto,
        }
    }
}

impl Settings {
    pub(crate) fn file_path(config_dir: &Path) -> PathBuf {
        config_dir.join(SETTINGS_FILE_NAME)
    }

    /// Reads the settings file, writing the defaults out when none exists yet. Any problem
    /// is logged and yields defaults; environment overrides apply either way.
    pub(crate) fn load_or_default(config_dir: &Path) -> Self {
        let path = Self::file_path(config_dir);
        let mut settings = match Self::read(&path) {
            Ok(Some(settings)) => settings,
            Ok(None) => {
                let defaults = Self::default();
                match defaults.save(&path) {
                    Ok(()) => info!(path = %path.display(), "settings_file_created"),
                    Err(error) => warn!(error = %error, "settings_file_create_failed"),
                }
                defaults
            }
            Err(error) => {
                warn!(error = %error, "settings_invalid_using_defaults");
                Self::default()
            }
        };
        settings.apply_env(|name| std::env::var(name).ok());
        settings.sanitize();
        settings
    }

    pub(crate) fn read(path: &Path) -> Result<Option<Self>, SettingsError> {
        let raw = read_text_if_exists(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        let mut deserializer = serde_json::Deserializer::from_str(&raw);
        serde_path_to_error::deserialize(&mut deserializer)
            .map(Some)
            .map_err(|error| {
                let at = error.path().to_string();
                SettingsError::Parse {
                    path: path.to_path_buf(),
                    at,
                    source: error.into_inner(),
                }
            })
    }

    pub(crate) fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        write_text_atomic(path, &json).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(nick) = lookup(NICK_ENV_VAR) {
            self.nick = nick;
        }
        if let Some(raw) = lookup(SEED_ENV_VAR) {
            match raw.trim().parse::<u64>() {
                Ok(seed) => self.seed = Some(seed),
                Err(error) => {
                    warn!(var = SEED_ENV_VAR, value = %raw, error = %error, "invalid_seed_ignored");
                }
            }
        }
    }

    fn sanitize(&mut self) {
        self.volume = clamp_volume(self.volume);
        let nick: String = self.nick.trim().chars().take(MAX_NICK_CHARS).collect();
        self.nick = if nick.is_empty() {
            DEFAULT_NICK.to_string()
        } else {
            nick
        };
        if !self.chase_dead_zone.is_finite() || self.chase_dead_zone < 0.0 {
            self.chase_dead_zone = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = Settings::file_path(dir.path());
        fs::write(&path, r#"{"nick":"Ada","art":"procedural"}"#).expect("write");

        let settings = Settings::read(&path).expect("parse").expect("present");
        assert_eq!(settings.nick, "Ada");
        assert_eq!(settings.art, ArtSource::Procedural);
        assert_eq!(settings.volume, DEFAULT_VOLUME);
        assert_eq!(settings.seed, None);
    }

    #[test]
    fn parse_error_reports_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = Settings::file_path(dir.path());
        fs::write(&path, r#"{"volume":"loud"}"#).expect("write");

        let error = Settings::read(&path).expect_err("bad volume");
        assert!(matches!(&error, SettingsError::Parse { at, .. } if at == "volume"));
    }

    #[test]
    fn first_load_writes_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = Settings::load_or_default(dir.path());
        assert_eq!(settings.volume, DEFAULT_VOLUME);

        let stored = Settings::read(&Settings::file_path(dir.path()))
            .expect("parse")
            .expect("written");
        assert_eq!(stored, Settings::default());
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(Settings::file_path(dir.path()), "[1, 2").expect("write");
        let settings = Settings::load_or_default(dir.path());
        assert_eq!(settings.volume, DEFAULT_VOLUME);
        assert_eq!(settings.art, ArtSource::Auto);
    }

    #[test]
    fn env_overrides_nick_and_seed() {
        let mut settings = Settings::default();
        settings.apply_env(|name| match name {
            NICK_ENV_VAR => Some("Zed".to_string()),
            SEED_ENV_VAR => Some(" 99 ".to_string()),
            _ => None,
        });
        assert_eq!(settings.nick, "Zed");
        assert_eq!(settings.seed, Some(99));

        settings.apply_env(|name| (name == SEED_ENV_VAR).then(|| "nope".to_string()));
        assert_eq!(settings.seed, Some(99));
    }

    #[test]
    fn sanitize_bounds_values() {
        let mut settings = Settings {
            volume: 4.0,
            nick: "  AVeryLongNicknameIndeed ".to_string(),
            chase_dead_zone: -3.0,
            ..Settings::default()
        };
        settings.sanitize();
        assert_eq!(settings.volume, 1.0);
        assert_eq!(settings.nick, "AVeryLongNic");
        assert_eq!(settings.chase_dead_zone, 0.0);

        settings.nick = "   ".to_string();
        settings.sanitize();
        assert_eq!(settings.nick, DEFAULT_NICK);
    }
}
