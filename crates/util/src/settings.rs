//! Provider settings persistence.
//!
//! Settings live in a small JSON file in the standard configuration directory
//! (`~/.config/dataprov/settings.json` on most platforms). Environment
//! variables override individual fields after the file is read.

use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use dataprov_types::{ProviderSettings, ResponseOrdering};
use dirs_next::{config_dir, home_dir};
use thiserror::Error;
use tracing::{debug, warn};

/// Environment variable allowing callers to override the settings file path.
pub const SETTINGS_PATH_ENV: &str = "DATAPROV_SETTINGS_PATH";
/// Overrides [`ProviderSettings::response_ordering`] (`latest` or `last-completed`).
pub const RESPONSE_ORDERING_ENV: &str = "DATAPROV_RESPONSE_ORDERING";
/// Overrides [`ProviderSettings::throw_error`] (`1`/`true` or `0`/`false`).
pub const THROW_ERROR_ENV: &str = "DATAPROV_THROW_ERROR";

pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Errors that can occur while loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Reading the settings file failed for a reason other than absence.
    #[error("settings I/O error: {0}")]
    Io(#[from] io::Error),
    /// An override environment variable holds an unrecognised value.
    #[error("invalid value '{value}' for {name}")]
    InvalidOverride { name: &'static str, value: String },
}

/// Load settings from the default location and apply env overrides.
pub fn load_settings() -> Result<ProviderSettings, SettingsError> {
    load_settings_from(&default_settings_path())
}

/// Load settings from `path` and apply env overrides.
///
/// A missing file yields defaults. A file that cannot be parsed is logged and
/// ignored so a bad edit never keeps the provider from starting.
pub fn load_settings_from(path: &Path) -> Result<ProviderSettings, SettingsError> {
    let mut settings = read_settings_file(path)?;
    apply_env_overrides(&mut settings)?;
    Ok(settings)
}

/// `DATAPROV_SETTINGS_PATH` (with `~` expanded) or
/// `<config_dir>/dataprov/settings.json`.
pub fn default_settings_path() -> PathBuf {
    if let Ok(path) = env::var(SETTINGS_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return with_home(trimmed);
        }
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dataprov")
        .join(SETTINGS_FILE_NAME)
}

/// Apply `DATAPROV_*` overrides on top of `settings`.
pub fn apply_env_overrides(settings: &mut ProviderSettings) -> Result<(), SettingsError> {
    if let Some(value) = non_empty_var(RESPONSE_ORDERING_ENV) {
        settings.response_ordering = value
            .parse::<ResponseOrdering>()
            .map_err(|_| SettingsError::InvalidOverride {
                name: RESPONSE_ORDERING_ENV,
                value: value.clone(),
            })?;
    }
    if let Some(value) = non_empty_var(THROW_ERROR_ENV) {
        settings.throw_error = parse_flag(&value).ok_or(SettingsError::InvalidOverride {
            name: THROW_ERROR_ENV,
            value,
        })?;
    }
    Ok(())
}

fn read_settings_file(path: &Path) -> Result<ProviderSettings, SettingsError> {
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(settings) => {
                debug!(path = %path.display(), "loaded provider settings");
                Ok(settings)
            }
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Failed to parse settings file; using defaults"
                );
                Ok(ProviderSettings::default())
            }
        },
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(ProviderSettings::default()),
        Err(error) => Err(SettingsError::Io(error)),
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn with_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        Some(rest) => home_dir().unwrap_or_else(|| PathBuf::from("~")).join(rest),
        None if path == "~" => home_dir().unwrap_or_else(|| PathBuf::from("~")),
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn without_overrides<R>(body: impl FnOnce() -> R) -> R {
        temp_env::with_vars(
            [
                (RESPONSE_ORDERING_ENV, None::<&str>),
                (THROW_ERROR_ENV, None::<&str>),
            ],
            body,
        )
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let settings = without_overrides(|| load_settings_from(&dir.path().join("absent.json"))).unwrap();
        assert_eq!(settings, ProviderSettings::default());
    }

    #[test]
    fn reads_settings_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(
            &path,
            r#"{ "responseOrdering": "last-completed", "throwError": true, "logFilter": "debug" }"#,
        )
        .unwrap();

        let settings = without_overrides(|| load_settings_from(&path)).unwrap();
        assert_eq!(settings.response_ordering, ResponseOrdering::LastCompleted);
        assert!(settings.throw_error);
        assert_eq!(settings.log_filter.as_deref(), Some("debug"));
    }

    #[test]
    fn invalid_json_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&path, "not json").unwrap();

        let settings = without_overrides(|| load_settings_from(&path)).unwrap();
        assert_eq!(settings, ProviderSettings::default());
    }

    #[test]
    fn env_overrides_win_over_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&path, r#"{ "throwError": true }"#).unwrap();

        let settings = temp_env::with_vars(
            [(RESPONSE_ORDERING_ENV, Some("last")), (THROW_ERROR_ENV, Some("0"))],
            || load_settings_from(&path),
        )
        .unwrap();
        assert_eq!(settings.response_ordering, ResponseOrdering::LastCompleted);
        assert!(!settings.throw_error);
    }

    #[test]
    fn invalid_override_is_an_error() {
        let mut settings = ProviderSettings::default();
        let err = temp_env::with_var(THROW_ERROR_ENV, Some("maybe"), || apply_env_overrides(&mut settings)).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidOverride { name: THROW_ERROR_ENV, .. }));
    }

    #[test]
    fn default_path_honors_env_override() {
        let path = temp_env::with_var(SETTINGS_PATH_ENV, Some("~/custom/settings.json"), default_settings_path);
        assert_eq!(path, with_home("~/custom/settings.json"));
        assert!(path.ends_with("custom/settings.json"));
    }
}
