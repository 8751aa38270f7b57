use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::{Settings, DEFAULT_CONFIG_MAP_NAME};

/// Default settings file, relative to the working directory
pub const DEFAULT_SETTINGS_FILE: &str = "obscfg.yaml";

/// Unprefixed environment variables naming the ConfigMap to read
pub const IDENTITY_ENV_VARS: [&str; 2] = ["SYSTEM_NAMESPACE", "CONFIG_OBSERVABILITY_NAME"];

/// Settings error types
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("System namespace cannot be empty")]
    EmptyNamespace,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),
}

/// Settings loader with hierarchical merging
pub struct SettingsLoader;

impl SettingsLoader {
    /// Load settings with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. `obscfg.yaml` in the working directory (optional)
    /// 3. `SYSTEM_NAMESPACE` and `CONFIG_OBSERVABILITY_NAME`
    /// 4. Environment variables (`OBSCFG_*` prefix, highest priority)
    pub fn load() -> Result<Settings> {
        Self::extract(Self::figment(Path::new(DEFAULT_SETTINGS_FILE)))
            .context("Failed to extract settings from figment")
    }

    /// Load settings using `path` in place of the default settings file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Settings> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Settings file not found: {}", path.display());
        }
        Self::extract(Self::figment(path))
            .with_context(|| format!("Failed to load settings from {}", path.display()))
    }

    fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Yaml::file(path))
            .merge(Env::raw().only(&IDENTITY_ENV_VARS))
            .merge(Env::prefixed("OBSCFG_").split("__"))
    }

    fn extract(figment: Figment) -> Result<Settings> {
        let mut settings: Settings = figment.extract()?;
        // An empty name override selects the default.
        if settings.config_observability_name.is_empty() {
            settings.config_observability_name = DEFAULT_CONFIG_MAP_NAME.to_string();
        }
        Self::validate(&settings)?;
        Ok(settings)
    }

    /// Validate settings after loading
    pub fn validate(settings: &Settings) -> Result<(), SettingsError> {
        if settings.system_namespace.is_empty() {
            return Err(SettingsError::EmptyNamespace);
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&settings.logging.level.to_lowercase().as_str()) {
            return Err(SettingsError::InvalidLogLevel(settings.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&settings.logging.format.as_str()) {
            return Err(SettingsError::InvalidLogFormat(
                settings.logging.format.clone(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::RotationPolicy;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CLEAR: [(&str, Option<&str>); 5] = [
        ("SYSTEM_NAMESPACE", None),
        ("CONFIG_OBSERVABILITY_NAME", None),
        ("OBSCFG_SYSTEM_NAMESPACE", None),
        ("OBSCFG_LOGGING__LEVEL", None),
        ("OBSCFG_LOGGING__ROTATION", None),
    ];

    fn settings_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.system_namespace, "knative-serving");
        assert_eq!(settings.config_map_name(), "config-observability");
        assert_eq!(settings.logging.level, "warn");
        SettingsLoader::validate(&settings).expect("Default settings should be valid");
    }

    #[test]
    fn test_load_from_file() {
        let file = settings_file("system_namespace: serving-system\nlogging:\n  level: debug\n");
        temp_env::with_vars(CLEAR, || {
            let settings = SettingsLoader::load_from_file(file.path()).unwrap();
            assert_eq!(settings.system_namespace, "serving-system");
            assert_eq!(settings.config_observability_name, "config-observability");
            assert_eq!(settings.logging.level, "debug");
            assert_eq!(settings.logging.format, "pretty", "Default should persist");
            assert_eq!(settings.logging.rotation, RotationPolicy::Daily);
        });
    }

    #[test]
    fn test_rotation_from_file_and_env() {
        let file = settings_file("logging:\n  log_dir: /tmp/obscfg\n  rotation: hourly\n");
        temp_env::with_vars(CLEAR, || {
            let settings = SettingsLoader::load_from_file(file.path()).unwrap();
            assert_eq!(settings.logging.rotation, RotationPolicy::Hourly);
        });
        temp_env::with_vars(
            [
                ("SYSTEM_NAMESPACE", None),
                ("CONFIG_OBSERVABILITY_NAME", None),
                ("OBSCFG_SYSTEM_NAMESPACE", None),
                ("OBSCFG_LOGGING__LEVEL", None),
                ("OBSCFG_LOGGING__ROTATION", Some("never")),
            ],
            || {
                let settings = SettingsLoader::load_from_file(file.path()).unwrap();
                assert_eq!(settings.logging.rotation, RotationPolicy::Never);
            },
        );
    }

    #[test]
    fn test_unknown_rotation_is_rejected() {
        let file = settings_file("logging:\n  rotation: weekly\n");
        temp_env::with_vars(CLEAR, || {
            assert!(SettingsLoader::load_from_file(file.path()).is_err());
        });
    }

    #[test]
    fn test_load_from_missing_file() {
        let result = SettingsLoader::load_from_file("/nonexistent/obscfg.yaml");
        assert!(result.is_err());
    }

    #[test]
    fn test_identity_env_overrides_file() {
        let file = settings_file("system_namespace: from-file\n");
        temp_env::with_vars(
            [
                ("SYSTEM_NAMESPACE", Some("from-env")),
                ("CONFIG_OBSERVABILITY_NAME", Some("custom-observability")),
                ("OBSCFG_SYSTEM_NAMESPACE", None),
                ("OBSCFG_LOGGING__LEVEL", None),
            ],
            || {
                let settings = SettingsLoader::load_from_file(file.path()).unwrap();
                assert_eq!(settings.system_namespace, "from-env");
                assert_eq!(settings.config_map_name(), "custom-observability");
            },
        );
    }

    #[test]
    fn test_prefixed_env_wins() {
        let file = settings_file("logging:\n  level: info\n");
        temp_env::with_vars(
            [
                ("SYSTEM_NAMESPACE", Some("from-env")),
                ("CONFIG_OBSERVABILITY_NAME", None),
                ("OBSCFG_SYSTEM_NAMESPACE", Some("from-prefixed-env")),
                ("OBSCFG_LOGGING__LEVEL", Some("trace")),
            ],
            || {
                let settings = SettingsLoader::load_from_file(file.path()).unwrap();
                assert_eq!(settings.system_namespace, "from-prefixed-env");
                assert_eq!(settings.logging.level, "trace");
            },
        );
    }

    #[test]
    fn test_empty_name_override_falls_back_to_default() {
        let file = settings_file("logging:\n  format: json\n");
        temp_env::with_vars(
            [
                ("SYSTEM_NAMESPACE", None),
                ("CONFIG_OBSERVABILITY_NAME", Some("")),
                ("OBSCFG_SYSTEM_NAMESPACE", None),
                ("OBSCFG_LOGGING__LEVEL", None),
            ],
            || {
                let settings = SettingsLoader::load_from_file(file.path()).unwrap();
                assert_eq!(settings.config_map_name(), DEFAULT_CONFIG_MAP_NAME);
            },
        );
    }

    #[test]
    fn test_validate_empty_namespace() {
        let mut settings = Settings::default();
        settings.system_namespace = String::new();
        assert!(matches!(
            SettingsLoader::validate(&settings),
            Err(SettingsError::EmptyNamespace)
        ));
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut settings = Settings::default();
        settings.logging.level = "verbose".to_string();

        match SettingsLoader::validate(&settings) {
            Err(SettingsError::InvalidLogLevel(level)) => assert_eq!(level, "verbose"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_invalid_log_format() {
        let mut settings = Settings::default();
        settings.logging.format = "xml".to_string();

        match SettingsLoader::validate(&settings) {
            Err(SettingsError::InvalidLogFormat(format)) => assert_eq!(format, "xml"),
            other => panic!("Expected InvalidLogFormat error, got {other:?}"),
        }
    }
}
