use crate::errors::SettingsError;
use crate::utils::crypto::DEFAULT_STATE_BYTES;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up in the working directory and in `APPLE_LOGIN_CONFIG_DIR`
pub const SETTINGS_FILE_NAME: &str = "Login.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoginSettings {
    #[serde(default)]
    pub request: RequestSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSettings {
    /// Attach a random `state` to every request
    #[serde(default = "default_true")]
    pub attach_state: bool,
    /// Number of random bytes in the generated state
    #[serde(default = "default_state_bytes")]
    pub state_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
}

// Helper functions for serde defaults
fn default_true() -> bool {
    true
}
fn default_state_bytes() -> usize {
    DEFAULT_STATE_BYTES
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            attach_state: true,
            state_bytes: DEFAULT_STATE_BYTES,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoginSettings {
    /// Load settings from configuration files and environment variables
    ///
    /// Also installs an `env_logger` filtered by `logging.level`, unless the
    /// host application already installed a logger.
    ///
    /// # Errors
    ///
    /// Returns an error if a settings file cannot be read, parsed or holds
    /// invalid values
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_env_file();

        // Load base settings from TOML or defaults
        let mut settings = Self::load_base_settings()?;

        // Apply environment variable overrides
        Self::apply_env_overrides(&mut settings);

        settings.init_logging();
        Ok(settings)
    }

    /// Install an `env_logger` using `logging.level` as its filter
    ///
    /// Returns false when a logger was already set, in which case the
    /// existing one stays in charge.
    pub fn init_logging(&self) -> bool {
        match env_logger::Builder::new()
            .parse_filters(&self.logging.level)
            .try_init()
        {
            Ok(()) => true,
            Err(err) => {
                log::debug!("Keeping existing logger: {err}");
                false
            }
        }
    }

    /// Load base settings from TOML file(s) or use defaults
    /// Settings are loaded with the following priority (highest to lowest):
    /// 1. Environment variables (applied separately after loading base settings)
    /// 2. Login.toml in `APPLE_LOGIN_CONFIG_DIR` (if specified and exists)
    /// 3. Login.toml in current directory (if exists)
    /// 4. Default settings
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Settings file cannot be read
    /// - TOML parsing fails
    fn load_base_settings() -> Result<Self, SettingsError> {
        let mut settings = Self::default();

        let default_config_path = PathBuf::from(SETTINGS_FILE_NAME);
        if default_config_path.exists() {
            settings = Self::from_file(&default_config_path)?;
            log::info!(
                "✓ Loaded base settings from {}",
                default_config_path.display()
            );
        }

        if let Ok(config_dir) = std::env::var("APPLE_LOGIN_CONFIG_DIR") {
            let config_path = Path::new(&config_dir).join(SETTINGS_FILE_NAME);
            if config_path.exists() {
                settings = Self::from_file(&config_path)?;
                log::info!("✓ Overriding settings from {}", config_path.display());
            } else {
                log::info!(
                    "ℹ APPLE_LOGIN_CONFIG_DIR set but no {SETTINGS_FILE_NAME} found at: {}",
                    config_path.display()
                );
            }
        }

        Ok(settings)
    }

    /// Parse settings from a single TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or sets
    /// `request.state_bytes` to zero
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let toml_content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let settings: Self =
            basic_toml::from_str(&toml_content).map_err(|source| SettingsError::Parse {
                path: path.display().to_string(),
                source,
            })?;

        if settings.request.state_bytes == 0 {
            return Err(SettingsError::Invalid {
                path: path.display().to_string(),
                message: "request.state_bytes must be a positive integer".to_string(),
            });
        }

        Ok(settings)
    }

    /// Apply environment variable overrides to settings
    pub fn apply_env_overrides(settings: &mut Self) {
        Self::apply_request_env_overrides(&mut settings.request);
        Self::apply_logging_env_overrides(&mut settings.logging);
    }

    /// Apply environment overrides for request settings
    pub fn apply_request_env_overrides(request_settings: &mut RequestSettings) {
        if let Ok(attach_state_str) = std::env::var("APPLE_LOGIN_ATTACH_STATE") {
            if let Ok(attach_state) = attach_state_str.parse::<bool>() {
                request_settings.attach_state = attach_state;
            }
        }
        if let Ok(state_bytes_str) = std::env::var("APPLE_LOGIN_STATE_BYTES") {
            match state_bytes_str.parse::<usize>() {
                Ok(state_bytes) if state_bytes > 0 => request_settings.state_bytes = state_bytes,
                _ => log::warn!(
                    "Ignoring APPLE_LOGIN_STATE_BYTES={state_bytes_str}: expected a positive integer"
                ),
            }
        }
    }

    /// Apply environment overrides for logging settings
    fn apply_logging_env_overrides(logging_settings: &mut LoggingSettings) {
        if let Ok(log_level) = std::env::var("RUST_LOG") {
            logging_settings.level = log_level;
        }
    }

    /// Load environment variables from .env file
    fn load_env_file() {
        if let Ok(contents) = std::fs::read_to_string(".env") {
            for line in contents.lines() {
                if let Some((key, value)) = line.split_once('=') {
                    std::env::set_var(key.trim(), value.trim());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    // Helper function to clean all relevant environment variables for tests
    fn clean_env_vars() {
        std::env::remove_var("APPLE_LOGIN_ATTACH_STATE");
        std::env::remove_var("APPLE_LOGIN_STATE_BYTES");
        std::env::remove_var("APPLE_LOGIN_CONFIG_DIR");
    }

    #[test]
    fn test_request_defaults() {
        let settings = LoginSettings::default();
        assert!(settings.request.attach_state);
        assert_eq!(settings.request.state_bytes, 24);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings: LoginSettings = basic_toml::from_str(
            r#"
            [request]
            attach_state = false
            "#,
        )
        .unwrap();

        assert!(!settings.request.attach_state);
        assert_eq!(settings.request.state_bytes, DEFAULT_STATE_BYTES);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn test_from_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&path, "[request]\nstate_bytes = \"many\"\n").unwrap();

        let err = LoginSettings::from_file(&path).unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));
        assert!(err.to_string().contains(SETTINGS_FILE_NAME));

        let missing = LoginSettings::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(missing, SettingsError::Read { .. }));
    }

    #[test]
    fn test_from_file_rejects_zero_state_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&path, "[request]\nstate_bytes = 0\n").unwrap();

        let err = LoginSettings::from_file(&path).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { .. }));
        assert!(err.to_string().contains("state_bytes"));
    }

    #[test]
    #[serial]
    fn test_config_dir_overrides_defaults() {
        clean_env_vars();

        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILE_NAME),
            "[request]\nattach_state = false\nstate_bytes = 16\n",
        )
        .unwrap();
        std::env::set_var("APPLE_LOGIN_CONFIG_DIR", dir.path());

        let settings = LoginSettings::load_base_settings().unwrap();
        assert!(!settings.request.attach_state);
        assert_eq!(settings.request.state_bytes, 16);

        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_request_env_overrides() {
        clean_env_vars();

        let mut request_settings = RequestSettings::default();
        std::env::set_var("APPLE_LOGIN_ATTACH_STATE", "false");
        std::env::set_var("APPLE_LOGIN_STATE_BYTES", "32");

        LoginSettings::apply_request_env_overrides(&mut request_settings);

        assert!(!request_settings.attach_state);
        assert_eq!(request_settings.state_bytes, 32);

        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_invalid_env_overrides_are_ignored() {
        clean_env_vars();

        let mut request_settings = RequestSettings::default();
        std::env::set_var("APPLE_LOGIN_ATTACH_STATE", "maybe");
        std::env::set_var("APPLE_LOGIN_STATE_BYTES", "0");

        LoginSettings::apply_request_env_overrides(&mut request_settings);

        assert_eq!(request_settings, RequestSettings::default());

        clean_env_vars();
    }
}
