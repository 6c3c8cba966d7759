//! Configuration loader with layered sources.

use crate::AppConfig;
use config::{Config, ConfigError, Environment, File};
use std::path::Path;
use std::sync::Arc;
use tessera_core::{TesseraError, TesseraResult};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Accepted range for generated OTP lengths.
const OTP_LENGTH_RANGE: std::ops::RangeInclusive<usize> = 4..=10;

/// Configuration loader with runtime refresh support.
#[derive(Clone)]
pub struct ConfigLoader {
    config: Arc<RwLock<AppConfig>>,
    config_dir: String,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// Configuration is loaded from multiple sources in order:
    /// 1. `config/default.toml` - Default values
    /// 2. `config/{environment}.toml` - Environment-specific overrides
    /// 3. `config/local.toml` - Untracked local overrides
    /// 4. Environment variables such as `TESSERA__DATABASE__URL`
    pub fn new(config_dir: impl Into<String>) -> TesseraResult<Self> {
        let config_dir = config_dir.into();
        let config = Self::load_config(&config_dir)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_dir,
        })
    }

    /// Loads configuration from the default location (`./config`).
    pub fn from_default_location() -> TesseraResult<Self> {
        Self::new("./config")
    }

    /// Returns the current configuration.
    pub async fn get(&self) -> AppConfig {
        self.config.read().await.clone()
    }

    /// Reloads the configuration from disk.
    pub async fn reload(&self) -> TesseraResult<()> {
        let new_config = Self::load_config(&self.config_dir)?;
        *self.config.write().await = new_config;
        info!("Configuration reloaded successfully");
        Ok(())
    }

    fn load_config(config_dir: &str) -> TesseraResult<AppConfig> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        let environment =
            std::env::var("TESSERA_ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        info!("Loading configuration for environment: {}", environment);

        let mut builder = Config::builder();

        for name in ["default", environment.as_str(), "local"] {
            let path = format!("{config_dir}/{name}.toml");
            if Path::new(&path).exists() {
                debug!("Loading config from: {}", path);
                builder = builder.add_source(File::with_name(&path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("TESSERA")
                .separator("__")
                .try_parsing(true),
        );

        let app_config: AppConfig = builder
            .build()
            .and_then(|config| config.try_deserialize::<AppConfig>())
            .map_err(config_error_to_tessera_error)?;

        validate_config(&app_config)?;

        Ok(app_config)
    }
}

/// Rejects configurations the service cannot start with.
pub fn validate_config(config: &AppConfig) -> TesseraResult<()> {
    if config.database.url.trim().is_empty() {
        return Err(TesseraError::Configuration(
            "Database URL is required".to_string(),
        ));
    }

    if !OTP_LENGTH_RANGE.contains(&config.otp.length) {
        return Err(TesseraError::Configuration(format!(
            "OTP length must be between {} and {}, got {}",
            OTP_LENGTH_RANGE.start(),
            OTP_LENGTH_RANGE.end(),
            config.otp.length
        )));
    }

    if config.smtp.enabled {
        if config.smtp.host.trim().is_empty() {
            return Err(TesseraError::Configuration(
                "SMTP host is required when SMTP is enabled".to_string(),
            ));
        }
        if config.smtp.from_email.trim().is_empty() {
            return Err(TesseraError::Configuration(
                "SMTP from_email is required when SMTP is enabled".to_string(),
            ));
        }
    }

    Ok(())
}

fn config_error_to_tessera_error(err: ConfigError) -> TesseraError {
    TesseraError::Configuration(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_rejects_empty_database_url() {
        let mut config = AppConfig::default();
        config.database.url = "  ".to_string();
        let err = validate_config(&config).unwrap_err();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    }

    #[test]
    fn test_rejects_out_of_range_otp_length() {
        let mut config = AppConfig::default();
        config.otp.length = 3;
        assert!(validate_config(&config).is_err());
        config.otp.length = 11;
        assert!(validate_config(&config).is_err());
        config.otp.length = 8;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_enabled_smtp_requires_host_and_sender() {
        let mut config = AppConfig::default();
        config.smtp.enabled = true;
        assert!(validate_config(&config).is_err());

        config.smtp.host = "smtp.example.com".to_string();
        assert!(validate_config(&config).is_err());

        config.smtp.from_email = "noreply@example.com".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[tokio::test]
    async fn test_loads_and_reloads_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let default_path = dir.path().join("default.toml");
        fs::write(
            &default_path,
            "[cache]\nuser_ttl_secs = 120\n\n[otp]\nlength = 8\n",
        )
        .unwrap();

        let loader = ConfigLoader::new(dir.path().to_string_lossy()).unwrap();
        let config = loader.get().await;
        assert_eq!(config.cache.user_ttl_secs, Some(120));
        assert_eq!(config.otp.length, 8);
        assert_eq!(config.otp.ttl_secs, Some(900));

        fs::write(&default_path, "[otp]\nlength = 4\n").unwrap();
        loader.reload().await.unwrap();
        assert_eq!(loader.get().await.otp.length, 4);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("default.toml"), "[otp]\nlength = 2\n").unwrap();
        assert!(ConfigLoader::new(dir.path().to_string_lossy()).is_err());
    }
}
