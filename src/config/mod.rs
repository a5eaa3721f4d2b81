use crate::models::AppConfig;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, Environment, File, FileFormat};
use std::fs;

/// File name of the application configuration inside the config directory
pub const CONFIG_FILE_NAME: &str = "helmad.yaml";

/// Prefix for environment overrides, e.g. `HELMAD__STARTUP__SPLASH_DELAY_MS=0`
pub const DEFAULT_ENV_PREFIX: &str = "HELMAD";

/// Configuration manager for loading and saving `helmad.yaml`.
///
/// Loading layers the YAML file (optional) under environment overrides.
/// Saving writes plain YAML.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    config_path: Utf8PathBuf,
    env_prefix: String,
}

impl ConfigManager {
    /// Create a new ConfigManager for the specified configuration directory.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        Self::with_env_prefix(config_dir, DEFAULT_ENV_PREFIX)
    }

    /// Same as [`ConfigManager::new`] with a custom environment prefix
    pub fn with_env_prefix<P: AsRef<Utf8Path>>(config_dir: P, env_prefix: &str) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            config_path: config_dir.join(CONFIG_FILE_NAME),
            config_dir,
            env_prefix: env_prefix.to_string(),
        })
    }

    /// Load the application configuration.
    ///
    /// # Returns
    /// The merged AppConfig; defaults fill anything neither the file nor the
    /// environment sets
    pub fn load(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            tracing::warn!(
                "Config file not found at {}, using defaults",
                self.config_path
            );
        }

        let config: AppConfig = Config::builder()
            .add_source(
                File::from(self.config_path.as_std_path())
                    .format(FileFormat::Yaml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read config: {}", self.config_path))?
            .try_deserialize()
            .with_context(|| format!("Failed to parse config: {}", self.config_path))?;

        tracing::info!("Loaded config from {}", self.config_path);
        Ok(config)
    }

    /// Save the application configuration.
    pub fn save(&self, config: &AppConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize config to YAML")?;

        fs::write(&self.config_path, yaml_string)
            .with_context(|| format!("Failed to write config: {}", self.config_path))?;

        tracing::info!("Saved config to {}", self.config_path);
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    /// Get the configuration file path.
    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }
}
