//! Layered runtime settings: built-in defaults, an optional TOML file,
//! `WEATHER_INSIGHTS__*` environment variables, then command-line overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ::config::{Config, ConfigBuilder, Environment, File, FileFormat};
use ::config::builder::DefaultState;
use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::{Validate, ValidationError};

use crate::error::Result;
use crate::geolocation::DefaultSelection;
use crate::models::Continent;
use crate::utils::constants::*;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Settings {
    #[validate(nested)]
    pub dataset: DatasetSettings,
    #[validate(nested)]
    pub defaults: DefaultsSettings,
    #[validate(nested)]
    pub geolocation: GeolocationSettings,
    #[validate(nested)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct DatasetSettings {
    #[validate(length(min = 1))]
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct DefaultsSettings {
    #[validate(length(min = 1))]
    pub country: String,
    pub continent: Continent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct GeolocationSettings {
    pub enabled: bool,
    #[validate(custom(function = "validate_endpoint"))]
    pub endpoint: String,
    #[validate(range(min = 1, max = 10000))]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct LoggingSettings {
    #[validate(custom(function = "validate_level"))]
    pub level: String,
}

fn validate_endpoint(endpoint: &str) -> std::result::Result<(), ValidationError> {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Ok(())
    } else {
        Err(ValidationError::new("endpoint_scheme"))
    }
}

fn validate_level(level: &str) -> std::result::Result<(), ValidationError> {
    if LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
        Ok(())
    } else {
        Err(ValidationError::new("log_level"))
    }
}

impl Settings {
    /// Load settings; `config_file` must exist when given, the default file is optional.
    pub fn load(config_file: Option<&Path>, dataset: Option<&Path>) -> Result<Self> {
        let environment = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true);
        Self::load_from(config_file, dataset, environment)
    }

    fn load_from(
        config_file: Option<&Path>,
        dataset: Option<&Path>,
        environment: Environment,
    ) -> Result<Self> {
        let builder = Self::defaults()?;

        let builder = match config_file {
            Some(path) => {
                debug!("Reading settings from {}", path.display());
                builder.add_source(File::from(path).format(FileFormat::Toml).required(true))
            }
            None => builder.add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Toml).required(false)),
        };

        let settings: Settings = builder
            .add_source(environment)
            .set_override_option("dataset.path", dataset.map(|p| p.display().to_string()))?
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .set_default("dataset.path", DEFAULT_DATASET_PATH)?
            .set_default("defaults.country", DEFAULT_COUNTRY)?
            .set_default("defaults.continent", DEFAULT_CONTINENT)?
            .set_default("geolocation.enabled", false)?
            .set_default("geolocation.endpoint", DEFAULT_GEOLOCATION_ENDPOINT)?
            .set_default("geolocation.timeout_ms", DEFAULT_GEOLOCATION_TIMEOUT_MS as i64)?
            .set_default("logging.level", "info")?)
    }

    pub fn dataset_path(&self) -> PathBuf {
        PathBuf::from(&self.dataset.path)
    }

    pub fn default_selection(&self) -> DefaultSelection {
        DefaultSelection::new(self.defaults.country.clone(), self.defaults.continent)
    }

    pub fn geolocation_timeout(&self) -> Duration {
        Duration::from_millis(self.geolocation.timeout_ms)
    }
}
