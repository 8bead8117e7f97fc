use super::{
    ensemble::EnsembleConfig,
    evolution::GeneticConfig,
    intelligence::IntelligenceConfig,
    ml::MlConfig,
    pattern::PatternConfig,
    pipeline::PipelineConfig,
    timeout::TimeoutConfig,
    traits::ConfigSection,
};
use crate::error::OracleError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Prefix for environment overrides, e.g. `LOTTO_GENETIC__GENERATIONS=20`.
pub const ENV_PREFIX: &str = "LOTTO";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OracleConfig {
    pub ml: MlConfig,
    pub genetic: GeneticConfig,
    pub pattern: PatternConfig,
    pub intelligence: IntelligenceConfig,
    pub ensemble: EnsembleConfig,
    pub pipeline: PipelineConfig,
    pub timeout: TimeoutConfig,
}

impl OracleConfig {
    pub fn validate(&self) -> Result<(), OracleError> {
        self.ml.validate()?;
        self.genetic.validate()?;
        self.pattern.validate()?;
        self.intelligence.validate()?;
        self.ensemble.validate()?;
        self.pipeline.validate()?;
        self.timeout.validate()?;
        Ok(())
    }

    /// Layered load: defaults, then an optional TOML file, then `LOTTO_*`
    /// environment variables (`__` separates nested keys).
    pub fn load(path: Option<&Path>) -> Result<Self, OracleError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(
            config::Config::try_from(&OracleConfig::default()).map_err(config_error)?,
        );

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: OracleConfig = builder
            .build()
            .map_err(config_error)?
            .try_deserialize()
            .map_err(config_error)?;

        config.validate()?;
        Ok(config)
    }
}

fn config_error(e: config::ConfigError) -> OracleError {
    OracleError::Configuration(format!("Failed to load config: {}", e))
}

pub struct ConfigManager {
    config: Arc<RwLock<OracleConfig>>,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(OracleConfig::default())),
        }
    }

    pub fn with_config(config: OracleConfig) -> Result<Self, OracleError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(RwLock::new(config)),
        })
    }

    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), OracleError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| OracleError::Configuration(format!("Failed to read config: {}", e)))?;

        let config: OracleConfig = toml::from_str(&contents)
            .map_err(|e| OracleError::Configuration(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        *self.write_guard() = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), OracleError> {
        let toml_str = self.to_toml()?;

        std::fs::write(path, toml_str)
            .map_err(|e| OracleError::Configuration(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, OracleError> {
        let config = self.get();
        toml::to_string_pretty(&config)
            .map_err(|e| OracleError::Configuration(format!("Failed to serialize: {}", e)))
    }

    pub fn get(&self) -> OracleConfig {
        match self.config.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Apply `f` to a copy and only commit it when the result validates.
    pub fn update<F>(&self, f: F) -> Result<(), OracleError>
    where
        F: FnOnce(&mut OracleConfig),
    {
        let mut candidate = self.get();
        f(&mut candidate);
        candidate.validate()?;
        *self.write_guard() = candidate;
        Ok(())
    }

    fn write_guard(&self) -> std::sync::RwLockWriteGuard<'_, OracleConfig> {
        match self.config.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        assert!(OracleConfig::default().validate().is_ok());
    }

    #[test]
    fn test_update_rejects_invalid_and_keeps_previous() {
        let manager = ConfigManager::new();
        let result = manager.update(|c| c.genetic.population_size = 2);
        assert!(result.is_err());
        assert_eq!(manager.get().genetic.population_size, 100);

        manager.update(|c| c.genetic.generations = 7).unwrap();
        assert_eq!(manager.get().genetic.generations, 7);
    }

    #[test]
    fn test_toml_round_trip_through_file() {
        let path = std::env::temp_dir().join(format!(
            "lotto_oracle_config_{}.toml",
            std::process::id()
        ));
        let manager = ConfigManager::new();
        manager.update(|c| c.pattern.recent_window = 12).unwrap();
        manager.save_to_file(&path).unwrap();

        let reloaded = ConfigManager::new();
        reloaded.load_from_file(&path).unwrap();
        assert_eq!(reloaded.get().pattern.recent_window, 12);

        let layered = OracleConfig::load(Some(&path)).unwrap();
        assert_eq!(layered.pattern.recent_window, 12);
        let _ = std::fs::remove_file(&path);
    }
}
