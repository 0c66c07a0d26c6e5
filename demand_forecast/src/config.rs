//! Forecast configuration
//!
//! Every threshold and hyperparameter the engines use lives in
//! [`ForecastConfig`], which is handed to both engines at construction.
//!
//! ## Loading Order
//!
//! 1. `DEMAND_FORECAST_CONFIG` environment variable (path to a TOML file)
//! 2. `forecast_config.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ```toml
//! promo_threshold = 0.10
//! window_size = 3
//!
//! [bagged]
//! n_trees = 200
//! seed = 42
//!
//! [boosted]
//! n_rounds = 250
//! max_depth = 6
//! learning_rate = 0.05
//! ```

use crate::error::{ForecastError, Result};
use crate::models::boosting::BoostingParams;
use crate::models::forest::ForestParams;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming a TOML configuration file
pub const CONFIG_ENV_VAR: &str = "DEMAND_FORECAST_CONFIG";

/// Configuration file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "forecast_config.toml";

/// Fixed configuration shared by the feature and forecast engines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Discount rate at or above which a week counts as a promotion
    pub promo_threshold: f64,
    /// Number of trailing weeks used for training
    pub window_size: u32,
    /// Bagged-tree ensemble (model A)
    pub bagged: ForestParams,
    /// Boosted-tree ensemble (model B)
    pub boosted: BoostingParams,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            promo_threshold: 0.10,
            window_size: 3,
            bagged: ForestParams::default(),
            boosted: BoostingParams::default(),
        }
    }
}

impl ForecastConfig {
    /// Resolve configuration from the environment, the working directory,
    /// or the defaults, in that order.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(
                            path = %p.display(),
                            "Loaded forecast config from {}", CONFIG_ENV_VAR
                        );
                        return config;
                    }
                    Err(e) => {
                        warn!(
                            path = %p.display(),
                            error = %e,
                            "Failed to load forecast config, falling back"
                        );
                    }
                }
            } else {
                warn!(path = %path, "{} points to a missing file, falling back", CONFIG_ENV_VAR);
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded forecast config from ./{}", LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        Self::default()
    }

    /// Parse and validate a TOML configuration file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable by the engines
    pub fn validate(&self) -> Result<()> {
        if !self.promo_threshold.is_finite() {
            return Err(ForecastError::ConfigError(
                "promo_threshold must be a finite number".to_string(),
            ));
        }
        if self.window_size == 0 {
            return Err(ForecastError::ConfigError(
                "window_size must be at least 1".to_string(),
            ));
        }
        self.bagged.validate()?;
        self.boosted.validate()?;
        Ok(())
    }
}
