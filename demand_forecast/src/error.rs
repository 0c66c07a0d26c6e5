//! Error types for the demand_forecast crate

use thiserror::Error;

/// Custom error types for the demand_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// A required column is missing or a record cannot be read into its typed form
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// No training weeks exist before the target week
    #[error("Insufficient history: no training weeks available before week {target_week}")]
    InsufficientHistory { target_week: u32 },

    /// The target week has no enhanced rows
    #[error("No enhanced data for week {0}")]
    NoTargetData(u32),

    /// A model could not be fitted or applied
    #[error("Training error: {0}")]
    TrainingError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The store could not serve a read or write
    #[error("Store error: {0}")]
    StoreError(String),

    /// Error while reading or validating configuration
    #[error("Config error: {0}")]
    ConfigError(String),

    /// Error from mathematical operations
    #[error("Math error: {0}")]
    MathError(#[from] sales_math::MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV reading or writing
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<toml::de::Error> for ForecastError {
    fn from(err: toml::de::Error) -> Self {
        ForecastError::ConfigError(err.to_string())
    }
}
