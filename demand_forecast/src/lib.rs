//! # Demand Forecast
//!
//! Weekly per-product demand forecasting for a small retail catalogue.
//!
//! ## Features
//!
//! - Typed weekly sales records with CSV ingestion (`DD-MM-YYYY` dates)
//! - Feature enhancement: discount, promotion and stockout flags, growth
//!   since the first week, lagged values and week-over-week price elasticity
//! - A trailing-window forecaster blending a bagged forest with boosted trees
//! - In-memory store with atomic rebuilds of the enhanced table
//! - Accuracy metrics for weeks whose actual sales are known
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use demand_forecast::{
//!     FeatureEngine, ForecastConfig, ForecastEngine, InMemoryStore, RecordReader,
//! };
//!
//! # fn main() -> demand_forecast::Result<()> {
//! let config = ForecastConfig::load();
//! let raw = RecordReader::raw_from_reader(std::fs::File::open("weekly_sales.csv")?)?;
//!
//! let store = InMemoryStore::with_raw(raw);
//! store.rebuild(&FeatureEngine::new(&config))?;
//!
//! let engine = ForecastEngine::new(&config)?;
//! for prediction in engine.forecast(&store, 4)? {
//!     println!("{}: {}", prediction.product_name, prediction.predicted_qty);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod features;
pub mod forecast;
pub mod ingest;
pub mod metrics;
pub mod models;
pub mod preprocess;
pub mod records;
pub mod store;

// Re-export commonly used types
pub use crate::config::ForecastConfig;
pub use crate::error::{ForecastError, Result};
pub use crate::features::FeatureEngine;
pub use crate::forecast::ForecastEngine;
pub use crate::ingest::{RecordReader, RecordWriter};
pub use crate::metrics::{evaluate_predictions, ForecastAccuracy};
pub use crate::models::{DemandModel, FittedModel, TrainingSet};
pub use crate::records::{EnhancedWeeklyRecord, PredictionResult, RawWeeklyRecord, UploadRow};
pub use crate::store::{rebuild_enhanced, InMemoryStore, SalesStore};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
