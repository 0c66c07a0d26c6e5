//! # Weekly Demand
//!
//! Facade over the workspace crates: [`sales_math`] for the numeric
//! primitives and [`demand_forecast`] for records, features and forecasting.
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use weekly_demand_workspace::forecast_week;
//! use weekly_demand_workspace::demand_forecast::{ForecastConfig, RawWeeklyRecord};
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let history: Vec<RawWeeklyRecord> = (1..=3)
//!     .map(|week| RawWeeklyRecord {
//!         week,
//!         product_name: "Milk".to_string(),
//!         price_bought: 1.0,
//!         quantity_bought: 120.0,
//!         price_sold: 0.9,
//!         quantity_sold: 100.0,
//!         start_date: start,
//!         end_date: start,
//!     })
//!     .collect();
//!
//! let config = ForecastConfig::default();
//! let predictions = forecast_week(history, 3, &config).unwrap();
//! assert_eq!(predictions[0].predicted_qty, 100);
//! ```

pub use demand_forecast;
pub use sales_math;

use demand_forecast::{
    FeatureEngine, ForecastConfig, ForecastEngine, InMemoryStore, PredictionResult,
    RawWeeklyRecord, Result,
};

/// Enhance a raw history and forecast `target_week` in one call
pub fn forecast_week(
    raw: Vec<RawWeeklyRecord>,
    target_week: u32,
    config: &ForecastConfig,
) -> Result<Vec<PredictionResult>> {
    let store = InMemoryStore::with_raw(raw);
    store.rebuild(&FeatureEngine::new(config))?;
    ForecastEngine::new(config)?.forecast(&store, target_week)
}
