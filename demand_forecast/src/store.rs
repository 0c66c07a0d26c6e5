//! Storage of raw and enhanced weekly tables
//!
//! The enhanced table is a derived materialization: a rebuild computes the
//! whole new table from the raw history and then swaps it in at once.
//! Readers hold an `Arc` snapshot, so a forecast never sees a half-replaced
//! table.

use crate::error::{ForecastError, Result};
use crate::features::FeatureEngine;
use crate::records::{EnhancedWeeklyRecord, RawWeeklyRecord, UploadRow};
use chrono::Duration;
use std::ops::RangeInclusive;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, info};

/// Access to persisted weekly sales tables
pub trait SalesStore: Send + Sync {
    /// Every raw record ever stored
    fn raw_records(&self) -> Result<Vec<RawWeeklyRecord>>;

    /// Enhanced records whose week falls in `weeks`, in table order
    fn enhanced_in_weeks(&self, weeks: RangeInclusive<u32>) -> Result<Vec<EnhancedWeeklyRecord>>;

    /// Replace the whole enhanced table in one step
    fn replace_enhanced(&self, records: Vec<EnhancedWeeklyRecord>) -> Result<()>;
}

/// Recompute the enhanced table from the full raw history.
///
/// Returns the number of enhanced rows written. With no raw rows the
/// enhanced table is left as it is and 0 is returned.
pub fn rebuild_enhanced<S: SalesStore + ?Sized>(
    store: &S,
    engine: &FeatureEngine,
) -> Result<usize> {
    let raw = store.raw_records()?;
    if raw.is_empty() {
        debug!("No raw records, skipping rebuild");
        return Ok(0);
    }

    let enhanced = engine.enhance(&raw);
    let count = enhanced.len();
    store.replace_enhanced(enhanced)?;
    info!(rows = count, "Rebuilt enhanced weekly table");
    Ok(count)
}

/// In-process store
#[derive(Debug, Default)]
pub struct InMemoryStore {
    raw: RwLock<Vec<RawWeeklyRecord>>,
    enhanced: RwLock<Arc<Vec<EnhancedWeeklyRecord>>>,
    rebuild_lock: Mutex<()>,
}

fn poisoned<T>(_: PoisonError<T>) -> ForecastError {
    ForecastError::StoreError("store lock poisoned by a panicked writer".to_string())
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with raw history; the enhanced table starts empty
    pub fn with_raw(records: Vec<RawWeeklyRecord>) -> Self {
        Self {
            raw: RwLock::new(records),
            ..Self::default()
        }
    }

    /// Append raw rows; they stay invisible to forecasts until a rebuild
    pub fn append_raw(&self, records: Vec<RawWeeklyRecord>) -> Result<()> {
        self.raw.write().map_err(poisoned)?.extend(records);
        Ok(())
    }

    /// Current enhanced table
    pub fn enhanced_snapshot(&self) -> Result<Arc<Vec<EnhancedWeeklyRecord>>> {
        Ok(Arc::clone(&*self.enhanced.read().map_err(poisoned)?))
    }

    /// Rebuild the enhanced table; concurrent rebuilds run one at a time
    pub fn rebuild(&self, engine: &FeatureEngine) -> Result<usize> {
        let _guard = self.rebuild_lock.lock().map_err(poisoned)?;
        rebuild_enhanced(self, engine)
    }

    /// Week number for a batch starting on `start`.
    ///
    /// A batch that begins the day after a stored week ends continues that
    /// week's numbering; any other batch starts again at week 1.
    pub fn next_week(&self, start: chrono::NaiveDate) -> Result<u32> {
        let previous_end = start - Duration::days(1);
        let raw = self.raw.read().map_err(poisoned)?;
        let week = raw
            .iter()
            .filter(|r| r.end_date == previous_end)
            .map(|r| r.week)
            .max()
            .map_or(1, |w| w + 1);
        Ok(week)
    }

    /// Store an upload batch under its inferred week and rebuild.
    ///
    /// Returns the week assigned to the batch.
    pub fn ingest_upload(&self, rows: Vec<UploadRow>, engine: &FeatureEngine) -> Result<u32> {
        let Some(first) = rows.first() else {
            return Err(ForecastError::SchemaError(
                "upload batch has no rows".to_string(),
            ));
        };

        let _guard = self.rebuild_lock.lock().map_err(poisoned)?;
        let week = self.next_week(first.start_date)?;
        let records: Vec<RawWeeklyRecord> = rows.into_iter().map(|r| r.into_raw(week)).collect();
        info!(week, rows = records.len(), "Storing upload batch");
        self.append_raw(records)?;
        rebuild_enhanced(self, engine)?;
        Ok(week)
    }
}

impl SalesStore for InMemoryStore {
    fn raw_records(&self) -> Result<Vec<RawWeeklyRecord>> {
        Ok(self.raw.read().map_err(poisoned)?.clone())
    }

    fn enhanced_in_weeks(&self, weeks: RangeInclusive<u32>) -> Result<Vec<EnhancedWeeklyRecord>> {
        let snapshot = self.enhanced_snapshot()?;
        Ok(snapshot
            .iter()
            .filter(|r| weeks.contains(&r.week))
            .cloned()
            .collect())
    }

    fn replace_enhanced(&self, records: Vec<EnhancedWeeklyRecord>) -> Result<()> {
        let fresh = Arc::new(records);
        *self.enhanced.write().map_err(poisoned)? = fresh;
        Ok(())
    }
}
