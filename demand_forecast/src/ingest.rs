//! Reading and writing weekly sales tables
//!
//! Tables are validated when they are turned into typed records: every
//! required column must be present in the header, and every row must
//! deserialize into its record type. Failures surface as
//! [`ForecastError::SchemaError`] before any feature math runs.

use crate::error::{ForecastError, Result};
use crate::records::{
    EnhancedWeeklyRecord, PredictionResult, RawWeeklyRecord, UploadRow, ENHANCED_COLUMNS,
    RAW_COLUMNS, UPLOAD_COLUMNS,
};
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{Read, Write};
use tracing::debug;

/// Loader for CSV weekly sales tables
#[derive(Debug)]
pub struct RecordReader;

impl RecordReader {
    /// Read a raw weekly table (with its `Week` column)
    pub fn raw_from_reader<R: Read>(reader: R) -> Result<Vec<RawWeeklyRecord>> {
        let records: Vec<RawWeeklyRecord> = Self::read_table(reader, &RAW_COLUMNS, "raw")?;
        if let Some(bad) = records.iter().find(|r| r.week == 0) {
            return Err(ForecastError::SchemaError(format!(
                "raw table: week numbers start at 1 (product '{}' has week 0)",
                bad.product_name
            )));
        }
        Ok(records)
    }

    /// Read an upload batch, which has no `Week` column yet
    pub fn uploads_from_reader<R: Read>(reader: R) -> Result<Vec<UploadRow>> {
        Self::read_table(reader, &UPLOAD_COLUMNS, "upload")
    }

    /// Read an enhanced weekly table
    pub fn enhanced_from_reader<R: Read>(reader: R) -> Result<Vec<EnhancedWeeklyRecord>> {
        Self::read_table(reader, &ENHANCED_COLUMNS, "enhanced")
    }

    fn read_table<R, T>(reader: R, required: &[&str], table: &str) -> Result<Vec<T>>
    where
        R: Read,
        T: DeserializeOwned,
    {
        let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        Self::check_columns(&headers, required, table)?;

        let mut records = Vec::new();
        for (row, result) in csv_reader.deserialize::<T>().enumerate() {
            let record = result.map_err(|e| {
                ForecastError::SchemaError(format!("{} table, data row {}: {}", table, row + 1, e))
            })?;
            records.push(record);
        }

        debug!(table, rows = records.len(), "Read weekly table");
        Ok(records)
    }

    /// Fail with every required column the header lacks
    fn check_columns(headers: &StringRecord, required: &[&str], table: &str) -> Result<()> {
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|col| !headers.iter().any(|h| h == *col))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ForecastError::SchemaError(format!(
                "{} table is missing required columns: {}",
                table,
                missing.join(", ")
            )))
        }
    }
}

/// Writer for CSV weekly sales tables
#[derive(Debug)]
pub struct RecordWriter;

impl RecordWriter {
    /// Write enhanced records with the standard header
    pub fn write_enhanced<W: Write>(writer: W, records: &[EnhancedWeeklyRecord]) -> Result<()> {
        Self::write_table(writer, records, &ENHANCED_COLUMNS)
    }

    /// Write predictions as `Product_Name,Quantity_Bought,Predicted_Qty`
    pub fn write_predictions<W: Write>(writer: W, predictions: &[PredictionResult]) -> Result<()> {
        Self::write_table(
            writer,
            predictions,
            &["Product_Name", "Quantity_Bought", "Predicted_Qty"],
        )
    }

    // The header is written by hand so that an empty table still has one.
    fn write_table<W: Write, T: Serialize>(writer: W, rows: &[T], header: &[&str]) -> Result<()> {
        let mut csv_writer = WriterBuilder::new().has_headers(false).from_writer(writer);
        csv_writer.write_record(header)?;
        for row in rows {
            csv_writer.serialize(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "\
Week,Product_Name,Price_Bought,Quantity_Bought,Price_Sold,Quantity_Sold,Start_Date,End_Date
1,Milk,1.0,120,1.2,100,01-01-2024,07-01-2024
2,Milk,1.0,120,1.2,110,08-01-2024,14-01-2024
";

    #[test]
    fn test_raw_from_reader() {
        let records = RecordReader::raw_from_reader(RAW.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].week, 2);
        assert_eq!(records[1].quantity_sold, 110.0);
        assert_eq!(
            records[0].start_date,
            chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_missing_columns_are_named() {
        let csv = "Week,Product_Name,Price_Bought\n1,Milk,1.0\n";
        let err = RecordReader::raw_from_reader(csv.as_bytes()).unwrap_err();
        match err {
            ForecastError::SchemaError(msg) => {
                assert!(msg.contains("Quantity_Sold"));
                assert!(msg.contains("End_Date"));
                assert!(!msg.contains("Price_Bought,"));
            }
            other => panic!("Expected SchemaError, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_date_is_schema_error() {
        let csv = "\
Week,Product_Name,Price_Bought,Quantity_Bought,Price_Sold,Quantity_Sold,Start_Date,End_Date
1,Milk,1.0,120,1.2,100,2024-01-01,07-01-2024
";
        assert!(matches!(
            RecordReader::raw_from_reader(csv.as_bytes()),
            Err(ForecastError::SchemaError(_))
        ));
    }

    #[test]
    fn test_week_zero_rejected() {
        let csv = RAW.replace("\n1,Milk", "\n0,Milk");
        assert!(matches!(
            RecordReader::raw_from_reader(csv.as_bytes()),
            Err(ForecastError::SchemaError(_))
        ));
    }

    #[test]
    fn test_upload_ignores_missing_week() {
        let csv = "\
Product_Name,Price_Bought,Quantity_Bought,Price_Sold,Quantity_Sold,Start_Date,End_Date
Bread,2.0,50,2.5,48,15-01-2024,21-01-2024
";
        let rows = RecordReader::uploads_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].clone().into_raw(3).week, 3);
    }

    #[test]
    fn test_empty_prediction_table_has_header() {
        let mut out = Vec::new();
        RecordWriter::write_predictions(&mut out, &[]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Product_Name,Quantity_Bought,Predicted_Qty\n"
        );
    }
}
