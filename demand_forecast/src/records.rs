//! Typed weekly sales records
//!
//! Column names on the wire follow the inventory tables (`Product_Name`,
//! `Quantity_Sold`, ...). Dates travel as `DD-MM-YYYY`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Columns every raw weekly table must carry
pub const RAW_COLUMNS: [&str; 8] = [
    "Week",
    "Product_Name",
    "Price_Bought",
    "Quantity_Bought",
    "Price_Sold",
    "Quantity_Sold",
    "Start_Date",
    "End_Date",
];

/// Columns of an upload batch, before a week has been assigned
pub const UPLOAD_COLUMNS: [&str; 7] = [
    "Product_Name",
    "Price_Bought",
    "Quantity_Bought",
    "Price_Sold",
    "Quantity_Sold",
    "Start_Date",
    "End_Date",
];

/// Columns every enhanced weekly table must carry
pub const ENHANCED_COLUMNS: [&str; 17] = [
    "Week",
    "Product_Name",
    "Price_Bought",
    "Quantity_Bought",
    "Price_Sold",
    "Quantity_Sold",
    "Start_Date",
    "End_Date",
    "Discount_Rate",
    "Promo_Flag",
    "Stockout_Flag",
    "Qty_Base",
    "Week_Index",
    "CAGR_Units_Sold",
    "Lag_Qty",
    "Lag_Price",
    "Price_Elasticity",
];

/// Wire format of the week bounds
pub const DATE_FORMAT: &str = "%d-%m-%Y";

mod week_date {
    use super::DATE_FORMAT;
    use chrono::NaiveDate;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// One product's sales for one week, as uploaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawWeeklyRecord {
    #[serde(rename = "Week")]
    pub week: u32,
    #[serde(rename = "Product_Name")]
    pub product_name: String,
    #[serde(rename = "Price_Bought")]
    pub price_bought: f64,
    #[serde(rename = "Quantity_Bought")]
    pub quantity_bought: f64,
    #[serde(rename = "Price_Sold")]
    pub price_sold: f64,
    #[serde(rename = "Quantity_Sold")]
    pub quantity_sold: f64,
    #[serde(rename = "Start_Date", with = "week_date")]
    pub start_date: NaiveDate,
    #[serde(rename = "End_Date", with = "week_date")]
    pub end_date: NaiveDate,
}

/// A raw row from an upload batch, which carries no week number yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadRow {
    #[serde(rename = "Product_Name")]
    pub product_name: String,
    #[serde(rename = "Price_Bought")]
    pub price_bought: f64,
    #[serde(rename = "Quantity_Bought")]
    pub quantity_bought: f64,
    #[serde(rename = "Price_Sold")]
    pub price_sold: f64,
    #[serde(rename = "Quantity_Sold")]
    pub quantity_sold: f64,
    #[serde(rename = "Start_Date", with = "week_date")]
    pub start_date: NaiveDate,
    #[serde(rename = "End_Date", with = "week_date")]
    pub end_date: NaiveDate,
}

impl UploadRow {
    /// Stamp the row with its assigned week
    pub fn into_raw(self, week: u32) -> RawWeeklyRecord {
        RawWeeklyRecord {
            week,
            product_name: self.product_name,
            price_bought: self.price_bought,
            quantity_bought: self.quantity_bought,
            price_sold: self.price_sold,
            quantity_sold: self.quantity_sold,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// A raw record plus every derived analytic field.
///
/// Derived records are never edited; the whole set is rebuilt from the raw
/// history instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancedWeeklyRecord {
    #[serde(rename = "Week")]
    pub week: u32,
    #[serde(rename = "Product_Name")]
    pub product_name: String,
    #[serde(rename = "Price_Bought")]
    pub price_bought: f64,
    #[serde(rename = "Quantity_Bought")]
    pub quantity_bought: f64,
    #[serde(rename = "Price_Sold")]
    pub price_sold: f64,
    #[serde(rename = "Quantity_Sold")]
    pub quantity_sold: f64,
    #[serde(rename = "Start_Date", with = "week_date")]
    pub start_date: NaiveDate,
    #[serde(rename = "End_Date", with = "week_date")]
    pub end_date: NaiveDate,
    #[serde(rename = "Discount_Rate")]
    pub discount_rate: f64,
    #[serde(rename = "Promo_Flag")]
    pub promo_flag: u8,
    #[serde(rename = "Stockout_Flag")]
    pub stockout_flag: u8,
    #[serde(rename = "Qty_Base")]
    pub qty_base: f64,
    #[serde(rename = "Week_Index")]
    pub week_index: u32,
    #[serde(rename = "CAGR_Units_Sold")]
    pub cagr_units_sold: Option<f64>,
    #[serde(rename = "Lag_Qty")]
    pub lag_qty: Option<f64>,
    #[serde(rename = "Lag_Price")]
    pub lag_price: Option<f64>,
    #[serde(rename = "Price_Elasticity")]
    pub price_elasticity: Option<f64>,
}

impl EnhancedWeeklyRecord {
    /// The raw columns this record was derived from
    pub fn raw(&self) -> RawWeeklyRecord {
        RawWeeklyRecord {
            week: self.week,
            product_name: self.product_name.clone(),
            price_bought: self.price_bought,
            quantity_bought: self.quantity_bought,
            price_sold: self.price_sold,
            quantity_sold: self.quantity_sold,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }

    /// Whether this is the first known week of its product
    pub fn is_first_week(&self) -> bool {
        self.week_index == 1
    }
}

/// Forecast for one product in the target week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    #[serde(rename = "Product_Name")]
    pub product_name: String,
    #[serde(rename = "Quantity_Bought")]
    pub quantity_bought: f64,
    #[serde(rename = "Predicted_Qty")]
    pub predicted_qty: i64,
}
