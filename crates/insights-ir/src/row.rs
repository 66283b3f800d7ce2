//! Transaction rows and the fields derived from them

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{DataType, FieldType, Record, Schema};

/// One cleaned line item of the sales export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRow {
    pub order_id: String,
    pub order_date: NaiveDate,
    pub ship_date: Option<NaiveDate>,
    pub ship_mode: String,
    pub customer_id: String,
    pub customer_name: String,
    pub segment: String,
    pub country: String,
    pub city: String,
    pub state: String,
    pub postal_code: u32,
    pub region: String,
    pub product_id: String,
    pub category: String,
    pub sub_category: String,
    pub product_name: String,
    pub sales: f64,
    pub quantity: u32,
    pub discount: f64,
    pub profit: f64,
    pub row_id: u64,
}

impl Record for TransactionRow {
    fn schema() -> Schema {
        use DataType::*;
        Schema::new(vec![
            FieldType::new("order_id", String),
            FieldType::new("order_date", Date),
            FieldType::nullable("ship_date", Date),
            FieldType::new("ship_mode", String),
            FieldType::new("customer_id", String),
            FieldType::new("customer_name", String),
            FieldType::new("segment", String),
            FieldType::new("country", String),
            FieldType::new("city", String),
            FieldType::new("state", String),
            FieldType::new("postal_code", UInt32),
            FieldType::new("region", String),
            FieldType::new("product_id", String),
            FieldType::new("category", String),
            FieldType::new("sub_category", String),
            FieldType::new("product_name", String),
            FieldType::new("sales", Float64),
            FieldType::new("quantity", UInt32),
            FieldType::new("discount", Float64),
            FieldType::new("profit", Float64),
            FieldType::new("row_id", UInt64),
        ])
    }
}

/// Discount level, a fixed partition of the discount fraction.
///
/// The first bin holds exactly zero. Every other bin excludes its lower
/// bound and includes its upper bound. Variant order is the natural order
/// used to break ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DiscountBin {
    #[serde(rename = "0%")]
    Zero,
    #[serde(rename = "0-10%")]
    UpTo10,
    #[serde(rename = "10-25%")]
    UpTo25,
    #[serde(rename = "25-50%")]
    UpTo50,
    #[serde(rename = "50%+")]
    Over50,
}

impl DiscountBin {
    pub const ALL: [DiscountBin; 5] = [
        DiscountBin::Zero,
        DiscountBin::UpTo10,
        DiscountBin::UpTo25,
        DiscountBin::UpTo50,
        DiscountBin::Over50,
    ];

    /// Bin for a discount fraction, or `None` when it lies outside [0, 1].
    pub fn from_fraction(discount: f64) -> Option<Self> {
        // NaN fails the range check too
        if !(0.0..=1.0).contains(&discount) {
            return None;
        }

        let bin = if discount == 0.0 {
            DiscountBin::Zero
        } else if discount <= 0.10 {
            DiscountBin::UpTo10
        } else if discount <= 0.25 {
            DiscountBin::UpTo25
        } else if discount <= 0.50 {
            DiscountBin::UpTo50
        } else {
            DiscountBin::Over50
        };
        Some(bin)
    }

    pub fn label(&self) -> &'static str {
        match self {
            DiscountBin::Zero => "0%",
            DiscountBin::UpTo10 => "0-10%",
            DiscountBin::UpTo25 => "10-25%",
            DiscountBin::UpTo50 => "25-50%",
            DiscountBin::Over50 => "50%+",
        }
    }
}

impl fmt::Display for DiscountBin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A transaction row with its calendar fields and discount bin.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRow {
    pub row: TransactionRow,
    pub year: i32,
    /// 1-12
    pub month: u32,
    /// 1-4
    pub quarter: u32,
    pub discount_bin: Option<DiscountBin>,
}
