//! Record types of the aggregate tables
//!
//! Each aggregate table is a `Vec` of one of these records. Field order is
//! the column order of the persisted artifact.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::row::DiscountBin;
use crate::types::{DataType, FieldType, Record, Schema};

macro_rules! impl_record {
    ($ty:ty { $($name:literal => $ctor:ident($dt:ident)),* $(,)? }) => {
        impl Record for $ty {
            fn schema() -> Schema {
                Schema::new(vec![$(FieldType::$ctor($name, DataType::$dt)),*])
            }
        }
    };
}

/// Revenue for a named scope, optionally bounded by an inclusive date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueSummary {
    pub scope: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub sales: f64,
}

impl_record!(RevenueSummary {
    "scope" => new(String),
    "start_date" => nullable(Date),
    "end_date" => nullable(Date),
    "sales" => new(Float64),
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearSales {
    pub year: i32,
    pub sales: f64,
}

impl_record!(YearSales {
    "year" => new(Int32),
    "sales" => new(Float64),
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedProduct {
    pub rank: u32,
    pub product_name: String,
    pub sales: f64,
}

impl_record!(RankedProduct {
    "rank" => new(UInt32),
    "product_name" => new(String),
    "sales" => new(Float64),
});

/// Category ranked by summed profit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCategory {
    pub rank: u32,
    pub category: String,
    pub profit: f64,
}

impl_record!(RankedCategory {
    "rank" => new(UInt32),
    "category" => new(String),
    "profit" => new(Float64),
});

/// Category ranked by summed sales
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCategorySales {
    pub rank: u32,
    pub category: String,
    pub sales: f64,
}

impl_record!(RankedCategorySales {
    "rank" => new(UInt32),
    "category" => new(String),
    "sales" => new(Float64),
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCustomer {
    pub rank: u32,
    pub customer_id: String,
    pub customer_name: String,
    pub sales: f64,
}

impl_record!(RankedCustomer {
    "rank" => new(UInt32),
    "customer_id" => new(String),
    "customer_name" => new(String),
    "sales" => new(Float64),
});

/// Distinct orders placed by one customer in one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeatPurchase {
    pub customer_id: String,
    pub customer_name: String,
    pub year: i32,
    pub month: u32,
    pub num_orders: u64,
}

impl_record!(RepeatPurchase {
    "customer_id" => new(String),
    "customer_name" => new(String),
    "year" => new(Int32),
    "month" => new(UInt32),
    "num_orders" => new(UInt64),
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSales {
    pub rank: u32,
    pub region: String,
    pub sales: f64,
}

impl_record!(RegionSales {
    "rank" => new(UInt32),
    "region" => new(String),
    "sales" => new(Float64),
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySales {
    pub rank: u32,
    pub city: String,
    pub sales: f64,
}

impl_record!(CitySales {
    "rank" => new(UInt32),
    "city" => new(String),
    "sales" => new(Float64),
});

/// Yearly regional revenue with year-over-year growth in percent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionYearGrowth {
    pub region: String,
    pub year: i32,
    pub sales: f64,
    pub sales_growth: Option<f64>,
}

impl_record!(RegionYearGrowth {
    "region" => new(String),
    "year" => new(Int32),
    "sales" => new(Float64),
    "sales_growth" => nullable(Float64),
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionProductSales {
    pub region: String,
    pub product_name: String,
    pub sales: f64,
}

impl_record!(RegionProductSales {
    "region" => new(String),
    "product_name" => new(String),
    "sales" => new(Float64),
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionMargin {
    pub region: String,
    pub sales: f64,
    pub profit: f64,
    pub profit_margin_pct: Option<f64>,
}

impl_record!(RegionMargin {
    "region" => new(String),
    "sales" => new(Float64),
    "profit" => new(Float64),
    "profit_margin_pct" => nullable(Float64),
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMargin {
    pub product_name: String,
    pub sales: f64,
    pub profit: f64,
    pub profit_margin_pct: Option<f64>,
}

impl_record!(ProductMargin {
    "product_name" => new(String),
    "sales" => new(Float64),
    "profit" => new(Float64),
    "profit_margin_pct" => nullable(Float64),
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMargin {
    pub category: String,
    pub sales: f64,
    pub profit: f64,
    pub profit_margin_pct: Option<f64>,
}

impl_record!(CategoryMargin {
    "category" => new(String),
    "sales" => new(Float64),
    "profit" => new(Float64),
    "profit_margin_pct" => nullable(Float64),
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountSales {
    pub discount_bin: DiscountBin,
    pub sales: f64,
}

impl_record!(DiscountSales {
    "discount_bin" => new(String),
    "sales" => new(Float64),
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentDiscountSales {
    pub segment: String,
    pub discount_bin: DiscountBin,
    pub sales: f64,
}

impl_record!(SegmentDiscountSales {
    "segment" => new(String),
    "discount_bin" => new(String),
    "sales" => new(Float64),
});

/// Two distinct products bought in the same order, with the number of
/// orders containing both. `product_a` is always the lexically smaller name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossSellPair {
    #[serde(rename = "Product_A")]
    pub product_a: String,
    #[serde(rename = "Product_B")]
    pub product_b: String,
    #[serde(rename = "Co_Purchase_Count")]
    pub co_purchase_count: u64,
}

impl_record!(CrossSellPair {
    "Product_A" => new(String),
    "Product_B" => new(String),
    "Co_Purchase_Count" => new(UInt64),
});
