//! Calendar fields and discount bins
//!
//! Calendar fields always come from the order date, never the ship date.

use chrono::Datelike;
use insights_ir::{DerivedRow, DiscountBin, TransactionRow};

pub fn derive_row(row: &TransactionRow) -> DerivedRow {
    let month = row.order_date.month();
    DerivedRow {
        year: row.order_date.year(),
        month,
        quarter: (month - 1) / 3 + 1,
        discount_bin: DiscountBin::from_fraction(row.discount),
        row: row.clone(),
    }
}

pub fn derive(rows: &[TransactionRow]) -> Vec<DerivedRow> {
    rows.iter().map(derive_row).collect()
}
