//! Period-over-period growth and the growth opportunity tables

use insights_ir::{DerivedRow, RegionYearGrowth, RepeatPurchase};
use std::collections::BTreeMap;

use crate::aggregate::{cmp_desc_undefined_last, region_year_sales};

#[derive(Debug, Clone, PartialEq)]
pub struct GrowthPoint<K> {
    pub key: K,
    pub period: i32,
    pub value: f64,
    /// Percent change from the previous period of the same key
    pub growth: Option<f64>,
}

/// Percent change from `previous` to `current`, undefined from zero
pub fn pct_change(previous: f64, current: f64) -> Option<f64> {
    if previous == 0.0 {
        None
    } else {
        Some((current - previous) / previous * 100.0)
    }
}

/// Growth of each `(key, period, value)` point against the previous period
/// of the same key. Series are split by key before differencing, so one
/// key's first period never compares against another key's last.
///
/// Output is ordered by key, then period.
pub fn growth_by_group<K: Ord + Clone>(points: &[(K, i32, f64)]) -> Vec<GrowthPoint<K>> {
    let mut series: BTreeMap<&K, Vec<(i32, f64)>> = BTreeMap::new();
    for (key, period, value) in points {
        series.entry(key).or_default().push((*period, *value));
    }

    let mut out = Vec::with_capacity(points.len());
    for (key, mut values) in series {
        values.sort_by_key(|(period, _)| *period);

        let mut previous = None;
        for (period, value) in values {
            out.push(GrowthPoint {
                key: key.clone(),
                period,
                value,
                growth: previous.and_then(|prev| pct_change(prev, value)),
            });
            previous = Some(value);
        }
    }
    out
}

/// Yearly sales per region with year-over-year growth
pub fn region_year_growth(rows: &[DerivedRow]) -> Vec<RegionYearGrowth> {
    growth_by_group(&region_year_sales(rows))
        .into_iter()
        .map(|point| RegionYearGrowth {
            region: point.key,
            year: point.period,
            sales: point.value,
            sales_growth: point.growth,
        })
        .collect()
}

/// Regions in the latest year, fastest growing first
pub fn growth_regions(table: &[RegionYearGrowth]) -> Vec<RegionYearGrowth> {
    let Some(latest) = table.iter().map(|r| r.year).max() else {
        return Vec::new();
    };

    let mut regions: Vec<RegionYearGrowth> =
        table.iter().filter(|r| r.year == latest).cloned().collect();
    regions.sort_by(|a, b| {
        cmp_desc_undefined_last(a.sales_growth, b.sales_growth).then_with(|| a.region.cmp(&b.region))
    });
    regions
}

/// Customer months in the latest year, most orders first
pub fn growth_customers(table: &[RepeatPurchase]) -> Vec<RepeatPurchase> {
    let Some(latest) = table.iter().map(|r| r.year).max() else {
        return Vec::new();
    };

    let mut customers: Vec<RepeatPurchase> =
        table.iter().filter(|r| r.year == latest).cloned().collect();
    customers.sort_by(|a, b| {
        b.num_orders
            .cmp(&a.num_orders)
            .then_with(|| a.customer_id.cmp(&b.customer_id))
            .then_with(|| a.customer_name.cmp(&b.customer_name))
            .then_with(|| a.month.cmp(&b.month))
    });
    customers
}
