//! Aggregation engine
//!
//! Each query is an independent grouping over the derived rows and returns a
//! finished aggregate table. Groups are collected in `BTreeMap`s and summed
//! in input row order, so every table is reproducible bit for bit.
//!
//! Ordering rules shared by all ranked tables:
//! - descending sorts break ties by the grouping key in ascending order
//! - undefined measures (`None`) sort last in either direction
//! - `rank` is the 1-based position after sorting

use chrono::NaiveDate;
use insights_ir::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Inclusive range of order dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }
}

pub const DEFAULT_BEST_N: usize = 1;
pub const DEFAULT_LISTING_N: usize = 10;
pub const DEFAULT_REGION_TOP_N: usize = 5;
pub const DEFAULT_LOW_MARGIN_THRESHOLD_PCT: f64 = 5.0;

// ============================================================================
// Grouping and ordering helpers
// ============================================================================

fn sum_by<K, F, V>(rows: &[DerivedRow], key: F, value: V) -> BTreeMap<K, f64>
where
    K: Ord,
    F: Fn(&DerivedRow) -> K,
    V: Fn(&DerivedRow) -> f64,
{
    let mut sums = BTreeMap::new();
    for row in rows {
        *sums.entry(key(row)).or_insert(0.0) += value(row);
    }
    sums
}

/// Summed sales and profit per key
fn sales_and_profit_by<K, F>(rows: &[DerivedRow], key: F) -> BTreeMap<K, (f64, f64)>
where
    K: Ord,
    F: Fn(&DerivedRow) -> K,
{
    let mut sums: BTreeMap<K, (f64, f64)> = BTreeMap::new();
    for row in rows {
        let entry = sums.entry(key(row)).or_insert((0.0, 0.0));
        entry.0 += row.row.sales;
        entry.1 += row.row.profit;
    }
    sums
}

/// Value descending, key ascending on ties
fn sort_desc<K: Ord>(sums: BTreeMap<K, f64>) -> Vec<(K, f64)> {
    let mut entries: Vec<(K, f64)> = sums.into_iter().collect();
    entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries
}

/// Descending order for optional measures, `None` last
pub fn cmp_desc_undefined_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Ascending order for optional measures, `None` last
pub fn cmp_asc_undefined_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn rank(position: usize) -> u32 {
    u32::try_from(position + 1).unwrap_or(u32::MAX)
}

fn take(limit: Option<usize>) -> usize {
    limit.unwrap_or(usize::MAX)
}

// ============================================================================
// Revenue
// ============================================================================

/// Summed sales, optionally restricted to an inclusive order date range
pub fn total_revenue(rows: &[DerivedRow], range: Option<DateRange>) -> f64 {
    rows.iter()
        .filter(|r| range.map_or(true, |range| range.contains(r.row.order_date)))
        .map(|r| r.row.sales)
        .sum()
}

/// All-time revenue, plus revenue inside `window` when one is given
pub fn revenue_summary(rows: &[DerivedRow], window: Option<DateRange>) -> Vec<RevenueSummary> {
    let mut summary = vec![RevenueSummary {
        scope: "all_time".to_string(),
        start_date: None,
        end_date: None,
        sales: total_revenue(rows, None),
    }];
    if let Some(window) = window {
        summary.push(RevenueSummary {
            scope: "window".to_string(),
            start_date: Some(window.start),
            end_date: Some(window.end),
            sales: total_revenue(rows, Some(window)),
        });
    }
    summary
}

pub fn revenue_by_year(rows: &[DerivedRow]) -> Vec<YearSales> {
    sum_by(rows, |r| r.year, |r| r.row.sales)
        .into_iter()
        .map(|(year, sales)| YearSales { year, sales })
        .collect()
}

// ============================================================================
// Products and categories
// ============================================================================

pub fn top_products_by_sales(rows: &[DerivedRow], n: usize) -> Vec<RankedProduct> {
    sort_desc(sum_by(rows, |r| r.row.product_name.clone(), |r| r.row.sales))
        .into_iter()
        .take(n)
        .enumerate()
        .map(|(i, (product_name, sales))| RankedProduct {
            rank: rank(i),
            product_name,
            sales,
        })
        .collect()
}

pub fn top_categories_by_profit(rows: &[DerivedRow], n: usize) -> Vec<RankedCategory> {
    sort_desc(sum_by(rows, |r| r.row.category.clone(), |r| r.row.profit))
        .into_iter()
        .take(n)
        .enumerate()
        .map(|(i, (category, profit))| RankedCategory {
            rank: rank(i),
            category,
            profit,
        })
        .collect()
}

pub fn top_categories_by_sales(rows: &[DerivedRow], n: usize) -> Vec<RankedCategorySales> {
    sort_desc(sum_by(rows, |r| r.row.category.clone(), |r| r.row.sales))
        .into_iter()
        .take(n)
        .enumerate()
        .map(|(i, (category, sales))| RankedCategorySales {
            rank: rank(i),
            category,
            sales,
        })
        .collect()
}

// ============================================================================
// Customers
// ============================================================================

/// Lifetime revenue per customer, best first. `None` ranks every customer.
pub fn top_customers(rows: &[DerivedRow], limit: Option<usize>) -> Vec<RankedCustomer> {
    let sums = sum_by(
        rows,
        |r| (r.row.customer_id.clone(), r.row.customer_name.clone()),
        |r| r.row.sales,
    );
    sort_desc(sums)
        .into_iter()
        .take(take(limit))
        .enumerate()
        .map(|(i, ((customer_id, customer_name), sales))| RankedCustomer {
            rank: rank(i),
            customer_id,
            customer_name,
            sales,
        })
        .collect()
}

/// Distinct orders per customer per calendar month. One order spans several
/// line items, so rows are never counted directly.
pub fn repeat_purchases(rows: &[DerivedRow]) -> Vec<RepeatPurchase> {
    let mut orders: BTreeMap<(&str, &str, i32, u32), BTreeSet<&str>> = BTreeMap::new();
    for r in rows {
        orders
            .entry((r.row.customer_id.as_str(), r.row.customer_name.as_str(), r.year, r.month))
            .or_default()
            .insert(r.row.order_id.as_str());
    }

    orders
        .into_iter()
        .map(|((customer_id, customer_name, year, month), ids)| RepeatPurchase {
            customer_id: customer_id.to_string(),
            customer_name: customer_name.to_string(),
            year,
            month,
            num_orders: ids.len() as u64,
        })
        .collect()
}

// ============================================================================
// Regions and cities
// ============================================================================

pub fn sales_by_region(rows: &[DerivedRow]) -> Vec<RegionSales> {
    sort_desc(sum_by(rows, |r| r.row.region.clone(), |r| r.row.sales))
        .into_iter()
        .enumerate()
        .map(|(i, (region, sales))| RegionSales {
            rank: rank(i),
            region,
            sales,
        })
        .collect()
}

pub fn sales_by_city(rows: &[DerivedRow]) -> Vec<CitySales> {
    sort_desc(sum_by(rows, |r| r.row.city.clone(), |r| r.row.sales))
        .into_iter()
        .enumerate()
        .map(|(i, (city, sales))| CitySales {
            rank: rank(i),
            city,
            sales,
        })
        .collect()
}

/// `(region, year, sales)` in region then year order
pub fn region_year_sales(rows: &[DerivedRow]) -> Vec<(String, i32, f64)> {
    sum_by(rows, |r| (r.row.region.clone(), r.year), |r| r.row.sales)
        .into_iter()
        .map(|((region, year), sales)| (region, year, sales))
        .collect()
}

/// Sales per region and product: region ascending, then sales descending,
/// then product ascending
pub fn region_product_sales(rows: &[DerivedRow]) -> Vec<RegionProductSales> {
    let sums = sum_by(
        rows,
        |r| (r.row.region.clone(), r.row.product_name.clone()),
        |r| r.row.sales,
    );
    let mut table: Vec<RegionProductSales> = sums
        .into_iter()
        .map(|((region, product_name), sales)| RegionProductSales {
            region,
            product_name,
            sales,
        })
        .collect();
    table.sort_by(|a, b| {
        a.region
            .cmp(&b.region)
            .then_with(|| b.sales.total_cmp(&a.sales))
            .then_with(|| a.product_name.cmp(&b.product_name))
    });
    table
}

/// First `n` rows of each region, keeping the table's order
pub fn top_per_region(table: &[RegionProductSales], n: usize) -> Vec<RegionProductSales> {
    let mut taken: BTreeMap<&str, usize> = BTreeMap::new();
    table
        .iter()
        .filter(|row| {
            let count = taken.entry(row.region.as_str()).or_insert(0);
            *count += 1;
            *count <= n
        })
        .cloned()
        .collect()
}

// ============================================================================
// Profitability
// ============================================================================

/// Profit as a percentage of sales, undefined when there were no sales
pub fn margin_pct(profit: f64, sales: f64) -> Option<f64> {
    if sales == 0.0 {
        None
    } else {
        Some(profit / sales * 100.0)
    }
}

pub fn profit_margin_by_region(rows: &[DerivedRow]) -> Vec<RegionMargin> {
    sales_and_profit_by(rows, |r| r.row.region.clone())
        .into_iter()
        .map(|(region, (sales, profit))| RegionMargin {
            region,
            sales,
            profit,
            profit_margin_pct: margin_pct(profit, sales),
        })
        .collect()
}

pub fn profit_margin_by_product(rows: &[DerivedRow]) -> Vec<ProductMargin> {
    sales_and_profit_by(rows, |r| r.row.product_name.clone())
        .into_iter()
        .map(|(product_name, (sales, profit))| ProductMargin {
            product_name,
            sales,
            profit,
            profit_margin_pct: margin_pct(profit, sales),
        })
        .collect()
}

pub fn profit_margin_by_category(rows: &[DerivedRow]) -> Vec<CategoryMargin> {
    sales_and_profit_by(rows, |r| r.row.category.clone())
        .into_iter()
        .map(|(category, (sales, profit))| CategoryMargin {
            category,
            sales,
            profit,
            profit_margin_pct: margin_pct(profit, sales),
        })
        .collect()
}

/// Products whose margin is below `threshold_pct`, worst first. Products
/// with an undefined margin are not low-margin and are left out.
pub fn low_margin_products(margins: &[ProductMargin], threshold_pct: f64) -> Vec<ProductMargin> {
    let mut low: Vec<ProductMargin> = margins
        .iter()
        .filter(|m| m.profit_margin_pct.is_some_and(|pct| pct < threshold_pct))
        .cloned()
        .collect();
    low.sort_by(|a, b| {
        cmp_asc_undefined_last(a.profit_margin_pct, b.profit_margin_pct)
            .then_with(|| a.product_name.cmp(&b.product_name))
    });
    low
}

// ============================================================================
// Promotions
// ============================================================================

/// Sales per discount bin, best first. Rows without a bin are excluded.
pub fn sales_by_discount_bin(rows: &[DerivedRow]) -> Vec<DiscountSales> {
    let mut sums: BTreeMap<DiscountBin, f64> = BTreeMap::new();
    for r in rows {
        if let Some(bin) = r.discount_bin {
            *sums.entry(bin).or_insert(0.0) += r.row.sales;
        }
    }
    sort_desc(sums)
        .into_iter()
        .map(|(discount_bin, sales)| DiscountSales { discount_bin, sales })
        .collect()
}

/// Sales per segment and discount bin, in segment then bin order
pub fn sales_by_segment_discount(rows: &[DerivedRow]) -> Vec<SegmentDiscountSales> {
    let mut sums: BTreeMap<(&str, DiscountBin), f64> = BTreeMap::new();
    for r in rows {
        if let Some(bin) = r.discount_bin {
            *sums.entry((r.row.segment.as_str(), bin)).or_insert(0.0) += r.row.sales;
        }
    }
    sums.into_iter()
        .map(|((segment, discount_bin), sales)| SegmentDiscountSales {
            segment: segment.to_string(),
            discount_bin,
            sales,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::derive;

    struct Line {
        order: &'static str,
        date: (i32, u32, u32),
        customer: &'static str,
        region: &'static str,
        city: &'static str,
        product: &'static str,
        category: &'static str,
        segment: &'static str,
        sales: f64,
        profit: f64,
        discount: f64,
    }

    impl Default for Line {
        fn default() -> Self {
            Self {
                order: "O-1",
                date: (2017, 1, 1),
                customer: "Alice",
                region: "West",
                city: "Seattle",
                product: "Chair",
                category: "Chairs",
                segment: "Consumer",
                sales: 0.0,
                profit: 0.0,
                discount: 0.0,
            }
        }
    }

    fn rows(lines: Vec<Line>) -> Vec<DerivedRow> {
        let rows: Vec<TransactionRow> = lines
            .into_iter()
            .enumerate()
            .map(|(i, l)| TransactionRow {
                order_id: l.order.into(),
                order_date: NaiveDate::from_ymd_opt(l.date.0, l.date.1, l.date.2).unwrap(),
                ship_date: None,
                ship_mode: "Standard Class".into(),
                customer_id: format!("C-{}", l.customer),
                customer_name: l.customer.into(),
                segment: l.segment.into(),
                country: "United States".into(),
                city: l.city.into(),
                state: "Washington".into(),
                postal_code: 98101,
                region: l.region.into(),
                product_id: format!("P-{}", l.product),
                category: l.category.into(),
                sub_category: l.category.into(),
                product_name: l.product.into(),
                sales: l.sales,
                quantity: 1,
                discount: l.discount,
                profit: l.profit,
                row_id: i as u64 + 1,
            })
            .collect();
        derive(&rows)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_total_revenue_with_inclusive_range() {
        let rows = rows(vec![
            Line { date: (2016, 12, 31), sales: 1.0, ..Default::default() },
            Line { date: (2017, 1, 1), sales: 10.0, ..Default::default() },
            Line { date: (2017, 12, 31), sales: 100.0, ..Default::default() },
            Line { date: (2018, 1, 1), sales: 1000.0, ..Default::default() },
        ]);

        assert_eq!(total_revenue(&rows, None), 1111.0);
        let window = DateRange::new(date(2017, 1, 1), date(2017, 12, 31));
        assert_eq!(total_revenue(&rows, Some(window)), 110.0);

        let summary = revenue_summary(&rows, Some(window));
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].scope, "all_time");
        assert_eq!(summary[1].start_date, Some(date(2017, 1, 1)));
        assert_eq!(summary[1].sales, 110.0);
    }

    #[test]
    fn test_revenue_by_year() {
        let rows = rows(vec![
            Line { date: (2017, 3, 1), sales: 2.0, ..Default::default() },
            Line { date: (2016, 3, 1), sales: 1.0, ..Default::default() },
            Line { date: (2017, 9, 1), sales: 3.0, ..Default::default() },
        ]);
        assert_eq!(
            revenue_by_year(&rows),
            vec![YearSales { year: 2016, sales: 1.0 }, YearSales { year: 2017, sales: 5.0 }]
        );
    }

    #[test]
    fn test_top_products_tie_broken_by_name() {
        let rows = rows(vec![
            Line { product: "Table", sales: 50.0, ..Default::default() },
            Line { product: "Lamp", sales: 20.0, ..Default::default() },
            Line { product: "Chair", sales: 30.0, ..Default::default() },
            Line { product: "Chair", sales: 20.0, ..Default::default() },
        ]);

        let top = top_products_by_sales(&rows, 10);
        let names: Vec<&str> = top.iter().map(|p| p.product_name.as_str()).collect();
        assert_eq!(names, vec!["Chair", "Table", "Lamp"]);
        assert_eq!(top.iter().map(|p| p.rank).collect::<Vec<_>>(), vec![1, 2, 3]);

        let best = top_products_by_sales(&rows, 1);
        assert_eq!(best.len(), 1);
        assert_eq!(best[0].product_name, "Chair");
    }

    #[test]
    fn test_top_categories() {
        let rows = rows(vec![
            Line { category: "Tables", sales: 500.0, profit: -80.0, ..Default::default() },
            Line { category: "Chairs", sales: 300.0, profit: 40.0, ..Default::default() },
            Line { category: "Bookcases", sales: 100.0, profit: 40.0, ..Default::default() },
        ]);

        let by_profit = top_categories_by_profit(&rows, 10);
        assert_eq!(by_profit[0].category, "Bookcases");
        assert_eq!(by_profit[1].category, "Chairs");
        assert_eq!(by_profit[2].profit, -80.0);

        let by_sales = top_categories_by_sales(&rows, 1);
        assert_eq!(by_sales[0].category, "Tables");
    }

    #[test]
    fn test_top_customers_limit() {
        let rows = rows(vec![
            Line { customer: "Bob", sales: 5.0, ..Default::default() },
            Line { customer: "Alice", sales: 7.0, ..Default::default() },
            Line { customer: "Carol", sales: 1.0, ..Default::default() },
        ]);

        let all = top_customers(&rows, None);
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].customer_name, "Alice");
        assert_eq!(all[0].customer_id, "C-Alice");
        assert_eq!(top_customers(&rows, Some(2)).len(), 2);
    }

    #[test]
    fn test_repeat_purchases_count_distinct_orders() {
        let rows = rows(vec![
            Line { order: "O-1", date: (2017, 2, 1), product: "Chair", ..Default::default() },
            Line { order: "O-1", date: (2017, 2, 1), product: "Table", ..Default::default() },
            Line { order: "O-2", date: (2017, 2, 20), ..Default::default() },
            Line { order: "O-3", date: (2017, 3, 2), ..Default::default() },
        ]);

        let repeat = repeat_purchases(&rows);
        assert_eq!(repeat.len(), 2);
        assert_eq!((repeat[0].year, repeat[0].month, repeat[0].num_orders), (2017, 2, 2));
        assert_eq!((repeat[1].month, repeat[1].num_orders), (3, 1));
    }

    #[test]
    fn test_region_sales_add_up_to_total() {
        let rows = rows(vec![
            Line { region: "West", sales: 10.25, ..Default::default() },
            Line { region: "East", sales: 3.5, ..Default::default() },
            Line { region: "South", sales: 7.75, ..Default::default() },
            Line { region: "East", sales: 8.5, ..Default::default() },
        ]);

        let regions = sales_by_region(&rows);
        let sum: f64 = regions.iter().map(|r| r.sales).sum();
        assert_eq!(sum, total_revenue(&rows, None));
        assert_eq!(regions[0].region, "East");
        assert_eq!(regions[0].sales, 12.0);
        assert_eq!(regions[2].region, "South");
    }

    #[test]
    fn test_city_sales_tie_break() {
        let rows = rows(vec![
            Line { city: "Seattle", sales: 5.0, ..Default::default() },
            Line { city: "Austin", sales: 5.0, ..Default::default() },
        ]);
        let cities = sales_by_city(&rows);
        assert_eq!(cities[0].city, "Austin");
        assert_eq!(cities[1].rank, 2);
    }

    #[test]
    fn test_region_product_sales_and_top_slice() {
        let mut lines = Vec::new();
        for (product, sales) in [("A", 1.0), ("B", 6.0), ("C", 3.0), ("D", 5.0), ("E", 4.0), ("F", 2.0)] {
            lines.push(Line { region: "West", product, sales, ..Default::default() });
        }
        lines.push(Line { region: "East", product: "Z", sales: 1.0, ..Default::default() });
        let rows = rows(lines);

        let table = region_product_sales(&rows);
        assert_eq!(table[0].region, "East");
        let west: Vec<&str> = table[1..].iter().map(|r| r.product_name.as_str()).collect();
        assert_eq!(west, vec!["B", "D", "E", "C", "F", "A"]);

        let top = top_per_region(&table, 5);
        assert_eq!(top.len(), 6);
        assert!(top.iter().all(|r| r.product_name != "A"));
    }

    #[test]
    fn test_margin_pct() {
        assert_eq!(margin_pct(25.0, 100.0), Some(25.0));
        assert_eq!(margin_pct(-10.0, 50.0), Some(-20.0));
        assert_eq!(margin_pct(0.0, 0.0), None);
        assert_eq!(margin_pct(5.0, 0.0), None);
    }

    #[test]
    fn test_zero_sales_margin_is_undefined() {
        let rows = rows(vec![
            Line { product: "Freebie", sales: 0.0, profit: 0.0, ..Default::default() },
            Line { product: "Chair", sales: 100.0, profit: 2.0, ..Default::default() },
        ]);

        let margins = profit_margin_by_product(&rows);
        let freebie = margins.iter().find(|m| m.product_name == "Freebie").unwrap();
        assert_eq!(freebie.profit_margin_pct, None);

        let low = low_margin_products(&margins, DEFAULT_LOW_MARGIN_THRESHOLD_PCT);
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].product_name, "Chair");
    }

    #[test]
    fn test_low_margin_worst_first() {
        let rows = rows(vec![
            Line { product: "A", sales: 100.0, profit: 4.0, ..Default::default() },
            Line { product: "B", sales: 100.0, profit: -30.0, ..Default::default() },
            Line { product: "C", sales: 100.0, profit: 5.0, ..Default::default() },
            Line { product: "D", sales: 100.0, profit: 50.0, ..Default::default() },
        ]);

        let low = low_margin_products(&profit_margin_by_product(&rows), 5.0);
        let names: Vec<&str> = low.iter().map(|m| m.product_name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_region_and_category_margins() {
        let rows = rows(vec![
            Line { region: "West", category: "Chairs", sales: 200.0, profit: 50.0, ..Default::default() },
            Line { region: "East", category: "Chairs", sales: 200.0, profit: -10.0, ..Default::default() },
        ]);

        let regions = profit_margin_by_region(&rows);
        assert_eq!(regions[0].region, "East");
        assert_eq!(regions[0].profit_margin_pct, Some(-5.0));

        let categories = profit_margin_by_category(&rows);
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].profit_margin_pct, Some(10.0));
    }

    #[test]
    fn test_discount_bin_sales() {
        let rows = rows(vec![
            Line { discount: 0.0, sales: 10.0, segment: "Consumer", ..Default::default() },
            Line { discount: 0.2, sales: 30.0, segment: "Consumer", ..Default::default() },
            Line { discount: 0.25, sales: 5.0, segment: "Corporate", ..Default::default() },
            Line { discount: 0.7, sales: 10.0, segment: "Consumer", ..Default::default() },
            Line { discount: 1.5, sales: 999.0, segment: "Consumer", ..Default::default() },
        ]);

        let bins = sales_by_discount_bin(&rows);
        assert_eq!(
            bins,
            vec![
                DiscountSales { discount_bin: DiscountBin::UpTo25, sales: 35.0 },
                DiscountSales { discount_bin: DiscountBin::Zero, sales: 10.0 },
                DiscountSales { discount_bin: DiscountBin::Over50, sales: 10.0 },
            ]
        );

        let segments = sales_by_segment_discount(&rows);
        let keys: Vec<(&str, DiscountBin)> = segments
            .iter()
            .map(|s| (s.segment.as_str(), s.discount_bin))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("Consumer", DiscountBin::Zero),
                ("Consumer", DiscountBin::UpTo25),
                ("Consumer", DiscountBin::Over50),
                ("Corporate", DiscountBin::UpTo25),
            ]
        );
    }

    #[test]
    fn test_undefined_sorts_last_both_directions() {
        let mut values = vec![None, Some(1.0), Some(-2.0)];
        values.sort_by(|a, b| cmp_desc_undefined_last(*a, *b));
        assert_eq!(values, vec![Some(1.0), Some(-2.0), None]);

        values.sort_by(|a, b| cmp_asc_undefined_last(*a, *b));
        assert_eq!(values, vec![Some(-2.0), Some(1.0), None]);
    }
}
