//! The three batch phases
//!
//! - clean: raw export -> `cleaned_sales`
//! - analyze: `cleaned_sales` -> every base aggregate
//! - insights: re-reads `cleaned_sales`, `region_year_sales_growth` and
//!   `repeat_purchases` -> the opportunity tables
//!
//! Phases talk to each other only through the artifact store. Each phase
//! first invalidates its own outputs and every artifact downstream of them,
//! so neither a phase that fails halfway nor a rerun of an earlier phase
//! leaves artifacts a later phase could mistake for valid ones. A missing
//! input fails that phase with `StoreError::NotFound`.

use chrono::NaiveDate;
use insights_ir::*;
use insights_registry::{names, Phase};
use insights_store::{ArtifactStore, StorageBackend};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, info_span};

use crate::affinity::cross_sell;
use crate::aggregate::{self, DateRange};
use crate::derive::derive;
use crate::growth::{growth_customers, growth_regions, region_year_growth};
use crate::normalize::{normalize, NormalizeReport, Normalized};
use crate::source::RawTable;
use crate::PipelineError;

/// Tunables of the analyze phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Window of the windowed revenue figure, inclusive on both ends
    pub revenue_window: Option<DateRange>,
    /// Rows kept by the "best" tables (top product, top category)
    pub best_n: usize,
    /// Rows kept by listing tables (top products)
    pub listing_n: usize,
    /// Products kept per region in `region_top_products`
    pub region_top_n: usize,
    pub low_margin_threshold_pct: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            revenue_window: default_revenue_window(),
            best_n: aggregate::DEFAULT_BEST_N,
            listing_n: aggregate::DEFAULT_LISTING_N,
            region_top_n: aggregate::DEFAULT_REGION_TOP_N,
            low_margin_threshold_pct: aggregate::DEFAULT_LOW_MARGIN_THRESHOLD_PCT,
        }
    }
}

fn default_revenue_window() -> Option<DateRange> {
    NaiveDate::from_ymd_opt(2017, 1, 1)
        .zip(NaiveDate::from_ymd_opt(2017, 12, 31))
        .map(|(start, end)| DateRange::new(start, end))
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.best_n == 0 {
            return Err(PipelineError::InvalidConfig("best_n must be at least 1".into()));
        }
        if self.listing_n == 0 {
            return Err(PipelineError::InvalidConfig("listing_n must be at least 1".into()));
        }
        if !self.low_margin_threshold_pct.is_finite() {
            return Err(PipelineError::InvalidConfig(
                "low_margin_threshold_pct must be finite".into(),
            ));
        }
        if let Some(window) = &self.revenue_window {
            if !window.is_valid() {
                return Err(PipelineError::InvalidConfig(format!(
                    "revenue_window starts after it ends ({} > {})",
                    window.start, window.end
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CleanOutcome {
    pub rows: Vec<TransactionRow>,
    pub report: NormalizeReport,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub input_rows: usize,
    pub total_revenue: f64,
    /// Rows written per artifact
    pub artifacts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsightsOutcome {
    pub latest_region_year: Option<i32>,
    pub artifacts: BTreeMap<String, usize>,
}

/// Drop every artifact `phase` produces, and everything computed from them,
/// before it starts writing
fn invalidate_outputs<B: StorageBackend>(
    store: &ArtifactStore<B>,
    phase: Phase,
) -> Result<(), PipelineError> {
    let registry = store.registry();
    let outputs: Vec<&str> = registry
        .produced_by(phase)
        .into_iter()
        .map(|spec| spec.name.as_str())
        .collect();
    let downstream = registry.dependents_of(&outputs);
    debug!(outputs = outputs.len(), downstream = downstream.len(), "Invalidating artifacts");

    store.invalidate(outputs.into_iter().chain(downstream))?;
    Ok(())
}

/// Collects row counts while saving one phase's artifacts
struct PhaseWriter<'s, B: StorageBackend> {
    store: &'s ArtifactStore<B>,
    written: BTreeMap<String, usize>,
}

impl<'s, B: StorageBackend> PhaseWriter<'s, B> {
    fn new(store: &'s ArtifactStore<B>) -> Self {
        Self {
            store,
            written: BTreeMap::new(),
        }
    }

    fn save<T: Serialize + Record>(&mut self, name: &str, rows: &[T]) -> Result<(), PipelineError> {
        let entry = self.store.save(name, rows)?;
        self.written.insert(name.to_string(), entry.rows);
        Ok(())
    }

    fn finish(self) -> BTreeMap<String, usize> {
        self.written
    }
}

/// Normalize the raw export and persist the cleaned snapshot
pub fn clean_phase<B: StorageBackend>(
    raw: &RawTable,
    store: &ArtifactStore<B>,
) -> Result<CleanOutcome, PipelineError> {
    let _span = info_span!("phase", name = %Phase::Clean).entered();
    invalidate_outputs(store, Phase::Clean)?;

    let Normalized { rows, report } = normalize(raw)?;
    store.save(names::CLEANED_SALES, &rows)?;

    info!(rows = rows.len(), dropped = report.dropped_rows, "Clean phase complete");
    Ok(CleanOutcome { rows, report })
}

/// Compute and persist every base aggregate from the cleaned snapshot
pub fn analyze_phase<B: StorageBackend>(
    store: &ArtifactStore<B>,
    config: &AnalysisConfig,
) -> Result<AnalysisOutcome, PipelineError> {
    let _span = info_span!("phase", name = %Phase::Analyze).entered();
    config.validate()?;
    invalidate_outputs(store, Phase::Analyze)?;

    let cleaned: Vec<TransactionRow> = store.load(names::CLEANED_SALES)?;
    let rows = derive(&cleaned);

    let mut writer = PhaseWriter::new(store);

    // Revenue
    writer.save(
        names::REVENUE_SUMMARY,
        &aggregate::revenue_summary(&rows, config.revenue_window),
    )?;
    writer.save(names::REVENUE_BY_YEAR, &aggregate::revenue_by_year(&rows))?;
    writer.save(
        names::TOP_PRODUCT,
        &aggregate::top_products_by_sales(&rows, config.best_n),
    )?;
    writer.save(
        names::TOP_PRODUCTS,
        &aggregate::top_products_by_sales(&rows, config.listing_n),
    )?;
    writer.save(
        names::TOP_CATEGORY,
        &aggregate::top_categories_by_profit(&rows, config.best_n),
    )?;
    writer.save(
        names::TOP_CATEGORY_SALES,
        &aggregate::top_categories_by_sales(&rows, config.best_n),
    )?;

    // Customers
    writer.save(names::TOP_CUSTOMERS, &aggregate::top_customers(&rows, None))?;
    writer.save(names::REPEAT_PURCHASES, &aggregate::repeat_purchases(&rows))?;

    // Regions
    writer.save(names::TOP_REGIONS, &aggregate::sales_by_region(&rows))?;
    writer.save(names::TOP_CITIES, &aggregate::sales_by_city(&rows))?;
    writer.save(names::REGION_YEAR_SALES_GROWTH, &region_year_growth(&rows))?;
    let region_products = aggregate::region_product_sales(&rows);
    writer.save(names::REGION_PRODUCT_SALES, &region_products)?;
    writer.save(
        names::REGION_TOP_PRODUCTS,
        &aggregate::top_per_region(&region_products, config.region_top_n),
    )?;

    // Profitability
    writer.save(names::REGION_PROFIT_MARGIN, &aggregate::profit_margin_by_region(&rows))?;
    let product_margins = aggregate::profit_margin_by_product(&rows);
    writer.save(names::PRODUCT_PROFIT_MARGIN, &product_margins)?;
    writer.save(
        names::CATEGORY_PROFIT_MARGIN,
        &aggregate::profit_margin_by_category(&rows),
    )?;
    writer.save(
        names::LOW_PROFIT_PRODUCTS,
        &aggregate::low_margin_products(&product_margins, config.low_margin_threshold_pct),
    )?;

    // Promotions
    writer.save(names::DISCOUNT_SALES, &aggregate::sales_by_discount_bin(&rows))?;
    writer.save(
        names::SEGMENT_DISCOUNT_SALES,
        &aggregate::sales_by_segment_discount(&rows),
    )?;

    let outcome = AnalysisOutcome {
        input_rows: rows.len(),
        total_revenue: aggregate::total_revenue(&rows, None),
        artifacts: writer.finish(),
    };
    info!(
        rows = outcome.input_rows,
        artifacts = outcome.artifacts.len(),
        total_revenue = outcome.total_revenue,
        "Analyze phase complete"
    );
    Ok(outcome)
}

/// Build the opportunity tables from artifacts of the earlier phases
pub fn insights_phase<B: StorageBackend>(
    store: &ArtifactStore<B>,
) -> Result<InsightsOutcome, PipelineError> {
    let _span = info_span!("phase", name = %Phase::Insights).entered();
    invalidate_outputs(store, Phase::Insights)?;

    let cleaned: Vec<TransactionRow> = store.load(names::CLEANED_SALES)?;
    let region_growth: Vec<RegionYearGrowth> = store.load(names::REGION_YEAR_SALES_GROWTH)?;
    let repeat: Vec<RepeatPurchase> = store.load(names::REPEAT_PURCHASES)?;

    let mut writer = PhaseWriter::new(store);
    writer.save(names::CROSS_SELL_OPPORTUNITIES, &cross_sell(&cleaned))?;
    writer.save(names::GROWTH_REGIONS, &growth_regions(&region_growth))?;
    writer.save(names::GROWTH_CUSTOMERS, &growth_customers(&repeat))?;

    let outcome = InsightsOutcome {
        latest_region_year: region_growth.iter().map(|r| r.year).max(),
        artifacts: writer.finish(),
    };
    info!(
        artifacts = outcome.artifacts.len(),
        latest_year = ?outcome.latest_region_year,
        "Insights phase complete"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AnalysisConfig::default();
        config.validate().unwrap();
        assert_eq!(config.best_n, 1);
        assert_eq!(config.listing_n, 10);
        assert_eq!(config.region_top_n, 5);
        assert_eq!(
            config.revenue_window.map(|w| w.start),
            NaiveDate::from_ymd_opt(2017, 1, 1)
        );
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let zero_best = AnalysisConfig { best_n: 0, ..Default::default() };
        assert!(matches!(zero_best.validate(), Err(PipelineError::InvalidConfig(_))));

        let nan = AnalysisConfig { low_margin_threshold_pct: f64::NAN, ..Default::default() };
        assert!(nan.validate().is_err());

        let start = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2017, 1, 1).unwrap();
        let backwards = AnalysisConfig {
            revenue_window: Some(DateRange::new(start, end)),
            ..Default::default()
        };
        assert!(backwards.validate().is_err());
    }

    #[test]
    fn test_analyze_without_clean_is_not_found() {
        let store = ArtifactStore::in_memory();
        let err = analyze_phase(&store, &AnalysisConfig::default()).unwrap_err();
        assert!(err.is_missing_artifact());
    }

    #[test]
    fn test_insights_without_analyze_is_not_found() {
        let store = ArtifactStore::in_memory();
        store.save::<TransactionRow>(names::CLEANED_SALES, &[]).unwrap();

        let err = insights_phase(&store).unwrap_err();
        assert!(err.is_missing_artifact());
        assert!(!store.exists(names::CROSS_SELL_OPPORTUNITIES).unwrap());
    }

    #[test]
    fn test_clean_drops_downstream_artifacts() {
        let store = ArtifactStore::in_memory();
        store.save::<TransactionRow>(names::CLEANED_SALES, &[]).unwrap();
        analyze_phase(&store, &AnalysisConfig::default()).unwrap();
        insights_phase(&store).unwrap();
        assert!(store.exists(names::GROWTH_REGIONS).unwrap());

        clean_phase(&RawTable::from_records(&["Order Date"], Vec::<Vec<String>>::new()), &store).unwrap();

        assert!(store.exists(names::CLEANED_SALES).unwrap());
        for name in [names::TOP_REGIONS, names::REPEAT_PURCHASES, names::GROWTH_REGIONS] {
            assert!(!store.exists(name).unwrap(), "{name} survived a re-clean");
        }
    }

    #[test]
    fn test_analyze_drops_insights_built_on_it() {
        let store = ArtifactStore::in_memory();
        store.save::<TransactionRow>(names::CLEANED_SALES, &[]).unwrap();
        analyze_phase(&store, &AnalysisConfig::default()).unwrap();
        insights_phase(&store).unwrap();

        analyze_phase(&store, &AnalysisConfig::default()).unwrap();
        assert!(!store.exists(names::GROWTH_REGIONS).unwrap());
        assert!(!store.exists(names::GROWTH_CUSTOMERS).unwrap());
        // Cross-sell reads only the cleaned snapshot, which analyze leaves alone
        assert!(store.exists(names::CROSS_SELL_OPPORTUNITIES).unwrap());
    }
}
