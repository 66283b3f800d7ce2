//! Artifact registry
//!
//! Every artifact the pipeline persists is declared here with its file name,
//! column schema, producing phase and the artifacts it is computed from.
//! The registry is the contract between the pipeline and whatever renders
//! the artifacts.

use insights_ir::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("Artifact {artifact} depends on {dependency}, which {reason}")]
    InvalidDependency {
        artifact: String,
        dependency: String,
        reason: &'static str,
    },
}

/// Artifact names
pub mod names {
    pub const CLEANED_SALES: &str = "cleaned_sales";

    pub const REVENUE_SUMMARY: &str = "revenue_summary";
    pub const REVENUE_BY_YEAR: &str = "revenue_by_year";
    pub const TOP_PRODUCT: &str = "top_product";
    pub const TOP_PRODUCTS: &str = "top_products";
    pub const TOP_CATEGORY: &str = "top_category";
    pub const TOP_CATEGORY_SALES: &str = "top_category_sales";
    pub const TOP_CUSTOMERS: &str = "top_customers";
    pub const REPEAT_PURCHASES: &str = "repeat_purchases";
    pub const TOP_REGIONS: &str = "top_regions";
    pub const TOP_CITIES: &str = "top_cities";
    pub const REGION_YEAR_SALES_GROWTH: &str = "region_year_sales_growth";
    pub const REGION_PRODUCT_SALES: &str = "region_product_sales";
    pub const REGION_TOP_PRODUCTS: &str = "region_top_products";
    pub const REGION_PROFIT_MARGIN: &str = "region_profit_margin";
    pub const PRODUCT_PROFIT_MARGIN: &str = "product_profit_margin";
    pub const CATEGORY_PROFIT_MARGIN: &str = "category_profit_margin";
    pub const LOW_PROFIT_PRODUCTS: &str = "low_profit_products";
    pub const DISCOUNT_SALES: &str = "discount_sales";
    pub const SEGMENT_DISCOUNT_SALES: &str = "segment_discount_sales";

    pub const CROSS_SELL_OPPORTUNITIES: &str = "cross_sell_opportunities";
    pub const GROWTH_REGIONS: &str = "growth_regions";
    pub const GROWTH_CUSTOMERS: &str = "growth_customers";
}

/// Pipeline phase that produces an artifact. Phases run in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    Clean,
    Analyze,
    Insights,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Clean => "clean",
            Phase::Analyze => "analyze",
            Phase::Insights => "insights",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactSpec {
    pub name: String,
    pub file_name: String,
    pub schema: Schema,
    pub phase: Phase,
    pub depends_on: Vec<String>,
}

impl ArtifactSpec {
    /// Spec for an artifact holding rows of `T`
    pub fn of<T: Record>(name: &str, phase: Phase, depends_on: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            file_name: format!("{name}.csv"),
            schema: T::schema(),
            phase,
            depends_on: depends_on.iter().map(|d| d.to_string()).collect(),
        }
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.schema.column_names()
    }
}

pub struct ArtifactRegistry {
    artifacts: BTreeMap<String, ArtifactSpec>,
    version: String, // Bumped whenever an artifact schema changes
}

impl ArtifactRegistry {
    pub fn new(version: impl Into<String>) -> Self {
        let mut registry = Self {
            artifacts: BTreeMap::new(),
            version: version.into(),
        };
        registry.register_builtins();
        debug_assert!(registry.check_dependencies().is_ok());
        registry
    }

    /// Registry with no artifacts, for callers assembling their own set
    pub fn empty(version: impl Into<String>) -> Self {
        Self {
            artifacts: BTreeMap::new(),
            version: version.into(),
        }
    }

    fn register_builtins(&mut self) {
        use names::*;
        use Phase::*;

        self.register(ArtifactSpec::of::<TransactionRow>(CLEANED_SALES, Clean, &[]));

        // Base aggregates, all computed from the cleaned snapshot
        let base = &[CLEANED_SALES];
        self.register(ArtifactSpec::of::<RevenueSummary>(REVENUE_SUMMARY, Analyze, base));
        self.register(ArtifactSpec::of::<YearSales>(REVENUE_BY_YEAR, Analyze, base));
        self.register(ArtifactSpec::of::<RankedProduct>(TOP_PRODUCT, Analyze, base));
        self.register(ArtifactSpec::of::<RankedProduct>(TOP_PRODUCTS, Analyze, base));
        self.register(ArtifactSpec::of::<RankedCategory>(TOP_CATEGORY, Analyze, base));
        self.register(ArtifactSpec::of::<RankedCategorySales>(TOP_CATEGORY_SALES, Analyze, base));
        self.register(ArtifactSpec::of::<RankedCustomer>(TOP_CUSTOMERS, Analyze, base));
        self.register(ArtifactSpec::of::<RepeatPurchase>(REPEAT_PURCHASES, Analyze, base));
        self.register(ArtifactSpec::of::<RegionSales>(TOP_REGIONS, Analyze, base));
        self.register(ArtifactSpec::of::<CitySales>(TOP_CITIES, Analyze, base));
        self.register(ArtifactSpec::of::<RegionYearGrowth>(REGION_YEAR_SALES_GROWTH, Analyze, base));
        self.register(ArtifactSpec::of::<RegionProductSales>(REGION_PRODUCT_SALES, Analyze, base));
        self.register(ArtifactSpec::of::<RegionProductSales>(REGION_TOP_PRODUCTS, Analyze, base));
        self.register(ArtifactSpec::of::<RegionMargin>(REGION_PROFIT_MARGIN, Analyze, base));
        self.register(ArtifactSpec::of::<ProductMargin>(PRODUCT_PROFIT_MARGIN, Analyze, base));
        self.register(ArtifactSpec::of::<CategoryMargin>(CATEGORY_PROFIT_MARGIN, Analyze, base));
        self.register(ArtifactSpec::of::<ProductMargin>(LOW_PROFIT_PRODUCTS, Analyze, base));
        self.register(ArtifactSpec::of::<DiscountSales>(DISCOUNT_SALES, Analyze, base));
        self.register(ArtifactSpec::of::<SegmentDiscountSales>(SEGMENT_DISCOUNT_SALES, Analyze, base));

        // Opportunity tables re-read what earlier phases persisted
        self.register(ArtifactSpec::of::<CrossSellPair>(CROSS_SELL_OPPORTUNITIES, Insights, base));
        self.register(ArtifactSpec::of::<RegionYearGrowth>(
            GROWTH_REGIONS,
            Insights,
            &[REGION_YEAR_SALES_GROWTH],
        ));
        self.register(ArtifactSpec::of::<RepeatPurchase>(
            GROWTH_CUSTOMERS,
            Insights,
            &[REPEAT_PURCHASES],
        ));
    }

    pub fn register(&mut self, spec: ArtifactSpec) {
        self.artifacts.insert(spec.name.clone(), spec);
    }

    pub fn lookup(&self, name: &str) -> Result<&ArtifactSpec, RegistryError> {
        self.artifacts
            .get(name)
            .ok_or_else(|| RegistryError::ArtifactNotFound(name.to_string()))
    }

    /// All artifacts in phase order, then by name
    pub fn artifacts(&self) -> Vec<&ArtifactSpec> {
        let mut specs: Vec<&ArtifactSpec> = self.artifacts.values().collect();
        specs.sort_by(|a, b| a.phase.cmp(&b.phase).then_with(|| a.name.cmp(&b.name)));
        specs
    }

    pub fn produced_by(&self, phase: Phase) -> Vec<&ArtifactSpec> {
        self.artifacts.values().filter(|spec| spec.phase == phase).collect()
    }

    /// Artifacts from earlier phases that `phase` reads
    pub fn inputs_of(&self, phase: Phase) -> Vec<&str> {
        let mut inputs: Vec<&str> = self
            .produced_by(phase)
            .into_iter()
            .flat_map(|spec| spec.depends_on.iter().map(String::as_str))
            .filter(|dep| {
                self.artifacts
                    .get(*dep)
                    .map(|spec| spec.phase != phase)
                    .unwrap_or(true)
            })
            .collect();
        inputs.sort_unstable();
        inputs.dedup();
        inputs
    }

    /// Artifacts computed from any of `names`, directly or through other
    /// artifacts, in name order. `names` themselves are not included.
    pub fn dependents_of(&self, names: &[&str]) -> Vec<&str> {
        let mut found: BTreeSet<&str> = BTreeSet::new();
        let mut pending: Vec<&str> = names.to_vec();
        while let Some(name) = pending.pop() {
            for spec in self.artifacts.values() {
                if spec.depends_on.iter().any(|dep| dep == name) && found.insert(spec.name.as_str()) {
                    pending.push(spec.name.as_str());
                }
            }
        }
        found
            .into_iter()
            .filter(|name| !names.iter().any(|n| n == name))
            .collect()
    }

    /// Every dependency must be registered and produced by an earlier phase
    pub fn check_dependencies(&self) -> Result<(), RegistryError> {
        for spec in self.artifacts.values() {
            for dep in &spec.depends_on {
                let dep_spec = self.artifacts.get(dep).ok_or_else(|| RegistryError::InvalidDependency {
                    artifact: spec.name.clone(),
                    dependency: dep.clone(),
                    reason: "is not registered",
                })?;
                if dep_spec.phase >= spec.phase {
                    return Err(RegistryError::InvalidDependency {
                        artifact: spec.name.clone(),
                        dependency: dep.clone(),
                        reason: "is not produced by an earlier phase",
                    });
                }
            }
        }
        Ok(())
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl Default for ArtifactRegistry {
    fn default() -> Self {
        Self::new("0.1.0")
    }
}
