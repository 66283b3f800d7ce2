//! Retail sales aggregation pipeline
//!
//! Turns one raw sales export into the fixed set of reporting tables:
//!
//! ```text
//! raw CSV -> normalize -> derive -> aggregate / growth / affinity -> artifact store
//! ```
//!
//! Every stage is a plain function over an in-memory snapshot. The
//! [`phases`] module wires them into the three batch phases (clean, analyze,
//! insights) that read and write the artifact store.

pub mod affinity;
pub mod aggregate;
pub mod derive;
pub mod growth;
pub mod normalize;
pub mod phases;
pub mod source;

pub use aggregate::DateRange;
pub use normalize::{normalize, NormalizeError, NormalizeReport, Normalized};
pub use phases::{
    analyze_phase, clean_phase, insights_phase, AnalysisConfig, AnalysisOutcome, CleanOutcome,
    InsightsOutcome,
};
pub use source::{read_raw, read_raw_csv, RawTable, SourceError};

use insights_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Normalization failed: {0}")]
    Normalize(#[from] NormalizeError),

    #[error("Artifact store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid analysis config: {0}")]
    InvalidConfig(String),
}

impl PipelineError {
    /// True when a phase failed because an earlier phase's artifact is absent
    pub fn is_missing_artifact(&self) -> bool {
        matches!(self, PipelineError::Store(StoreError::NotFound(_)))
    }
}
