//! Markdown preview of persisted artifacts

use insights_store::{ArtifactStore, RawArtifact, StorageBackend, StoreError};
use std::fmt::Write;

/// One markdown table per artifact, at most `max_rows` rows each. Artifacts
/// that were not produced yet are listed as such instead of failing.
pub fn render_store<B: StorageBackend>(
    store: &ArtifactStore<B>,
    only: Option<&str>,
    max_rows: usize,
) -> Result<String, StoreError> {
    let mut out = String::new();
    for spec in store.registry().artifacts() {
        if only.is_some_and(|name| name != spec.name) {
            continue;
        }

        let _ = writeln!(out, "## {} ({})\n", spec.name, spec.phase);
        match store.load_raw(&spec.name) {
            Ok(artifact) => out.push_str(&render_artifact(&artifact, max_rows)),
            Err(StoreError::NotFound(_)) => out.push_str("_not produced yet_\n"),
            Err(e) => return Err(e),
        }
        out.push('\n');
    }
    Ok(out)
}

pub fn render_artifact(artifact: &RawArtifact, max_rows: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "| {} |", artifact.headers.join(" | "));
    let _ = writeln!(
        out,
        "|{}",
        artifact.headers.iter().map(|_| "---|").collect::<String>()
    );
    for row in artifact.rows.iter().take(max_rows) {
        let cells: Vec<String> = row.iter().map(|cell| cell.replace('|', "\\|")).collect();
        let _ = writeln!(out, "| {} |", cells.join(" | "));
    }
    if artifact.rows.len() > max_rows {
        let _ = writeln!(out, "\n_{} more rows_", artifact.rows.len() - max_rows);
    }
    out
}
