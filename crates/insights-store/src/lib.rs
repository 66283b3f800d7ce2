//! Artifact store
//!
//! Persists each named aggregate table as a CSV file and loads it back with
//! its record type. A JSON manifest records the artifacts that were
//! committed, with their row counts and SHA-256 fingerprints. Loading an
//! artifact that is not in the manifest fails with `NotFound`.

use insights_ir::Record;
use insights_registry::{ArtifactRegistry, ArtifactSpec, RegistryError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info};

mod backend;
pub use backend::{FsBackend, MemoryBackend, StorageBackend};

pub const MANIFEST_FILE: &str = "_manifest.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Artifact not found: {0}")]
    NotFound(String),

    #[error("Unknown artifact: {0}")]
    UnknownArtifact(String),

    #[error("Schema mismatch for {artifact}: expected {expected:?}, got {actual:?}")]
    SchemaMismatch {
        artifact: String,
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("Artifact {0} does not match its manifest fingerprint")]
    Corrupt(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Manifest error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<RegistryError> for StoreError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::ArtifactNotFound(name) => StoreError::UnknownArtifact(name),
            other => StoreError::UnknownArtifact(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub file: String,
    pub rows: usize,
    pub sha256: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    pub registry_version: String,
    pub artifacts: BTreeMap<String, ManifestEntry>,
}

/// An artifact read without its record type
#[derive(Debug, Clone, PartialEq)]
pub struct RawArtifact {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub struct ArtifactStore<B: StorageBackend> {
    backend: B,
    registry: ArtifactRegistry,
}

impl ArtifactStore<FsBackend> {
    /// Store over a directory, with the built-in registry
    pub fn open(dir: impl Into<std::path::PathBuf>) -> Self {
        Self::new(FsBackend::new(dir), ArtifactRegistry::default())
    }
}

impl ArtifactStore<MemoryBackend> {
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new(), ArtifactRegistry::default())
    }
}

impl<B: StorageBackend> ArtifactStore<B> {
    pub fn new(backend: B, registry: ArtifactRegistry) -> Self {
        Self { backend, registry }
    }

    pub fn registry(&self) -> &ArtifactRegistry {
        &self.registry
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Persist `rows` as artifact `name` and commit it to the manifest
    pub fn save<T: Serialize + Record>(&self, name: &str, rows: &[T]) -> Result<ManifestEntry, StoreError> {
        let spec = self.registry.lookup(name)?;
        check_columns(spec, T::schema().column_names())?;

        // Header is written by hand so empty tables keep their columns
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(vec![]);
        writer.write_record(spec.column_names())?;
        for row in rows {
            writer.serialize(row)?;
        }
        let bytes = writer.into_inner().map_err(|e| StoreError::Io(e.into_error()))?;

        self.backend.write(&spec.file_name, &bytes)?;

        let entry = ManifestEntry {
            file: spec.file_name.clone(),
            rows: rows.len(),
            sha256: fingerprint(&bytes),
        };
        let mut manifest = self.manifest()?;
        manifest.registry_version = self.registry.version().to_string();
        manifest.artifacts.insert(name.to_string(), entry.clone());
        self.write_manifest(&manifest)?;

        info!(artifact = name, rows = rows.len(), "Saved artifact");
        Ok(entry)
    }

    /// Load committed artifact `name` as rows of `T`
    pub fn load<T: DeserializeOwned + Record>(&self, name: &str) -> Result<Vec<T>, StoreError> {
        let spec = self.registry.lookup(name)?;
        check_columns(spec, T::schema().column_names())?;

        let bytes = self.committed_bytes(name, spec)?;
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(bytes.as_slice());
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        check_columns(spec, headers.iter().map(String::as_str).collect())?;

        let rows = reader.deserialize().collect::<Result<Vec<T>, csv::Error>>()?;
        debug!(artifact = name, rows = rows.len(), "Loaded artifact");
        Ok(rows)
    }

    /// Load committed artifact `name` as text cells
    pub fn load_raw(&self, name: &str) -> Result<RawArtifact, StoreError> {
        let spec = self.registry.lookup(name)?;
        let bytes = self.committed_bytes(name, spec)?;

        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(bytes.as_slice());
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        check_columns(spec, headers.iter().map(String::as_str).collect())?;

        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }

        Ok(RawArtifact {
            name: name.to_string(),
            headers,
            rows,
        })
    }

    pub fn exists(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.manifest()?.artifacts.contains_key(name))
    }

    /// Drop artifacts and their manifest entries so nothing stale survives
    /// a phase that fails before rewriting them.
    pub fn invalidate<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Result<(), StoreError> {
        let mut manifest = self.manifest()?;
        let mut removed = 0;
        for name in names {
            let spec = self.registry.lookup(name)?;
            if manifest.artifacts.remove(name).is_some() {
                removed += 1;
            }
            self.backend.remove(&spec.file_name)?;
        }
        self.write_manifest(&manifest)?;
        debug!(removed, "Invalidated artifacts");
        Ok(())
    }

    pub fn manifest(&self) -> Result<Manifest, StoreError> {
        match self.backend.read(MANIFEST_FILE)? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(Manifest::default()),
        }
    }

    fn write_manifest(&self, manifest: &Manifest) -> Result<(), StoreError> {
        let mut bytes = serde_json::to_vec_pretty(manifest)?;
        bytes.push(b'\n');
        self.backend.write(MANIFEST_FILE, &bytes)
    }

    fn committed_bytes(&self, name: &str, spec: &ArtifactSpec) -> Result<Vec<u8>, StoreError> {
        let manifest = self.manifest()?;
        let entry = manifest
            .artifacts
            .get(name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        let bytes = self
            .backend
            .read(&spec.file_name)?
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;

        if fingerprint(&bytes) != entry.sha256 {
            return Err(StoreError::Corrupt(name.to_string()));
        }
        Ok(bytes)
    }
}

fn check_columns(spec: &ArtifactSpec, actual: Vec<&str>) -> Result<(), StoreError> {
    let expected = spec.column_names();
    if expected == actual {
        return Ok(());
    }
    Err(StoreError::SchemaMismatch {
        artifact: spec.name.clone(),
        expected: expected.into_iter().map(str::to_string).collect(),
        actual: actual.into_iter().map(str::to_string).collect(),
    })
}

/// Hex SHA-256 of artifact bytes
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
