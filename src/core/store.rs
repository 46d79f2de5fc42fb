use crate::core::error::{Error, Result};
use crate::core::models::Sample;
use std::path::{Path, PathBuf};

/// Ordered sequence of samples backed by a single file. The file is
/// rewritten in full after every appended sample; disk always reflects the
/// in-memory sequence as of the last successful persist, so a crash between
/// fetch and persist loses at most one sample.
#[derive(Debug)]
pub struct SampleStore {
    path: PathBuf,
    samples: Vec<Sample>,
}

impl SampleStore {
    /// Loads the store at `path`, creating an empty one (and writing the
    /// file) if nothing exists there yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if !path.exists() {
            let store = Self {
                path,
                samples: Vec::new(),
            };
            store.persist()?;
            tracing::info!(path = %store.path.display(), "Initialized empty sample store");
            return Ok(store);
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| Error::storage(&path, anyhow::Error::new(e).context("read failed")))?;
        let samples: Vec<Sample> = serde_json::from_str(&content).map_err(|e| {
            Error::storage(
                &path,
                anyhow::Error::new(e).context("not a valid sample store"),
            )
        })?;

        tracing::info!(path = %path.display(), count = samples.len(), "Loaded sample store");
        Ok(Self { path, samples })
    }

    /// Rewrites the whole store file from the in-memory sequence.
    pub fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| Error::storage(&self.path, anyhow::Error::new(e)))?;
            }
        }

        let content = serde_json::to_string(&self.samples)
            .map_err(|e| Error::storage(&self.path, anyhow::Error::new(e)))?;
        std::fs::write(&self.path, content)
            .map_err(|e| Error::storage(&self.path, anyhow::Error::new(e).context("write failed")))?;

        tracing::debug!(path = %self.path.display(), count = self.samples.len(), "Persisted store");
        Ok(())
    }

    pub fn append(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::SampleValue;
    use chrono::Utc;

    #[test]
    fn test_open_missing_path_creates_empty_store_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("samples.json");

        let store = SampleStore::open(&path).unwrap();

        assert!(store.is_empty());
        assert!(path.exists(), "file must exist before any sampling occurs");
    }

    #[test]
    fn test_persist_then_open_round_trips_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("samples.json");

        let mut store = SampleStore::open(&path).unwrap();
        store.append(Sample::new(Utc::now(), SampleValue::Duration(617.0)));
        store.append(Sample::new(
            Utc::now(),
            SampleValue::Payload(serde_json::json!({"resourceSets": []})),
        ));
        store.persist().unwrap();

        let reloaded = SampleStore::open(&path).unwrap();
        assert_eq!(reloaded.samples(), store.samples());
    }

    #[test]
    fn test_open_corrupt_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("samples.json");
        std::fs::write(&path, "not a sample store").unwrap();

        let err = SampleStore::open(&path).unwrap_err();
        assert!(matches!(err, Error::Storage { .. }));
    }

    #[test]
    fn test_persist_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("samples.json");

        let store = SampleStore::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_append_preserves_insertion_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SampleStore::open(dir.path().join("samples.json")).unwrap();

        for secs in [1.0, 2.0, 3.0] {
            store.append(Sample::new(Utc::now(), SampleValue::Duration(secs)));
        }
        store.persist().unwrap();

        let reloaded = SampleStore::open(store.path()).unwrap();
        let durations: Vec<f64> = reloaded
            .samples()
            .iter()
            .filter_map(|s| s.value.duration_secs())
            .collect();
        assert_eq!(durations, vec![1.0, 2.0, 3.0]);
    }
}
