use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tracing::debug;

use crate::error::{ProcessingError, Result};
use crate::models::Dataset;
use crate::readers::ObservationReader;

/// Identity of a source file at the moment it was read.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SourceStamp {
    modified: Option<SystemTime>,
    len: u64,
}

impl SourceStamp {
    fn of(path: &Path) -> Result<(PathBuf, Self)> {
        let canonical = fs::canonicalize(path)
            .map_err(|e| ProcessingError::data_load(path, e.to_string()))?;
        let metadata = fs::metadata(&canonical)
            .map_err(|e| ProcessingError::data_load(path, e.to_string()))?;

        Ok((
            canonical,
            Self {
                modified: metadata.modified().ok(),
                len: metadata.len(),
            },
        ))
    }
}

/// Loaded datasets keyed by canonical source path.
///
/// An entry is reused while the file's modification time and length are
/// unchanged; otherwise the file is re-read and the entry replaced.
pub struct DatasetCache {
    reader: ObservationReader,
    entries: HashMap<PathBuf, (SourceStamp, Arc<Dataset>)>,
    loads: usize,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::with_reader(ObservationReader::new())
    }

    pub fn with_reader(reader: ObservationReader) -> Self {
        Self {
            reader,
            entries: HashMap::new(),
            loads: 0,
        }
    }

    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<Dataset>> {
        let (canonical, stamp) = SourceStamp::of(path)?;

        if let Some((cached_stamp, dataset)) = self.entries.get(&canonical) {
            if *cached_stamp == stamp {
                debug!("Dataset cache hit for {}", canonical.display());
                return Ok(Arc::clone(dataset));
            }
            debug!("Dataset {} changed on disk, reloading", canonical.display());
        } else {
            debug!("Dataset cache miss for {}", canonical.display());
        }

        let dataset = Arc::new(self.reader.read_dataset(path)?);
        self.loads += 1;
        self.entries
            .insert(canonical, (stamp, Arc::clone(&dataset)));

        Ok(dataset)
    }

    pub fn invalidate(&mut self, path: &Path) -> bool {
        match fs::canonicalize(path) {
            Ok(canonical) => self.entries.remove(&canonical).is_some(),
            Err(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of times a source was actually read from disk.
    pub fn load_count(&self) -> usize {
        self.loads
    }
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::new()
    }
}
