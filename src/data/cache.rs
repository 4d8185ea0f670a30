use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;

use super::loader::{self, DataSource};
use super::model::PickupDataset;

/// Loaded datasets keyed by source and row limit.
///
/// Entries live until [`DatasetCache::invalidate`] or [`DatasetCache::clear`].
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<(DataSource, usize), Arc<PickupDataset>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset or load it from `source`.
    pub fn get_or_load(&mut self, source: &DataSource, max_rows: usize) -> Result<Arc<PickupDataset>> {
        self.get_or_load_with(source, max_rows, loader::load)
    }

    /// Same as [`get_or_load`](Self::get_or_load) with a custom loader.
    /// Failed loads are not cached.
    pub fn get_or_load_with<F>(
        &mut self,
        source: &DataSource,
        max_rows: usize,
        load: F,
    ) -> Result<Arc<PickupDataset>>
    where
        F: FnOnce(&DataSource, usize) -> Result<PickupDataset>,
    {
        let key = (source.clone(), max_rows);
        if let Some(hit) = self.entries.get(&key) {
            log::info!("Using cached dataset for {source} ({max_rows} rows)");
            return Ok(Arc::clone(hit));
        }
        let dataset = Arc::new(load(source, max_rows)?);
        self.entries.insert(key, Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Drop every entry loaded from `source`, whatever its row limit.
    pub fn invalidate(&mut self, source: &DataSource) {
        self.entries.retain(|(s, _), _| s != source);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
