//! Cache refresh from the remote list store

use crate::error::MeterbookResult;
use crate::remote::ListStore;
use crate::storage::Storage;

/// Service for pulling remote state into the local cache
pub struct SyncService<'a> {
    storage: &'a Storage,
    remote: &'a dyn ListStore,
}

impl<'a> SyncService<'a> {
    pub fn new(storage: &'a Storage, remote: &'a dyn ListStore) -> Self {
        Self { storage, remote }
    }

    /// Replace the cached floors with the remote ones
    ///
    /// Returns the number of floors now cached. On failure the cache is left
    /// as it was.
    pub async fn refresh_floors(&self) -> MeterbookResult<usize> {
        let floors = self.remote.fetch_floors().await?;
        let count = floors.len();
        let readings: usize = floors.iter().map(|f| f.readings.len()).sum();

        self.storage.floors.replace_all(floors)?;
        self.storage.floors.save()?;

        tracing::info!(floors = count, readings, "Refreshed floors from list store");
        Ok(count)
    }
}
