//! Application root
//!
//! `Library` owns the store handle and the preset cache and runs the
//! user-facing flows against both: list, refresh, detail lookup, submit,
//! edit, delete and reinitialize. Every write reaches the store first; the
//! cache is only touched once the store call has succeeded.

use chrono::Utc;
use tracing::info;

use crate::cache::{PresetCache, Snapshot};
use crate::config::Config;
use crate::ids;
use crate::models::{PresetPatch, PresetRecord};
use crate::reconcile::{self, ReinitializeError, Resolution};
use crate::session::Session;
use crate::storage::StoreResult;
use crate::store::{PresetStore, StoreStats};
use crate::submit::{PresetDraft, SubmitError};

/// Store and cache, wired together
pub struct Library {
    store: PresetStore,
    cache: PresetCache,
}

impl Library {
    /// Open the store and load the cache
    pub async fn open(config: Config) -> StoreResult<Self> {
        Self::with_store(PresetStore::open(config).await?).await
    }

    /// Wrap an existing store handle and load the cache from it
    pub async fn with_store(store: PresetStore) -> StoreResult<Self> {
        let library = Self {
            store,
            cache: PresetCache::new(),
        };
        library.refresh().await?;
        Ok(library)
    }

    pub fn config(&self) -> &Config {
        self.store.config()
    }

    pub fn store(&self) -> &PresetStore {
        &self.store
    }

    pub fn cache(&self) -> &PresetCache {
        &self.cache
    }

    /// Cached presets, newest first
    pub fn list(&self) -> Snapshot {
        self.cache.list()
    }

    /// Reload the cache from the store; returns the number of presets
    pub async fn refresh(&self) -> StoreResult<usize> {
        self.cache.refresh(&self.store).await
    }

    /// Detail lookup: cache first, then the store
    pub async fn resolve(&self, id: &str) -> StoreResult<Resolution> {
        reconcile::resolve(
            &self.cache,
            &self.store,
            id,
            self.config().backfill_on_fallback,
        )
        .await
    }

    /// Validate and store a draft, returning the new preset
    ///
    /// The preset gets a fresh id, the current time, and the session's
    /// author unless the draft names one.
    pub async fn submit(
        &self,
        draft: PresetDraft,
        session: &Session,
    ) -> Result<PresetRecord, SubmitError> {
        draft.validate(self.config().max_images)?;

        let created_at = Utc::now();
        let record = draft.into_record(ids::generate_id(created_at), created_at, session.author());

        self.store.insert(&record).await?;
        self.cache.add(record.clone());

        info!(id = %record.id, images = record.images.len(), "Submitted preset");
        Ok(record)
    }

    /// Apply a partial update; returns the stored result, `None` if missing
    pub async fn update(&self, id: &str, patch: PresetPatch) -> StoreResult<Option<PresetRecord>> {
        if !self.store.update(id, patch).await? {
            return Ok(None);
        }

        let mark = self.cache.mark();
        let updated = self.store.get_by_id(id).await?;
        if let Some(record) = &updated {
            if self.cache.find_by_id(id).is_some() {
                self.cache.backfill_since(mark, record.clone());
            }
        }
        Ok(updated)
    }

    /// Delete from the store, then from the cache
    ///
    /// Returns whether the store had the preset. Deleting a missing id is
    /// not an error.
    pub async fn delete(&self, id: &str) -> StoreResult<bool> {
        let removed = self.store.delete(id).await?;
        self.cache.remove(id);
        Ok(removed)
    }

    /// Reset to the seed presets; offered when the list is empty
    pub async fn reinitialize(&self) -> Result<usize, ReinitializeError> {
        reconcile::reinitialize(&self.cache, &self.store).await
    }

    pub async fn stats(&self) -> StoreResult<StoreStats> {
        self.store.stats().await
    }
}
