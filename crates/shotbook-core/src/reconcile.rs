//! Cache/store reconciliation
//!
//! Detail lookups are answered from the cache and fall back to the store on
//! a miss. Reinitialization wipes the database back to the seed set and
//! reloads the cache, failing as a whole.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::PresetCache;
use crate::ids::newest_first;
use crate::models::PresetRecord;
use crate::storage::{StoreError, StoreResult};
use crate::store::PresetStore;

/// Where a looked-up preset came from
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Found in the cache
    Cached(PresetRecord),
    /// Missing from the cache, found in the store
    Fetched(PresetRecord),
    /// Neither the cache nor the store has it
    Missing,
}

impl Resolution {
    pub fn record(&self) -> Option<&PresetRecord> {
        match self {
            Resolution::Cached(record) | Resolution::Fetched(record) => Some(record),
            Resolution::Missing => None,
        }
    }

    pub fn into_record(self) -> Option<PresetRecord> {
        match self {
            Resolution::Cached(record) | Resolution::Fetched(record) => Some(record),
            Resolution::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Resolution::Missing)
    }
}

/// Look a preset up in the cache, then in the store
///
/// With `backfill`, a preset found only in the store is inserted into the
/// cache at its listing position so later `list()` calls include it. The
/// backfill is skipped if a removal reached the cache while the store read
/// was in flight.
pub async fn resolve(
    cache: &PresetCache,
    store: &PresetStore,
    id: &str,
    backfill: bool,
) -> StoreResult<Resolution> {
    if let Some(record) = cache.find_by_id(id) {
        return Ok(Resolution::Cached(record));
    }

    let mark = cache.mark();
    match store.get_by_id(id).await? {
        Some(record) => {
            debug!(id, backfill, "Resolved preset from store");
            if backfill {
                cache.backfill_since(mark, record.clone());
            }
            Ok(Resolution::Fetched(record))
        }
        None => Ok(Resolution::Missing),
    }
}

/// Errors from reinitialization, by failed step
#[derive(Error, Debug)]
pub enum ReinitializeError {
    /// There is nothing to reseed with
    #[error("Refusing to reinitialize with an empty seed set")]
    EmptySeed,

    /// Clearing or reseeding failed; the database was rolled back
    #[error("Failed to reset presets: {0}")]
    Reset(#[source] StoreError),

    /// The database was reset but reloading the cache failed; the cache
    /// holds the committed seed set instead
    #[error("Presets were reset but the list could not be reloaded: {0}")]
    Refresh(#[source] StoreError),
}

/// Reset the store to its seed set and reload the cache
///
/// Returns the number of presets now listed.
pub async fn reinitialize(
    cache: &PresetCache,
    store: &PresetStore,
) -> Result<usize, ReinitializeError> {
    reinitialize_with(cache, store, store.seed().to_vec()).await
}

/// Reset the store to `seed` and reload the cache
///
/// Clearing and reseeding commit together. If either fails, the database
/// keeps its previous rows and the cache is not touched. If the reload
/// after a committed reset fails, the cache is set to the seed presets so
/// it never shows rows the reset deleted.
pub async fn reinitialize_with(
    cache: &PresetCache,
    store: &PresetStore,
    seed: Vec<PresetRecord>,
) -> Result<usize, ReinitializeError> {
    if seed.is_empty() {
        return Err(ReinitializeError::EmptySeed);
    }

    let inserted = store.reset_with(seed.clone()).await.map_err(|e| {
        warn!(error = %e, "Reinitialize failed, database unchanged");
        ReinitializeError::Reset(e)
    })?;

    let listed = cache.refresh(store).await.map_err(|e| {
        warn!(error = %e, "Reload after reset failed, listing seed presets");
        settle_on_seed(cache, seed);
        ReinitializeError::Refresh(e)
    })?;

    info!(inserted, listed, "Reinitialized presets");
    Ok(listed)
}

/// Show exactly the seed set, in listing order
fn settle_on_seed(cache: &PresetCache, mut seed: Vec<PresetRecord>) {
    seed.sort_by(newest_first);
    cache.replace(seed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::{Author, StyledSettings};
    use crate::seed;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    fn preset(id: &str) -> PresetRecord {
        PresetRecord {
            id: id.to_string(),
            title: "Fallback".to_string(),
            description: "Only in the database".to_string(),
            images: vec!["file:///photos/a.jpg".to_string()],
            thumbnail: "file:///photos/a.jpg".to_string(),
            camera_settings: StyledSettings::default().into(),
            author: Author::new("13800000000"),
            created_at: Utc::now() - Duration::days(1),
        }
    }

    async fn setup() -> (TempDir, PresetStore, PresetCache) {
        let temp_dir = TempDir::new().unwrap();
        let store = PresetStore::open(Config::with_data_dir(temp_dir.path()))
            .await
            .unwrap();
        let cache = PresetCache::new();
        cache.refresh(&store).await.unwrap();
        (temp_dir, store, cache)
    }

    #[tokio::test]
    async fn test_resolve_from_cache() {
        let (_dir, store, cache) = setup().await;

        let resolution = resolve(&cache, &store, "cam1", true).await.unwrap();
        assert!(matches!(resolution, Resolution::Cached(ref r) if r.id == "cam1"));
    }

    #[tokio::test]
    async fn test_resolve_missing() {
        let (_dir, store, cache) = setup().await;

        let resolution = resolve(&cache, &store, "nonexistent", true).await.unwrap();
        assert!(resolution.is_missing());
        assert!(resolution.into_record().is_none());
    }

    #[tokio::test]
    async fn test_resolve_falls_back_and_backfills() {
        let (_dir, store, cache) = setup().await;
        store.insert(&preset("sub_db_only")).await.unwrap();

        let resolution = resolve(&cache, &store, "sub_db_only", true).await.unwrap();
        assert!(matches!(resolution, Resolution::Fetched(_)));

        // Now served by the cache, at the position the store lists it
        assert!(cache.find_by_id("sub_db_only").is_some());
        assert_eq!(*cache.list(), store.get_all().await.unwrap());
    }

    #[tokio::test]
    async fn test_resolve_without_backfill_leaves_cache_alone() {
        let (_dir, store, cache) = setup().await;
        store.insert(&preset("sub_db_only")).await.unwrap();

        let resolution = resolve(&cache, &store, "sub_db_only", false).await.unwrap();
        assert_eq!(resolution.record().unwrap().id, "sub_db_only");
        assert!(cache.find_by_id("sub_db_only").is_none());
    }

    #[tokio::test]
    async fn test_reinitialize_restores_seed() {
        let (_dir, store, cache) = setup().await;
        for id in ["cam1", "cam2", "cam3"] {
            store.delete(id).await.unwrap();
        }
        cache.refresh(&store).await.unwrap();
        assert!(cache.is_empty());

        let listed = reinitialize(&cache, &store).await.unwrap();

        assert_eq!(listed, seed::SEED_COUNT);
        assert_eq!(*cache.list(), store.get_all().await.unwrap());
    }

    #[tokio::test]
    async fn test_reinitialize_failure_keeps_prior_state() {
        let (_dir, store, cache) = setup().await;
        store.insert(&preset("sub_keep")).await.unwrap();
        cache.refresh(&store).await.unwrap();
        let before_store = store.get_all().await.unwrap();
        let before_cache = cache.list();

        // The second insert collides after the table was cleared
        let broken_seed = vec![preset("dup"), preset("dup")];
        let err = reinitialize_with(&cache, &store, broken_seed)
            .await
            .unwrap_err();

        assert!(matches!(err, ReinitializeError::Reset(StoreError::DuplicateKey { .. })));
        assert_eq!(store.get_all().await.unwrap(), before_store);
        assert_eq!(cache.list(), before_cache);
    }

    #[tokio::test]
    async fn test_resolve_skips_backfill_of_deleted_preset() {
        let (_dir, store, cache) = setup().await;
        store.insert(&preset("sub_x")).await.unwrap();

        // The store read returns, then a delete lands before the backfill
        let mark = cache.mark();
        let fetched = store.get_by_id("sub_x").await.unwrap().unwrap();
        store.delete("sub_x").await.unwrap();
        cache.remove("sub_x");

        assert!(!cache.backfill_since(mark, fetched));
        assert!(cache.find_by_id("sub_x").is_none());
        assert_eq!(*cache.list(), store.get_all().await.unwrap());

        let resolution = resolve(&cache, &store, "sub_x", true).await.unwrap();
        assert!(resolution.is_missing());
    }

    #[tokio::test]
    async fn test_settle_on_seed_drops_stale_rows() {
        let (_dir, store, cache) = setup().await;
        store.insert(&preset("sub_old")).await.unwrap();
        cache.refresh(&store).await.unwrap();

        let seed = store.seed().to_vec();
        let mut shuffled = seed.clone();
        shuffled.reverse();
        settle_on_seed(&cache, shuffled);

        assert!(cache.find_by_id("sub_old").is_none());
        let listed = cache.list();
        let ids: Vec<&str> = listed.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["cam1", "cam2", "cam3"]);
    }

    #[tokio::test]
    async fn test_reinitialize_rejects_empty_seed() {
        let (_dir, store, cache) = setup().await;

        let err = reinitialize_with(&cache, &store, Vec::new()).await.unwrap_err();

        assert!(matches!(err, ReinitializeError::EmptySeed));
        assert_eq!(store.count().await.unwrap(), 3);
    }
}
