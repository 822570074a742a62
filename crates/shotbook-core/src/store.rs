//! Preset store
//!
//! `PresetStore` is the handle through which everything reaches the
//! database. It is created once at start-up and cloned into consumers;
//! clones share one connection.
//!
//! ## Initialization
//!
//! The connection is opened lazily. The first operation (or an explicit
//! `initialize()`) creates the data directory, opens SQLite, creates the
//! schema and seeds the demonstration presets if the table is empty. All
//! concurrent first callers await the same initialization future, so the
//! schema is created and the seed inserted once.
//!
//! ## Usage
//!
//! ```ignore
//! let store = PresetStore::open(config).await?;
//!
//! store.insert(&preset).await?;
//! let presets = store.get_all().await?;  // newest first
//! ```
//!
//! rusqlite is blocking, so every operation runs on tokio's blocking pool.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::Connection;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::config::Config;
use crate::models::{PresetPatch, PresetRecord};
use crate::seed;
use crate::storage::repository;
use crate::storage::schema::{init_schema, needs_init};
use crate::storage::{StoreError, StoreResult};

/// Storage statistics
#[derive(Debug, Clone)]
pub struct StoreStats {
    /// Path to the SQLite database
    pub database_path: PathBuf,
    /// Size of the database file in bytes
    pub database_size: u64,
    /// Number of stored presets
    pub preset_count: i64,
}

impl StoreStats {
    /// Database size in human-readable form
    pub fn database_size_human(&self) -> String {
        format_bytes(self.database_size)
    }
}

/// Shared handle to the preset database
#[derive(Clone)]
pub struct PresetStore {
    inner: Arc<Inner>,
}

struct Inner {
    config: Config,
    /// Presets inserted into an empty database and by `reset`
    seed: Vec<PresetRecord>,
    conn: OnceCell<Arc<Mutex<Connection>>>,
}

impl PresetStore {
    /// Create a handle seeded with the demonstration presets
    ///
    /// Nothing is opened until the first operation.
    pub fn new(config: Config) -> Self {
        Self::with_seed(config, seed::demo_presets(Utc::now()))
    }

    /// Create a handle with a custom seed set
    pub fn with_seed(config: Config, seed: Vec<PresetRecord>) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                seed,
                conn: OnceCell::new(),
            }),
        }
    }

    /// Create a handle and initialize it immediately
    ///
    /// Fails with `StoreError::Initialization` when the database cannot be
    /// opened, migrated or seeded.
    pub async fn open(config: Config) -> StoreResult<Self> {
        let store = Self::new(config);
        store.initialize().await?;
        Ok(store)
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Presets used for seeding and reset
    pub fn seed(&self) -> &[PresetRecord] {
        &self.inner.seed
    }

    /// Whether the connection has been opened
    pub fn is_initialized(&self) -> bool {
        self.inner.conn.initialized()
    }

    /// Open the database, create the schema and seed if empty
    ///
    /// Idempotent; concurrent callers share one attempt. A failed attempt
    /// is not cached, so a later call tries again.
    pub async fn initialize(&self) -> StoreResult<()> {
        self.connection().await.map(|_| ())
    }

    // ==================== Preset Operations ====================

    /// All presets, newest first
    pub async fn get_all(&self) -> StoreResult<Vec<PresetRecord>> {
        let skip_corrupt = self.inner.config.skip_corrupt_rows;
        self.with_conn(move |conn| repository::get_all(conn, skip_corrupt))
            .await
    }

    /// A preset by id; `None` when there is no such preset
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<PresetRecord>> {
        let id = id.to_string();
        self.with_conn(move |conn| repository::get_by_id(conn, &id))
            .await
    }

    /// Insert a new preset
    ///
    /// Fails with `StoreError::DuplicateKey` if the id is taken.
    pub async fn insert(&self, record: &PresetRecord) -> StoreResult<()> {
        let record = record.clone();
        self.with_conn(move |conn| {
            repository::insert(conn, &record)?;
            debug!(id = %record.id, "Inserted preset");
            Ok(())
        })
        .await
    }

    /// Merge a partial update onto a stored preset
    ///
    /// Returns `false` if no preset has this id.
    pub async fn update(&self, id: &str, patch: PresetPatch) -> StoreResult<bool> {
        let id = id.to_string();
        self.with_conn(move |conn| repository::update(conn, &id, patch))
            .await
    }

    /// Delete a preset; returns whether one was removed
    pub async fn delete(&self, id: &str) -> StoreResult<bool> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            let removed = repository::delete(conn, &id)?;
            debug!(%id, removed, "Deleted preset");
            Ok(removed)
        })
        .await
    }

    /// Number of stored presets
    pub async fn count(&self) -> StoreResult<i64> {
        self.with_conn(|conn| repository::count(conn)).await
    }

    /// Wipe all presets and insert the seed set, as one transaction
    pub async fn reset(&self) -> StoreResult<usize> {
        self.reset_with(self.inner.seed.clone()).await
    }

    /// Wipe all presets and insert `seed`, as one transaction
    ///
    /// On failure nothing changes.
    pub async fn reset_with(&self, seed: Vec<PresetRecord>) -> StoreResult<usize> {
        self.with_conn(move |conn| {
            let inserted = repository::reset(conn, &seed)?;
            info!(inserted, "Reset presets to seed data");
            Ok(inserted)
        })
        .await
    }

    // ==================== Stats ====================

    /// Get storage statistics
    pub async fn stats(&self) -> StoreResult<StoreStats> {
        let preset_count = self.count().await?;
        let database_path = self.inner.config.sqlite_path();
        let database_size = std::fs::metadata(&database_path)
            .map(|m| m.len())
            .unwrap_or(0);

        Ok(StoreStats {
            database_path,
            database_size,
            preset_count,
        })
    }

    // ==================== Connection ====================

    async fn connection(&self) -> StoreResult<Arc<Mutex<Connection>>> {
        let conn = self
            .inner
            .conn
            .get_or_try_init(|| {
                let config = self.inner.config.clone();
                let seed = self.inner.seed.clone();
                async move {
                    let conn =
                        tokio::task::spawn_blocking(move || open_database(&config, &seed))
                            .await??;
                    Ok::<_, StoreError>(Arc::new(Mutex::new(conn)))
                }
            })
            .await?;
        Ok(Arc::clone(conn))
    }

    /// Run a blocking database operation on the shared connection
    async fn with_conn<T, F>(&self, op: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.connection().await?;
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| StoreError::LockPoisoned)?;
            op(&mut guard)
        })
        .await?
    }
}

/// Open the database file, apply the schema and seed an empty table
fn open_database(config: &Config, seed: &[PresetRecord]) -> StoreResult<Connection> {
    let path = config.sqlite_path();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| {
            StoreError::initialization(
                path.clone(),
                StoreError::CreateDirectory {
                    path: parent.to_path_buf(),
                    source,
                },
            )
        })?;
    }

    let mut conn =
        Connection::open(&path).map_err(|e| StoreError::initialization(path.clone(), e))?;
    conn.busy_timeout(config.busy_timeout())
        .map_err(|e| StoreError::initialization(path.clone(), e))?;

    if needs_init(&conn) {
        init_schema(&conn).map_err(|e| StoreError::initialization(path.clone(), e))?;
    }

    let seeded = repository::seed_if_empty(&mut conn, seed)
        .map_err(|e| StoreError::initialization(path.clone(), e))?;
    info!(path = %path.display(), seeded, "Opened preset database");

    Ok(conn)
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
