//! In-memory preset cache
//!
//! `PresetCache` mirrors the store for the UI: reads are synchronous
//! snapshots, `refresh()` reloads from the store, and `add`/`remove` apply
//! local changes after a successful store write. The cache is never the
//! source of truth.
//!
//! Snapshots are published through a `tokio::sync::watch` channel so views
//! can `subscribe()` and redraw when the list changes.
//!
//! Every refresh and every local change draws a ticket from one counter.
//! A refresh that finishes after a later-issued refresh has been applied is
//! dropped. Local changes made while a refresh is in flight are journaled
//! and replayed onto its result, so a slow refresh never undoes them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::debug;

use crate::ids::newest_first;
use crate::models::PresetRecord;
use crate::storage::StoreResult;
use crate::store::PresetStore;

/// An immutable view of the cached presets, newest first
pub type Snapshot = Arc<Vec<PresetRecord>>;

/// A local change, kept for replay onto refreshes still in flight
#[derive(Debug, Clone)]
enum Change {
    Add(PresetRecord),
    Backfill(PresetRecord),
    Remove(String),
}

impl Change {
    fn apply_to(&self, list: &mut Vec<PresetRecord>) -> bool {
        match self {
            Change::Add(record) => {
                list.retain(|p| p.id != record.id);
                list.insert(0, record.clone());
                true
            }
            Change::Backfill(record) => {
                list.retain(|p| p.id != record.id);
                let position = list
                    .iter()
                    .position(|p| newest_first(record, p).is_lt())
                    .unwrap_or(list.len());
                list.insert(position, record.clone());
                true
            }
            Change::Remove(id) => {
                let before = list.len();
                list.retain(|p| &p.id != id);
                list.len() != before
            }
        }
    }
}

#[derive(Debug, Default)]
struct Tickets {
    /// Last ticket handed out
    issued: u64,
    /// Ticket of the most recently issued refresh
    latest_refresh: u64,
    /// Ticket of the most recently applied refresh
    applied: u64,
    /// Ticket of the latest change that may have dropped presets
    last_removal: u64,
    /// Changes newer than `applied`, while a newer refresh is pending
    journal: Vec<(u64, Change)>,
}

impl Tickets {
    fn next(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    fn refresh_pending(&self) -> bool {
        self.latest_refresh > self.applied
    }
}

/// Observable, in-memory list of presets
pub struct PresetCache {
    tx: watch::Sender<Snapshot>,
    tickets: Mutex<Tickets>,
    /// Whether a refresh has ever been applied
    loaded: AtomicBool,
}

impl Default for PresetCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PresetCache {
    /// Create an empty, not yet loaded cache
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Arc::new(Vec::new()));
        Self {
            tx,
            tickets: Mutex::new(Tickets::default()),
            loaded: AtomicBool::new(false),
        }
    }

    /// Current snapshot
    pub fn list(&self) -> Snapshot {
        Arc::clone(&self.tx.borrow())
    }

    pub fn len(&self) -> usize {
        self.tx.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.borrow().is_empty()
    }

    /// Whether any wholesale load has been applied yet
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// Receive every new snapshot
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.tx.subscribe()
    }

    /// Look up a cached preset; never consults the store
    pub fn find_by_id(&self, id: &str) -> Option<PresetRecord> {
        self.tx.borrow().iter().find(|p| p.id == id).cloned()
    }

    /// Reload the snapshot from the store
    ///
    /// Returns the number of presets now cached. If a later-issued refresh
    /// already landed, this result is discarded and the current length is
    /// returned.
    pub async fn refresh(&self, store: &PresetStore) -> StoreResult<usize> {
        let ticket = self.issue_refresh();
        let records = store.get_all().await?;

        if self.apply(ticket, records) {
            let count = self.len();
            debug!(count, "Refreshed preset cache");
            Ok(count)
        } else {
            debug!(ticket, "Discarded stale preset refresh");
            Ok(self.len())
        }
    }

    /// Replace the whole snapshot, e.g. with a list fetched elsewhere
    pub fn replace(&self, records: Vec<PresetRecord>) {
        let ticket = self.issue_refresh();
        self.apply(ticket, records);
    }

    /// Put a freshly created preset at the head of the list
    ///
    /// A cached preset with the same id is dropped first.
    pub fn add(&self, record: PresetRecord) {
        self.change(Change::Add(record));
    }

    /// Insert a preset at its sorted position, replacing any copy with the same id
    pub fn backfill(&self, record: PresetRecord) {
        self.change(Change::Backfill(record));
    }

    /// Mark taken before reading a preset from the store
    ///
    /// Pass it to [`backfill_since`](Self::backfill_since) once the read
    /// returns.
    pub fn mark(&self) -> u64 {
        self.lock_tickets().issued
    }

    /// Backfill a preset read from the store after `mark` was taken
    ///
    /// Skipped when a removal or wholesale replacement happened since the
    /// mark, as the read may predate it. Returns whether the preset was
    /// inserted.
    pub fn backfill_since(&self, mark: u64, record: PresetRecord) -> bool {
        let mut inserted = false;
        self.tx.send_if_modified(|snapshot| {
            let mut tickets = self.lock_tickets();
            if tickets.last_removal > mark {
                return false;
            }
            let change = Change::Backfill(record);
            inserted = change.apply_to(Arc::make_mut(snapshot));
            Self::journal(&mut tickets, change);
            inserted
        });
        if !inserted {
            debug!(mark, "Skipped backfill, cache changed during read");
        }
        inserted
    }

    /// Drop a preset; returns whether it was cached
    pub fn remove(&self, id: &str) -> bool {
        self.change(Change::Remove(id.to_string()))
    }

    fn lock_tickets(&self) -> MutexGuard<'_, Tickets> {
        self.tickets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn issue_refresh(&self) -> u64 {
        let mut tickets = self.lock_tickets();
        let ticket = tickets.next();
        tickets.latest_refresh = ticket;
        ticket
    }

    fn journal(tickets: &mut Tickets, change: Change) {
        let ticket = tickets.next();
        if matches!(change, Change::Remove(_)) {
            tickets.last_removal = ticket;
        }
        if tickets.refresh_pending() {
            tickets.journal.push((ticket, change));
        } else {
            tickets.journal.clear();
        }
    }

    /// Apply a local change and publish it if the list changed
    fn change(&self, change: Change) -> bool {
        self.tx.send_if_modified(|snapshot| {
            let mut tickets = self.lock_tickets();
            let modified = change.apply_to(Arc::make_mut(snapshot));
            Self::journal(&mut tickets, change);
            modified
        })
    }

    /// Install `records` unless a newer refresh was already applied
    ///
    /// Local changes issued after `ticket` are replayed on top.
    fn apply(&self, ticket: u64, mut records: Vec<PresetRecord>) -> bool {
        let applied = self.tx.send_if_modified(|snapshot| {
            let mut tickets = self.lock_tickets();
            if ticket <= tickets.applied {
                return false;
            }
            for (_, change) in tickets.journal.iter().filter(|(t, _)| *t > ticket) {
                change.apply_to(&mut records);
            }
            tickets.journal.retain(|(t, _)| *t > ticket);
            tickets.applied = ticket;
            tickets.last_removal = tickets.last_removal.max(ticket);
            *snapshot = Arc::new(records);
            true
        });
        if applied {
            self.loaded.store(true, Ordering::Release);
        }
        applied
    }
}
