//! Blocking SQLite access for presets
//!
//! Plain functions over a `rusqlite::Connection`. The async `PresetStore`
//! runs them on the blocking pool; tests call them directly.
//!
//! Multi-statement operations (seeding, reset, read-merge-write update) run
//! inside `BEGIN IMMEDIATE` transactions, so a second connection to the same
//! file waits instead of interleaving.

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use tracing::{debug, warn};

use crate::models::{PresetPatch, PresetRecord};
use crate::storage::codec::{self, PresetRow, COLUMNS};
use crate::storage::error::{is_primary_key_violation, StoreError, StoreResult};

/// All presets, newest first; equal timestamps fall back to id descending
///
/// With `skip_corrupt` a row that fails to decode is logged and left out;
/// otherwise the first corrupt row fails the whole read.
pub fn get_all(conn: &Connection, skip_corrupt: bool) -> StoreResult<Vec<PresetRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM camera_params ORDER BY created_at DESC, id DESC",
        COLUMNS
    ))?;

    let rows = stmt
        .query_map([], PresetRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        match codec::decode(row) {
            Ok(record) => records.push(record),
            Err(err) if skip_corrupt => {
                warn!(preset = err.preset_id(), "Skipping corrupt preset row: {}", err);
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(records)
}

/// A preset by id; `None` when absent
pub fn get_by_id(conn: &Connection, id: &str) -> StoreResult<Option<PresetRecord>> {
    let row = conn
        .query_row(
            &format!("SELECT {} FROM camera_params WHERE id = ?", COLUMNS),
            params![id],
            PresetRow::from_row,
        )
        .optional()?;

    match row {
        Some(row) => Ok(Some(codec::decode(row)?)),
        None => Ok(None),
    }
}

/// Insert a new preset; an existing id is rejected with `DuplicateKey`
pub fn insert(conn: &Connection, record: &PresetRecord) -> StoreResult<()> {
    let row = codec::encode(record)?;
    let result = conn.execute(
        r#"
        INSERT INTO camera_params
            (id, title, description, images, thumbnail, camera_settings, author_phone, author_nickname, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            row.id,
            row.title,
            row.description,
            row.images,
            row.thumbnail,
            row.camera_settings,
            row.author_phone,
            row.author_nickname,
            row.created_at,
        ],
    );

    match result {
        Ok(_) => Ok(()),
        Err(err) if is_primary_key_violation(&err) => Err(StoreError::DuplicateKey {
            id: record.id.clone(),
        }),
        Err(err) => Err(err.into()),
    }
}

/// Merge `patch` onto the stored preset
///
/// Returns `false` when no preset has this id. `created_at` is never rewritten.
pub fn update(conn: &mut Connection, id: &str, patch: PresetPatch) -> StoreResult<bool> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let Some(mut record) = get_by_id(&tx, id)? else {
        return Ok(false);
    };
    record.apply(patch);
    let row = codec::encode(&record)?;

    tx.execute(
        r#"
        UPDATE camera_params
        SET title = ?, description = ?, images = ?, thumbnail = ?, camera_settings = ?,
            author_phone = ?, author_nickname = ?
        WHERE id = ?
        "#,
        params![
            row.title,
            row.description,
            row.images,
            row.thumbnail,
            row.camera_settings,
            row.author_phone,
            row.author_nickname,
            id,
        ],
    )?;

    tx.commit()?;
    Ok(true)
}

/// Delete a preset; returns whether a row was removed
pub fn delete(conn: &Connection, id: &str) -> StoreResult<bool> {
    let changed = conn.execute("DELETE FROM camera_params WHERE id = ?", params![id])?;
    Ok(changed > 0)
}

/// Number of stored presets
pub fn count(conn: &Connection) -> StoreResult<i64> {
    conn.query_row("SELECT COUNT(*) FROM camera_params", [], |row| row.get(0))
        .map_err(Into::into)
}

/// Insert `seed` only if the table is empty
///
/// Count and inserts share one immediate transaction, so concurrent
/// callers cannot both observe an empty table. Returns how many presets
/// were inserted (0 when the table already had data).
pub fn seed_if_empty(conn: &mut Connection, seed: &[PresetRecord]) -> StoreResult<usize> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let existing = count(&tx)?;
    if existing > 0 {
        debug!(existing, "Presets already present, skipping seed");
        return Ok(0);
    }

    for record in seed {
        insert(&tx, record)?;
    }

    tx.commit()?;
    Ok(seed.len())
}

/// Replace every stored preset with `seed`
///
/// Clear and reseed commit together; any failure rolls both back and the
/// previous presets stay in place.
pub fn reset(conn: &mut Connection, seed: &[PresetRecord]) -> StoreResult<usize> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let cleared = tx.execute("DELETE FROM camera_params", [])?;
    debug!(cleared, "Cleared presets");

    for record in seed {
        insert(&tx, record)?;
    }

    tx.commit()?;
    Ok(seed.len())
}
