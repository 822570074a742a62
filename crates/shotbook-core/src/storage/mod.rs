//! Storage layer
//!
//! SQLite persistence for presets.
//!
//! ## Layout
//!
//! - **schema**: table and index creation, schema version bookkeeping
//! - **codec**: conversion between `PresetRecord` and its row form
//! - **repository**: the SQL for each store operation, run on a borrowed
//!   connection
//! - **error**: typed errors for the codec and the store
//!
//! List-valued fields (images, camera settings) are stored as JSON text.
//! Timestamps are stored as RFC 3339 text with fixed precision so that
//! ordering by the column text orders by time.

pub mod codec;
pub mod error;
pub mod repository;
pub mod schema;

pub use error::{CodecError, StoreError, StoreResult};
pub use schema::{init_schema, needs_init, SCHEMA_VERSION};
