//! Shotbook Core Library
//!
//! Local storage for camera parameter presets: titled, illustrated
//! recipes of camera settings that users share and browse.
//!
//! # Architecture
//!
//! - **SQLite**: source of truth, one `camera_params` table
//! - **Cache**: an observable in-memory list that mirrors the database for
//!   fast, synchronous reads
//!
//! Writes always go to the database first; the cache follows only after
//! the write succeeded. Detail lookups consult the cache, then fall back
//! to the database.
//!
//! # Quick Start
//!
//! ```text
//! let library = Library::open(Config::load()?).await?;
//!
//! let draft = PresetDraft::new("Night walk", "Handheld at dusk", images, settings);
//! let preset = library.submit(draft, &session).await?;
//!
//! for preset in library.list().iter() {
//!     println!("{} {}", preset.id, preset.title);
//! }
//! ```
//!
//! # Modules
//!
//! - `library`: application root tying store and cache together (main entry point)
//! - `store`: async handle to the SQLite database
//! - `cache`: in-memory preset list
//! - `reconcile`: detail lookup with fallback, reinitialization
//! - `submit`: draft validation and record creation
//! - `session`: mock phone login
//! - `models`: preset records and camera settings
//! - `options`: selectable camera setting values
//! - `storage`: schema, row codec and SQL
//! - `config`: application configuration

pub mod cache;
pub mod config;
pub mod ids;
pub mod library;
pub mod models;
pub mod options;
pub mod reconcile;
pub mod seed;
pub mod session;
pub mod storage;
pub mod store;
pub mod submit;

pub use cache::PresetCache;
pub use config::Config;
pub use library::Library;
pub use models::{
    Author, CameraSettings, ExposureSettings, PresetPatch, PresetRecord, ShootMode, SoftLight,
    StyledSettings, Vignette,
};
pub use reconcile::{ReinitializeError, Resolution};
pub use session::{Session, User};
pub use storage::{CodecError, StoreError, StoreResult};
pub use store::{PresetStore, StoreStats};
pub use submit::{PresetDraft, SubmitError, ValidationError};
