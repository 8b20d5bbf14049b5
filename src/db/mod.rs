//! Database module for SoundFlow
//!
//! The local emulation keeps its snapshots in SQLite through SQLx.

mod engine;
mod local_storage;

pub use engine::DbEngine;
pub use local_storage::{LocalStorageTable, PLAYLISTS_KEY, TRACKS_KEY, USER_KEY};
