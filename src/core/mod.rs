//! Library views built on the persistence facade

pub mod playlistlib;
pub mod trackslib;

pub use playlistlib::{PlaylistDetail, PlaylistLib};
pub use trackslib::{LibraryStats, TrackSummary, TracksLib};
