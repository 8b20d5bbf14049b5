//! Data models for SoundFlow
//!
//! Plain records shared by the persistence backends, the insight task and the
//! HTTP routes.

mod insight;
mod playlist;
mod track;
mod user;

pub use insight::Insight;
pub use playlist::{Playlist, PlaylistUpdate};
pub use track::{AudioUpload, Track, TrackMetadata, PLACEHOLDER_DURATION};
pub use user::{default_avatar_url, display_name_from_email, User};

pub(crate) use playlist::non_empty;
