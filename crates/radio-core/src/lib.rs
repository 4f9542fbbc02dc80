//! Core of the santoplay radio client: station directory access, the
//! favorites/playlists library, and the playback controller.

pub mod config;
pub mod directory;
pub mod library;
pub mod platform;
pub mod playback;
pub mod station;
pub mod store;
pub mod text;
