//! # djkr8 Rekordbox Source
//!
//! Loads playlists from a Rekordbox 6 library database and maps them to
//! optimizer [`Track`](djkr8_common::Track)s, converting key names to Camelot.

pub mod error;
pub mod keys;
pub mod library;

pub use error::{RekordboxError, Result};
pub use keys::to_camelot;
pub use library::{PlaylistInfo, RekordboxLibrary};
