//! Error types for the Rekordbox track source

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RekordboxError>;

#[derive(Error, Debug)]
pub enum RekordboxError {
    /// Query or connection failure
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Playlist '{0}' not found")]
    PlaylistNotFound(String),

    #[error("Rekordbox database not found: {}", .0.display())]
    DatabaseNotFound(PathBuf),
}
