//! Read-only access to a Rekordbox 6 library database
//!
//! Works on an unencrypted SQLite copy of `master.db` (for example one
//! exported with `pyrekordbox` or `sqlcipher`). Tables used:
//! `djmdPlaylist`, `djmdSongPlaylist`, `djmdContent`, `djmdArtist`, `djmdKey`.

use crate::error::{RekordboxError, Result};
use crate::keys::to_camelot;
use djkr8_common::Track;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, warn};

/// `djmdPlaylist.Attribute` for folders
const ATTRIBUTE_FOLDER: i64 = 1;

/// Rekordbox stores most tempos as BPM × 100
const BPM_SCALE_THRESHOLD: f64 = 200.0;

/// Playlist summary for listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistInfo {
    pub id: String,
    pub name: String,
    /// Folder path joined with `/`, ending in the playlist name
    pub path: String,
    pub track_count: i64,
}

/// One row of `djmdPlaylist`
#[derive(Debug, Clone)]
struct PlaylistRow {
    id: String,
    name: String,
    parent_id: Option<String>,
    attribute: i64,
}

/// Content row joined with artist and key names
#[derive(Debug, Clone, sqlx::FromRow)]
struct ContentRow {
    title: Option<String>,
    artist: Option<String>,
    bpm: Option<f64>,
    key_name: Option<String>,
    rating: Option<i64>,
    length: Option<f64>,
}

/// Handle to an opened library
pub struct RekordboxLibrary {
    pool: SqlitePool,
}

impl RekordboxLibrary {
    /// Open a library database read-only
    pub async fn open(db_path: &Path) -> Result<Self> {
        if !db_path.exists() {
            return Err(RekordboxError::DatabaseNotFound(db_path.to_path_buf()));
        }

        // mode=ro: never write to the user's library
        let db_url = format!("sqlite://{}?mode=ro", db_path.display());
        let pool = SqlitePool::connect(&db_url).await?;
        debug!("Opened Rekordbox library {}", db_path.display());
        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All playlists except folders and the root node
    pub async fn list_playlists(&self) -> Result<Vec<PlaylistInfo>> {
        let rows = self.playlist_rows().await?;
        let by_id: HashMap<&str, &PlaylistRow> = rows.iter().map(|r| (r.id.as_str(), r)).collect();

        let counts: HashMap<String, i64> = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT PlaylistID, COUNT(*)
            FROM djmdSongPlaylist
            GROUP BY PlaylistID
            "#,
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .collect();

        let playlists = rows
            .iter()
            .filter(|r| r.attribute != ATTRIBUTE_FOLDER && r.name != "ROOT")
            .map(|r| PlaylistInfo {
                id: r.id.clone(),
                name: r.name.clone(),
                path: playlist_path(r, &by_id),
                track_count: counts.get(&r.id).copied().unwrap_or(0),
            })
            .collect();
        Ok(playlists)
    }

    /// Tracks of the first playlist named `playlist_name`, in playlist order
    ///
    /// Tracks without a usable key or tempo are skipped with a warning, as
    /// are repeated entries of the same track.
    pub async fn get_tracks(&self, playlist_name: &str) -> Result<Vec<Track>> {
        let playlist_id = self
            .playlist_rows()
            .await?
            .into_iter()
            .find(|r| r.name == playlist_name && r.attribute != ATTRIBUTE_FOLDER)
            .map(|r| r.id)
            .ok_or_else(|| RekordboxError::PlaylistNotFound(playlist_name.to_string()))?;

        let rows = sqlx::query_as::<_, ContentRow>(
            r#"
            SELECT
                c.Title AS title,
                a.Name AS artist,
                CAST(c.BPM AS REAL) AS bpm,
                k.ScaleName AS key_name,
                CAST(c.Rating AS INTEGER) AS rating,
                CAST(c.Length AS REAL) AS length
            FROM djmdSongPlaylist sp
            JOIN djmdContent c ON c.ID = sp.ContentID
            LEFT JOIN djmdArtist a ON a.ID = c.ArtistID
            LEFT JOIN djmdKey k ON k.ID = c.KeyID
            WHERE sp.PlaylistID = ?
            ORDER BY sp.TrackNo ASC
            "#,
        )
        .bind(&playlist_id)
        .fetch_all(&self.pool)
        .await?;

        let total = rows.len();
        let mut seen = HashSet::new();
        let mut tracks = Vec::with_capacity(total);
        for row in rows {
            let Some(track) = track_from_row(row) else {
                continue;
            };
            if !seen.insert(track.id().to_string()) {
                warn!("Skipping repeated track {}", track.id());
                continue;
            }
            tracks.push(track);
        }

        debug!(
            playlist = playlist_name,
            loaded = tracks.len(),
            skipped = total - tracks.len(),
            "Loaded Rekordbox playlist"
        );
        Ok(tracks)
    }

    async fn playlist_rows(&self) -> Result<Vec<PlaylistRow>> {
        let rows = sqlx::query_as::<_, (String, Option<String>, Option<String>, Option<i64>)>(
            r#"
            SELECT ID, Name, ParentID, Attribute
            FROM djmdPlaylist
            ORDER BY Seq ASC, ID ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, parent_id, attribute)| PlaylistRow {
                id,
                name: name.unwrap_or_default(),
                parent_id,
                attribute: attribute.unwrap_or(0),
            })
            .collect())
    }
}

/// `Folder/Sub/Name`, stopping at the root or at a dangling parent
fn playlist_path(row: &PlaylistRow, by_id: &HashMap<&str, &PlaylistRow>) -> String {
    let mut parts = vec![row.name.as_str()];
    let mut parent = row.parent_id.as_deref();
    while let Some(id) = parent {
        let Some(folder) = by_id.get(id) else {
            break;
        };
        if folder.name == "ROOT" || parts.len() > by_id.len() {
            break;
        }
        parts.push(folder.name.as_str());
        parent = folder.parent_id.as_deref();
    }
    parts.reverse();
    parts.join("/")
}

fn track_from_row(row: ContentRow) -> Option<Track> {
    let title = row.title.filter(|t| !t.is_empty()).unwrap_or_else(|| "Unknown".to_string());
    let artist = row.artist.filter(|a| !a.is_empty()).unwrap_or_else(|| "Unknown".to_string());
    let id = format!("{} - {}", artist, title);

    let raw_bpm = row.bpm.unwrap_or(0.0);
    let bpm = if raw_bpm > BPM_SCALE_THRESHOLD {
        raw_bpm / 100.0
    } else {
        raw_bpm
    };
    let key_name = row.key_name.unwrap_or_default();

    let Some(key) = to_camelot(&key_name) else {
        warn!("Skipping track {}: missing or unknown key ({:?})", id, key_name);
        return None;
    };
    if bpm <= 0.0 {
        warn!("Skipping track {}: missing BPM", id);
        return None;
    }

    let mut track = match Track::new(id.clone(), &key.to_string(), bpm) {
        Ok(track) => track.with_title(title),
        Err(e) => {
            warn!("Skipping track {}: {}", id, e);
            return None;
        }
    };
    if let Some(rating) = row.rating {
        track = track.with_energy(rating.clamp(0, i64::from(u8::MAX)) as u8);
    }
    if let Some(length) = row.length.filter(|l| *l > 0.0) {
        track = track.with_duration(length);
    }
    Some(track)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(title: &str, bpm: Option<f64>, key: Option<&str>) -> ContentRow {
        ContentRow {
            title: Some(title.to_string()),
            artist: Some("Artist".to_string()),
            bpm,
            key_name: key.map(str::to_string),
            rating: Some(3),
            length: Some(245.0),
        }
    }

    #[test]
    fn test_scaled_bpm_is_rescaled() {
        let track = track_from_row(row("One", Some(12800.0), Some("Am"))).unwrap();
        assert_eq!(track.bpm(), 128.0);
        assert_eq!(track.id(), "Artist - One");
        assert_eq!(track.key().to_string(), "8A");
        assert_eq!(track.energy(), Some(3));
        assert_eq!(track.duration(), Some(245.0));
        assert_eq!(track.title(), Some("One"));
    }

    #[test]
    fn test_plain_bpm_kept() {
        let track = track_from_row(row("Two", Some(174.0), Some("10A"))).unwrap();
        assert_eq!(track.bpm(), 174.0);
    }

    #[test]
    fn test_missing_fields_skip() {
        assert!(track_from_row(row("NoKey", Some(12000.0), None)).is_none());
        assert!(track_from_row(row("BadKey", Some(12000.0), Some("H#"))).is_none());
        assert!(track_from_row(row("NoBpm", None, Some("Am"))).is_none());
        assert!(track_from_row(row("ZeroBpm", Some(0.0), Some("Am"))).is_none());
    }

    #[test]
    fn test_playlist_path_walks_folders() {
        let rows = vec![
            PlaylistRow { id: "1".into(), name: "ROOT".into(), parent_id: None, attribute: 1 },
            PlaylistRow { id: "2".into(), name: "House".into(), parent_id: Some("1".into()), attribute: 1 },
            PlaylistRow { id: "3".into(), name: "Deep".into(), parent_id: Some("2".into()), attribute: 0 },
            PlaylistRow { id: "4".into(), name: "Loose".into(), parent_id: Some("root".into()), attribute: 0 },
        ];
        let by_id: HashMap<&str, &PlaylistRow> = rows.iter().map(|r| (r.id.as_str(), r)).collect();
        assert_eq!(playlist_path(&rows[2], &by_id), "House/Deep");
        assert_eq!(playlist_path(&rows[3], &by_id), "Loose");
    }
}
