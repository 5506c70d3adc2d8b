//! Playlist playback from a small JSON library.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// On-disk shape of the music library.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Library {
    #[serde(default)]
    playlist: Vec<String>,
}

/// The user's playlist, persisted as JSON.
pub struct MusicLibrary {
    path: PathBuf,
    library: Library,
}

impl MusicLibrary {
    /// Load the library, starting empty if the file is missing or
    /// unreadable.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let library = std::fs::read_to_string(path)
            .ok()
            .and_then(|body| serde_json::from_str(&body).ok())
            .unwrap_or_default();
        Self {
            path: path.to_path_buf(),
            library,
        }
    }

    /// Add a song and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the library cannot be written.
    pub fn add_song(&mut self, song: &str) -> Result<()> {
        self.library.playlist.push(song.to_owned());
        self.persist()
    }

    /// Number of songs in the playlist.
    #[must_use]
    pub fn len(&self) -> usize {
        self.library.playlist.len()
    }

    /// Whether the playlist is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.library.playlist.is_empty()
    }

    /// Start the whole playlist.
    #[must_use]
    pub fn play_playlist(&self) -> String {
        if self.library.playlist.is_empty() {
            "Your playlist is empty.".to_owned()
        } else {
            debug!(songs = self.library.playlist.len(), "playing playlist");
            "Playing your entire playlist.".to_owned()
        }
    }

    /// Play one song, matched case-insensitively by substring.
    #[must_use]
    pub fn play_song(&self, requested: &str) -> String {
        let needle = requested.trim().to_lowercase();
        if needle.is_empty() {
            return "Please tell me which song to play.".to_owned();
        }
        self.library
            .playlist
            .iter()
            .find(|song| song.to_lowercase().contains(&needle))
            .map_or_else(
                || "Sorry, that song is not in your playlist.".to_owned(),
                |song| format!("Playing {song} from your playlist."),
            )
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_string_pretty(&self.library)
            .map_err(|e| crate::error::AssistantError::Io(e.into()))?;
        std::fs::write(&self.path, body)?;
        Ok(())
    }
}
