//! Playlist state and navigation.
//!
//! Holds the shuffled track order for one folder and decides which track
//! comes next under the active repeat mode.

use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;

use crate::error::ScanError;
use crate::library::{self, TrackFilter};
use crate::status::RepeatMode;

/// Ordered track list with a cursor.
///
/// Whenever a current track is defined, `tracks[current_index]` is that
/// track; reordering operations preserve this.
#[derive(Debug, Default)]
pub struct Playlist {
    tracks: Vec<PathBuf>,
    current_index: usize,
    current_track: Option<PathBuf>,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a playlist from an explicit track order, cursor at the start.
    pub fn from_tracks(tracks: Vec<PathBuf>) -> Self {
        Self {
            tracks,
            current_index: 0,
            current_track: None,
        }
    }

    /// Replace the playlist with the folder's tracks in a fresh random order.
    ///
    /// Returns the number of tracks loaded; zero leaves the playlist empty
    /// and play requests will be rejected until another folder is loaded.
    pub fn load(&mut self, folder: &Path, filter: &TrackFilter) -> Result<usize, ScanError> {
        let mut tracks = library::list_tracks(folder, filter)?;
        tracks.shuffle(&mut rand::thread_rng());
        self.tracks = tracks;
        self.current_index = 0;
        self.current_track = None;
        Ok(self.tracks.len())
    }

    /// Re-randomize the order, keeping the cursor on the current track.
    pub fn shuffle(&mut self) {
        if self.tracks.len() < 2 {
            return;
        }
        self.tracks.shuffle(&mut rand::thread_rng());
        if let Some(current) = self.current_track.as_ref() {
            if let Some(index) = self.tracks.iter().position(|track| track == current) {
                self.current_index = index;
            }
        }
    }

    /// Drop all tracks and undefine the current track.
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.current_index = 0;
        self.current_track = None;
    }

    /// Move the cursor and define the current track.
    pub fn set_current(&mut self, index: usize) -> Option<&Path> {
        if index >= self.tracks.len() {
            return None;
        }
        self.current_index = index;
        self.current_track = Some(self.tracks[index].clone());
        Some(self.tracks[index].as_path())
    }

    /// Undefine the current track; the cursor keeps its position so playback
    /// can resume from the same spot.
    pub fn clear_current(&mut self) {
        self.current_track = None;
    }

    /// Index of the track that follows the cursor under `repeat`, or `None`
    /// when the playlist is exhausted.
    pub fn advance(&self, repeat: RepeatMode) -> Option<usize> {
        if self.tracks.is_empty() {
            return None;
        }
        match repeat {
            RepeatMode::One => Some(self.current_index),
            RepeatMode::All => Some((self.current_index + 1) % self.tracks.len()),
            RepeatMode::None => {
                let next = self.current_index + 1;
                if next < self.tracks.len() {
                    Some(next)
                } else {
                    None
                }
            }
        }
    }

    pub fn tracks(&self) -> &[PathBuf] {
        self.tracks.as_slice()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_track(&self) -> Option<&Path> {
        self.current_track.as_deref()
    }
}
