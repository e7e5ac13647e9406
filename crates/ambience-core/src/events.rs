//! In-process event bus for engine-side updates.
//!
//! Provides a lightweight channel the presentation layer subscribes to.

use std::path::PathBuf;

use crossbeam_channel::{Receiver, Sender};

use crate::status::PlaybackState;

/// Engine event payloads published to the presentation layer.
#[derive(Debug, Clone)]
pub enum PlayerEvent {
    /// Playlist contents or position changed.
    PlaylistChanged {
        tracks: Vec<PathBuf>,
        current_index: Option<usize>,
    },
    /// Engine lifecycle state changed.
    StateChanged(PlaybackState),
    /// A track could not be loaded into the output device.
    TrackFailed { path: PathBuf, reason: String },
}

#[derive(Clone)]
pub struct EventBus {
    sender: Sender<PlayerEvent>,
}

impl EventBus {
    /// Create a new event bus and the receiver the subscriber drains.
    pub fn new() -> (Self, Receiver<PlayerEvent>) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        (Self { sender }, receiver)
    }

    /// Notify the subscriber that the playlist has changed.
    pub fn playlist_changed(&self, tracks: Vec<PathBuf>, current_index: Option<usize>) {
        let _ = self.sender.send(PlayerEvent::PlaylistChanged {
            tracks,
            current_index,
        });
    }

    /// Notify the subscriber that the engine state changed.
    pub fn state_changed(&self, state: PlaybackState) {
        let _ = self.sender.send(PlayerEvent::StateChanged(state));
    }

    /// Notify the subscriber that a track failed to load.
    pub fn track_failed(&self, path: PathBuf, reason: String) {
        let _ = self.sender.send(PlayerEvent::TrackFailed { path, reason });
    }
}
