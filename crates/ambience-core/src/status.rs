//! Shared playback status store and update helpers.
//!
//! The session thread writes transitions; everything else reads snapshots.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Lifecycle state of the playback engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    /// No session thread exists.
    #[default]
    Stopped,
    /// A session thread is driving the output device.
    Playing,
    /// A session thread exists but the device is suspended.
    Paused,
}

/// What happens when a track finishes or is skipped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RepeatMode {
    /// Play through the list once, then stop.
    #[default]
    None,
    /// Re-play the current track indefinitely.
    One,
    /// Wrap from the last track back to the first.
    All,
}

impl RepeatMode {
    /// Next mode in the cycle used by a single repeat toggle.
    pub fn cycle(self) -> RepeatMode {
        match self {
            RepeatMode::None => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::None,
        }
    }
}

/// Snapshot of playback state for observers.
#[derive(Clone, Debug, Default)]
pub struct PlayerStatus {
    /// Current engine lifecycle state.
    pub state: PlaybackState,
    /// Track driving the device, if any.
    pub now_playing: Option<PathBuf>,
    /// Active repeat mode.
    pub repeat: RepeatMode,
}

/// Shared store for the status snapshot.
#[derive(Clone, Default)]
pub struct StatusStore {
    inner: Arc<Mutex<PlayerStatus>>,
}

impl StatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy out the current status.
    pub fn snapshot(&self) -> PlayerStatus {
        match self.inner.lock() {
            Ok(s) => s.clone(),
            Err(_) => PlayerStatus::default(),
        }
    }

    pub fn on_track_start(&self, path: PathBuf) {
        if let Ok(mut s) = self.inner.lock() {
            s.state = PlaybackState::Playing;
            s.now_playing = Some(path);
        }
    }

    pub fn on_pause(&self) {
        if let Ok(mut s) = self.inner.lock() {
            s.state = PlaybackState::Paused;
        }
    }

    pub fn on_resume(&self) {
        if let Ok(mut s) = self.inner.lock() {
            s.state = PlaybackState::Playing;
        }
    }

    pub fn on_stop(&self) {
        if let Ok(mut s) = self.inner.lock() {
            s.state = PlaybackState::Stopped;
            s.now_playing = None;
        }
    }

    pub fn set_repeat(&self, mode: RepeatMode) {
        if let Ok(mut s) = self.inner.lock() {
            s.repeat = mode;
        }
    }

    /// Active repeat mode, read by the session at each advance decision.
    pub fn repeat(&self) -> RepeatMode {
        match self.inner.lock() {
            Ok(s) => s.repeat,
            Err(_) => RepeatMode::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_cycle_covers_all_modes() {
        assert_eq!(RepeatMode::None.cycle(), RepeatMode::All);
        assert_eq!(RepeatMode::All.cycle(), RepeatMode::One);
        assert_eq!(RepeatMode::One.cycle(), RepeatMode::None);
    }

    #[test]
    fn transitions_update_snapshot() {
        let store = StatusStore::new();
        assert_eq!(store.snapshot().state, PlaybackState::Stopped);

        store.on_track_start(PathBuf::from("/music/a.mp3"));
        let s = store.snapshot();
        assert_eq!(s.state, PlaybackState::Playing);
        assert_eq!(s.now_playing, Some(PathBuf::from("/music/a.mp3")));

        store.on_pause();
        assert_eq!(store.snapshot().state, PlaybackState::Paused);

        store.on_resume();
        assert_eq!(store.snapshot().state, PlaybackState::Playing);

        store.on_stop();
        let s = store.snapshot();
        assert_eq!(s.state, PlaybackState::Stopped);
        assert_eq!(s.now_playing, None);
    }

    #[test]
    fn set_repeat_is_visible_to_readers() {
        let store = StatusStore::new();
        assert_eq!(store.repeat(), RepeatMode::None);
        store.set_repeat(RepeatMode::All);
        assert_eq!(store.repeat(), RepeatMode::All);
        assert_eq!(store.snapshot().repeat, RepeatMode::All);
    }
}
