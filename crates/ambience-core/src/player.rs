//! Playback engine.
//!
//! Owns the playlist, the output device, and the single background session
//! thread that drives playback.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::error::{PlayerError, ScanError};
use crate::events::{EventBus, PlayerEvent};
use crate::library::TrackFilter;
use crate::output::AudioOutput;
use crate::playlist::Playlist;
use crate::status::{PlaybackState, PlayerStatus, RepeatMode, StatusStore};

/// Commands consumed by the session thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionCommand {
    /// Suspend the device, keeping the session alive.
    Pause,
    /// Resume a suspended device.
    Resume,
    /// Drop the current track and move to the next one per repeat mode.
    Skip,
    /// Halt the device, announce the stop, and end the session.
    Stop,
    /// Halt the device and end the session without status updates.
    StopSilent,
}

/// Handle to a running session thread.
struct PlaybackSession {
    cmd_tx: Sender<SessionCommand>,
    join: std::thread::JoinHandle<()>,
}

/// Proof that no session thread is running; playlist replacement requires it.
struct SessionStopped;

/// Cloneable handle to the playback engine.
///
/// All mutation goes through these methods. Observers read status snapshots
/// and drain the event receiver returned by [`Player::new`].
#[derive(Clone)]
pub struct Player {
    playlist: Arc<Mutex<Playlist>>,
    output: Arc<Mutex<dyn AudioOutput>>,
    status: StatusStore,
    events: EventBus,
    session: Arc<Mutex<Option<PlaybackSession>>>,
    filter: TrackFilter,
    poll_interval: Duration,
}

impl Player {
    /// Create an engine around an output device and hand back the event
    /// receiver for the presentation layer.
    pub fn new(
        output: impl AudioOutput + 'static,
        filter: TrackFilter,
        poll_interval: Duration,
    ) -> (Player, Receiver<PlayerEvent>) {
        let (events, receiver) = EventBus::new();
        let player = Player {
            playlist: Arc::new(Mutex::new(Playlist::new())),
            output: Arc::new(Mutex::new(output)),
            status: StatusStore::new(),
            events,
            session: Arc::new(Mutex::new(None)),
            filter,
            poll_interval,
        };
        (player, receiver)
    }

    /// Current status snapshot.
    pub fn status(&self) -> PlayerStatus {
        self.status.snapshot()
    }

    /// Snapshot of the playlist contents in play order.
    pub fn tracks(&self) -> Vec<PathBuf> {
        self.playlist.lock().unwrap().tracks().to_vec()
    }

    /// Stop playback, then replace the playlist with the folder's tracks.
    ///
    /// On a listing failure the playlist is left empty and the error is
    /// returned for the caller to report.
    pub fn load_folder(&self, folder: &Path) -> Result<usize, ScanError> {
        let mut session = self.session.lock().unwrap();
        let stopped = end_session(&mut session);
        self.replace_tracks(stopped, folder)
    }

    /// Start playback at a playlist index.
    ///
    /// Any running session is replaced; its thread is joined before the new
    /// one starts, so only one session ever drives the device.
    pub fn play_from_index(&self, index: usize) -> Result<(), PlayerError> {
        let mut session = self.session.lock().unwrap();
        {
            let playlist = self.playlist.lock().unwrap();
            if playlist.is_empty() {
                return Err(PlayerError::EmptyPlaylist);
            }
            if index >= playlist.len() {
                return Err(PlayerError::IndexOutOfRange {
                    index,
                    len: playlist.len(),
                });
            }
        }
        let _stopped = end_session_silent(&mut session);
        let path = {
            let mut playlist = self.playlist.lock().unwrap();
            match playlist.set_current(index) {
                Some(path) => path.to_path_buf(),
                None => {
                    return Err(PlayerError::IndexOutOfRange {
                        index,
                        len: playlist.len(),
                    });
                }
            }
        };
        tracing::debug!(index, track = %path.display(), "starting playback session");
        *session = Some(self.spawn_session(path));
        Ok(())
    }

    /// Start playback at the cursor position.
    pub fn play(&self) -> Result<(), PlayerError> {
        let index = {
            let playlist = self.playlist.lock().unwrap();
            if playlist.is_empty() {
                return Err(PlayerError::EmptyPlaylist);
            }
            playlist.current_index()
        };
        self.play_from_index(index)
    }

    /// Suspend playback; no effect unless something is playing.
    pub fn pause(&self) {
        self.send(SessionCommand::Pause);
    }

    /// Resume suspended playback; no effect unless paused.
    pub fn resume(&self) {
        self.send(SessionCommand::Resume);
    }

    /// Jump to the track that follows under the repeat mode.
    pub fn skip_to_next(&self) {
        self.send(SessionCommand::Skip);
    }

    /// Stop playback and clear the current track.
    ///
    /// Returns only after the session thread has terminated; calling this
    /// while already stopped does nothing.
    pub fn stop(&self) {
        let mut session = self.session.lock().unwrap();
        end_session(&mut session);
    }

    /// Re-randomize the playlist order; a playing track stays current and
    /// playback is not interrupted.
    pub fn shuffle(&self) {
        let mut playlist = self.playlist.lock().unwrap();
        playlist.shuffle();
        let current = if playlist.current_track().is_some() {
            Some(playlist.current_index())
        } else {
            None
        };
        self.events
            .playlist_changed(playlist.tracks().to_vec(), current);
    }

    /// Set the repeat mode; read at the next advance decision.
    pub fn set_repeat(&self, mode: RepeatMode) {
        self.status.set_repeat(mode);
    }

    /// Advance the repeat mode one step and return the new mode.
    pub fn cycle_repeat(&self) -> RepeatMode {
        let next = self.status.repeat().cycle();
        self.status.set_repeat(next);
        next
    }

    fn send(&self, cmd: SessionCommand) {
        let session = self.session.lock().unwrap();
        if let Some(sess) = session.as_ref() {
            let _ = sess.cmd_tx.send(cmd);
        }
    }

    fn replace_tracks(&self, _stopped: SessionStopped, folder: &Path) -> Result<usize, ScanError> {
        let mut playlist = self.playlist.lock().unwrap();
        playlist.clear();
        let result = playlist.load(folder, &self.filter);
        self.events.playlist_changed(playlist.tracks().to_vec(), None);
        let count = match result {
            Ok(count) => count,
            Err(err) => {
                tracing::warn!(folder = %folder.display(), error = %err, "playlist load failed");
                return Err(err);
            }
        };
        tracing::info!(folder = %folder.display(), tracks = count, "playlist loaded");
        Ok(count)
    }

    fn spawn_session(&self, first_track: PathBuf) -> PlaybackSession {
        let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded();
        let ctx = SessionContext {
            playlist: self.playlist.clone(),
            output: self.output.clone(),
            status: self.status.clone(),
            events: self.events.clone(),
            poll_interval: self.poll_interval,
        };
        let join = std::thread::spawn(move || session_main(ctx, first_track, cmd_rx));
        PlaybackSession { cmd_tx, join }
    }
}

/// End the active session, if any, and join its thread.
///
/// The session announces the stop through status and events before exiting.
fn end_session(session: &mut Option<PlaybackSession>) -> SessionStopped {
    if let Some(sess) = session.take() {
        let _ = sess.cmd_tx.send(SessionCommand::Stop);
        let _ = sess.join.join();
    }
    SessionStopped
}

/// End the active session without status updates, for session replacement.
fn end_session_silent(session: &mut Option<PlaybackSession>) -> SessionStopped {
    if let Some(sess) = session.take() {
        let _ = sess.cmd_tx.send(SessionCommand::StopSilent);
        let _ = sess.join.join();
    }
    SessionStopped
}

/// Everything a session thread needs from the engine.
struct SessionContext {
    playlist: Arc<Mutex<Playlist>>,
    output: Arc<Mutex<dyn AudioOutput>>,
    status: StatusStore,
    events: EventBus,
    poll_interval: Duration,
}

/// Drive the output device for one play session.
///
/// The device is touched only from this thread for the session's lifetime;
/// the engine joins the thread before starting another session.
fn session_main(ctx: SessionContext, first_track: PathBuf, cmd_rx: Receiver<SessionCommand>) {
    let mut paused = false;

    if !load_and_start(&ctx, &first_track) {
        return;
    }
    ctx.events.state_changed(PlaybackState::Playing);

    loop {
        match cmd_rx.recv_timeout(ctx.poll_interval) {
            Ok(SessionCommand::Pause) => {
                if !paused {
                    paused = true;
                    ctx.output.lock().unwrap().pause();
                    ctx.status.on_pause();
                    ctx.events.state_changed(PlaybackState::Paused);
                }
            }
            Ok(SessionCommand::Resume) => {
                if paused {
                    paused = false;
                    ctx.output.lock().unwrap().resume();
                    ctx.status.on_resume();
                    ctx.events.state_changed(PlaybackState::Playing);
                }
            }
            Ok(SessionCommand::Skip) => {
                ctx.output.lock().unwrap().stop();
                let was_paused = paused;
                paused = false;
                if !advance_to_next(&ctx) {
                    return;
                }
                if was_paused {
                    ctx.events.state_changed(PlaybackState::Playing);
                }
            }
            Ok(SessionCommand::Stop) => {
                ctx.output.lock().unwrap().stop();
                ctx.playlist.lock().unwrap().clear_current();
                ctx.status.on_stop();
                ctx.events.state_changed(PlaybackState::Stopped);
                return;
            }
            Ok(SessionCommand::StopSilent) => {
                ctx.output.lock().unwrap().stop();
                return;
            }
            Err(RecvTimeoutError::Timeout) => {
                if paused {
                    continue;
                }
                let busy = ctx.output.lock().unwrap().is_busy();
                if !busy && !advance_to_next(&ctx) {
                    return;
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                // Every engine handle is gone; halt the device and bail.
                ctx.output.lock().unwrap().stop();
                return;
            }
        }
    }
}

/// Move the cursor to the track that follows under the repeat mode and start
/// it. Returns `false` when the playlist is exhausted or the device rejected
/// the track, both of which end the session.
fn advance_to_next(ctx: &SessionContext) -> bool {
    let next = {
        let mut playlist = ctx.playlist.lock().unwrap();
        match playlist.advance(ctx.status.repeat()) {
            Some(index) => playlist.set_current(index).map(Path::to_path_buf),
            None => None,
        }
    };
    match next {
        Some(path) => load_and_start(ctx, &path),
        None => {
            tracing::debug!("playlist exhausted");
            ctx.output.lock().unwrap().stop();
            ctx.playlist.lock().unwrap().clear_current();
            ctx.status.on_stop();
            ctx.events.state_changed(PlaybackState::Stopped);
            false
        }
    }
}

/// Load one track into the device and start it.
///
/// A device failure is announced through `TrackFailed`, reverts the engine
/// to stopped, and ends the session.
fn load_and_start(ctx: &SessionContext, path: &Path) -> bool {
    let result = {
        let mut output = ctx.output.lock().unwrap();
        match output.load(path) {
            Ok(()) => {
                output.play();
                Ok(())
            }
            Err(err) => Err(err),
        }
    };
    match result {
        Ok(()) => {
            ctx.status.on_track_start(path.to_path_buf());
            let (tracks, index) = {
                let playlist = ctx.playlist.lock().unwrap();
                (playlist.tracks().to_vec(), playlist.current_index())
            };
            ctx.events.playlist_changed(tracks, Some(index));
            tracing::info!(track = %path.display(), "playback started");
            true
        }
        Err(err) => {
            tracing::warn!(track = %path.display(), error = %err, "failed to start track");
            ctx.events.track_failed(path.to_path_buf(), err.to_string());
            ctx.playlist.lock().unwrap().clear_current();
            ctx.status.on_stop();
            ctx.events.state_changed(PlaybackState::Stopped);
            false
        }
    }
}
