//! Domain error types.
//!
//! Groups failures by component so callers can match on what went wrong.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while scanning a folder tree or listing a folder.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The requested root does not exist or is not a directory.
    #[error("not a directory: {0:?}")]
    NotADirectory(PathBuf),
    /// A directory listing failed outright (permissions, disappeared mid-scan).
    #[error("read directory {path:?}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by the audio output device.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The track file could not be opened.
    #[error("open {path:?}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The track file could not be decoded by the output backend.
    #[error("decode {path:?}: {reason}")]
    Decode { path: PathBuf, reason: String },
    /// The device rejected a new playback sink.
    #[error("output device unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised by playback engine operations before any thread is spawned.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// Requested track index is outside the playlist.
    #[error("track index {index} out of range (playlist has {len} tracks)")]
    IndexOutOfRange { index: usize, len: usize },
    /// Play was requested with no tracks loaded.
    #[error("playlist is empty")]
    EmptyPlaylist,
}

/// Errors raised by the track analysis collaborator.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The track could not be read for analysis.
    #[error("read track {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The analyzer does not understand the track format.
    #[error("unsupported track format: {0:?}")]
    Unsupported(PathBuf),
}
