//! Audio output device abstraction.
//!
//! The engine drives playback through this seam; the real implementation
//! wraps a rodio sink, tests substitute scripted fakes.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rodio::{Decoder, OutputStreamHandle, Sink};

use crate::error::DeviceError;

/// Playback surface of the output device.
///
/// At most one session thread drives an implementation at any instant.
pub trait AudioOutput: Send {
    /// Prepare a track for playback without starting it.
    fn load(&mut self, path: &Path) -> Result<(), DeviceError>;
    /// Start playback of the loaded track.
    fn play(&mut self);
    /// Suspend playback, keeping position.
    fn pause(&mut self);
    /// Resume suspended playback.
    fn resume(&mut self);
    /// Halt playback and discard the loaded track.
    fn stop(&mut self);
    /// Whether the loaded track has audio left to produce.
    fn is_busy(&self) -> bool;
}

/// `AudioOutput` backed by a rodio sink.
///
/// One stream handle is captured at construction. Each loaded track gets a
/// fresh sink because a stopped sink cannot be restarted; the sink starts
/// paused so `play` controls when audio begins.
pub struct RodioOutput {
    handle: OutputStreamHandle,
    sink: Option<Sink>,
}

impl RodioOutput {
    pub fn new(handle: OutputStreamHandle) -> Self {
        Self { handle, sink: None }
    }
}

impl AudioOutput for RodioOutput {
    fn load(&mut self, path: &Path) -> Result<(), DeviceError> {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        let file = File::open(path).map_err(|source| DeviceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let source = Decoder::new(BufReader::new(file)).map_err(|err| DeviceError::Decode {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        let sink = Sink::try_new(&self.handle)
            .map_err(|err| DeviceError::Unavailable(err.to_string()))?;
        sink.pause();
        sink.append(source);
        self.sink = Some(sink);
        Ok(())
    }

    fn play(&mut self) {
        if let Some(sink) = self.sink.as_ref() {
            sink.play();
        }
    }

    fn pause(&mut self) {
        if let Some(sink) = self.sink.as_ref() {
            sink.pause();
        }
    }

    fn resume(&mut self) {
        if let Some(sink) = self.sink.as_ref() {
            sink.play();
        }
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    fn is_busy(&self) -> bool {
        self.sink.as_ref().map(|sink| !sink.empty()).unwrap_or(false)
    }
}
