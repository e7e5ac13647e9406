//! Track analysis collaborator interface (visualization data).
//!
//! Analysis itself happens outside this crate; the engine only defines the
//! contract and the profile shape the presentation layer consumes.

use std::path::Path;

use crate::error::AnalysisError;

/// Visualization data extracted from one track.
#[derive(Clone, Debug, Default)]
pub struct TrackProfile {
    /// Downsampled amplitude envelope, one value per display column.
    pub waveform: Vec<f32>,
    /// Per-window signal energy, aligned with `waveform`.
    pub energy: Vec<f32>,
    /// Estimated tempo, when the analyzer could derive one.
    pub tempo_bpm: Option<f32>,
}

/// Produces a visualization profile for a track.
pub trait TrackAnalyzer {
    fn analyze(&self, path: &Path) -> Result<TrackProfile, AnalysisError>;
}
