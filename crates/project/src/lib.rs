mod load;
mod save;

use faderport_transport::{CENTER_PAN, DEFAULT_FADER, clamp_unit};
use serde::{Deserialize, Serialize};

pub use load::{SnapshotMetadata, import_snapshot_json, load_snapshot, load_snapshot_metadata};
pub use save::{export_snapshot_json, save_snapshot};

/// Every snapshot must describe exactly this many tracks.
pub const SNAPSHOT_TRACK_COUNT: usize = faderport_transport::TRACK_COUNT;

/// Plugin chain a fresh session starts with.
pub const DEFAULT_PLUGIN: &str = "Blue Cat PatchWork";

/// On-disk form of the whole session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub tracks: Vec<TrackData>,
    #[serde(default)]
    pub plugins: Vec<String>,
    pub transport: TransportData,
    #[serde(default)]
    pub settings: Settings,
    /// Export time, RFC 3339. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackData {
    pub name: String,
    pub fader: f32,
    pub muted: bool,
    #[serde(default)]
    pub solo: bool,
    #[serde(default = "center_pan")]
    pub pan: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportData {
    pub playing: bool,
    pub recording: bool,
    #[serde(default, rename = "loop")]
    pub loop_enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub audio_sample_rate: u32,
    pub buffer_size: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            audio_sample_rate: 44100,
            buffer_size: 512,
        }
    }
}

fn center_pan() -> f32 {
    CENTER_PAN
}

impl Default for SessionSnapshot {
    /// Sixteen "Track N" strips at half gain, centred, nothing muted or
    /// soloed, transport stopped.
    fn default() -> Self {
        Self {
            tracks: (1..=SNAPSHOT_TRACK_COUNT)
                .map(|n| TrackData {
                    name: format!("Track {n}"),
                    fader: DEFAULT_FADER,
                    muted: false,
                    solo: false,
                    pan: center_pan(),
                })
                .collect(),
            plugins: vec![DEFAULT_PLUGIN.to_string()],
            transport: TransportData::default(),
            settings: Settings::default(),
            timestamp: None,
        }
    }
}

impl SessionSnapshot {
    /// Check the track count and pull out-of-range levels back into 0.0..=1.0.
    pub fn validate(mut self) -> Result<Self, ProjectError> {
        if self.tracks.len() != SNAPSHOT_TRACK_COUNT {
            return Err(ProjectError::TrackCount {
                expected: SNAPSHOT_TRACK_COUNT,
                found: self.tracks.len(),
            });
        }

        for track in &mut self.tracks {
            track.fader = clamp_unit(track.fader, DEFAULT_FADER);
            track.pan = clamp_unit(track.pan, CENTER_PAN);
        }

        Ok(self)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] rmp_serde::decode::Error),

    #[error("Snapshot must contain {expected} tracks, found {found}")]
    TrackCount { expected: usize, found: usize },
}
