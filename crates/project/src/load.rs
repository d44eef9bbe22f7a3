use crate::{ProjectError, SessionSnapshot};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct SnapshotMetadata {
    pub track_count: usize,
    pub muted_count: usize,
    pub soloed_count: usize,
    pub playing: bool,
    pub recording: bool,
    pub plugins: Vec<String>,
    pub timestamp: Option<String>,
}

fn load_snapshot_data(path: &Path) -> Result<SessionSnapshot, ProjectError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    // Try JSON first, fall back to MessagePack
    serde_json::from_reader(reader).or_else(|_| {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        rmp_serde::decode::from_read(reader).map_err(ProjectError::from)
    })
}

/// Read and validate a snapshot from disk.
pub fn load_snapshot(path: &Path) -> Result<SessionSnapshot, ProjectError> {
    load_snapshot_data(path)?.validate()
}

/// Summary of a snapshot without building a session from it.
pub fn load_snapshot_metadata(path: &Path) -> Result<SnapshotMetadata, ProjectError> {
    let snapshot = load_snapshot_data(path)?;

    Ok(SnapshotMetadata {
        track_count: snapshot.tracks.len(),
        muted_count: snapshot.tracks.iter().filter(|t| t.muted).count(),
        soloed_count: snapshot.tracks.iter().filter(|t| t.solo).count(),
        playing: snapshot.transport.playing,
        recording: snapshot.transport.recording,
        plugins: snapshot.plugins,
        timestamp: snapshot.timestamp,
    })
}

/// Parse an uploaded JSON snapshot.
pub fn import_snapshot_json(json: &str) -> Result<SessionSnapshot, ProjectError> {
    let snapshot: SessionSnapshot = serde_json::from_str(json)?;
    snapshot.validate()
}
