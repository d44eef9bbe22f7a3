use crate::{ProjectError, SessionSnapshot};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write the snapshot as pretty-printed JSON.
///
/// The file is written to a sibling temporary path first and then renamed
/// over the target, so a crash mid-write leaves the previous snapshot intact.
/// A failed save removes the temporary file.
pub fn save_snapshot(path: &Path, snapshot: &SessionSnapshot) -> Result<(), ProjectError> {
    let tmp_path = path.with_extension("json.tmp");

    let result = write_json(&tmp_path, snapshot)
        .and_then(|()| std::fs::rename(&tmp_path, path).map_err(ProjectError::from));

    if result.is_err() {
        let _ = std::fs::remove_file(&tmp_path);
    }
    result
}

fn write_json(path: &Path, snapshot: &SessionSnapshot) -> Result<(), ProjectError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, snapshot)?;
    writer.flush()?;
    Ok(())
}

/// Pretty JSON for download/sharing.
pub fn export_snapshot_json(snapshot: &SessionSnapshot) -> Result<String, ProjectError> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_snapshot_creates_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("faderport_data.json");

        save_snapshot(&path, &SessionSnapshot::default()).expect("save");

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_failed_rename_removes_temp_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("faderport_data.json");
        // A directory in the way makes the final rename fail
        std::fs::create_dir(&path).expect("mkdir");

        let result = save_snapshot(&path, &SessionSnapshot::default());

        assert!(matches!(result, Err(ProjectError::Io(_))));
        assert!(!path.with_extension("json.tmp").exists());
        assert!(path.is_dir());
    }

    #[test]
    fn test_save_snapshot_content_is_valid_json() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("faderport_data.json");

        let mut snapshot = SessionSnapshot::default();
        snapshot.tracks[0].fader = 0.25;
        snapshot.transport.playing = true;

        save_snapshot(&path, &snapshot).expect("save");

        let file = std::fs::File::open(&path).expect("open");
        let reader = std::io::BufReader::new(file);
        let loaded: SessionSnapshot = serde_json::from_reader(reader).expect("decode");

        assert_eq!(loaded.tracks[0].fader, 0.25);
        assert!(loaded.transport.playing);
    }

    #[test]
    fn test_save_snapshot_overwrites_previous() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("faderport_data.json");

        let mut snapshot = SessionSnapshot::default();
        save_snapshot(&path, &snapshot).expect("first save");

        snapshot.tracks[3].muted = true;
        save_snapshot(&path, &snapshot).expect("second save");

        let contents = std::fs::read_to_string(&path).expect("read");
        let loaded: SessionSnapshot = serde_json::from_str(&contents).expect("decode");
        assert!(loaded.tracks[3].muted);
    }

    #[test]
    fn test_save_snapshot_missing_directory() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("missing").join("faderport_data.json");

        let result = save_snapshot(&path, &SessionSnapshot::default());
        assert!(matches!(result, Err(ProjectError::Io(_))));
    }

    #[test]
    fn test_export_includes_timestamp_when_set() {
        let mut snapshot = SessionSnapshot::default();
        snapshot.timestamp = Some("2024-01-01T00:00:00+00:00".to_string());

        let json = export_snapshot_json(&snapshot).expect("export");

        assert!(json.contains("\"timestamp\""));
        assert!(json.contains("\"loop\""));
        // Pretty printed
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_export_omits_missing_timestamp() {
        let json = export_snapshot_json(&SessionSnapshot::default()).expect("export");
        assert!(!json.contains("timestamp"));
    }
}
