use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::Cli;

pub const DEFAULT_SNAPSHOT: &str = "faderport_data.json";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Bounded queue drained by a logging output thread
    #[default]
    Queue,
    /// Discard everything
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub snapshot_path: PathBuf,
    pub sink: SinkKind,
    pub midi_channel: u8,
    pub queue_capacity: usize,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT),
            sink: SinkKind::Queue,
            midi_channel: 0,
            queue_capacity: 256,
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("faderport").join("config.toml"))
    }

    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Missing or unparsable files give the defaults.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            self.save_to(&path);
        }
    }

    pub fn save_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }

        if let Ok(contents) = toml::to_string_pretty(self) {
            let _ = fs::write(path, contents);
        }
    }

    /// Command-line flags win over the file.
    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(path) = &cli.snapshot {
            self.snapshot_path = path.clone();
        }
        if let Some(sink) = cli.sink {
            self.sink = sink;
        }
        if let Some(channel) = cli.channel {
            self.midi_channel = channel;
        }
        if let Some(capacity) = cli.queue_capacity {
            self.queue_capacity = capacity;
        }
        if let Some(filter) = &cli.log {
            self.log_filter = filter.clone();
        }
        self.midi_channel &= 0x0F;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().expect("tempdir");
        let config = Config::load_from(&dir.path().join("config.toml"));

        assert_eq!(config, Config::default());
        assert_eq!(config.snapshot_path, PathBuf::from("faderport_data.json"));
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "sink = \"none\"\nmidi_channel = 4\n").expect("write");

        let config = Config::load_from(&path);

        assert_eq!(config.sink, SinkKind::None);
        assert_eq!(config.midi_channel, 4);
        assert_eq!(config.queue_capacity, 256);
    }

    #[test]
    fn test_invalid_file_gives_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "sink = [[[").expect("write");

        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            snapshot_path: PathBuf::from("/tmp/mix.json"),
            sink: SinkKind::None,
            midi_channel: 9,
            queue_capacity: 32,
            log_filter: "debug".to_string(),
        };

        config.save_to(&path);

        assert_eq!(Config::load_from(&path), config);
    }

    #[test]
    fn test_cli_overrides_file() {
        let cli = Cli::try_parse_from([
            "faderport",
            "--snapshot",
            "other.json",
            "--queue-capacity",
            "8",
            "--log",
            "warn",
        ])
        .expect("parse");

        let config = Config::default().with_overrides(&cli);

        assert_eq!(config.snapshot_path, PathBuf::from("other.json"));
        assert_eq!(config.queue_capacity, 8);
        assert_eq!(config.log_filter, "warn");
        assert_eq!(config.sink, SinkKind::Queue);
    }
}
