use std::path::{Path, PathBuf};

use crate::apply::apply;
use crate::command::{ParsedCommand, interpret};
use crate::mixer::MixerState;
use faderport_engine::{ActivityEvent, ActivityLog, ControlSink, NullSink};
use faderport_project::{
    ProjectError, SessionSnapshot, Settings, export_snapshot_json, import_snapshot_json,
    load_snapshot, save_snapshot,
};
use faderport_transport::{ControlMessage, TrackIndex};

/// The running surface: mixer state, where its messages go, and where it
/// is persisted.
///
/// Commands are applied one at a time through `&mut self`; wrap the session
/// in a [`SharedSession`](crate::SharedSession) to serve several callers.
pub struct Session {
    mixer: MixerState,
    plugins: Vec<String>,
    settings: Settings,
    sink: Box<dyn ControlSink + Send>,
    activity: ActivityLog,
    snapshot_path: Option<PathBuf>,
}

impl Session {
    /// A default session that is never written to disk.
    pub fn new(sink: impl ControlSink + Send + 'static) -> Self {
        let defaults = SessionSnapshot::default();
        Self {
            mixer: MixerState::new(),
            plugins: defaults.plugins,
            settings: defaults.settings,
            sink: Box::new(sink),
            activity: ActivityLog::new(),
            snapshot_path: None,
        }
    }

    /// Load the snapshot at `path`, or create and write a default one if the
    /// file does not exist yet.
    pub fn open(path: &Path, sink: impl ControlSink + Send + 'static) -> anyhow::Result<Self> {
        let mut session = Self::new(sink);

        if path.exists() {
            let snapshot = load_snapshot(path)?;
            session.restore(snapshot);
            tracing::info!(path = %path.display(), "loaded session snapshot");
        } else {
            save_snapshot(path, &session.snapshot())?;
            tracing::info!(path = %path.display(), "created default session snapshot");
        }

        session.snapshot_path = Some(path.to_path_buf());
        Ok(session)
    }

    fn restore(&mut self, snapshot: SessionSnapshot) {
        self.mixer = MixerState::from_snapshot(&snapshot);
        self.plugins = snapshot.plugins;
        self.settings = snapshot.settings;
    }

    pub fn mixer(&self) -> &MixerState {
        &self.mixer
    }

    pub fn plugins(&self) -> &[String] {
        &self.plugins
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    pub fn clear_activity(&mut self) {
        self.activity.clear();
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    /// Interpret and execute one line of (lower-cased) text.
    pub fn handle_text(&mut self, text: &str) -> String {
        let command = interpret(text);
        tracing::debug!(text, ?command, "interpreted command");
        self.execute(&command)
    }

    /// Apply a command, mirror it to the sink, persist, and return the reply.
    ///
    /// Sink and persistence failures are logged; the reply and the state
    /// change stand regardless.
    pub fn execute(&mut self, command: &ParsedCommand) -> String {
        let applied = apply(&mut self.mixer, command);

        self.emit(&applied.messages);
        if applied.changed {
            self.persist();
        }

        tracing::info!(reply = %applied.reply, "command handled");
        applied.reply
    }

    // Direct surface edits

    pub fn set_fader(&mut self, index: TrackIndex, level: f32) {
        let message = self.mixer.set_fader(index, level);
        self.commit(&[message]);
    }

    /// Pan has no controller; the move is only logged and persisted.
    pub fn set_pan(&mut self, index: TrackIndex, pan: f32) {
        self.mixer.set_pan(index, pan);
        let value = ControlMessage::level_value(self.mixer.track(index).pan);
        self.activity.record(ActivityEvent::Pan {
            track: index,
            value,
        });
        self.persist();
    }

    pub fn set_mute(&mut self, index: TrackIndex, muted: bool) {
        let message = self.mixer.set_mute(index, muted);
        self.commit(&[message]);
    }

    /// Solo button on one strip. Unlike "solo track N", other solos stay.
    pub fn set_solo(&mut self, index: TrackIndex, solo: bool) {
        let message = self.mixer.set_solo(index, solo);
        self.commit(&[message]);
    }

    pub fn rename_track(&mut self, index: TrackIndex, name: impl Into<String>) {
        self.mixer.rename(index, name);
        self.commit(&[]);
    }

    pub fn toggle_play(&mut self) {
        let message = self.mixer.toggle_play();
        self.commit(&[message]);
    }

    pub fn toggle_record(&mut self) {
        let message = self.mixer.toggle_record();
        self.commit(&[message]);
    }

    pub fn toggle_loop(&mut self) {
        self.mixer.toggle_loop();
        self.commit(&[]);
    }

    fn commit(&mut self, messages: &[ControlMessage]) {
        self.emit(messages);
        self.persist();
    }

    fn emit(&mut self, messages: &[ControlMessage]) {
        for &message in messages {
            self.activity.record(message);
            if let Err(error) = self.sink.send(message) {
                tracing::warn!(%error, %message, "failed to send control message");
            }
        }
    }

    fn persist(&self) {
        if let Err(error) = self.flush() {
            tracing::error!(%error, "failed to save session snapshot");
        }
    }

    /// Write the snapshot now. Does nothing for in-memory sessions.
    pub fn flush(&self) -> Result<(), ProjectError> {
        match &self.snapshot_path {
            Some(path) => save_snapshot(path, &self.snapshot()),
            None => Ok(()),
        }
    }

    // Snapshots

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            tracks: self.mixer.track_data(),
            plugins: self.plugins.clone(),
            transport: self.mixer.transport_data(),
            settings: self.settings,
            timestamp: None,
        }
    }

    /// Pretty JSON of the current state, stamped with the export time.
    pub fn export_json(&self) -> Result<String, ProjectError> {
        let mut snapshot = self.snapshot();
        snapshot.timestamp = Some(chrono::Local::now().to_rfc3339());
        export_snapshot_json(&snapshot)
    }

    /// Replace tracks and transport from an exported snapshot. Plugins and
    /// settings are kept. On error nothing changes.
    pub fn import_json(&mut self, json: &str) -> Result<(), ProjectError> {
        let snapshot = import_snapshot_json(json)?;
        self.mixer = MixerState::from_snapshot(&snapshot);
        self.persist();
        Ok(())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(NullSink)
    }
}
