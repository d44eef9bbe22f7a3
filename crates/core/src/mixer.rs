//! In-memory model of the sixteen channel strips plus the transport.
//!
//! Every mutation returns the control messages that mirror it onto the
//! surface protocol; the caller decides where they go.

use faderport_project::{SessionSnapshot, TrackData, TransportData};
use faderport_transport::{
    CC_MAX, ControlMessage, RECORD_CC, TRACK_COUNT, Track, TrackIndex, Transport, clamp_unit,
};

#[derive(Debug, Clone, PartialEq)]
pub struct MixerState {
    tracks: [Track; TRACK_COUNT],
    transport: Transport,
}

impl Default for MixerState {
    fn default() -> Self {
        Self {
            tracks: Track::defaults(),
            transport: Transport::default(),
        }
    }
}

impl MixerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&self, index: TrackIndex) -> &Track {
        &self.tracks[index.get()]
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    /// Indices of every soloed track, in track order.
    pub fn soloed(&self) -> impl Iterator<Item = TrackIndex> + '_ {
        TrackIndex::all().filter(|&index| self.track(index).solo)
    }

    fn track_mut(&mut self, index: TrackIndex) -> &mut Track {
        &mut self.tracks[index.get()]
    }

    // Transport

    pub fn play(&mut self) -> ControlMessage {
        self.transport.playing = true;
        ControlMessage::Start
    }

    /// Stop clears both playback and record.
    pub fn stop(&mut self) -> ControlMessage {
        self.transport.playing = false;
        self.transport.recording = false;
        ControlMessage::Stop
    }

    /// Arm recording. Playback is left as it was.
    pub fn record(&mut self) -> ControlMessage {
        self.transport.recording = true;
        ControlMessage::cc(RECORD_CC, CC_MAX)
    }

    /// Play/pause button: flips playback only.
    pub fn toggle_play(&mut self) -> ControlMessage {
        self.transport.playing = !self.transport.playing;
        if self.transport.playing {
            ControlMessage::Start
        } else {
            ControlMessage::Stop
        }
    }

    pub fn toggle_record(&mut self) -> ControlMessage {
        self.transport.recording = !self.transport.recording;
        ControlMessage::cc(
            RECORD_CC,
            ControlMessage::switch_value(self.transport.recording),
        )
    }

    /// Returns the new loop state. Looping has no controller.
    pub fn toggle_loop(&mut self) -> bool {
        self.transport.loop_enabled = !self.transport.loop_enabled;
        self.transport.loop_enabled
    }

    // Tracks

    /// Solo `index` and clear solo everywhere else.
    ///
    /// Always emits one message per track: solo-off for every other track in
    /// track order, then solo-on for `index`.
    pub fn solo_exclusive(&mut self, index: TrackIndex) -> Vec<ControlMessage> {
        let mut messages = Vec::with_capacity(TRACK_COUNT);

        for other in TrackIndex::all().filter(|&other| other != index) {
            self.track_mut(other).solo = false;
            messages.push(ControlMessage::cc(other.solo_cc(), 0));
        }

        self.track_mut(index).solo = true;
        messages.push(ControlMessage::cc(index.solo_cc(), CC_MAX));

        messages
    }

    /// Solo button on a single strip. Other tracks are untouched.
    pub fn set_solo(&mut self, index: TrackIndex, solo: bool) -> ControlMessage {
        self.track_mut(index).solo = solo;
        ControlMessage::cc(index.solo_cc(), ControlMessage::switch_value(solo))
    }

    pub fn set_mute(&mut self, index: TrackIndex, muted: bool) -> ControlMessage {
        self.track_mut(index).muted = muted;
        ControlMessage::cc(index.mute_cc(), ControlMessage::switch_value(muted))
    }

    /// Set the fader, clamped to 0.0..=1.0.
    pub fn set_fader(&mut self, index: TrackIndex, level: f32) -> ControlMessage {
        let level = clamp_unit(level, self.track(index).fader);
        self.track_mut(index).fader = level;
        ControlMessage::cc(index.fader_cc(), ControlMessage::level_value(level))
    }

    /// Set pan, clamped to 0.0..=1.0. Pan has no controller.
    pub fn set_pan(&mut self, index: TrackIndex, pan: f32) {
        let pan = clamp_unit(pan, self.track(index).pan);
        self.track_mut(index).pan = pan;
    }

    pub fn rename(&mut self, index: TrackIndex, name: impl Into<String>) {
        self.track_mut(index).name = name.into();
    }

    // Snapshot conversion

    /// Build from a snapshot that has been through
    /// [`SessionSnapshot::validate`]. Tracks beyond the snapshot's keep
    /// their defaults.
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Self {
        let mut tracks = Track::defaults();
        for (track, data) in tracks.iter_mut().zip(&snapshot.tracks) {
            *track = Track {
                name: data.name.clone(),
                fader: data.fader,
                muted: data.muted,
                solo: data.solo,
                pan: data.pan,
            };
        }

        let transport = snapshot.transport;
        Self {
            tracks,
            transport: Transport {
                playing: transport.playing,
                recording: transport.recording,
                loop_enabled: transport.loop_enabled,
            },
        }
    }

    pub fn track_data(&self) -> Vec<TrackData> {
        self.tracks
            .iter()
            .map(|track| TrackData {
                name: track.name.clone(),
                fader: track.fader,
                muted: track.muted,
                solo: track.solo,
                pan: track.pan,
            })
            .collect()
    }

    pub fn transport_data(&self) -> TransportData {
        TransportData {
            playing: self.transport.playing,
            recording: self.transport.recording,
            loop_enabled: self.transport.loop_enabled,
        }
    }
}
