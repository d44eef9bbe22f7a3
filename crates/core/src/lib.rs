pub mod apply;
pub mod command;
pub mod mixer;
pub mod session;
pub mod shared;

pub use apply::{Applied, SUPPORTED_COMMANDS, apply};
pub use command::{ParseError, ParsedCommand, RULES, Rule, TrackVerb, TransportAction, interpret};
pub use mixer::MixerState;
pub use session::Session;
pub use shared::SharedSession;

pub use faderport_engine::{
    ActivityEntry, ActivityEvent, ActivityLog, ControlSink, MidiReceiver, NullSink, QueueSink,
    SinkError, control_queue,
};
pub use faderport_project::{
    ProjectError, SessionSnapshot, Settings, SnapshotMetadata, TrackData, TransportData,
    load_snapshot_metadata,
};
pub use faderport_transport::{ControlMessage, TRACK_COUNT, Track, TrackIndex, Transport};
