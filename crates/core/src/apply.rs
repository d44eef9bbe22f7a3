use crate::command::{ParsedCommand, TransportAction};
use crate::mixer::MixerState;
use faderport_transport::ControlMessage;

/// Command shapes listed when input is not understood.
pub const SUPPORTED_COMMANDS: &str = "play, stop, record, solo track [1-16], mute track [1-16], \
     unmute track [1-16], set fader [1-16] to [0-100]";

/// Outcome of applying one command.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    /// Messages mirroring the change, in emission order.
    pub messages: Vec<ControlMessage>,
    /// Confirmation, error or help text for the user.
    pub reply: String,
    /// Whether the mixer was mutated and needs persisting.
    pub changed: bool,
}

impl Applied {
    fn changed(messages: Vec<ControlMessage>, reply: String) -> Self {
        Self {
            messages,
            reply,
            changed: true,
        }
    }

    fn unchanged(reply: String) -> Self {
        Self {
            messages: Vec::new(),
            reply,
            changed: false,
        }
    }
}

/// Apply a parsed command to the mixer.
pub fn apply(mixer: &mut MixerState, command: &ParsedCommand) -> Applied {
    match command {
        ParsedCommand::Transport(TransportAction::Play) => {
            Applied::changed(vec![mixer.play()], "Transport: Playing".to_string())
        }
        ParsedCommand::Transport(TransportAction::Stop) => {
            Applied::changed(vec![mixer.stop()], "Transport: Stopped".to_string())
        }
        ParsedCommand::Transport(TransportAction::Record) => {
            Applied::changed(vec![mixer.record()], "Transport: Recording".to_string())
        }
        ParsedCommand::SetSolo(index) => Applied::changed(
            mixer.solo_exclusive(*index),
            format!("Soloed Track {}", index.number()),
        ),
        ParsedCommand::SetMute(index, muted) => {
            let message = mixer.set_mute(*index, *muted);
            let verb = if *muted { "Muted" } else { "Unmuted" };
            Applied::changed(vec![message], format!("{verb} Track {}", index.number()))
        }
        ParsedCommand::SetFader(index, level) => {
            let message = mixer.set_fader(*index, *level);
            let percent = (mixer.track(*index).fader * 100.0).round() as u32;
            Applied::changed(
                vec![message],
                format!("Set Track {} fader to {percent}%", index.number()),
            )
        }
        ParsedCommand::Unrecognized(text) => Applied::unchanged(format!(
            "Command not recognized: '{text}'. Try: {SUPPORTED_COMMANDS}"
        )),
        ParsedCommand::ParseError(reason) => Applied::unchanged(reason.to_string()),
    }
}
