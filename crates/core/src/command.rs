//! Free-text command interpretation.
//!
//! Matching is by substring against an ordered rule table and the first rule
//! whose keyword appears wins. Keywords overlap ("unmute track 3" contains
//! "mute track"), so the order of `RULES` is part of the contract.
//!
//! Track numbers are read two different ways:
//!
//! * solo/mute/unmute take whatever follows the last "track" in the text,
//!   so "mute track3" works but "mute track 3 now" does not;
//! * fader commands tokenize on whitespace and take the first two tokens
//!   made entirely of digits, so "fader 3 to 50" works but "fader track3 50"
//!   does not.

use faderport_transport::TrackIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportAction {
    Play,
    Stop,
    Record,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedCommand {
    Transport(TransportAction),
    SetSolo(TrackIndex),
    SetMute(TrackIndex, bool),
    /// Fader level in 0.0..=1.0.
    SetFader(TrackIndex, f32),
    /// Nothing matched; carries the input so the reply can echo it.
    Unrecognized(String),
    ParseError(ParseError),
}

/// Which track command failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackVerb {
    Solo,
    Mute,
    Unmute,
}

impl std::fmt::Display for TrackVerb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TrackVerb::Solo => "solo",
            TrackVerb::Mute => "mute",
            TrackVerb::Unmute => "unmute",
        })
    }
}

/// A recognised command with a bad argument. The message is shown to the
/// user as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid {0} command format")]
    Format(TrackVerb),

    #[error("invalid track number (1-16)")]
    TrackOutOfRange,

    #[error("invalid fader command format. try 'set fader 1 to 75'")]
    Fader,
}

/// One entry of the rule table.
pub struct Rule {
    /// Substring that selects this rule.
    pub keyword: &'static str,
    parse: fn(&str) -> ParsedCommand,
}

/// Rules in precedence order.
pub static RULES: [Rule; 7] = [
    Rule {
        keyword: "play",
        parse: parse_play,
    },
    Rule {
        keyword: "stop",
        parse: parse_stop,
    },
    Rule {
        keyword: "record",
        parse: parse_record,
    },
    Rule {
        keyword: "solo track",
        parse: parse_solo,
    },
    Rule {
        keyword: "unmute track",
        parse: parse_unmute,
    },
    Rule {
        keyword: "mute track",
        parse: parse_mute,
    },
    Rule {
        keyword: "fader",
        parse: parse_fader,
    },
];

/// Turn lower-cased text into a command. Never fails; problems come back as
/// `ParseError` or `Unrecognized`.
pub fn interpret(text: &str) -> ParsedCommand {
    RULES
        .iter()
        .find(|rule| text.contains(rule.keyword))
        .map(|rule| (rule.parse)(text))
        .unwrap_or_else(|| ParsedCommand::Unrecognized(text.to_string()))
}

fn parse_play(_: &str) -> ParsedCommand {
    ParsedCommand::Transport(TransportAction::Play)
}

fn parse_stop(_: &str) -> ParsedCommand {
    ParsedCommand::Transport(TransportAction::Stop)
}

fn parse_record(_: &str) -> ParsedCommand {
    ParsedCommand::Transport(TransportAction::Record)
}

fn parse_solo(text: &str) -> ParsedCommand {
    track_after_keyword(text, TrackVerb::Solo)
        .map(ParsedCommand::SetSolo)
        .unwrap_or_else(ParsedCommand::ParseError)
}

fn parse_unmute(text: &str) -> ParsedCommand {
    track_after_keyword(text, TrackVerb::Unmute)
        .map(|index| ParsedCommand::SetMute(index, false))
        .unwrap_or_else(ParsedCommand::ParseError)
}

fn parse_mute(text: &str) -> ParsedCommand {
    track_after_keyword(text, TrackVerb::Mute)
        .map(|index| ParsedCommand::SetMute(index, true))
        .unwrap_or_else(ParsedCommand::ParseError)
}

fn parse_fader(text: &str) -> ParsedCommand {
    fader_arguments(text)
        .map(|(index, level)| ParsedCommand::SetFader(index, level))
        .unwrap_or_else(ParsedCommand::ParseError)
}

/// Track number from the text following the last "track".
fn track_after_keyword(text: &str, verb: TrackVerb) -> Result<TrackIndex, ParseError> {
    let (_, tail) = text.rsplit_once("track").ok_or(ParseError::Format(verb))?;
    let tail = tail.trim();

    let number: i64 = match tail.parse() {
        Ok(number) => number,
        // Well-formed but too large for i64
        Err(_) if is_digits(tail) => return Err(ParseError::TrackOutOfRange),
        Err(_) => return Err(ParseError::Format(verb)),
    };

    TrackIndex::from_number(number).ok_or(ParseError::TrackOutOfRange)
}

/// The first two all-digit tokens: track number, then percentage. Any
/// further numbers are ignored.
fn fader_arguments(text: &str) -> Result<(TrackIndex, f32), ParseError> {
    let mut numbers = text.split_whitespace().filter(|t| is_digits(t));

    let (Some(track), Some(percent)) = (numbers.next(), numbers.next()) else {
        return Err(ParseError::Fader);
    };

    let index = track
        .parse::<i64>()
        .ok()
        .and_then(TrackIndex::from_number)
        .ok_or(ParseError::Fader)?;
    let percent = percent
        .parse::<u32>()
        .ok()
        .filter(|&percent| percent <= 100)
        .ok_or(ParseError::Fader)?;

    Ok((index, percent as f32 / 100.0))
}

fn is_digits(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}
