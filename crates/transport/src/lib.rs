/// Number of channel strips on the surface.
pub const TRACK_COUNT: usize = 16;

/// Controller number of the first fader. Faders occupy 0..=15.
pub const FADER_CC_BASE: u8 = 0;
/// Controller number of the first mute button. Mutes occupy 16..=31.
pub const MUTE_CC_BASE: u8 = 16;
/// Controller number of the first solo button. Solos occupy 32..=47.
pub const SOLO_CC_BASE: u8 = 32;
/// Controller used to arm recording on the transport.
pub const RECORD_CC: u8 = 95;

/// Largest value a 7-bit controller can carry.
pub const CC_MAX: u8 = 127;

pub const DEFAULT_FADER: f32 = 0.5;
pub const CENTER_PAN: f32 = 0.5;

/// Clamp a fader or pan level into 0.0..=1.0. NaN becomes `fallback`.
pub fn clamp_unit(value: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Zero-based address of one of the sixteen tracks.
///
/// User-facing text is 1-based ("track 3"); everything internal uses this
/// validated 0-based index, so an out-of-range track cannot reach the mixer.
///
/// ```
/// use faderport_transport::TrackIndex;
///
/// let third = TrackIndex::from_number(3).unwrap();
/// assert_eq!(third.get(), 2);
/// assert_eq!(third.number(), 3);
/// assert!(TrackIndex::from_number(17).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrackIndex(usize);

impl TrackIndex {
    pub fn new(index: usize) -> Option<Self> {
        (index < TRACK_COUNT).then_some(Self(index))
    }

    /// Resolve a 1-based track number as typed or spoken by the user.
    pub fn from_number(number: i64) -> Option<Self> {
        let index = number.checked_sub(1)?;
        usize::try_from(index).ok().and_then(Self::new)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }

    /// 1-based number used in replies.
    #[inline]
    pub fn number(self) -> usize {
        self.0 + 1
    }

    pub fn all() -> impl Iterator<Item = TrackIndex> {
        (0..TRACK_COUNT).map(TrackIndex)
    }

    pub fn fader_cc(self) -> u8 {
        FADER_CC_BASE + self.0 as u8
    }

    pub fn mute_cc(self) -> u8 {
        MUTE_CC_BASE + self.0 as u8
    }

    pub fn solo_cc(self) -> u8 {
        SOLO_CC_BASE + self.0 as u8
    }
}

impl std::fmt::Display for TrackIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Track {}", self.number())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub name: String,
    /// Linear gain proxy in 0.0..=1.0.
    pub fader: f32,
    pub muted: bool,
    pub solo: bool,
    /// 0.0 is hard left, 0.5 centre, 1.0 hard right.
    pub pan: f32,
}

impl Track {
    pub fn new(name: String) -> Self {
        Self {
            name,
            fader: DEFAULT_FADER,
            muted: false,
            solo: false,
            pan: CENTER_PAN,
        }
    }

    /// A track with the default "Track N" name for the given slot.
    pub fn for_index(index: TrackIndex) -> Self {
        Self::new(index.to_string())
    }

    /// A full default bank, "Track 1" through "Track 16".
    pub fn defaults() -> [Track; TRACK_COUNT] {
        std::array::from_fn(|i| Self::for_index(TrackIndex(i)))
    }
}

/// Playback and record flags.
///
/// `playing` and `recording` are independent: arming record does not start
/// playback, while stopping clears both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transport {
    pub playing: bool,
    pub recording: bool,
    pub loop_enabled: bool,
}

/// One message mirrored onto the control protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMessage {
    Start,
    Stop,
    ControlChange { controller: u8, value: u8 },
}

impl ControlMessage {
    /// Build a control change, masking both numbers to 7 bits.
    pub fn cc(controller: u8, value: u8) -> Self {
        ControlMessage::ControlChange {
            controller: controller & 0x7F,
            value: value & 0x7F,
        }
    }

    /// 7-bit controller value for a unit-range level, rounded to nearest.
    ///
    /// ```
    /// use faderport_transport::ControlMessage;
    ///
    /// assert_eq!(ControlMessage::level_value(0.75), 95);
    /// assert_eq!(ControlMessage::level_value(1.0), 127);
    /// ```
    pub fn level_value(level: f32) -> u8 {
        (level.clamp(0.0, 1.0) * CC_MAX as f32).round() as u8
    }

    pub fn switch_value(on: bool) -> u8 {
        if on { CC_MAX } else { 0 }
    }

    /// Encode as raw MIDI bytes on the given channel (0-15).
    pub fn to_midi(self, channel: u8) -> Vec<u8> {
        match self {
            ControlMessage::Start => vec![0xFA],
            ControlMessage::Stop => vec![0xFC],
            ControlMessage::ControlChange { controller, value } => {
                vec![0xB0 | (channel & 0x0F), controller & 0x7F, value & 0x7F]
            }
        }
    }
}

impl std::fmt::Display for ControlMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlMessage::Start => write!(f, "Transport: Start"),
            ControlMessage::Stop => write!(f, "Transport: Stop"),
            ControlMessage::ControlChange { controller, value } => {
                write!(f, "CC{controller}: {value}")
            }
        }
    }
}
