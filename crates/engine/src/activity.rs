use chrono::{Local, NaiveTime};
use faderport_transport::{ControlMessage, TrackIndex};
use std::collections::VecDeque;

/// How many entries the log keeps before evicting the oldest.
pub const ACTIVITY_LOG_CAPACITY: usize = 50;

/// Something the surface did that is worth showing to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityEvent {
    Control(ControlMessage),
    /// Pan move. No controller carries pan, so this only exists in the log.
    Pan { track: TrackIndex, value: u8 },
}

impl From<ControlMessage> for ActivityEvent {
    fn from(message: ControlMessage) -> Self {
        ActivityEvent::Control(message)
    }
}

impl std::fmt::Display for ActivityEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivityEvent::Control(message) => write!(f, "{message}"),
            ActivityEvent::Pan { track, value } => write!(f, "Pan{}: {value}", track.get()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEntry {
    pub time: NaiveTime,
    pub event: ActivityEvent,
}

impl std::fmt::Display for ActivityEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.time.format("%H:%M:%S%.3f"), self.event)
    }
}

/// Rolling record of every control message and pan move the surface emitted,
/// kept regardless of whether the sink accepted it.
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: impl Into<ActivityEvent>) {
        self.record_at(Local::now().time(), event);
    }

    pub fn record_at(&mut self, time: NaiveTime, event: impl Into<ActivityEvent>) {
        if self.entries.len() == ACTIVITY_LOG_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(ActivityEntry {
            time,
            event: event.into(),
        });
    }

    pub fn entries(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    /// The last `count` entries, oldest first.
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &ActivityEntry> {
        self.entries
            .iter()
            .skip(self.entries.len().saturating_sub(count))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32, s: u32, ms: u32) -> NaiveTime {
        NaiveTime::from_hms_milli_opt(h, m, s, ms).expect("valid time")
    }

    #[test]
    fn test_entry_format() {
        let entry = ActivityEntry {
            time: at(9, 5, 3, 7),
            event: ControlMessage::cc(32, 127).into(),
        };
        assert_eq!(entry.to_string(), "[09:05:03.007] CC32: 127");

        let entry = ActivityEntry {
            time: at(23, 59, 59, 999),
            event: ControlMessage::Stop.into(),
        };
        assert_eq!(entry.to_string(), "[23:59:59.999] Transport: Stop");

        let entry = ActivityEntry {
            time: at(0, 0, 1, 250),
            event: ActivityEvent::Pan {
                track: TrackIndex::new(3).expect("valid index"),
                value: 32,
            },
        };
        assert_eq!(entry.to_string(), "[00:00:01.250] Pan3: 32");
    }

    #[test]
    fn test_log_caps_at_capacity() {
        let mut log = ActivityLog::new();
        for value in 0..60u8 {
            log.record_at(at(12, 0, 0, 0), ControlMessage::cc(0, value));
        }

        assert_eq!(log.len(), ACTIVITY_LOG_CAPACITY);
        // Oldest ten were evicted
        let first = log.entries().next().expect("first entry");
        assert_eq!(first.event, ControlMessage::cc(0, 10).into());
    }

    #[test]
    fn test_recent_returns_tail_in_order() {
        let mut log = ActivityLog::new();
        for value in 0..5u8 {
            log.record_at(at(12, 0, 0, 0), ControlMessage::cc(1, value));
        }

        let values: Vec<ActivityEvent> = log.recent(2).map(|e| e.event).collect();
        assert_eq!(
            values,
            vec![
                ControlMessage::cc(1, 3).into(),
                ControlMessage::cc(1, 4).into()
            ]
        );
        assert_eq!(log.recent(100).count(), 5);
    }

    #[test]
    fn test_clear() {
        let mut log = ActivityLog::new();
        log.record(ControlMessage::Start);
        assert!(!log.is_empty());

        log.clear();
        assert!(log.is_empty());
    }
}
