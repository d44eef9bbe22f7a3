//! Outbound side of the surface: where mirrored control messages go.
//!
//! Delivery is fire-and-forget. A sink reports failure through `SinkError`
//! and the caller decides what to do with it (the session logs and moves on).

mod activity;

pub use activity::{ACTIVITY_LOG_CAPACITY, ActivityEntry, ActivityEvent, ActivityLog};

use faderport_transport::ControlMessage;
use std::thread::JoinHandle;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    #[error("control queue is full, dropped {0}")]
    QueueFull(ControlMessage),

    #[error("control output is disconnected")]
    Disconnected,
}

/// Destination for control messages.
pub trait ControlSink {
    fn send(&mut self, message: ControlMessage) -> Result<(), SinkError>;
}

impl<S: ControlSink + ?Sized> ControlSink for Box<S> {
    fn send(&mut self, message: ControlMessage) -> Result<(), SinkError> {
        (**self).send(message)
    }
}

/// Accepts and discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ControlSink for NullSink {
    fn send(&mut self, _message: ControlMessage) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Producer half of a bounded lock-free control queue.
///
/// Never blocks: a full queue drops the message and reports `QueueFull`.
pub struct QueueSink {
    producer: rtrb::Producer<ControlMessage>,
}

/// Consumer half of the control queue, owned by whatever talks to the wire.
pub struct MidiReceiver {
    consumer: rtrb::Consumer<ControlMessage>,
    channel: u8,
}

/// Create a control queue holding at most `capacity` pending messages,
/// encoded on MIDI `channel` (0-15) when read as bytes.
pub fn control_queue(capacity: usize, channel: u8) -> (QueueSink, MidiReceiver) {
    let (producer, consumer) = rtrb::RingBuffer::<ControlMessage>::new(capacity.max(1));
    (
        QueueSink { producer },
        MidiReceiver {
            consumer,
            channel: channel & 0x0F,
        },
    )
}

impl ControlSink for QueueSink {
    fn send(&mut self, message: ControlMessage) -> Result<(), SinkError> {
        if self.producer.is_abandoned() {
            return Err(SinkError::Disconnected);
        }

        self.producer
            .push(message)
            .map_err(|_| SinkError::QueueFull(message))
    }
}

impl MidiReceiver {
    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn pop(&mut self) -> Option<ControlMessage> {
        self.consumer.pop().ok()
    }

    /// Next pending message as raw MIDI bytes.
    pub fn pop_midi(&mut self) -> Option<Vec<u8>> {
        self.pop().map(|message| message.to_midi(self.channel))
    }

    /// Take everything currently queued.
    pub fn drain(&mut self) -> Vec<ControlMessage> {
        let mut messages = Vec::with_capacity(self.consumer.slots());
        while let Some(message) = self.pop() {
            messages.push(message);
        }
        messages
    }

    /// True once the sending side has been dropped.
    pub fn is_abandoned(&self) -> bool {
        self.consumer.is_abandoned()
    }

    /// Drain the queue on a background thread, logging every message as it
    /// would go out on the wire. The thread ends once the sender is dropped
    /// and the queue is empty, returning how many messages it handled.
    pub fn spawn_logger(mut self, poll_interval: Duration) -> std::io::Result<JoinHandle<usize>> {
        std::thread::Builder::new()
            .name("faderport-midi-out".to_string())
            .spawn(move || {
                let mut handled = 0;
                loop {
                    while let Some(bytes) = self.pop_midi() {
                        handled += 1;
                        tracing::debug!(bytes = ?bytes, "midi out");
                    }
                    if self.is_abandoned() && self.consumer.is_empty() {
                        break;
                    }
                    std::thread::sleep(poll_interval);
                }
                handled
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_sink_accepts_everything() {
        let mut sink = NullSink;
        assert!(sink.send(ControlMessage::Start).is_ok());
        assert!(sink.send(ControlMessage::cc(0, 127)).is_ok());
    }

    #[test]
    fn test_queue_preserves_order() {
        let (mut sink, mut receiver) = control_queue(8, 0);

        sink.send(ControlMessage::Start).expect("send");
        sink.send(ControlMessage::cc(16, 127)).expect("send");
        sink.send(ControlMessage::Stop).expect("send");

        assert_eq!(
            receiver.drain(),
            vec![
                ControlMessage::Start,
                ControlMessage::cc(16, 127),
                ControlMessage::Stop
            ]
        );
        assert!(receiver.pop().is_none());
    }

    #[test]
    fn test_queue_full_drops_message() {
        let (mut sink, mut receiver) = control_queue(2, 0);

        sink.send(ControlMessage::cc(0, 1)).expect("send");
        sink.send(ControlMessage::cc(0, 2)).expect("send");
        let err = sink.send(ControlMessage::cc(0, 3)).unwrap_err();

        assert_eq!(err, SinkError::QueueFull(ControlMessage::cc(0, 3)));
        assert_eq!(receiver.drain().len(), 2);

        // Room again after draining
        assert!(sink.send(ControlMessage::cc(0, 4)).is_ok());
    }

    #[test]
    fn test_queue_disconnected_when_receiver_dropped() {
        let (mut sink, receiver) = control_queue(4, 0);
        drop(receiver);

        assert_eq!(
            sink.send(ControlMessage::Start),
            Err(SinkError::Disconnected)
        );
    }

    #[test]
    fn test_pop_midi_uses_channel() {
        let (mut sink, mut receiver) = control_queue(4, 5);
        sink.send(ControlMessage::cc(7, 100)).expect("send");

        assert_eq!(receiver.channel(), 5);
        assert_eq!(receiver.pop_midi(), Some(vec![0xB5, 7, 100]));
    }

    #[test]
    fn test_boxed_sink_forwards() {
        let (sink, mut receiver) = control_queue(4, 0);
        let mut boxed: Box<dyn ControlSink + Send> = Box::new(sink);

        boxed.send(ControlMessage::Stop).expect("send");
        assert_eq!(receiver.pop(), Some(ControlMessage::Stop));
    }

    #[test]
    fn test_logger_thread_drains_and_exits() {
        let (mut sink, receiver) = control_queue(16, 0);
        for value in 0..5 {
            sink.send(ControlMessage::cc(1, value)).expect("send");
        }

        let handle = receiver
            .spawn_logger(Duration::from_millis(1))
            .expect("spawn");
        drop(sink);

        assert_eq!(handle.join().expect("join"), 5);
    }
}
