//! Thread-safe handle around a [`Session`].
//!
//! Commands from several sources (a REPL, a socket, a UI) are applied one at
//! a time under a single lock, so each command's state change and its
//! messages stay together.

use crate::session::Session;
use std::sync::{Arc, Mutex};

const LOCK_FAILED: &str = "Failed to acquire session lock";

#[derive(Clone)]
pub struct SharedSession {
    session: Arc<Mutex<Session>>,
}

impl SharedSession {
    pub fn new(session: Session) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
        }
    }

    /// Interpret and execute one line of text. A poisoned lock is reported
    /// in the reply rather than as a panic.
    pub fn handle_text(&self, text: &str) -> String {
        self.with_session(|session| session.handle_text(text))
            .unwrap_or_else(|error| error)
    }

    /// Run `f` with exclusive access to the session.
    pub fn with_session<R>(&self, f: impl FnOnce(&mut Session) -> R) -> Result<R, String> {
        let mut session = self
            .session
            .lock()
            .map_err(|_| LOCK_FAILED.to_string())?;
        Ok(f(&mut session))
    }

    /// Take the session back once every other handle is gone.
    pub fn into_inner(self) -> Result<Session, Self> {
        match Arc::try_unwrap(self.session) {
            Ok(mutex) => mutex
                .into_inner()
                .map_err(|poisoned| Self::new(poisoned.into_inner())),
            Err(session) => Err(Self { session }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faderport_engine::{NullSink, control_queue};
    use faderport_transport::TrackIndex;
    use std::thread;

    #[test]
    fn test_handle_text_through_shared_session() {
        let shared = SharedSession::new(Session::new(NullSink));

        assert_eq!(shared.handle_text("mute track 1"), "Muted Track 1");
        let muted = shared
            .with_session(|s| s.mixer().track(TrackIndex::new(0).expect("index")).muted)
            .expect("lock");
        assert!(muted);
    }

    #[test]
    fn test_concurrent_commands_are_serialized() {
        let (sink, mut receiver) = control_queue(1024, 0);
        let shared = SharedSession::new(Session::new(sink));

        let handles: Vec<_> = (1..=16)
            .map(|track| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for _ in 0..4 {
                        shared.handle_text(&format!("solo track {track}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("join");
        }

        // 64 exclusive solos, each a contiguous run of 16 messages
        let messages = receiver.drain();
        assert_eq!(messages.len(), 16 * 64);
        let soloed = shared
            .with_session(|s| s.mixer().soloed().count())
            .expect("lock");
        assert_eq!(soloed, 1);
    }

    #[test]
    fn test_poisoned_lock_reports_error() {
        let shared = SharedSession::new(Session::new(NullSink));

        let poisoner = shared.clone();
        let result = thread::spawn(move || {
            poisoner
                .with_session(|_| panic!("boom"))
                .expect("lock");
        })
        .join();
        assert!(result.is_err());

        assert_eq!(shared.handle_text("play"), "Failed to acquire session lock");
        assert!(shared.with_session(|_| ()).is_err());
    }

    #[test]
    fn test_into_inner_requires_sole_owner() {
        let shared = SharedSession::new(Session::new(NullSink));
        let other = shared.clone();

        let shared = shared.into_inner().err().expect("still shared");
        drop(other);

        let session = shared.into_inner().ok().expect("sole owner");
        assert!(!session.mixer().transport().playing);
    }
}
