//! The subscription seam between a key-event source and capture sessions.

use crate::event::KeyEvent;
use crate::session::{Session, SessionId, WeakSession, lock};
use std::sync::Mutex;
use tracing::trace;

/// What the source should do with a key after the sessions have seen it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Let the key reach other applications.
    PassThrough,
    /// Hide the key from other applications.
    Suppress,
}

/// A facility that delivers key events to subscribed sessions.
///
/// A session subscribes when it starts and unsubscribes exactly once when it
/// terminates. Sources may still deliver events afterwards; sessions ignore them.
///
/// Both calls are made with the session's state locked, so implementations must
/// not call back into the session.
pub trait KeySource: Send + Sync {
    fn subscribe(&self, session: &Session);
    fn unsubscribe(&self, id: SessionId);
}

/// In-process key source dispatching events to sessions in subscription order.
#[derive(Default)]
pub struct KeyBus {
    subscribers: Mutex<Vec<(SessionId, WeakSession)>>,
}

impl KeyBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver one event to every live subscriber.
    ///
    /// Returns [`Disposition::Suppress`] if any session hides the key.
    pub fn dispatch(&self, event: &KeyEvent) -> Disposition {
        // Snapshot first: a session that terminates on this event unsubscribes
        // while we iterate.
        let targets: Vec<Session> = lock(&self.subscribers)
            .iter()
            .filter_map(|(_, weak)| weak.upgrade())
            .collect();
        trace!(key = %event.key, down = event.down, sessions = targets.len(), "Dispatching key");
        targets
            .iter()
            .map(|session| session.handle_key(event))
            .fold(Disposition::PassThrough, |acc, d| {
                if d == Disposition::Suppress { d } else { acc }
            })
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.subscribers).len()
    }
}

impl KeySource for KeyBus {
    fn subscribe(&self, session: &Session) {
        let mut subscribers = lock(&self.subscribers);
        subscribers.retain(|(id, weak)| *id != session.id() && weak.is_alive());
        subscribers.push((session.id(), session.downgrade()));
    }

    fn unsubscribe(&self, id: SessionId) {
        lock(&self.subscribers).retain(|(sub, _)| *sub != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_dispatch_reaches_subscribed_session() {
        let bus = Arc::new(KeyBus::new());
        let session = Session::new(bus.clone());
        session.start();
        assert_eq!(bus.subscriber_count(), 1);

        bus.dispatch(&KeyEvent::char('h'));
        bus.dispatch(&KeyEvent::char('i'));
        assert_eq!(session.input(), "hi");
    }

    #[test]
    fn test_unsubscribed_after_termination() {
        let bus = Arc::new(KeyBus::new());
        let session = Session::new(bus.clone());
        session.setup("", "{Enter}", "").unwrap();
        session.start();
        bus.dispatch(&KeyEvent::named("Enter"));
        assert!(!session.in_progress());
        assert_eq!(bus.subscriber_count(), 0);

        // Late events are not delivered any more.
        bus.dispatch(&KeyEvent::char('x'));
        assert_eq!(session.input(), "");
    }

    #[test]
    fn test_suppress_when_text_hidden() {
        let bus = Arc::new(KeyBus::new());
        let session = Session::new(bus.clone());
        session.start();
        assert_eq!(bus.dispatch(&KeyEvent::char('a')), Disposition::Suppress);
        assert_eq!(bus.dispatch(&KeyEvent::named("F1")), Disposition::PassThrough);
    }

    #[test]
    fn test_dropped_session_is_skipped() {
        let bus = Arc::new(KeyBus::new());
        {
            let session = Session::new(bus.clone());
            session.start();
        }
        assert_eq!(bus.dispatch(&KeyEvent::char('a')), Disposition::PassThrough);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
