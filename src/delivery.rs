//! Hand-off of change events into isolate inboxes.
//!
//! The dispatcher only sees [`EventDelivery`]. [`Mailboxes`] is the in-process
//! implementation: one bounded channel per live isolate, written with
//! `try_send` so the notifier never waits on a slow receiver.

use crate::types::{IsolateId, StoreChangeEvent};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Why an event could not be placed in an inbox.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("Isolate {0} is not schedulable")]
    NotSchedulable(IsolateId),

    #[error("Inbox of isolate {0} is full")]
    InboxFull(IsolateId),
}

/// Best-effort, non-blocking event delivery to an isolate.
///
/// `deliver` is called while the registry holds its lock. Implementations
/// must not block and must not call back into the registry (for instance
/// `acknowledge_isolate`), or they deadlock.
pub trait EventDelivery: Send + Sync {
    fn deliver(&self, target: IsolateId, event: StoreChangeEvent) -> Result<(), DeliveryError>;
}

/// Receiving end of an isolate's inbox.
pub struct Inbox {
    pub isolate: IsolateId,
    receiver: Receiver<StoreChangeEvent>,
}

impl Inbox {
    /// Receive the next event (blocking).
    pub fn recv(&self) -> Result<StoreChangeEvent, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Result<StoreChangeEvent, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: Duration,
    ) -> Result<StoreChangeEvent, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Events waiting in the inbox.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Drain everything currently queued.
    pub fn drain(&self) -> Vec<StoreChangeEvent> {
        self.receiver.try_iter().collect()
    }
}

/// Inboxes of all live isolates.
pub struct Mailboxes {
    senders: RwLock<HashMap<IsolateId, Sender<StoreChangeEvent>>>,
    queue_size: usize,
}

impl Mailboxes {
    /// Create a mailbox table whose inboxes hold `queue_size` events each.
    pub fn new(queue_size: usize) -> Self {
        Self {
            senders: RwLock::new(HashMap::new()),
            queue_size,
        }
    }

    /// Open (or replace) the inbox of `isolate`.
    pub fn open(&self, isolate: IsolateId) -> Inbox {
        let (sender, receiver) = bounded(self.queue_size);
        self.senders.write().insert(isolate, sender);
        Inbox { isolate, receiver }
    }

    /// Close the inbox of `isolate`. Later deliveries to it fail.
    pub fn close(&self, isolate: IsolateId) {
        self.senders.write().remove(&isolate);
    }

    pub fn is_open(&self, isolate: IsolateId) -> bool {
        self.senders.read().contains_key(&isolate)
    }
}

impl EventDelivery for Mailboxes {
    fn deliver(&self, target: IsolateId, event: StoreChangeEvent) -> Result<(), DeliveryError> {
        let senders = self.senders.read();
        let sender = senders
            .get(&target)
            .ok_or(DeliveryError::NotSchedulable(target))?;
        match sender.try_send(event) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(DeliveryError::InboxFull(target)),
            Err(TrySendError::Disconnected(_)) => Err(DeliveryError::NotSchedulable(target)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChangeKind, RecordId, SuiteId};

    fn make_event(record: u32) -> StoreChangeEvent {
        StoreChangeEvent {
            suite: SuiteId(1),
            store_name: "scores".to_string(),
            change: ChangeKind::Added,
            record_id: RecordId(record),
            ack_required: false,
        }
    }

    #[test]
    fn test_deliver_to_open_inbox() {
        let mailboxes = Mailboxes::new(4);
        let inbox = mailboxes.open(IsolateId(2));

        mailboxes.deliver(IsolateId(2), make_event(1)).unwrap();

        let event = inbox.recv_timeout(Duration::from_millis(100)).unwrap();
        assert_eq!(event.record_id, RecordId(1));
    }

    #[test]
    fn test_deliver_to_unknown_isolate_fails() {
        let mailboxes = Mailboxes::new(4);
        let result = mailboxes.deliver(IsolateId(9), make_event(1));
        assert_eq!(result, Err(DeliveryError::NotSchedulable(IsolateId(9))));
    }

    #[test]
    fn test_full_inbox_does_not_block() {
        let mailboxes = Mailboxes::new(2);
        let inbox = mailboxes.open(IsolateId(2));

        mailboxes.deliver(IsolateId(2), make_event(1)).unwrap();
        mailboxes.deliver(IsolateId(2), make_event(2)).unwrap();
        let result = mailboxes.deliver(IsolateId(2), make_event(3));
        assert_eq!(result, Err(DeliveryError::InboxFull(IsolateId(2))));

        assert_eq!(inbox.len(), 2);
    }

    #[test]
    fn test_dropped_inbox_is_not_schedulable() {
        let mailboxes = Mailboxes::new(2);
        let inbox = mailboxes.open(IsolateId(2));
        drop(inbox);

        let result = mailboxes.deliver(IsolateId(2), make_event(1));
        assert_eq!(result, Err(DeliveryError::NotSchedulable(IsolateId(2))));
    }

    #[test]
    fn test_close() {
        let mailboxes = Mailboxes::new(2);
        let _inbox = mailboxes.open(IsolateId(2));
        assert!(mailboxes.is_open(IsolateId(2)));

        mailboxes.close(IsolateId(2));
        assert!(!mailboxes.is_open(IsolateId(2)));
        assert!(mailboxes.deliver(IsolateId(2), make_event(1)).is_err());
    }
}
