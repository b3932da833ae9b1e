//! Core types for the registry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the suite (application) that owns a record store.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SuiteId(pub u32);

impl fmt::Debug for SuiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SuiteId({})", self.0)
    }
}

impl fmt::Display for SuiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an isolate: a separately scheduled execution context
/// sharing the host process.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IsolateId(pub u32);

impl IsolateId {
    /// The host isolate. Threads that never entered an isolate act as this one.
    pub const HOST: IsolateId = IsolateId(0);
}

impl fmt::Debug for IsolateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Isolate({})", self.0)
    }
}

impl fmt::Display for IsolateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a record inside a record store.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub u32);

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key of a subscription: the owning suite plus the store name.
///
/// Names compare by full equality, no prefix or case folding.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StoreKey {
    pub suite: SuiteId,
    pub name: String,
}

impl StoreKey {
    pub fn new(suite: SuiteId, name: impl Into<String>) -> Self {
        Self {
            suite,
            name: name.into(),
        }
    }
}

impl fmt::Debug for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StoreKey({}/{:?})", self.suite, self.name)
    }
}

/// Kind of mutation that happened to a record store.
///
/// The registry only carries this value to listeners, it never interprets it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Changed,
    Deleted,
}

/// A record store change, as handed to a listening isolate's inbox.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreChangeEvent {
    pub suite: SuiteId,
    pub store_name: String,
    pub change: ChangeKind,
    pub record_id: RecordId,
    /// The receiver must call back with an acknowledgment once it has
    /// processed this event.
    pub ack_required: bool,
}

/// A listener of a store together with its outstanding notification count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListenerBacklog {
    pub isolate: IsolateId,
    pub pending: u32,
}
