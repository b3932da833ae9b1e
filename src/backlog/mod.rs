//! Per-isolate backlog of unacknowledged notifications.
//!
//! One counter per isolate, shared by every store the isolate listens to.

mod counters;

pub use counters::BacklogCounters;
