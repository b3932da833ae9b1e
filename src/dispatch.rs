//! Fan-out of a record store change to its listeners.

use crate::backlog::BacklogCounters;
use crate::delivery::EventDelivery;
use crate::listeners::ListenerDirectory;
use crate::types::{ChangeKind, IsolateId, RecordId, StoreChangeEvent, SuiteId};
use std::sync::Arc;

/// A committed mutation of a record store.
#[derive(Clone, Copy, Debug)]
pub struct StoreChange<'a> {
    pub suite: SuiteId,
    pub store_name: &'a str,
    pub change: ChangeKind,
    pub record_id: RecordId,
}

/// Outcome of one dispatch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Isolates whose inbox accepted the event.
    pub delivered: Vec<IsolateId>,
    /// Isolates that could not be notified. Never an error for the caller.
    pub failed: Vec<IsolateId>,
    /// Isolates asked to acknowledge with this event.
    pub ack_requested: Vec<IsolateId>,
}

impl DispatchReport {
    /// Listeners that were attempted, delivered or not.
    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }
}

/// Whether the notification that brought a backlog to `count` must ask for
/// an acknowledgment. Fires once per `threshold` unacknowledged events.
pub fn requires_acknowledgment(count: u32, threshold: u32) -> bool {
    threshold > 0 && count > 0 && count % threshold == 0
}

/// Sends change events to every listener of a store except the writer.
pub struct Dispatcher {
    delivery: Arc<dyn EventDelivery>,
    ack_threshold: u32,
}

impl Dispatcher {
    pub fn new(delivery: Arc<dyn EventDelivery>, ack_threshold: u32) -> Self {
        Self {
            delivery,
            ack_threshold,
        }
    }

    pub fn ack_threshold(&self) -> u32 {
        self.ack_threshold
    }

    /// Notify the listeners of `change`, skipping `originator`.
    ///
    /// Every recipient's backlog is bumped before the hand-off. A recipient
    /// that cannot be reached is recorded in the report and the fan-out
    /// carries on.
    pub fn dispatch(
        &self,
        listeners: &ListenerDirectory,
        backlog: &mut BacklogCounters,
        change: &StoreChange<'_>,
        originator: IsolateId,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();

        let Some(targets) = listeners.find(change.suite, change.store_name) else {
            return report;
        };

        for &target in targets.iter().filter(|&&t| t != originator) {
            let count = match backlog.increment(target) {
                Ok(count) => count,
                Err(e) => {
                    tracing::error!(isolate = %target, error = %e, "cannot count notification");
                    report.failed.push(target);
                    continue;
                }
            };
            let ack_required = requires_acknowledgment(count, self.ack_threshold);

            let event = StoreChangeEvent {
                suite: change.suite,
                store_name: change.store_name.to_string(),
                change: change.change,
                record_id: change.record_id,
                ack_required,
            };

            match self.delivery.deliver(target, event) {
                Ok(()) => {
                    tracing::debug!(
                        isolate = %target,
                        suite = %change.suite,
                        store = change.store_name,
                        backlog = count,
                        ack_required,
                        "notified isolate of record store change"
                    );
                    if ack_required {
                        report.ack_requested.push(target);
                    }
                    report.delivered.push(target);
                }
                Err(e) => {
                    tracing::debug!(isolate = %target, error = %e, "dropped record store notification");
                    report.failed.push(target);
                }
            }
        }

        report
    }
}
