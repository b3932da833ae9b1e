//! Process-wide record store listener registry.

use crate::backlog::BacklogCounters;
use crate::delivery::EventDelivery;
use crate::dispatch::{DispatchReport, Dispatcher, StoreChange};
use crate::error::{RegistryError, Result};
use crate::isolate::IsolateIdentity;
use crate::listeners::ListenerDirectory;
use crate::types::{ChangeKind, IsolateId, ListenerBacklog, RecordId, SuiteId};
use parking_lot::Mutex;
use std::sync::Arc;

/// Registry configuration.
#[derive(Clone, Debug)]
pub struct RegistryConfig {
    /// Maximum number of concurrently live isolates.
    /// Default: 16
    pub max_isolates: usize,

    /// Events an isolate inbox can hold before overflowing.
    /// Default: 10
    pub notification_queue_size: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_isolates: 16,
            notification_queue_size: 10,
        }
    }
}

impl RegistryConfig {
    /// Backlog at which a listener is asked to acknowledge: half the queue.
    pub fn ack_threshold(&self) -> u32 {
        u32::try_from(self.notification_queue_size / 2).unwrap_or(u32::MAX)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_isolates == 0 {
            return Err(RegistryError::InvalidConfig(
                "max_isolates must be at least 1".to_string(),
            ));
        }
        if self.notification_queue_size < 2 {
            return Err(RegistryError::InvalidConfig(format!(
                "notification_queue_size must be at least 2, got {}",
                self.notification_queue_size
            )));
        }
        Ok(())
    }
}

/// Directory and counters, always locked together.
struct RegistryState {
    listeners: ListenerDirectory,
    backlog: BacklogCounters,
}

/// Lets isolates listen for changes to record stores and fans out
/// change events to them.
///
/// Every operation runs under a single lock covering both the listener
/// directory and the backlog counters, so a notification can never bump a
/// counter that a concurrent `stop_listening` is dropping.
pub struct RecordStoreRegistry {
    config: RegistryConfig,
    state: Mutex<RegistryState>,
    dispatcher: Dispatcher,
    identity: Arc<dyn IsolateIdentity>,
}

impl RecordStoreRegistry {
    /// Create a registry delivering through `delivery` and identifying
    /// callers through `identity`.
    pub fn new(
        config: RegistryConfig,
        delivery: Arc<dyn EventDelivery>,
        identity: Arc<dyn IsolateIdentity>,
    ) -> Result<Self> {
        config.validate()?;

        let state = RegistryState {
            listeners: ListenerDirectory::new(config.max_isolates),
            backlog: BacklogCounters::new(config.max_isolates),
        };
        let dispatcher = Dispatcher::new(delivery, config.ack_threshold());

        Ok(Self {
            config,
            state: Mutex::new(state),
            dispatcher,
            identity,
        })
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn current_isolate(&self) -> IsolateId {
        self.identity.current_isolate()
    }

    // --- Lifecycle Hooks ---

    /// Start listening to a store on behalf of the calling isolate.
    ///
    /// On error the caller is not subscribed.
    pub fn start_listening(&self, suite: SuiteId, name: &str) -> Result<()> {
        let isolate = self.current_isolate();
        let mut state = self.state.lock();

        if let Err(e) = state.listeners.subscribe(suite, name, isolate) {
            tracing::error!(isolate = %isolate, error = %e, "record store listener not registered");
            return Err(e);
        }
        if let Err(e) = state.backlog.track(isolate) {
            // Only fails for an isolate without a counter, i.e. one that was
            // not listening anywhere before this call.
            state.listeners.unsubscribe(suite, name, isolate);
            tracing::error!(isolate = %isolate, error = %e, "record store listener not registered");
            return Err(e);
        }

        tracing::debug!(isolate = %isolate, suite = %suite, store = name, "started listening");
        Ok(())
    }

    /// Stop listening to a store on behalf of the calling isolate.
    ///
    /// An isolate left without any subscription also loses its backlog
    /// counter.
    pub fn stop_listening(&self, suite: SuiteId, name: &str) {
        let isolate = self.current_isolate();
        let mut state = self.state.lock();

        if !state.listeners.unsubscribe(suite, name, isolate) {
            return;
        }
        if !state.listeners.has_any_subscription(isolate) {
            state.backlog.remove(isolate);
        }

        tracing::debug!(isolate = %isolate, suite = %suite, store = name, "stopped listening");
    }

    /// Notify every other listener of the store about a committed change
    /// made by the calling isolate.
    pub fn notify(
        &self,
        suite: SuiteId,
        name: &str,
        change: ChangeKind,
        record_id: RecordId,
    ) -> DispatchReport {
        let originator = self.current_isolate();
        let change = StoreChange {
            suite,
            store_name: name,
            change,
            record_id,
        };

        let mut state = self.state.lock();
        let RegistryState { listeners, backlog } = &mut *state;
        self.dispatcher.dispatch(listeners, backlog, &change, originator)
    }

    /// Acknowledge the notifications received by the calling isolate.
    pub fn acknowledge(&self) {
        self.acknowledge_isolate(self.current_isolate());
    }

    /// Acknowledge the notifications received by `isolate`.
    pub fn acknowledge_isolate(&self, isolate: IsolateId) {
        self.state.lock().backlog.reset(isolate);
    }

    /// Reset the backlog counter of `isolate` without removing it.
    pub fn reset_notification_counter(&self, isolate: IsolateId) {
        self.state.lock().backlog.reset(isolate);
    }

    /// Forget everything about a terminated isolate. Safe to call repeatedly.
    pub fn on_isolate_terminated(&self, isolate: IsolateId) {
        let mut state = self.state.lock();
        let stores = state.listeners.remove_isolate_everywhere(isolate);
        state.backlog.remove(isolate);

        tracing::debug!(isolate = %isolate, stores, "cleaned up terminated isolate");
    }

    // --- Introspection ---

    /// Listeners of the store other than the calling isolate, with their
    /// outstanding notification counts.
    pub fn listeners(&self, suite: SuiteId, name: &str) -> Vec<ListenerBacklog> {
        let current = self.current_isolate();
        let state = self.state.lock();

        let Some(isolates) = state.listeners.find(suite, name) else {
            return Vec::new();
        };
        isolates
            .iter()
            .filter(|&&isolate| isolate != current)
            .map(|&isolate| ListenerBacklog {
                isolate,
                pending: state.backlog.get(isolate),
            })
            .collect()
    }

    /// All isolates listening to the store, or `None` if nobody is.
    pub fn subscribers(&self, suite: SuiteId, name: &str) -> Option<Vec<IsolateId>> {
        let state = self.state.lock();
        state
            .listeners
            .find(suite, name)
            .map(|isolates| isolates.iter().copied().collect())
    }

    /// Notifications sent to `isolate` since it last acknowledged.
    pub fn pending_notifications(&self, isolate: IsolateId) -> u32 {
        self.state.lock().backlog.get(isolate)
    }

    /// Whether `isolate` listens to at least one store.
    pub fn is_listening(&self, isolate: IsolateId) -> bool {
        self.state.lock().listeners.has_any_subscription(isolate)
    }

    /// Number of stores with at least one listener.
    pub fn store_count(&self) -> usize {
        self.state.lock().listeners.len()
    }
}
