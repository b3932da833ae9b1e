//! Listener directory keyed by store.

use crate::error::{RegistryError, Result};
use crate::types::{IsolateId, StoreKey, SuiteId};
use std::collections::{HashMap, HashSet};

/// Subscriptions of isolates to record stores.
///
/// Not synchronized; the registry guards it with its own lock.
pub struct ListenerDirectory {
    entries: HashMap<StoreKey, HashSet<IsolateId>>,
    /// Upper bound on listeners per store (the live isolate limit).
    max_listeners: usize,
}

impl ListenerDirectory {
    pub fn new(max_listeners: usize) -> Self {
        Self {
            entries: HashMap::new(),
            max_listeners,
        }
    }

    /// Add `isolate` to the listeners of the store.
    ///
    /// Subscribing twice is a no-op. Going past the isolate limit means the
    /// scheduler has already broken its own invariant, so it is reported
    /// instead of being dropped.
    pub fn subscribe(&mut self, suite: SuiteId, name: &str, isolate: IsolateId) -> Result<()> {
        let key = StoreKey::new(suite, name);
        match self.entries.get_mut(&key) {
            Some(listeners) => {
                if listeners.contains(&isolate) {
                    return Ok(());
                }
                if listeners.len() >= self.max_listeners {
                    return Err(RegistryError::ListenerCapacity {
                        suite,
                        name: key.name,
                        limit: self.max_listeners,
                    });
                }
                listeners.insert(isolate);
            }
            None => {
                if self.max_listeners == 0 {
                    return Err(RegistryError::ListenerCapacity {
                        suite,
                        name: key.name,
                        limit: 0,
                    });
                }
                let mut listeners = HashSet::with_capacity(1);
                listeners.insert(isolate);
                self.entries.insert(key, listeners);
            }
        }
        Ok(())
    }

    /// Remove `isolate` from the listeners of the store.
    ///
    /// Returns true if it was listening.
    pub fn unsubscribe(&mut self, suite: SuiteId, name: &str, isolate: IsolateId) -> bool {
        let key = StoreKey::new(suite, name);
        let Some(listeners) = self.entries.get_mut(&key) else {
            return false;
        };
        let removed = listeners.remove(&isolate);
        if listeners.is_empty() {
            self.entries.remove(&key);
        }
        removed
    }

    /// Listeners of the store, if anyone listens to it.
    pub fn find(&self, suite: SuiteId, name: &str) -> Option<&HashSet<IsolateId>> {
        self.entries.get(&StoreKey::new(suite, name))
    }

    /// Drop `isolate` from every store it listens to.
    ///
    /// Returns the number of stores it was removed from.
    pub fn remove_isolate_everywhere(&mut self, isolate: IsolateId) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, listeners| {
            if listeners.remove(&isolate) {
                removed += 1;
            }
            !listeners.is_empty()
        });
        removed
    }

    /// Whether `isolate` listens to any store at all.
    pub fn has_any_subscription(&self, isolate: IsolateId) -> bool {
        self.entries
            .values()
            .any(|listeners| listeners.contains(&isolate))
    }

    /// Number of stores with at least one listener.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
