//! Bounded table of notification counters.

use crate::error::{RegistryError, Result};
use crate::types::IsolateId;
use std::collections::HashMap;

/// Notifications sent to each isolate since its last acknowledgment.
///
/// Holds at most `capacity` entries, one per isolate. Not synchronized.
pub struct BacklogCounters {
    counters: HashMap<IsolateId, u32>,
    capacity: usize,
}

impl BacklogCounters {
    pub fn new(capacity: usize) -> Self {
        Self {
            counters: HashMap::with_capacity(capacity),
            capacity,
        }
    }

    fn check_room(&self, isolate: IsolateId) -> Result<()> {
        if self.counters.len() >= self.capacity {
            return Err(RegistryError::BacklogCapacity {
                isolate,
                limit: self.capacity,
            });
        }
        Ok(())
    }

    /// Make sure `isolate` has a counter, starting at zero if it is new.
    pub fn track(&mut self, isolate: IsolateId) -> Result<()> {
        if !self.counters.contains_key(&isolate) {
            self.check_room(isolate)?;
            self.counters.insert(isolate, 0);
        }
        Ok(())
    }

    /// Count one more notification for `isolate` and return the new value.
    pub fn increment(&mut self, isolate: IsolateId) -> Result<u32> {
        if let Some(count) = self.counters.get_mut(&isolate) {
            *count = count.saturating_add(1);
            return Ok(*count);
        }
        self.check_room(isolate)?;
        self.counters.insert(isolate, 1);
        Ok(1)
    }

    /// Set the counter back to zero, keeping the entry.
    pub fn reset(&mut self, isolate: IsolateId) {
        if let Some(count) = self.counters.get_mut(&isolate) {
            *count = 0;
        }
    }

    /// Forget the isolate entirely.
    pub fn remove(&mut self, isolate: IsolateId) -> bool {
        self.counters.remove(&isolate).is_some()
    }

    /// Current count, zero for unknown isolates.
    pub fn get(&self, isolate: IsolateId) -> u32 {
        self.counters.get(&isolate).copied().unwrap_or(0)
    }

    pub fn contains(&self, isolate: IsolateId) -> bool {
        self.counters.contains_key(&isolate)
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}
