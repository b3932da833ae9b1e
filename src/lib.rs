//! # Record Store Registry
//!
//! A process-wide directory letting isolates (separately scheduled execution
//! contexts sharing one host process) listen for changes to record stores,
//! and delivering change events to every listener except the writer.
//!
//! ## Core Concepts
//!
//! - **Listeners**: isolates subscribed to a `(suite, store name)` pair
//! - **Backlog**: per-isolate count of notifications not yet acknowledged
//! - **Acknowledgment**: every `notification_queue_size / 2` events a listener
//!   is asked to acknowledge, resetting its backlog
//! - **Delivery**: non-blocking hand-off into an isolate's inbox
//!
//! ## Example
//!
//! ```ignore
//! use record_store_registry::*;
//! use std::sync::Arc;
//!
//! let config = RegistryConfig::default();
//! let mailboxes = Arc::new(Mailboxes::new(config.notification_queue_size));
//! let registry = RecordStoreRegistry::new(config, mailboxes.clone(), Arc::new(ThreadIsolate))?;
//!
//! // Isolate 2 listens to "prefs"
//! let inbox = mailboxes.open(IsolateId(2));
//! {
//!     let _isolate = ThreadIsolate::enter(IsolateId(2));
//!     registry.start_listening(SuiteId(7), "prefs")?;
//! }
//!
//! // Isolate 1 writes to "prefs"
//! let _isolate = ThreadIsolate::enter(IsolateId(1));
//! registry.notify(SuiteId(7), "prefs", ChangeKind::Changed, RecordId(3));
//!
//! let event = inbox.recv()?;
//! if event.ack_required {
//!     registry.acknowledge_isolate(inbox.isolate);
//! }
//! ```

pub mod backlog;
pub mod delivery;
pub mod dispatch;
pub mod error;
pub mod isolate;
pub mod listeners;
pub mod registry;
pub mod types;

// Re-exports
pub use backlog::BacklogCounters;
pub use delivery::{DeliveryError, EventDelivery, Inbox, Mailboxes};
pub use dispatch::{requires_acknowledgment, DispatchReport, Dispatcher, StoreChange};
pub use error::{RegistryError, Result};
pub use isolate::{IsolateGuard, IsolateIdentity, ThreadIsolate};
pub use listeners::ListenerDirectory;
pub use registry::{RecordStoreRegistry, RegistryConfig};
pub use types::*;
