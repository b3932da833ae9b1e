//! Error handling and edge case tests.

use record_store_registry::{
    ChangeKind, IsolateId, Mailboxes, RecordId, RecordStoreRegistry, RegistryConfig,
    RegistryError, SuiteId, ThreadIsolate,
};
use std::sync::Arc;

fn test_registry(max_isolates: usize) -> RecordStoreRegistry {
    let config = RegistryConfig {
        max_isolates,
        ..Default::default()
    };
    let mailboxes = Arc::new(Mailboxes::new(config.notification_queue_size));
    RecordStoreRegistry::new(config, mailboxes, Arc::new(ThreadIsolate)).unwrap()
}

// --- Capacity Errors ---

#[test]
fn test_too_many_listeners_on_one_store() {
    let registry = test_registry(2);

    for id in 1..=2 {
        let _guard = ThreadIsolate::enter(IsolateId(id));
        registry.start_listening(SuiteId(1), "prefs").unwrap();
    }

    let _guard = ThreadIsolate::enter(IsolateId(3));
    let result = registry.start_listening(SuiteId(1), "prefs");
    assert_eq!(
        result,
        Err(RegistryError::ListenerCapacity {
            suite: SuiteId(1),
            name: "prefs".to_string(),
            limit: 2
        })
    );

    // Failed subscribe means not subscribed
    assert!(!registry.is_listening(IsolateId(3)));
    assert_eq!(registry.subscribers(SuiteId(1), "prefs").unwrap().len(), 2);
}

#[test]
fn test_capacity_error_message() {
    let err = RegistryError::BacklogCapacity {
        isolate: IsolateId(9),
        limit: 4,
    };
    assert_eq!(
        err.to_string(),
        "Backlog counter table is full (4 isolates), cannot track 9"
    );
}

#[test]
fn test_invalid_config() {
    let config = RegistryConfig {
        max_isolates: 4,
        notification_queue_size: 0,
    };
    let mailboxes = Arc::new(Mailboxes::new(1));
    let result = RecordStoreRegistry::new(config, mailboxes, Arc::new(ThreadIsolate));
    assert!(matches!(result, Err(RegistryError::InvalidConfig(_))));
}

// --- No-ops ---

#[test]
fn test_notify_without_listeners() {
    let registry = test_registry(4);
    let report = registry.notify(SuiteId(1), "nobody", ChangeKind::Added, RecordId(1));
    assert_eq!(report.attempted(), 0);
    assert_eq!(registry.store_count(), 0);
}

#[test]
fn test_notify_only_writer_listening() {
    let registry = test_registry(4);
    let _guard = ThreadIsolate::enter(IsolateId(1));
    registry.start_listening(SuiteId(1), "prefs").unwrap();

    let report = registry.notify(SuiteId(1), "prefs", ChangeKind::Added, RecordId(1));
    assert_eq!(report.attempted(), 0);
    assert_eq!(registry.pending_notifications(IsolateId(1)), 0);
}

#[test]
fn test_stop_listening_when_not_listening() {
    let registry = test_registry(4);
    let _guard = ThreadIsolate::enter(IsolateId(1));

    registry.stop_listening(SuiteId(1), "prefs");
    assert_eq!(registry.store_count(), 0);

    registry.start_listening(SuiteId(1), "prefs").unwrap();
    registry.stop_listening(SuiteId(1), "other");
    registry.stop_listening(SuiteId(2), "prefs");
    assert!(registry.is_listening(IsolateId(1)));
}

#[test]
fn test_acknowledge_without_backlog() {
    let registry = test_registry(4);
    let _guard = ThreadIsolate::enter(IsolateId(1));
    registry.acknowledge();
    registry.reset_notification_counter(IsolateId(5));
    assert_eq!(registry.pending_notifications(IsolateId(1)), 0);
}

#[test]
fn test_terminate_unknown_isolate() {
    let registry = test_registry(4);
    registry.on_isolate_terminated(IsolateId(12));
    registry.on_isolate_terminated(IsolateId(12));
    assert_eq!(registry.store_count(), 0);
}

#[test]
fn test_terminated_isolate_slot_is_reusable() {
    let registry = test_registry(1);
    {
        let _guard = ThreadIsolate::enter(IsolateId(1));
        registry.start_listening(SuiteId(1), "prefs").unwrap();
    }
    registry.on_isolate_terminated(IsolateId(1));

    let _guard = ThreadIsolate::enter(IsolateId(2));
    registry.start_listening(SuiteId(1), "prefs").unwrap();
    assert_eq!(registry.subscribers(SuiteId(1), "prefs"), Some(vec![IsolateId(2)]));
}

#[test]
fn test_stop_listening_frees_counter_slot() {
    let registry = test_registry(1);
    {
        let _guard = ThreadIsolate::enter(IsolateId(1));
        registry.start_listening(SuiteId(1), "prefs").unwrap();
        registry.stop_listening(SuiteId(1), "prefs");
    }

    // The counter of isolate 1 was removed, not just reset
    let _guard = ThreadIsolate::enter(IsolateId(2));
    assert_eq!(registry.start_listening(SuiteId(1), "other"), Ok(()));
    assert_eq!(registry.pending_notifications(IsolateId(1)), 0);
}
