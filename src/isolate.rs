//! Identity of the isolate making a call.

use crate::types::IsolateId;
use std::cell::Cell;
use std::marker::PhantomData;

/// Source of the calling isolate's identifier.
pub trait IsolateIdentity: Send + Sync {
    fn current_isolate(&self) -> IsolateId;
}

thread_local! {
    static CURRENT: Cell<IsolateId> = const { Cell::new(IsolateId::HOST) };
}

/// Isolate identity bound to the running thread.
///
/// A thread runs as [`IsolateId::HOST`] until it enters an isolate with
/// [`ThreadIsolate::enter`]; the previous identity comes back when the guard
/// is dropped.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadIsolate;

impl ThreadIsolate {
    pub fn enter(isolate: IsolateId) -> IsolateGuard {
        let previous = CURRENT.with(|current| current.replace(isolate));
        IsolateGuard {
            previous,
            _not_send: PhantomData,
        }
    }

    pub fn current() -> IsolateId {
        CURRENT.with(Cell::get)
    }
}

impl IsolateIdentity for ThreadIsolate {
    fn current_isolate(&self) -> IsolateId {
        Self::current()
    }
}

/// Restores the previous isolate of the thread on drop.
///
/// The guard is tied to the thread that entered the isolate and cannot be
/// moved to another one:
///
/// ```compile_fail
/// use record_store_registry::{IsolateId, ThreadIsolate};
///
/// let guard = ThreadIsolate::enter(IsolateId(9));
/// std::thread::spawn(move || drop(guard));
/// ```
#[must_use = "the isolate is left as soon as the guard is dropped"]
pub struct IsolateGuard {
    previous: IsolateId,
    _not_send: PhantomData<*const ()>,
}

impl Drop for IsolateGuard {
    fn drop(&mut self) {
        CURRENT.with(|current| current.set(self.previous));
    }
}
