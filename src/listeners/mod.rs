//! Directory of record store listeners.
//!
//! Maps each `(suite, store name)` pair with at least one listener to the set
//! of isolates listening to it. Entries never exist with an empty set: the
//! entry is removed together with its last listener.

mod directory;

pub use directory::ListenerDirectory;
