//! In-memory storage primitives used by repository adapters.
//!
//! [`MemoryTable`] is an append-only row store with predicate scans and
//! [`KeyedLocks`] hands out async mutual exclusion per logical key, so
//! adapters can serialize check-then-insert sequences without a global lock.

mod locks;
mod table;

pub use locks::{KeyGuard, KeyedLocks};
pub use table::MemoryTable;
