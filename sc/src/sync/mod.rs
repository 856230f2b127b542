//! Low-level synchronization primitives consumed by the workshop protocol
//!
//! - [`Semaphore`] / [`SemaphoreSet`]: counting gates, plain and addressable
//! - [`Multiset`]: the unordered waiting line
//! - [`lock`]: poison-tolerant mutex access for the guarded counters

mod multiset;
mod semaphore;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use multiset::Multiset;
pub use semaphore::{Semaphore, SemaphoreSet};

/// Lock a guarded counter or set
///
/// Every critical section in the workshop leaves its value consistent before
/// it can panic, so a poisoned lock still holds a usable value.
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
