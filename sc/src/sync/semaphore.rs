//! Counting semaphores
//!
//! `Semaphore` is the only blocking primitive the workshop protocol uses.
//! `acquire` is the single suspension point for every actor; `close` wakes all
//! blocked acquirers so cleanup can reclaim their threads.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::error::WorkshopError;

struct Permits {
    count: usize,
    closed: bool,
}

/// Counting semaphore with bulk release
pub struct Semaphore {
    permits: Mutex<Permits>,
    cv: Condvar,
}

impl Semaphore {
    /// Create a semaphore holding `value` permits
    pub fn new(value: usize) -> Self {
        Self {
            permits: Mutex::new(Permits {
                count: value,
                closed: false,
            }),
            cv: Condvar::new(),
        }
    }

    fn permits(&self) -> MutexGuard<'_, Permits> {
        self.permits.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block while no permit is available, then take one
    ///
    /// Returns `WorkshopError::Closed` once the semaphore has been closed, even
    /// if permits are still outstanding.
    pub fn acquire(&self) -> Result<(), WorkshopError> {
        let mut permits = self.permits();
        loop {
            if permits.closed {
                return Err(WorkshopError::Closed);
            }
            if permits.count > 0 {
                permits.count -= 1;
                return Ok(());
            }
            permits = self.cv.wait(permits).unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Return one permit, waking at most one blocked acquirer
    pub fn release(&self) {
        let mut permits = self.permits();
        permits.count += 1;
        self.cv.notify_one();
    }

    /// Return `n` permits at once
    pub fn release_n(&self, n: usize) {
        if n == 0 {
            return;
        }
        let mut permits = self.permits();
        permits.count += n;
        if n == 1 {
            self.cv.notify_one();
        } else {
            self.cv.notify_all();
        }
    }

    /// Permits currently available
    pub fn available(&self) -> usize {
        self.permits().count
    }

    /// Close the semaphore and wake every blocked acquirer
    pub fn close(&self) {
        let mut permits = self.permits();
        permits.closed = true;
        self.cv.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.permits().closed
    }
}

/// Addressable array of semaphores, one per worker
pub struct SemaphoreSet {
    gates: Vec<Semaphore>,
}

impl SemaphoreSet {
    /// Create `len` semaphores, each holding `value` permits
    pub fn new(len: usize, value: usize) -> Self {
        debug!(len, value, "SemaphoreSet::new: called");
        Self {
            gates: (0..len).map(|_| Semaphore::new(value)).collect(),
        }
    }

    fn gate(&self, index: usize) -> Result<&Semaphore, WorkshopError> {
        self.gates.get(index).ok_or_else(|| {
            WorkshopError::invariant(format!(
                "semaphore index {} out of range for set of {}",
                index,
                self.gates.len()
            ))
        })
    }

    /// Block on the semaphore at `index`
    pub fn acquire_at(&self, index: usize) -> Result<(), WorkshopError> {
        self.gate(index)?.acquire()
    }

    /// Release the semaphore at `index`
    pub fn release_at(&self, index: usize) -> Result<(), WorkshopError> {
        self.gate(index)?.release();
        Ok(())
    }

    /// Permits available at `index`
    pub fn available_at(&self, index: usize) -> Result<usize, WorkshopError> {
        Ok(self.gate(index)?.available())
    }

    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Close every semaphore in the set
    pub fn close(&self) {
        for gate in &self.gates {
            gate.close();
        }
    }
}
