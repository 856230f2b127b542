//! Shared workshop state
//!
//! One `Workshop` lives for the whole run. Each counter and the waiting line
//! sit behind their own dedicated lock, and no code path holds two of those
//! locks at once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::ids::ElfId;
use super::santa::Santa;
use crate::config::WorkshopConfig;
use crate::error::WorkshopError;
use crate::events::EventEmitter;
use crate::sync::{Multiset, Semaphore, SemaphoreSet, lock};

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The last reindeer was hitched and the sleigh left
    Delivered,
    /// An actor hit a fatal invariant violation
    Aborted(String),
}

/// Gates, counters and the waiting line shared by every actor
pub struct Workshop {
    config: WorkshopConfig,

    /// Held while Santa is serving a group or preparing the sleigh
    pub(crate) busy: Semaphore,
    /// Santa sleeps here; raised once per threshold crossing
    pub(crate) wake: Semaphore,
    /// Released fleet-size times when the sleigh is ready
    pub(crate) reindeer_gate: Semaphore,
    /// Released by the last hitched reindeer
    pub(crate) delivery: Semaphore,
    /// Bounds the waiting line to one group
    pub(crate) admission: Semaphore,
    /// One personal dispatch gate per elf
    pub(crate) elf_line: SemaphoreSet,

    /// Elves waiting for Santa; its lock also covers the wake-threshold check
    pub(crate) waiting_elves: Mutex<Multiset<ElfId>>,
    pub(crate) reindeer_arrived: Mutex<usize>,
    pub(crate) elves_being_helped: Mutex<usize>,
    pub(crate) reindeer_unhitched: Mutex<usize>,

    outcome: Mutex<Option<oneshot::Sender<Outcome>>>,
    closed: AtomicBool,
    pub(crate) events: EventEmitter,
}

impl Workshop {
    /// Allocate every gate, counter and set for a run
    ///
    /// This is the only way to obtain a [`Santa`], so exactly one coordinator
    /// exists per workshop.
    pub fn open(
        config: &WorkshopConfig,
        events: EventEmitter,
    ) -> Result<(Arc<Workshop>, Santa, oneshot::Receiver<Outcome>), WorkshopError> {
        debug!(?config, "Workshop::open: called");
        config.validate()?;

        let (outcome_tx, outcome_rx) = oneshot::channel();
        let workshop = Arc::new(Workshop {
            config: config.clone(),
            busy: Semaphore::new(1),
            wake: Semaphore::new(0),
            reindeer_gate: Semaphore::new(0),
            delivery: Semaphore::new(0),
            admission: Semaphore::new(config.elves_per_group),
            elf_line: SemaphoreSet::new(config.elves, 0),
            waiting_elves: Mutex::new(Multiset::with_capacity(config.elves_per_group)),
            reindeer_arrived: Mutex::new(0),
            elves_being_helped: Mutex::new(0),
            reindeer_unhitched: Mutex::new(0),
            outcome: Mutex::new(Some(outcome_tx)),
            closed: AtomicBool::new(false),
            events,
        });

        let santa = Santa::new(Arc::clone(&workshop));
        info!(
            elves = config.elves,
            group_size = config.elves_per_group,
            fleet_size = config.reindeer,
            "Workshop opened"
        );
        Ok((workshop, santa, outcome_rx))
    }

    pub fn elf_count(&self) -> usize {
        self.config.elves
    }

    /// Elves that must gather before Santa helps any of them
    pub fn group_size(&self) -> usize {
        self.config.elves_per_group
    }

    /// Reindeer that must return before the sleigh is prepared
    pub fn fleet_size(&self) -> usize {
        self.config.reindeer
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Fail with `Closed` once cleanup has run
    pub fn ensure_open(&self) -> Result<(), WorkshopError> {
        if self.is_closed() {
            return Err(WorkshopError::Closed);
        }
        Ok(())
    }

    /// Report the terminal outcome; only the first report is delivered
    pub(crate) fn finish(&self, outcome: Outcome) -> bool {
        let sender = lock(&self.outcome).take();
        match sender {
            Some(tx) => {
                info!(?outcome, "Workshop finished");
                let _ = tx.send(outcome);
                true
            }
            None => {
                warn!(?outcome, "Workshop already finished, ignoring outcome");
                false
            }
        }
    }

    /// Release every gate and empty the waiting line
    ///
    /// Idempotent: returns `true` only for the call that performed cleanup.
    /// Blocked actors wake with `WorkshopError::Closed`.
    pub fn close(&self) -> bool {
        if self
            .closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Workshop::close: already closed");
            return false;
        }

        self.busy.close();
        self.wake.close();
        self.reindeer_gate.close();
        self.delivery.close();
        self.admission.close();
        self.elf_line.close();
        lock(&self.waiting_elves).clear();

        info!("Workshop closed");
        self.events.workshop_closed();
        true
    }

    // === Snapshots ===

    /// Admission slots currently free
    pub fn admission_available(&self) -> usize {
        self.admission.available()
    }

    /// Elves currently in the waiting line
    pub fn waiting_elves(&self) -> usize {
        lock(&self.waiting_elves).cardinality()
    }

    /// Reindeer back from vacation and not yet dispatched
    pub fn reindeer_arrived(&self) -> usize {
        *lock(&self.reindeer_arrived)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventBus, WorkshopEvent};

    fn config(elves: usize, group: usize, reindeer: usize) -> WorkshopConfig {
        WorkshopConfig {
            elves,
            elves_per_group: group,
            reindeer,
        }
    }

    #[test]
    fn test_open_initial_state() {
        let (workshop, _santa, _rx) = Workshop::open(&config(9, 3, 10), EventEmitter::detached()).unwrap();

        assert_eq!(workshop.admission_available(), 3);
        assert_eq!(workshop.busy.available(), 1);
        assert_eq!(workshop.wake.available(), 0);
        assert_eq!(workshop.reindeer_gate.available(), 0);
        assert_eq!(workshop.elf_line.len(), 9);
        assert_eq!(workshop.waiting_elves(), 0);
        assert_eq!(workshop.reindeer_arrived(), 0);
        assert_eq!(workshop.group_size(), 3);
        assert_eq!(workshop.fleet_size(), 10);
        assert_eq!(workshop.elf_count(), 9);
    }

    #[test]
    fn test_open_rejects_bad_config() {
        let result = Workshop::open(&config(9, 0, 10), EventEmitter::detached());
        assert!(matches!(result, Err(WorkshopError::Setup(_))));
    }

    #[test]
    fn test_close_is_idempotent() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let (workshop, _santa, _outcome) = Workshop::open(&config(3, 3, 1), bus.emitter()).unwrap();

        assert!(workshop.close());
        assert!(!workshop.close());
        assert!(workshop.is_closed());
        assert!(workshop.ensure_open().unwrap_err().is_closed());
        assert!(workshop.admission.acquire().unwrap_err().is_closed());

        let mut closed_events = 0;
        while let Ok(event) = rx.try_recv() {
            if event == WorkshopEvent::WorkshopClosed {
                closed_events += 1;
            }
        }
        assert_eq!(closed_events, 1);
    }

    #[test]
    fn test_finish_delivers_first_outcome_only() {
        let (workshop, _santa, mut rx) = Workshop::open(&config(0, 3, 1), EventEmitter::detached()).unwrap();

        assert!(workshop.finish(Outcome::Delivered));
        assert!(!workshop.finish(Outcome::Aborted("late".to_string())));
        assert_eq!(rx.try_recv().unwrap(), Outcome::Delivered);
    }
}
