//! Event Bus - central pub/sub for workshop narration
//!
//! The EventBus uses a tokio broadcast channel. Actor threads emit synchronously
//! (a broadcast send never blocks); the narrator and tests subscribe.

use tokio::sync::broadcast;
use tracing::debug;

use super::types::WorkshopEvent;
use crate::workshop::{ElfId, ReindeerId};

/// Default channel capacity (events)
pub const DEFAULT_CHANNEL_CAPACITY: usize = 10_000;

/// Central event bus for workshop activity
pub struct EventBus {
    tx: broadcast::Sender<WorkshopEvent>,
}

impl EventBus {
    /// Create a new event bus with the given capacity
    pub fn new(capacity: usize) -> Self {
        debug!(capacity, "EventBus::new: creating event bus");
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Create a new event bus with default capacity
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Emit an event to all subscribers
    ///
    /// Fire-and-forget: with no subscribers the event is dropped.
    pub fn emit(&self, event: WorkshopEvent) {
        let _ = self.tx.send(event);
    }

    /// Subscribe to events emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<WorkshopEvent> {
        debug!("EventBus::subscribe: new subscriber");
        self.tx.subscribe()
    }

    /// Create an emitter handle for actors
    pub fn emitter(&self) -> EventEmitter {
        EventEmitter { tx: self.tx.clone() }
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

/// Handle for actors to emit events without owning the bus
#[derive(Clone)]
pub struct EventEmitter {
    tx: broadcast::Sender<WorkshopEvent>,
}

impl EventEmitter {
    /// Emitter whose events go nowhere
    pub fn detached() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Emit a raw event
    pub fn emit(&self, event: WorkshopEvent) {
        debug!(event_type = event.event_type(), actor = %event.actor(), "EventEmitter::emit");
        let _ = self.tx.send(event);
    }

    // === Convenience methods ===

    pub fn santa_sleeping(&self) {
        self.emit(WorkshopEvent::SantaSleeping);
    }

    pub fn santa_awake(&self) {
        self.emit(WorkshopEvent::SantaAwake);
    }

    pub fn santa_noticed_elves(&self, waiting: usize) {
        self.emit(WorkshopEvent::SantaNoticedElves { waiting });
    }

    pub fn santa_helping_elf(&self, elf: ElfId) {
        self.emit(WorkshopEvent::SantaHelpingElf { elf });
    }

    pub fn elves_dispatched(&self, elves: &[ElfId]) {
        self.emit(WorkshopEvent::ElvesDispatched { elves: elves.to_vec() });
    }

    pub fn sleigh_prepared(&self, released: usize) {
        self.emit(WorkshopEvent::SleighPrepared { released });
    }

    pub fn elf_working(&self, elf: ElfId) {
        self.emit(WorkshopEvent::ElfWorking { elf });
    }

    pub fn elf_needs_help(&self, elf: ElfId) {
        self.emit(WorkshopEvent::ElfNeedsHelp { elf });
    }

    pub fn elf_in_line(&self, elf: ElfId, waiting: usize) {
        self.emit(WorkshopEvent::ElfInLine { elf, waiting });
    }

    pub fn elves_woke_santa(&self, elf: ElfId) {
        self.emit(WorkshopEvent::ElvesWokeSanta { elf });
    }

    pub fn elf_helped(&self, elf: ElfId) {
        self.emit(WorkshopEvent::ElfHelped { elf });
    }

    pub fn group_served(&self, elf: ElfId, replenished: usize) {
        self.emit(WorkshopEvent::GroupServed { elf, replenished });
    }

    pub fn reindeer_vacationing(&self, reindeer: ReindeerId) {
        self.emit(WorkshopEvent::ReindeerVacationing { reindeer });
    }

    pub fn reindeer_returned(&self, reindeer: ReindeerId, arrived: usize) {
        self.emit(WorkshopEvent::ReindeerReturned { reindeer, arrived });
    }

    pub fn reindeer_woke_santa(&self, reindeer: ReindeerId) {
        self.emit(WorkshopEvent::ReindeerWokeSanta { reindeer });
    }

    pub fn reindeer_hitched(&self, reindeer: ReindeerId, remaining: usize) {
        self.emit(WorkshopEvent::ReindeerHitched { reindeer, remaining });
    }

    pub fn sleigh_departed(&self) {
        self.emit(WorkshopEvent::SleighDeparted);
    }

    pub fn workshop_closed(&self) {
        self.emit(WorkshopEvent::WorkshopClosed);
    }
}
