//! Event types for workshop narration
//!
//! Every observable state transition of an actor is one event:
//! - Santa: sleeping, waking, helping elves, preparing the sleigh
//! - Elves: working, lining up, waking Santa, getting help
//! - Reindeer: vacationing, returning, getting hitched, departing

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workshop::{ElfId, ReindeerId};

/// Core event enum - the vocabulary of workshop activity
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WorkshopEvent {
    // === Santa ===
    /// Santa is idle and about to block on the wake gate
    SantaSleeping,
    /// Santa was woken and is deciding what to do
    SantaAwake,
    /// Santa found a full group of elves at the door
    SantaNoticedElves { waiting: usize },
    /// Santa signalled one elf's personal gate
    SantaHelpingElf { elf: ElfId },
    /// Santa drained a whole group from the waiting line
    ElvesDispatched { elves: Vec<ElfId> },
    /// Santa released the reindeer gate
    SleighPrepared { released: usize },

    // === Elves ===
    ElfWorking { elf: ElfId },
    ElfNeedsHelp { elf: ElfId },
    /// An elf joined the waiting line
    ElfInLine { elf: ElfId, waiting: usize },
    /// The elf that completed a group raised the wake gate
    ElvesWokeSanta { elf: ElfId },
    ElfHelped { elf: ElfId },
    /// The last helped elf of a group freed Santa and reopened admission
    GroupServed { elf: ElfId, replenished: usize },

    // === Reindeer ===
    ReindeerVacationing { reindeer: ReindeerId },
    ReindeerReturned { reindeer: ReindeerId, arrived: usize },
    /// The reindeer that completed the fleet raised the wake gate
    ReindeerWokeSanta { reindeer: ReindeerId },
    ReindeerHitched { reindeer: ReindeerId, remaining: usize },
    /// The last reindeer was hitched
    SleighDeparted,

    // === Lifecycle ===
    /// Cleanup ran and released every gate
    WorkshopClosed,
}

impl WorkshopEvent {
    /// Name of the actor that produced this event
    pub fn actor(&self) -> String {
        match self {
            WorkshopEvent::SantaSleeping
            | WorkshopEvent::SantaAwake
            | WorkshopEvent::SantaNoticedElves { .. }
            | WorkshopEvent::SantaHelpingElf { .. }
            | WorkshopEvent::ElvesDispatched { .. }
            | WorkshopEvent::SleighPrepared { .. }
            | WorkshopEvent::SleighDeparted => "Santa".to_string(),
            WorkshopEvent::ElfWorking { elf }
            | WorkshopEvent::ElfNeedsHelp { elf }
            | WorkshopEvent::ElfInLine { elf, .. }
            | WorkshopEvent::ElvesWokeSanta { elf }
            | WorkshopEvent::ElfHelped { elf }
            | WorkshopEvent::GroupServed { elf, .. } => format!("Elf {}", elf),
            WorkshopEvent::ReindeerVacationing { reindeer }
            | WorkshopEvent::ReindeerReturned { reindeer, .. }
            | WorkshopEvent::ReindeerWokeSanta { reindeer }
            | WorkshopEvent::ReindeerHitched { reindeer, .. } => format!("Reindeer {}", reindeer),
            WorkshopEvent::WorkshopClosed => "Workshop".to_string(),
        }
    }

    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            WorkshopEvent::SantaSleeping => "SantaSleeping",
            WorkshopEvent::SantaAwake => "SantaAwake",
            WorkshopEvent::SantaNoticedElves { .. } => "SantaNoticedElves",
            WorkshopEvent::SantaHelpingElf { .. } => "SantaHelpingElf",
            WorkshopEvent::ElvesDispatched { .. } => "ElvesDispatched",
            WorkshopEvent::SleighPrepared { .. } => "SleighPrepared",
            WorkshopEvent::ElfWorking { .. } => "ElfWorking",
            WorkshopEvent::ElfNeedsHelp { .. } => "ElfNeedsHelp",
            WorkshopEvent::ElfInLine { .. } => "ElfInLine",
            WorkshopEvent::ElvesWokeSanta { .. } => "ElvesWokeSanta",
            WorkshopEvent::ElfHelped { .. } => "ElfHelped",
            WorkshopEvent::GroupServed { .. } => "GroupServed",
            WorkshopEvent::ReindeerVacationing { .. } => "ReindeerVacationing",
            WorkshopEvent::ReindeerReturned { .. } => "ReindeerReturned",
            WorkshopEvent::ReindeerWokeSanta { .. } => "ReindeerWokeSanta",
            WorkshopEvent::ReindeerHitched { .. } => "ReindeerHitched",
            WorkshopEvent::SleighDeparted => "SleighDeparted",
            WorkshopEvent::WorkshopClosed => "WorkshopClosed",
        }
    }
}

/// Timestamped wrapper used for machine-readable narration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: WorkshopEvent,
}

impl EventLogEntry {
    pub fn new(event: WorkshopEvent) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
        }
    }
}
