//! Elf worker loop
//!
//! Elves work, get stuck, and queue for Santa in groups. The admission gate
//! bounds the waiting line to one group, and each elf parks on its personal
//! dispatch gate until Santa picks it.

use std::sync::Arc;

use tracing::{debug, info};

use super::ids::ElfId;
use super::pacing::Pacer;
use super::state::Workshop;
use crate::error::WorkshopError;
use crate::sync::lock;

pub struct Elf {
    id: ElfId,
    workshop: Arc<Workshop>,
    pacer: Pacer,
}

impl Elf {
    pub fn new(id: ElfId, workshop: Arc<Workshop>, pacer: Pacer) -> Self {
        Self { id, workshop, pacer }
    }

    pub fn id(&self) -> ElfId {
        self.id
    }

    /// Work and ask for help forever; returns only with an error
    ///
    /// `WorkshopError::Closed` is the normal way out.
    pub fn run(mut self) -> Result<(), WorkshopError> {
        info!(elf = %self.id, "Elf started");
        loop {
            self.workshop.events.elf_working(self.id);
            self.pacer.pause();
            self.workshop.ensure_open()?;

            self.workshop.events.elf_needs_help(self.id);
            self.workshop.admission.acquire()?;
            self.get_in_line()?;

            self.workshop.elf_line.acquire_at(self.id.index())?;
            self.get_help()?;
        }
    }

    /// Join the waiting line; the elf completing a group wakes Santa
    pub(crate) fn get_in_line(&self) -> Result<(), WorkshopError> {
        let ws = &self.workshop;
        let group = ws.group_size();

        let mut waiting = lock(&ws.waiting_elves);
        waiting.insert(self.id);
        let count = waiting.cardinality();
        ws.events.elf_in_line(self.id, count);

        if count > group {
            return Err(WorkshopError::invariant(format!(
                "{} elves in line past admission for a group of {}",
                count, group
            )));
        }
        if count == group {
            debug!(elf = %self.id, "Elf::get_in_line: group complete, waking Santa");
            ws.events.elves_woke_santa(self.id);
            ws.wake.release();
        }
        Ok(())
    }

    /// Record help; the last elf of a group frees Santa and reopens admission
    pub(crate) fn get_help(&self) -> Result<(), WorkshopError> {
        let ws = &self.workshop;
        let group = ws.group_size();
        ws.events.elf_helped(self.id);

        let last = {
            let mut helped = lock(&ws.elves_being_helped);
            *helped = helped.checked_sub(1).ok_or_else(|| {
                WorkshopError::invariant(format!("elf {} helped with no group in progress", self.id))
            })?;
            *helped == 0
        };

        if last {
            ws.events.group_served(self.id, group);
            ws.busy.release();
            ws.admission.release_n(group);
        }
        Ok(())
    }
}
