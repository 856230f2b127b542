//! Reindeer: one vacation, one return, one hitch

use std::sync::Arc;

use tracing::{debug, info};

use super::ids::ReindeerId;
use super::pacing::Pacer;
use super::state::Workshop;
use crate::error::WorkshopError;
use crate::sync::lock;

pub struct Reindeer {
    id: ReindeerId,
    workshop: Arc<Workshop>,
    pacer: Pacer,
}

impl Reindeer {
    pub fn new(id: ReindeerId, workshop: Arc<Workshop>, pacer: Pacer) -> Self {
        Self { id, workshop, pacer }
    }

    pub fn id(&self) -> ReindeerId {
        self.id
    }

    /// Vacation, return, wait for the sleigh, get hitched
    pub fn run(mut self) -> Result<(), WorkshopError> {
        info!(reindeer = %self.id, "Reindeer started");
        self.workshop.events.reindeer_vacationing(self.id);
        self.pacer.pause();
        self.workshop.ensure_open()?;

        self.return_from_vacation()?;
        self.workshop.reindeer_gate.acquire()?;
        self.get_hitched()
    }

    /// Count this reindeer in; the last one back wakes Santa
    pub(crate) fn return_from_vacation(&self) -> Result<(), WorkshopError> {
        let ws = &self.workshop;
        let fleet = ws.fleet_size();

        let mut arrived = lock(&ws.reindeer_arrived);
        *arrived += 1;
        let count = *arrived;
        ws.events.reindeer_returned(self.id, count);

        if count > fleet {
            return Err(WorkshopError::invariant(format!(
                "{} reindeer returned for a fleet of {}",
                count, fleet
            )));
        }
        if count == fleet {
            debug!(reindeer = %self.id, "Reindeer::return_from_vacation: fleet complete, waking Santa");
            ws.events.reindeer_woke_santa(self.id);
            ws.wake.release();
        }
        Ok(())
    }

    /// Take one hitching slot; the last reindeer hitched lets the sleigh go
    pub(crate) fn get_hitched(&self) -> Result<(), WorkshopError> {
        let ws = &self.workshop;

        let remaining = {
            let mut unhitched = lock(&ws.reindeer_unhitched);
            *unhitched = unhitched.checked_sub(1).ok_or_else(|| {
                WorkshopError::invariant(format!("reindeer {} hitched to a full sleigh", self.id))
            })?;
            ws.events.reindeer_hitched(self.id, *unhitched);
            *unhitched
        };

        if remaining == 0 {
            ws.events.sleigh_departed();
            ws.delivery.release();
        }
        Ok(())
    }
}
