//! Santa - the single coordinator
//!
//! Santa sleeps on the wake gate until a full group of elves or the whole
//! reindeer fleet raises it, then decides which group to serve. Reindeer always
//! win when both thresholds are met. Preparing the sleigh is terminal: Santa
//! keeps the busy gate and waits for the last reindeer to be hitched.
//!
//! ```text
//! Idle -> Deciding -> HelpElves -> Idle
//!                  -> PrepareSleigh -> Delivered
//!                  -> Idle
//! ```

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::ids::ElfId;
use super::state::{Outcome, Workshop};
use crate::error::WorkshopError;
use crate::sync::lock;

/// Santa's state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SantaState {
    Idle,
    Deciding,
    HelpElves,
    PrepareSleigh,
    Delivered,
}

impl SantaState {
    fn can_become(self, next: SantaState) -> bool {
        use SantaState::*;
        matches!(
            (self, next),
            (Idle, Deciding)
                | (Deciding, HelpElves)
                | (Deciding, PrepareSleigh)
                | (Deciding, Idle)
                | (HelpElves, Idle)
                | (PrepareSleigh, Delivered)
        )
    }
}

/// What Santa does after waking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    PrepareSleigh,
    HelpElves,
    Idle,
}

/// Counts of what Santa did during a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SantaReport {
    pub wakeups: u64,
    pub elf_groups_helped: u64,
    pub sleigh_dispatches: u64,
}

/// The coordinator; only [`Workshop::open`] constructs one
pub struct Santa {
    workshop: Arc<Workshop>,
    state: SantaState,
    report: SantaReport,
}

impl Santa {
    pub(crate) fn new(workshop: Arc<Workshop>) -> Self {
        Self {
            workshop,
            state: SantaState::Idle,
            report: SantaReport::default(),
        }
    }

    pub fn state(&self) -> SantaState {
        self.state
    }

    pub fn report(&self) -> &SantaReport {
        &self.report
    }

    fn transition(&mut self, next: SantaState) -> Result<(), WorkshopError> {
        if !self.state.can_become(next) {
            return Err(WorkshopError::invariant(format!(
                "Santa cannot go from {:?} to {:?}",
                self.state, next
            )));
        }
        debug!(from = ?self.state, to = ?next, "Santa::transition");
        self.state = next;
        Ok(())
    }

    /// Run the decision loop until the sleigh departs
    pub fn run(mut self) -> Result<SantaReport, WorkshopError> {
        info!("Santa started");
        loop {
            self.sleep()?;
            self.transition(SantaState::Deciding)?;
            self.report.wakeups += 1;

            match self.decide()? {
                Decision::PrepareSleigh => {
                    self.transition(SantaState::PrepareSleigh)?;
                    self.prepare_sleigh()?;
                    self.transition(SantaState::Delivered)?;
                    info!(report = ?self.report, "Santa delivered");
                    self.workshop.finish(Outcome::Delivered);
                    return Ok(self.report);
                }
                Decision::HelpElves => {
                    self.transition(SantaState::HelpElves)?;
                    self.help_elves()?;
                    self.transition(SantaState::Idle)?;
                }
                Decision::Idle => {
                    debug!("Santa::run: woke with nothing to do");
                    self.transition(SantaState::Idle)?;
                }
            }
        }
    }

    /// Wait until not busy, then block on the wake gate
    fn sleep(&self) -> Result<(), WorkshopError> {
        let ws = &self.workshop;
        ws.busy.acquire()?;
        ws.events.santa_sleeping();
        ws.busy.release();

        ws.wake.acquire()?;
        ws.events.santa_awake();
        Ok(())
    }

    /// Inspect the reindeer count, then the waiting line, in priority order
    pub(crate) fn decide(&self) -> Result<Decision, WorkshopError> {
        let ws = &self.workshop;
        let fleet = ws.fleet_size();
        let group = ws.group_size();

        let arrived = *lock(&ws.reindeer_arrived);
        if arrived > fleet {
            return Err(WorkshopError::invariant(format!(
                "{} reindeer arrived for a fleet of {}",
                arrived, fleet
            )));
        }
        if fleet > 0 && arrived == fleet {
            debug!(arrived, "Santa::decide: fleet is back");
            return Ok(Decision::PrepareSleigh);
        }

        let waiting = lock(&ws.waiting_elves).cardinality();
        if waiting > group {
            return Err(WorkshopError::invariant(format!(
                "{} elves waiting for a group of {}",
                waiting, group
            )));
        }
        if waiting == group {
            debug!(waiting, "Santa::decide: elf group is ready");
            return Ok(Decision::HelpElves);
        }

        debug!(arrived, waiting, "Santa::decide: no threshold met");
        Ok(Decision::Idle)
    }

    /// Take the busy gate and dispatch exactly one group of elves
    pub(crate) fn help_elves(&mut self) -> Result<Vec<ElfId>, WorkshopError> {
        let ws = &self.workshop;
        let group = ws.group_size();

        ws.busy.acquire()?;
        *lock(&ws.elves_being_helped) = group;

        let mut chosen = Vec::with_capacity(group);
        {
            let mut waiting = lock(&ws.waiting_elves);
            ws.events.santa_noticed_elves(waiting.cardinality());

            for _ in 0..group {
                let elf = waiting.take_one().map_err(|_| {
                    WorkshopError::invariant(format!(
                        "waiting line ran dry after {} of {} elves",
                        chosen.len(),
                        group
                    ))
                })?;
                if chosen.contains(&elf) {
                    return Err(WorkshopError::invariant(format!("elf {} was in line twice", elf)));
                }
                ws.events.santa_helping_elf(elf);
                ws.elf_line.release_at(elf.index())?;
                chosen.push(elf);
            }

            ws.events.elves_dispatched(&chosen);
        }

        self.report.elf_groups_helped += 1;
        debug!(?chosen, "Santa::help_elves: group dispatched");
        Ok(chosen)
    }

    /// Take the busy gate, release the fleet and wait for departure
    pub(crate) fn prepare_sleigh(&mut self) -> Result<(), WorkshopError> {
        let ws = &self.workshop;
        let fleet = ws.fleet_size();

        // busy is never given back: elves cannot reach Santa again
        ws.busy.acquire()?;
        *lock(&ws.reindeer_unhitched) = fleet;

        ws.events.sleigh_prepared(fleet);
        ws.reindeer_gate.release_n(fleet);
        *lock(&ws.reindeer_arrived) = 0;
        self.report.sleigh_dispatches += 1;

        debug!(fleet, "Santa::prepare_sleigh: waiting for delivery");
        ws.delivery.acquire()
    }
}
