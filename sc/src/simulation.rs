//! Simulation - actor thread lifecycle
//!
//! Launches Santa, the elf pool and the reindeer fleet as named OS threads,
//! hands back the terminal outcome, and routes every exit path (delivery,
//! interruption, fatal error, drop) through the workshop's idempotent close.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use serde::Serialize;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::WorkshopError;
use crate::events::EventBus;
use crate::workshop::{Elf, ElfId, Outcome, Pacer, Reindeer, ReindeerId, Santa, SantaReport, Workshop};

type ActorHandle<T> = JoinHandle<Result<T, WorkshopError>>;

/// What the joined actors reported
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Base seed the per-actor delays were drawn from
    pub seed: u64,
    /// Santa's report; `None` when Santa was stopped before delivering
    pub santa: Option<SantaReport>,
    pub elves_joined: usize,
    pub reindeer_joined: usize,
    /// Reindeer that completed their hitch
    pub reindeer_hitched: usize,
}

/// A running workshop and its actor threads
pub struct Simulation {
    workshop: Arc<Workshop>,
    outcome: Option<oneshot::Receiver<Outcome>>,
    santa: Option<ActorHandle<SantaReport>>,
    elves: Vec<ActorHandle<()>>,
    reindeer: Vec<ActorHandle<()>>,
    seed: u64,
}

impl Simulation {
    /// Allocate the workshop and start every actor
    ///
    /// Setup errors surface before any thread is started. If a thread fails to
    /// spawn, the actors already running are shut down and joined before the
    /// error is returned.
    pub fn launch(config: &Config, bus: &EventBus) -> Result<Self, WorkshopError> {
        debug!(?config, "Simulation::launch: called");
        let (mut simulation, santa) = Self::prepare(config, bus)?;
        if let Err(e) = simulation.start(config, santa) {
            return Err(simulation.abandon(e));
        }

        info!(
            elves = simulation.elves.len(),
            reindeer = simulation.reindeer.len(),
            "Simulation launched"
        );
        Ok(simulation)
    }

    /// Validate and allocate everything, without starting any thread
    pub(crate) fn prepare(config: &Config, bus: &EventBus) -> Result<(Self, Santa), WorkshopError> {
        config.validate()?;

        let (workshop, santa, outcome) = Workshop::open(&config.workshop, bus.emitter())?;
        let seed = config.pacing.seed.unwrap_or_else(rand::random);
        info!(seed, "Simulation seed");

        let simulation = Simulation {
            workshop,
            outcome: Some(outcome),
            santa: None,
            elves: Vec::with_capacity(config.workshop.elves),
            reindeer: Vec::with_capacity(config.workshop.reindeer),
            seed,
        };
        Ok((simulation, santa))
    }

    /// Spawn Santa, the elf pool and the reindeer fleet
    pub(crate) fn start(&mut self, config: &Config, santa: Santa) -> Result<(), WorkshopError> {
        self.santa = Some(spawn_actor(&self.workshop, "santa".to_string(), move || santa.run())?);

        for i in 0..config.workshop.elves {
            let pacer = Pacer::new(self.seed.wrapping_add(i as u64), config.pacing.max_work());
            let elf = Elf::new(ElfId(i), Arc::clone(&self.workshop), pacer);
            let handle = spawn_actor(&self.workshop, format!("elf-{}", i), move || elf.run())?;
            self.elves.push(handle);
        }

        let offset = config.workshop.elves as u64;
        for i in 0..config.workshop.reindeer {
            let pacer = Pacer::new(
                self.seed.wrapping_add(offset).wrapping_add(i as u64),
                config.pacing.max_vacation(),
            );
            let reindeer = Reindeer::new(ReindeerId(i), Arc::clone(&self.workshop), pacer);
            let handle = spawn_actor(&self.workshop, format!("reindeer-{}", i), move || reindeer.run())?;
            self.reindeer.push(handle);
        }
        Ok(())
    }

    /// Shut down and join whatever was started, then hand back `err`
    fn abandon(self, err: WorkshopError) -> WorkshopError {
        error!(error = %err, "Simulation::abandon: launch failed, joining started actors");
        if let Err(join_err) = self.join() {
            warn!(error = %join_err, "Simulation::abandon: actor failed while joining");
        }
        err
    }

    pub fn workshop(&self) -> &Arc<Workshop> {
        &self.workshop
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Wait for the terminal outcome
    ///
    /// Resolves once: with `Delivered` after the sleigh departs, or `Aborted`
    /// when an actor fails. A second call reports an abort immediately.
    pub async fn wait(&mut self) -> Outcome {
        let Some(rx) = self.outcome.take() else {
            return Outcome::Aborted("outcome already taken".to_string());
        };
        match rx.await {
            Ok(outcome) => outcome,
            Err(_) => Outcome::Aborted("workshop dropped without an outcome".to_string()),
        }
    }

    /// Run cleanup; returns `true` only for the call that performed it
    pub fn shutdown(&self) -> bool {
        debug!("Simulation::shutdown: called");
        self.workshop.close()
    }

    /// Shut down and join every actor thread
    ///
    /// Actors stopped by cleanup count as normal exits. The first fatal actor
    /// error (or panic) is returned after all threads are joined.
    pub fn join(mut self) -> Result<RunSummary, WorkshopError> {
        debug!("Simulation::join: called");
        self.shutdown();

        let mut failure = None;
        let mut summary = RunSummary {
            seed: self.seed,
            ..Default::default()
        };

        if let Some(handle) = self.santa.take() {
            summary.santa = settle(&mut failure, reap(handle));
        }
        for handle in self.elves.drain(..) {
            settle(&mut failure, reap(handle));
            summary.elves_joined += 1;
        }
        for handle in self.reindeer.drain(..) {
            if settle(&mut failure, reap(handle)).is_some() {
                summary.reindeer_hitched += 1;
            }
            summary.reindeer_joined += 1;
        }

        info!(?summary, "Simulation joined");
        match failure {
            Some(e) => Err(e),
            None => Ok(summary),
        }
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        if self.shutdown() {
            debug!("Simulation::drop: cleaned up on drop");
        }
    }
}

/// Spawn a named actor thread that reports fatal errors as an abort
fn spawn_actor<T, F>(workshop: &Arc<Workshop>, name: String, body: F) -> Result<ActorHandle<T>, WorkshopError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, WorkshopError> + Send + 'static,
{
    let ws = Arc::clone(workshop);
    let handle = thread::Builder::new().name(name.clone()).spawn(move || {
        let result = body();
        match &result {
            Ok(_) => debug!(actor = %name, "actor finished"),
            Err(e) if e.is_closed() => debug!(actor = %name, "actor stopped by cleanup"),
            Err(e) => {
                error!(actor = %name, error = %e, "actor failed");
                ws.finish(Outcome::Aborted(format!("{}: {}", name, e)));
            }
        }
        result
    })?;
    Ok(handle)
}

fn reap<T>(handle: ActorHandle<T>) -> Result<Option<T>, WorkshopError> {
    let name = handle.thread().name().unwrap_or("actor").to_string();
    match handle.join() {
        Ok(Ok(value)) => Ok(Some(value)),
        Ok(Err(e)) if e.is_closed() => Ok(None),
        Ok(Err(e)) => Err(e),
        Err(_) => Err(WorkshopError::invariant(format!("{} panicked", name))),
    }
}

fn settle<T>(failure: &mut Option<WorkshopError>, result: Result<Option<T>, WorkshopError>) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(e) => {
            failure.get_or_insert(e);
            None
        }
    }
}
