//! The workshop protocol
//!
//! - [`Workshop`]: shared gates, counters and the waiting line
//! - [`Santa`]: the single coordinator
//! - [`Elf`]: pooled workers served in groups
//! - [`Reindeer`]: the fleet, served all at once

mod elf;
mod ids;
mod pacing;
mod reindeer;
mod santa;
mod state;

pub use elf::Elf;
pub use ids::{ElfId, ReindeerId};
pub use pacing::Pacer;
pub use reindeer::Reindeer;
pub use santa::{Decision, Santa, SantaReport, SantaState};
pub use state::{Outcome, Workshop};
