//! Santa Claus - the classic coordination problem over counting semaphores
//!
//! Santa sleeps until either a full group of elves needs help or the whole
//! reindeer fleet is back from vacation. Reindeer take priority. The run ends
//! when the last reindeer is hitched and the sleigh departs.
//!
//! # Modules
//!
//! - [`sync`] - counting semaphores and the unordered waiting line
//! - [`workshop`] - shared state and the Santa, elf and reindeer actors
//! - [`simulation`] - actor threads, terminal outcome and cleanup
//! - [`events`] - event bus and console narration
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod simulation;
pub mod sync;
pub mod workshop;

// Re-export commonly used types
pub use config::{Config, NarrationConfig, NarrationFormat, PacingConfig, WorkshopConfig};
pub use error::WorkshopError;
pub use events::{EventBus, EventEmitter, Narrator, WorkshopEvent};
pub use simulation::{RunSummary, Simulation};
pub use workshop::{ElfId, Outcome, ReindeerId, Santa, SantaReport, SantaState, Workshop};
