//! Event bus for ordered narration
//!
//! Every actor state transition emits a [`WorkshopEvent`]. Consumers (the
//! console [`Narrator`], tests checking protocol properties) subscribe to the
//! [`EventBus`].
//!
//! ```text
//!   Santa      Elves      Reindeer        (OS threads, sync emit)
//!     \          |          /
//!      +---- EventBus -----+              (tokio broadcast)
//!            /      \
//!      Narrator    test recorder
//! ```

mod bus;
mod narrator;
mod types;

pub use bus::{DEFAULT_CHANNEL_CAPACITY, EventBus, EventEmitter};
pub use narrator::Narrator;
pub use types::{EventLogEntry, WorkshopEvent};
