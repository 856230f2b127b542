//! Actor identities

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of one elf; doubles as the index of its personal dispatch gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElfId(pub usize);

impl ElfId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ElfId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of one reindeer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReindeerId(pub usize);

impl fmt::Display for ReindeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
