use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Stable identifier of a catalog record.
///
/// Id `0` is the null reference: entries pointing at it never resolve.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
    JsonSchema,
)]
#[serde(transparent)]
pub struct RecordId(pub u32);

impl RecordId {
    pub const NULL: RecordId = RecordId(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}

impl From<u32> for RecordId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Monotonic id sequence owned by the writable layer of a catalog.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    /// Start handing out ids strictly above `last`.
    pub fn starting_after(last: RecordId) -> Self {
        Self {
            next: last.0.saturating_add(1).max(1),
        }
    }

    /// Next unused id; never returns the same id twice.
    pub fn next_id(&mut self) -> Result<RecordId> {
        let id = self.next;
        if id == u32::MAX {
            return Err(Error::IdSpaceExhausted);
        }
        self.next += 1;
        Ok(RecordId(id))
    }
}
