//! Sound handle identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Integer handle identifying one queued sound.
///
/// Ids are drawn from `[0, capacity)` and are unique among live sounds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct SoundId(u32);

impl SoundId {
    /// Sentinel reported to integer-based callers when `queue` fails.
    pub const SENTINEL: i32 = -1;

    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// The id as a slot index.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Flatten a `queue` result into the integer encoding: the id on
    /// success, [`SoundId::SENTINEL`] on any failure.
    pub fn raw<E>(result: &Result<Self, E>) -> i32 {
        result
            .as_ref()
            .map_or(Self::SENTINEL, |id| i32::try_from(id.0).unwrap_or(Self::SENTINEL))
    }
}

impl fmt::Display for SoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<SoundId> for u32 {
    fn from(id: SoundId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_raw_encoding() {
        let ok: Result<SoundId, Error> = Ok(SoundId::new(3));
        assert_eq!(SoundId::raw(&ok), 3);

        let failed: Result<SoundId, Error> = Err(Error::AllocationExhausted { capacity: 2 });
        assert_eq!(SoundId::raw(&failed), -1);
    }
}
