//! Playback state machine and guarded transition results.

use serde::{Deserialize, Serialize};

/// Playback state of one sound. Muting is tracked separately.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl PlaybackState {
    pub const fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }

    /// State after a pause request, if the guard allows one.
    pub const fn pause(self) -> Option<Self> {
        match self {
            Self::Playing => Some(Self::Paused),
            Self::Stopped | Self::Paused => None,
        }
    }

    /// State after a resume request, if the guard allows one.
    ///
    /// Anything that is not playing counts as paused, so a stopped sound can
    /// be resumed too.
    pub const fn resume(self) -> Option<Self> {
        match self {
            Self::Playing => None,
            Self::Stopped | Self::Paused => Some(Self::Playing),
        }
    }
}

/// Outcome of a guarded transition (pause, resume, mute, unmute).
///
/// Integer callers see `1`, `0` and `-1`; the three cases must be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum Transition {
    /// The id exists and the transition happened.
    Applied = 1,
    /// The id exists but was already in (or could not leave) that state.
    Unchanged = 0,
    /// No live sound has this id.
    Unknown = -1,
}

impl Transition {
    pub const fn code(self) -> i8 {
        self as i8
    }

    /// Build the result of a guard check on a live id.
    pub const fn guarded(applied: bool) -> Self {
        if applied {
            Self::Applied
        } else {
            Self::Unchanged
        }
    }
}

impl From<Transition> for i8 {
    fn from(transition: Transition) -> Self {
        transition.code()
    }
}
