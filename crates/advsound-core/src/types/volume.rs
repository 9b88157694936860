//! Integer volume percentages and their backend gain conversion.

use serde::{Deserialize, Serialize};

/// Volume as an integer percentage in `[0, 100]`.
///
/// Backends work with a linear gain in `[0.0, 1.0]`; the conversion is a
/// float division by 100 in one direction and a rounded multiply in the other.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "i64", into = "u8")]
pub struct Volume(u8);

impl Volume {
    pub const MUTE: Self = Self(0);
    pub const MAX: Self = Self(100);

    /// Build a volume from any integer, clamping into `[0, 100]`.
    pub fn clamped(percent: i64) -> Self {
        Self(percent.clamp(0, 100) as u8)
    }

    /// Convert a backend gain back to a percentage.
    pub fn from_gain(gain: f32) -> Self {
        if gain.is_nan() {
            return Self::MUTE;
        }
        Self((gain.clamp(0.0, 1.0) * 100.0).round() as u8)
    }

    pub const fn percent(self) -> u8 {
        self.0
    }

    /// Linear gain for the backend.
    pub fn gain(self) -> f32 {
        f32::from(self.0) / 100.0
    }

    pub const fn is_mute(self) -> bool {
        self.0 == 0
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::MAX
    }
}

impl TryFrom<i64> for Volume {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (0..=100).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(format!("volume {value} is outside 0..=100"))
        }
    }
}

impl From<Volume> for u8 {
    fn from(volume: Volume) -> Self {
        volume.0
    }
}
