//! Spatial position and distance attenuation.

use serde::{Deserialize, Serialize};

/// Position of a source relative to a listener at the origin.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// A position on the `z = 0` plane.
    pub const fn planar(x: f32, y: f32) -> Self {
        Self::new(x, y, 0.0)
    }

    /// Distance from the listener.
    pub fn distance(self) -> f32 {
        self.z.mul_add(self.z, self.x.mul_add(self.x, self.y * self.y)).sqrt()
    }
}

/// Distance attenuation model for a source.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Attenuation {
    /// No distance falloff.
    None,
    /// Gain `1 / (1 + rolloff * distance)`.
    #[default]
    Rolloff,
    /// Gain falls linearly to zero at the given distance.
    Linear,
}

impl Attenuation {
    /// Gain in `[0, 1]` for a source at `position`.
    ///
    /// `rolloff_or_distance` is the rolloff factor for [`Attenuation::Rolloff`]
    /// and the fade distance for [`Attenuation::Linear`].
    pub fn gain(self, rolloff_or_distance: f32, position: Position) -> f32 {
        let distance = position.distance();
        match self {
            Self::None => 1.0,
            Self::Rolloff => 1.0 / rolloff_or_distance.max(0.0).mul_add(distance, 1.0),
            Self::Linear => {
                if rolloff_or_distance <= 0.0 {
                    return 0.0;
                }
                (1.0 - distance / rolloff_or_distance).clamp(0.0, 1.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_distance() {
        assert!(close(Position::new(3.0, 4.0, 0.0).distance(), 5.0));
        assert!(close(Position::ORIGIN.distance(), 0.0));
    }

    #[test]
    fn test_rolloff_gain() {
        assert!(close(Attenuation::Rolloff.gain(0.8, Position::ORIGIN), 1.0));
        // 1 / (1 + 0.8 * 5)
        assert!(close(Attenuation::Rolloff.gain(0.8, Position::planar(3.0, 4.0)), 0.2));
    }

    #[test]
    fn test_linear_gain() {
        assert!(close(Attenuation::Linear.gain(10.0, Position::planar(5.0, 0.0)), 0.5));
        assert!(close(Attenuation::Linear.gain(10.0, Position::planar(20.0, 0.0)), 0.0));
        assert!(close(Attenuation::Linear.gain(0.0, Position::ORIGIN), 0.0));
    }

    #[test]
    fn test_no_attenuation() {
        assert!(close(Attenuation::None.gain(0.8, Position::new(100.0, 0.0, 0.0)), 1.0));
    }
}
