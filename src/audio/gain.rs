//! Proximity gain engine
//!
//! Maps the distance between two listeners to a volume in `[0, 1]`:
//!
//! ```text
//!  gain
//!   1 ┤━━━━━━━━━┓
//!     │         ┃╲
//!     │         ┃  ╲
//!     │         ┃    ╲
//!   0 ┤─────────┸──────╲━━━━━━━━━
//!     0      fadeout   mute    distance
//! ```
//!
//! Listeners in different dimensions never hear each other.

use serde::{Deserialize, Serialize};

/// One of the three world axes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Index as used by the game's `Pos[n]` path
    pub fn index(self) -> usize {
        self as usize
    }
}

/// A position in game-world units
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position(pub [f64; 3]);

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self([x, y, z])
    }

    /// Euclidean distance to another position
    pub fn distance(&self, other: &Position) -> f64 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }

    pub fn set_axis(&mut self, axis: Axis, value: f64) {
        self.0[axis.index()] = value;
    }
}

/// Distance thresholds of a tenant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Falloff {
    /// Within this distance the gain is always 1
    pub fadeout: f64,
    /// At or beyond this distance the gain is 0
    pub mute: f64,
}

impl Falloff {
    pub fn new(fadeout: f64, mute: f64) -> Self {
        Self { fadeout, mute }
    }

    /// Gain for a listener `distance` units away.
    ///
    /// Linear ramp from 1 at `fadeout` down to 0 at `mute`. When
    /// `mute <= fadeout` there is no ramp: anything past `fadeout` is muted.
    /// An undefined distance is muted.
    pub fn gain_at(&self, distance: f64) -> f64 {
        if distance.is_nan() {
            return 0.0;
        }
        if distance <= self.fadeout {
            return 1.0;
        }
        if distance >= self.mute || self.mute <= self.fadeout {
            return 0.0;
        }

        let range = self.mute - self.fadeout;
        (1.0 - (distance - self.fadeout) / range).clamp(0.0, 1.0)
    }
}

impl Default for Falloff {
    fn default() -> Self {
        Self {
            fadeout: crate::constants::DEFAULT_FADEOUT,
            mute: crate::constants::DEFAULT_MUTE,
        }
    }
}

/// Gain of the stream between `a` and `b`
pub fn gain(
    a_pos: &Position,
    a_dim: &str,
    b_pos: &Position,
    b_dim: &str,
    falloff: &Falloff,
) -> f64 {
    if a_dim != b_dim {
        return 0.0;
    }

    falloff.gain_at(a_pos.distance(b_pos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const OVERWORLD: &str = "\"minecraft:overworld\"";
    const NETHER: &str = "\"minecraft:the_nether\"";

    fn falloff() -> Falloff {
        Falloff::new(3.0, 15.0)
    }

    #[test]
    fn test_gain_midway() {
        let a = Position::default();
        let b = Position::new(9.0, 0.0, 0.0);
        let g = gain(&a, OVERWORLD, &b, OVERWORLD, &falloff());
        assert!((g - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_gain_beyond_mute() {
        let a = Position::default();
        let b = Position::new(0.0, 20.0, 0.0);
        assert_eq!(gain(&a, OVERWORLD, &b, OVERWORLD, &falloff()), 0.0);
    }

    #[test]
    fn test_gain_different_dimensions() {
        let a = Position::default();
        assert_eq!(gain(&a, OVERWORLD, &a, NETHER, &falloff()), 0.0);
    }

    #[test]
    fn test_gain_inside_fadeout() {
        let a = Position::new(10.0, 64.0, -10.0);
        let b = Position::new(11.0, 65.0, -9.0);
        assert_eq!(gain(&a, OVERWORLD, &b, OVERWORLD, &falloff()), 1.0);
    }

    #[test]
    fn test_inverted_thresholds_mute_outside_fadeout() {
        let inverted = Falloff::new(10.0, 5.0);
        assert_eq!(inverted.gain_at(10.0), 1.0);
        assert_eq!(inverted.gain_at(10.001), 0.0);

        let equal = Falloff::new(4.0, 4.0);
        assert_eq!(equal.gain_at(4.0), 1.0);
        assert_eq!(equal.gain_at(4.5), 0.0);
    }

    #[test]
    fn test_nan_position_is_silent() {
        let a = Position::new(f64::NAN, 0.0, 0.0);
        assert_eq!(gain(&a, OVERWORLD, &Position::default(), OVERWORLD, &falloff()), 0.0);
    }

    #[test]
    fn test_nan_distance_is_silent() {
        assert_eq!(falloff().gain_at(f64::NAN), 0.0);

        // inf - inf on every axis
        let far = Position::new(f64::INFINITY, 0.0, 0.0);
        assert_eq!(gain(&far, OVERWORLD, &far, OVERWORLD, &falloff()), 0.0);
    }

    #[test]
    fn test_set_axis() {
        let mut p = Position::default();
        p.set_axis(Axis::Y, 64.0);
        p.set_axis(Axis::Z, -3.0);
        assert_eq!(p, Position::new(0.0, 64.0, -3.0));
        assert_eq!(Axis::ALL.map(Axis::index), [0, 1, 2]);
    }

    #[test]
    fn test_distance() {
        let a = Position::new(1.0, 2.0, 3.0);
        let b = Position::new(4.0, 6.0, 3.0);
        assert_eq!(a.distance(&b), 5.0);
    }

    proptest! {
        #[test]
        fn prop_gain_in_unit_range(
            x in -1e6f64..1e6, y in -1e6f64..1e6, z in -1e6f64..1e6,
            fadeout in 0f64..100.0, mute in 0f64..200.0,
        ) {
            let g = gain(&Position::default(), OVERWORLD, &Position::new(x, y, z), OVERWORLD, &Falloff::new(fadeout, mute));
            prop_assert!((0.0..=1.0).contains(&g));
        }

        #[test]
        fn prop_gain_non_increasing(d1 in 0f64..50.0, d2 in 0f64..50.0) {
            let f = falloff();
            let (near, far) = if d1 <= d2 { (d1, d2) } else { (d2, d1) };
            prop_assert!(f.gain_at(near) >= f.gain_at(far));
        }

        #[test]
        fn prop_gain_thresholds(d in 0f64..1000.0) {
            let f = falloff();
            if d <= f.fadeout {
                prop_assert_eq!(f.gain_at(d), 1.0);
            }
            if d >= f.mute {
                prop_assert_eq!(f.gain_at(d), 0.0);
            }
        }

        #[test]
        fn prop_gain_continuous(d in 3f64..15.0) {
            let f = falloff();
            let eps = 1e-6;
            prop_assert!((f.gain_at(d) - f.gain_at(d + eps)).abs() < 1e-4);
        }

        #[test]
        fn prop_dimension_mismatch_is_silent(x in -100f64..100.0) {
            let b = Position::new(x, 0.0, 0.0);
            prop_assert_eq!(gain(&Position::default(), OVERWORLD, &b, NETHER, &falloff()), 0.0);
        }
    }
}
