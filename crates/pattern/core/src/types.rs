//! Small value types shared by the document, the host contracts and the runtime.
//!
//! Angles are degrees. 0 points up (towards negative `y`, screen space) and
//! angles grow clockwise, so 90 points right.
use std::fmt;

/// Identity of a bullet as seen by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BulletId(pub u64);

impl fmt::Display for BulletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 2D point or offset in host world units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Heading in degrees from `self` towards `to`.
    ///
    /// Returns 0 when both points coincide.
    pub fn direction_to(self, to: Vec2) -> f32 {
        let dx = to.x - self.x;
        let dy = to.y - self.y;
        if dx == 0.0 && dy == 0.0 {
            return 0.0;
        }
        normalize_degrees(dx.atan2(-dy).to_degrees())
    }
}

/// Wraps an angle into `[0, 360)`.
pub fn normalize_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Signed smallest rotation from `from` to `to`, in `(-180, 180]`.
pub fn shortest_arc(from: f32, to: f32) -> f32 {
    let diff = (to - from).rem_euclid(360.0);
    if diff > 180.0 { diff - 360.0 } else { diff }
}
