//! Host bullet contracts.

use crate::document::BulletDef;
use crate::types::{BulletId, Vec2};

/// A live bullet as seen by the pattern runtime.
///
/// Mutation steps write heading and speed through this trait; fire steps read
/// position and heading to place and aim new bullets. Everything else about
/// the bullet (movement integration, rendering, collision) stays with the host.
pub trait Bullet {
    /// Host identity of this bullet, used for log fields and engine bookkeeping.
    fn id(&self) -> BulletId;

    /// Current position in world units.
    fn position(&self) -> Vec2;

    /// Current heading in degrees.
    fn direction(&self) -> f32;

    fn set_direction(&mut self, degrees: f32);

    /// Current speed in world units per time unit.
    fn speed(&self) -> f32;

    fn set_speed(&mut self, speed: f32);
}

/// Instantiates bullets on behalf of fire operations.
pub trait BulletFactory<B> {
    /// Creates a bullet from `definition` at `origin`'s position.
    ///
    /// The runtime reads the heading and speed back from the returned bullet,
    /// so a factory that clamps or adjusts them is respected by later
    /// `sequence` fires.
    fn create(&mut self, definition: &BulletDef, origin: &B, direction: f32, speed: f32) -> B;
}
