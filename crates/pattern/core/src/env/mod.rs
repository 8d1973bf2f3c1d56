//! External collaborators the runtime talks to.
//!
//! The engine never owns bullets or randomness. Hosts implement these traits
//! and hand them in on every tick:
//! - [`Bullet`]: heading/speed/position of the bullet running a pattern
//! - [`BulletFactory`]: instantiates bullets requested by fire operations
//! - [`RandomSource`]: feeds `$rand` terms in parameter expressions

pub mod bullet;
pub mod rng;

pub use bullet::{Bullet, BulletFactory};
pub use rng::{PcgRng, RandomSource};
