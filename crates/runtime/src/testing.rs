//! Minimal host for unit tests.

use pattern_core::{Bullet, BulletDef, BulletFactory, BulletId, PcgRng, Vec2};

use crate::frame::Frame;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TestBullet {
    pub id: BulletId,
    pub position: Vec2,
    pub direction: f32,
    pub speed: f32,
}

impl Bullet for TestBullet {
    fn id(&self) -> BulletId {
        self.id
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn direction(&self) -> f32 {
        self.direction
    }

    fn set_direction(&mut self, degrees: f32) {
        self.direction = degrees;
    }

    fn speed(&self) -> f32 {
        self.speed
    }

    fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }
}

#[derive(Debug, Default)]
pub(crate) struct TestFactory {
    next_id: u64,
}

impl TestFactory {
    fn allocate(&mut self) -> BulletId {
        self.next_id += 1;
        BulletId(self.next_id)
    }
}

impl BulletFactory<TestBullet> for TestFactory {
    fn create(
        &mut self,
        _definition: &BulletDef,
        origin: &TestBullet,
        direction: f32,
        speed: f32,
    ) -> TestBullet {
        TestBullet {
            id: self.allocate(),
            position: origin.position,
            direction,
            speed,
        }
    }
}

/// Owns the factory and rng a [`Frame`] borrows.
pub(crate) struct Harness {
    pub factory: TestFactory,
    pub rng: PcgRng,
    pub target: Vec2,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            factory: TestFactory::default(),
            rng: PcgRng::new(7),
            target: Vec2::new(0.0, -100.0),
        }
    }

    /// A bullet at the origin, with the next free id.
    pub fn bullet(&mut self, direction: f32, speed: f32) -> TestBullet {
        TestBullet {
            id: self.factory.allocate(),
            position: Vec2::ZERO,
            direction,
            speed,
        }
    }

    pub fn frame(&mut self, delta: f32) -> Frame<'_, TestBullet> {
        Frame::new(delta, self.target, &mut self.factory, &mut self.rng)
    }
}
