#![allow(dead_code)]

use std::sync::Arc;

use pattern_core::{
    Action, Bullet, BulletDef, BulletFactory, BulletId, EngineConfig, NodeRef, PatternDocument,
    PcgRng, Vec2,
};
use pattern_runtime::{Frame, PatternRunner, no_params};

/// Bullet that remembers which definition created it.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordingBullet {
    pub id: BulletId,
    pub label: Option<String>,
    pub position: Vec2,
    pub direction: f32,
    pub speed: f32,
}

impl Bullet for RecordingBullet {
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

/// Factory that logs every creation request in order.
#[derive(Debug, Default)]
pub struct RecordingFactory {
    next_id: u64,
    pub created: Vec<RecordingBullet>,
}

impl RecordingFactory {
    pub fn allocate(&mut self) -> BulletId {
        self.next_id += 1;
        BulletId(self.next_id)
    }
}

impl BulletFactory<RecordingBullet> for RecordingFactory {
    fn create(
        &mut self,
        definition: &BulletDef,
        origin: &RecordingBullet,
        direction: f32,
        speed: f32,
    ) -> RecordingBullet {
        let bullet = RecordingBullet {
            id: self.allocate(),
            label: definition.label.clone(),
            position: origin.position,
            direction,
            speed,
        };
        self.created.push(bullet.clone());
        bullet
    }
}

/// Host state a [`Frame`] borrows from.
pub struct Host {
    pub factory: RecordingFactory,
    pub rng: PcgRng,
    pub target: Vec2,
    pub rank: f32,
}

impl Host {
    pub fn new() -> Self {
        Self {
            factory: RecordingFactory::default(),
            rng: PcgRng::new(42),
            target: Vec2::new(0.0, -100.0),
            rank: 0.5,
        }
    }

    pub fn spawn_owner(&mut self) -> RecordingBullet {
        RecordingBullet {
            id: self.factory.allocate(),
            label: Some("owner".to_owned()),
            position: Vec2::ZERO,
            direction: 0.0,
            speed: 1.0,
        }
    }

    pub fn frame(&mut self, delta: f32) -> Frame<'_, RecordingBullet> {
        Frame::new(delta, self.target, &mut self.factory, &mut self.rng)
            .with_rank(self.rank)
    }

    pub fn created_labels(&self) -> Vec<Option<&str>> {
        self.factory
            .created
            .iter()
            .map(|bullet| bullet.label.as_deref())
            .collect()
    }
}

/// Document with a single `top` action plus extra definitions.
pub fn document_with(top: Vec<NodeRef>, extra: Vec<Action>) -> Arc<PatternDocument> {
    let mut builder = PatternDocument::builder().action(Action::labeled("top", top));
    for action in extra {
        builder = builder.action(action);
    }
    Arc::new(builder.build().expect("document should validate"))
}

pub fn runner(document: Arc<PatternDocument>) -> PatternRunner {
    PatternRunner::new(document, "top", no_params(), EngineConfig::default())
        .expect("pattern should build")
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
