//! Per-tick inputs handed down through every `execute` call.

use pattern_core::{BulletDef, BulletFactory, ExprContext, RandomSource, Vec2};

/// Everything a step tree may read or call during one tick.
///
/// A host builds one frame per simulation tick and passes it to each runner
/// in turn. The unroll budget is reset by the runner at the start of its own
/// tick, so one bullet exhausting it does not starve the next.
pub struct Frame<'a, B> {
    /// Time elapsed since the previous tick, in the same unit as wait and
    /// change durations.
    pub delta: f32,
    /// Position aimed at by `aim` directions.
    pub target: Vec2,
    /// Difficulty rank read by `$rank`.
    pub rank: f32,
    factory: &'a mut dyn BulletFactory<B>,
    rng: &'a mut dyn RandomSource,
    budget: usize,
}

impl<'a, B> Frame<'a, B> {
    pub fn new(
        delta: f32,
        target: Vec2,
        factory: &'a mut dyn BulletFactory<B>,
        rng: &'a mut dyn RandomSource,
    ) -> Self {
        Self {
            delta,
            target,
            rank: 0.0,
            factory,
            rng,
            budget: usize::MAX,
        }
    }

    pub fn with_rank(mut self, rank: f32) -> Self {
        self.rank = rank;
        self
    }

    pub(crate) fn reset_budget(&mut self, budget: usize) {
        self.budget = budget;
    }

    /// Consumes one same-tick repeat iteration; false once the budget is spent.
    pub(crate) fn take_iteration(&mut self) -> bool {
        if self.budget == 0 {
            return false;
        }
        self.budget -= 1;
        true
    }

    pub(crate) fn create(
        &mut self,
        definition: &BulletDef,
        origin: &B,
        direction: f32,
        speed: f32,
    ) -> B {
        self.factory.create(definition, origin, direction, speed)
    }
}

impl<B> ExprContext for Frame<'_, B> {
    fn rank(&self) -> f32 {
        self.rank
    }

    fn random(&mut self) -> f32 {
        self.rng.next_unit()
    }
}
