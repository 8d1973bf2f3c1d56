//! Interpolated heading and speed changes.

use std::sync::Arc;

use pattern_core::{
    Bullet, BulletId, ChangeDirection, ChangeSpeed, DirectionKind, SpeedKind, normalize_degrees,
    shortest_arc,
};

use crate::error::Result;
use crate::frame::Frame;
use crate::step::Params;

/// Which property of the owner a mutation steers.
#[derive(Clone, Debug)]
pub enum MutationTarget {
    Direction(Arc<ChangeDirection>),
    Speed(Arc<ChangeSpeed>),
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Plan {
    start: f32,
    end: f32,
    duration: f32,
}

/// Moves the owner's heading or speed from its value at activation to the
/// resolved end value over `term` time units.
#[derive(Debug)]
pub struct MutationStep {
    target: MutationTarget,
    params: Params,
    plan: Option<Plan>,
    elapsed: f32,
    finished: bool,
    owner: Option<BulletId>,
}

impl MutationStep {
    pub(crate) fn new(target: MutationTarget, params: Params) -> Self {
        Self {
            target,
            params,
            plan: None,
            elapsed: 0.0,
            finished: false,
            owner: None,
        }
    }

    pub fn target(&self) -> &MutationTarget {
        &self.target
    }

    pub fn is_done(&self) -> bool {
        self.plan.is_some_and(|plan| self.elapsed >= plan.duration)
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Applies one tick of interpolation to the owner.
    pub(crate) fn apply<B: Bullet>(
        &mut self,
        bullet: &mut B,
        frame: &mut Frame<'_, B>,
    ) -> Result<()> {
        let plan = match self.plan {
            Some(plan) => plan,
            None => {
                let plan = self.activate(bullet, frame)?;
                self.plan = Some(plan);
                plan
            }
        };

        self.elapsed += frame.delta;
        let t = if plan.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / plan.duration).min(1.0)
        };
        let value = plan.start + (plan.end - plan.start) * t;

        match self.target {
            MutationTarget::Direction(_) => bullet.set_direction(normalize_degrees(value)),
            MutationTarget::Speed(_) => bullet.set_speed(value),
        }
        Ok(())
    }

    fn activate<B: Bullet>(&self, bullet: &B, frame: &mut Frame<'_, B>) -> Result<Plan> {
        let plan = match &self.target {
            MutationTarget::Direction(node) => {
                let duration = node.term.evaluate(&self.params, frame)?;
                let value = node.direction.value.evaluate(&self.params, frame)?;
                let start = bullet.direction();
                let end = match node.direction.kind {
                    DirectionKind::Aim => {
                        let aim = bullet.position().direction_to(frame.target);
                        start + shortest_arc(start, aim + value)
                    }
                    DirectionKind::Absolute => start + shortest_arc(start, value),
                    DirectionKind::Relative => start + value,
                    DirectionKind::Sequence => start + value * duration.max(0.0),
                };
                Plan { start, end, duration }
            }
            MutationTarget::Speed(node) => {
                let duration = node.term.evaluate(&self.params, frame)?;
                let value = node.speed.value.evaluate(&self.params, frame)?;
                let start = bullet.speed();
                let end = match node.speed.kind {
                    SpeedKind::Absolute => value,
                    SpeedKind::Relative => start + value,
                    SpeedKind::Sequence => start + value * duration.max(0.0),
                };
                Plan { start, end, duration }
            }
        };
        tracing::trace!(
            owner = ?self.owner,
            start = plan.start,
            end = plan.end,
            duration = plan.duration,
            "mutation activated"
        );
        Ok(plan)
    }

    pub fn reset(&mut self) {
        self.plan = None;
        self.elapsed = 0.0;
        self.finished = false;
    }

    pub fn update_parameters(&mut self, params: &Params) {
        self.params = params.clone();
    }

    /// Abandons the interpolation; the owner keeps its current value.
    pub fn finish(&mut self) {
        if !self.finished {
            self.finished = true;
            tracing::trace!(
                owner = ?self.owner,
                elapsed = self.elapsed,
                "mutation finished early"
            );
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn bind(&mut self, owner: BulletId) {
        self.owner = Some(owner);
    }
}
