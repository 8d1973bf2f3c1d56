//! Bounded loop over one body sequence.

use std::sync::Arc;

use pattern_core::{Bullet, BulletId, Repeat};

use crate::error::Result;
use crate::frame::Frame;
use crate::step::{Params, Sequence, StepResult};

/// Repeat step: a body sequence plus a completed-iteration counter.
///
/// # Semantics
///
/// The iteration target is evaluated once per activation and then fixed.
/// [`RepeatSequence::drain`] runs the body back to back within one tick,
/// resetting it after each completed iteration, and only yields when the
/// body is blocked on a timed step, the owner vanished, the per-tick unroll
/// budget ran out, or the target is reached.
#[derive(Debug)]
pub struct RepeatSequence {
    node: Arc<Repeat>,
    params: Params,
    times: Option<u32>,
    completed: u32,
    body: Sequence,
    owner: Option<BulletId>,
}

impl RepeatSequence {
    pub(crate) fn new(node: Arc<Repeat>, params: Params, body: Sequence) -> Self {
        Self {
            node,
            params,
            times: None,
            completed: 0,
            body,
            owner: None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.times.is_some_and(|times| self.completed >= times)
    }

    /// Iteration target, once activated.
    pub fn times(&self) -> Option<u32> {
        self.times
    }

    pub fn completed(&self) -> u32 {
        self.completed
    }

    pub fn body(&self) -> &Sequence {
        &self.body
    }

    /// Runs body iterations until something forces a yield.
    ///
    /// Spawns accumulate into `result`; a failing iteration leaves the
    /// earlier ones in place.
    pub(crate) fn drain<B: Bullet>(
        &mut self,
        bullet: &mut B,
        frame: &mut Frame<'_, B>,
        result: &mut StepResult<B>,
    ) -> Result<()> {
        if self.times.is_none() {
            let value = self.node.times.evaluate(&self.params, frame)?;
            // negative and fractional counts floor towards zero iterations
            let times = value.max(0.0).floor() as u32;
            tracing::debug!(owner = ?self.owner, times, "repeat activated");
            self.times = Some(times);
        }

        while !self.is_done() {
            if !frame.take_iteration() {
                tracing::warn!(
                    owner = ?self.owner,
                    completed = self.completed,
                    times = ?self.times,
                    "per-tick iteration budget exhausted, yielding repeat"
                );
                result.blocked = true;
                break;
            }

            self.body.advance(bullet, frame, result)?;

            if self.body.is_done() {
                self.completed += 1;
                self.body.reset();
            }

            if result.blocked || result.removed {
                break;
            }
        }

        Ok(())
    }

    pub fn reset(&mut self) {
        self.times = None;
        self.completed = 0;
        self.body.reset();
    }

    pub fn update_parameters(&mut self, params: &Params) {
        self.params = params.clone();
        self.body.update_parameters(params);
    }

    pub fn finish(&mut self) {
        self.body.finish();
    }

    pub fn is_finished(&self) -> bool {
        self.body.is_finished()
    }

    pub fn bind(&mut self, owner: BulletId) {
        self.owner = Some(owner);
        self.body.bind(owner);
    }
}
