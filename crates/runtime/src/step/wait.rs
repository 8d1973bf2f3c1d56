//! Timed wait.

use std::sync::Arc;

use pattern_core::{BulletId, Wait};

use crate::error::Result;
use crate::frame::Frame;
use crate::step::Params;

/// Blocks its sequence until the accumulated tick time reaches the duration.
#[derive(Debug)]
pub struct WaitStep {
    node: Arc<Wait>,
    params: Params,
    duration: Option<f32>,
    elapsed: f32,
    finished: bool,
    owner: Option<BulletId>,
}

impl WaitStep {
    pub(crate) fn new(node: Arc<Wait>, params: Params) -> Self {
        Self {
            node,
            params,
            duration: None,
            elapsed: 0.0,
            finished: false,
            owner: None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.duration.is_some_and(|duration| self.elapsed >= duration)
    }

    /// Duration evaluated at activation.
    pub fn duration(&self) -> Option<f32> {
        self.duration
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub(crate) fn advance<B>(&mut self, frame: &mut Frame<'_, B>) -> Result<()> {
        if self.duration.is_none() {
            let duration = self.node.duration.evaluate(&self.params, frame)?;
            tracing::trace!(owner = ?self.owner, duration, "wait activated");
            self.duration = Some(duration);
        }
        self.elapsed += frame.delta;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.duration = None;
        self.elapsed = 0.0;
        self.finished = false;
    }

    pub fn update_parameters(&mut self, params: &Params) {
        self.params = params.clone();
    }

    pub fn finish(&mut self) {
        self.finished = true;
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn bind(&mut self, owner: BulletId) {
        self.owner = Some(owner);
    }
}
