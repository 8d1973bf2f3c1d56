//! Resumable step tree.
//!
//! A [`Step`] is the live executor for one operation node, owned by exactly
//! one bullet. Suspension is plain state (cursors, elapsed accumulators,
//! cached evaluations), never a suspended call stack: resuming after N ticks
//! is indistinguishable from never having paused.
//!
//! # Architecture
//!
//! - [`Builder`]: the single mapping from node kind to step variant
//! - [`Sequence`]: drives ordered children with a forward-only cursor
//! - [`RepeatSequence`]: a body sequence unrolled within a tick until it blocks
//! - [`FireStep`], [`MutationStep`], [`WaitStep`], [`VanishStep`]: leaves
//!
//! Last-fired heading and speed travel as an explicit [`LastFired`] value
//! into every `execute` call and back out in its [`StepResult`].

pub mod builder;
pub mod fire;
pub mod mutation;
pub mod repeat;
mod scope;
pub mod sequence;
pub mod vanish;
pub mod wait;

pub use builder::Builder;
pub use fire::FireStep;
pub use mutation::{MutationStep, MutationTarget};
pub use repeat::RepeatSequence;
pub use sequence::Sequence;
pub use vanish::VanishStep;
pub use wait::WaitStep;

use std::sync::Arc;

use pattern_core::BulletId;

use crate::error::StepError;
use crate::runner::PatternRunner;

/// Evaluated parameter vector of a scope. `$1` reads element 0.
pub type Params = Arc<[f32]>;

/// Empty parameter vector.
pub fn no_params() -> Params {
    Arc::from([])
}

/// Heading and speed of the most recently fired bullet.
///
/// `None` until something has been fired in the running pattern.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LastFired {
    pub direction: Option<f32>,
    pub speed: Option<f32>,
}

/// A bullet requested by a fire step, with the pattern it should run.
#[derive(Debug)]
pub struct Spawn<B> {
    pub bullet: B,
    /// Present when the bullet definition carries actions that built.
    pub runner: Option<PatternRunner>,
    /// Why the bullet's own actions failed to build. The bullet exists
    /// regardless; only its pattern is missing.
    pub fault: Option<StepError>,
}

/// What one `execute` call produced.
///
/// Nested sequences and repeat bodies write into the caller's result, so
/// the removal flag and spawns of a sub-action surface unchanged.
#[derive(Debug)]
pub struct StepResult<B> {
    pub spawned: Vec<Spawn<B>>,
    /// The owning bullet asked to be removed.
    pub removed: bool,
    /// Last-fired context after this call.
    pub last: LastFired,
    /// A timed step is still running; same-tick unrolling must stop here.
    pub(crate) blocked: bool,
}

impl<B> StepResult<B> {
    pub(crate) fn new(last: LastFired) -> Self {
        Self {
            spawned: Vec::new(),
            removed: false,
            last,
            blocked: false,
        }
    }
}

/// Discriminant of [`Step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum StepKind {
    Sequence,
    Repeat,
    Fire,
    Mutation,
    Wait,
    Vanish,
}

/// Live executor for one operation node.
#[derive(Debug)]
pub enum Step {
    Sequence(Sequence),
    Repeat(RepeatSequence),
    Fire(FireStep),
    Mutation(MutationStep),
    Wait(WaitStep),
    Vanish(VanishStep),
}

impl Step {
    pub fn kind(&self) -> StepKind {
        match self {
            Self::Sequence(_) => StepKind::Sequence,
            Self::Repeat(_) => StepKind::Repeat,
            Self::Fire(_) => StepKind::Fire,
            Self::Mutation(_) => StepKind::Mutation,
            Self::Wait(_) => StepKind::Wait,
            Self::Vanish(_) => StepKind::Vanish,
        }
    }

    /// True once the step contributes nothing more this activation.
    pub fn is_done(&self) -> bool {
        match self {
            Self::Sequence(step) => step.is_done(),
            Self::Repeat(step) => step.is_done(),
            Self::Fire(step) => step.is_done(),
            Self::Mutation(step) => step.is_done(),
            Self::Wait(step) => step.is_done(),
            Self::Vanish(step) => step.is_done(),
        }
    }

    /// Returns the step to its pre-activation state; derived values are
    /// evaluated again on the next activation.
    pub fn reset(&mut self) {
        match self {
            Self::Sequence(step) => step.reset(),
            Self::Repeat(step) => step.reset(),
            Self::Fire(step) => step.reset(),
            Self::Mutation(step) => step.reset(),
            Self::Wait(step) => step.reset(),
            Self::Vanish(step) => step.reset(),
        }
    }

    /// Adopts a new caller parameter vector and propagates it to children.
    pub fn update_parameters(&mut self, params: &Params) {
        match self {
            Self::Sequence(step) => step.update_parameters(params),
            Self::Repeat(step) => step.update_parameters(params),
            Self::Fire(step) => step.update_parameters(params),
            Self::Mutation(step) => step.update_parameters(params),
            Self::Wait(step) => step.update_parameters(params),
            Self::Vanish(_) => {}
        }
    }

    /// Cleanup for a step discarded before completing, along the active path.
    pub fn finish(&mut self) {
        match self {
            Self::Sequence(step) => step.finish(),
            Self::Repeat(step) => step.finish(),
            Self::Mutation(step) => step.finish(),
            Self::Wait(step) => step.finish(),
            Self::Fire(_) | Self::Vanish(_) => {}
        }
    }

    /// True if the active leaf under this step was finished early.
    pub fn is_finished(&self) -> bool {
        match self {
            Self::Sequence(step) => step.is_finished(),
            Self::Repeat(step) => step.is_finished(),
            Self::Mutation(step) => step.is_finished(),
            Self::Wait(step) => step.is_finished(),
            Self::Fire(_) | Self::Vanish(_) => false,
        }
    }

    /// Attaches the owning bullet, recursively.
    pub fn bind(&mut self, owner: BulletId) {
        match self {
            Self::Sequence(step) => step.bind(owner),
            Self::Repeat(step) => step.bind(owner),
            Self::Fire(step) => step.bind(owner),
            Self::Mutation(step) => step.bind(owner),
            Self::Wait(step) => step.bind(owner),
            Self::Vanish(_) => {}
        }
    }
}
