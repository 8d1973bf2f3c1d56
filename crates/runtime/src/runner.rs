//! Per-bullet pattern owner.

use std::sync::Arc;

use pattern_core::{
    Action, Bullet, BulletDef, BulletId, EngineConfig, PatternDocument, PatternError,
};

use crate::error::{Result, StepError};
use crate::frame::Frame;
use crate::step::{Builder, LastFired, Params, Sequence, Spawn, StepResult};

/// Lifecycle of one running pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum RunnerState {
    Running,
    /// The root sequence ran to its end.
    Completed,
    /// A vanish removed the owning bullet.
    Vanished,
    /// An error ended the pattern; the tree was finished.
    Aborted,
    /// The host discarded the pattern early.
    Cancelled,
}

/// Output of one [`PatternRunner::tick`].
#[derive(Debug)]
pub struct TickOutcome<B> {
    pub spawned: Vec<Spawn<B>>,
    pub removed: bool,
}

impl<B> Default for TickOutcome<B> {
    fn default() -> Self {
        Self {
            spawned: Vec::new(),
            removed: false,
        }
    }
}

/// A tick that ended in an error.
///
/// The factory already created every bullet in `spawned`; the host owns them
/// just like the spawns of a successful tick.
#[derive(Debug)]
pub struct TickFailure<B> {
    pub error: StepError,
    pub spawned: Vec<Spawn<B>>,
}

/// Owns the step tree of one bullet and drives it once per tick.
///
/// The runner carries the last-fired context across ticks and guarantees
/// that every early exit (vanish, error, cancel) finishes the steps along
/// the active cursor path before the tree is dropped.
#[derive(Debug)]
pub struct PatternRunner {
    root: Sequence,
    last: LastFired,
    config: EngineConfig,
    owner: Option<BulletId>,
    state: RunnerState,
}

impl PatternRunner {
    /// Builds the pattern of the labelled action in `document`.
    pub fn new(
        document: Arc<PatternDocument>,
        label: &str,
        params: impl Into<Params>,
        config: EngineConfig,
    ) -> Result<Self> {
        let builder = Builder::new(document, config);
        let action = builder.document().resolve_action(label)?.clone();
        Self::from_action(&builder, &action, params)
    }

    /// Builds a pattern from an action that need not be labelled.
    pub fn from_action(
        builder: &Builder,
        action: &Arc<Action>,
        params: impl Into<Params>,
    ) -> Result<Self> {
        let root = builder.build_action(action, &params.into())?;
        Ok(Self::with_root(root, *builder.config()))
    }

    pub(crate) fn for_bullet(
        builder: &Builder,
        definition: &BulletDef,
        params: Params,
    ) -> Result<Self> {
        let root = builder.build_bullet(definition, params)?;
        Ok(Self::with_root(root, *builder.config()))
    }

    fn with_root(root: Sequence, config: EngineConfig) -> Self {
        Self {
            root,
            last: LastFired::default(),
            config,
            owner: None,
            state: RunnerState::Running,
        }
    }

    /// Attaches the owning bullet. Runners bind themselves on their first
    /// tick when the host skips this.
    pub fn bind(&mut self, owner: BulletId) {
        self.owner = Some(owner);
        self.root.bind(owner);
    }

    pub fn owner(&self) -> Option<BulletId> {
        self.owner
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunnerState::Running
    }

    pub fn root(&self) -> &Sequence {
        &self.root
    }

    pub fn last_fired(&self) -> LastFired {
        self.last
    }

    /// Executes the root sequence once.
    ///
    /// A runner that is no longer running returns an empty outcome. On error
    /// the tree is finished, the runner moves to [`RunnerState::Aborted`]
    /// and the error comes back with whatever the tick spawned before it
    /// failed; the runner is unusable until restarted.
    pub fn tick<B: Bullet>(
        &mut self,
        bullet: &mut B,
        frame: &mut Frame<'_, B>,
    ) -> std::result::Result<TickOutcome<B>, TickFailure<B>> {
        if !self.is_running() {
            return Ok(TickOutcome::default());
        }
        if self.owner.is_none() {
            self.bind(bullet.id());
        }
        frame.reset_budget(self.config.max_iterations_per_tick.max(1));

        let mut result = StepResult::new(self.last);
        match self.root.advance(bullet, frame, &mut result) {
            Ok(true) => {}
            Ok(false) => {
                self.complete();
                return Ok(TickOutcome::default());
            }
            Err(error) => {
                tracing::error!(
                    owner = ?self.owner,
                    code = error.error_code(),
                    severity = error.severity().as_str(),
                    spawned = result.spawned.len(),
                    %error,
                    "pattern aborted"
                );
                self.root.finish();
                self.state = RunnerState::Aborted;
                return Err(TickFailure {
                    error,
                    spawned: result.spawned,
                });
            }
        }

        self.last = result.last;
        if result.removed {
            self.root.finish();
            self.state = RunnerState::Vanished;
            tracing::debug!(owner = ?self.owner, "pattern vanished");
        } else if self.root.is_done() {
            self.complete();
        }

        Ok(TickOutcome {
            spawned: result.spawned,
            removed: result.removed,
        })
    }

    fn complete(&mut self) {
        self.state = RunnerState::Completed;
        tracing::debug!(owner = ?self.owner, "pattern completed");
    }

    /// Rewinds the pattern for another pass. Parameter expressions are
    /// evaluated again as the steps reactivate.
    pub fn restart(&mut self) {
        if self.is_running() {
            self.root.finish();
        }
        self.root.reset();
        self.last = LastFired::default();
        self.state = RunnerState::Running;
        tracing::debug!(owner = ?self.owner, "pattern restarted");
    }

    /// Discards the pattern, finishing whatever is in flight.
    pub fn cancel(&mut self) {
        if !self.is_running() {
            return;
        }
        self.root.finish();
        self.state = RunnerState::Cancelled;
        tracing::debug!(owner = ?self.owner, "pattern cancelled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::no_params;
    use crate::testing::Harness;
    use pattern_core::{
        BulletSource, Expression, Fire, Node, NodeRef, Reference, RepeatBody, SpeedSpec,
    };

    fn document(top: Vec<NodeRef>) -> Arc<PatternDocument> {
        Arc::new(
            PatternDocument::builder()
                .action(Action::labeled("top", top))
                .build_unchecked()
                .unwrap(),
        )
    }

    fn runner(top: Vec<NodeRef>) -> PatternRunner {
        PatternRunner::new(document(top), "top", no_params(), EngineConfig::default())
            .unwrap()
    }

    fn shot() -> NodeRef {
        Node::fire(Fire::new(BulletSource::inline(BulletDef::default())))
    }

    #[test]
    fn completes_after_last_child() {
        let mut runner = runner(vec![shot(), shot()]);
        let mut harness = Harness::new();
        let mut owner = harness.bullet(0.0, 1.0);

        let first = runner.tick(&mut owner, &mut harness.frame(1.0)).unwrap();
        assert_eq!(first.spawned.len(), 1);
        assert!(runner.is_running());
        assert_eq!(runner.owner(), Some(owner.id));

        runner.tick(&mut owner, &mut harness.frame(1.0)).unwrap();
        assert_eq!(runner.state(), RunnerState::Completed);

        let idle = runner.tick(&mut owner, &mut harness.frame(1.0)).unwrap();
        assert!(idle.spawned.is_empty());
    }

    #[test]
    fn empty_pattern_completes_on_first_tick() {
        let mut runner = runner(vec![]);
        let mut harness = Harness::new();
        let mut owner = harness.bullet(0.0, 1.0);
        runner.tick(&mut owner, &mut harness.frame(1.0)).unwrap();
        assert_eq!(runner.state(), RunnerState::Completed);
    }

    #[test]
    fn cancel_finishes_active_wait() {
        let mut runner = runner(vec![Node::wait(10.0), shot()]);
        let mut harness = Harness::new();
        let mut owner = harness.bullet(0.0, 1.0);

        runner.tick(&mut owner, &mut harness.frame(1.0)).unwrap();
        runner.cancel();
        assert_eq!(runner.state(), RunnerState::Cancelled);
        assert!(runner.root().is_finished());
    }

    #[test]
    fn error_aborts_and_restart_recovers_state() {
        let mut runner = runner(vec![Node::wait(Expression::parse("$1").unwrap())]);
        let mut harness = Harness::new();
        let mut owner = harness.bullet(0.0, 1.0);

        let failure = runner
            .tick(&mut owner, &mut harness.frame(1.0))
            .unwrap_err();
        assert!(matches!(failure.error, StepError::Expression(_)));
        assert!(failure.spawned.is_empty());
        assert_eq!(runner.state(), RunnerState::Aborted);

        runner.restart();
        assert!(runner.is_running());
        assert_eq!(runner.root().cursor(), 0);
    }

    #[test]
    fn failed_tick_hands_back_earlier_spawns() {
        let failing = Node::fire(
            Fire::new(BulletSource::inline(BulletDef::default()))
                .with_speed(SpeedSpec::absolute(Expression::parse("$5").unwrap())),
        );
        let mut runner = runner(vec![Node::repeat(
            1.0,
            RepeatBody::action(vec![shot(), failing]),
        )]);
        let mut harness = Harness::new();
        let mut owner = harness.bullet(0.0, 1.0);

        let failure = runner
            .tick(&mut owner, &mut harness.frame(1.0))
            .unwrap_err();
        assert!(matches!(failure.error, StepError::Expression(_)));
        assert_eq!(failure.spawned.len(), 1);
        assert_eq!(runner.state(), RunnerState::Aborted);
    }

    #[test]
    fn zero_iteration_budget_still_makes_progress() {
        let config = EngineConfig::default().with_max_iterations_per_tick(0);
        let mut runner = PatternRunner::new(
            document(vec![Node::repeat(1.0, RepeatBody::action(vec![shot()]))]),
            "top",
            no_params(),
            config,
        )
        .unwrap();
        let mut harness = Harness::new();
        let mut owner = harness.bullet(0.0, 1.0);

        let outcome = runner.tick(&mut owner, &mut harness.frame(1.0)).unwrap();
        assert_eq!(outcome.spawned.len(), 1);
        assert_eq!(runner.state(), RunnerState::Completed);
    }

    #[test]
    fn unknown_label_fails_to_build() {
        let err = PatternRunner::new(
            document(vec![Node::action_ref(Reference::new("nope", vec![]))]),
            "top",
            no_params(),
            EngineConfig::default(),
        )
        .unwrap_err();
        assert!(err.is_definition_not_found());
    }
}
