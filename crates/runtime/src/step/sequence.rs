//! Ordered execution of an action's children.

use pattern_core::{Bullet, BulletId};

use crate::error::Result;
use crate::frame::Frame;
use crate::step::scope::ParamScope;
use crate::step::{LastFired, Params, Step, StepKind, StepResult};

/// Drives an ordered list of child steps with a resumable cursor.
///
/// # Semantics
///
/// Each `execute` call dispatches the child under the cursor once:
/// - a leaf that completes advances the cursor by one
/// - a timed leaf (wait, change) that is still running keeps the cursor
/// - a repeat child is drained in place until its body blocks or it finishes
///
/// Done exactly when the cursor reaches the end. The cursor only moves
/// forward until [`Sequence::reset`].
#[derive(Debug)]
pub struct Sequence {
    label: Option<String>,
    children: Vec<Step>,
    cursor: usize,
    scope: ParamScope,
    owner: Option<BulletId>,
}

impl Sequence {
    pub(crate) fn new(label: Option<String>, children: Vec<Step>, scope: ParamScope) -> Self {
        Self {
            label,
            children,
            cursor: 0,
            scope,
            owner: None,
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn is_done(&self) -> bool {
        self.cursor >= self.children.len()
    }

    /// Index of the next child to execute.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Current parameter vector of this scope.
    pub fn params(&self) -> &Params {
        self.scope.params()
    }

    /// Kinds of the steps along the cursor path, outermost first.
    pub fn active_path(&self) -> Vec<StepKind> {
        let mut path = Vec::new();
        let mut current = self;
        while let Some(child) = current.children.get(current.cursor) {
            path.push(child.kind());
            current = match child {
                Step::Sequence(sub) => sub,
                Step::Repeat(repeat) => repeat.body(),
                _ => break,
            };
        }
        path
    }

    /// Advances this sequence by one dispatch.
    ///
    /// Returns `None` if the sequence was already done; callers must not
    /// advance a completed sequence. On error, whatever this call already
    /// spawned is dropped; use [`Sequence::advance`] to keep it.
    pub fn execute<B: Bullet>(
        &mut self,
        bullet: &mut B,
        frame: &mut Frame<'_, B>,
        last: LastFired,
    ) -> Result<Option<StepResult<B>>> {
        let mut result = StepResult::new(last);
        if self.advance(bullet, frame, &mut result)? {
            Ok(Some(result))
        } else {
            Ok(None)
        }
    }

    /// One dispatch, accumulated into `result`.
    ///
    /// Spawns land in `result` as they happen, so a later failure in the
    /// same call leaves them there. Returns `false` if already done.
    pub(crate) fn advance<B: Bullet>(
        &mut self,
        bullet: &mut B,
        frame: &mut Frame<'_, B>,
        result: &mut StepResult<B>,
    ) -> Result<bool> {
        if self.is_done() {
            return Ok(false);
        }

        if let Some(params) = self.scope.resolve(frame)? {
            for child in &mut self.children {
                child.update_parameters(&params);
            }
        }

        let child = &mut self.children[self.cursor];
        match child {
            Step::Sequence(sub) => {
                sub.advance(bullet, frame, result)?;
            }
            Step::Repeat(repeat) => repeat.drain(bullet, frame, result)?,
            Step::Fire(fire) => {
                let spawn = fire.fire(bullet, frame, &mut result.last)?;
                result.spawned.push(spawn);
            }
            Step::Mutation(mutation) => {
                mutation.apply(bullet, frame)?;
                result.blocked |= !mutation.is_done();
            }
            Step::Wait(wait) => {
                wait.advance(frame)?;
                result.blocked |= !wait.is_done();
            }
            Step::Vanish(vanish) => {
                vanish.trigger();
                result.removed = true;
            }
        }

        if child.is_done() {
            self.cursor += 1;
            tracing::trace!(
                owner = ?self.owner,
                label = ?self.label,
                cursor = self.cursor,
                "sequence advanced"
            );
        }

        Ok(true)
    }

    /// Rewinds to the first child and resets every child.
    pub fn reset(&mut self) {
        self.cursor = 0;
        for child in &mut self.children {
            child.reset();
        }
        self.scope.invalidate();
    }

    pub fn update_parameters(&mut self, params: &Params) {
        if let Some(params) = self.scope.update(params) {
            for child in &mut self.children {
                child.update_parameters(&params);
            }
        }
    }

    /// Finishes the step under the cursor, recursively.
    pub fn finish(&mut self) {
        if let Some(child) = self.children.get_mut(self.cursor) {
            child.finish();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.children
            .get(self.cursor)
            .is_some_and(Step::is_finished)
    }

    pub fn bind(&mut self, owner: BulletId) {
        self.owner = Some(owner);
        for child in &mut self.children {
            child.bind(owner);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use pattern_core::{
        Action, BulletDef, BulletSource, EngineConfig, Expression, Fire, Node, NodeRef,
        PatternDocument, RepeatBody, SpeedSpec,
    };

    use crate::error::StepError;
    use crate::step::{Builder, no_params};
    use crate::testing::Harness;

    fn sequence(children: Vec<NodeRef>) -> Sequence {
        let document = Arc::new(PatternDocument::default());
        let builder = Builder::new(document, EngineConfig::default());
        builder
            .build_action(&Arc::new(Action::new(children)), &no_params())
            .unwrap()
    }

    fn shot() -> NodeRef {
        Node::fire(Fire::new(BulletSource::inline(BulletDef::default())))
    }

    #[test]
    fn wait_holds_cursor_until_elapsed() {
        let mut seq = sequence(vec![Node::wait(2.0), Node::vanish()]);
        let mut harness = Harness::new();
        let mut owner = harness.bullet(0.0, 1.0);

        seq.execute(&mut owner, &mut harness.frame(1.0), LastFired::default())
            .unwrap();
        assert_eq!(seq.cursor(), 0);
        seq.execute(&mut owner, &mut harness.frame(1.0), LastFired::default())
            .unwrap();
        assert_eq!(seq.cursor(), 1);

        let result = seq
            .execute(&mut owner, &mut harness.frame(1.0), LastFired::default())
            .unwrap()
            .unwrap();
        assert!(result.removed);
        assert!(seq.is_done());
        assert!(
            seq.execute(&mut owner, &mut harness.frame(1.0), LastFired::default())
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn active_path_follows_cursor_into_repeat() {
        let mut seq = sequence(vec![Node::repeat(
            2.0,
            RepeatBody::action(vec![shot(), Node::wait(5.0)]),
        )]);
        let mut harness = Harness::new();
        let mut owner = harness.bullet(0.0, 1.0);

        assert_eq!(seq.active_path(), vec![StepKind::Repeat, StepKind::Fire]);
        seq.execute(&mut owner, &mut harness.frame(1.0), LastFired::default())
            .unwrap();
        assert_eq!(seq.active_path(), vec![StepKind::Repeat, StepKind::Wait]);
    }

    #[test]
    fn finish_reaches_nested_wait() {
        let mut seq = sequence(vec![Node::action(Action::new(vec![Node::wait(5.0)]))]);
        let mut harness = Harness::new();
        let mut owner = harness.bullet(0.0, 1.0);
        seq.execute(&mut owner, &mut harness.frame(1.0), LastFired::default())
            .unwrap();

        assert!(!seq.is_finished());
        seq.finish();
        assert!(seq.is_finished());
        seq.reset();
        assert!(!seq.is_finished());
        assert_eq!(seq.cursor(), 0);
    }

    #[test]
    fn advance_keeps_spawns_made_before_a_fault() {
        let failing = Node::fire(
            Fire::new(BulletSource::inline(BulletDef::default()))
                .with_speed(SpeedSpec::absolute(Expression::parse("$5").unwrap())),
        );
        let mut seq = sequence(vec![Node::repeat(
            1.0,
            RepeatBody::action(vec![shot(), failing]),
        )]);
        let mut harness = Harness::new();
        let mut owner = harness.bullet(0.0, 1.0);

        let mut result = StepResult::new(LastFired::default());
        let err = seq
            .advance(&mut owner, &mut harness.frame(1.0), &mut result)
            .unwrap_err();
        assert!(matches!(err, StepError::Expression(_)));
        assert_eq!(result.spawned.len(), 1);
    }

    #[test]
    fn last_fired_flows_out_of_nested_action() {
        let mut seq = sequence(vec![Node::action(Action::new(vec![shot()])), shot()]);
        let mut harness = Harness::new();
        harness.target = pattern_core::Vec2::new(100.0, 0.0);
        let mut owner = harness.bullet(0.0, 1.0);

        let first = seq
            .execute(&mut owner, &mut harness.frame(1.0), LastFired::default())
            .unwrap()
            .unwrap();
        let heading = first.last.direction.unwrap();
        assert!((heading - 90.0).abs() < 1e-4);

        harness.target = pattern_core::Vec2::new(-100.0, 0.0);
        let second = seq
            .execute(&mut owner, &mut harness.frame(1.0), first.last)
            .unwrap()
            .unwrap();
        assert_eq!(second.spawned[0].bullet.direction, heading);
    }
}
