//! Node-to-step mapping.

use std::sync::Arc;

use pattern_core::{
    Action, BulletDef, BulletSource, EngineConfig, Fire, Node, NodeKind, NodeRef, PatternDocument,
    Reference, RepeatBody,
};

use crate::error::{Result, StepError};
use crate::step::scope::ParamScope;
use crate::step::{
    FireStep, MutationStep, MutationTarget, Params, RepeatSequence, Sequence, Step, VanishStep,
    WaitStep,
};

/// Builds live step trees from a shared document.
///
/// The match over [`Node`] is exhaustive: a node kind without a step fails
/// with [`StepError::UnsupportedOperation`] instead of becoming a no-op.
/// Action and fire references resolve while building, so an unresolved
/// label aborts construction. Bullet definitions fired by the tree build
/// their own patterns lazily, when the bullet spawns.
#[derive(Clone, Debug)]
pub struct Builder {
    document: Arc<PatternDocument>,
    config: EngineConfig,
}

impl Builder {
    pub fn new(document: Arc<PatternDocument>, config: EngineConfig) -> Self {
        Self { document, config }
    }

    pub fn document(&self) -> &Arc<PatternDocument> {
        &self.document
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Builds the step for one node with `params` as its caller vector.
    pub fn build(&self, node: &NodeRef, params: &Params) -> Result<Step> {
        self.build_at(node, params, 0)
    }

    /// Builds the sequence for an action entered directly, without arguments.
    pub fn build_action(&self, action: &Arc<Action>, params: &Params) -> Result<Sequence> {
        self.sequence(action, ParamScope::plain(params.clone()), 1)
    }

    /// Builds the pattern of a spawned bullet: its actions in order.
    pub fn build_bullet(&self, definition: &BulletDef, params: Params) -> Result<Sequence> {
        let children = definition
            .actions
            .iter()
            .map(|node| self.build_at(node, &params, 1))
            .collect::<Result<Vec<_>>>()?;
        Ok(Sequence::new(
            definition.label.clone(),
            children,
            ParamScope::plain(params),
        ))
    }

    fn build_at(&self, node: &NodeRef, params: &Params, depth: usize) -> Result<Step> {
        let step = match node.as_ref() {
            Node::Action(action) => Step::Sequence(self.sequence(
                action,
                ParamScope::plain(params.clone()),
                depth + 1,
            )?),
            Node::ActionRef(reference) => {
                let action = self.document.resolve_action(&reference.label)?;
                Step::Sequence(self.sequence(
                    action,
                    ParamScope::bound(reference.clone(), params.clone()),
                    depth + 1,
                )?)
            }
            Node::Repeat(repeat) => {
                let body = match &repeat.body {
                    RepeatBody::Action(action) => {
                        self.sequence(action, ParamScope::plain(params.clone()), depth + 1)?
                    }
                    RepeatBody::Reference(reference) => {
                        let action = self.document.resolve_action(&reference.label)?;
                        self.sequence(
                            action,
                            ParamScope::bound(reference.clone(), params.clone()),
                            depth + 1,
                        )?
                    }
                };
                Step::Repeat(RepeatSequence::new(repeat.clone(), params.clone(), body))
            }
            Node::Fire(fire) => self.fire(fire.clone(), ParamScope::plain(params.clone()))?,
            Node::FireRef(reference) => {
                let fire = self.document.resolve_fire(&reference.label)?.clone();
                self.fire(fire, ParamScope::bound(reference.clone(), params.clone()))?
            }
            Node::ChangeDirection(change) => Step::Mutation(MutationStep::new(
                MutationTarget::Direction(change.clone()),
                params.clone(),
            )),
            Node::ChangeSpeed(change) => Step::Mutation(MutationStep::new(
                MutationTarget::Speed(change.clone()),
                params.clone(),
            )),
            Node::Accel(_) => {
                return Err(StepError::UnsupportedOperation {
                    kind: NodeKind::Accel,
                });
            }
            Node::Wait(wait) => Step::Wait(WaitStep::new(wait.clone(), params.clone())),
            Node::Vanish => Step::Vanish(VanishStep::new()),
        };
        Ok(step)
    }

    fn sequence(&self, action: &Arc<Action>, scope: ParamScope, depth: usize) -> Result<Sequence> {
        if depth > self.config.max_nesting_depth {
            return Err(StepError::NestingTooDeep {
                label: action.label.clone().unwrap_or_else(|| "<inline>".to_owned()),
                depth,
            });
        }
        // bound scopes have no vector yet; children adopt it on activation
        let params = scope.params().clone();
        let children = action
            .children
            .iter()
            .map(|node| self.build_at(node, &params, depth))
            .collect::<Result<Vec<_>>>()?;
        Ok(Sequence::new(action.label.clone(), children, scope))
    }

    fn fire(&self, fire: Arc<Fire>, scope: ParamScope) -> Result<Step> {
        let (bullet, args): (Arc<BulletDef>, Option<Arc<Reference>>) = match &fire.bullet {
            BulletSource::Inline(definition) => (definition.clone(), None),
            BulletSource::Reference(reference) => (
                self.document.resolve_bullet(&reference.label)?.clone(),
                Some(reference.clone()),
            ),
        };
        Ok(Step::Fire(FireStep::new(
            fire,
            bullet,
            args,
            scope,
            self.clone(),
        )))
    }
}
