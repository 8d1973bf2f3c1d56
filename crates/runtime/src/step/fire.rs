//! Bullet instantiation.

use std::sync::Arc;

use pattern_core::{
    Bullet, BulletDef, BulletId, DirectionKind, DirectionSpec, Fire, PatternError, Reference,
    SpeedKind, SpeedSpec, normalize_degrees,
};

use crate::error::Result;
use crate::frame::Frame;
use crate::runner::PatternRunner;
use crate::step::scope::ParamScope;
use crate::step::{Builder, LastFired, Params, Spawn};

/// Fire step: requests one bullet from the host factory per activation.
///
/// Heading resolution, first match wins:
/// 1. the fire's own direction
/// 2. the bullet definition's direction
/// 3. the last fired heading
/// 4. straight at the target
///
/// Speed follows the same order, ending at the configured default speed.
#[derive(Debug)]
pub struct FireStep {
    fire: Arc<Fire>,
    bullet: Arc<BulletDef>,
    /// Arguments of a `bulletRef`; an inline definition shares the fire's vector.
    bullet_args: Option<Arc<Reference>>,
    scope: ParamScope,
    builder: Builder,
    fired: bool,
    owner: Option<BulletId>,
}

impl FireStep {
    pub(crate) fn new(
        fire: Arc<Fire>,
        bullet: Arc<BulletDef>,
        bullet_args: Option<Arc<Reference>>,
        scope: ParamScope,
        builder: Builder,
    ) -> Self {
        Self {
            fire,
            bullet,
            bullet_args,
            scope,
            builder,
            fired: false,
            owner: None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.fired
    }

    pub fn definition(&self) -> &Arc<BulletDef> {
        &self.bullet
    }

    pub(crate) fn fire<B: Bullet>(
        &mut self,
        bullet: &mut B,
        frame: &mut Frame<'_, B>,
        last: &mut LastFired,
    ) -> Result<Spawn<B>> {
        self.scope.resolve(frame)?;
        let params = self.scope.params().clone();
        let bullet_params = match &self.bullet_args {
            Some(reference) => reference
                .args
                .iter()
                .map(|arg| arg.evaluate(&params, frame))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map(Params::from)?,
            None => params.clone(),
        };

        let direction = match (&self.fire.direction, &self.bullet.direction) {
            (Some(spec), _) => resolve_direction(spec, &params, bullet, frame, last)?,
            (None, Some(spec)) => resolve_direction(spec, &bullet_params, bullet, frame, last)?,
            (None, None) => last
                .direction
                .unwrap_or_else(|| bullet.position().direction_to(frame.target)),
        };
        let default_speed = self.builder.config().default_speed;
        let speed = match (&self.fire.speed, &self.bullet.speed) {
            (Some(spec), _) => resolve_speed(spec, &params, bullet, frame, last, default_speed)?,
            (None, Some(spec)) => {
                resolve_speed(spec, &bullet_params, bullet, frame, last, default_speed)?
            }
            (None, None) => last.speed.unwrap_or(default_speed),
        };

        // the child tree is built first so a defect in it stays with the child
        let runner = if self.bullet.actions.is_empty() {
            Ok(None)
        } else {
            PatternRunner::for_bullet(&self.builder, &self.bullet, bullet_params).map(Some)
        };

        let spawned = frame.create(&self.bullet, bullet, direction, speed);
        *last = LastFired {
            direction: Some(spawned.direction()),
            speed: Some(spawned.speed()),
        };
        self.fired = true;

        tracing::trace!(
            owner = ?self.owner,
            spawned = %spawned.id(),
            direction,
            speed,
            "fired bullet"
        );

        let (runner, fault) = match runner {
            Ok(runner) => (
                runner.map(|mut runner| {
                    runner.bind(spawned.id());
                    runner
                }),
                None,
            ),
            Err(error) => {
                tracing::error!(
                    owner = ?self.owner,
                    spawned = %spawned.id(),
                    code = error.error_code(),
                    %error,
                    "spawned bullet has no pattern"
                );
                (None, Some(error))
            }
        };

        Ok(Spawn {
            bullet: spawned,
            runner,
            fault,
        })
    }

    pub fn reset(&mut self) {
        self.fired = false;
        self.scope.invalidate();
    }

    pub fn update_parameters(&mut self, params: &Params) {
        self.scope.update(params);
    }

    pub fn bind(&mut self, owner: BulletId) {
        self.owner = Some(owner);
    }
}

fn resolve_direction<B: Bullet>(
    spec: &DirectionSpec,
    params: &[f32],
    bullet: &B,
    frame: &mut Frame<'_, B>,
    last: &LastFired,
) -> Result<f32> {
    let value = spec.value.evaluate(params, frame)?;
    let aim = || bullet.position().direction_to(frame.target);
    let heading = match spec.kind {
        DirectionKind::Aim => aim() + value,
        DirectionKind::Absolute => value,
        DirectionKind::Relative => bullet.direction() + value,
        DirectionKind::Sequence => last.direction.unwrap_or_else(aim) + value,
    };
    Ok(normalize_degrees(heading))
}

fn resolve_speed<B: Bullet>(
    spec: &SpeedSpec,
    params: &[f32],
    bullet: &B,
    frame: &mut Frame<'_, B>,
    last: &LastFired,
    default_speed: f32,
) -> Result<f32> {
    let value = spec.value.evaluate(params, frame)?;
    Ok(match spec.kind {
        SpeedKind::Absolute => value,
        SpeedKind::Relative => bullet.speed() + value,
        SpeedKind::Sequence => last.speed.unwrap_or(default_speed) + value,
    })
}
