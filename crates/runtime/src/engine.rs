//! Multi-bullet host convenience.
//!
//! [`PatternEngine`] keeps every live bullet next to its optional
//! [`PatternRunner`] and advances them all once per tick. Faults stay with
//! the bullet that raised them: an aborted pattern is reported and the pass
//! continues with the next bullet. Bullets a failing pattern created before
//! the fault still join the engine.

use pattern_core::{Bullet, BulletId};

use crate::error::StepError;
use crate::frame::Frame;
use crate::runner::{PatternRunner, RunnerState};

/// What one [`PatternEngine::tick`] changed.
#[derive(Debug, Default)]
pub struct TickReport {
    /// Bullets inserted after the pass, in fire order.
    pub spawned: Vec<BulletId>,
    /// Bullets dropped because their pattern vanished them.
    pub removed: Vec<BulletId>,
    /// Bullets whose pattern ran to its end this tick.
    pub completed: Vec<BulletId>,
    /// Bullets whose pattern failed this tick, including spawns whose own
    /// actions failed to build. The bullet itself stays.
    pub aborted: Vec<(BulletId, StepError)>,
}

#[derive(Debug)]
struct Entry<B> {
    bullet: B,
    runner: Option<PatternRunner>,
}

/// Owns bullets and their patterns, in insertion order.
#[derive(Debug)]
pub struct PatternEngine<B> {
    entries: Vec<Entry<B>>,
}

impl<B> Default for PatternEngine<B> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<B: Bullet> PatternEngine<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a bullet, binding its runner to the bullet's id.
    pub fn insert(&mut self, bullet: B, mut runner: Option<PatternRunner>) -> BulletId {
        let id = bullet.id();
        if let Some(runner) = runner.as_mut() {
            runner.bind(id);
        }
        self.entries.push(Entry { bullet, runner });
        id
    }

    /// Advances every running pattern once.
    pub fn tick(&mut self, frame: &mut Frame<'_, B>) -> TickReport {
        let mut report = TickReport::default();
        let mut spawned = Vec::new();

        for Entry { bullet, runner } in &mut self.entries {
            let Some(runner) = runner.as_mut().filter(|runner| runner.is_running()) else {
                continue;
            };
            let id = bullet.id();
            match runner.tick(bullet, frame) {
                Ok(outcome) => {
                    spawned.extend(outcome.spawned);
                    if outcome.removed {
                        report.removed.push(id);
                    } else if runner.state() == RunnerState::Completed {
                        report.completed.push(id);
                    }
                }
                Err(failure) => {
                    spawned.extend(failure.spawned);
                    report.aborted.push((id, failure.error));
                }
            }
        }

        self.entries.retain(|entry| {
            entry
                .runner
                .as_ref()
                .is_none_or(|runner| runner.state() != RunnerState::Vanished)
        });
        for spawn in spawned {
            let id = self.insert(spawn.bullet, spawn.runner);
            report.spawned.push(id);
            if let Some(fault) = spawn.fault {
                report.aborted.push((id, fault));
            }
        }

        if !report.aborted.is_empty() {
            tracing::warn!(
                aborted = report.aborted.len(),
                live = self.entries.len(),
                "patterns aborted this tick"
            );
        }
        report
    }

    /// Takes a bullet out, cancelling its pattern first.
    pub fn remove(&mut self, id: BulletId) -> Option<B> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.bullet.id() == id)?;
        let mut entry = self.entries.remove(index);
        if let Some(runner) = entry.runner.as_mut() {
            runner.cancel();
        }
        Some(entry.bullet)
    }

    pub fn get(&self, id: BulletId) -> Option<&B> {
        self.entry(id).map(|entry| &entry.bullet)
    }

    pub fn get_mut(&mut self, id: BulletId) -> Option<&mut B> {
        self.entries
            .iter_mut()
            .find(|entry| entry.bullet.id() == id)
            .map(|entry| &mut entry.bullet)
    }

    pub fn runner(&self, id: BulletId) -> Option<&PatternRunner> {
        self.entry(id).and_then(|entry| entry.runner.as_ref())
    }

    pub fn bullets(&self) -> impl Iterator<Item = &B> {
        self.entries.iter().map(|entry| &entry.bullet)
    }

    /// Mutable access for the host's movement pass.
    pub fn bullets_mut(&mut self) -> impl Iterator<Item = &mut B> {
        self.entries.iter_mut().map(|entry| &mut entry.bullet)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, id: BulletId) -> Option<&Entry<B>> {
        self.entries.iter().find(|entry| entry.bullet.id() == id)
    }
}
