//! Tick-driven, resumable execution of bullet pattern documents.
//!
//! A [`PatternRunner`] owns the live step tree of one bullet and advances it
//! by one dispatch per simulation tick. All suspension is explicit state in
//! the tree, so a pattern paused on a wait resumes exactly where it stopped.
//!
//! Modules are organized by responsibility:
//! - [`step`] holds the step tree, its builder, and every step kind
//! - [`runner`] owns one bullet's tree and its lifecycle
//! - [`engine`] drives many bullets with per-bullet fault isolation
//! - [`frame`] carries the per-tick inputs (delta, target, rank, factory, rng)
//! - [`config`] loads [`pattern_core::EngineConfig`] from TOML or the environment
pub mod config;
pub mod engine;
pub mod error;
pub mod frame;
pub mod runner;
pub mod step;

#[cfg(test)]
mod testing;

pub use config::{ConfigLoader, LoadResult};
pub use engine::{PatternEngine, TickReport};
pub use error::{Result, StepError};
pub use frame::Frame;
pub use runner::{PatternRunner, RunnerState, TickFailure, TickOutcome};
pub use step::{Builder, LastFired, Params, Sequence, Spawn, Step, StepKind, StepResult, no_params};
