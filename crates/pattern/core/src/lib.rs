//! Shared data types and host contracts for the bullet pattern runtime.
//!
//! `pattern-core` defines the immutable side of the system: the operation
//! node tree and its label tables ([`document`]), parameter expressions
//! ([`expr`]), and the traits a host implements so the runtime can read and
//! steer its bullets ([`env`]). Nothing here mutates shared state or logs;
//! execution lives in `pattern-runtime`.
pub mod config;
pub mod document;
pub mod env;
pub mod error;
pub mod expr;
pub mod types;

pub use config::EngineConfig;
pub use document::{
    Accel, Action, BulletDef, BulletSource, ChangeDirection, ChangeSpeed, DefinitionKind,
    DirectionKind, DirectionSpec, DocumentBuilder, DocumentError, Fire, Node, NodeKind, NodeRef,
    PatternDocument, Reference, Repeat, RepeatBody, SpeedKind, SpeedSpec, Wait,
};
pub use env::{Bullet, BulletFactory, PcgRng, RandomSource};
pub use error::{ErrorSeverity, PatternError};
pub use expr::{BinaryOp, ExprContext, Expression, ExpressionError, FixedContext, ParseError};
pub use types::{BulletId, Vec2, normalize_degrees, shortest_arc};
