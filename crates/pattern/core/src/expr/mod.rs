//! Parameter expressions.
//!
//! Every numeric field of an operation node is an [`Expression`]: a small
//! formula over constants, the caller's positional parameters (`$1`, `$2`,
//! ...), the difficulty rank (`$rank`) and a uniform random draw (`$rand`).
//! Expressions are evaluated lazily, each time the scope that owns them is
//! (re)entered.
//!
//! ## Examples
//!
//! ```
//! use pattern_core::expr::{Expression, FixedContext};
//!
//! let expr: Expression = "$1 * 2 + $rank * 10".parse().unwrap();
//! let mut ctx = FixedContext::with_rank(0.5);
//! assert_eq!(expr.evaluate(&[3.0], &mut ctx).unwrap(), 11.0);
//! ```

pub mod evaluate;
pub mod parse;

pub use evaluate::{ExpressionError, evaluate};
pub use parse::ParseError;

use std::fmt;

use crate::env::{PcgRng, RandomSource};

// ============================================================================
// Expression Definition
// ============================================================================

/// Formula evaluated against a caller-supplied parameter vector.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Expression {
    /// Literal number.
    Number(f32),

    /// Caller parameter, 1-based as written (`$1` is the first element).
    Param(usize),

    /// Difficulty rank supplied by the host, conventionally in `[0, 1]`.
    Rank,

    /// Uniform random value in `[0, 1)`, drawn fresh on every evaluation.
    Rand,

    /// Arithmetic negation.
    Neg(Box<Expression>),

    /// Binary arithmetic.
    Binary {
        op: BinaryOp,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
}

/// Arithmetic operator of [`Expression::Binary`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    pub const fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
            Self::Rem => '%',
        }
    }
}

impl Expression {
    /// Shorthand for a literal.
    pub const fn constant(value: f32) -> Self {
        Self::Number(value)
    }

    /// Shorthand for `$index`.
    pub const fn param(index: usize) -> Self {
        Self::Param(index)
    }

    pub fn binary(op: BinaryOp, lhs: Expression, rhs: Expression) -> Self {
        Self::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Parses the textual formula syntax.
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        parse::parse(source)
    }

    /// Evaluates against `params` (positional) with rank and randomness from `ctx`.
    pub fn evaluate<C: ExprContext + ?Sized>(
        &self,
        params: &[f32],
        ctx: &mut C,
    ) -> Result<f32, ExpressionError> {
        evaluate(self, params, ctx)
    }

    /// Returns the highest `$n` referenced, or 0 when none is.
    pub fn max_param(&self) -> usize {
        match self {
            Self::Param(index) => *index,
            Self::Neg(inner) => inner.max_param(),
            Self::Binary { lhs, rhs, .. } => lhs.max_param().max(rhs.max_param()),
            Self::Number(_) | Self::Rank | Self::Rand => 0,
        }
    }
}

impl From<f32> for Expression {
    fn from(value: f32) -> Self {
        Self::Number(value)
    }
}

// Unsuffixed float literals default to f64.
impl From<f64> for Expression {
    fn from(value: f64) -> Self {
        Self::Number(value as f32)
    }
}

impl From<i32> for Expression {
    fn from(value: i32) -> Self {
        Self::Number(value as f32)
    }
}

impl std::str::FromStr for Expression {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse::parse(s)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Param(index) => write!(f, "${index}"),
            Self::Rank => f.write_str("$rank"),
            Self::Rand => f.write_str("$rand"),
            Self::Neg(inner) => write!(f, "-({inner})"),
            Self::Binary { op, lhs, rhs } => write!(f, "({lhs} {} {rhs})", op.symbol()),
        }
    }
}

// ============================================================================
// Evaluation Context
// ============================================================================

/// Host-supplied inputs an expression may read besides its parameters.
pub trait ExprContext {
    /// Current difficulty rank.
    fn rank(&self) -> f32;

    /// Next uniform random value in `[0, 1)`.
    fn random(&mut self) -> f32;
}

/// Fixed rank plus a seeded [`PcgRng`]; handy for tools and tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct FixedContext {
    pub rank: f32,
    pub rng: PcgRng,
}

impl FixedContext {
    pub fn new(rank: f32, rng: PcgRng) -> Self {
        Self { rank, rng }
    }

    pub fn with_rank(rank: f32) -> Self {
        Self {
            rank,
            rng: PcgRng::default(),
        }
    }
}

impl ExprContext for FixedContext {
    fn rank(&self) -> f32 {
        self.rank
    }

    fn random(&mut self) -> f32 {
        self.rng.next_unit()
    }
}
