//! Expression evaluation.

use crate::error::{ErrorSeverity, PatternError};
use crate::expr::{BinaryOp, ExprContext, Expression};

/// Failure while evaluating an [`Expression`].
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ExpressionError {
    #[error("parameter ${index} referenced but only {supplied} supplied")]
    ParamOutOfRange { index: usize, supplied: usize },

    #[error("division by zero")]
    DivisionByZero,

    #[error("expression produced a non-finite value")]
    NonFinite,
}

impl PatternError for ExpressionError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Evaluation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ParamOutOfRange { .. } => "EXPRESSION_PARAM_OUT_OF_RANGE",
            Self::DivisionByZero => "EXPRESSION_DIVISION_BY_ZERO",
            Self::NonFinite => "EXPRESSION_NON_FINITE",
        }
    }
}

// ============================================================================
// Expression Evaluation
// ============================================================================

/// Evaluate an expression to a finite number.
///
/// ## Error Handling
/// - `ParamOutOfRange` if `$n` exceeds the supplied parameter count
/// - `DivisionByZero` for `/` or `%` with a zero right-hand side
/// - `NonFinite` if the final value is NaN or infinite
pub fn evaluate<C: ExprContext + ?Sized>(
    expr: &Expression,
    params: &[f32],
    ctx: &mut C,
) -> Result<f32, ExpressionError> {
    let value = eval_inner(expr, params, ctx)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ExpressionError::NonFinite)
    }
}

fn eval_inner<C: ExprContext + ?Sized>(
    expr: &Expression,
    params: &[f32],
    ctx: &mut C,
) -> Result<f32, ExpressionError> {
    match expr {
        Expression::Number(value) => Ok(*value),

        Expression::Param(index) => index
            .checked_sub(1)
            .and_then(|i| params.get(i))
            .copied()
            .ok_or(ExpressionError::ParamOutOfRange {
                index: *index,
                supplied: params.len(),
            }),

        Expression::Rank => Ok(ctx.rank()),

        Expression::Rand => Ok(ctx.random()),

        Expression::Neg(inner) => Ok(-eval_inner(inner, params, ctx)?),

        Expression::Binary { op, lhs, rhs } => {
            let lhs = eval_inner(lhs, params, ctx)?;
            let rhs = eval_inner(rhs, params, ctx)?;
            apply(*op, lhs, rhs)
        }
    }
}

fn apply(op: BinaryOp, lhs: f32, rhs: f32) -> Result<f32, ExpressionError> {
    match op {
        BinaryOp::Add => Ok(lhs + rhs),
        BinaryOp::Sub => Ok(lhs - rhs),
        BinaryOp::Mul => Ok(lhs * rhs),
        BinaryOp::Div | BinaryOp::Rem if rhs == 0.0 => Err(ExpressionError::DivisionByZero),
        BinaryOp::Div => Ok(lhs / rhs),
        BinaryOp::Rem => Ok(lhs % rhs),
    }
}
