//! Errors surfaced while building or executing a bullet's step tree.
//!
//! Every variant is fatal to the one pattern instance that raised it and to
//! nothing else: [`crate::PatternRunner`] aborts its own tree and the
//! [`crate::PatternEngine`] keeps ticking every other bullet.
use pattern_core::{DocumentError, ErrorSeverity, ExpressionError, NodeKind, PatternError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StepError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StepError {
    /// A reference did not resolve to a definition of the expected kind.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// The step builder met a node kind it has no step for.
    #[error("unsupported operation '{kind}'")]
    UnsupportedOperation { kind: NodeKind },

    #[error("expression evaluation failed: {0}")]
    Expression(#[from] ExpressionError),

    #[error("action nesting too deep: '{label}' reached depth {depth}")]
    NestingTooDeep { label: String, depth: usize },
}

impl StepError {
    /// Returns true for an unresolved or kind-mismatched reference.
    pub fn is_definition_not_found(&self) -> bool {
        matches!(
            self,
            Self::Document(DocumentError::DefinitionNotFound { .. })
        )
    }
}

impl PatternError for StepError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Document(err) => err.severity(),
            Self::Expression(err) => err.severity(),
            Self::UnsupportedOperation { .. } | Self::NestingTooDeep { .. } => {
                ErrorSeverity::Authoring
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Document(err) => err.error_code(),
            Self::Expression(err) => err.error_code(),
            Self::UnsupportedOperation { .. } => "STEP_UNSUPPORTED_OPERATION",
            Self::NestingTooDeep { .. } => "STEP_NESTING_TOO_DEEP",
        }
    }
}
