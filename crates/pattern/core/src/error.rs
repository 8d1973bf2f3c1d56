//! Common error infrastructure for pattern-core.
//!
//! Domain-specific errors (`DocumentError`, `ExpressionError`, `ParseError`)
//! live next to the code that produces them. This module holds what they
//! share: a severity classification and the [`PatternError`] trait the
//! runtime uses when it decides how loudly to report a failed pattern.
//!
//! Every error here is scoped to one pattern instance. None of them is
//! allowed to take down other running bullets.

/// Severity level of an error, used for categorization and reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// The pattern content itself is defective.
    ///
    /// Examples: unresolved reference, unsupported operation, duplicate label.
    /// Retrying the same content fails the same way.
    Authoring,

    /// A value produced at run time made an expression unusable.
    ///
    /// Examples: division by zero, a parameter index the caller did not supply.
    /// The same content may evaluate fine with other parameters or rank.
    Evaluation,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Authoring => "authoring",
            Self::Evaluation => "evaluation",
        }
    }

    /// Returns true if the content has to change before the pattern can run.
    pub const fn is_authoring(&self) -> bool {
        matches!(self, Self::Authoring)
    }
}

/// Common trait for all pattern errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity by whether the content or the data is at fault
pub trait PatternError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Useful for log fields and assertions in tests.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
