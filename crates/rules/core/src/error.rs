//! Common error infrastructure for rules-core.
//!
//! This module provides the shared severity classification used across all
//! error types in the engine. Domain-specific errors (e.g., `TypeError`,
//! `ConfigError`) are defined in their respective modules alongside the
//! operations they guard.
//!
//! # Design Principles
//!
//! - **Fail fast at load**: anything discoverable while registering host
//!   operations or loading rule data is fatal to that registration
//! - **Degrade at evaluation**: anything depending on live game state
//!   (missing entity, absent component) resolves to an empty sequence or a
//!   default value instead of an error
//! - **Never swallow data-integrity errors**: type/registry mismatches are
//!   surfaced to the caller so broken content gets fixed

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: temporary conditions the evaluation layer may retry or
///   route around
/// - **Validation**: invalid authored data or registration input; should be
///   rejected without retry
/// - **Internal**: unexpected state inconsistencies that require investigation
/// - **Fatal**: unrecoverable errors; the embedding host should abort startup
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - can retry with the same or an alternative input.
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    Validation,

    /// Internal error - unexpected state inconsistency.
    Internal,

    /// Fatal error - registration or startup cannot continue.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error should abort host startup.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal)
    }
}

/// Common trait for all rules-core errors.
///
/// Provides a uniform interface for error classification across the engine.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impls
/// - Classify severity based on recoverability, not impact
pub trait RuleError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Useful for error categorization, metrics, and testing.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_predicates() {
        assert!(ErrorSeverity::Recoverable.is_recoverable());
        assert!(!ErrorSeverity::Validation.is_recoverable());
        assert!(ErrorSeverity::Fatal.is_fatal());
        assert_eq!(ErrorSeverity::Internal.as_str(), "internal");
    }
}
