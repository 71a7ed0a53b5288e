//! Comparison operator taxonomy.
//!
//! Operators classify as exactly one of binary or unary via a static table
//! ([`CompareOp::arity`]), and each operator maps to the capability bit a
//! type must carry before callers may apply it ([`CompareOp::required_caps`]).
//! The evaluator itself ([`evaluate`]) only checks kind-applicability;
//! consulting the type registry's allowed-operator set is the caller's job.

mod evaluate;

pub use evaluate::{evaluate, wildcard_match};

use crate::error::{ErrorSeverity, RuleError};
use crate::types::TypeKey;

bitflags::bitflags! {
    /// Comparison capabilities a type may grant.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct CompareCaps: u8 {
        /// Equal / NotEqual.
        const EQUALITY = 1 << 0;
        /// The four strict ordering operators.
        const ORDERING = 1 << 1;
        /// IsTrue / IsFalse.
        const TRUTH = 1 << 2;
        /// The string-only predicates.
        const TEXT = 1 << 3;
    }
}

impl CompareCaps {
    /// Returns true if a type granting these capabilities allows `op`.
    #[inline]
    pub fn allows(&self, op: CompareOp) -> bool {
        self.contains(op.required_caps())
    }
}

/// Whether an operator takes one operand or two.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpArity {
    Binary,
    Unary,
}

/// A comparison operator authored in rule data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompareOp {
    LessOrEqual,
    Less,
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,

    /// ">0" for numerics, identity for bool, non-empty for strings.
    IsTrue,
    IsFalse,

    Contains,
    NotContains,
    StartsWith,
    NotStartsWith,
    EndsWith,
    NotEndsWith,
    IsEmpty,
    IsNotEmpty,
    /// Wildcard match with a single leading or trailing `*`.
    Matches,
    NotMatches,
}

impl CompareOp {
    /// Classifies this operator as binary or unary.
    pub const fn arity(self) -> OpArity {
        match self {
            Self::IsTrue | Self::IsFalse | Self::IsEmpty | Self::IsNotEmpty => OpArity::Unary,
            _ => OpArity::Binary,
        }
    }

    /// The capability bit a type must grant before this operator applies.
    pub const fn required_caps(self) -> CompareCaps {
        match self {
            Self::Equal | Self::NotEqual => CompareCaps::EQUALITY,
            Self::LessOrEqual | Self::Less | Self::Greater | Self::GreaterOrEqual => {
                CompareCaps::ORDERING
            }
            Self::IsTrue | Self::IsFalse => CompareCaps::TRUTH,
            Self::Contains
            | Self::NotContains
            | Self::StartsWith
            | Self::NotStartsWith
            | Self::EndsWith
            | Self::NotEndsWith
            | Self::IsEmpty
            | Self::IsNotEmpty
            | Self::Matches
            | Self::NotMatches => CompareCaps::TEXT,
        }
    }
}

/// Errors raised by the comparison evaluator.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CompareError {
    /// The operator does not apply to values of this kind.
    #[error("operator {op} is not applicable to {kind} values")]
    InvalidComparison { op: CompareOp, kind: TypeKey },
}

impl RuleError for CompareError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        "COMPARE_INVALID"
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn every_operator_classifies_exactly_once() {
        for op in CompareOp::iter() {
            // arity() is total; required_caps() maps to a single bit.
            let caps = op.required_caps();
            assert_eq!(caps.bits().count_ones(), 1, "{op} maps to one capability");
        }
    }

    #[test]
    fn capability_gating() {
        let numeric = CompareCaps::EQUALITY | CompareCaps::ORDERING | CompareCaps::TRUTH;
        assert!(numeric.allows(CompareOp::Less));
        assert!(numeric.allows(CompareOp::IsTrue));
        assert!(!numeric.allows(CompareOp::Contains));

        let text = CompareCaps::EQUALITY | CompareCaps::TEXT;
        assert!(text.allows(CompareOp::Matches));
        assert!(!text.allows(CompareOp::GreaterOrEqual));
    }
}
