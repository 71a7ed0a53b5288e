//! Polymorphic value sources.
//!
//! A [`ValueSource`] is the authored descriptor for one operand: a literal,
//! the live trigger argument, a register, or a nested query against an
//! entity scope. Sources are resolved fresh on every evaluation; argument,
//! register, and query modes depend on the execution context and must never
//! be cached across runs.

mod resolve;

pub use resolve::resolve;

use crate::context::{RegisterIndex, TriggerContext};
use crate::error::{ErrorSeverity, RuleError};
use crate::invoke::OperationRegistry;
use crate::scope::EntityScope;
use crate::types::{QueryId, TypeError, TypeKey, TypedValue};

/// Where one operand's value comes from at evaluation time.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueSource {
    /// A literal typed value, returned unchanged.
    Literal(TypedValue),

    /// A nested query invocation against an entity scope.
    Query { scope: EntityScope, query: QueryId },

    /// The live trigger argument.
    Argument,

    /// The current content of a register slot.
    Register(RegisterIndex),
}

impl ValueSource {
    pub fn literal(value: impl Into<TypedValue>) -> Self {
        Self::Literal(value.into())
    }

    pub fn query(scope: EntityScope, query: impl Into<QueryId>) -> Self {
        Self::Query {
            scope,
            query: query.into(),
        }
    }

    /// The literal value of a `Literal` source.
    ///
    /// # Panics
    ///
    /// Panics on any other mode; calling the wrong accessor is a programming
    /// error, not a runtime data error.
    pub fn literal_value(&self) -> &TypedValue {
        match self {
            Self::Literal(value) => value,
            other => panic!("literal_value() called on {other:?}"),
        }
    }

    /// The scope/query pair of a `Query` source.
    ///
    /// # Panics
    ///
    /// Panics on any other mode.
    pub fn query_target(&self) -> (&EntityScope, &QueryId) {
        match self {
            Self::Query { scope, query } => (scope, query),
            other => panic!("query_target() called on {other:?}"),
        }
    }

    /// The register index of a `Register` source.
    ///
    /// # Panics
    ///
    /// Panics on any other mode.
    pub fn register_index(&self) -> RegisterIndex {
        match self {
            Self::Register(register) => *register,
            other => panic!("register_index() called on {other:?}"),
        }
    }

    /// The statically declared type of this source.
    ///
    /// Literal sources carry their own kind; an argument carries the
    /// trigger's declared parameter type; a query carries its bound query's
    /// declared return type; register contents are untyped ("any").
    pub fn type_key(&self, trigger: Option<&TriggerContext>, ops: &OperationRegistry) -> TypeKey {
        match self {
            Self::Literal(value) => value.type_key(),
            Self::Argument => trigger
                .and_then(|trigger| trigger.param_type.clone())
                .unwrap_or(TypeKey::Any),
            Self::Query { query, .. } => ops
                .query(query)
                .map(|registered| registered.descriptor.return_type.clone())
                .unwrap_or(TypeKey::Any),
            Self::Register(_) => TypeKey::Any,
        }
    }
}

impl From<TypedValue> for ValueSource {
    fn from(value: TypedValue) -> Self {
        Self::Literal(value)
    }
}

/// Errors raised while resolving a value source.
///
/// Resolution misses inside a nested query are not errors; the query
/// supplies its declared default. These variants cover data-integrity
/// failures that must surface to the caller.
#[derive(Debug, thiserror::Error)]
pub enum ValueError {
    /// Argument mode resolved while no trigger argument is active.
    #[error("no trigger argument is active")]
    MissingArgument,

    /// Query mode references an unregistered query.
    #[error("unknown query `{0}`")]
    UnknownQuery(QueryId),

    /// The resolved value does not convert to the declared type.
    #[error(transparent)]
    Conversion(#[from] TypeError),
}

impl RuleError for ValueError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingArgument => "VALUE_MISSING_ARGUMENT",
            Self::UnknownQuery(_) => "VALUE_UNKNOWN_QUERY",
            Self::Conversion(_) => "VALUE_CONVERSION",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_panic_on_mode_mismatch() {
        let literal = ValueSource::literal(3);
        assert_eq!(literal.literal_value(), &TypedValue::Int(3));

        let result = std::panic::catch_unwind(|| literal.register_index());
        assert!(result.is_err());
    }

    #[test]
    fn static_types_per_mode() {
        let ops = OperationRegistry::new();
        assert_eq!(
            ValueSource::literal("hello").type_key(None, &ops),
            TypeKey::Str
        );
        assert_eq!(
            ValueSource::Register(RegisterIndex::R3).type_key(None, &ops),
            TypeKey::Any
        );
        assert_eq!(ValueSource::Argument.type_key(None, &ops), TypeKey::Any);

        let trigger = TriggerContext::new(crate::types::TriggerId(1))
            .with_argument(TypeKey::Int, TypedValue::Int(5));
        assert_eq!(
            ValueSource::Argument.type_key(Some(&trigger), &ops),
            TypeKey::Int
        );
    }
}
