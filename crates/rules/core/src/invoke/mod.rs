//! Action and query invocation.
//!
//! The invokers orchestrate exactly one host call each: liveness check,
//! binding, argument marshaling, dispatch, result reporting. There are no
//! retries; a failed invocation is reported to the rule layer, which
//! decides whether to skip, abort, or log the remainder of the rule.
//!
//! # Module Structure
//!
//! - `registry`: action/query descriptors and the [`OperationRegistry`]
//! - `action`: action invocation ([`ActionResult`] reporting)
//! - `query`: query invocation (always yields a usable value)

pub mod action;
pub mod query;
mod registry;

pub use registry::{
    ActionDescriptor, OperationRegistry, QueryDescriptor, RegisteredAction, RegisteredQuery,
};

use arrayvec::ArrayVec;
use tracing::warn;

use crate::bind::ParamSpec;
use crate::context::ExecutionContext;
use crate::error::{ErrorSeverity, RuleError};
use crate::types::{ActionId, ComponentHandle, EntityId, TypeError, TypeKey, TypedValue};
use crate::value::{ValueError, ValueSource};

/// Maximum declared parameters per callable; enforced at registration.
pub const MAX_PARAMS: usize = 8;

/// Argument buffer sized for one invocation.
pub type ArgBuffer = ArrayVec<TypedValue, MAX_PARAMS>;

// ============================================================================
// Host Callables
// ============================================================================

/// Everything a host callable receives for one invocation.
///
/// `entity`/`component` are the slots filled by the member binding; `args`
/// holds the designer-editable parameters, already marshaled to their
/// declared types.
pub struct Call<'run, 'w> {
    pub entity: Option<EntityId>,
    pub component: Option<ComponentHandle>,
    pub args: &'run [TypedValue],
    pub ctx: &'run mut ExecutionContext<'w>,
}

/// A registered host callable.
pub type HostFn = Box<dyn Fn(Call<'_, '_>) -> TypedValue + Send + Sync>;

// ============================================================================
// Results
// ============================================================================

/// Outcome of one action invocation.
#[derive(Clone, Debug, PartialEq)]
pub enum ActionResult {
    /// The host callable ran; its return value (void for pure side effects).
    Success(TypedValue),

    /// The action requires an active entity and the target is inactive.
    Inactive,

    /// The target entity could not be resolved.
    NoEntity,

    /// The target entity lacks the required component.
    NoComponent(TypeKey),
}

impl ActionResult {
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The returned value, if the invocation succeeded.
    pub fn value(&self) -> Option<&TypedValue> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }
}

/// Fatal-to-this-invocation errors: malformed arguments, unknown operations.
///
/// Distinct from the resolution misses reported inside [`ActionResult`],
/// which are recoverable outcomes of live game state.
#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    #[error("unknown action `{0}`")]
    UnknownAction(ActionId),

    #[error("failed to resolve argument `{param}` of `{operation}`")]
    Argument {
        operation: String,
        param: String,
        #[source]
        source: ValueError,
    },

    #[error("argument `{param}` of `{operation}` does not convert to {expected}")]
    Marshal {
        operation: String,
        param: String,
        expected: TypeKey,
        #[source]
        source: TypeError,
    },

    #[error("argument `{param}` of `{operation}` is required but was not supplied")]
    MissingArgument { operation: String, param: String },
}

impl RuleError for InvokeError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownAction(_) => "INVOKE_UNKNOWN_ACTION",
            Self::Argument { .. } => "INVOKE_ARGUMENT",
            Self::Marshal { .. } => "INVOKE_MARSHAL",
            Self::MissingArgument { .. } => "INVOKE_MISSING_ARGUMENT",
        }
    }
}

// ============================================================================
// Argument Marshaling
// ============================================================================

/// Resolves and converts the designer-editable arguments of one invocation.
///
/// `sources` supplies values positionally for the parameters starting at
/// `editable_from`; unsupplied optional parameters fall back to their
/// declared default, then to the type's registry default.
pub(crate) fn marshal(
    operation: &str,
    params: &[ParamSpec],
    editable_from: usize,
    sources: &[ValueSource],
    ctx: &mut ExecutionContext<'_>,
) -> Result<ArgBuffer, InvokeError> {
    let editable = &params[editable_from.min(params.len())..];
    if sources.len() > editable.len() {
        warn!(
            operation,
            given = sources.len(),
            accepted = editable.len(),
            "extra arguments ignored"
        );
    }
    let mut buffer = ArgBuffer::new();
    for (index, spec) in editable.iter().enumerate() {
        let value = match sources.get(index) {
            Some(source) => {
                let raw = crate::value::resolve(source, ctx).map_err(|source| {
                    InvokeError::Argument {
                        operation: operation.to_owned(),
                        param: spec.name.clone(),
                        source,
                    }
                })?;
                raw.convert_to(&spec.ty, ctx.types)
                    .map_err(|source| InvokeError::Marshal {
                        operation: operation.to_owned(),
                        param: spec.name.clone(),
                        expected: spec.ty.clone(),
                        source,
                    })?
            }
            None => default_argument(spec, ctx).ok_or_else(|| InvokeError::MissingArgument {
                operation: operation.to_owned(),
                param: spec.name.clone(),
            })?,
        };
        buffer.push(value);
    }
    Ok(buffer)
}

/// The fallback value for an unsupplied parameter, if the parameter allows
/// one.
pub(crate) fn default_argument(
    spec: &ParamSpec,
    ctx: &ExecutionContext<'_>,
) -> Option<TypedValue> {
    if let Some(default) = &spec.default {
        return Some(default.clone());
    }
    if spec.optional {
        return Some(ctx.types.default_of(&spec.ty).unwrap_or(TypedValue::Void));
    }
    None
}
