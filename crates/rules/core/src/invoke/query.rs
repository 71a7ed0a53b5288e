//! Query invocation.
//!
//! Queries must always produce a usable value for condition evaluation, so
//! every failure path yields the query's declared default instead of an
//! error, logging exactly one warning.

use tracing::warn;

use super::registry::RegisteredQuery;
use super::{ArgBuffer, Call, default_argument};
use crate::context::ExecutionContext;
use crate::types::{EntityId, TypedValue};

/// Invokes one registered query against a resolved target entity.
///
/// Nested query dispatch carries no authored arguments, so designer-editable
/// parameters take their declared defaults. The host's return value is
/// converted to the declared return type; a host returning the wrong kind
/// degrades to the default as well.
pub fn invoke(
    registered: &RegisteredQuery,
    target: Option<EntityId>,
    ctx: &mut ExecutionContext<'_>,
) -> TypedValue {
    let descriptor = &registered.descriptor;
    let binding = &registered.binding;

    if binding.requires_entity() && target.is_none() {
        warn!(query = %descriptor.id, "no target entity resolved; using declared default");
        return descriptor.default.clone();
    }

    let bound = match binding.bind(target, ctx.world) {
        Ok(bound) => bound,
        Err(failure) => {
            warn!(query = %descriptor.id, %failure, "bind failed; using declared default");
            return descriptor.default.clone();
        }
    };

    let mut buffer = ArgBuffer::new();
    for spec in &descriptor.params[binding.editable_from..] {
        buffer.push(default_argument(spec, ctx).unwrap_or(TypedValue::Void));
    }

    let value = (registered.callable)(Call {
        entity: bound.entity,
        component: bound.component,
        args: &buffer,
        ctx: &mut *ctx,
    });

    match value.convert_to(&descriptor.return_type, ctx.types) {
        Ok(value) => value,
        Err(_) => {
            warn!(
                query = %descriptor.id,
                returned = %value.type_key(),
                expected = %descriptor.return_type,
                "return value has the wrong kind; using declared default"
            );
            descriptor.default.clone()
        }
    }
}
