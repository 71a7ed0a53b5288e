//! Action invocation.

use tracing::{error, warn};

use super::registry::RegisteredAction;
use super::{ActionResult, Call, InvokeError, marshal};
use crate::bind::BindFailure;
use crate::context::ExecutionContext;
use crate::types::EntityId;
use crate::value::ValueSource;

/// Invokes one registered action against a resolved target entity.
///
/// The invocation short-circuits without calling the host when the target
/// is required but absent (`NoEntity`, which takes precedence over the
/// active check), when the action requires an active entity and the target
/// is inactive (`Inactive`), or when binding fails (`NoComponent`). Those
/// outcomes are recoverable: live game state simply did not cooperate this
/// run.
///
/// # Errors
///
/// Returns an `InvokeError` when an argument cannot be resolved or does not
/// convert to its declared parameter type. Such failures are fatal to this
/// invocation and are never retried.
pub fn invoke(
    registered: &RegisteredAction,
    target: Option<EntityId>,
    args: &[ValueSource],
    ctx: &mut ExecutionContext<'_>,
) -> Result<ActionResult, InvokeError> {
    let descriptor = &registered.descriptor;
    let binding = &registered.binding;

    if binding.requires_entity() && target.is_none() {
        error!(action = %descriptor.id, "no target entity resolved");
        return Ok(ActionResult::NoEntity);
    }

    if descriptor.requires_active
        && let Some(entity) = target
        && !ctx.world.is_active(entity)
    {
        warn!(action = %descriptor.id, %entity, "target entity is inactive");
        return Ok(ActionResult::Inactive);
    }

    let bound = match binding.bind(target, ctx.world) {
        Ok(bound) => bound,
        Err(BindFailure::NoEntity) => {
            error!(action = %descriptor.id, "target entity vanished during binding");
            return Ok(ActionResult::NoEntity);
        }
        Err(BindFailure::NoComponent(component_type)) => {
            error!(
                action = %descriptor.id,
                component = %component_type,
                "target entity lacks the required component"
            );
            return Ok(ActionResult::NoComponent(component_type));
        }
    };

    let buffer = marshal(
        &descriptor.name,
        &descriptor.params,
        binding.editable_from,
        args,
        ctx,
    )?;

    let value = (registered.callable)(Call {
        entity: bound.entity,
        component: bound.component,
        args: &buffer,
        ctx,
    });
    Ok(ActionResult::Success(value))
}
