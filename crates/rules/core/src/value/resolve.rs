//! Value source resolution.

use tracing::error;

use super::{ValueError, ValueSource};
use crate::context::ExecutionContext;
use crate::invoke::query;
use crate::types::TypedValue;

/// Resolves a value source to a concrete typed value.
///
/// Resolution never mutates the source and is idempotent within one
/// evaluation run, but argument, register, and query results may
/// legitimately differ between two runs.
///
/// A query source resolves its scope to at most one entity: a multi-target
/// scope is collapsed to the first ready result, mirroring the scope's own
/// `use_first` collapse; the content pipeline rejects such scopes at load
/// time. A missing entity or component inside the query yields the query's
/// declared default, never an error.
///
/// # Errors
///
/// Returns a `ValueError` for data-integrity failures: argument mode with no
/// active trigger argument, an argument that does not convert to the
/// trigger's declared parameter type, or a query id that was never
/// registered.
pub fn resolve(
    source: &ValueSource,
    ctx: &mut ExecutionContext<'_>,
) -> Result<TypedValue, ValueError> {
    match source {
        ValueSource::Literal(value) => Ok(value.clone()),

        ValueSource::Argument => {
            let trigger = ctx.trigger.as_ref().ok_or(ValueError::MissingArgument)?;
            let argument = trigger
                .argument
                .clone()
                .ok_or(ValueError::MissingArgument)?;
            match &trigger.param_type {
                Some(param_type) => {
                    let converted = argument.convert_to(param_type, ctx.types)?;
                    Ok(converted)
                }
                None => Ok(argument),
            }
        }

        ValueSource::Register(register) => Ok(ctx.registers.get(*register).clone()),

        ValueSource::Query { scope, query } => {
            let ops = ctx.ops;
            let Some(registered) = ops.query(query) else {
                error!(%query, "value source references an unregistered query");
                return Err(ValueError::UnknownQuery(query.clone()));
            };
            let target = scope.resolve(ctx).next();
            Ok(query::invoke(registered, target, ctx))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{RegisterIndex, TriggerContext};
    use crate::env::mock::MockWorld;
    use crate::invoke::OperationRegistry;
    use crate::types::{TriggerId, TypeKey, TypeRegistry};

    #[test]
    fn literal_passes_through() {
        let types = TypeRegistry::with_builtins();
        let ops = OperationRegistry::new();
        let world = MockWorld::new();
        let hero = world.spawn("Hero", "hero");
        let mut ctx = ExecutionContext::new(hero, &types, &world, &ops);

        let source = ValueSource::literal(9);
        assert_eq!(resolve(&source, &mut ctx).unwrap(), TypedValue::Int(9));
        // Idempotent given a stable context.
        assert_eq!(resolve(&source, &mut ctx).unwrap(), TypedValue::Int(9));
    }

    #[test]
    fn argument_requires_an_active_trigger_argument() {
        let types = TypeRegistry::with_builtins();
        let ops = OperationRegistry::new();
        let world = MockWorld::new();
        let hero = world.spawn("Hero", "hero");

        let mut bare = ExecutionContext::new(hero, &types, &world, &ops);
        assert!(matches!(
            resolve(&ValueSource::Argument, &mut bare),
            Err(ValueError::MissingArgument)
        ));

        let mut armed = ExecutionContext::new(hero, &types, &world, &ops).with_trigger(
            TriggerContext::new(TriggerId(2)).with_argument(TypeKey::Float, TypedValue::Int(4)),
        );
        // Converted to the trigger's declared parameter type.
        assert_eq!(
            resolve(&ValueSource::Argument, &mut armed).unwrap(),
            TypedValue::Float(4.0)
        );
    }

    #[test]
    fn register_reads_current_content_without_narrowing() {
        let types = TypeRegistry::with_builtins();
        let ops = OperationRegistry::new();
        let world = MockWorld::new();
        let hero = world.spawn("Hero", "hero");
        let mut ctx = ExecutionContext::new(hero, &types, &world, &ops);

        let source = ValueSource::Register(RegisterIndex::R5);
        assert_eq!(resolve(&source, &mut ctx).unwrap(), TypedValue::Void);

        ctx.registers
            .set(RegisterIndex::R5, TypedValue::Str("cache".into()));
        assert_eq!(
            resolve(&source, &mut ctx).unwrap(),
            TypedValue::Str("cache".into())
        );
    }

    #[test]
    fn unknown_query_is_surfaced() {
        let types = TypeRegistry::with_builtins();
        let ops = OperationRegistry::new();
        let world = MockWorld::new();
        let hero = world.spawn("Hero", "hero");
        let mut ctx = ExecutionContext::new(hero, &types, &world, &ops);

        let source = ValueSource::query(crate::scope::EntityScope::self_entity(), "missing");
        assert!(matches!(
            resolve(&source, &mut ctx),
            Err(ValueError::UnknownQuery(_))
        ));
    }
}
