//! Registration-time classification of host callables.

use super::{BindingTarget, CallableShape, ConfigError, MemberBinding, ParamSpec};
use crate::types::{TypeKey, TypeRegistry};

/// What role a declared parameter type can play in a binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Capability {
    Entity,
    Component,
    Context,
    Plain,
}

fn capability(types: &TypeRegistry, key: &TypeKey) -> Capability {
    if *key == TypeKey::Context {
        return Capability::Context;
    }
    match types.lookup(key) {
        Ok(descriptor) if descriptor.is_entity() => Capability::Entity,
        Ok(descriptor) if descriptor.is_component() => Capability::Component,
        _ => Capability::Plain,
    }
}

/// Classifies a host callable into an immutable [`MemberBinding`].
///
/// Runs once at registration time. `declaring_type` is the type an instance
/// method is declared on (ignored for the other shapes). With
/// `allow_unbound_trailing` false, every declared parameter must be bound,
/// so a callable with designer-editable parameters is rejected.
///
/// # Errors
///
/// Returns a `ConfigError` when the callable cannot be classified: an
/// extension callable whose first parameter is neither entity- nor
/// component-capable, an instance callable on a declaring type that is
/// neither, or unbound trailing parameters when disallowed.
pub fn configure(
    types: &TypeRegistry,
    name: &str,
    shape: CallableShape,
    declaring_type: Option<&TypeKey>,
    params: &[ParamSpec],
    allow_unbound_trailing: bool,
) -> Result<MemberBinding, ConfigError> {
    let (target, bound): (BindingTarget, usize) = match shape {
        CallableShape::FreeFunction => {
            match params.first().map(|param| capability(types, &param.ty)) {
                Some(Capability::Context) => (BindingTarget::Context, 1),
                _ => (BindingTarget::None, 0),
            }
        }
        CallableShape::Extension => {
            let first = params
                .first()
                .ok_or_else(|| ConfigError::MissingTargetParameter {
                    name: name.to_owned(),
                })?;
            let target = match capability(types, &first.ty) {
                Capability::Entity => BindingTarget::Entity,
                Capability::Component => BindingTarget::Component(first.ty.clone()),
                _ => {
                    return Err(ConfigError::UnboundFirstParameter {
                        name: name.to_owned(),
                        ty: first.ty.clone(),
                    });
                }
            };
            match params.get(1).map(|param| capability(types, &param.ty)) {
                Some(Capability::Context) => (target, 2),
                _ => (target, 1),
            }
        }
        CallableShape::Instance => {
            let declaring = declaring_type.ok_or_else(|| ConfigError::InvalidDeclaringType {
                name: name.to_owned(),
                ty: None,
            })?;
            let target = match capability(types, declaring) {
                Capability::Entity => BindingTarget::Entity,
                Capability::Component => BindingTarget::Component(declaring.clone()),
                _ => {
                    return Err(ConfigError::InvalidDeclaringType {
                        name: name.to_owned(),
                        ty: Some(declaring.clone()),
                    });
                }
            };
            match params.first().map(|param| capability(types, &param.ty)) {
                Some(Capability::Context) => (target, 1),
                _ => (target, 0),
            }
        }
    };

    let binds_context = matches!(target, BindingTarget::Context)
        || params
            .get(bound.saturating_sub(1))
            .is_some_and(|param| capability(types, &param.ty) == Capability::Context);

    if !allow_unbound_trailing && bound < params.len() {
        return Err(ConfigError::UnboundTrailingParameters {
            name: name.to_owned(),
            index: bound,
        });
    }

    Ok(MemberBinding {
        shape,
        target,
        binds_context,
        editable_from: bound,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TypeDescriptor, TypeFlags, TypedValue};

    fn registry_with_health() -> TypeRegistry {
        let mut types = TypeRegistry::with_builtins();
        types
            .register(
                TypeDescriptor::new(
                    TypeKey::host("Health"),
                    "Health",
                    TypedValue::Component(crate::types::ComponentHandle::NONE),
                )
                .with_flags(TypeFlags::IS_COMPONENT),
            )
            .unwrap();
        types
    }

    #[test]
    fn free_function_binds_leading_context() {
        let types = registry_with_health();
        let params = [
            ParamSpec::new("ctx", TypeKey::Context),
            ParamSpec::new("message", TypeKey::Str),
        ];
        let binding = configure(
            &types,
            "log_message",
            CallableShape::FreeFunction,
            None,
            &params,
            true,
        )
        .unwrap();
        assert_eq!(binding.target, BindingTarget::Context);
        assert!(binding.binds_context);
        assert_eq!(binding.editable_from, 1);
    }

    #[test]
    fn extension_binds_entity_then_context() {
        let types = registry_with_health();
        let params = [
            ParamSpec::new("target", TypeKey::Entity),
            ParamSpec::new("ctx", TypeKey::Context),
            ParamSpec::new("amount", TypeKey::Int),
        ];
        let binding = configure(
            &types,
            "deal_damage",
            CallableShape::Extension,
            None,
            &params,
            true,
        )
        .unwrap();
        assert_eq!(binding.target, BindingTarget::Entity);
        assert!(binding.binds_context);
        assert_eq!(binding.editable_from, 2);
    }

    #[test]
    fn extension_binds_component_target() {
        let types = registry_with_health();
        let params = [ParamSpec::new("health", TypeKey::host("Health"))];
        let binding = configure(
            &types,
            "health_of",
            CallableShape::Extension,
            None,
            &params,
            true,
        )
        .unwrap();
        assert_eq!(binding.target, BindingTarget::Component(TypeKey::host("Health")));
        assert!(!binding.binds_context);
        assert_eq!(binding.editable_from, 1);
    }

    #[test]
    fn extension_rejects_plain_first_parameter() {
        let types = registry_with_health();
        let params = [ParamSpec::new("amount", TypeKey::Int)];
        let result = configure(
            &types,
            "broken",
            CallableShape::Extension,
            None,
            &params,
            true,
        );
        assert_eq!(
            result.unwrap_err(),
            ConfigError::UnboundFirstParameter {
                name: "broken".into(),
                ty: TypeKey::Int
            }
        );
    }

    #[test]
    fn instance_requires_capable_declaring_type() {
        let types = registry_with_health();

        let ok = configure(
            &types,
            "regenerate",
            CallableShape::Instance,
            Some(&TypeKey::host("Health")),
            &[],
            true,
        )
        .unwrap();
        assert_eq!(ok.target, BindingTarget::Component(TypeKey::host("Health")));

        let err = configure(
            &types,
            "regenerate",
            CallableShape::Instance,
            Some(&TypeKey::Str),
            &[],
            true,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidDeclaringType {
                name: "regenerate".into(),
                ty: Some(TypeKey::Str)
            }
        );
    }

    #[test]
    fn unbound_trailing_parameters_rejected_when_disallowed() {
        let types = registry_with_health();
        let params = [
            ParamSpec::new("target", TypeKey::Entity),
            ParamSpec::new("amount", TypeKey::Int),
        ];
        let result = configure(
            &types,
            "strict",
            CallableShape::Extension,
            None,
            &params,
            false,
        );
        assert_eq!(
            result.unwrap_err(),
            ConfigError::UnboundTrailingParameters {
                name: "strict".into(),
                index: 1
            }
        );
    }
}
