//! Registry of host-registered actions and queries.
//!
//! The host registers each operation once at startup with an explicit
//! descriptor and a callable; the member binding is computed at that moment
//! and stored alongside. Registrations are immutable afterwards, so the
//! registry is safe to share by reference across evaluation runs.

use std::collections::HashMap;

use super::{Call, HostFn, MAX_PARAMS};
use crate::bind::{CallableShape, ConfigError, MemberBinding, ParamSpec, configure};
use crate::types::{ActionId, QueryId, TypeKey, TypeRegistry, TypedValue};

// ============================================================================
// Descriptors
// ============================================================================

/// Registration metadata of a host action.
#[derive(Clone, Debug)]
pub struct ActionDescriptor {
    pub id: ActionId,

    /// Human-readable name shown in authoring tools.
    pub name: String,
    pub description: String,

    pub shape: CallableShape,

    /// Declaring type for instance-shaped callables.
    pub declaring_type: Option<TypeKey>,

    /// Declared parameters, bound slots included.
    pub params: Vec<ParamSpec>,

    /// Short-circuit to `Inactive` when the target entity is inactive.
    pub requires_active: bool,
}

impl ActionDescriptor {
    pub fn new(id: impl Into<ActionId>, shape: CallableShape) -> Self {
        let id = id.into();
        Self {
            name: id.0.clone(),
            description: String::new(),
            id,
            shape,
            declaring_type: None,
            params: Vec::new(),
            requires_active: false,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_declaring_type(mut self, ty: TypeKey) -> Self {
        self.declaring_type = Some(ty);
        self
    }

    #[must_use]
    pub fn with_param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    #[must_use]
    pub fn requiring_active_entity(mut self) -> Self {
        self.requires_active = true;
        self
    }
}

/// Registration metadata of a host query.
#[derive(Clone, Debug)]
pub struct QueryDescriptor {
    pub id: QueryId,
    pub name: String,
    pub description: String,
    pub shape: CallableShape,
    pub declaring_type: Option<TypeKey>,
    pub params: Vec<ParamSpec>,

    /// Declared return type.
    pub return_type: TypeKey,

    /// Value supplied whenever resolution or binding fails; queries must
    /// always produce a usable value for condition evaluation.
    pub default: TypedValue,
}

impl QueryDescriptor {
    pub fn new(
        id: impl Into<QueryId>,
        shape: CallableShape,
        return_type: TypeKey,
        default: TypedValue,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.0.clone(),
            description: String::new(),
            id,
            shape,
            declaring_type: None,
            params: Vec::new(),
            return_type,
            default,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_declaring_type(mut self, ty: TypeKey) -> Self {
        self.declaring_type = Some(ty);
        self
    }

    #[must_use]
    pub fn with_param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }
}

// ============================================================================
// Registrations
// ============================================================================

/// An action with its binding and callable, immutable after registration.
pub struct RegisteredAction {
    pub descriptor: ActionDescriptor,
    pub binding: MemberBinding,
    pub(crate) callable: HostFn,
}

/// A query with its binding and callable, immutable after registration.
pub struct RegisteredQuery {
    pub descriptor: QueryDescriptor,
    pub binding: MemberBinding,
    pub(crate) callable: HostFn,
}

/// Catalog of registered actions and queries keyed by identity.
#[derive(Default)]
pub struct OperationRegistry {
    actions: HashMap<ActionId, RegisteredAction>,
    queries: HashMap<QueryId, RegisteredQuery>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an action, classifying its binding once.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` on duplicate identity or when the callable
    /// cannot be classified; the registration is rejected and the registry
    /// unchanged.
    pub fn register_action(
        &mut self,
        types: &TypeRegistry,
        descriptor: ActionDescriptor,
        callable: impl Fn(Call<'_, '_>) -> TypedValue + Send + Sync + 'static,
    ) -> Result<(), ConfigError> {
        if self.actions.contains_key(&descriptor.id) {
            return Err(ConfigError::DuplicateAction(descriptor.id));
        }
        if descriptor.params.len() > MAX_PARAMS {
            return Err(ConfigError::TooManyParameters {
                name: descriptor.name.clone(),
                count: descriptor.params.len(),
            });
        }
        let binding = configure(
            types,
            &descriptor.name,
            descriptor.shape,
            descriptor.declaring_type.as_ref(),
            &descriptor.params,
            true,
        )?;
        self.actions.insert(
            descriptor.id.clone(),
            RegisteredAction {
                descriptor,
                binding,
                callable: Box::new(callable),
            },
        );
        Ok(())
    }

    /// Registers a query, classifying its binding once.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::register_action`].
    pub fn register_query(
        &mut self,
        types: &TypeRegistry,
        descriptor: QueryDescriptor,
        callable: impl Fn(Call<'_, '_>) -> TypedValue + Send + Sync + 'static,
    ) -> Result<(), ConfigError> {
        if self.queries.contains_key(&descriptor.id) {
            return Err(ConfigError::DuplicateQuery(descriptor.id));
        }
        if descriptor.params.len() > MAX_PARAMS {
            return Err(ConfigError::TooManyParameters {
                name: descriptor.name.clone(),
                count: descriptor.params.len(),
            });
        }
        let binding = configure(
            types,
            &descriptor.name,
            descriptor.shape,
            descriptor.declaring_type.as_ref(),
            &descriptor.params,
            true,
        )?;
        self.queries.insert(
            descriptor.id.clone(),
            RegisteredQuery {
                descriptor,
                binding,
                callable: Box::new(callable),
            },
        );
        Ok(())
    }

    pub fn action(&self, id: &ActionId) -> Option<&RegisteredAction> {
        self.actions.get(id)
    }

    pub fn query(&self, id: &QueryId) -> Option<&RegisteredQuery> {
        self.queries.get(id)
    }

    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    pub fn query_count(&self) -> usize {
        self.queries.len()
    }

    pub fn action_ids(&self) -> impl Iterator<Item = &ActionId> {
        self.actions.keys()
    }

    pub fn query_ids(&self) -> impl Iterator<Item = &QueryId> {
        self.queries.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeKey;

    #[test]
    fn duplicate_action_registration_fails() {
        let types = TypeRegistry::with_builtins();
        let mut ops = OperationRegistry::new();

        let descriptor = ActionDescriptor::new("wait", CallableShape::FreeFunction);
        ops.register_action(&types, descriptor.clone(), |_| TypedValue::Void)
            .unwrap();

        let result = ops.register_action(&types, descriptor, |_| TypedValue::Void);
        assert_eq!(
            result.unwrap_err(),
            ConfigError::DuplicateAction(ActionId::from("wait"))
        );
        assert_eq!(ops.action_count(), 1);
    }

    #[test]
    fn misconfigured_registration_is_rejected() {
        let types = TypeRegistry::with_builtins();
        let mut ops = OperationRegistry::new();

        // Instance query on a declaring type that is neither entity- nor
        // component-capable.
        let descriptor = QueryDescriptor::new(
            "broken",
            CallableShape::Instance,
            TypeKey::Int,
            TypedValue::Int(0),
        )
        .with_declaring_type(TypeKey::Bool);
        let result = ops.register_query(&types, descriptor, |_| TypedValue::Int(0));
        assert!(result.is_err());
        assert_eq!(ops.query_count(), 0);
    }
}
