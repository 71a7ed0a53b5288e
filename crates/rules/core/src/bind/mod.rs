//! Member binding for host-registered callables.
//!
//! A [`MemberBinding`] is computed once when an action or query is
//! registered and is immutable afterwards: it records what feeds the
//! implicit target slot (nothing, the entity, a component of the entity, or
//! the execution context), whether a context parameter is bound, and where
//! designer-editable parameters begin in the declared parameter list. At
//! invocation time the binding fills the target slots from a live entity;
//! designer-editable slots are filled separately from resolved value
//! sources.

mod configure;

pub use configure::configure;

use crate::env::EntityOracle;
use crate::error::{ErrorSeverity, RuleError};
use crate::types::{ComponentHandle, EntityId, TypeKey, TypedValue};

// ============================================================================
// Parameter Metadata
// ============================================================================

/// Declared shape and authoring metadata of one callable parameter.
#[derive(Clone, Debug)]
pub struct ParamSpec {
    pub name: String,
    pub ty: TypeKey,

    /// Description shown in authoring tools.
    pub description: String,

    /// An optional parameter falls back to its default when unset.
    pub optional: bool,

    /// Authored default; the type's registry default applies when absent.
    pub default: Option<TypedValue>,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, ty: TypeKey) -> Self {
        Self {
            name: name.into(),
            ty,
            description: String::new(),
            optional: false,
            default: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    #[must_use]
    pub fn with_default(mut self, default: TypedValue) -> Self {
        self.default = Some(default);
        self
    }
}

// ============================================================================
// Binding Classification
// ============================================================================

/// How the underlying host callable is shaped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallableShape {
    /// A free function; nothing implicit beyond an optional context param.
    FreeFunction,

    /// A free function whose first parameter is the target entity or one of
    /// its components.
    Extension,

    /// A method on an entity- or component-capable declaring type.
    Instance,
}

/// What feeds the implicit target slot of a bound callable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BindingTarget {
    /// No implicit target.
    None,

    /// The resolved entity.
    Entity,

    /// The entity's component of this type.
    Component(TypeKey),

    /// The execution context.
    Context,
}

/// Immutable binding record computed at registration time.
#[derive(Clone, Debug)]
pub struct MemberBinding {
    pub shape: CallableShape,
    pub target: BindingTarget,

    /// A context parameter is bound in addition to the target.
    pub binds_context: bool,

    /// Index in the declared parameter list where designer-editable
    /// parameters begin.
    pub editable_from: usize,
}

impl MemberBinding {
    /// Returns true if invocation needs a resolved target entity.
    #[inline]
    pub fn requires_entity(&self) -> bool {
        matches!(
            self.target,
            BindingTarget::Entity | BindingTarget::Component(_)
        )
    }
}

/// The filled target slots handed to a host callable.
#[derive(Clone, Copy, Debug)]
pub struct BoundTarget {
    pub entity: Option<EntityId>,
    pub component: Option<ComponentHandle>,
}

/// Why a binding could not be filled from the live entity.
///
/// Distinguishes "no entity" from "no component" so action invocation can
/// report the right failure kind.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BindFailure {
    #[error("no target entity")]
    NoEntity,

    #[error("target entity has no {0} component")]
    NoComponent(TypeKey),
}

impl MemberBinding {
    /// Fills the target slots from a live entity.
    ///
    /// Free-function and context bindings always succeed; entity bindings
    /// need the entity present; component bindings additionally need the
    /// entity to expose a component of the bound type.
    pub fn bind(
        &self,
        entity: Option<EntityId>,
        world: &dyn EntityOracle,
    ) -> Result<BoundTarget, BindFailure> {
        match &self.target {
            BindingTarget::None | BindingTarget::Context => Ok(BoundTarget {
                entity,
                component: None,
            }),
            BindingTarget::Entity => {
                let entity = entity.ok_or(BindFailure::NoEntity)?;
                Ok(BoundTarget {
                    entity: Some(entity),
                    component: None,
                })
            }
            BindingTarget::Component(component_type) => {
                let entity = entity.ok_or(BindFailure::NoEntity)?;
                let component = world
                    .component(entity, component_type)
                    .ok_or_else(|| BindFailure::NoComponent(component_type.clone()))?;
                Ok(BoundTarget {
                    entity: Some(entity),
                    component: Some(component),
                })
            }
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Malformed host registration, detected once at load time.
///
/// Fatal to the registration: the host should abort startup or skip the
/// member with a loud diagnostic.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("action `{0}` is already registered")]
    DuplicateAction(crate::types::ActionId),

    #[error("query `{0}` is already registered")]
    DuplicateQuery(crate::types::QueryId),

    #[error("extension callable `{name}` declares no parameters to bind a target from")]
    MissingTargetParameter { name: String },

    #[error(
        "extension callable `{name}` must take an entity or component as its first parameter, got {ty}"
    )]
    UnboundFirstParameter { name: String, ty: TypeKey },

    #[error("instance callable `{name}` must be declared on an entity or component type")]
    InvalidDeclaringType {
        name: String,
        ty: Option<TypeKey>,
    },

    #[error(
        "callable `{name}` leaves parameters unbound from index {index} but unbound trailing parameters are disallowed"
    )]
    UnboundTrailingParameters { name: String, index: usize },

    #[error("callable `{name}` declares {count} parameters, more than the supported maximum")]
    TooManyParameters { name: String, count: usize },
}

impl RuleError for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateAction(_) => "CONFIG_DUPLICATE_ACTION",
            Self::DuplicateQuery(_) => "CONFIG_DUPLICATE_QUERY",
            Self::MissingTargetParameter { .. } => "CONFIG_MISSING_TARGET_PARAMETER",
            Self::UnboundFirstParameter { .. } => "CONFIG_UNBOUND_FIRST_PARAMETER",
            Self::InvalidDeclaringType { .. } => "CONFIG_INVALID_DECLARING_TYPE",
            Self::UnboundTrailingParameters { .. } => "CONFIG_UNBOUND_TRAILING_PARAMETERS",
            Self::TooManyParameters { .. } => "CONFIG_TOO_MANY_PARAMETERS",
        }
    }
}
