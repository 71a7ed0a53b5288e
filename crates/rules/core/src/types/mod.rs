//! Value type catalog shared by every layer of the engine.
//!
//! A [`TypeRegistry`] holds one [`TypeDescriptor`] per distinguishable value
//! kind: identity, default value, flags, allowed conversions, and the set of
//! comparison operators the kind supports. Descriptors are registered once at
//! startup and immutable afterwards; previously-unseen enum types are
//! synthesized lazily on first lookup.
//!
//! # Module Structure
//!
//! - `handles`: newtype identifiers (entities, components, groups, triggers,
//!   actions, queries)
//! - `value`: the [`TypedValue`] closed union and conversion functions
//! - `registry`: the [`TypeRegistry`] with parent delegation and lazy enum
//!   synthesis

mod handles;
mod registry;
mod value;

pub use handles::{ActionId, ComponentHandle, EntityId, GroupId, QueryId, TriggerId};
pub use registry::TypeRegistry;
pub use value::{Color, TypedValue, Vec2, Vec3, Vec4};

use std::fmt;

use crate::compare::CompareCaps;
use crate::error::{ErrorSeverity, RuleError};

// ============================================================================
// Type Identity
// ============================================================================

/// Stable identity of a value type.
///
/// The builtin kinds form a closed set; host-defined enum and opaque types
/// use the open `Enum`/`Host` variants keyed by name.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeKey {
    Void,
    Any,
    Int,
    Float,
    Bool,
    Str,
    Color,
    Vec2,
    Vec3,
    Vec4,
    Entity,
    Component,
    Group,
    Trigger,
    /// Marker type for the execution-context parameter slot.
    Context,
    /// Shared base type all enum types derive from.
    EnumBase,
    /// A host enum type, keyed by its registered name.
    Enum(String),
    /// An opaque host type (e.g. a concrete component type), keyed by name.
    Host(String),
}

impl TypeKey {
    /// Creates the key for a host enum type.
    pub fn enum_type(name: impl Into<String>) -> Self {
        Self::Enum(name.into())
    }

    /// Creates the key for an opaque host type.
    pub fn host(name: impl Into<String>) -> Self {
        Self::Host(name.into())
    }

    /// Returns true if this identity denotes an enum type (shared base
    /// included).
    #[inline]
    pub fn denotes_enum(&self) -> bool {
        matches!(self, Self::Enum(_) | Self::EnumBase)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => f.write_str("void"),
            Self::Any => f.write_str("any"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Bool => f.write_str("bool"),
            Self::Str => f.write_str("string"),
            Self::Color => f.write_str("color"),
            Self::Vec2 => f.write_str("vec2"),
            Self::Vec3 => f.write_str("vec3"),
            Self::Vec4 => f.write_str("vec4"),
            Self::Entity => f.write_str("entity"),
            Self::Component => f.write_str("component"),
            Self::Group => f.write_str("group"),
            Self::Trigger => f.write_str("trigger"),
            Self::Context => f.write_str("context"),
            Self::EnumBase => f.write_str("enum"),
            Self::Enum(name) => write!(f, "enum:{name}"),
            Self::Host(name) => write!(f, "host:{name}"),
        }
    }
}

// ============================================================================
// Type Metadata
// ============================================================================

bitflags::bitflags! {
    /// Behavioral flags attached to a [`TypeDescriptor`].
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct TypeFlags: u8 {
        /// The type is an enum instance type.
        const IS_ENUM = 1 << 0;
        /// The type is a flags-style (bitmask) enum.
        const IS_FLAGS_ENUM = 1 << 1;
        /// Values of this type are entity handles.
        const IS_ENTITY = 1 << 2;
        /// Values of this type are component handles.
        const IS_COMPONENT = 1 << 3;
        /// The type converts to every registered type without checking.
        const SKIP_CONVERSION_CHECK = 1 << 4;
    }
}

/// Metadata describing one distinguishable value kind.
///
/// Registered once at startup and immutable thereafter; the registry hands
/// out shared references.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeDescriptor {
    /// Stable identity.
    pub key: TypeKey,

    /// Human-readable name shown in authoring tools and diagnostics.
    pub name: String,

    /// Value a fresh instance of this type starts with.
    pub default: TypedValue,

    pub flags: TypeFlags,

    /// Base type this type derives from (enums point at [`TypeKey::EnumBase`]).
    pub base: Option<TypeKey>,

    /// Explicitly allowed conversion targets, in registration order.
    pub converts_to: Vec<TypeKey>,

    /// Comparison operators values of this type support.
    pub operators: CompareCaps,
}

impl TypeDescriptor {
    /// Creates a descriptor with no flags, no base, and no conversions.
    pub fn new(key: TypeKey, name: impl Into<String>, default: TypedValue) -> Self {
        Self {
            key,
            name: name.into(),
            default,
            flags: TypeFlags::empty(),
            base: None,
            converts_to: Vec::new(),
            operators: CompareCaps::empty(),
        }
    }

    #[must_use]
    pub fn with_flags(mut self, flags: TypeFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn with_base(mut self, base: TypeKey) -> Self {
        self.base = Some(base);
        self
    }

    #[must_use]
    pub fn with_conversion(mut self, to: TypeKey) -> Self {
        self.converts_to.push(to);
        self
    }

    #[must_use]
    pub fn with_operators(mut self, operators: CompareCaps) -> Self {
        self.operators = operators;
        self
    }

    /// Returns true if values of this type are entity handles.
    #[inline]
    pub fn is_entity(&self) -> bool {
        self.flags.contains(TypeFlags::IS_ENTITY)
    }

    /// Returns true if values of this type are component handles.
    #[inline]
    pub fn is_component(&self) -> bool {
        self.flags.contains(TypeFlags::IS_COMPONENT)
    }

    /// Returns true if this type is an enum instance type.
    #[inline]
    pub fn is_enum(&self) -> bool {
        self.flags.contains(TypeFlags::IS_ENUM)
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors raised by the type registry and value conversion.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    /// The requested identity is not registered anywhere in the chain.
    #[error("type {0} is not registered")]
    NotFound(TypeKey),

    /// A descriptor with this identity already exists.
    #[error("type {0} is already registered")]
    Duplicate(TypeKey),

    /// The requested conversion is not permitted by the registry.
    #[error("no conversion from {from} to {to}")]
    InvalidConversion { from: TypeKey, to: TypeKey },
}

impl RuleError for TypeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotFound(_) => ErrorSeverity::Validation,
            Self::Duplicate(_) => ErrorSeverity::Fatal,
            Self::InvalidConversion { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "TYPE_NOT_FOUND",
            Self::Duplicate(_) => "TYPE_DUPLICATE",
            Self::InvalidConversion { .. } => "TYPE_INVALID_CONVERSION",
        }
    }
}
