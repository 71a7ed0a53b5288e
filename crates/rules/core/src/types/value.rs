//! The closed value union and its conversion rules.

use std::fmt;

use super::{ComponentHandle, EntityId, GroupId, TriggerId, TypeError, TypeKey};
use crate::types::TypeRegistry;

// ============================================================================
// Small Value Types
// ============================================================================

/// RGBA color with 8-bit channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new(0, 0, 0, 255)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl Vec4 {
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl fmt::Display for Vec4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x, self.y, self.z, self.w)
    }
}

// ============================================================================
// Typed Value
// ============================================================================

/// A concrete value of one of the registered kinds.
///
/// This is a closed tagged union: every kind the engine can carry appears
/// here, and conversion between kinds goes through [`TypedValue::convert_to`]
/// under the registry's conversion rules. There is no boxed/erased escape
/// hatch; opaque host data travels as handles.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypedValue {
    Void,
    Int(i32),
    Float(f32),
    Bool(bool),
    Str(String),
    Color(Color),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    /// Instance of a host enum type.
    Enum { key: TypeKey, value: i32 },
    Entity(EntityId),
    Component(ComponentHandle),
    Group(GroupId),
    Trigger(TriggerId),
}

impl TypedValue {
    /// Returns the type identity of this value's kind.
    ///
    /// Register contents are statically typed "any", but a live value always
    /// has a concrete kind; this is that kind.
    pub fn type_key(&self) -> TypeKey {
        match self {
            Self::Void => TypeKey::Void,
            Self::Int(_) => TypeKey::Int,
            Self::Float(_) => TypeKey::Float,
            Self::Bool(_) => TypeKey::Bool,
            Self::Str(_) => TypeKey::Str,
            Self::Color(_) => TypeKey::Color,
            Self::Vec2(_) => TypeKey::Vec2,
            Self::Vec3(_) => TypeKey::Vec3,
            Self::Vec4(_) => TypeKey::Vec4,
            Self::Enum { key, .. } => key.clone(),
            Self::Entity(_) => TypeKey::Entity,
            Self::Component(_) => TypeKey::Component,
            Self::Group(_) => TypeKey::Group,
            Self::Trigger(_) => TypeKey::Trigger,
        }
    }

    /// Returns the entity handle if this value carries one.
    pub fn as_entity(&self) -> Option<EntityId> {
        match self {
            Self::Entity(id) if !id.is_none() => Some(*id),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }

    /// Converts this value to the given target type under the registry's
    /// conversion rules.
    ///
    /// Identity and widening to `any` are free. Representation changes are
    /// implemented for the seeded conversions (int to float, enum to int,
    /// enum to enum, anything to string); other registry-permitted pairs
    /// keep their representation and are reinterpreted by the host.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidConversion` if the registry does not permit
    /// the conversion.
    pub fn convert_to(&self, to: &TypeKey, types: &TypeRegistry) -> Result<TypedValue, TypeError> {
        let from = self.type_key();
        if from == *to || *to == TypeKey::Any {
            return Ok(self.clone());
        }
        if !types.can_convert(&from, to) {
            return Err(TypeError::InvalidConversion {
                from,
                to: to.clone(),
            });
        }
        Ok(match (self, to) {
            (Self::Int(value), TypeKey::Float) => Self::Float(*value as f32),
            (Self::Enum { value, .. }, TypeKey::Int) => Self::Int(*value),
            (Self::Enum { value, .. }, TypeKey::Enum(_) | TypeKey::EnumBase) => Self::Enum {
                key: to.clone(),
                value: *value,
            },
            (value, TypeKey::Str) => Self::Str(value.to_string()),
            // Permitted by an explicit conversion entry; representation is
            // preserved and the receiving host callable reinterprets it.
            (value, _) => value.clone(),
        })
    }
}

impl Default for TypedValue {
    fn default() -> Self {
        Self::Void
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => Ok(()),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Str(value) => f.write_str(value),
            Self::Color(value) => write!(f, "{value}"),
            Self::Vec2(value) => write!(f, "{value}"),
            Self::Vec3(value) => write!(f, "{value}"),
            Self::Vec4(value) => write!(f, "{value}"),
            Self::Enum { value, .. } => write!(f, "{value}"),
            Self::Entity(id) => write!(f, "{id}"),
            Self::Component(handle) => write!(f, "{handle}"),
            Self::Group(id) => write!(f, "{id}"),
            Self::Trigger(id) => write!(f, "{id}"),
        }
    }
}

impl From<i32> for TypedValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<f32> for TypedValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for TypedValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for TypedValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<EntityId> for TypedValue {
    fn from(id: EntityId) -> Self {
        Self::Entity(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_key_matches_variant() {
        assert_eq!(TypedValue::Int(3).type_key(), TypeKey::Int);
        assert_eq!(
            TypedValue::Enum {
                key: TypeKey::enum_type("DamageKind"),
                value: 2
            }
            .type_key(),
            TypeKey::enum_type("DamageKind")
        );
    }

    #[test]
    fn display_is_string_conversion_form() {
        assert_eq!(TypedValue::Int(7).to_string(), "7");
        assert_eq!(TypedValue::Str("axe".into()).to_string(), "axe");
        assert_eq!(TypedValue::Void.to_string(), "");
        assert_eq!(
            TypedValue::Color(Color::new(255, 0, 0, 255)).to_string(),
            "#ff0000ff"
        );
    }
}
