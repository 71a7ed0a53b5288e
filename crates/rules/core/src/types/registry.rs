//! Registry of known value types.
//!
//! Built once at startup, then shared by reference for the lifetime of the
//! process. Lookups fall back to parent registries in registration order, so
//! a game module can layer its own types over an engine-supplied base set.
//! The only post-initialization mutation is the synthesized-enum cache, kept
//! behind a lock and invisible to callers.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::value::{Color, Vec2, Vec3, Vec4};
use super::{
    ComponentHandle, EntityId, GroupId, TriggerId, TypeDescriptor, TypeError, TypeFlags, TypeKey,
    TypedValue,
};
use crate::compare::CompareCaps;

/// Catalog of [`TypeDescriptor`]s keyed by type identity.
pub struct TypeRegistry {
    table: HashMap<TypeKey, Arc<TypeDescriptor>>,
    parents: Vec<Arc<TypeRegistry>>,
    /// Enum descriptors synthesized on first lookup.
    synthesized: RwLock<HashMap<TypeKey, Arc<TypeDescriptor>>>,
}

impl TypeRegistry {
    /// Creates an empty registry with no builtins.
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
            parents: Vec::new(),
            synthesized: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a registry seeded with the builtin type set.
    ///
    /// Numeric types carry the six ordering operators; bool, string, vector,
    /// entity, group, and trigger types carry equality; string additionally
    /// carries the text predicates. Int to float and enum to int conversions
    /// are registered explicitly.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        let builtins = [
            TypeDescriptor::new(TypeKey::Void, "Void", TypedValue::Void),
            TypeDescriptor::new(TypeKey::Any, "Any", TypedValue::Void)
                .with_flags(TypeFlags::SKIP_CONVERSION_CHECK)
                .with_operators(CompareCaps::all()),
            TypeDescriptor::new(TypeKey::Int, "Int", TypedValue::Int(0))
                .with_conversion(TypeKey::Float)
                .with_operators(CompareCaps::EQUALITY | CompareCaps::ORDERING | CompareCaps::TRUTH),
            TypeDescriptor::new(TypeKey::Float, "Float", TypedValue::Float(0.0))
                .with_operators(CompareCaps::EQUALITY | CompareCaps::ORDERING | CompareCaps::TRUTH),
            TypeDescriptor::new(TypeKey::Bool, "Bool", TypedValue::Bool(false))
                .with_operators(CompareCaps::EQUALITY | CompareCaps::TRUTH),
            TypeDescriptor::new(TypeKey::Str, "String", TypedValue::Str(String::new()))
                .with_operators(CompareCaps::EQUALITY | CompareCaps::TEXT | CompareCaps::TRUTH),
            TypeDescriptor::new(TypeKey::Color, "Color", TypedValue::Color(Color::default()))
                .with_operators(CompareCaps::EQUALITY),
            TypeDescriptor::new(TypeKey::Vec2, "Vector2", TypedValue::Vec2(Vec2::default()))
                .with_operators(CompareCaps::EQUALITY),
            TypeDescriptor::new(TypeKey::Vec3, "Vector3", TypedValue::Vec3(Vec3::default()))
                .with_operators(CompareCaps::EQUALITY),
            TypeDescriptor::new(TypeKey::Vec4, "Vector4", TypedValue::Vec4(Vec4::default()))
                .with_operators(CompareCaps::EQUALITY),
            TypeDescriptor::new(TypeKey::Entity, "Entity", TypedValue::Entity(EntityId::NONE))
                .with_flags(TypeFlags::IS_ENTITY)
                .with_operators(CompareCaps::EQUALITY),
            TypeDescriptor::new(
                TypeKey::Component,
                "Component",
                TypedValue::Component(ComponentHandle::NONE),
            )
            .with_flags(TypeFlags::IS_COMPONENT)
            .with_operators(CompareCaps::EQUALITY),
            TypeDescriptor::new(TypeKey::Group, "Group", TypedValue::Group(GroupId(0)))
                .with_operators(CompareCaps::EQUALITY),
            TypeDescriptor::new(
                TypeKey::Trigger,
                "Trigger",
                TypedValue::Trigger(TriggerId(0)),
            )
            .with_operators(CompareCaps::EQUALITY),
            TypeDescriptor::new(TypeKey::Context, "Context", TypedValue::Void),
            TypeDescriptor::new(
                TypeKey::EnumBase,
                "Enum",
                TypedValue::Enum {
                    key: TypeKey::EnumBase,
                    value: 0,
                },
            )
            .with_flags(TypeFlags::IS_ENUM)
            .with_conversion(TypeKey::Int)
            .with_operators(CompareCaps::EQUALITY | CompareCaps::ORDERING),
        ];

        for descriptor in builtins {
            registry
                .register(descriptor)
                .expect("builtin type registered twice");
        }
        registry
    }

    /// Inserts a descriptor keyed by its identity.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::Duplicate` if a descriptor with the same identity
    /// is already registered locally.
    pub fn register(&mut self, descriptor: TypeDescriptor) -> Result<(), TypeError> {
        let key = descriptor.key.clone();
        if self.table.contains_key(&key) {
            return Err(TypeError::Duplicate(key));
        }
        self.table.insert(key, Arc::new(descriptor));
        Ok(())
    }

    /// Appends a dependency registry consulted after the local table.
    pub fn add_parent(&mut self, parent: Arc<TypeRegistry>) {
        self.parents.push(parent);
    }

    /// Searches the local table, the synthesized cache, then each parent in
    /// registration order. Does not synthesize.
    fn find(&self, key: &TypeKey) -> Option<Arc<TypeDescriptor>> {
        if let Some(descriptor) = self.table.get(key) {
            return Some(descriptor.clone());
        }
        if let Some(descriptor) = self.synthesized.read().unwrap().get(key) {
            return Some(descriptor.clone());
        }
        self.parents.iter().find_map(|parent| parent.find(key))
    }

    /// Looks up the descriptor for a type identity.
    ///
    /// If the identity is absent everywhere in the chain but denotes an enum
    /// type, a descriptor is synthesized on the spot: zero-valued default,
    /// derived from the shared enum base, with int conversion and numeric
    /// comparison capability. The synthesized descriptor is cached so later
    /// lookups observe the same instance.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::NotFound` for a non-enum identity absent from the
    /// chain.
    pub fn lookup(&self, key: &TypeKey) -> Result<Arc<TypeDescriptor>, TypeError> {
        if let Some(descriptor) = self.find(key) {
            return Ok(descriptor);
        }
        if let TypeKey::Enum(name) = key {
            let descriptor = Arc::new(
                TypeDescriptor::new(
                    key.clone(),
                    name.clone(),
                    TypedValue::Enum {
                        key: key.clone(),
                        value: 0,
                    },
                )
                .with_flags(TypeFlags::IS_ENUM)
                .with_base(TypeKey::EnumBase)
                .with_conversion(TypeKey::Int)
                .with_operators(CompareCaps::EQUALITY | CompareCaps::ORDERING),
            );
            let mut cache = self.synthesized.write().unwrap();
            // A racing lookup may have synthesized first; keep the cached one.
            let descriptor = cache
                .entry(key.clone())
                .or_insert(descriptor)
                .clone();
            return Ok(descriptor);
        }
        Err(TypeError::NotFound(key.clone()))
    }

    /// Returns the default value of a type.
    pub fn default_of(&self, key: &TypeKey) -> Result<TypedValue, TypeError> {
        Ok(self.lookup(key)?.default.clone())
    }

    /// Returns true if a value of type `from` may convert to type `to`.
    ///
    /// Permitted when: `from` carries the skip-conversion-check flag; the
    /// types are identical; `to` is `from`'s base; `to` is the universal
    /// string or any type; both types are enum-flagged; `to` appears in
    /// `from`'s explicit conversion list; or `from`'s base can convert to
    /// `to`.
    pub fn can_convert(&self, from: &TypeKey, to: &TypeKey) -> bool {
        if from == to || *to == TypeKey::Any || *to == TypeKey::Str {
            return true;
        }
        let Ok(descriptor) = self.lookup(from) else {
            return false;
        };
        if descriptor.flags.contains(TypeFlags::SKIP_CONVERSION_CHECK) {
            return true;
        }
        if descriptor.base.as_ref() == Some(to) {
            return true;
        }
        if descriptor.is_enum() && self.is_enum_type(to) {
            return true;
        }
        if descriptor.converts_to.contains(to) {
            return true;
        }
        match &descriptor.base {
            Some(base) => self.can_convert(base, to),
            None => false,
        }
    }

    fn is_enum_type(&self, key: &TypeKey) -> bool {
        key.denotes_enum()
            || self
                .find(key)
                .is_some_and(|descriptor| descriptor.is_enum())
    }

    /// Number of locally registered descriptors (synthesized cache excluded).
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
