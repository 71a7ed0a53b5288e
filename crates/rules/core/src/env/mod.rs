//! Traits describing the live entity world.
//!
//! The engine never owns entities; it consults an [`EntityOracle`] supplied
//! by the host for lookups, liveness, link traversal, and component access.
//! Every method is a plain in-memory read and every miss is an empty result,
//! never an error; "zero targets" is a normal outcome for scope resolution.

pub mod mock;

use crate::types::{ComponentHandle, EntityId, GroupId, TypeKey};

/// Read access to the host's entity world.
///
/// Pattern-taking lookups accept a single leading or trailing `*` wildcard
/// (see [`crate::compare::wildcard_match`]). Result ordering is whatever the
/// implementation yields; the engine does not re-sort.
pub trait EntityOracle {
    /// Resolves an entity id to a live entity, if one exists.
    fn lookup_by_id(&self, id: EntityId) -> Option<EntityId>;

    /// All live entities whose name matches the pattern.
    fn lookup_by_name(&self, pattern: &str) -> Vec<EntityId>;

    /// All live entities instantiated from a prefab matching the pattern.
    fn lookup_by_prefab(&self, pattern: &str) -> Vec<EntityId>;

    /// All live entities belonging to the group.
    fn lookup_by_group(&self, group: GroupId) -> Vec<EntityId>;

    /// The singleton global entity, if the host registered one.
    fn global_entity(&self) -> Option<EntityId>;

    /// Entities reachable from `entity` via the named link.
    fn linked_entities(&self, entity: EntityId, link: &str) -> Vec<EntityId>;

    /// Whether the entity currently participates in gameplay.
    fn is_active(&self, entity: EntityId) -> bool;

    /// The entity's component of the given type, if present.
    fn component(&self, entity: EntityId, component_type: &TypeKey) -> Option<ComponentHandle>;
}
