//! In-memory entity world for testing.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use super::EntityOracle;
use crate::compare::wildcard_match;
use crate::types::{ComponentHandle, EntityId, GroupId, TypeKey};

/// Mock entity world backing unit and integration tests.
///
/// Entities are kept in id order so lookups yield deterministic sequences.
pub struct MockWorld {
    inner: Mutex<WorldInner>,
}

#[derive(Default)]
struct WorldInner {
    entities: BTreeMap<EntityId, MockEntity>,
    global: Option<EntityId>,
    next_id: u32,
}

#[derive(Default)]
struct MockEntity {
    name: String,
    prefab: String,
    groups: Vec<GroupId>,
    active: bool,
    links: HashMap<String, Vec<EntityId>>,
    components: HashMap<TypeKey, ComponentHandle>,
}

impl MockWorld {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(WorldInner::default()),
        }
    }

    /// Creates an active entity with the given name and prefab.
    pub fn spawn(&self, name: &str, prefab: &str) -> EntityId {
        let mut inner = self.inner.lock().unwrap();
        let id = EntityId(inner.next_id);
        inner.next_id += 1;
        inner.entities.insert(
            id,
            MockEntity {
                name: name.to_owned(),
                prefab: prefab.to_owned(),
                active: true,
                ..MockEntity::default()
            },
        );
        id
    }

    pub fn despawn(&self, id: EntityId) {
        self.inner.lock().unwrap().entities.remove(&id);
    }

    pub fn set_active(&self, id: EntityId, active: bool) {
        if let Some(entity) = self.inner.lock().unwrap().entities.get_mut(&id) {
            entity.active = active;
        }
    }

    pub fn set_global(&self, id: EntityId) {
        self.inner.lock().unwrap().global = Some(id);
    }

    pub fn add_group(&self, id: EntityId, group: GroupId) {
        if let Some(entity) = self.inner.lock().unwrap().entities.get_mut(&id) {
            entity.groups.push(group);
        }
    }

    /// Adds a directed link from one entity to another under a link name.
    pub fn link(&self, from: EntityId, link: &str, to: EntityId) {
        if let Some(entity) = self.inner.lock().unwrap().entities.get_mut(&from) {
            entity.links.entry(link.to_owned()).or_default().push(to);
        }
    }

    /// Attaches a component handle of the given type to an entity.
    pub fn attach(&self, id: EntityId, component_type: TypeKey, handle: ComponentHandle) {
        if let Some(entity) = self.inner.lock().unwrap().entities.get_mut(&id) {
            entity.components.insert(component_type, handle);
        }
    }
}

impl Default for MockWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityOracle for MockWorld {
    fn lookup_by_id(&self, id: EntityId) -> Option<EntityId> {
        self.inner
            .lock()
            .unwrap()
            .entities
            .contains_key(&id)
            .then_some(id)
    }

    fn lookup_by_name(&self, pattern: &str) -> Vec<EntityId> {
        let inner = self.inner.lock().unwrap();
        inner
            .entities
            .iter()
            .filter(|(_, entity)| wildcard_match(&entity.name, pattern))
            .map(|(id, _)| *id)
            .collect()
    }

    fn lookup_by_prefab(&self, pattern: &str) -> Vec<EntityId> {
        let inner = self.inner.lock().unwrap();
        inner
            .entities
            .iter()
            .filter(|(_, entity)| wildcard_match(&entity.prefab, pattern))
            .map(|(id, _)| *id)
            .collect()
    }

    fn lookup_by_group(&self, group: GroupId) -> Vec<EntityId> {
        let inner = self.inner.lock().unwrap();
        inner
            .entities
            .iter()
            .filter(|(_, entity)| entity.groups.contains(&group))
            .map(|(id, _)| *id)
            .collect()
    }

    fn global_entity(&self) -> Option<EntityId> {
        self.inner.lock().unwrap().global
    }

    fn linked_entities(&self, entity: EntityId, link: &str) -> Vec<EntityId> {
        let inner = self.inner.lock().unwrap();
        inner
            .entities
            .get(&entity)
            .and_then(|entity| entity.links.get(link))
            .cloned()
            .unwrap_or_default()
    }

    fn is_active(&self, entity: EntityId) -> bool {
        self.inner
            .lock()
            .unwrap()
            .entities
            .get(&entity)
            .is_some_and(|entity| entity.active)
    }

    fn component(&self, entity: EntityId, component_type: &TypeKey) -> Option<ComponentHandle> {
        self.inner
            .lock()
            .unwrap()
            .entities
            .get(&entity)
            .and_then(|entity| entity.components.get(component_type))
            .copied()
    }
}
