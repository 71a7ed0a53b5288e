//! Entity scope descriptors.
//!
//! A scope selects the evaluation target(s) of a condition or action:
//! nothing, the evaluating entity itself, the trigger argument, the global
//! entity, a specific entity, or a searched set. An optional link traversal
//! runs after the base resolution and replaces the result set with the
//! entities reachable via a named link.
//!
//! Scopes are authored as immutable rule data; [`EntityScope::with_links`]
//! is a pure copy-with-change builder, never an in-place mutation.

mod resolve;

pub use resolve::ScopeIter;

use crate::context::RegisterIndex;
use crate::types::{EntityId, GroupId};

/// Base target selection, before any link traversal.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScopeKind {
    /// No target.
    Null,

    /// The entity the rule is evaluating on.
    SelfEntity,

    /// The trigger's argument, when it is an entity.
    Argument,

    /// The singleton global entity.
    Global,

    /// A specific entity by id.
    ObjectById(EntityId),

    /// The entity currently held in a register.
    ObjectInRegister(RegisterIndex),

    /// All entities in a group.
    ObjectsWithGroup { group: GroupId, use_first: bool },

    /// All entities whose name matches a wildcard pattern.
    ObjectsWithName { pattern: String, use_first: bool },

    /// All entities instantiated from a prefab matching a wildcard pattern.
    ObjectsWithPrefab { pattern: String, use_first: bool },

    /// Malformed or unreadable authored data.
    Invalid,
}

/// A scope descriptor: base target selection plus an optional link traversal.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityScope {
    pub kind: ScopeKind,

    /// Link name to traverse after base resolution.
    ///
    /// Absent in format-version-1 rule data; a missing field means no
    /// traversal, not an error.
    #[cfg_attr(feature = "serde", serde(default))]
    pub link_name: Option<String>,

    /// Collapse a multi-link relation to its first entity.
    #[cfg_attr(feature = "serde", serde(default))]
    pub use_first_link: bool,
}

impl EntityScope {
    pub const fn new(kind: ScopeKind) -> Self {
        Self {
            kind,
            link_name: None,
            use_first_link: false,
        }
    }

    pub const fn null() -> Self {
        Self::new(ScopeKind::Null)
    }

    pub const fn invalid() -> Self {
        Self::new(ScopeKind::Invalid)
    }

    /// The entity the rule is evaluating on.
    pub const fn self_entity() -> Self {
        Self::new(ScopeKind::SelfEntity)
    }

    /// The trigger argument, when it carries an entity.
    pub const fn argument() -> Self {
        Self::new(ScopeKind::Argument)
    }

    pub const fn global() -> Self {
        Self::new(ScopeKind::Global)
    }

    pub const fn by_id(id: EntityId) -> Self {
        Self::new(ScopeKind::ObjectById(id))
    }

    pub const fn in_register(register: RegisterIndex) -> Self {
        Self::new(ScopeKind::ObjectInRegister(register))
    }

    pub fn with_group(group: GroupId, use_first: bool) -> Self {
        Self::new(ScopeKind::ObjectsWithGroup { group, use_first })
    }

    pub fn with_name(pattern: impl Into<String>, use_first: bool) -> Self {
        Self::new(ScopeKind::ObjectsWithName {
            pattern: pattern.into(),
            use_first,
        })
    }

    pub fn with_prefab(pattern: impl Into<String>, use_first: bool) -> Self {
        Self::new(ScopeKind::ObjectsWithPrefab {
            pattern: pattern.into(),
            use_first,
        })
    }

    /// Returns a copy of this scope with a link traversal attached.
    #[must_use]
    pub fn with_links(mut self, link: impl Into<String>, use_first: bool) -> Self {
        self.link_name = Some(link.into());
        self.use_first_link = use_first;
        self
    }

    /// Returns true if a link traversal is attached.
    #[inline]
    pub fn has_links(&self) -> bool {
        self.link_name.is_some()
    }

    /// Returns true if this scope can carry a link traversal.
    ///
    /// Null and invalid scopes have nothing to traverse from; the global
    /// entity does not participate in links.
    pub fn supports_links(&self) -> bool {
        !matches!(
            self.kind,
            ScopeKind::Null | ScopeKind::Invalid | ScopeKind::Global
        )
    }

    /// Returns true if the target is known without consulting live state.
    ///
    /// Holds only for null/self/global/by-id/invalid scopes with no link
    /// traversal attached.
    pub fn is_known_target(&self) -> bool {
        if self.has_links() {
            return false;
        }
        matches!(
            self.kind,
            ScopeKind::Null
                | ScopeKind::SelfEntity
                | ScopeKind::Global
                | ScopeKind::ObjectById(_)
                | ScopeKind::Invalid
        )
    }

    /// Returns true if resolution may yield more than one entity.
    pub fn is_multi_target(&self) -> bool {
        let multi_base = matches!(
            self.kind,
            ScopeKind::ObjectsWithGroup { use_first: false, .. }
                | ScopeKind::ObjectsWithName { use_first: false, .. }
                | ScopeKind::ObjectsWithPrefab { use_first: false, .. }
        );
        let multi_links = self.supports_links() && self.has_links() && !self.use_first_link;
        multi_base || multi_links
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_target_excludes_searches_and_links() {
        assert!(EntityScope::self_entity().is_known_target());
        assert!(EntityScope::null().is_known_target());
        assert!(EntityScope::by_id(EntityId(4)).is_known_target());
        assert!(!EntityScope::argument().is_known_target());
        assert!(!EntityScope::with_name("Goblin_*", true).is_known_target());
        assert!(
            !EntityScope::by_id(EntityId(4))
                .with_links("owner", true)
                .is_known_target()
        );
    }

    #[test]
    fn multi_target_follows_use_first() {
        assert!(EntityScope::with_name("Goblin_*", false).is_multi_target());
        assert!(!EntityScope::with_name("Goblin_*", true).is_multi_target());
        assert!(EntityScope::with_group(GroupId(3), false).is_multi_target());
        assert!(!EntityScope::self_entity().is_multi_target());

        // A link traversal reopens multiplicity unless collapsed.
        assert!(
            EntityScope::self_entity()
                .with_links("minions", false)
                .is_multi_target()
        );
        assert!(
            !EntityScope::self_entity()
                .with_links("minions", true)
                .is_multi_target()
        );
        // Scopes that cannot traverse links ignore the attachment.
        assert!(
            !EntityScope::global()
                .with_links("minions", false)
                .is_multi_target()
        );
    }

    #[test]
    fn with_links_is_a_pure_copy() {
        let base = EntityScope::with_prefab("door*", false);
        let linked = base.clone().with_links("controls", true);
        assert!(!base.has_links());
        assert!(linked.has_links());
        assert_ne!(base, linked);
    }
}
