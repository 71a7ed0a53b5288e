//! Scope resolution against the live entity world.

use super::{EntityScope, ScopeKind};
use crate::context::ExecutionContext;
use crate::env::EntityOracle;
use crate::types::{EntityId, TypedValue};

impl EntityScope {
    /// Resolves this scope to a sequence of live entities.
    ///
    /// The sequence is finite and non-restartable: base search results come
    /// from a single oracle query, and an attached link traversal fetches
    /// linked entities lazily as the sequence is consumed. An unresolvable
    /// id, register, or pattern yields an empty sequence; consumers must
    /// treat zero targets as a normal outcome.
    pub fn resolve<'w>(&self, ctx: &ExecutionContext<'w>) -> ScopeIter<'w> {
        let base = match &self.kind {
            ScopeKind::Null | ScopeKind::Invalid => Vec::new(),
            ScopeKind::SelfEntity => vec![ctx.evaluator],
            ScopeKind::Argument => match ctx.trigger_argument() {
                Some(TypedValue::Entity(id)) if !id.is_none() => vec![*id],
                _ => Vec::new(),
            },
            ScopeKind::Global => ctx.world.global_entity().into_iter().collect(),
            ScopeKind::ObjectById(id) => ctx.world.lookup_by_id(*id).into_iter().collect(),
            ScopeKind::ObjectInRegister(register) => match ctx.registers.get(*register) {
                TypedValue::Entity(id) if !id.is_none() => {
                    ctx.world.lookup_by_id(*id).into_iter().collect()
                }
                _ => Vec::new(),
            },
            ScopeKind::ObjectsWithGroup { group, use_first } => {
                let mut found = ctx.world.lookup_by_group(*group);
                if *use_first {
                    found.truncate(1);
                }
                found
            }
            ScopeKind::ObjectsWithName { pattern, use_first } => {
                let mut found = ctx.world.lookup_by_name(pattern);
                if *use_first {
                    found.truncate(1);
                }
                found
            }
            ScopeKind::ObjectsWithPrefab { pattern, use_first } => {
                let mut found = ctx.world.lookup_by_prefab(pattern);
                if *use_first {
                    found.truncate(1);
                }
                found
            }
        };

        // Scopes that cannot traverse links silently ignore an attachment.
        let link = if self.supports_links() {
            self.link_name.as_ref().map(|name| LinkStep {
                name: name.clone(),
                use_first: self.use_first_link,
            })
        } else {
            None
        };

        ScopeIter {
            world: ctx.world,
            base: base.into_iter(),
            link,
            pending: Vec::new().into_iter(),
        }
    }
}

struct LinkStep {
    name: String,
    use_first: bool,
}

/// Lazy sequence of entities yielded by scope resolution.
pub struct ScopeIter<'w> {
    world: &'w dyn EntityOracle,
    base: std::vec::IntoIter<EntityId>,
    link: Option<LinkStep>,
    pending: std::vec::IntoIter<EntityId>,
}

impl Iterator for ScopeIter<'_> {
    type Item = EntityId;

    fn next(&mut self) -> Option<EntityId> {
        let Some(step) = &self.link else {
            return self.base.next();
        };
        loop {
            if let Some(entity) = self.pending.next() {
                return Some(entity);
            }
            let base = self.base.next()?;
            let mut linked = self.world.linked_entities(base, &step.name);
            if step.use_first {
                linked.truncate(1);
            }
            self.pending = linked.into_iter();
        }
    }
}
