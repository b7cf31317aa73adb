//! # Entity identity and lifecycle
//!
//! This module defines the entity handle, the component handle derived from
//! it, the identifier manager that mints and recycles entity identifiers,
//! and the record that maps a live entity to its storage location.
//!
//! ## Entity model
//! An [`Entity`] is an opaque 64-bit handle. It carries no version or shard
//! bits: an entity is alive if and only if the world currently holds a
//! record for its identifier. Identifiers are recycled through a LIFO
//! freelist, so long-running worlds with heavy churn never exhaust the
//! 64-bit space.
//!
//! ## Components are entities
//! A [`Component`] is an entity promoted to name a kind of data. Promoting
//! an entity makes components first-class: a component can itself carry
//! components, which is how human-readable names attach to components.
//! `Component` values can only be produced by
//! [`World::new_component`](crate::engine::world::World::new_component), so a
//! plain entity cannot be passed where a component is expected.
//!
//! ## Records
//! Every live entity owns exactly one [`EntityRecord`] pointing at its
//! archetype and row. The world stores records in an arena indexed by the
//! entity identifier; archetypes reach back into that arena through the
//! entity handles in their entity vectors when a swap-remove displaces a
//! row.

use std::fmt;

use crate::engine::types::{ArchetypeId, EntityId, Row};

/// Opaque handle identifying one entity in a world.
///
/// Handles are cheap to copy and compare. A handle is only meaningful in the
/// world that created it; mixing handles across worlds is not detected.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Entity(pub(crate) EntityId);

impl Entity {
    /// Returns the raw 64-bit identifier of this entity.
    #[inline]
    pub fn id(self) -> EntityId {
        self.0
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity {}", self.0)
    }
}

/// An entity promoted to act as a component descriptor.
///
/// The component's numeric identity is its entity identifier; signatures
/// sort and hash components by that identifier. The payload type a component
/// stores is bound lazily by the first
/// [`set_component`](crate::engine::world::World::set_component) call and is
/// invariant afterwards.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Component(pub(crate) Entity);

impl Component {
    /// Returns the entity underlying this component.
    ///
    /// Components are ordinary entities, so data can be attached to them
    /// through this handle; the usual case is a human-readable name.
    #[inline]
    pub fn entity(self) -> Entity {
        self.0
    }
}

/// Mints and recycles entity identifiers.
///
/// ## Behavior
/// - `acquire` pops the freelist when it is non-empty, otherwise returns and
///   post-increments a monotonically growing counter starting at zero.
/// - `release` pushes the identifier back onto the freelist. No validation
///   is performed; callers guarantee released identifiers were acquired.
///
/// ## Invariants
/// - Identifiers handed out by the counter are dense: the counter never
///   advances while the freelist is non-empty, which keeps the world's
///   record arena compact under churn.
#[derive(Default)]
pub(crate) struct IdManager {
    next: EntityId,
    free: Vec<EntityId>,
}

impl IdManager {
    /// Returns a fresh or recycled identifier.
    #[inline]
    pub(crate) fn acquire(&mut self) -> EntityId {
        match self.free.pop() {
            Some(id) => id,
            None => {
                let id = self.next;
                self.next += 1;
                id
            }
        }
    }

    /// Returns an identifier to the freelist for reuse.
    #[inline]
    pub(crate) fn release(&mut self, id: EntityId) {
        self.free.push(id);
    }
}

/// Storage location of a live entity.
///
/// ## Invariants
/// - `archetype.entities[row] == entity` for the entity owning this record.
/// - Updated in the same operation as any archetype row move, so the record
///   never observably lags the storage.
#[derive(Clone, Copy, Debug)]
pub(crate) struct EntityRecord {
    /// Archetype currently holding the entity.
    pub(crate) archetype: ArchetypeId,

    /// Row within that archetype's entity vector and columns.
    pub(crate) row: Row,
}
