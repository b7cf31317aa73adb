//! # Archetypes and signatures
//!
//! An archetype is the storage group for every entity carrying exactly the
//! same set of components. Storage is column-major within the group: one
//! column per data-bearing component, each column parallel to the
//! archetype's entity vector.
//!
//! ## Signatures
//! An archetype is identified by its signature: the canonically sorted list
//! of its components. Signatures sort by the component's entity identifier,
//! and the world's archetype table hashes the sorted identifiers in order,
//! verifying signature equality on lookup. Two archetypes with equal
//! signatures therefore never coexist.
//!
//! ## Edge cache
//! Each archetype memoizes, per component, the neighbouring archetype
//! reached by adding or removing that component. Edges are filled lazily by
//! the transition engine and never invalidated: the target of an edge is
//! unique by canonicalization, and archetypes are never destroyed, so an
//! edge cannot dangle.
//!
//! The archetype itself is a plain aggregate. The transition engine in
//! [`crate::engine::transition`] mutates it directly through the column
//! primitives; no higher-level methods live here.

use std::collections::HashMap;

use crate::engine::entity::{Component, Entity};
use crate::engine::storage::AnyColumn;
use crate::engine::types::Row;

/// Builds the signature of `base` with `component` inserted in sort order.
///
/// The caller guarantees `component` is not already present.
pub(crate) fn signature_with(base: &[Component], component: Component) -> Box<[Component]> {
    let at = match base.binary_search(&component) {
        Ok(_) => unreachable!("component already present in signature"),
        Err(at) => at,
    };
    let mut signature = Vec::with_capacity(base.len() + 1);
    signature.extend_from_slice(&base[..at]);
    signature.push(component);
    signature.extend_from_slice(&base[at..]);
    signature.into_boxed_slice()
}

/// Builds the signature of `base` with `component` removed.
///
/// The caller guarantees `component` is present.
pub(crate) fn signature_without(base: &[Component], component: Component) -> Box<[Component]> {
    base.iter()
        .copied()
        .filter(|&c| c != component)
        .collect::<Vec<_>>()
        .into_boxed_slice()
}

/// Cached transition targets for one component, from one source archetype.
#[derive(Default, Clone, Copy)]
pub(crate) struct ArchetypeEdge {
    /// Archetype reached by adding the component.
    pub(crate) add: Option<crate::engine::types::ArchetypeId>,

    /// Archetype reached by removing the component.
    pub(crate) remove: Option<crate::engine::types::ArchetypeId>,
}

/// One storage group: a sorted component set with columnar storage.
///
/// ## Invariants
/// - `signature` is sorted by component identifier and duplicate-free.
/// - `columns.len() == signature.len()`; slot `i` stores values of
///   `signature[i]`, or is `None` when the component is a tag there.
/// - Every populated column has the same length as `entities`.
/// - `entities[row]` is the key of the world record whose `row` field equals
///   `row`; the transition engine keeps the two in lockstep.
pub struct Archetype {
    /// Sorted component set identifying this archetype.
    pub(crate) signature: Box<[Component]>,

    /// Entities stored in this archetype, in row order.
    pub(crate) entities: Vec<Entity>,

    /// Payload columns, parallel to `signature`. Tag slots hold `None`.
    pub(crate) columns: Vec<Option<Box<dyn AnyColumn>>>,

    /// Lazily filled transition shortcuts, keyed by component.
    pub(crate) edges: HashMap<Component, ArchetypeEdge>,
}

impl Archetype {
    /// Creates an archetype from its sorted signature and column array.
    pub(crate) fn new(signature: Box<[Component]>, columns: Vec<Option<Box<dyn AnyColumn>>>) -> Self {
        debug_assert_eq!(signature.len(), columns.len());
        debug_assert!(signature.windows(2).all(|w| w[0] < w[1]));
        Self {
            signature,
            entities: Vec::new(),
            columns,
            edges: HashMap::new(),
        }
    }

    /// The sorted component set of this archetype.
    #[inline]
    pub fn signature(&self) -> &[Component] {
        &self.signature
    }

    /// Entities currently stored, in the archetype's internal row order.
    ///
    /// The order is stable under unrelated mutations: swap-remove only
    /// relocates the row that happened to be last.
    #[inline]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Number of entities in this archetype.
    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if the archetype holds no entities.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// The column at `slot`, or `None` for tag slots.
    #[inline]
    pub fn column(&self, slot: usize) -> Option<&dyn AnyColumn> {
        self.columns[slot].as_deref()
    }

    /// Slot index of `component` in this archetype's signature.
    #[inline]
    pub(crate) fn slot_of(&self, component: Component) -> Option<usize> {
        self.signature.binary_search(&component).ok()
    }

    /// Swap-removes `row` from the entity vector and every populated column.
    ///
    /// Returns the entity that was relocated into `row`, if the removed row
    /// was not the last one; the caller patches that entity's record.
    pub(crate) fn detach_row(&mut self, row: Row) -> Option<Entity> {
        for column in self.columns.iter_mut().flatten() {
            column.swap_remove(row);
        }
        self.entities.swap_remove(row as usize);
        self.entities.get(row as usize).copied()
    }
}
