//! # Archetype transition engine
//!
//! Given a source archetype and an add or remove of one component, the
//! engine locates or builds the target archetype and splices the entity's
//! row across. All composition changes (`add_component`, `set_component` on
//! an absent component, `delete_component`) funnel through here.
//!
//! ## Target lookup
//! Two strategies, in order:
//!
//! 1. **Edge cache** — the source archetype memoizes, per component, the
//!    target reached by add and by remove. A hit skips hashing and sorting
//!    entirely. Edges are filled lazily and never invalidated: targets are
//!    unique by canonicalization and archetypes are never destroyed.
//! 2. **Hash path** — copy the source signature with the component inserted
//!    or removed in sort order, then find or create the target through the
//!    signature-keyed archetype table. The edge is populated afterwards.
//!
//! ## Row moves
//! Columns are aligned by component identity, never by slot index, because
//! slot indices differ between archetypes. Shared columns are spliced before
//! anything else so that every surviving column stays level with the entity
//! vector at each observable moment; for a data-carrying add the one fresh
//! column is extended last, by the caller.
//!
//! ## Failure semantics
//! Transitions are in-memory and total. The single detected misuse, mixing
//! tag and data storage of one component within one archetype, panics
//! before any state changes.

use tracing::trace;

use crate::engine::archetype::{signature_with, signature_without, Archetype};
use crate::engine::entity::{Component, Entity};
use crate::engine::storage::{AnyColumn, ColumnBinding};
use crate::engine::types::{ArchetypeId, Row, SlotRef};
use crate::engine::world::World;

impl World {
    /// Resolves the archetype reached from `source` by adding `component`.
    ///
    /// `data` carries the column binding when the addition stores a value
    /// (`set_component`) and is `None` for tag additions (`add_component`).
    /// The choice decides whether a freshly created target receives a column
    /// for the component.
    ///
    /// ## Panics
    /// Panics when the target stores the component in the opposite mode
    /// (tag vs. data) from what the operation needs, or when a shared
    /// component's storage mode diverges between source and target.
    pub(crate) fn resolve_add(
        &mut self,
        source: ArchetypeId,
        component: Component,
        data: Option<&ColumnBinding>,
    ) -> ArchetypeId {
        if let Some(target) = self.archetypes[source as usize]
            .edges
            .get(&component)
            .and_then(|edge| edge.add)
        {
            // Tag adds and data adds share the edge; the slot mode still has
            // to agree with the operation.
            self.check_added_slot(target, component, data.is_some());
            return target;
        }

        let signature = signature_with(self.archetypes[source as usize].signature(), component);
        let target = match self.archetype_index.get(signature.as_ref()) {
            Some(&existing) => {
                self.check_added_slot(existing, component, data.is_some());
                self.check_shared_slots(source, existing);
                existing
            }
            None => self.create_archetype(source, signature, Some((component, data))),
        };

        self.archetypes[source as usize]
            .edges
            .entry(component)
            .or_default()
            .add = Some(target);
        target
    }

    /// Resolves the archetype reached from `source` by removing `component`.
    ///
    /// Removing the last component lands in the zero archetype, which is
    /// registered under the empty signature like any other.
    pub(crate) fn resolve_remove(
        &mut self,
        source: ArchetypeId,
        component: Component,
    ) -> ArchetypeId {
        if let Some(target) = self.archetypes[source as usize]
            .edges
            .get(&component)
            .and_then(|edge| edge.remove)
        {
            return target;
        }

        let signature = signature_without(self.archetypes[source as usize].signature(), component);
        let target = match self.archetype_index.get(signature.as_ref()) {
            Some(&existing) => {
                self.check_shared_slots(source, existing);
                existing
            }
            None => self.create_archetype(source, signature, None),
        };

        self.archetypes[source as usize]
            .edges
            .entry(component)
            .or_default()
            .remove = Some(target);
        target
    }

    /// Builds, registers and publishes a new archetype.
    ///
    /// Column slots mirror the source archetype for every carried component;
    /// `added` describes the one component not present in the source, with
    /// its binding when the addition carries data. Registration inserts the
    /// archetype into the signature table and the per-component inverted
    /// index, then offers it to every cached query plan.
    fn create_archetype(
        &mut self,
        source: ArchetypeId,
        signature: Box<[Component]>,
        added: Option<(Component, Option<&ColumnBinding>)>,
    ) -> ArchetypeId {
        let columns: Vec<Option<Box<dyn AnyColumn>>> = signature
            .iter()
            .map(|&component| {
                if let Some((added_component, data)) = added {
                    if component == added_component {
                        return data.map(|binding| (binding.make)());
                    }
                }
                let src = &self.archetypes[source as usize];
                let slot = src
                    .slot_of(component)
                    .expect("carried component missing from source signature");
                if src.columns[slot].is_some() {
                    let binding = self
                        .bindings
                        .get(&component)
                        .expect("column exists for a component with no payload binding");
                    Some((binding.make)())
                } else {
                    None
                }
            })
            .collect();

        let id = self.archetypes.len() as ArchetypeId;
        let archetype = Archetype::new(signature.clone(), columns);
        for (slot, &component) in archetype.signature().iter().enumerate() {
            let slot_ref = if archetype.columns[slot].is_some() {
                SlotRef::Column(slot)
            } else {
                SlotRef::Tag
            };
            self.components
                .get_mut(&component)
                .expect("component belongs to a different world")
                .insert(id, slot_ref);
        }
        trace!(archetype = id, size = signature.len(), "archetype created");
        self.archetypes.push(archetype);
        self.archetype_index.insert(signature, id);

        // Offer the new archetype to every cached plan so their match lists
        // stay coherent under schema growth.
        let plans = std::mem::take(&mut self.plans);
        for plan in &plans {
            plan.borrow_mut().offer(self, id);
        }
        self.plans = plans;

        id
    }

    /// Moves the row of `entity` from `source` to `target`, splicing every
    /// shared column and fixing up the record displaced by the swap-remove.
    ///
    /// Returns the entity's new row in the target. The caller updates the
    /// entity's own record and, for data-carrying adds, pushes the new value
    /// afterwards.
    pub(crate) fn move_rows(
        &mut self,
        source_id: ArchetypeId,
        target_id: ArchetypeId,
        entity: Entity,
        source_row: Row,
    ) -> Row {
        let (source, target) = archetype_pair_mut(&mut self.archetypes, source_id, target_id);

        for slot in 0..source.signature().len() {
            let component = source.signature()[slot];
            match target.slot_of(component) {
                Some(target_slot) => {
                    if let Some(source_column) = source.columns[slot].as_deref_mut() {
                        target.columns[target_slot]
                            .as_deref_mut()
                            .expect("shared component loses its column across the transition")
                            .move_from(source_column, source_row);
                    }
                }
                None => {
                    // The removed component's value is discarded.
                    if let Some(source_column) = source.columns[slot].as_deref_mut() {
                        source_column.swap_remove(source_row);
                    }
                }
            }
        }

        let row = target.entities.len() as Row;
        target.entities.push(entity);
        source.entities.swap_remove(source_row as usize);
        let displaced = source.entities.get(source_row as usize).copied();
        if let Some(moved) = displaced {
            self.patch_row(moved, source_row);
        }
        row
    }

    /// Verifies that `target` stores the transitioned component in the mode
    /// the operation expects.
    fn check_added_slot(&self, target: ArchetypeId, component: Component, with_data: bool) {
        let slot = self
            .slot_in(component, target)
            .expect("target archetype lacks the transitioned component");
        match (slot, with_data) {
            (SlotRef::Tag, true) => panic!(
                "component {} is stored as a tag in the target archetype and cannot carry data",
                component.entity().id()
            ),
            (SlotRef::Column(_), false) => panic!(
                "component {} carries data in the target archetype and cannot be added as a tag",
                component.entity().id()
            ),
            _ => {}
        }
    }

    /// Verifies that every component shared by `source` and `target` is
    /// stored in the same mode on both sides.
    fn check_shared_slots(&self, source: ArchetypeId, target: ArchetypeId) {
        let src = &self.archetypes[source as usize];
        let dst = &self.archetypes[target as usize];
        for (slot, &component) in src.signature().iter().enumerate() {
            let Some(dst_slot) = dst.slot_of(component) else {
                continue;
            };
            if src.columns[slot].is_some() != dst.columns[dst_slot].is_some() {
                panic!(
                    "component {} mixes tag and data storage across archetypes",
                    component.entity().id()
                );
            }
        }
    }
}

/// Borrows two distinct archetypes mutably at once.
fn archetype_pair_mut(
    archetypes: &mut [Archetype],
    a: ArchetypeId,
    b: ArchetypeId,
) -> (&mut Archetype, &mut Archetype) {
    assert!(a != b, "source and target archetype must differ");
    let (low, high) = if a < b { (a, b) } else { (b, a) };
    let (head, tail) = archetypes.split_at_mut(high as usize);
    let low_reference = &mut head[low as usize];
    let high_reference = &mut tail[0];
    if a < b {
        (low_reference, high_reference)
    } else {
        (high_reference, low_reference)
    }
}
