//! # World registry
//!
//! The [`World`] owns everything: the identifier manager, the record arena,
//! the archetype table, the per-component inverted index, the payload
//! bindings, and the registry of cached query plans. All mutation flows
//! through the public operations defined here; composition changes delegate
//! to the transition engine in [`crate::engine::transition`].
//!
//! ## Concurrency model
//! A world is a single-threaded mutable value. No operation suspends, no
//! internal locking exists, and concurrent access from multiple threads is
//! not supported. Query visitors must not change entity composition for
//! entities whose archetype matches the running query; writing component
//! *values* in place is always safe because it never moves rows.
//!
//! ## Memory model
//! Archetypes, components, and inverted-index entries grow monotonically and
//! are never destroyed. Column capacity shrinks only in length. Entity
//! identifiers are the one recycled resource.

use std::any::{type_name, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::engine::archetype::Archetype;
use crate::engine::entity::{Component, Entity, EntityRecord, IdManager};
use crate::engine::error::TypeMismatchError;
use crate::engine::query::PlanInner;
use crate::engine::storage::{Column, ColumnBinding};
use crate::engine::types::{ArchetypeId, Row, SlotRef};

/// Identifier of the zero archetype: the empty signature every new entity
/// starts in.
pub(crate) const ZERO_ARCHETYPE: ArchetypeId = 0;

/// An archetype-based entity-component store.
///
/// Entities are created into the zero archetype and migrate between
/// archetypes as components are added and removed. Component values are
/// stored column-major per archetype, so queries iterate densely over every
/// entity sharing a component set.
pub struct World {
    ids: IdManager,

    /// Record arena indexed by entity identifier. `None` marks a dead or
    /// never-issued identifier; identifiers stay dense because the manager
    /// recycles them before advancing its counter.
    records: Vec<Option<EntityRecord>>,

    /// All archetypes ever created, addressed by [`ArchetypeId`]. Index 0 is
    /// the zero archetype. Archetypes live for the world's lifetime.
    pub(crate) archetypes: Vec<Archetype>,

    /// Signature-keyed lookup into `archetypes`. Keying by the sorted
    /// component slice hashes the raw identifiers in canonical order and
    /// verifies signature equality on lookup.
    pub(crate) archetype_index: HashMap<Box<[Component]>, ArchetypeId>,

    /// Inverted index: for every component, the archetypes whose signature
    /// contains it, with the column slot or the tag marker. Entries are
    /// never removed.
    pub(crate) components: HashMap<Component, HashMap<ArchetypeId, SlotRef>>,

    /// Payload type bound to each component, recorded on the first value
    /// write and invariant afterwards.
    pub(crate) bindings: HashMap<Component, ColumnBinding>,

    /// Cached query plans registered for archetype-creation callbacks.
    pub(crate) plans: Vec<Rc<RefCell<PlanInner>>>,
}

impl World {
    /// Creates an empty world containing only the zero archetype.
    pub fn new() -> Self {
        let zero = Archetype::new(Box::from([]), Vec::new());
        let mut archetype_index = HashMap::new();
        archetype_index.insert(Box::from([]), ZERO_ARCHETYPE);
        debug!("world created");
        Self {
            ids: IdManager::default(),
            records: Vec::new(),
            archetypes: vec![zero],
            archetype_index,
            components: HashMap::new(),
            bindings: HashMap::new(),
            plans: Vec::new(),
        }
    }

    /// Creates a new entity with no components.
    ///
    /// The entity is appended to the zero archetype and receives a fresh or
    /// recycled identifier.
    pub fn new_entity(&mut self) -> Entity {
        let id = self.ids.acquire();
        let entity = Entity(id);
        if self.records.len() <= id as usize {
            self.records.resize_with(id as usize + 1, || None);
        }
        let zero = &mut self.archetypes[ZERO_ARCHETYPE as usize];
        let row = zero.entities.len() as Row;
        zero.entities.push(entity);
        self.records[id as usize] = Some(EntityRecord {
            archetype: ZERO_ARCHETYPE,
            row,
        });
        entity
    }

    /// Deletes an entity, removing its row from its archetype and returning
    /// its identifier to the freelist.
    ///
    /// Deleting a dead or foreign handle is a no-op.
    pub fn delete_entity(&mut self, entity: Entity) {
        let Some(record) = self
            .records
            .get_mut(entity.id() as usize)
            .and_then(Option::take)
        else {
            return;
        };
        let displaced = self.archetypes[record.archetype as usize].detach_row(record.row);
        if let Some(moved) = displaced {
            self.patch_row(moved, record.row);
        }
        self.ids.release(entity.id());
    }

    /// Creates a new component.
    ///
    /// A component is an ordinary entity promoted to name a kind of data, so
    /// it can itself carry components; a human-readable name is the usual
    /// case. Its
    /// payload type is bound by the first [`set_component`](Self::set_component)
    /// call that stores a value for it.
    pub fn new_component(&mut self) -> Component {
        let component = Component(self.new_entity());
        self.components.insert(component, HashMap::new());
        component
    }

    /// Returns `true` if `entity` currently carries `component`, as a tag or
    /// with data.
    pub fn has_component(&self, entity: Entity, component: Component) -> bool {
        let Some(record) = self.record(entity) else {
            return false;
        };
        self.components
            .get(&component)
            .is_some_and(|per_archetype| per_archetype.contains_key(&record.archetype))
    }

    /// Adds `component` to `entity` as a tag, without a value.
    ///
    /// No-op if the entity already carries the component (with or without
    /// data) or if the handle is dead.
    ///
    /// ## Panics
    /// Panics if the transition would land in an archetype where the
    /// component carries data; a component cannot mix tag and data storage
    /// within one archetype.
    pub fn add_component(&mut self, entity: Entity, component: Component) {
        let Some(record) = self.record(entity) else {
            return;
        };
        if self.slot_in(component, record.archetype).is_some() {
            return;
        }
        let target = self.resolve_add(record.archetype, component, None);
        let row = self.move_rows(record.archetype, target, entity, record.row);
        self.records[entity.id() as usize] = Some(EntityRecord {
            archetype: target,
            row,
        });
    }

    /// Stores a value of `component` on `entity`, adding the component if it
    /// is absent or overwriting the value in place if it is present.
    ///
    /// The first call for a given component binds its payload type to `T`.
    ///
    /// ## Errors
    /// Returns [`TypeMismatchError`] when the component is already bound to
    /// a different payload type. The failure leaves the world unchanged.
    ///
    /// ## Panics
    /// Panics if the entity carries the component as a tag, or if the
    /// transition would land in an archetype storing the component as a tag;
    /// a component cannot mix tag and data storage within one archetype.
    pub fn set_component<T: 'static>(
        &mut self,
        entity: Entity,
        component: Component,
        value: T,
    ) -> Result<(), TypeMismatchError> {
        let Some(record) = self.record(entity) else {
            return Ok(());
        };
        match self.bindings.get(&component) {
            Some(binding) if binding.type_id != TypeId::of::<T>() => {
                return Err(TypeMismatchError {
                    component,
                    expected: binding.type_name,
                    actual: type_name::<T>(),
                });
            }
            Some(_) => {}
            None => {
                self.bindings.insert(component, ColumnBinding::of::<T>());
            }
        }

        match self.slot_in(component, record.archetype) {
            Some(SlotRef::Column(slot)) => {
                let column = self.archetypes[record.archetype as usize].columns[slot]
                    .as_deref_mut()
                    .expect("indexed column slot is empty");
                let values = column
                    .as_mut_slice::<T>()
                    .expect("column diverges from component binding");
                values[record.row as usize] = value;
            }
            Some(SlotRef::Tag) => panic!(
                "component {} entered this archetype as a tag and cannot carry data there",
                component.entity().id()
            ),
            None => {
                let binding = ColumnBinding::of::<T>();
                let target = self.resolve_add(record.archetype, component, Some(&binding));
                let row = self.move_rows(record.archetype, target, entity, record.row);
                // The surviving columns are spliced before the one fresh
                // column is extended, so every populated column stays level
                // with the entity vector.
                let archetype = &mut self.archetypes[target as usize];
                let slot = archetype
                    .slot_of(component)
                    .expect("target archetype lacks the added component");
                let pushed = archetype.columns[slot]
                    .as_mut()
                    .expect("added component has no column in the target archetype")
                    .as_any_mut()
                    .downcast_mut::<Column<T>>()
                    .expect("column diverges from component binding")
                    .push(value);
                debug_assert_eq!(pushed, row);
                self.records[entity.id() as usize] = Some(EntityRecord {
                    archetype: target,
                    row,
                });
            }
        }
        Ok(())
    }

    /// Returns the value of `component` on `entity`, or `None` if the entity
    /// is dead, lacks the component, or carries it as a tag.
    ///
    /// ## Panics
    /// Panics if `T` differs from the component's bound payload type.
    pub fn get_component<T: 'static>(&self, entity: Entity, component: Component) -> Option<&T> {
        let record = self.record(entity)?;
        let slot = self.slot_in(component, record.archetype)?.column()?;
        let column = self.archetypes[record.archetype as usize]
            .column(slot)
            .expect("indexed column slot is empty");
        let values = column.as_slice::<T>().unwrap_or_else(|| {
            panic!(
                "component {} is bound to {}, not {}",
                component.entity().id(),
                column.element_type_name(),
                type_name::<T>()
            )
        });
        values.get(record.row as usize)
    }

    /// Mutable variant of [`get_component`](Self::get_component).
    ///
    /// Writing through the returned handle never moves rows, so it is safe
    /// even while queries are iterating.
    ///
    /// ## Panics
    /// Panics if `T` differs from the component's bound payload type.
    pub fn get_component_mut<T: 'static>(
        &mut self,
        entity: Entity,
        component: Component,
    ) -> Option<&mut T> {
        let record = self.record(entity)?;
        let slot = self.slot_in(component, record.archetype)?.column()?;
        let column = self.archetypes[record.archetype as usize].columns[slot]
            .as_deref_mut()
            .expect("indexed column slot is empty");
        let type_name_bound = column.element_type_name();
        let values = column.as_mut_slice::<T>().unwrap_or_else(|| {
            panic!(
                "component {} is bound to {}, not {}",
                component.entity().id(),
                type_name_bound,
                type_name::<T>()
            )
        });
        values.get_mut(record.row as usize)
    }

    /// Removes `component` from `entity`, discarding its value if it carried
    /// one. No-op if the entity lacks the component or the handle is dead.
    pub fn delete_component(&mut self, entity: Entity, component: Component) {
        let Some(record) = self.record(entity) else {
            return;
        };
        if self.slot_in(component, record.archetype).is_none() {
            return;
        }
        let target = self.resolve_remove(record.archetype, component);
        let row = self.move_rows(record.archetype, target, entity, record.row);
        self.records[entity.id() as usize] = Some(EntityRecord {
            archetype: target,
            row,
        });
    }

    /// Returns `true` if `entity` is alive in this world.
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.record(entity).is_some()
    }

    /// Number of archetypes materialized so far, including the zero
    /// archetype.
    pub fn archetype_count(&self) -> usize {
        self.archetypes.len()
    }

    /// Visits every archetype carrying `component` with a column, passing
    /// the entity vector and the typed column slice.
    ///
    /// ## Panics
    /// Panics if `T` differs from the component's bound payload type.
    pub fn term_iter<T: 'static>(
        &self,
        component: Component,
        mut visitor: impl FnMut(&[Entity], &[T]),
    ) {
        let Some(per_archetype) = self.components.get(&component) else {
            return;
        };
        for (&archetype_id, slot) in per_archetype {
            let Some(slot) = slot.column() else {
                continue;
            };
            let archetype = &self.archetypes[archetype_id as usize];
            let column = archetype.column(slot).expect("indexed column slot is empty");
            let values = column.as_slice::<T>().unwrap_or_else(|| {
                panic!(
                    "component {} is bound to {}, not {}",
                    component.entity().id(),
                    column.element_type_name(),
                    type_name::<T>()
                )
            });
            visitor(archetype.entities(), values);
        }
    }

    /// Renders the component set of `entity` as a human-readable string: the
    /// alphabetically sorted, comma-separated names of its components.
    ///
    /// `name` designates the component whose `String` values hold names.
    /// Components without a name render as `<unnamed(id)>`. A dead handle
    /// renders as the empty string.
    pub fn signature_string(&self, entity: Entity, name: Component) -> String {
        let Some(record) = self.record(entity) else {
            return String::new();
        };
        let mut names: Vec<String> = self.archetypes[record.archetype as usize]
            .signature()
            .iter()
            .map(|&component| match self.get_component::<String>(component.entity(), name) {
                Some(text) => text.clone(),
                None => format!("<unnamed({})>", component.entity().id()),
            })
            .collect();
        names.sort();
        names.join(", ")
    }

    #[inline]
    pub(crate) fn record(&self, entity: Entity) -> Option<EntityRecord> {
        self.records.get(entity.id() as usize).copied().flatten()
    }

    #[inline]
    pub(crate) fn patch_row(&mut self, entity: Entity, row: Row) {
        self.records[entity.id() as usize]
            .as_mut()
            .expect("displaced entity has no record")
            .row = row;
    }

    /// Looks up the slot of `component` within `archetype`, if the archetype
    /// carries it.
    #[inline]
    pub(crate) fn slot_in(&self, component: Component, archetype: ArchetypeId) -> Option<SlotRef> {
        self.components.get(&component)?.get(&archetype).copied()
    }

    #[inline]
    pub(crate) fn archetype(&self, id: ArchetypeId) -> &Archetype {
        &self.archetypes[id as usize]
    }

    #[inline]
    pub(crate) fn archetype_mut(&mut self, id: ArchetypeId) -> &mut Archetype {
        &mut self.archetypes[id as usize]
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
