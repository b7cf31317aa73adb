//! # Query engine
//!
//! A filter is a pure predicate over archetypes: given a world and an
//! archetype it either fails or yields the list of column slots to project.
//! Two predicates are built in: [`query_all`] requires every term,
//! [`query_any`] at least one.
//!
//! ## Execution modes
//! 1. **Ad-hoc** — [`Filter::run`] evaluates the predicate against every
//!    archetype in the world, reusing scratch buffers across archetypes, and
//!    invokes the visitor per match.
//! 2. **Cached plan** — [`Filter::cache`] materializes the matches once and
//!    registers the plan with the world; archetype creation re-evaluates the
//!    predicate against the new archetype only and appends on match, so the
//!    plan stays coherent under schema growth. Composition changes of
//!    existing entities never require plan updates: plans index archetypes,
//!    not entities, and archetypes are never destroyed.
//! 3. **Per-entity iteration** — [`Filter::iter`] / [`CachedQuery::iter`]
//!    yield one [`RowView`] per matching entity.
//!
//! ## Projection shape
//! An ALL projection lists the slot of every data-bearing term in input
//! order, skipping tags. An ANY projection is positional: one entry per
//! term, `None` where the term is absent or a tag, preserving the
//! correspondence between inputs and outputs.
//!
//! ## Iteration order
//! Unspecified beyond this: within an archetype the visitor sees entities
//! and columns in the archetype's current internal order, which is stable
//! under unrelated mutations because swap-remove only relocates the last
//! row.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;

use crate::engine::entity::{Component, Entity};
use crate::engine::storage::AnyColumn;
use crate::engine::types::{ArchetypeId, Row, SlotRef};
use crate::engine::world::World;

/// Builds a filter matching archetypes that carry **all** of `components`.
pub fn query_all(components: &[Component]) -> Filter {
    Filter {
        mode: Mode::All,
        terms: components.into(),
    }
}

/// Builds a filter matching archetypes that carry **at least one** of
/// `components`.
pub fn query_any(components: &[Component]) -> Filter {
    Filter {
        mode: Mode::Any,
        terms: components.into(),
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Mode {
    All,
    Any,
}

/// A set-predicate over archetypes with a column projection.
///
/// Construct with [`query_all`] or [`query_any`], then execute ad hoc with
/// [`run`](Filter::run) or compile with [`cache`](Filter::cache).
#[derive(Clone)]
pub struct Filter {
    mode: Mode,
    terms: Box<[Component]>,
}

impl Filter {
    /// Evaluates the predicate against one archetype, filling `out` with the
    /// slot projection on success. `out` is cleared first so callers can
    /// reuse it across archetypes.
    fn evaluate(&self, world: &World, archetype: ArchetypeId, out: &mut Vec<Option<usize>>) -> bool {
        out.clear();
        match self.mode {
            Mode::All => {
                for &term in self.terms.iter() {
                    match world.slot_in(term, archetype) {
                        Some(SlotRef::Column(slot)) => out.push(Some(slot)),
                        // Tags contribute to the match but project nothing.
                        Some(SlotRef::Tag) => {}
                        None => return false,
                    }
                }
                true
            }
            Mode::Any => {
                let mut pass = false;
                for &term in self.terms.iter() {
                    match world.slot_in(term, archetype) {
                        Some(SlotRef::Column(slot)) => {
                            pass = true;
                            out.push(Some(slot));
                        }
                        Some(SlotRef::Tag) => {
                            pass = true;
                            out.push(None);
                        }
                        None => out.push(None),
                    }
                }
                pass
            }
        }
    }

    /// Evaluates the predicate against one archetype, returning an owned
    /// projection on success.
    fn matches(&self, world: &World, archetype: ArchetypeId) -> Option<Rc<[Option<usize>]>> {
        let mut out = Vec::new();
        if self.evaluate(world, archetype, &mut out) {
            Some(out.into())
        } else {
            None
        }
    }

    /// Runs the filter over every archetype in the world.
    ///
    /// The visitor receives the matched archetype's entity vector and one
    /// borrowed column handle per projected slot (`None` entries appear only
    /// in ANY projections).
    pub fn run(
        &self,
        world: &World,
        mut visitor: impl FnMut(&[Entity], &[Option<&dyn AnyColumn>]),
    ) {
        let mut slots: Vec<Option<usize>> = Vec::new();
        let mut projected: Vec<Option<&dyn AnyColumn>> = Vec::new();
        for id in 0..world.archetype_count() as ArchetypeId {
            if !self.evaluate(world, id, &mut slots) {
                continue;
            }
            let archetype = world.archetype(id);
            projected.clear();
            projected.extend(slots.iter().map(|slot| slot.and_then(|s| archetype.column(s))));
            visitor(archetype.entities(), &projected);
        }
    }

    /// Like [`run`](Filter::run), with mutable column handles so the visitor
    /// can write component values in place.
    ///
    /// Value writes never move rows; composition changes remain off-limits
    /// during iteration and are unrepresentable here because the world is
    /// exclusively borrowed.
    pub fn run_mut(
        &self,
        world: &mut World,
        mut visitor: impl FnMut(&[Entity], &mut [Option<&mut dyn AnyColumn>]),
    ) {
        let mut slots: Vec<Option<usize>> = Vec::new();
        for id in 0..world.archetype_count() as ArchetypeId {
            if !self.evaluate(world, id, &mut slots) {
                continue;
            }
            let archetype = world.archetype_mut(id);
            let mut by_slot: Vec<Option<&mut dyn AnyColumn>> = archetype
                .columns
                .iter_mut()
                .map(|column| column.as_deref_mut())
                .collect();
            let mut projected: Vec<Option<&mut dyn AnyColumn>> = slots
                .iter()
                .map(|slot| slot.and_then(|s| by_slot[s].take()))
                .collect();
            visitor(&archetype.entities, &mut projected);
        }
    }

    /// Yields one [`RowView`] per entity in every matching archetype.
    pub fn iter<'w>(&self, world: &'w World) -> Rows<'w> {
        let mut matches = Vec::new();
        for id in 0..world.archetype_count() as ArchetypeId {
            if let Some(slots) = self.matches(world, id) {
                matches.push((id, slots));
            }
        }
        Rows {
            world,
            matches,
            cursor: 0,
            row: 0,
        }
    }

    /// Compiles the filter into a cached plan and registers it with the
    /// world.
    ///
    /// The plan scans the current archetypes once; afterwards the world
    /// offers every newly created archetype to the plan, so re-running it
    /// always reflects the live schema without re-evaluating the predicate
    /// over old archetypes.
    pub fn cache(&self, world: &mut World) -> CachedQuery {
        let mut matches = Vec::new();
        for id in 0..world.archetype_count() as ArchetypeId {
            if let Some(slots) = self.matches(world, id) {
                matches.push((id, slots));
            }
        }
        let inner = Rc::new(RefCell::new(PlanInner {
            filter: self.clone(),
            matches,
            slot: world.plans.len(),
        }));
        world.plans.push(Rc::clone(&inner));
        trace!(plans = world.plans.len(), "cached query registered");
        CachedQuery { inner }
    }
}

/// Shared state of one cached plan: the filter plus the materialized
/// (archetype, projection) pairs, and the plan's own index in the world's
/// registry.
pub(crate) struct PlanInner {
    filter: Filter,
    matches: Vec<(ArchetypeId, Rc<[Option<usize>]>)>,
    pub(crate) slot: usize,
}

impl PlanInner {
    /// Re-evaluates the filter against a newly created archetype, extending
    /// the plan on match.
    pub(crate) fn offer(&mut self, world: &World, archetype: ArchetypeId) {
        if let Some(slots) = self.filter.matches(world, archetype) {
            self.matches.push((archetype, slots));
        }
    }
}

/// A compiled, world-registered query plan.
///
/// Running the plan iterates its materialized match list without
/// re-evaluating the predicate. The world keeps the plan coherent by
/// offering it every archetype created after compilation. Call
/// [`free`](CachedQuery::free) to deregister.
pub struct CachedQuery {
    inner: Rc<RefCell<PlanInner>>,
}

impl CachedQuery {
    /// Runs the plan. The visitor contract matches [`Filter::run`].
    pub fn run(
        &self,
        world: &World,
        mut visitor: impl FnMut(&[Entity], &[Option<&dyn AnyColumn>]),
    ) {
        let inner = self.inner.borrow();
        let mut projected: Vec<Option<&dyn AnyColumn>> = Vec::new();
        for (id, slots) in &inner.matches {
            let archetype = world.archetype(*id);
            projected.clear();
            projected.extend(slots.iter().map(|slot| slot.and_then(|s| archetype.column(s))));
            visitor(archetype.entities(), &projected);
        }
    }

    /// Runs the plan with mutable column handles, as [`Filter::run_mut`].
    pub fn run_mut(
        &self,
        world: &mut World,
        mut visitor: impl FnMut(&[Entity], &mut [Option<&mut dyn AnyColumn>]),
    ) {
        let inner = self.inner.borrow();
        for (id, slots) in &inner.matches {
            let archetype = world.archetype_mut(*id);
            let mut by_slot: Vec<Option<&mut dyn AnyColumn>> = archetype
                .columns
                .iter_mut()
                .map(|column| column.as_deref_mut())
                .collect();
            let mut projected: Vec<Option<&mut dyn AnyColumn>> = slots
                .iter()
                .map(|slot| slot.and_then(|s| by_slot[s].take()))
                .collect();
            visitor(&archetype.entities, &mut projected);
        }
    }

    /// Yields one [`RowView`] per entity currently matched by the plan.
    pub fn iter<'w>(&self, world: &'w World) -> Rows<'w> {
        Rows {
            world,
            matches: self.inner.borrow().matches.clone(),
            cursor: 0,
            row: 0,
        }
    }

    /// Deregisters the plan from the world.
    ///
    /// The registry removes the plan by swap-remove and fixes up the
    /// relocated plan's stored index.
    pub fn free(self, world: &mut World) {
        let slot = self.inner.borrow().slot;
        world.plans.swap_remove(slot);
        if slot < world.plans.len() {
            world.plans[slot].borrow_mut().slot = slot;
        }
        trace!(plans = world.plans.len(), "cached query released");
    }
}

/// Lazy per-entity iterator over a filter's or plan's matches.
pub struct Rows<'w> {
    world: &'w World,
    matches: Vec<(ArchetypeId, Rc<[Option<usize>]>)>,
    cursor: usize,
    row: usize,
}

impl<'w> Iterator for Rows<'w> {
    type Item = RowView<'w>;

    fn next(&mut self) -> Option<RowView<'w>> {
        loop {
            let (id, slots) = self.matches.get(self.cursor)?;
            let archetype = self.world.archetype(*id);
            if self.row < archetype.len() {
                let view = RowView {
                    world: self.world,
                    entity: archetype.entities()[self.row],
                    archetype: *id,
                    slots: Rc::clone(slots),
                    row: self.row as Row,
                };
                self.row += 1;
                return Some(view);
            }
            self.cursor += 1;
            self.row = 0;
        }
    }
}

/// One entity's row within a query match, with typed access to the
/// projected columns.
pub struct RowView<'w> {
    world: &'w World,
    entity: Entity,
    archetype: ArchetypeId,
    slots: Rc<[Option<usize>]>,
    row: Row,
}

impl<'w> RowView<'w> {
    /// The entity this row belongs to.
    #[inline]
    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// Number of projected terms.
    #[inline]
    pub fn width(&self) -> usize {
        self.slots.len()
    }

    /// The value of projected term `term` for this entity, or `None` when
    /// the term is absent, a tag, or bound to a different payload type.
    pub fn get<T: 'static>(&self, term: usize) -> Option<&'w T> {
        let slot = (*self.slots.get(term)?)?;
        let column = self.world.archetype(self.archetype).column(slot)?;
        column.as_slice::<T>()?.get(self.row as usize)
    }
}
