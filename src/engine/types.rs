//! Core numeric identifiers shared across the engine.
//!
//! Every ECS concept is addressed by a small, copyable numeric value:
//! entities by a 64-bit identifier, archetypes and rows by indices into
//! world-owned vectors. Keeping the aliases in one place makes the width of
//! each index explicit at every call site.

/// Raw 64-bit entity identifier. Recyclable via the world's freelist.
pub type EntityId = u64;

/// Index of an archetype within the world's archetype table.
pub type ArchetypeId = u32;

/// Row index within an archetype's entity vector and columns.
pub type Row = u32;

/// Location of a component within one archetype's storage.
///
/// The per-component inverted index maps each archetype either to the slot
/// holding the component's column, or to [`SlotRef::Tag`] when the archetype
/// carries the component as a tag with no payload column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotRef {
    /// The component occupies a payload column at this slot index.
    Column(usize),

    /// The component is present as a tag; the slot has no column.
    Tag,
}

impl SlotRef {
    /// Returns the column slot index, or `None` for tags.
    #[inline]
    pub fn column(self) -> Option<usize> {
        match self {
            SlotRef::Column(slot) => Some(slot),
            SlotRef::Tag => None,
        }
    }
}
