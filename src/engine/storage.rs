//! # Type-erased columnar storage
//!
//! A column is a dense, growable vector of values of a single payload type,
//! stored behind the type-erased [`AnyColumn`] capability so archetypes can
//! hold heterogeneous columns in one array. One generic implementation,
//! [`Column<T>`], is instantiated per payload type.
//!
//! ## Capabilities
//! The erased surface is deliberately small: length, payload type identity,
//! swap-remove, and moving one row out of another column of the same payload
//! type. Typed access happens at the boundaries: the world downcasts when
//! it knows the payload type, and queries expose typed slices through
//! [`as_slice`](AnyColumn::as_slice).
//!
//! ## Deletion discipline
//! Rows are removed by swap-remove: the last row overwrites the removed row
//! and the column shrinks by one. This keeps deletion O(1) and leaves every
//! unrelated row's index untouched; only the row that happened to be last
//! moves. Capacity is never released; columns shrink in length only, which
//! bounds allocator traffic during churn.

use std::any::{type_name, Any, TypeId};

use crate::engine::types::Row;

/// Type-erased capability surface of one component column.
///
/// Implemented by [`Column<T>`] for every payload type `T`. Callers that
/// know the payload type recover it through [`as_any`](AnyColumn::as_any) /
/// [`as_any_mut`](AnyColumn::as_any_mut) or the typed-slice helpers on
/// `dyn AnyColumn`.
pub trait AnyColumn: Any {
    /// Number of values currently stored.
    fn len(&self) -> usize;

    /// Returns `true` if the column holds no values.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `TypeId` of the payload type.
    fn element_type_id(&self) -> TypeId;

    /// Human-readable payload type name, for diagnostics.
    fn element_type_name(&self) -> &'static str;

    /// Upcast for typed downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for typed downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Overwrites `row` with the last value and shrinks the column by one.
    ///
    /// ## Panics
    /// Panics if `row` is past the end of the column.
    fn swap_remove(&mut self, row: Row);

    /// Moves `source[source_row]` out of `source` and appends it to `self`,
    /// returning the new row index. The vacated source row is backfilled by
    /// the source's last value, exactly as in [`swap_remove`](Self::swap_remove).
    ///
    /// ## Panics
    /// Panics if the two columns bind different payload types, or if
    /// `source_row` is past the end of `source`. Callers guarantee both.
    fn move_from(&mut self, source: &mut dyn AnyColumn, source_row: Row) -> Row;
}

impl dyn AnyColumn {
    /// Returns the column's values as a typed slice, or `None` if the column
    /// binds a different payload type.
    #[inline]
    pub fn as_slice<T: 'static>(&self) -> Option<&[T]> {
        self.as_any().downcast_ref::<Column<T>>().map(Column::values)
    }

    /// Mutable variant of [`as_slice`](Self::as_slice).
    #[inline]
    pub fn as_mut_slice<T: 'static>(&mut self) -> Option<&mut [T]> {
        self.as_any_mut()
            .downcast_mut::<Column<T>>()
            .map(Column::values_mut)
    }
}

/// Dense vector of payload values for one component within one archetype.
///
/// Parallel to the archetype's entity vector: `values[row]` belongs to
/// `entities[row]`. Values are plain data owned by the column; moving an
/// entity between archetypes moves its value between the corresponding
/// columns.
pub struct Column<T: 'static> {
    values: Vec<T>,
}

impl<T: 'static> Column<T> {
    /// Creates an empty column.
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Appends a value, returning its row index.
    #[inline]
    pub fn push(&mut self, value: T) -> Row {
        self.values.push(value);
        (self.values.len() - 1) as Row
    }

    /// Returns the value at `row`, if in bounds.
    #[inline]
    pub fn get(&self, row: Row) -> Option<&T> {
        self.values.get(row as usize)
    }

    /// Returns the value at `row` mutably, if in bounds.
    #[inline]
    pub fn get_mut(&mut self, row: Row) -> Option<&mut T> {
        self.values.get_mut(row as usize)
    }

    /// All values, in row order.
    #[inline]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// All values mutably, in row order.
    #[inline]
    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.values
    }
}

impl<T: 'static> Default for Column<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> AnyColumn for Column<T> {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn element_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn element_type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn swap_remove(&mut self, row: Row) {
        self.values.swap_remove(row as usize);
    }

    fn move_from(&mut self, source: &mut dyn AnyColumn, source_row: Row) -> Row {
        let source = source
            .as_any_mut()
            .downcast_mut::<Column<T>>()
            .expect("columns bind different payload types");
        let value = source.values.swap_remove(source_row as usize);
        self.push(value)
    }
}

/// Constructs an empty column for payload type `T`.
///
/// Stored as the factory in a [`ColumnBinding`] so archetype creation can
/// allocate columns for a component without naming the payload type.
fn new_column<T: 'static>() -> Box<dyn AnyColumn> {
    Box::new(Column::<T>::new())
}

/// Payload type bound to a component.
///
/// Recorded by the world the first time a value of the component is stored.
/// The binding is append-only: once set, every archetype column for the
/// component uses the same payload type, and every later write must match.
pub(crate) struct ColumnBinding {
    /// Runtime identity of the bound payload type.
    pub(crate) type_id: TypeId,

    /// Payload type name, for diagnostics.
    pub(crate) type_name: &'static str,

    /// Allocates an empty column of the bound type.
    pub(crate) make: fn() -> Box<dyn AnyColumn>,
}

impl ColumnBinding {
    /// Builds the binding for payload type `T`.
    pub(crate) fn of<T: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            make: new_column::<T>,
        }
    }
}
