//! Error types for component storage operations.
//!
//! The engine has exactly one recoverable failure mode: writing a component
//! value whose type differs from the payload type the component was bound to
//! on its first write. Everything else is either a total no-op on absence
//! (missing components, dead entity handles) or a programmer error that
//! fails fast with a panic.
//!
//! ## Display vs. Debug
//! * [`std::fmt::Display`] is optimized for operator logs (short, imperative
//!   phrasing, human-readable type names).
//! * [`std::fmt::Debug`] (derived) retains full structure for diagnostics.

use std::fmt;

use crate::engine::entity::Component;

/// Returned when a component write provides a value whose type does not
/// match the payload type previously bound to the component.
///
/// A component's payload type is bound lazily by the first
/// [`set_component`](crate::engine::world::World::set_component) call; every
/// later write must use the same type. The failure happens before any state
/// changes, so the world is left exactly as it was.
///
/// ### Fields
/// * `component` — The component whose binding was violated.
/// * `expected` — Type name recorded when the component was first bound.
/// * `actual` — Type name of the rejected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeMismatchError {
    /// Component whose payload binding was violated.
    pub component: Component,

    /// Type name the component is bound to.
    pub expected: &'static str,

    /// Type name of the value the caller provided.
    pub actual: &'static str,
}

impl fmt::Display for TypeMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "payload type mismatch for component {}: bound to {}, got {}",
            self.component.entity().id(),
            self.expected,
            self.actual
        )
    }
}

impl std::error::Error for TypeMismatchError {}
