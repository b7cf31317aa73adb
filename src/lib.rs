//! # archon-ecs
//!
//! Archetype-based entity-component-system world with columnar storage.
//!
//! Entities are opaque, recyclable 64-bit handles. Components are entities
//! promoted to name kinds of data, so components are first-class and can
//! carry components themselves (a human-readable name, typically). Entities
//! sharing the same component set live together in an archetype, which
//! stores values column-major, one dense column per data-bearing component.
//!
//! ## Design goals
//! - Archetype storage for cache-friendly bulk iteration
//! - Lazy payload typing: a component's value type is bound by its first write
//! - Edge-cached transitions between archetypes
//! - Cached query plans kept coherent as the schema grows
//!
//! A world is a single-threaded mutable value; see the module docs of
//! [`engine::world`] for the concurrency and memory model.
//!
//! ## Example
//! ```
//! use archon_ecs::prelude::*;
//!
//! let mut world = World::new();
//! let position = world.new_component();
//! let player = world.new_entity();
//! world.set_component(player, position, (1.0f32, 2.0f32)).unwrap();
//!
//! query_all(&[position]).run(&world, |entities, columns| {
//!     let values = columns[0].unwrap().as_slice::<(f32, f32)>().unwrap();
//!     assert_eq!(entities.len(), values.len());
//! });
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod engine;
pub mod typed;

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports (Public API)
// ─────────────────────────────────────────────────────────────────────────────

pub use engine::archetype::Archetype;

pub use engine::entity::{Component, Entity};

pub use engine::error::TypeMismatchError;

pub use engine::query::{query_all, query_any, CachedQuery, Filter, RowView, Rows};

pub use engine::storage::{AnyColumn, Column};

pub use engine::types::{ArchetypeId, EntityId, Row, SlotRef};

pub use engine::world::World;

pub use typed::TypedWorld;

// ─────────────────────────────────────────────────────────────────────────────
// Prelude
// ─────────────────────────────────────────────────────────────────────────────

/// Commonly used ECS types.
///
/// Import with:
/// ```rust
/// use archon_ecs::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        query_all, query_any, AnyColumn, CachedQuery, Component, Entity, Filter, TypedWorld,
        World,
    };
}
