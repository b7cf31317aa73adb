//! Typed convenience layer over the dynamic world.
//!
//! The core world identifies components by runtime handles. This module
//! maps Rust types to components through [`TypeId`], so callers can write
//! `typed.set(entity, Position { .. })` instead of threading component
//! handles by hand. Each payload type gets one component, created on first
//! use and named after the type.
//!
//! Everything here is a veneer over the public world operations; no core
//! semantics live in this module.

use std::any::{type_name, TypeId};
use std::collections::HashMap;

use crate::engine::entity::{Component, Entity};
use crate::engine::error::TypeMismatchError;
use crate::engine::world::World;

/// Unqualified name of type `T`, used to label auto-created components.
fn short_type_name<T>() -> &'static str {
    let full = type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

/// A world paired with a `TypeId -> Component` registry and a built-in name
/// component.
///
/// The name component is created eagerly and names itself, so
/// [`type_string`](TypedWorld::type_string) renders readable signatures out
/// of the box.
pub struct TypedWorld {
    world: World,
    components: HashMap<TypeId, Component>,
    name: Component,
}

impl TypedWorld {
    /// Creates a world seeded with the name component.
    pub fn new() -> Self {
        let mut world = World::new();
        let name = world.new_component();
        world
            .set_component(name.entity(), name, "Name".to_string())
            .expect("fresh name component rejected its binding");
        Self {
            world,
            components: HashMap::new(),
            name,
        }
    }

    /// The underlying world, for operations this veneer does not wrap.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the underlying world.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The component holding `String` names for entities and components.
    pub fn name_component(&self) -> Component {
        self.name
    }

    /// Returns the component registered for type `T`, creating and naming it
    /// on first use.
    pub fn component_for<T: 'static>(&mut self) -> Component {
        if let Some(&component) = self.components.get(&TypeId::of::<T>()) {
            return component;
        }
        let component = self.world.new_component();
        self.world
            .set_component(component.entity(), self.name, short_type_name::<T>().to_string())
            .expect("name component rejected a string");
        self.components.insert(TypeId::of::<T>(), component);
        component
    }

    /// Creates a new entity with no components.
    pub fn spawn(&mut self) -> Entity {
        self.world.new_entity()
    }

    /// Creates a new entity carrying the given name.
    pub fn spawn_named(&mut self, name: &str) -> Entity {
        let entity = self.world.new_entity();
        self.world
            .set_component(entity, self.name, name.to_string())
            .expect("name component rejected a string");
        entity
    }

    /// Deletes an entity.
    pub fn despawn(&mut self, entity: Entity) {
        self.world.delete_entity(entity);
    }

    /// Stores a value of type `T` on the entity, adding or overwriting the
    /// type's component.
    pub fn set<T: 'static>(&mut self, entity: Entity, value: T) -> Result<(), TypeMismatchError> {
        let component = self.component_for::<T>();
        self.world.set_component(entity, component, value)
    }

    /// Reads the value of type `T` on the entity, if present.
    pub fn get<T: 'static>(&self, entity: Entity) -> Option<&T> {
        let component = self.components.get(&TypeId::of::<T>())?;
        self.world.get_component::<T>(entity, *component)
    }

    /// Mutable variant of [`get`](TypedWorld::get).
    pub fn get_mut<T: 'static>(&mut self, entity: Entity) -> Option<&mut T> {
        let component = *self.components.get(&TypeId::of::<T>())?;
        self.world.get_component_mut::<T>(entity, component)
    }

    /// Returns `true` if the entity carries a value of type `T`.
    pub fn has<T: 'static>(&self, entity: Entity) -> bool {
        self.components
            .get(&TypeId::of::<T>())
            .is_some_and(|&component| self.world.has_component(entity, component))
    }

    /// Removes the value of type `T` from the entity, if present.
    pub fn remove<T: 'static>(&mut self, entity: Entity) {
        if let Some(&component) = self.components.get(&TypeId::of::<T>()) {
            self.world.delete_component(entity, component);
        }
    }

    /// The entity's name, if one was set.
    pub fn name_of(&self, entity: Entity) -> Option<&String> {
        self.world.get_component::<String>(entity, self.name)
    }

    /// Human-readable signature of the entity's archetype.
    pub fn type_string(&self, entity: Entity) -> String {
        self.world.signature_string(entity, self.name)
    }
}

impl Default for TypedWorld {
    fn default() -> Self {
        Self::new()
    }
}
