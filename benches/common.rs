#![allow(dead_code)]

use archon_ecs::prelude::*;

pub const AGENTS: usize = 10_000;

/// Fresh world with `n` data components, none bound yet.
pub fn world_with_components(n: usize) -> (World, Vec<Component>) {
    let mut world = World::new();
    let components = (0..n).map(|_| world.new_component()).collect();
    (world, components)
}

/// Spawns `agents` entities carrying a `u64` value for every component.
pub fn populate(world: &mut World, components: &[Component], agents: usize) -> Vec<Entity> {
    (0..agents)
        .map(|i| {
            let entity = world.new_entity();
            for (k, &component) in components.iter().enumerate() {
                world
                    .set_component(entity, component, (i + k) as u64)
                    .unwrap();
            }
            entity
        })
        .collect()
}
