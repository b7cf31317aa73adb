use std::collections::HashSet;

use archon_ecs::prelude::*;

#[test]
fn create_and_delete_entities() {
    let mut world = World::new();

    let entities: Vec<Entity> = (0..100).map(|_| world.new_entity()).collect();
    for &entity in &entities {
        assert!(world.is_alive(entity));
    }

    for &entity in &entities {
        world.delete_entity(entity);
    }
    for &entity in &entities {
        assert!(!world.is_alive(entity));
    }
}

#[test]
fn deleted_ids_are_recycled() {
    let mut world = World::new();

    let first: Vec<Entity> = (0..10).map(|_| world.new_entity()).collect();
    let issued: HashSet<u64> = first.iter().map(|e| e.id()).collect();

    for &entity in &first {
        world.delete_entity(entity);
    }

    // The freelist is LIFO: the first identifier handed back out is the one
    // released last.
    let reborn = world.new_entity();
    assert_eq!(reborn.id(), first[9].id());

    let second: Vec<Entity> = (0..9).map(|_| world.new_entity()).collect();
    for entity in &second {
        assert!(
            issued.contains(&entity.id()),
            "expected a recycled identifier, got {}",
            entity.id()
        );
    }
}

#[test]
fn counter_does_not_advance_past_churn() {
    let mut world = World::new();

    let batch: Vec<Entity> = (0..50).map(|_| world.new_entity()).collect();
    for &entity in &batch {
        world.delete_entity(entity);
    }

    // Creating the same number again must reuse the freed identifiers
    // instead of advancing the counter.
    for _ in 0..50 {
        assert!(world.new_entity().id() < 50);
    }
}

#[test]
fn swap_remove_patches_displaced_rows() {
    let mut world = World::new();
    let value = world.new_component();

    let entities: Vec<Entity> = (0..5).map(|_| world.new_entity()).collect();
    for (i, &entity) in entities.iter().enumerate() {
        world.set_component(entity, value, i as i32).unwrap();
    }

    // Deleting the first entity swaps the last row into its place; every
    // surviving entity must keep its own value.
    world.delete_entity(entities[0]);
    for (i, &entity) in entities.iter().enumerate().skip(1) {
        assert_eq!(world.get_component::<i32>(entity, value), Some(&(i as i32)));
    }

    // Same discipline when a transition vacates a middle row.
    world.delete_component(entities[2], value);
    assert_eq!(world.get_component::<i32>(entities[2], value), None);
    for i in [1usize, 3, 4] {
        assert_eq!(
            world.get_component::<i32>(entities[i], value),
            Some(&(i as i32))
        );
    }
}

#[test]
fn dead_handles_are_ignored() {
    let mut world = World::new();
    let component = world.new_component();
    let entity = world.new_entity();

    world.delete_entity(entity);
    world.delete_entity(entity);

    world.add_component(entity, component);
    assert!(!world.has_component(entity, component));
    assert!(world.set_component(entity, component, 1i32).is_ok());
    assert_eq!(world.get_component::<i32>(entity, component), None);
    world.delete_component(entity, component);
}
