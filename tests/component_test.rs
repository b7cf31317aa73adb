use archon_ecs::prelude::*;

#[test]
fn add_component_is_visible() {
    let mut world = World::new();
    let position = world.new_component();
    let entity = world.new_entity();

    world.add_component(entity, position);
    assert!(world.has_component(entity, position));

    let other = world.new_component();
    assert!(!world.has_component(entity, other));
}

#[test]
fn add_component_twice_is_idempotent() {
    let mut world = World::new();
    let position = world.new_component();
    let entity = world.new_entity();

    world.add_component(entity, position);
    assert!(world.has_component(entity, position));

    world.add_component(entity, position);
    assert!(world.has_component(entity, position));
}

#[test]
fn add_two_components() {
    let mut world = World::new();
    let position = world.new_component();
    let velocity = world.new_component();
    let entity = world.new_entity();

    world.add_component(entity, position);
    assert!(world.has_component(entity, position));
    assert!(!world.has_component(entity, velocity));

    world.add_component(entity, velocity);
    assert!(world.has_component(entity, position));
    assert!(world.has_component(entity, velocity));
}

#[test]
fn overlapping_additions() {
    let mut world = World::new();
    let position = world.new_component();
    let velocity = world.new_component();
    let mass = world.new_component();
    let entity = world.new_entity();

    world.add_component(entity, position);
    world.add_component(entity, velocity);
    assert!(world.has_component(entity, position));
    assert!(world.has_component(entity, velocity));
    assert!(!world.has_component(entity, mass));

    world.add_component(entity, velocity);
    world.add_component(entity, mass);
    assert!(world.has_component(entity, position));
    assert!(world.has_component(entity, velocity));
    assert!(world.has_component(entity, mass));
}

#[test]
fn set_then_get_roundtrip() {
    let mut world = World::new();
    let health = world.new_component();
    let entity = world.new_entity();

    world.set_component(entity, health, 100i64).unwrap();
    assert_eq!(world.get_component::<i64>(entity, health), Some(&100));

    world.set_component(entity, health, 75i64).unwrap();
    assert_eq!(world.get_component::<i64>(entity, health), Some(&75));

    *world.get_component_mut::<i64>(entity, health).unwrap() -= 25;
    assert_eq!(world.get_component::<i64>(entity, health), Some(&50));
}

#[test]
fn delete_component_clears_value() {
    let mut world = World::new();
    let health = world.new_component();
    let entity = world.new_entity();

    world.set_component(entity, health, 9i32).unwrap();
    world.delete_component(entity, health);

    assert!(!world.has_component(entity, health));
    assert_eq!(world.get_component::<i32>(entity, health), None);

    // Deleting an absent component stays a no-op.
    world.delete_component(entity, health);
    assert!(!world.has_component(entity, health));
}

#[test]
fn payload_binding_is_invariant() {
    let mut world = World::new();
    let score = world.new_component();
    let a = world.new_entity();
    let b = world.new_entity();

    world.set_component(a, score, 3u32).unwrap();

    let rejected = world.set_component(b, score, "three".to_string());
    let error = rejected.unwrap_err();
    assert_eq!(error.component, score);
    assert_eq!(error.expected, "u32");

    // The failed write changed nothing.
    assert!(!world.has_component(b, score));
    assert_eq!(world.get_component::<u32>(a, score), Some(&3));
}

#[test]
fn hundred_component_churn() {
    let mut world = World::new();
    let entity = world.new_entity();

    let components: Vec<Component> = (0..100).map(|_| world.new_component()).collect();
    for (value, &component) in components.iter().enumerate() {
        world.set_component(entity, component, value as i64).unwrap();
    }
    for (value, &component) in components.iter().enumerate() {
        assert_eq!(
            world.get_component::<i64>(entity, component),
            Some(&(value as i64))
        );
    }

    for &component in &components {
        world.delete_component(entity, component);
    }
    for &component in &components {
        assert!(!world.has_component(entity, component));
    }
    assert!(world.is_alive(entity));
}

#[test]
fn signature_string_sorts_names() {
    let mut world = World::new();
    let name = world.new_component();
    world
        .set_component(name.entity(), name, "Name".to_string())
        .unwrap();
    let position = world.new_component();
    world
        .set_component(position.entity(), name, "Position".to_string())
        .unwrap();
    let walking = world.new_component();
    world
        .set_component(walking.entity(), name, "Walking".to_string())
        .unwrap();

    let bob = world.new_entity();
    world.set_component(bob, name, "Bob".to_string()).unwrap();
    world
        .set_component(bob, position, (10.0f64, 20.0f64))
        .unwrap();
    world.set_component(bob, walking, ()).unwrap();

    assert_eq!(world.signature_string(bob, name), "Name, Position, Walking");

    // Unnamed components fall back to a stable synthetic token that sorts
    // ahead of the alphabetic names.
    let anonymous = world.new_component();
    world.add_component(bob, anonymous);
    assert_eq!(
        world.signature_string(bob, name),
        format!(
            "<unnamed({})>, Name, Position, Walking",
            anonymous.entity().id()
        )
    );
}

#[test]
fn typed_world_maps_types_to_components() {
    #[derive(Debug, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }
    #[derive(Debug, PartialEq)]
    struct Velocity {
        dx: f32,
        dy: f32,
    }

    let mut typed = TypedWorld::new();
    let bob = typed.spawn_named("Bob");
    typed.set(bob, Position { x: 1.0, y: 2.0 }).unwrap();
    typed.set(bob, Velocity { dx: 0.5, dy: 0.0 }).unwrap();

    assert!(typed.has::<Position>(bob));
    assert_eq!(typed.get::<Position>(bob), Some(&Position { x: 1.0, y: 2.0 }));
    assert_eq!(typed.name_of(bob), Some(&"Bob".to_string()));
    assert_eq!(typed.type_string(bob), "Name, Position, Velocity");

    typed.get_mut::<Position>(bob).unwrap().x = 3.0;
    assert_eq!(typed.get::<Position>(bob).unwrap().x, 3.0);

    typed.remove::<Velocity>(bob);
    assert!(!typed.has::<Velocity>(bob));
    assert_eq!(typed.type_string(bob), "Name, Position");

    typed.despawn(bob);
    assert!(!typed.world().is_alive(bob));
}
