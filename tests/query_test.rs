use archon_ecs::prelude::*;

/// Ten entities; `c1 = i` on the first five, `c2 = i + 3` on `e3..e7`.
///
/// Layout:
/// ```text
/// entity:[0 1 2 3 4 5 6 7 8 9]
/// c1:    [0 1 2 3 4          ]
/// c2:    [      3 4 5 6      ]
/// c1&c2: [      3 4          ]
/// ```
fn overlapping_world() -> (World, Vec<Entity>, Component, Component) {
    let mut world = World::new();
    let entities: Vec<Entity> = (0..10).map(|_| world.new_entity()).collect();
    let c1 = world.new_component();
    let c2 = world.new_component();
    for (i, &entity) in entities[..5].iter().enumerate() {
        world.set_component(entity, c1, i as i32).unwrap();
    }
    for (i, &entity) in entities[3..7].iter().enumerate() {
        world.set_component(entity, c2, (i + 3) as i32).unwrap();
    }
    (world, entities, c1, c2)
}

#[test]
fn query_all_matches_intersection() {
    let (world, entities, c1, c2) = overlapping_world();

    let mut archetypes = 0;
    let mut rows: Vec<(Entity, i32, i32)> = Vec::new();
    query_all(&[c1, c2]).run(&world, |matched, columns| {
        archetypes += 1;
        let a = columns[0].unwrap().as_slice::<i32>().unwrap();
        let b = columns[1].unwrap().as_slice::<i32>().unwrap();
        for (i, &entity) in matched.iter().enumerate() {
            rows.push((entity, a[i], b[i]));
        }
    });

    assert_eq!(archetypes, 1);
    rows.sort_by_key(|&(entity, _, _)| entity.id());
    assert_eq!(rows, vec![(entities[3], 3, 3), (entities[4], 4, 4)]);
}

#[test]
fn query_any_matches_union() {
    let (world, entities, c1, c2) = overlapping_world();

    let mut groups: Vec<(Vec<Entity>, bool, bool)> = Vec::new();
    query_any(&[c1, c2]).run(&world, |matched, columns| {
        groups.push((matched.to_vec(), columns[0].is_some(), columns[1].is_some()));
    });
    assert_eq!(groups.len(), 3);

    let mut union: Vec<Entity> = groups
        .iter()
        .flat_map(|(members, _, _)| members.clone())
        .collect();
    union.sort_by_key(|entity| entity.id());
    assert_eq!(union, entities[..7].to_vec());

    for (members, has_c1, has_c2) in &groups {
        let mut members = members.clone();
        members.sort_by_key(|entity| entity.id());
        match (has_c1, has_c2) {
            (true, false) => assert_eq!(members, entities[..3].to_vec()),
            (true, true) => assert_eq!(members, entities[3..5].to_vec()),
            (false, true) => assert_eq!(members, entities[5..7].to_vec()),
            (false, false) => panic!("archetype matched with neither column"),
        }
    }
}

#[test]
fn per_entity_iteration_yields_matching_rows() {
    let (world, entities, c1, c2) = overlapping_world();

    let mut rows: Vec<(Entity, i32, i32)> = query_all(&[c1, c2])
        .iter(&world)
        .map(|row| {
            (
                row.entity(),
                *row.get::<i32>(0).unwrap(),
                *row.get::<i32>(1).unwrap(),
            )
        })
        .collect();
    rows.sort_by_key(|&(entity, _, _)| entity.id());
    assert_eq!(rows, vec![(entities[3], 3, 3), (entities[4], 4, 4)]);
}

#[test]
fn per_entity_iteration_marks_absent_terms() {
    let (world, entities, c1, c2) = overlapping_world();

    let mut visited = 0;
    for row in query_any(&[c1, c2]).iter(&world) {
        visited += 1;
        let index = entities
            .iter()
            .position(|&entity| entity == row.entity())
            .unwrap();
        assert_eq!(row.width(), 2);
        assert_eq!(row.get::<i32>(0).is_some(), index < 5);
        assert_eq!(row.get::<i32>(1).is_some(), (3..7).contains(&index));
    }
    assert_eq!(visited, 7);
}

#[test]
fn all_projection_skips_tag_components() {
    let mut world = World::new();
    let tag = world.new_component();
    let value = world.new_component();
    let entity = world.new_entity();

    world.add_component(entity, tag);
    world.set_component(entity, value, 7u64).unwrap();

    let mut visits = 0;
    query_all(&[tag, value]).run(&world, |matched, columns| {
        visits += 1;
        assert_eq!(matched.to_vec(), vec![entity]);
        // The tag contributes to the match but projects no column.
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].unwrap().as_slice::<u64>().unwrap(), &[7]);
    });
    assert_eq!(visits, 1);
}

#[test]
fn run_mut_writes_values_in_place() {
    let (mut world, entities, c1, _) = overlapping_world();

    query_all(&[c1]).run_mut(&mut world, |_, columns| {
        for value in columns[0].as_mut().unwrap().as_mut_slice::<i32>().unwrap() {
            *value += 100;
        }
    });

    assert_eq!(world.get_component::<i32>(entities[0], c1), Some(&100));
    assert_eq!(world.get_component::<i32>(entities[4], c1), Some(&104));
}

#[test]
fn term_iter_visits_every_column() {
    let (world, _, c1, _) = overlapping_world();

    let mut count = 0;
    let mut total = 0;
    world.term_iter::<i32>(c1, |entities, values| {
        assert_eq!(entities.len(), values.len());
        count += values.len();
        total += values.iter().sum::<i32>();
    });

    assert_eq!(count, 5);
    assert_eq!(total, 0 + 1 + 2 + 3 + 4);
}
