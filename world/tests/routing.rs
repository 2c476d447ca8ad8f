use std::time::Duration;

use bastion_defence_core::{
    CellCoord, Command, EnemyKind, EnemyStats, Event, StructureKind, UNREACHABLE,
};
use bastion_defence_world::{self as world, query, World};
use glam::Vec2;

const DT: Duration = Duration::from_nanos(16_666_667);

fn run(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn wall(world: &mut World, cell: CellCoord) {
    let _ = run(
        world,
        Command::PlaceOrUpgrade {
            kind: StructureKind::Wall,
            cell,
        },
    );
}

fn enemy_position(world: &World) -> Vec2 {
    query::enemy_view(world)
        .iter()
        .next()
        .map(|enemy| enemy.position)
        .expect("an enemy is alive")
}

#[test]
fn open_grid_distances_match_manhattan_distance() {
    let world = World::new();
    let base = query::base_cell(&world);
    let field = query::flow_field(&world);

    for column in 0..20 {
        for row in 0..12 {
            let cell = CellCoord::new(column, row);
            let manhattan = column.abs_diff(base.column()) + row.abs_diff(base.row());
            let expected = u16::try_from(manhattan).expect("small grid");
            assert_eq!(field.distance(cell), Some(expected));
        }
    }
}

#[test]
fn walls_are_unreachable_and_lengthen_routes() {
    let mut world = World::new();
    for row in 0..12 {
        if row != 0 {
            wall(&mut world, CellCoord::new(8, row));
        }
    }

    let field = query::flow_field(&world);
    assert_eq!(field.distance(CellCoord::new(8, 5)), Some(UNREACHABLE));
    assert_eq!(field.distance(CellCoord::new(8, 0)), Some(8));
    assert_eq!(field.distance(CellCoord::new(7, 6)), Some(15));
}

#[test]
fn removing_a_wall_reconnects_an_enclosed_cell() {
    let mut world = World::new();
    wall(&mut world, CellCoord::new(1, 0));
    wall(&mut world, CellCoord::new(0, 1));
    assert!(!query::flow_field(&world).is_reachable(CellCoord::new(0, 0)));

    let events = run(
        &mut world,
        Command::RemoveStructure {
            cell: CellCoord::new(1, 0),
        },
    );

    assert!(events
        .iter()
        .any(|event| matches!(event, Event::FlowFieldRecomputed { .. })));
    let field = query::flow_field(&world);
    assert!(field.is_reachable(CellCoord::new(0, 0)));
    assert_eq!(field.distance(CellCoord::new(0, 0)), Some(16));
}

#[test]
fn enemies_follow_the_flow_field_one_speed_step_per_tick() {
    let mut world = World::new();
    let _ = run(
        &mut world,
        Command::SpawnEnemy {
            kind: EnemyKind::Grunt,
            cell: CellCoord::new(0, 6),
            stats: EnemyStats::new(30.0, 2.0, 10.0),
        },
    );

    let _ = run(&mut world, Command::AdvanceEnemies { dt: DT });

    let position = enemy_position(&world);
    assert!((position.x - 22.0).abs() < 1e-3);
    assert!((position.y - 260.0).abs() < 1e-3);
    assert_eq!(query::next_step(&world, CellCoord::new(0, 6)), CellCoord::new(1, 6));
}

#[test]
fn walled_in_enemies_head_for_the_nearest_blocker() {
    let mut world = World::new();
    wall(&mut world, CellCoord::new(1, 0));
    wall(&mut world, CellCoord::new(0, 1));
    let _ = run(
        &mut world,
        Command::SpawnEnemy {
            kind: EnemyKind::Grunt,
            cell: CellCoord::new(0, 0),
            stats: EnemyStats::new(30.0, 1.0, 10.0),
        },
    );

    let _ = run(&mut world, Command::AdvanceEnemies { dt: DT });

    let position = enemy_position(&world);
    assert!((position.x - 20.0).abs() < 1e-3);
    assert!((position.y - 21.0).abs() < 1e-3);
}

#[test]
fn slowed_enemies_cover_less_ground() {
    let mut world = World::new();
    let tesla = CellCoord::new(0, 4);
    let _ = run(
        &mut world,
        Command::PlaceOrUpgrade {
            kind: StructureKind::Tesla,
            cell: tesla,
        },
    );
    let structure = query::structure_at(&world, tesla).expect("tesla").id;
    let spawned = run(
        &mut world,
        Command::SpawnEnemy {
            kind: EnemyKind::Grunt,
            cell: CellCoord::new(0, 6),
            stats: EnemyStats::new(100.0, 2.0, 10.0),
        },
    );
    let Some(Event::EnemySpawned { enemy, .. }) = spawned.first() else {
        panic!("enemy spawned");
    };
    let _ = run(
        &mut world,
        Command::FireChain {
            structure,
            targets: vec![*enemy],
        },
    );
    for _ in 0..10 {
        let _ = run(&mut world, Command::AdvanceProjectiles { dt: DT });
    }

    let before = enemy_position(&world);
    let _ = run(&mut world, Command::AdvanceEnemies { dt: DT });
    let after = enemy_position(&world);

    assert!((after.distance(before) - 1.2).abs() < 1e-3);
}
