use bastion_defence_core::{
    CellCoord, Command, EnemyKind, EnemyStats, Event, StructureKind, StructureTarget,
};
use bastion_defence_system_structure_targeting::StructureTargeting;
use bastion_defence_world::{self as world, query, World};

fn targets(world: &World) -> Vec<StructureTarget> {
    let mut system = StructureTargeting::new();
    let mut out = Vec::new();
    system.handle(
        &query::structure_view(world),
        &query::enemy_view(world),
        query::tile_grid(world).tile_length(),
        &mut out,
    );
    out
}

#[test]
fn stacked_turrets_target_from_the_base_center() {
    let mut world = World::new();
    let base = query::base_cell(&world);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::PlaceOrUpgrade {
            kind: StructureKind::Turret,
            cell: base,
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::SpawnEnemy {
            kind: EnemyKind::Grunt,
            cell: CellCoord::new(base.column() + 4, base.row()),
            stats: EnemyStats::new(30.0, 0.0, 0.0),
        },
        &mut events,
    );
    let enemy = events
        .iter()
        .find_map(|event| match event {
            Event::EnemySpawned { enemy, .. } => Some(*enemy),
            _ => None,
        })
        .expect("enemy spawned");

    let out = targets(&world);

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].kind, StructureKind::Turret);
    assert_eq!(out[0].targets, vec![enemy]);
}

#[test]
fn enemies_beyond_turret_range_are_ignored() {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::PlaceOrUpgrade {
            kind: StructureKind::Turret,
            cell: CellCoord::new(0, 0),
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::SpawnEnemy {
            kind: EnemyKind::Grunt,
            cell: CellCoord::new(6, 0),
            stats: EnemyStats::new(30.0, 0.0, 0.0),
        },
        &mut events,
    );

    assert!(targets(&world).is_empty());
}
