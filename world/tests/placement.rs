use std::time::Duration;

use bastion_defence_core::{
    CellCoord, Command, Event, PlacementAction, PlacementError, RemovalError, StructureKind,
    TileKind,
};
use bastion_defence_world::{self as world, query, World};

const DT: Duration = Duration::from_nanos(16_666_667);

fn run(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn place(world: &mut World, kind: StructureKind, cell: CellCoord) -> Vec<Event> {
    run(world, Command::PlaceOrUpgrade { kind, cell })
}

fn rejection(events: &[Event]) -> Option<PlacementError> {
    events.iter().find_map(|event| match event {
        Event::PlacementRejected { reason, .. } => Some(*reason),
        _ => None,
    })
}

fn scattered_world() -> World {
    let mut world = World::new();
    let _ = run(&mut world, Command::ScatterResources { seed: 42, count: 28 });
    world
}

fn first_cell_with(world: &World, wanted: TileKind) -> CellCoord {
    let grid = query::tile_grid(world);
    (0..grid.columns().get())
        .flat_map(|column| (0..grid.rows().get()).map(move |row| CellCoord::new(column, row)))
        .find(|cell| query::tile_kind(world, *cell) == Some(wanted))
        .expect("grid contains the requested tile kind")
}

fn fund(world: &mut World, seconds: u64) {
    let ore = first_cell_with(world, TileKind::Resource);
    let _ = place(world, StructureKind::Miner, ore);
    let _ = run(world, Command::Tick { dt: Duration::from_secs(seconds) });
}

#[test]
fn turret_placement_charges_base_cost_and_starts_at_level_one() {
    let mut world = World::new();
    let cell = CellCoord::new(3, 3);

    let events = place(&mut world, StructureKind::Turret, cell);

    assert!(matches!(
        events.first(),
        Some(Event::StructurePlaced { kind: StructureKind::Turret, cost: 10, .. })
    ));
    assert_eq!(query::gold(&world), 50.0);
    let turret = query::structure_at(&world, cell).expect("turret placed");
    assert_eq!(turret.level, 1);
    assert_eq!(turret.stats.fire_interval, 1.0);
    assert_eq!(turret.stats.range_tiles, 5.0);
    assert_eq!(turret.stats.damage, 12);
    assert_eq!(turret.next_upgrade_cost, 20);
    assert_eq!(query::placement_count(&world, StructureKind::Turret), 1);
}

#[test]
fn placing_the_same_kind_upgrades_and_doubles_the_cost() {
    let mut world = World::new();
    let cell = CellCoord::new(3, 3);
    let _ = place(&mut world, StructureKind::Turret, cell);

    let events = place(&mut world, StructureKind::Turret, cell);

    assert!(matches!(
        events.as_slice(),
        [Event::StructureUpgraded { level: 2, cost: 20, .. }]
    ));
    assert_eq!(query::gold(&world), 30.0);
    let turret = query::structure_at(&world, cell).expect("turret present");
    assert_eq!(turret.next_upgrade_cost, 40);
    assert_eq!(turret.spent, 30);
    assert_eq!(turret.stats.damage, 14);

    let events = place(&mut world, StructureKind::Turret, cell);
    assert_eq!(rejection(&events), Some(PlacementError::InsufficientGold));
    assert_eq!(query::gold(&world), 30.0);
}

#[test]
fn different_kind_on_occupied_cell_is_rejected() {
    let mut world = World::new();
    let cell = CellCoord::new(1, 1);
    let _ = place(&mut world, StructureKind::Wall, cell);

    let events = place(&mut world, StructureKind::Turret, cell);

    assert_eq!(rejection(&events), Some(PlacementError::Occupied));
    assert_eq!(query::gold(&world), 55.0);
}

#[test]
fn out_of_bounds_placement_is_rejected() {
    let mut world = World::new();
    let events = place(&mut world, StructureKind::Wall, CellCoord::new(20, 0));
    assert_eq!(rejection(&events), Some(PlacementError::OutOfBounds));
}

#[test]
fn miner_requires_a_resource_tile() {
    let mut world = scattered_world();
    let plain = first_cell_with(&world, TileKind::Empty);

    let events = place(&mut world, StructureKind::Miner, plain);

    assert_eq!(rejection(&events), Some(PlacementError::InvalidTerrain));
    assert_eq!(query::gold(&world), 60.0);
}

#[test]
fn miner_on_resource_tile_produces_gold_each_tick() {
    let mut world = scattered_world();
    let ore = first_cell_with(&world, TileKind::Resource);
    let _ = place(&mut world, StructureKind::Miner, ore);
    assert_eq!(query::gold(&world), 40.0);

    let _ = run(&mut world, Command::Tick { dt: DT });

    let expected = 40.0 + 4.0 * DT.as_secs_f32();
    assert!((query::gold(&world) - expected).abs() < 1e-4);
}

#[test]
fn placement_cap_is_enforced() {
    let mut world = scattered_world();
    fund(&mut world, 100);

    let mut placed = 0;
    for column in 0..3 {
        for row in 0..10 {
            let events = place(&mut world, StructureKind::Wall, CellCoord::new(column, row));
            if matches!(events.first(), Some(Event::StructurePlaced { .. })) {
                placed += 1;
            }
        }
    }
    assert_eq!(query::placement_count(&world, StructureKind::Wall), placed);

    let mut extra = 0;
    while query::placement_count(&world, StructureKind::Wall) < 30 {
        let cell = CellCoord::new(5, extra);
        let _ = place(&mut world, StructureKind::Wall, cell);
        extra += 1;
    }

    let events = place(&mut world, StructureKind::Wall, CellCoord::new(18, 11));
    assert_eq!(rejection(&events), Some(PlacementError::CapReached));
    assert_eq!(query::placement_count(&world, StructureKind::Wall), 30);
}

#[test]
fn removal_refunds_half_of_spent_gold_rounded_down() {
    let mut world = World::new();
    let cell = CellCoord::new(4, 4);
    let _ = place(&mut world, StructureKind::Wall, cell);

    let events = run(&mut world, Command::RemoveStructure { cell });

    assert!(matches!(
        events.first(),
        Some(Event::StructureRemoved { refund: 2, .. })
    ));
    assert_eq!(query::gold(&world), 57.0);
    assert_eq!(query::placement_count(&world, StructureKind::Wall), 0);
    assert!(query::structure_at(&world, cell).is_none());
}

#[test]
fn removal_of_an_empty_cell_is_rejected() {
    let mut world = World::new();
    let events = run(&mut world, Command::RemoveStructure { cell: CellCoord::new(0, 0) });
    assert_eq!(
        events,
        vec![Event::RemovalRejected {
            cell: CellCoord::new(0, 0),
            reason: RemovalError::Empty,
        }]
    );

    let events = run(&mut world, Command::RemoveStructure { cell: CellCoord::new(0, 40) });
    assert!(matches!(
        events.as_slice(),
        [Event::RemovalRejected { reason: RemovalError::OutOfBounds, .. }]
    ));
}

#[test]
fn base_requests_upgrade_cheapest_entry_then_fall_through_to_building() {
    let mut world = World::new();
    let base = query::base_cell(&world);

    let _ = place(&mut world, StructureKind::Turret, base);
    assert_eq!(query::gold(&world), 50.0);

    let events = place(&mut world, StructureKind::Turret, base);
    assert!(matches!(
        events.as_slice(),
        [Event::StructureUpgraded { level: 2, cost: 20, .. }]
    ));
    assert_eq!(query::gold(&world), 30.0);

    let events = place(&mut world, StructureKind::Turret, base);
    assert!(matches!(
        events.first(),
        Some(Event::StructurePlaced { cost: 10, .. })
    ));
    assert_eq!(query::gold(&world), 20.0);

    let stack = query::base_stack(&world);
    assert_eq!(stack.len(), 2);
    assert_eq!(stack[0].level, 2);
    assert_eq!(stack[1].level, 1);
    assert_eq!(query::placement_count(&world, StructureKind::Turret), 2);
}

#[test]
fn miners_cannot_stack_on_the_base() {
    let mut world = World::new();
    let base = query::base_cell(&world);

    let events = place(&mut world, StructureKind::Miner, base);

    assert_eq!(
        events,
        vec![Event::PlacementRejected {
            kind: StructureKind::Miner,
            cell: base,
            reason: PlacementError::InvalidTerrain,
        }]
    );
    assert_eq!(query::gold(&world), 60.0);
    assert!(query::base_stack(&world).is_empty());
    assert_eq!(
        query::placement_preview(&world, StructureKind::Miner, base),
        Err(PlacementError::InvalidTerrain)
    );
}

#[test]
fn removing_at_the_base_pops_the_top_of_the_stack() {
    let mut world = World::new();
    let base = query::base_cell(&world);
    let _ = place(&mut world, StructureKind::Turret, base);
    let _ = place(&mut world, StructureKind::Healer, base);

    let events = run(&mut world, Command::RemoveStructure { cell: base });

    assert!(matches!(
        events.first(),
        Some(Event::StructureRemoved { kind: StructureKind::Healer, refund: 12, .. })
    ));
    let stack = query::base_stack(&world);
    assert_eq!(stack.len(), 1);
    assert_eq!(stack[0].kind, StructureKind::Turret);
}

#[test]
fn placement_preview_matches_the_applied_outcome() {
    let mut world = World::new();
    let cell = CellCoord::new(6, 2);

    let preview = query::placement_preview(&world, StructureKind::Tesla, cell).expect("valid");
    assert_eq!(preview.action, PlacementAction::Build);
    assert_eq!(preview.cost, 30);

    let _ = place(&mut world, StructureKind::Tesla, cell);
    let preview = query::placement_preview(&world, StructureKind::Tesla, cell);
    assert_eq!(preview, Err(PlacementError::InsufficientGold));
    assert_eq!(query::gold(&world), 30.0);
}
