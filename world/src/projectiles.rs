//! Projectile flight and hit resolution for both sides.

use bastion_defence_core::{
    Allegiance, EnemyId, Event, ProjectileId, ProjectileSnapshot, StructureId, StructureKind,
};
use glam::Vec2;
use tracing::{debug, trace};

use crate::{
    structures::StructureSlot, World, BASE_HIT_RADIUS, KILL_BOUNTY, PROJECTILE_HIT_RADIUS,
    SLOW_DURATION,
};

const TURRET_PROJECTILE_SPEED: f32 = 8.0;
const TURRET_PROJECTILE_LIFETIME: f32 = 1.2;
const CHAIN_PROJECTILE_SPEED: f32 = 12.0;
const CHAIN_PROJECTILE_LIFETIME: f32 = 0.3;

/// Projectile in flight. Velocity is measured in tiles per second.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) damage: u32,
    pub(crate) remaining_life: f32,
    pub(crate) slow_factor: Option<f32>,
}

impl Projectile {
    /// Moves the projectile and reports whether it is still alive.
    fn advance(&mut self, dt: f32, tile_length: f32) -> bool {
        self.position += self.velocity * dt * tile_length;
        self.remaining_life -= dt;
        self.remaining_life > 0.0
    }

    pub(crate) fn snapshot(&self, allegiance: Allegiance) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            allegiance,
            position: self.position,
            velocity: self.velocity,
            damage: self.damage,
            remaining_life: self.remaining_life,
            slow_factor: self.slow_factor,
        }
    }
}

impl World {
    /// Launches a turret projectile if the turret is ready and the target is alive.
    pub(crate) fn fire_projectile(
        &mut self,
        structure: StructureId,
        target: EnemyId,
        out_events: &mut Vec<Event>,
    ) {
        let Some(slot) = self.ready_attacker(structure, StructureKind::Turret) else {
            return;
        };
        let Some(target) = self.enemy_position(target) else {
            return;
        };
        let origin = self.slot_center(slot);
        let Some(attacker) = self.occupancy.get_mut(slot) else {
            return;
        };
        let damage = attacker.stats.damage;
        attacker.reset_cooldown();

        self.launch_friendly(
            origin,
            target,
            damage,
            TURRET_PROJECTILE_SPEED,
            TURRET_PROJECTILE_LIFETIME,
            None,
            out_events,
        );
    }

    /// Discharges a tesla chain. An empty chain still consumes the cooldown.
    pub(crate) fn fire_chain(
        &mut self,
        structure: StructureId,
        targets: &[EnemyId],
        out_events: &mut Vec<Event>,
    ) {
        let Some(slot) = self.ready_attacker(structure, StructureKind::Tesla) else {
            return;
        };
        let mut origin = self.slot_center(slot);
        let Some(attacker) = self.occupancy.get_mut(slot) else {
            return;
        };
        let damage = attacker.stats.damage;
        let slow = attacker.stats.slow_factor;
        attacker.reset_cooldown();

        for &target in targets {
            let Some(position) = self.enemy_position(target) else {
                continue;
            };
            self.launch_friendly(
                origin,
                position,
                damage,
                CHAIN_PROJECTILE_SPEED,
                CHAIN_PROJECTILE_LIFETIME,
                Some(slow),
                out_events,
            );
            origin = position;
        }
    }

    /// Moves every projectile, expires spent ones and resolves hits.
    pub(crate) fn advance_projectiles(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        self.advance_friendly_projectiles(dt, out_events);
        self.advance_hostile_projectiles(dt, out_events);
    }

    fn advance_friendly_projectiles(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        let tile_length = self.tile_grid.tile_length();
        let projectiles = std::mem::take(&mut self.friendly_projectiles);
        let mut survivors = Vec::with_capacity(projectiles.len());

        for mut projectile in projectiles {
            if !projectile.advance(dt, tile_length) {
                continue;
            }

            let hit = self.enemies.iter().position(|enemy| {
                enemy.position.distance(projectile.position) < PROJECTILE_HIT_RADIUS
            });
            let Some(index) = hit else {
                survivors.push(projectile);
                continue;
            };

            let enemy = &mut self.enemies[index];
            enemy.health -= projectile.damage as f32;
            if let Some(factor) = projectile.slow_factor {
                enemy.apply_slow(factor, SLOW_DURATION);
            }
            trace!(enemy = enemy.id.get(), health = enemy.health, "projectile hit");

            if enemy.health <= 0.0 {
                let killed = self.enemies.remove(index);
                self.economy.credit(KILL_BOUNTY);
                debug!(enemy = killed.id.get(), kind = ?killed.kind, "enemy killed");
                out_events.push(Event::EnemyKilled {
                    enemy: killed.id,
                    kind: killed.kind,
                    bounty: KILL_BOUNTY,
                });
            }
        }

        self.friendly_projectiles = survivors;
    }

    fn advance_hostile_projectiles(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        let tile_length = self.tile_grid.tile_length();
        let base_center = self.tile_grid.cell_center(self.terrain.base());
        let projectiles = std::mem::take(&mut self.hostile_projectiles);
        let mut survivors = Vec::with_capacity(projectiles.len());

        for mut projectile in projectiles {
            if !projectile.advance(dt, tile_length) {
                continue;
            }
            let damage = projectile.damage as f32;

            if let Some(top) = self.occupancy.top_slot() {
                if projectile.position.distance(base_center) < PROJECTILE_HIT_RADIUS {
                    self.damage_structure(top, damage, out_events);
                    continue;
                }
            }

            let cell = self.tile_grid.cell_at(projectile.position);
            let struck = self.occupancy.grid_structure(cell).is_some()
                && projectile.position.distance(self.tile_grid.cell_center(cell))
                    < PROJECTILE_HIT_RADIUS;
            if struck {
                self.damage_structure(StructureSlot::Cell(cell), damage, out_events);
                continue;
            }

            if projectile.position.distance(base_center) < BASE_HIT_RADIUS {
                self.damage_base(damage, out_events);
                continue;
            }

            survivors.push(projectile);
        }

        self.hostile_projectiles = survivors;
    }

    fn ready_attacker(&self, structure: StructureId, kind: StructureKind) -> Option<StructureSlot> {
        let slot = self.occupancy.locate(structure)?;
        let attacker = self.occupancy.get(slot)?;
        (attacker.kind == kind && attacker.is_ready()).then_some(slot)
    }

    fn enemy_position(&self, enemy: EnemyId) -> Option<Vec2> {
        self.enemies
            .iter()
            .find(|candidate| candidate.id == enemy)
            .map(|candidate| candidate.position)
    }

    fn slot_center(&self, slot: StructureSlot) -> Vec2 {
        self.tile_grid.cell_center(self.occupancy.cell_of(slot))
    }

    #[allow(clippy::too_many_arguments)]
    fn launch_friendly(
        &mut self,
        origin: Vec2,
        target: Vec2,
        damage: u32,
        speed: f32,
        lifetime: f32,
        slow_factor: Option<f32>,
        out_events: &mut Vec<Event>,
    ) {
        let projectile = Projectile {
            id: self.allocate_projectile_id(),
            position: origin,
            velocity: (target - origin).normalize_or_zero() * speed,
            damage,
            remaining_life: lifetime,
            slow_factor,
        };
        out_events.push(Event::ProjectileFired {
            projectile: projectile.id,
            allegiance: Allegiance::Friendly,
        });
        self.friendly_projectiles.push(projectile);
    }
}
