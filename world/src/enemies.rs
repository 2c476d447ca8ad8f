//! Enemy state and the per-tick enemy phase.

use bastion_defence_core::{Allegiance, EnemyId, EnemyKind, EnemySnapshot, EnemyStats, Event};
use glam::Vec2;

use crate::{
    projectiles::Projectile, structures::StructureSlot, World, BASE_CONTACT_RADIUS,
    MELEE_REACH, REFERENCE_TICK_RATE,
};

const SHOOTER_COOLDOWN: f32 = 1.6;
const SHOOTER_PROJECTILE_SPEED: f32 = 6.0;
const SHOOTER_PROJECTILE_LIFETIME: f32 = 2.0;

/// Mobile attacker tracked by the world.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) kind: EnemyKind,
    pub(crate) position: Vec2,
    pub(crate) health: f32,
    pub(crate) max_health: f32,
    pub(crate) speed: f32,
    pub(crate) damage_per_second: f32,
    pub(crate) slow_timer: f32,
    pub(crate) slow_factor: f32,
    pub(crate) shoot_cooldown: f32,
}

impl Enemy {
    pub(crate) fn spawn(id: EnemyId, kind: EnemyKind, position: Vec2, stats: EnemyStats) -> Self {
        Self {
            id,
            kind,
            position,
            health: stats.health,
            max_health: stats.health,
            speed: stats.speed,
            damage_per_second: stats.damage_per_second,
            slow_timer: 0.0,
            slow_factor: 1.0,
            shoot_cooldown: 0.0,
        }
    }

    /// Replaces any active slow with a fresh one.
    pub(crate) fn apply_slow(&mut self, factor: f32, duration: f32) {
        self.slow_timer = duration;
        self.slow_factor = factor;
    }

    /// Returns the speed multiplier for this tick, then counts the slow timer down.
    fn decay_slow(&mut self, dt: f32) -> f32 {
        let factor = if self.slow_timer > 0.0 {
            self.slow_factor
        } else {
            1.0
        };
        self.slow_timer -= dt;
        if self.slow_timer <= 0.0 {
            self.slow_timer = 0.0;
            self.slow_factor = 1.0;
        }
        factor
    }

    fn step_towards(&mut self, destination: Vec2, distance: f32) {
        let direction = (destination - self.position).normalize_or_zero();
        self.position += direction * distance;
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            health: self.health,
            max_health: self.max_health,
            slow_factor: self.slow_factor,
        }
    }
}

impl World {
    /// Runs every enemy through slow decay, base contact, melee, movement and shooting.
    pub(crate) fn advance_enemies(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        let base_center = self.tile_grid.cell_center(self.terrain.base());
        let frame_scale = dt * REFERENCE_TICK_RATE;

        for index in 0..self.enemies.len() {
            let mut enemy = self.enemies[index];
            let slow = enemy.decay_slow(dt);
            let cell = self.tile_grid.cell_at(enemy.position);

            let at_base = cell == self.terrain.base()
                || enemy.position.distance(base_center) < BASE_CONTACT_RADIUS;
            if at_base {
                self.enemies[index] = enemy;
                self.damage_base(enemy.damage_per_second * dt, out_events);
                continue;
            }

            if let Some(slot) = self.find_blocking(enemy.position, MELEE_REACH) {
                self.enemies[index] = enemy;
                self.damage_structure(slot, enemy.damage_per_second * dt, out_events);
                continue;
            }

            let step = enemy.speed * slow * frame_scale;
            if self.flow.is_unreachable(cell) {
                if let Some(destination) = self.closest_blocking_center(enemy.position) {
                    enemy.step_towards(destination, step);
                }
            } else {
                let next = self.flow.next_step(cell);
                enemy.step_towards(self.tile_grid.cell_center(next), step);
            }

            if let Some(range) = enemy.kind.shoot_range_tiles() {
                enemy.shoot_cooldown = (enemy.shoot_cooldown - dt).max(0.0);
                let range = range * self.tile_grid.tile_length();
                if let Some(target) = self.nearest_shooter_target(enemy.position, range) {
                    if enemy.shoot_cooldown <= 0.0 {
                        let velocity =
                            (target - enemy.position).normalize_or_zero() * SHOOTER_PROJECTILE_SPEED;
                        let projectile = Projectile {
                            id: self.allocate_projectile_id(),
                            position: enemy.position,
                            velocity,
                            damage: enemy.damage_per_second as u32,
                            remaining_life: SHOOTER_PROJECTILE_LIFETIME,
                            slow_factor: None,
                        };
                        out_events.push(Event::ProjectileFired {
                            projectile: projectile.id,
                            allegiance: Allegiance::Hostile,
                        });
                        self.hostile_projectiles.push(projectile);
                        enemy.shoot_cooldown = SHOOTER_COOLDOWN;
                    }
                }
            }

            self.enemies[index] = enemy;
        }
    }

    /// First structure within `reach`: the stack top, then grid structures column by column.
    fn find_blocking(&self, position: Vec2, reach: f32) -> Option<StructureSlot> {
        let base_center = self.tile_grid.cell_center(self.terrain.base());
        if let Some(top) = self.occupancy.top_slot() {
            if position.distance(base_center) <= reach {
                return Some(top);
            }
        }

        self.occupancy.iter().find_map(|(slot, structure)| {
            if matches!(slot, StructureSlot::Stack(_)) || !structure.kind.blocks_movement() {
                return None;
            }
            let center = self.tile_grid.cell_center(self.occupancy.cell_of(slot));
            (position.distance(center) <= reach).then_some(slot)
        })
    }

    fn closest_blocking_center(&self, position: Vec2) -> Option<Vec2> {
        let mut best: Option<(f32, Vec2)> = None;
        if !self.occupancy.stack().is_empty() {
            let center = self.tile_grid.cell_center(self.terrain.base());
            best = Some((position.distance(center), center));
        }
        for (slot, structure) in self.occupancy.iter() {
            if matches!(slot, StructureSlot::Stack(_)) || !structure.kind.blocks_movement() {
                continue;
            }
            let center = self.tile_grid.cell_center(self.occupancy.cell_of(slot));
            let distance = position.distance(center);
            if best.map_or(true, |(best_distance, _)| distance < best_distance) {
                best = Some((distance, center));
            }
        }
        best.map(|(_, center)| center)
    }

    fn nearest_shooter_target(&self, position: Vec2, range: f32) -> Option<Vec2> {
        let mut best: Option<(f32, Vec2)> = None;
        let grid_centers = self
            .occupancy
            .iter()
            .filter(|(slot, _)| matches!(slot, StructureSlot::Cell(_)))
            .map(|(slot, _)| self.tile_grid.cell_center(self.occupancy.cell_of(slot)));
        let base_center = self.tile_grid.cell_center(self.terrain.base());

        for center in grid_centers.chain(std::iter::once(base_center)) {
            let distance = position.distance(center);
            if distance < range && best.map_or(true, |(best_distance, _)| distance < best_distance) {
                best = Some((distance, center));
            }
        }
        best.map(|(_, center)| center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grunt() -> Enemy {
        Enemy::spawn(
            EnemyId::new(0),
            EnemyKind::Grunt,
            Vec2::ZERO,
            EnemyStats::new(100.0, 1.0, 0.0),
        )
    }

    #[test]
    fn slow_covers_the_tick_that_exhausts_it() {
        let mut enemy = grunt();
        enemy.apply_slow(0.6, 0.5);

        assert_eq!(enemy.decay_slow(0.25), 0.6);
        assert_eq!(enemy.decay_slow(0.25), 0.6);
        assert_eq!(enemy.slow_factor, 1.0);
        assert_eq!(enemy.slow_timer, 0.0);
        assert_eq!(enemy.decay_slow(0.25), 1.0);
    }

    #[test]
    fn unslowed_enemies_keep_full_speed() {
        let mut enemy = grunt();
        assert_eq!(enemy.decay_slow(0.25), 1.0);
        assert_eq!(enemy.slow_timer, 0.0);
    }

    #[test]
    fn fresh_slow_replaces_the_old_one() {
        let mut enemy = grunt();
        enemy.apply_slow(0.6, 0.25);
        enemy.apply_slow(0.4, 0.5);

        assert_eq!(enemy.decay_slow(0.25), 0.4);
        assert_eq!(enemy.decay_slow(0.25), 0.4);
        assert_eq!(enemy.decay_slow(0.25), 1.0);
    }
}
