#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic structure targets from world snapshots.

use bastion_defence_core::{
    EnemyId, EnemyView, StructureId, StructureKind, StructureTarget, StructureView,
};
use glam::Vec2;

/// Maximum number of enemies a tesla chain strikes.
pub const CHAIN_LENGTH: usize = 3;

/// Structure targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct StructureTargeting {
    enemy_workspace: Vec<EnemyCandidate>,
    chain_workspace: Vec<EnemyCandidate>,
}

impl StructureTargeting {
    /// Creates a new structure targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes attack assignments for every cooldown-ready turret and tesla.
    ///
    /// The output buffer is cleared before populating it with the latest
    /// assignments. Turrets without an enemy in range are omitted; ready
    /// teslas are always reported, possibly with an empty chain.
    pub fn handle(
        &mut self,
        structures: &StructureView,
        enemies: &EnemyView,
        tile_length: f32,
        out: &mut Vec<StructureTarget>,
    ) {
        out.clear();
        self.prepare_enemy_workspace(enemies);

        for structure in structures.iter().filter(|snapshot| snapshot.is_ready()) {
            let range = structure.stats.range_tiles * tile_length;
            match structure.kind {
                StructureKind::Turret => {
                    if let Some(enemy) = self.nearest(structure.center, range) {
                        out.push(assignment(structure.id, structure.kind, vec![enemy]));
                    }
                }
                StructureKind::Tesla => {
                    let targets = self.chain(structure.center, range);
                    out.push(assignment(structure.id, structure.kind, targets));
                }
                StructureKind::Wall | StructureKind::Miner | StructureKind::Healer => {}
            }
        }
    }

    fn prepare_enemy_workspace(&mut self, enemies: &EnemyView) {
        self.enemy_workspace.clear();
        self.enemy_workspace.reserve(enemies.len());
        self.enemy_workspace
            .extend(enemies.iter().map(|snapshot| EnemyCandidate {
                id: snapshot.id,
                position: snapshot.position,
                distance: 0.0,
            }));
    }

    fn nearest(&self, origin: Vec2, range: f32) -> Option<EnemyId> {
        let mut best: Option<(f32, EnemyId)> = None;
        for candidate in &self.enemy_workspace {
            let distance = candidate.position.distance(origin);
            if distance > range {
                continue;
            }
            match best {
                Some((closest, _)) if distance >= closest => {}
                _ => best = Some((distance, candidate.id)),
            }
        }
        best.map(|(_, id)| id)
    }

    fn chain(&mut self, origin: Vec2, range: f32) -> Vec<EnemyId> {
        self.chain_workspace.clear();
        for candidate in &self.enemy_workspace {
            let distance = candidate.position.distance(origin);
            if distance <= range {
                self.chain_workspace.push(EnemyCandidate {
                    distance,
                    ..*candidate
                });
            }
        }
        self.chain_workspace
            .sort_by(|left, right| left.distance.total_cmp(&right.distance));
        self.chain_workspace
            .iter()
            .take(CHAIN_LENGTH)
            .map(|candidate| candidate.id)
            .collect()
    }
}

fn assignment(structure: StructureId, kind: StructureKind, targets: Vec<EnemyId>) -> StructureTarget {
    StructureTarget {
        structure,
        kind,
        targets,
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct EnemyCandidate {
    id: EnemyId,
    position: Vec2,
    distance: f32,
}
