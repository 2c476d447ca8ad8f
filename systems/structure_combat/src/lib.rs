#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that emits firing commands from targeting data.

use bastion_defence_core::{Command, StructureKind, StructureTarget, StructureView};

/// Structure combat system that queues firing commands for ready structures.
#[derive(Debug, Default)]
pub struct StructureCombat {
    scratch: Vec<Command>,
}

impl StructureCombat {
    /// Creates a new structure combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::FireProjectile` for turrets and `Command::FireChain`
    /// for teslas whose cooldown has elapsed.
    pub fn handle(
        &mut self,
        structures: &StructureView,
        targets: &[StructureTarget],
        out: &mut Vec<Command>,
    ) {
        if targets.is_empty() {
            return;
        }

        self.scratch.clear();

        for target in targets {
            let Some(snapshot) = structures.get(target.structure) else {
                continue;
            };
            if !snapshot.is_ready() {
                continue;
            }
            match snapshot.kind {
                StructureKind::Turret => {
                    if let Some(enemy) = target.targets.first() {
                        self.scratch.push(Command::FireProjectile {
                            structure: target.structure,
                            target: *enemy,
                        });
                    }
                }
                StructureKind::Tesla => self.scratch.push(Command::FireChain {
                    structure: target.structure,
                    targets: target.targets.clone(),
                }),
                StructureKind::Wall | StructureKind::Miner | StructureKind::Healer => {}
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}
