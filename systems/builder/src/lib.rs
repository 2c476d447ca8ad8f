#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system responsible for emitting structure placement and removal commands.

use bastion_defence_core::{CellCoord, Command, Event, StructureKind};

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuilderInput {
    /// Indicates whether the player confirmed a placement on this frame.
    pub confirm_action: bool,
    /// Indicates whether the player requested structure removal on this frame.
    pub remove_action: bool,
    /// Cell currently hovered by the cursor.
    pub cursor_cell: Option<CellCoord>,
}

impl BuilderInput {
    /// Creates a new input descriptor with explicit field values.
    #[must_use]
    pub const fn new(
        confirm_action: bool,
        remove_action: bool,
        cursor_cell: Option<CellCoord>,
    ) -> Self {
        Self {
            confirm_action,
            remove_action,
            cursor_cell,
        }
    }
}

/// Builder system that translates the selected building type and player input
/// into placement commands.
#[derive(Debug, Clone)]
pub struct Builder {
    selected: StructureKind,
    accepting: bool,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    /// Creates a new builder with walls selected.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            selected: StructureKind::Wall,
            accepting: true,
        }
    }

    /// Changes the building type used for subsequent placements.
    pub fn select(&mut self, kind: StructureKind) {
        self.selected = kind;
    }

    /// Building type currently selected.
    #[must_use]
    pub const fn selected(&self) -> StructureKind {
        self.selected
    }

    /// Tracks match lifecycle events without producing commands.
    pub fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::GameOver { .. } => self.accepting = false,
                Event::MatchReset => self.accepting = true,
                _ => {}
            }
        }
    }

    /// Consumes world events and adapter-derived input to emit builder commands.
    ///
    /// Input is ignored between a `GameOver` event and the next `MatchReset`.
    pub fn handle(&mut self, events: &[Event], input: BuilderInput, out: &mut Vec<Command>) {
        self.observe(events);

        if !self.accepting {
            return;
        }

        let Some(cell) = input.cursor_cell else {
            return;
        };

        if input.confirm_action {
            out.push(Command::PlaceOrUpgrade {
                kind: self.selected,
                cell,
            });
        }

        if input.remove_action {
            out.push(Command::RemoveStructure { cell });
        }
    }
}
