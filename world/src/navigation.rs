//! Flow field builder used by the world crate.

use std::collections::VecDeque;

use bastion_defence_core::{CellCoord, UNREACHABLE};

/// Neighbour offsets in the order both the search and the router scan them.
const DIRECTIONS: [(i64, i64); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Dense breadth-first distance grid seeded from the base.
///
/// Distances are stored row-major and default to [`UNREACHABLE`] for cells
/// that are blocked or walled off. The goal always holds zero, even when the
/// predicate reports it as blocked.
#[derive(Clone, Debug, Default)]
pub(crate) struct FlowField {
    width: u32,
    height: u32,
    distances: Vec<u16>,
}

impl FlowField {
    /// Rebuilds the distances using a breadth-first search rooted at `goal`.
    pub(crate) fn rebuild_with<F>(&mut self, width: u32, height: u32, goal: CellCoord, is_blocked: F)
    where
        F: Fn(CellCoord) -> bool,
    {
        let width_usize = usize::try_from(width).unwrap_or(0);
        let height_usize = usize::try_from(height).unwrap_or(0);
        let cell_count = width_usize.checked_mul(height_usize).unwrap_or(0);

        self.width = width;
        self.height = height;

        if cell_count == 0 {
            self.distances.clear();
            return;
        }

        if self.distances.len() != cell_count {
            self.distances = vec![UNREACHABLE; cell_count];
        } else {
            self.distances.fill(UNREACHABLE);
        }

        let Some(goal_index) = index(width_usize, width, height, goal) else {
            return;
        };

        let mut queue = VecDeque::new();
        self.distances[goal_index] = 0;
        queue.push_back(goal);

        while let Some(cell) = queue.pop_front() {
            let Some(current_index) = index(width_usize, width, height, cell) else {
                continue;
            };
            let current_distance = self.distances[current_index];
            if current_distance >= UNREACHABLE.saturating_sub(1) {
                continue;
            }
            let next_distance = current_distance + 1;

            for neighbor in neighbors(cell, width, height) {
                if is_blocked(neighbor) {
                    continue;
                }

                let Some(neighbor_index) = index(width_usize, width, height, neighbor) else {
                    continue;
                };

                if self.distances[neighbor_index] <= next_distance {
                    continue;
                }

                self.distances[neighbor_index] = next_distance;
                queue.push_back(neighbor);
            }
        }
    }

    /// Width of the field in cells.
    #[must_use]
    pub(crate) fn width(&self) -> u32 {
        self.width
    }

    /// Height of the field in cells.
    #[must_use]
    pub(crate) fn height(&self) -> u32 {
        self.height
    }

    /// Dense distances stored in row-major order.
    #[must_use]
    pub(crate) fn cells(&self) -> &[u16] {
        &self.distances
    }

    /// Distance captured for the provided cell, if it lies within the field.
    #[must_use]
    pub(crate) fn distance(&self, cell: CellCoord) -> Option<u16> {
        let width = usize::try_from(self.width).ok()?;
        index(width, self.width, self.height, cell)
            .and_then(|offset| self.distances.get(offset).copied())
    }

    /// Reports whether the cell has no path to the goal.
    #[must_use]
    pub(crate) fn is_unreachable(&self, cell: CellCoord) -> bool {
        self.distance(cell)
            .map_or(true, |distance| distance == UNREACHABLE)
    }

    /// Number of cells holding a finite distance.
    #[must_use]
    pub(crate) fn reachable_cells(&self) -> u32 {
        let count = self
            .distances
            .iter()
            .filter(|&&distance| distance != UNREACHABLE)
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Neighbour with the strictly smallest distance, or the cell itself.
    ///
    /// Neighbours are scanned as +column, -column, +row, -row and the first
    /// strict improvement wins ties.
    #[must_use]
    pub(crate) fn next_step(&self, cell: CellCoord) -> CellCoord {
        let mut best = cell;
        let mut best_distance = self.distance(cell).unwrap_or(UNREACHABLE);

        for neighbor in neighbors(cell, self.width, self.height) {
            if let Some(distance) = self.distance(neighbor) {
                if distance < best_distance {
                    best_distance = distance;
                    best = neighbor;
                }
            }
        }

        best
    }
}

fn neighbors(cell: CellCoord, width: u32, height: u32) -> impl Iterator<Item = CellCoord> {
    DIRECTIONS.into_iter().filter_map(move |(dx, dy)| {
        let column = i64::from(cell.column()) + dx;
        let row = i64::from(cell.row()) + dy;
        if column < 0 || row < 0 || column >= i64::from(width) || row >= i64::from(height) {
            return None;
        }
        Some(CellCoord::new(
            u32::try_from(column).ok()?,
            u32::try_from(row).ok()?,
        ))
    })
}

fn index(width_usize: usize, width: u32, height: u32, cell: CellCoord) -> Option<usize> {
    if cell.column() >= width || cell.row() >= height {
        return None;
    }
    let column = usize::try_from(cell.column()).ok()?;
    let row = usize::try_from(cell.row()).ok()?;
    row.checked_mul(width_usize)?.checked_add(column)
}
