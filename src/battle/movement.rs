//! Reachable cells for a stack
//!
//! Breadth-first search over orthogonal steps, one step per point of speed.
//! Walkers route around obstacles; fliers pass over them. Nobody passes
//! through another stack.

use std::collections::VecDeque;

use ahash::AHashSet;

use crate::battle::game::GameContext;
use crate::core::types::{Cell, UnitId};

/// Cells the stack could move to this round, excluding its own cell.
///
/// Empty when the unit is unknown, destroyed or has already acted.
pub fn reachable_cells(context: &GameContext, unit_id: UnitId) -> Vec<Cell> {
    let Some(unit) = context.unit(unit_id) else {
        return Vec::new();
    };
    if !unit.can_act() {
        return Vec::new();
    }

    let grid = context.grid();
    let start = unit.position;
    let budget = unit.unit_type.speed;
    let is_flying = unit.unit_type.is_flying;

    let mut visited: AHashSet<Cell> = AHashSet::new();
    let mut queue = VecDeque::new();
    let mut reachable = Vec::new();

    visited.insert(start);
    queue.push_back((start, 0u32));

    while let Some((current, steps)) = queue.pop_front() {
        if steps == budget {
            continue;
        }

        for neighbor in current.neighbors() {
            if visited.contains(&neighbor) || !grid.is_passable(neighbor, is_flying) {
                continue;
            }
            visited.insert(neighbor);
            reachable.push(neighbor);
            queue.push_back((neighbor, steps + 1));
        }
    }

    reachable
}

/// Is `target` a legal destination for this stack?
pub fn can_reach(context: &GameContext, unit_id: UnitId, target: Cell) -> bool {
    reachable_cells(context, unit_id).contains(&target)
}
