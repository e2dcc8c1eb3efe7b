//! Line of sight
//!
//! Only obstacles block sight; stacks never do. Endpoints are ignored, so a
//! unit standing next to an obstacle can still see past its own cell.

use crate::battle::game::GameContext;
use crate::core::types::Cell;

/// Check line of sight between two cells of a loaded game.
///
/// # Panics
///
/// If either endpoint is outside the field. Callers only ever ask about cells
/// of stacks on the field, so this signals a context mix-up.
pub fn has_line_of_sight(from: Cell, to: Cell, context: &GameContext) -> bool {
    let field = context.field();
    assert!(
        field.in_bounds(from) && field.in_bounds(to),
        "line of sight {} -> {} queried outside the {} field of game {}",
        from,
        to,
        field.label,
        context.game.id
    );

    let grid = context.grid();
    let line = from.line_to(&to);

    // Check all cells except start and end
    line.iter()
        .skip(1)
        .take(line.len().saturating_sub(2))
        .all(|cell| !grid.is_obstacle(*cell))
}
