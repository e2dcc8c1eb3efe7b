//! Deployment at game acceptance
//!
//! The creator deploys on the west edge, the acceptor on the east edge.
//! Stacks are spread evenly down the edge column; rosters taller than the
//! field spill one column inward. Obstacles never land on the deployment
//! columns, so both sides always start free to move.

use ahash::AHashSet;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::battle::grid::{Field, Obstacle};
use crate::battle::unit_type::UnitType;
use crate::battle::units::BattleUnit;
use crate::core::config::EngineConfig;
use crate::core::error::{EngineError, EngineResult};
use crate::core::types::{Cell, GameId, PlayerId, RosterEntryId};

/// Which edge a side deploys on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    West,
    East,
}

/// One roster stack resolved against the catalog
#[derive(Debug, Clone)]
pub struct DeployableStack {
    pub roster_entry: RosterEntryId,
    pub unit_type: UnitType,
    pub count: u32,
}

/// Columns a side may occupy, outermost first
fn deployment_columns(field: &Field, side: Side) -> Vec<i32> {
    let depth = (field.width / 2).max(1) as i32;
    match side {
        Side::West => (0..depth).collect(),
        Side::East => (0..depth).map(|i| field.width as i32 - 1 - i).collect(),
    }
}

/// Cells for `count` stacks on one side
pub fn deployment_cells(field: &Field, side: Side, count: usize) -> EngineResult<Vec<Cell>> {
    let height = field.height as usize;
    let columns = deployment_columns(field, side);
    if count > columns.len() * height {
        return Err(EngineError::RosterTooLarge {
            stacks: count,
            width: field.width,
            height: field.height,
        });
    }

    let mut cells = Vec::with_capacity(count);
    for (column, x) in columns.iter().enumerate() {
        let placed = column * height;
        if placed >= count {
            break;
        }
        let in_column = (count - placed).min(height);
        // Evenly spaced rows; distinct because spacing is at least one row
        for i in 0..in_column {
            let y = (2 * i + 1) * height / (2 * in_column);
            cells.push(Cell::new(*x, y as i32));
        }
    }
    Ok(cells)
}

/// Build the stacks one player brings into the game
pub fn deploy_side(
    game_id: GameId,
    owner: PlayerId,
    field: &Field,
    side: Side,
    stacks: Vec<DeployableStack>,
    config: &EngineConfig,
) -> EngineResult<Vec<BattleUnit>> {
    let stacks: Vec<_> = stacks.into_iter().filter(|s| s.count > 0).collect();
    if stacks.is_empty() {
        return Err(EngineError::NoDeployableUnits(owner));
    }

    let cells = deployment_cells(field, side, stacks.len())?;
    Ok(stacks
        .into_iter()
        .zip(cells)
        .map(|(stack, cell)| {
            BattleUnit::new(game_id, owner, stack.roster_entry, stack.unit_type, stack.count, cell)
                .with_condition(config.initial_morale, config.initial_fatigue)
        })
        .collect())
}

/// Scatter obstacles over the middle of the field
pub fn generate_obstacles<R: Rng>(
    game_id: GameId,
    field: &Field,
    occupied: &AHashSet<Cell>,
    density: f64,
    rng: &mut R,
) -> Vec<Obstacle> {
    let last_column = field.width as i32 - 1;
    let mut candidates: Vec<Cell> = field
        .cells()
        .filter(|c| c.x != 0 && c.x != last_column && !occupied.contains(c))
        .collect();

    let wanted = (field.cell_count() as f64 * density).round() as usize;
    let count = wanted.min(candidates.len());

    candidates.shuffle(rng);
    candidates.truncate(count);
    candidates.sort();

    candidates
        .into_iter()
        .map(|cell| Obstacle { game_id, cell })
        .collect()
}
