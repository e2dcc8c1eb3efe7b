//! Battlefield geometry: field templates, obstacles and occupancy
//!
//! A cell is blocked for a walker if it holds a live stack or an obstacle.
//! Fliers ignore obstacles but never share a cell with a stack.

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::battle::game::GameContext;
use crate::core::config::EngineConfig;
use crate::core::error::{EngineError, EngineResult};
use crate::core::types::{Cell, FieldId, GameId, UnitId};

/// Immutable battlefield template, shared by every game of that size
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub id: FieldId,
    pub label: String,
    pub width: u32,
    pub height: u32,
}

impl Field {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            id: FieldId::new(),
            label: format!("{}x{}", width, height),
            width,
            height,
        }
    }

    /// Parse a size label such as `"7x7"` into `(width, height)`
    pub fn parse_size(label: &str, config: &EngineConfig) -> EngineResult<(u32, u32)> {
        let invalid = || EngineError::InvalidFieldSize(label.to_string());

        let lower = label.trim().to_ascii_lowercase();
        let (w, h) = lower.split_once('x').ok_or_else(invalid)?;
        let width: u32 = w.trim().parse().map_err(|_| invalid())?;
        let height: u32 = h.trim().parse().map_err(|_| invalid())?;

        let bounds = config.min_field_dimension..=config.max_field_dimension;
        if !bounds.contains(&width) || !bounds.contains(&height) {
            return Err(invalid());
        }

        Ok((width, height))
    }

    /// Check if a cell is within field bounds
    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.width as i32 && cell.y < self.height as i32
    }

    pub fn cell_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    /// All cells, row by row
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.height as i32).flat_map(move |y| (0..self.width as i32).map(move |x| Cell::new(x, y)))
    }
}

/// A blocking cell, fixed for the lifetime of one game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Obstacle {
    pub game_id: GameId,
    pub cell: Cell,
}

/// Occupancy view over a loaded game
#[derive(Debug, Clone)]
pub struct Grid<'a> {
    field: &'a Field,
    obstacles: AHashSet<Cell>,
    stacks: AHashMap<Cell, UnitId>,
}

impl<'a> Grid<'a> {
    pub fn new(context: &'a GameContext) -> Self {
        let obstacles = context.obstacles.iter().map(|o| o.cell).collect();
        let stacks = context
            .units
            .iter()
            .filter(|u| u.is_alive())
            .map(|u| (u.position, u.id))
            .collect();

        Self {
            field: context.field(),
            obstacles,
            stacks,
        }
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        self.field.in_bounds(cell)
    }

    pub fn is_obstacle(&self, cell: Cell) -> bool {
        self.obstacles.contains(&cell)
    }

    /// Live stack standing on this cell
    pub fn stack_at(&self, cell: Cell) -> Option<UnitId> {
        self.stacks.get(&cell).copied()
    }

    /// Can a stack step onto this cell?
    pub fn is_passable(&self, cell: Cell, is_flying: bool) -> bool {
        if !self.in_bounds(cell) || self.stacks.contains_key(&cell) {
            return false;
        }
        is_flying || !self.is_obstacle(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_square_sizes() {
        let config = EngineConfig::default();
        assert_eq!(Field::parse_size("5x5", &config).unwrap(), (5, 5));
        assert_eq!(Field::parse_size("10X10", &config).unwrap(), (10, 10));
        assert_eq!(Field::parse_size(" 7 x 9 ", &config).unwrap(), (7, 9));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let config = EngineConfig::default();
        assert!(Field::parse_size("big", &config).is_err());
        assert!(Field::parse_size("5by5", &config).is_err());
        assert!(Field::parse_size("x5", &config).is_err());
    }

    #[test]
    fn test_parse_rejects_out_of_bounds() {
        let config = EngineConfig::default();
        assert!(matches!(
            Field::parse_size("1x1", &config),
            Err(EngineError::InvalidFieldSize(_))
        ));
        assert!(Field::parse_size("100x100", &config).is_err());
    }

    #[test]
    fn test_field_bounds() {
        let field = Field::new(5, 4);
        assert_eq!(field.label, "5x4");
        assert!(field.in_bounds(Cell::new(0, 0)));
        assert!(field.in_bounds(Cell::new(4, 3)));
        assert!(!field.in_bounds(Cell::new(5, 0)));
        assert!(!field.in_bounds(Cell::new(0, 4)));
        assert!(!field.in_bounds(Cell::new(-1, 2)));
    }

    #[test]
    fn test_field_cells() {
        let field = Field::new(3, 2);
        let cells: Vec<Cell> = field.cells().collect();
        assert_eq!(cells.len(), field.cell_count());
        assert_eq!(cells[0], Cell::new(0, 0));
        assert_eq!(cells[5], Cell::new(2, 1));
    }
}
