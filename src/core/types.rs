//! Core type definitions used throughout the codebase

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for games
    GameId
);
uuid_id!(
    /// Unique identifier for players (owned by the account subsystem)
    PlayerId
);
uuid_id!(
    /// Unique identifier for deployed stacks
    UnitId
);
uuid_id!(
    /// Unique identifier for field templates
    FieldId
);
uuid_id!(
    /// Roster entry in a player's collection; carries the catalog unit type
    RosterEntryId
);

/// A cell on the battle grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance on the square grid
    pub fn distance(&self, other: &Self) -> u32 {
        ((self.x - other.x).abs() + (self.y - other.y).abs()) as u32
    }

    /// The four orthogonal neighbours (no bounds check)
    pub fn neighbors(&self) -> [Cell; 4] {
        [
            Cell::new(self.x + 1, self.y),
            Cell::new(self.x - 1, self.y),
            Cell::new(self.x, self.y + 1),
            Cell::new(self.x, self.y - 1),
        ]
    }

    /// Cells on the rasterized line from self to other (inclusive), Bresenham
    pub fn line_to(&self, other: &Self) -> Vec<Cell> {
        let dx = (other.x - self.x).abs();
        let dy = -(other.y - self.y).abs();
        let sx = if self.x < other.x { 1 } else { -1 };
        let sy = if self.y < other.y { 1 } else { -1 };

        let mut results = Vec::with_capacity((dx.max(-dy) + 1) as usize);
        let (mut x, mut y) = (self.x, self.y);
        let mut err = dx + dy;

        loop {
            results.push(Cell::new(x, y));
            if x == other.x && y == other.y {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
        results
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(GameId::new(), GameId::new());
        assert_ne!(UnitId::new(), UnitId::new());
    }

    #[test]
    fn test_cell_distance_same() {
        let a = Cell::new(2, 3);
        assert_eq!(a.distance(&a), 0);
    }

    #[test]
    fn test_cell_distance_is_manhattan() {
        let a = Cell::new(0, 0);
        let b = Cell::new(3, 4);
        assert_eq!(a.distance(&b), 7);
        assert_eq!(b.distance(&a), 7);
    }

    #[test]
    fn test_neighbors_are_adjacent() {
        let c = Cell::new(5, 5);
        for n in c.neighbors() {
            assert_eq!(c.distance(&n), 1);
        }
    }

    #[test]
    fn test_line_straight() {
        let line = Cell::new(0, 0).line_to(&Cell::new(3, 0));
        assert_eq!(
            line,
            vec![Cell::new(0, 0), Cell::new(1, 0), Cell::new(2, 0), Cell::new(3, 0)]
        );
    }

    #[test]
    fn test_line_diagonal() {
        let line = Cell::new(0, 0).line_to(&Cell::new(3, 3));
        assert_eq!(line.len(), 4);
        assert_eq!(line[1], Cell::new(1, 1));
        assert_eq!(line[2], Cell::new(2, 2));
    }

    #[test]
    fn test_line_is_reversible_in_length() {
        let a = Cell::new(1, 4);
        let b = Cell::new(6, 1);
        let forward = a.line_to(&b);
        let back = b.line_to(&a);
        assert_eq!(forward.len(), back.len());
        assert_eq!(forward.first(), Some(&a));
        assert_eq!(forward.last(), Some(&b));
    }

    #[test]
    fn test_line_single_cell() {
        let a = Cell::new(2, 2);
        assert_eq!(a.line_to(&a), vec![a]);
    }
}
