//! Ship geometry: occupied cells, surrounding ring and per-cell health.

use alloc::vec::Vec;
use core::fmt;

use crate::common::{GameError, Position};
use crate::config::{ship_kind, MAX_SHIP_LENGTH};

/// Orientation of a ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    /// Wire encoding: `true` means vertical.
    pub fn from_vertical(vertical: bool) -> Self {
        if vertical {
            Orientation::Vertical
        } else {
            Orientation::Horizontal
        }
    }

    pub fn is_vertical(self) -> bool {
        self == Orientation::Vertical
    }

    fn step(self) -> (i32, i32) {
        match self {
            Orientation::Horizontal => (1, 0),
            Orientation::Vertical => (0, 1),
        }
    }
}

/// A ship anchored at a position. Geometry is fixed at construction; to move a
/// ship, build a new one.
#[derive(Clone, PartialEq, Eq)]
pub struct Ship {
    anchor: Position,
    length: usize,
    orientation: Orientation,
    cells: Vec<Position>,
    perimeter: Vec<Position>,
    health: Vec<bool>,
}

impl Ship {
    /// Place a ship of `length` cells at `anchor`, extending right
    /// (horizontal) or down (vertical).
    pub fn new(anchor: Position, length: usize, orientation: Orientation) -> Result<Self, GameError> {
        if length == 0 || length > MAX_SHIP_LENGTH {
            return Err(GameError::InvalidShip);
        }
        let (dx, dy) = orientation.step();
        let cells: Vec<Position> = (0..length as i32)
            .map(|i| anchor.offset(dx * i, dy * i))
            .collect();

        // Bounding box of the ship grown by one cell on every side, walked
        // row by row.
        let last = cells[length - 1];
        let mut perimeter = Vec::with_capacity(2 * length + 6);
        for y in anchor.y - 1..=last.y + 1 {
            for x in anchor.x - 1..=last.x + 1 {
                let pos = Position::new(x, y);
                if !cells.contains(&pos) {
                    perimeter.push(pos);
                }
            }
        }

        Ok(Ship {
            anchor,
            length,
            orientation,
            cells,
            perimeter,
            health: alloc::vec![true; length],
        })
    }

    /// Occupied cells, starting at the anchor.
    pub fn cells(&self) -> &[Position] {
        &self.cells
    }

    /// The one-cell ring around the ship, not clipped to any board.
    pub fn perimeter(&self) -> &[Position] {
        &self.perimeter
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.cell_index(pos).is_some()
    }

    fn cell_index(&self, pos: Position) -> Option<usize> {
        let (along, across) = match self.orientation {
            Orientation::Horizontal => (pos.x - self.anchor.x, pos.y - self.anchor.y),
            Orientation::Vertical => (pos.y - self.anchor.y, pos.x - self.anchor.x),
        };
        (across == 0 && along >= 0 && (along as usize) < self.length).then_some(along as usize)
    }

    /// Register a shot at `pos`. Returns `true` if `pos` is part of this
    /// ship, including cells that were already hit.
    pub fn register_hit(&mut self, pos: Position) -> bool {
        match self.cell_index(pos) {
            Some(i) => {
                self.health[i] = false;
                true
            }
            None => false,
        }
    }

    /// Check if every cell of the ship has been hit.
    pub fn is_destroyed(&self) -> bool {
        self.health.iter().all(|alive| !alive)
    }

    /// Number of cells not yet hit.
    pub fn remaining(&self) -> usize {
        self.health.iter().filter(|alive| **alive).count()
    }

    pub fn anchor(&self) -> Position {
        self.anchor
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Wire name of the ship class.
    pub fn kind(&self) -> &'static str {
        ship_kind(self.length)
    }
}

impl fmt::Debug for Ship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ship {{ anchor: {}, length: {}, orientation: {:?}, remaining: {} }}",
            self.anchor,
            self.length,
            self.orientation,
            self.remaining(),
        )
    }
}
