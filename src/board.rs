//! Shot-tracking grid for one side of a game, backed by `BitBoard`s.

use alloc::vec::Vec;
use core::fmt;
use rand::Rng;

use crate::bitboard::BitBoard;
use crate::common::Position;
use crate::config::BOARD_SIZE;

type BB = BitBoard<u128, BOARD_SIZE>;

/// What is known about a cell of a board under attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    /// Not shot at yet.
    Unknown,
    Miss,
    Hit,
}

/// Shots received by one player. A cell leaves `Unknown` at most once.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Board {
    hits: BB,
    misses: BB,
}

impl Board {
    /// Create a board with every cell unknown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Side length of the board.
    pub const fn size() -> usize {
        BOARD_SIZE
    }

    /// Whether `pos` lies on the board.
    pub fn contains(pos: Position) -> bool {
        Self::coords(pos).is_some()
    }

    fn coords(pos: Position) -> Option<(usize, usize)> {
        let size = BOARD_SIZE as i32;
        (pos.x >= 0 && pos.x < size && pos.y >= 0 && pos.y < size)
            .then_some((pos.x as usize, pos.y as usize))
    }

    /// State of the cell at `pos`, or `None` outside the board.
    pub fn get(&self, pos: Position) -> Option<Cell> {
        let (x, y) = Self::coords(pos)?;
        Some(if self.hits.contains(x, y) {
            Cell::Hit
        } else if self.misses.contains(x, y) {
            Cell::Miss
        } else {
            Cell::Unknown
        })
    }

    /// Resolve the cell at `pos`. Positions outside the board are ignored, as
    /// are cells that are already resolved. Returns whether the board changed.
    pub fn set(&mut self, pos: Position, cell: Cell) -> bool {
        let Some((x, y)) = Self::coords(pos) else {
            return false;
        };
        if self.hits.contains(x, y) || self.misses.contains(x, y) {
            return false;
        }
        match cell {
            Cell::Hit => self.hits.insert(x, y),
            Cell::Miss => self.misses.insert(x, y),
            Cell::Unknown => false,
        }
    }

    pub fn is_empty_at(&self, pos: Position) -> bool {
        self.get(pos) == Some(Cell::Unknown)
    }

    fn unknown(&self) -> BB {
        !(self.hits | self.misses)
    }

    /// All unknown cells in row-major order.
    pub fn empty_positions(&self) -> Vec<Position> {
        self.unknown()
            .iter()
            .map(|(x, y)| Position::new(x as i32, y as i32))
            .collect()
    }

    /// Number of unknown cells.
    pub fn empty_count(&self) -> usize {
        self.unknown().count()
    }

    /// Uniformly pick one of the cells that are still unknown.
    pub fn random_empty_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Position> {
        let empty = self.unknown();
        let count = empty.count();
        if count == 0 {
            return None;
        }
        let (x, y) = empty.iter().nth(rng.random_range(0..count))?;
        Some(Position::new(x as i32, y as i32))
    }

    /// Every cell has been shot at.
    pub fn is_resolved(&self) -> bool {
        (self.hits | self.misses).is_full()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board {{")?;
        for y in 0..BOARD_SIZE {
            write!(f, "  ")?;
            for x in 0..BOARD_SIZE {
                let mark = if self.hits.contains(x, y) {
                    'X'
                } else if self.misses.contains(x, y) {
                    'o'
                } else {
                    '.'
                };
                write!(f, "{}", mark)?;
            }
            writeln!(f)?;
        }
        write!(f, "}}")
    }
}
