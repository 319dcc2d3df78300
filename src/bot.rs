//! Computer opponent: random fleet layout and shot timing.
//!
//! The bot never looks at the human's fleet. Its shots go through the normal
//! attack path without a position, so the game picks a random unknown cell.

use alloc::vec::Vec;
use core::time::Duration;
use log::warn;
use rand::Rng;

use crate::bitboard::BitBoard;
use crate::board::Board;
use crate::common::{GameError, Position};
use crate::config::{BOARD_SIZE, BOT_MAX_DELAY_MS, BOT_MIN_DELAY_MS, FLEET};
use crate::ship::{Orientation, Ship};

type BB = BitBoard<u128, BOARD_SIZE>;

/// Full layouts tried before giving up.
const MAX_LAYOUT_ATTEMPTS: usize = 100;

/// Shot timing for the computer opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bot {
    min_delay: Duration,
    max_delay: Duration,
}

impl Default for Bot {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(BOT_MIN_DELAY_MS),
            Duration::from_millis(BOT_MAX_DELAY_MS),
        )
    }
}

impl Bot {
    /// `min_delay` and `max_delay` bound the pause before each shot. A
    /// reversed window is normalised.
    pub fn new(min_delay: Duration, max_delay: Duration) -> Self {
        Self {
            min_delay: min_delay.min(max_delay),
            max_delay: max_delay.max(min_delay),
        }
    }

    /// Pause before the next shot, uniform in `[min_delay, max_delay]` at
    /// millisecond resolution.
    pub fn think_time<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let min = self.min_delay.as_millis() as u64;
        let max = self.max_delay.as_millis() as u64;
        Duration::from_millis(rng.random_range(min..=max))
    }

    /// A random layout of the standard fleet in which no two ships overlap
    /// or touch, corners included.
    pub fn place_fleet<R: Rng + ?Sized>(rng: &mut R) -> Result<Vec<Ship>, GameError> {
        Self::place_lengths(rng, &FLEET)
    }

    /// Like [`Bot::place_fleet`] for an arbitrary list of ship lengths.
    pub fn place_lengths<R: Rng + ?Sized>(
        rng: &mut R,
        lengths: &[usize],
    ) -> Result<Vec<Ship>, GameError> {
        for attempt in 0..MAX_LAYOUT_ATTEMPTS {
            if let Some(fleet) = Self::try_layout(rng, lengths)? {
                return Ok(fleet);
            }
            warn!("fleet layout attempt {} got stuck, retrying", attempt + 1);
        }
        Err(GameError::InvariantViolation("unable to lay out bot fleet"))
    }

    fn try_layout<R: Rng + ?Sized>(
        rng: &mut R,
        lengths: &[usize],
    ) -> Result<Option<Vec<Ship>>, GameError> {
        let mut blocked = BB::new();
        let mut fleet = Vec::with_capacity(lengths.len());
        for &length in lengths {
            let candidates = Self::candidates(&blocked, length)?;
            if candidates.is_empty() {
                return Ok(None);
            }
            let ship = candidates[rng.random_range(0..candidates.len())].clone();
            for pos in ship.cells().iter().chain(ship.perimeter()) {
                if Board::contains(*pos) {
                    blocked.insert(pos.x as usize, pos.y as usize);
                }
            }
            fleet.push(ship);
        }
        Ok(Some(fleet))
    }

    /// Every on-board placement of a `length` ship avoiding `blocked` cells.
    fn candidates(blocked: &BB, length: usize) -> Result<Vec<Ship>, GameError> {
        let mut out = Vec::new();
        for orientation in [Orientation::Horizontal, Orientation::Vertical] {
            for y in 0..BOARD_SIZE as i32 {
                for x in 0..BOARD_SIZE as i32 {
                    let ship = Ship::new(Position::new(x, y), length, orientation)?;
                    let fits = ship.cells().iter().all(|c| {
                        Board::contains(*c) && !blocked.contains(c.x as usize, c.y as usize)
                    });
                    if fits {
                        out.push(ship);
                    }
                }
            }
        }
        Ok(out)
    }
}
