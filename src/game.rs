//! One match between two players: boards, fleets, turn order and winner.

use alloc::vec::Vec;
use log::{debug, info};
use rand::Rng;

use crate::bitboard::BitBoard;
use crate::board::{Board, Cell};
use crate::common::{GameError, GameId, PlayerId, Position};
use crate::config::BOARD_SIZE;
use crate::ship::Ship;

/// Current status of a game, derived from its fleets and winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// At least one side has not placed ships.
    Created,
    Started,
    Finished,
}

/// Outcome of a shot at a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "lowercase"))]
pub enum AttackStatus {
    Miss,
    /// Hit a ship that is still afloat.
    Shot,
    /// Cell of a ship that has just been destroyed.
    Killed,
}

/// One affected cell of an attack, as reported to both players.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackResult {
    pub position: Position,
    /// The attacking player.
    pub player: PlayerId,
    pub status: AttackStatus,
}

/// Core game logic for a single match.
#[derive(Debug, Clone)]
pub struct Game {
    id: GameId,
    players: [PlayerId; 2],
    boards: [Board; 2],
    ships: [Vec<Ship>; 2],
    current: usize,
    winner: Option<PlayerId>,
}

impl Game {
    /// Create a game between two players; slot 0 moves first until ships are
    /// placed and the first mover is drawn.
    pub fn new(id: GameId, players: [PlayerId; 2]) -> Self {
        Self {
            id,
            players,
            boards: [Board::new(), Board::new()],
            ships: [Vec::new(), Vec::new()],
            current: 0,
            winner: None,
        }
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn players(&self) -> [PlayerId; 2] {
        self.players
    }

    pub fn is_participant(&self, player: PlayerId) -> bool {
        self.players.contains(&player)
    }

    fn slot_of(&self, player: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| *p == player)
    }

    /// Player whose move it is.
    pub fn current_player(&self) -> PlayerId {
        self.players[self.current]
    }

    /// Player waiting for the current player to move.
    pub fn enemy_player(&self) -> PlayerId {
        self.players[1 - self.current]
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    pub fn status(&self) -> GameStatus {
        if self.winner.is_some() {
            GameStatus::Finished
        } else if self.ships.iter().all(|fleet| !fleet.is_empty()) {
            GameStatus::Started
        } else {
            GameStatus::Created
        }
    }

    /// Ships placed by `player`, empty if none or not a participant.
    pub fn ships_of(&self, player: PlayerId) -> &[Ship] {
        match self.slot_of(player) {
            Some(slot) => &self.ships[slot],
            None => &[],
        }
    }

    /// Shots received by `player`.
    pub fn board_of(&self, player: PlayerId) -> Option<&Board> {
        self.slot_of(player).map(|slot| &self.boards[slot])
    }

    /// Record the fleet of `player`. The call that completes both fleets
    /// draws the first mover.
    pub fn set_ships<R: Rng + ?Sized>(
        &mut self,
        player: PlayerId,
        ships: Vec<Ship>,
        rng: &mut R,
    ) -> Result<(), GameError> {
        if self.status() == GameStatus::Finished {
            return Err(GameError::AlreadyFinished);
        }
        let slot = self.slot_of(player).ok_or(GameError::UnknownPlayer)?;
        if !self.ships[slot].is_empty() {
            return Err(GameError::AlreadyPlaced);
        }
        if !Self::valid_fleet(&ships) {
            return Err(GameError::InvalidShip);
        }
        self.ships[slot] = ships;

        if self.status() == GameStatus::Started {
            self.current = if rng.random_bool(0.5) { 1 } else { 0 };
            info!(
                "game {} started, player {} moves first",
                self.id,
                self.current_player()
            );
        }
        Ok(())
    }

    /// Non-empty, fully on the board, and no two ships overlap or touch,
    /// corners included.
    fn valid_fleet(ships: &[Ship]) -> bool {
        let mut blocked = BitBoard::<u128, BOARD_SIZE>::new();
        for ship in ships {
            let clear = ship.cells().iter().all(|c| {
                Board::contains(*c) && !blocked.contains(c.x as usize, c.y as usize)
            });
            if !clear {
                return false;
            }
            for pos in ship.cells().iter().chain(ship.perimeter()) {
                if Board::contains(*pos) {
                    blocked.insert(pos.x as usize, pos.y as usize);
                }
            }
        }
        !ships.is_empty()
    }

    /// Fire at `position`, or at a random unknown cell of the opponent's board
    /// when no position is given. Out-of-turn and repeated shots yield no
    /// results and change nothing.
    pub fn attack<R: Rng + ?Sized>(
        &mut self,
        player: PlayerId,
        position: Option<Position>,
        rng: &mut R,
    ) -> Result<Vec<AttackResult>, GameError> {
        if self.status() != GameStatus::Started || player != self.current_player() {
            return Ok(Vec::new());
        }
        let enemy = 1 - self.current;
        let target = match position {
            Some(pos) => pos,
            None => self.boards[enemy]
                .random_empty_position(rng)
                .ok_or(GameError::InvariantViolation("random attack on a fully resolved board"))?,
        };
        if !self.boards[enemy].is_empty_at(target) {
            return Ok(Vec::new());
        }

        let Some(hit) = self.ships[enemy].iter_mut().position(|s| s.register_hit(target)) else {
            self.boards[enemy].set(target, Cell::Miss);
            self.current = enemy;
            debug!("game {}: player {} missed at {}", self.id, player, target);
            return Ok(alloc::vec![AttackResult {
                position: target,
                player,
                status: AttackStatus::Miss,
            }]);
        };

        let ship = &self.ships[enemy][hit];
        if !ship.is_destroyed() {
            self.boards[enemy].set(target, Cell::Hit);
            debug!("game {}: player {} hit at {}", self.id, player, target);
            return Ok(alloc::vec![AttackResult {
                position: target,
                player,
                status: AttackStatus::Shot,
            }]);
        }

        let board = &mut self.boards[enemy];
        let mut results = Vec::with_capacity(ship.cells().len() + ship.perimeter().len());
        for &pos in ship.cells().iter().filter(|p| Board::contains(**p)) {
            board.set(pos, Cell::Hit);
            results.push(AttackResult {
                position: pos,
                player,
                status: AttackStatus::Killed,
            });
        }
        for &pos in ship.perimeter().iter().filter(|p| Board::contains(**p)) {
            board.set(pos, Cell::Miss);
            results.push(AttackResult {
                position: pos,
                player,
                status: AttackStatus::Miss,
            });
        }
        info!(
            "game {}: player {} destroyed a {}-cell ship",
            self.id,
            player,
            ship.length()
        );

        self.check_winner();
        Ok(results)
    }

    fn check_winner(&mut self) {
        let attacker = self.current;
        let defender = 1 - attacker;
        if self.ships[defender].iter().all(Ship::is_destroyed) {
            self.winner = Some(self.players[attacker]);
        } else if self.ships[attacker].iter().all(Ship::is_destroyed) {
            self.winner = Some(self.players[defender]);
        }
        if let Some(winner) = self.winner {
            info!("game {} finished, winner {}", self.id, winner);
        }
    }

    /// Forfeit on behalf of `player`: the other participant wins. Does nothing
    /// once a winner exists or if `player` is not in this game.
    pub fn give_up(&mut self, player: PlayerId) {
        if self.winner.is_some() {
            return;
        }
        if let Some(slot) = self.slot_of(player) {
            self.winner = Some(self.players[1 - slot]);
            info!("game {}: player {} gave up", self.id, player);
        }
    }
}
