//! Players, open rooms and active games, and the lifecycle that ties them
//! together: login, matchmaking, single player, ship placement, attacks,
//! forfeits and win accounting.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use log::{info, warn};
use rand::Rng;

use crate::bot::Bot;
use crate::common::{GameError, GameId, PlayerId, Position, RoomId};
use crate::config::BOT_ID;
use crate::game::{AttackResult, Game, GameStatus};
use crate::password::{hash_password, verify_password};
use crate::ship::Ship;

/// A registered player. Survives disconnects for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    id: PlayerId,
    name: String,
    password: String,
    wins: u32,
}

impl Player {
    /// Session currently bound to this player.
    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn wins(&self) -> u32 {
        self.wins
    }
}

/// A player waiting for an opponent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub owner: PlayerId,
    pub owner_name: String,
}

/// What a disconnect tore down.
#[derive(Debug, Default)]
pub struct Logout {
    pub closed_rooms: Vec<Room>,
    /// Games forfeited by the leaving player, each with its winner set.
    pub closed_games: Vec<Game>,
}

/// Snapshot of a game right after an attack. The game itself may already be
/// gone from the registry when it finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackOutcome {
    pub game: GameId,
    pub players: [PlayerId; 2],
    pub results: Vec<AttackResult>,
    pub current_player: PlayerId,
    pub status: GameStatus,
    pub winner: Option<PlayerId>,
}

/// Owner of all players, rooms and active games.
#[derive(Debug, Default)]
pub struct Directory {
    /// In registration order; ties in the winners table keep this order.
    players: Vec<Player>,
    rooms: BTreeMap<RoomId, Room>,
    games: BTreeMap<GameId, Game>,
    last_id: u64,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    /// Log in by name. Unknown names register a new player; known names must
    /// present the same password and get re-bound to `session`. A session is
    /// bound to at most one player.
    pub fn login(&mut self, session: PlayerId, name: &str, password: &str) -> Result<&Player, GameError> {
        if self.players.iter().any(|p| p.id == session && p.name != name) {
            warn!("session {} is already logged in; {:?} refused", session, name);
            return Err(GameError::AlreadyLoggedIn);
        }
        match self.players.iter().position(|p| p.name == name) {
            Some(idx) => {
                let player = &mut self.players[idx];
                if !verify_password(password, &player.password) {
                    warn!("rejected login for {:?} from session {}", name, session);
                    return Err(GameError::InvalidCredentials);
                }
                player.id = session;
                info!("player {:?} re-bound to session {}", name, session);
                Ok(&self.players[idx])
            }
            None => {
                self.players.push(Player {
                    id: session,
                    name: name.to_string(),
                    password: hash_password(password),
                    wins: 0,
                });
                info!("registered player {:?} on session {}", name, session);
                Ok(&self.players[self.players.len() - 1])
            }
        }
    }

    /// Drop everything `session` holds: its rooms are closed and its games
    /// are forfeited to the opponent.
    pub fn logout(&mut self, session: PlayerId) -> Logout {
        let closed_rooms = self.remove_rooms_of(session);
        let forfeited: Vec<GameId> = self
            .games
            .values()
            .filter(|g| g.is_participant(session))
            .map(Game::id)
            .collect();

        let mut closed_games = Vec::with_capacity(forfeited.len());
        for id in forfeited {
            if let Some(game) = self.games.get_mut(&id) {
                game.give_up(session);
            }
            if let Some(game) = self.close_game(id) {
                closed_games.push(game);
            }
        }
        Logout {
            closed_rooms,
            closed_games,
        }
    }

    /// Open a room for `session`. A player may own at most one room.
    pub fn create_room(&mut self, session: PlayerId) -> Result<&Room, GameError> {
        let owner_name = self
            .player_by_session(session)
            .ok_or(GameError::UnknownPlayer)?
            .name
            .clone();
        if self.rooms.values().any(|r| r.owner == session) {
            return Err(GameError::RoomAlreadyExists);
        }
        let id = self.next_id();
        info!("player {} opened room {}", session, id);
        Ok(&*self.rooms.entry(id).or_insert(Room {
            id,
            owner: session,
            owner_name,
        }))
    }

    /// Join `room`, turning it into a game. Joining one's own room does
    /// nothing and returns `None`.
    pub fn join_room(&mut self, room: RoomId, session: PlayerId) -> Result<Option<&Game>, GameError> {
        let owner = self.rooms.get(&room).ok_or(GameError::RoomNotFound)?.owner;
        if owner == session {
            return Ok(None);
        }
        if self.player_by_session(session).is_none() {
            return Err(GameError::UnknownPlayer);
        }
        self.rooms.remove(&room);
        self.remove_rooms_of(session);

        let id = self.next_id();
        info!("room {} became game {} ({} vs {})", room, id, owner, session);
        Ok(Some(&*self.games.entry(id).or_insert(Game::new(id, [owner, session]))))
    }

    /// Start a game against the bot, whose fleet is placed immediately.
    pub fn start_single_player<R: Rng + ?Sized>(
        &mut self,
        session: PlayerId,
        rng: &mut R,
    ) -> Result<&Game, GameError> {
        if self.player_by_session(session).is_none() {
            return Err(GameError::UnknownPlayer);
        }
        self.remove_rooms_of(session);

        let id = self.next_id();
        let mut game = Game::new(id, [BOT_ID, session]);
        game.set_ships(BOT_ID, Bot::place_fleet(rng)?, rng)?;
        info!("player {} started single player game {}", session, id);
        Ok(&*self.games.entry(id).or_insert(game))
    }

    /// Record the fleet of `session` in `game`. Returns the game when this
    /// placement started it.
    pub fn add_ships<R: Rng + ?Sized>(
        &mut self,
        game: GameId,
        session: PlayerId,
        ships: Vec<Ship>,
        rng: &mut R,
    ) -> Result<Option<&Game>, GameError> {
        let entry = self.games.get_mut(&game).ok_or(GameError::MatchNotFound)?;
        entry.set_ships(session, ships, rng)?;
        Ok((entry.status() == GameStatus::Started).then_some(&*entry))
    }

    /// Fire in `game` on behalf of `session`. A finished game is closed
    /// before returning.
    pub fn attack<R: Rng + ?Sized>(
        &mut self,
        game: GameId,
        session: PlayerId,
        position: Option<Position>,
        rng: &mut R,
    ) -> Result<AttackOutcome, GameError> {
        let entry = self.games.get_mut(&game).ok_or(GameError::MatchNotFound)?;
        let results = entry.attack(session, position, rng)?;
        let outcome = AttackOutcome {
            game,
            players: entry.players(),
            results,
            current_player: entry.current_player(),
            status: entry.status(),
            winner: entry.winner(),
        };
        if outcome.status == GameStatus::Finished {
            self.close_game(game);
        }
        Ok(outcome)
    }

    /// Remove a finished game and credit its winner.
    fn close_game(&mut self, id: GameId) -> Option<Game> {
        let winner = self.games.get(&id)?.winner()?;
        let game = self.games.remove(&id)?;
        if winner != BOT_ID {
            match self.players.iter_mut().find(|p| p.id == winner) {
                Some(player) => player.wins += 1,
                None => warn!("winner {} of game {} is not a registered player", winner, id),
            }
        }
        info!("closed game {}", id);
        Some(game)
    }

    fn remove_rooms_of(&mut self, session: PlayerId) -> Vec<Room> {
        let ids: Vec<RoomId> = self
            .rooms
            .values()
            .filter(|r| r.owner == session)
            .map(|r| r.id)
            .collect();
        ids.into_iter().filter_map(|id| self.rooms.remove(&id)).collect()
    }

    /// Players with at least one win, most wins first.
    pub fn winners(&self) -> Vec<&Player> {
        let mut winners: Vec<&Player> = self.players.iter().filter(|p| p.wins > 0).collect();
        winners.sort_by(|a, b| b.wins.cmp(&a.wins));
        winners
    }

    /// Open rooms, oldest first.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    pub fn player_by_session(&self, session: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == session)
    }

    pub fn player_by_name(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn game(&self, id: GameId) -> Option<&Game> {
        self.games.get(&id)
    }

    /// Number of games in the active registry.
    pub fn active_games(&self) -> usize {
        self.games.len()
    }
}
