//! Command dispatch: runs one command against the directory and turns the
//! result into notifications for the right sessions.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use log::{debug, error, info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::common::{GameError, GameId, PlayerId, Position};
use crate::config::BOT_ID;
use crate::directory::Directory;
use crate::game::{Game, GameStatus};
use crate::protocol::{
    Command, Notification, Outbound, Recipient, RoomEntry, ShipData, WinnerEntry,
};
use crate::ship::Ship;

/// Everything a command caused, for the arbiter to act on.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Effects {
    /// Notifications in the order they must be delivered.
    pub outbound: Vec<Outbound>,
    /// Games in which the bot moves next.
    pub bot_turns: Vec<GameId>,
    /// Games that left the active registry.
    pub closed_games: Vec<GameId>,
}

impl Effects {
    fn send(&mut self, to: Recipient, notification: Notification) {
        self.outbound.push(Outbound::new(to, notification));
    }

    fn reject(&mut self, caller: PlayerId, command: &'static str, err: GameError) {
        warn!("{} from session {} rejected: {}", command, caller, err);
        self.send(
            Recipient::Session(caller),
            Notification::Rejected {
                command,
                text: err.to_string(),
            },
        );
    }

    pub fn is_empty(&self) -> bool {
        self.outbound.is_empty() && self.bot_turns.is_empty() && self.closed_games.is_empty()
    }
}

/// Owns the directory and the game RNG. Every method runs one request to
/// completion.
pub struct Dispatcher {
    directory: Directory,
    rng: SmallRng,
}

impl Dispatcher {
    pub fn new(rng: SmallRng) -> Self {
        Self {
            directory: Directory::new(),
            rng,
        }
    }

    /// Dispatcher with a fixed seed, for reproducible games.
    pub fn seeded(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Run a client command on behalf of `caller`.
    pub fn handle(&mut self, caller: PlayerId, command: Command) -> Effects {
        let name = command.name();
        debug!("session {} sent {}", caller, name);
        let mut fx = Effects::default();
        match command {
            Command::Login { name: login, password } => self.login(caller, login, &password, &mut fx),
            Command::SinglePlay => {
                match self
                    .directory
                    .start_single_player(caller, &mut self.rng)
                    .map(Game::id)
                {
                    Ok(game) => {
                        fx.send(
                            Recipient::Session(caller),
                            Notification::GameCreated {
                                game,
                                player: caller,
                            },
                        );
                        fx.send(Recipient::All, self.rooms());
                    }
                    Err(err) => fx.reject(caller, name, err),
                }
            }
            Command::CreateRoom => match self.directory.create_room(caller) {
                Ok(_) => fx.send(Recipient::All, self.rooms()),
                Err(err) => fx.reject(caller, name, err),
            },
            Command::AddUserToRoom { room } => match self
                .directory
                .join_room(room, caller)
                .map(|game| game.map(|g| (g.id(), g.players())))
            {
                Ok(Some((id, players))) => {
                    for player in players {
                        fx.send(
                            Recipient::Session(player),
                            Notification::GameCreated { game: id, player },
                        );
                    }
                    fx.send(Recipient::All, self.rooms());
                }
                Ok(None) => debug!("session {} tried to join its own room {}", caller, room),
                Err(err) => fx.reject(caller, name, err),
            },
            Command::AddShips { game, player, ships } => {
                if self.impersonates(caller, player, name) {
                    return fx;
                }
                let ships: Result<Vec<Ship>, GameError> = ships.iter().map(ShipData::to_ship).collect();
                let placed = match ships {
                    Ok(ships) => self.directory.add_ships(game, caller, ships, &mut self.rng),
                    Err(err) => Err(err),
                };
                match placed {
                    Ok(Some(game)) => Self::announce_start(game, &mut fx),
                    Ok(None) => debug!("session {} placed ships in game {}", caller, game),
                    Err(err) => fx.reject(caller, name, err),
                }
            }
            Command::Attack {
                game,
                player,
                position,
            } => {
                if !self.impersonates(caller, player, name) {
                    self.fire(game, caller, position, &mut fx);
                }
            }
            Command::RandomAttack { game, player } => {
                if !self.impersonates(caller, player, name) {
                    self.fire(game, caller, None, &mut fx);
                }
            }
        }
        fx
    }

    /// Take the bot's shot in `game`, if the game still exists and it is the
    /// bot's move.
    pub fn bot_turn(&mut self, game: GameId) -> Effects {
        let mut fx = Effects::default();
        match self.directory.game(game) {
            Some(g) if g.status() == GameStatus::Started && g.current_player() == BOT_ID => {
                self.fire(game, BOT_ID, None, &mut fx);
            }
            _ => debug!("stale bot turn for game {} ignored", game),
        }
        fx
    }

    /// Tear down everything `caller` held after its connection went away.
    pub fn disconnect(&mut self, caller: PlayerId) -> Effects {
        let mut fx = Effects::default();
        let logout = self.directory.logout(caller);
        if !logout.closed_rooms.is_empty() {
            fx.send(Recipient::All, self.rooms());
        }
        for game in &logout.closed_games {
            if let Some(winner) = game.winner() {
                fx.send(
                    Recipient::Sessions(game.players().to_vec()),
                    Notification::Finish { winner },
                );
            }
            fx.closed_games.push(game.id());
        }
        if !logout.closed_games.is_empty() {
            fx.send(Recipient::All, self.winners());
        }
        info!(
            "session {} disconnected: {} rooms and {} games closed",
            caller,
            logout.closed_rooms.len(),
            logout.closed_games.len()
        );
        fx
    }

    fn login(&mut self, caller: PlayerId, name: String, password: &str, fx: &mut Effects) {
        let to = Recipient::Session(caller);
        let login = self
            .directory
            .login(caller, &name, password)
            .map(|player| (player.name().to_string(), player.id()));
        match login {
            Ok((name, index)) => {
                let registration = Notification::Registration {
                    name,
                    index,
                    error: None,
                };
                fx.send(to.clone(), registration);
                fx.send(to.clone(), self.winners());
                fx.send(to, self.rooms());
            }
            Err(err) => fx.send(
                to,
                Notification::Registration {
                    name,
                    index: caller,
                    error: Some(err.to_string()),
                },
            ),
        }
    }

    /// Commands naming another player than the caller are dropped.
    fn impersonates(&self, caller: PlayerId, player: PlayerId, command: &str) -> bool {
        if caller != player {
            warn!(
                "session {} sent {} for player {}; dropped",
                caller, command, player
            );
            return true;
        }
        false
    }

    fn announce_start(game: &Game, fx: &mut Effects) {
        let current = game.current_player();
        for player in game.players() {
            let ships = game.ships_of(player).iter().map(ShipData::from).collect();
            fx.send(
                Recipient::Session(player),
                Notification::GameStarted {
                    ships,
                    current_player: current,
                },
            );
        }
        fx.send(
            Recipient::Sessions(game.players().to_vec()),
            Notification::Turn {
                current_player: current,
            },
        );
        if current == BOT_ID {
            fx.bot_turns.push(game.id());
        }
    }

    fn fire(&mut self, game: GameId, shooter: PlayerId, position: Option<Position>, fx: &mut Effects) {
        let outcome = match self.directory.attack(game, shooter, position, &mut self.rng) {
            Ok(outcome) => outcome,
            Err(GameError::InvariantViolation(what)) => {
                error!("attack in game {} by {} dropped: {}", game, shooter, what);
                return;
            }
            Err(err) if shooter == BOT_ID => {
                debug!("bot attack in game {} failed: {}", game, err);
                return;
            }
            Err(err) => return fx.reject(shooter, "attack", err),
        };
        if outcome.results.is_empty() {
            debug!("ignored attack in game {} by {}", game, shooter);
            return;
        }

        let players = Recipient::Sessions(outcome.players.to_vec());
        for result in &outcome.results {
            fx.send(
                players.clone(),
                Notification::AttackResult {
                    position: result.position,
                    current_player: result.player,
                    status: result.status,
                },
            );
        }
        fx.send(
            players.clone(),
            Notification::Turn {
                current_player: outcome.current_player,
            },
        );

        match outcome.winner {
            Some(winner) => {
                fx.send(players, Notification::Finish { winner });
                fx.send(Recipient::All, self.winners());
                fx.closed_games.push(game);
            }
            None if outcome.current_player == BOT_ID => fx.bot_turns.push(game),
            None => {}
        }
    }

    /// Current `update_room` payload.
    pub fn rooms(&self) -> Notification {
        Notification::Rooms(
            self.directory
                .rooms()
                .map(|r| RoomEntry {
                    room: r.id,
                    users: alloc::vec![(r.owner, r.owner_name.clone())],
                })
                .collect(),
        )
    }

    /// Current `update_winners` payload.
    pub fn winners(&self) -> Notification {
        Notification::Winners(
            self.directory
                .winners()
                .into_iter()
                .map(|p| WinnerEntry {
                    name: p.name().to_string(),
                    wins: p.wins(),
                })
                .collect(),
        )
    }
}
