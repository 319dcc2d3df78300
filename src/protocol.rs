//! Commands accepted from clients and notifications sent back, independent of
//! any encoding. The JSON envelope lives in `wire`.

use alloc::string::String;
use alloc::vec::Vec;

use crate::common::{GameError, GameId, PlayerId, Position, RoomId};
use crate::game::AttackStatus;
use crate::ship::{Orientation, Ship};

/// A decoded client request. The caller identity travels next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { name: String, password: String },
    SinglePlay,
    CreateRoom,
    AddUserToRoom { room: RoomId },
    AddShips {
        game: GameId,
        player: PlayerId,
        ships: Vec<ShipData>,
    },
    /// Attack at `position`, or at a random cell when it is absent.
    Attack {
        game: GameId,
        player: PlayerId,
        position: Option<Position>,
    },
    RandomAttack { game: GameId, player: PlayerId },
}

impl Command {
    /// Name used in logs and rejection notices.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Login { .. } => "reg",
            Command::SinglePlay => "single_play",
            Command::CreateRoom => "create_room",
            Command::AddUserToRoom { .. } => "add_user_to_room",
            Command::AddShips { .. } => "add_ships",
            Command::Attack { .. } => "attack",
            Command::RandomAttack { .. } => "randomAttack",
        }
    }
}

/// A ship as described by clients and echoed back in `start_game`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipData {
    pub position: Position,
    /// `true` for vertical ships.
    pub direction: bool,
    pub length: usize,
    pub kind: String,
}

impl ShipData {
    pub fn to_ship(&self) -> Result<Ship, GameError> {
        Ship::new(
            self.position,
            self.length,
            Orientation::from_vertical(self.direction),
        )
    }
}

impl From<&Ship> for ShipData {
    fn from(ship: &Ship) -> Self {
        ShipData {
            position: ship.anchor(),
            direction: ship.orientation().is_vertical(),
            length: ship.length(),
            kind: ship.kind().into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinnerEntry {
    pub name: String,
    pub wins: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomEntry {
    pub room: RoomId,
    /// `(index, name)` of each waiting player.
    pub users: Vec<(PlayerId, String)>,
}

/// A message produced by the core for one or more sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Registration {
        name: String,
        index: PlayerId,
        error: Option<String>,
    },
    Winners(Vec<WinnerEntry>),
    Rooms(Vec<RoomEntry>),
    GameCreated { game: GameId, player: PlayerId },
    /// Sent to each participant with that participant's own fleet.
    GameStarted {
        ships: Vec<ShipData>,
        current_player: PlayerId,
    },
    Turn { current_player: PlayerId },
    AttackResult {
        position: Position,
        current_player: PlayerId,
        status: AttackStatus,
    },
    Finish { winner: PlayerId },
    /// A command failed; only the caller is told.
    Rejected { command: &'static str, text: String },
}

/// Who should receive a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    Session(PlayerId),
    Sessions(Vec<PlayerId>),
    /// Every connected session.
    All,
}

impl Recipient {
    pub fn includes(&self, session: PlayerId) -> bool {
        match self {
            Recipient::Session(id) => *id == session,
            Recipient::Sessions(ids) => ids.contains(&session),
            Recipient::All => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub to: Recipient,
    pub notification: Notification,
}

impl Outbound {
    pub fn new(to: Recipient, notification: Notification) -> Self {
        Self { to, notification }
    }
}
