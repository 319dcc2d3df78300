//! Common types for the game core: identifiers, positions and errors.

/// Identity of a connected player. Assigned per connection by the transport
/// layer; `BOT_ID` is reserved for the computer opponent.
pub type PlayerId = u64;
/// Identity of a game in the active registry.
pub type GameId = u64;
/// Identity of an open room.
pub type RoomId = u64;

/// A cell coordinate. Signed so that perimeter cells of a ship touching the
/// edge can be expressed before they are clipped to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Position shifted by `(dx, dy)`.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Errors returned by game, directory and ship operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    /// Session is not logged in, or player is not a participant of the game.
    UnknownPlayer,
    /// Name exists and the password does not match.
    InvalidCredentials,
    /// Session is already logged in under another name.
    AlreadyLoggedIn,
    /// Player already owns an open room.
    RoomAlreadyExists,
    /// No open room with the requested id.
    RoomNotFound,
    /// No active game with the requested id.
    MatchNotFound,
    /// Game already has a winner.
    AlreadyFinished,
    /// Ships for this slot were already recorded.
    AlreadyPlaced,
    /// Ship length out of range or ship not fully on the board.
    InvalidShip,
    /// A state that should be unreachable.
    InvariantViolation(&'static str),
}

impl core::fmt::Display for GameError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            GameError::UnknownPlayer => write!(f, "Player not found"),
            GameError::InvalidCredentials => write!(f, "Invalid password"),
            GameError::AlreadyLoggedIn => write!(f, "Session already logged in"),
            GameError::RoomAlreadyExists => write!(f, "Room already exists"),
            GameError::RoomNotFound => write!(f, "Room not found"),
            GameError::MatchNotFound => write!(f, "Game not found"),
            GameError::AlreadyFinished => write!(f, "Game already finished"),
            GameError::AlreadyPlaced => write!(f, "Ships already placed"),
            GameError::InvalidShip => write!(f, "Invalid ship placement"),
            GameError::InvariantViolation(what) => write!(f, "Invariant violated: {}", what),
        }
    }
}

impl core::error::Error for GameError {}
