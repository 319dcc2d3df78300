#![cfg(feature = "std")]

//! JSON envelope used on the wire: `{"type": ..., "data": "<json>", "id": 0}`.
//!
//! `data` is itself a JSON document encoded as a string. Incoming frames may
//! also carry `data` as a plain object, or omit it for commands without
//! payload.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::common::{GameId, PlayerId, Position, RoomId};
use crate::protocol::{Command, Notification, ShipData};

/// Errors decoding an inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The `type` field names no known command.
    UnknownCommand(String),
    /// Envelope or payload does not have the expected shape.
    MalformedPayload(String),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProtocolError::UnknownCommand(kind) => write!(f, "Invalid message type: {}", kind),
            ProtocolError::MalformedPayload(why) => write!(f, "Malformed payload: {}", why),
        }
    }
}

impl std::error::Error for ProtocolError {}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    id: u32,
}

/// Every command name accepted on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommandKind {
    Login,
    SinglePlay,
    CreateRoom,
    AddUserToRoom,
    AddShips,
    Attack,
    RandomAttack,
}

impl CommandKind {
    fn parse(kind: &str) -> Option<Self> {
        Some(match kind {
            "reg" | "login" => CommandKind::Login,
            "single_play" => CommandKind::SinglePlay,
            "create_room" => CommandKind::CreateRoom,
            "add_user_to_room" => CommandKind::AddUserToRoom,
            "add_ships" => CommandKind::AddShips,
            "attack" => CommandKind::Attack,
            "randomAttack" | "random_attack" => CommandKind::RandomAttack,
            _ => return None,
        })
    }
}

#[derive(Deserialize)]
struct LoginPayload {
    name: String,
    password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoomPayload {
    index_room: RoomId,
}

#[derive(Serialize, Deserialize)]
struct ShipPayload {
    position: Position,
    direction: bool,
    length: usize,
    #[serde(rename = "type", default)]
    kind: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddShipsPayload {
    game_id: GameId,
    index_player: PlayerId,
    ships: Vec<ShipPayload>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttackPayload {
    game_id: GameId,
    index_player: PlayerId,
    #[serde(default)]
    x: Option<i32>,
    #[serde(default)]
    y: Option<i32>,
}

impl From<ShipPayload> for ShipData {
    fn from(p: ShipPayload) -> Self {
        ShipData {
            position: p.position,
            direction: p.direction,
            length: p.length,
            kind: p.kind,
        }
    }
}

impl From<&ShipData> for ShipPayload {
    fn from(s: &ShipData) -> Self {
        ShipPayload {
            position: s.position,
            direction: s.direction,
            length: s.length,
            kind: s.kind.clone(),
        }
    }
}

/// Unwrap the double-encoded `data` field. Empty or missing data becomes an
/// empty object.
fn payload(data: Value) -> Result<Value, ProtocolError> {
    match data {
        Value::Null => Ok(json!({})),
        Value::String(s) if s.trim().is_empty() => Ok(json!({})),
        Value::String(s) => {
            serde_json::from_str(&s).map_err(|e| ProtocolError::MalformedPayload(e.to_string()))
        }
        other => Ok(other),
    }
}

fn parse<T: serde::de::DeserializeOwned>(data: Value) -> Result<T, ProtocolError> {
    serde_json::from_value(data).map_err(|e| ProtocolError::MalformedPayload(e.to_string()))
}

/// Decode one inbound frame.
pub fn decode_command(frame: &str) -> Result<Command, ProtocolError> {
    let envelope: Envelope =
        serde_json::from_str(frame).map_err(|e| ProtocolError::MalformedPayload(e.to_string()))?;
    let kind = CommandKind::parse(&envelope.kind)
        .ok_or_else(|| ProtocolError::UnknownCommand(envelope.kind.clone()))?;
    let data = payload(envelope.data)?;

    Ok(match kind {
        CommandKind::Login => {
            let p: LoginPayload = parse(data)?;
            Command::Login {
                name: p.name,
                password: p.password,
            }
        }
        CommandKind::SinglePlay => Command::SinglePlay,
        CommandKind::CreateRoom => Command::CreateRoom,
        CommandKind::AddUserToRoom => {
            let p: RoomPayload = parse(data)?;
            Command::AddUserToRoom { room: p.index_room }
        }
        CommandKind::AddShips => {
            let p: AddShipsPayload = parse(data)?;
            Command::AddShips {
                game: p.game_id,
                player: p.index_player,
                ships: p.ships.into_iter().map(ShipData::from).collect(),
            }
        }
        CommandKind::Attack => {
            let p: AttackPayload = parse(data)?;
            let position = match (p.x, p.y) {
                (Some(x), Some(y)) => Some(Position::new(x, y)),
                _ => None,
            };
            Command::Attack {
                game: p.game_id,
                player: p.index_player,
                position,
            }
        }
        CommandKind::RandomAttack => {
            let p: AttackPayload = parse(data)?;
            Command::RandomAttack {
                game: p.game_id,
                player: p.index_player,
            }
        }
    })
}

fn notification_parts(notification: &Notification) -> (&'static str, Value) {
    match notification {
        Notification::Registration { name, index, error } => (
            "reg",
            json!({
                "name": name,
                "index": index,
                "error": error.is_some(),
                "errorText": error.as_deref().unwrap_or(""),
            }),
        ),
        Notification::Winners(winners) => (
            "update_winners",
            Value::Array(
                winners
                    .iter()
                    .map(|w| json!({ "name": w.name, "wins": w.wins }))
                    .collect(),
            ),
        ),
        Notification::Rooms(rooms) => (
            "update_room",
            Value::Array(
                rooms
                    .iter()
                    .map(|r| {
                        let users: Vec<Value> = r
                            .users
                            .iter()
                            .map(|(index, name)| json!({ "name": name, "index": index }))
                            .collect();
                        json!({ "roomId": r.room, "roomUsers": users })
                    })
                    .collect(),
            ),
        ),
        Notification::GameCreated { game, player } => {
            ("create_game", json!({ "idGame": game, "idPlayer": player }))
        }
        Notification::GameStarted {
            ships,
            current_player,
        } => {
            let ships: Vec<ShipPayload> = ships.iter().map(ShipPayload::from).collect();
            (
                "start_game",
                json!({ "ships": ships, "currentPlayerIndex": current_player }),
            )
        }
        Notification::Turn { current_player } => ("turn", json!({ "currentPlayer": current_player })),
        Notification::AttackResult {
            position,
            current_player,
            status,
        } => (
            "attack",
            json!({ "position": position, "currentPlayer": current_player, "status": status }),
        ),
        Notification::Finish { winner } => ("finish", json!({ "winPlayer": winner })),
        Notification::Rejected { command, text } => {
            ("error", json!({ "command": command, "errorText": text }))
        }
    }
}

/// Encode one outbound notification as a frame.
pub fn encode_notification(notification: &Notification) -> String {
    let (kind, data) = notification_parts(notification);
    let envelope = Envelope {
        kind: kind.to_string(),
        data: Value::String(data.to_string()),
        id: 0,
    };
    // An envelope of strings and numbers always serializes.
    serde_json::to_string(&envelope).unwrap_or_default()
}

/// Parse an outbound frame back into `(type, data)`. Used by clients and tests.
pub fn decode_envelope(frame: &str) -> Result<(String, Value), ProtocolError> {
    let envelope: Envelope =
        serde_json::from_str(frame).map_err(|e| ProtocolError::MalformedPayload(e.to_string()))?;
    Ok((envelope.kind, payload(envelope.data)?))
}

/// Encode a command frame the way the browser client does. Used by tests and
/// tooling that act as a client.
pub fn encode_command(kind: &str, data: Value) -> String {
    let envelope = Envelope {
        kind: kind.to_string(),
        data: Value::String(data.to_string()),
        id: 0,
    };
    serde_json::to_string(&envelope).unwrap_or_default()
}
