//! Wire vocabulary shared between the snake arena client and its tooling.
//!
//! Every message is a `{ "message": <tag>, "data": <payload> }` envelope. Outbound
//! intents and inbound events are closed sum types; decoding an inbound envelope
//! whose tag is not known yields [`CodecError::UnknownTag`] so callers can log and
//! skip it without tearing the session down.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const PROTOCOL_VERSION: u32 = 1;
pub const WORLD_WIDTH: f32 = 5000.0;
pub const WORLD_HEIGHT: f32 = 5000.0;
pub const DEFAULT_SNAKE_LENGTH: u32 = 10;
pub const DEFAULT_PLAYER_NAME: &str = "Anonymous";
pub const FOOD_VALUE: u32 = 1;

/// Substitutes the default label for a missing or blank name.
pub fn display_name(name: Option<&str>) -> &str {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => name,
        _ => DEFAULT_PLAYER_NAME,
    }
}

/// World-space coordinate.
///
/// Encoded as `{"x": .., "y": ..}`. The server also emits positions as `[x, y]`
/// pairs, so both shapes are accepted on decode.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "PositionRepr")]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PositionRepr {
    Object { x: f32, y: f32 },
    Pair(f32, f32),
}

impl From<PositionRepr> for Position {
    fn from(repr: PositionRepr) -> Self {
        match repr {
            PositionRepr::Object { x, y } | PositionRepr::Pair(x, y) => Position { x, y },
        }
    }
}

/// Three-channel colour, encoded as `[r, g, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Default for Rgb {
    fn default() -> Self {
        Rgb(255, 255, 255)
    }
}

/// Full snake state as sent by the server in `PlayerInit`, `PlayerJoined` and `UpdateSnake`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnakeData {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub position: Position,
    #[serde(default)]
    pub direction: f32,
    #[serde(default)]
    pub speed: f32,
    #[serde(default)]
    pub body: Vec<Position>,
    #[serde(default)]
    pub length: u32,
    #[serde(default, alias = "is_dead")]
    pub is_dead: bool,
    #[serde(default)]
    pub score: u32,
    #[serde(default, alias = "is_bot")]
    pub is_bot: bool,
    #[serde(default)]
    pub color: Rgb,
}

/// Payload naming a snake by id (`PlayerLeft`, `SnakeDied`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnakeRef {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodEatenData {
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodSpawnedData {
    pub positions: Vec<Position>,
    pub color: Rgb,
}

/// Intents sent from the client to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "message", content = "data")]
pub enum ClientMessage {
    JoinGame(Option<String>),
    /// Heading in degrees, 0 = +x, clockwise.
    MoveSnake(f32),
}

/// Events sent from the server to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "message", content = "data")]
pub enum ServerMessage {
    PlayerInit(SnakeData),
    PlayerJoined(SnakeData),
    PlayerLeft(SnakeRef),
    UpdateSnake(SnakeData),
    FoodEaten(FoodEatenData),
    SnakeDied(SnakeRef),
    FoodSpawned(FoodSpawnedData),
}

impl ServerMessage {
    pub fn tag(&self) -> &'static str {
        match self {
            ServerMessage::PlayerInit(_) => "PlayerInit",
            ServerMessage::PlayerJoined(_) => "PlayerJoined",
            ServerMessage::PlayerLeft(_) => "PlayerLeft",
            ServerMessage::UpdateSnake(_) => "UpdateSnake",
            ServerMessage::FoodEaten(_) => "FoodEaten",
            ServerMessage::SnakeDied(_) => "SnakeDied",
            ServerMessage::FoodSpawned(_) => "FoodSpawned",
        }
    }
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed envelope: {0}")]
    Envelope(#[source] serde_json::Error),
    #[error("unknown message tag `{0}`")]
    UnknownTag(String),
    #[error("malformed `{tag}` payload: {source}")]
    Payload {
        tag: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),
}

impl CodecError {
    pub fn is_unknown_tag(&self) -> bool {
        matches!(self, CodecError::UnknownTag(_))
    }
}

#[derive(Deserialize)]
struct RawEnvelope {
    message: String,
    #[serde(default)]
    data: Value,
}

pub fn encode_client(message: &ClientMessage) -> Result<String, CodecError> {
    serde_json::to_string(message).map_err(CodecError::Encode)
}

pub fn encode_server(message: &ServerMessage) -> Result<String, CodecError> {
    serde_json::to_string(message).map_err(CodecError::Encode)
}

pub fn decode_client(text: &str) -> Result<ClientMessage, CodecError> {
    serde_json::from_str(text).map_err(CodecError::Envelope)
}

/// Decodes an inbound envelope.
///
/// The tag is matched first so an unrecognised tag is reported as
/// [`CodecError::UnknownTag`] rather than as a shape error.
pub fn decode_server(text: &str) -> Result<ServerMessage, CodecError> {
    let RawEnvelope { message, data } =
        serde_json::from_str(text).map_err(CodecError::Envelope)?;

    let decoded = match message.as_str() {
        "PlayerInit" => ServerMessage::PlayerInit(payload("PlayerInit", data)?),
        "PlayerJoined" => ServerMessage::PlayerJoined(payload("PlayerJoined", data)?),
        "PlayerLeft" => ServerMessage::PlayerLeft(payload("PlayerLeft", data)?),
        "UpdateSnake" => ServerMessage::UpdateSnake(payload("UpdateSnake", data)?),
        "FoodEaten" => ServerMessage::FoodEaten(payload("FoodEaten", data)?),
        "SnakeDied" => ServerMessage::SnakeDied(payload("SnakeDied", data)?),
        "FoodSpawned" => ServerMessage::FoodSpawned(payload("FoodSpawned", data)?),
        other => return Err(CodecError::UnknownTag(other.to_owned())),
    };

    Ok(decoded)
}

fn payload<T: DeserializeOwned>(tag: &str, data: Value) -> Result<T, CodecError> {
    serde_json::from_value(data).map_err(|source| CodecError::Payload {
        tag: tag.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn snake_json(id: &str) -> String {
        format!(
            r#"{{"id":"{id}","name":"bob","position":{{"x":10.5,"y":20.0}},"direction":90.0,
                "speed":120.0,"body":[{{"x":10.5,"y":20.0}}],"length":12,"isDead":false,
                "score":3,"isBot":true,"color":[1,2,3]}}"#
        )
    }

    #[test]
    fn test_display_name_substitution() {
        assert_eq!(display_name(Some("alice")), "alice");
        assert_eq!(display_name(Some("   ")), DEFAULT_PLAYER_NAME);
        assert_eq!(display_name(None), DEFAULT_PLAYER_NAME);
    }

    #[test]
    fn test_encode_join_game_with_and_without_name() {
        let named = encode_client(&ClientMessage::JoinGame(Some("alice".to_string()))).unwrap();
        assert_eq!(named, r#"{"message":"JoinGame","data":"alice"}"#);

        let anonymous = encode_client(&ClientMessage::JoinGame(None)).unwrap();
        assert_eq!(anonymous, r#"{"message":"JoinGame","data":null}"#);
    }

    #[test]
    fn test_encode_move_snake_is_numeric() {
        let text = encode_client(&ClientMessage::MoveSnake(270.0)).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["message"], "MoveSnake");
        assert_approx_eq!(value["data"].as_f64().unwrap(), 270.0, 1e-6);
    }

    #[test]
    fn test_decode_player_init() {
        let text = format!(r#"{{"message":"PlayerInit","data":{}}}"#, snake_json("p1"));
        match decode_server(&text).unwrap() {
            ServerMessage::PlayerInit(data) => {
                assert_eq!(data.id, "p1");
                assert_eq!(data.name.as_deref(), Some("bob"));
                assert_approx_eq!(data.position.x, 10.5);
                assert_eq!(data.length, 12);
                assert_eq!(data.score, 3);
                assert!(data.is_bot);
                assert_eq!(data.color, Rgb(1, 2, 3));
            }
            other => panic!("Wrong message after decode: {:?}", other),
        }
    }

    #[test]
    fn test_decode_server_field_names_and_tuple_positions() {
        let text = r#"{"message":"UpdateSnake","data":{"id":"p2","name":null,
            "position":[4.0,5.0],"body":[[4.0,5.0],[3.0,5.0]],"length":0,
            "is_dead":true,"is_bot":false,"score":0,"color":[9,9,9]}}"#;

        match decode_server(text).unwrap() {
            ServerMessage::UpdateSnake(data) => {
                assert_eq!(data.name, None);
                assert_eq!(data.position, Position::new(4.0, 5.0));
                assert_eq!(data.body.len(), 2);
                assert!(data.is_dead);
            }
            other => panic!("Wrong message after decode: {:?}", other),
        }
    }

    #[test]
    fn test_decode_food_spawned() {
        let text = r#"{"message":"FoodSpawned","data":{"positions":[{"x":1,"y":1},{"x":2,"y":2}],"color":[255,0,0]}}"#;
        match decode_server(text).unwrap() {
            ServerMessage::FoodSpawned(data) => {
                assert_eq!(data.positions.len(), 2);
                assert_eq!(data.color, Rgb(255, 0, 0));
            }
            other => panic!("Wrong message after decode: {:?}", other),
        }
    }

    #[test]
    fn test_decode_id_payloads() {
        let left = decode_server(r#"{"message":"PlayerLeft","data":{"id":"p9"}}"#).unwrap();
        assert_eq!(left, ServerMessage::PlayerLeft(SnakeRef { id: "p9".into() }));

        let died = decode_server(r#"{"message":"SnakeDied","data":{"id":"p9"}}"#).unwrap();
        assert_eq!(died.tag(), "SnakeDied");
    }

    #[test]
    fn test_unknown_tag_is_reported_not_fatal() {
        let err = decode_server(r#"{"message":"UpdateLeaderboard","data":[]}"#).unwrap_err();
        assert!(err.is_unknown_tag());
        assert!(err.to_string().contains("UpdateLeaderboard"));
    }

    #[test]
    fn test_malformed_payload_and_envelope() {
        let err = decode_server(r#"{"message":"FoodEaten","data":{"pos":1}}"#).unwrap_err();
        assert!(matches!(err, CodecError::Payload { ref tag, .. } if tag == "FoodEaten"));

        let err = decode_server("not json").unwrap_err();
        assert!(matches!(err, CodecError::Envelope(_)));

        let err = decode_server(r#"{"data":{}}"#).unwrap_err();
        assert!(matches!(err, CodecError::Envelope(_)));
    }

    #[test]
    fn test_server_encoding_decodes_back_through_tag_dispatch() {
        let message = ServerMessage::FoodEaten(FoodEatenData {
            position: Position::new(2.0, 2.0),
        });
        let text = encode_server(&message).unwrap();
        assert!(text.starts_with(r#"{"message":"FoodEaten""#));
        assert_eq!(decode_server(&text).unwrap(), message);
    }

    #[test]
    fn test_decode_client_intent() {
        let intent = decode_client(r#"{"message":"MoveSnake","data":180}"#).unwrap();
        assert_eq!(intent, ClientMessage::MoveSnake(180.0));
    }
}
