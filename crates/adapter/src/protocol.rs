//! Protocol module - JSON message types for the remote-control adapter
//!
//! Line-delimited JSON. Every message carries `type`, `seq` (sequence number)
//! and `ts` (timestamp in ms).

use serde::{Deserialize, Serialize};

use crate::core::{QuizEvent, RoundSnapshot, ScoreRecord};

pub const PROTOCOL_VERSION: &str = "1.0.0";
pub const GAME_ID: &str = "tui-quiz";

/// Most actions accepted in one command.
pub const MAX_ACTIONS: usize = 16;

/// Action names a command may carry.
pub const ACTION_NAMES: [&str; 11] = [
    "select0",
    "select1",
    "select2",
    "select3",
    "submit",
    "skip",
    "hint",
    "fiftyFifty",
    "extraTime",
    "doublePoints",
    "quit",
];

// ============== Client -> Game Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HelloType {
    #[default]
    #[serde(rename = "hello")]
    Hello,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CommandType {
    #[default]
    #[serde(rename = "command")]
    Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ControlType {
    #[default]
    #[serde(rename = "control")]
    Control,
}

/// Client hello message (first message on a connection)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: HelloType,
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
    #[serde(default)]
    pub requested: RequestedCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestedCapabilities {
    #[serde(default = "default_true")]
    pub stream_events: bool,
    #[serde(default = "default_true")]
    pub stream_observations: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<RequestedRole>,
}

impl Default for RequestedCapabilities {
    fn default() -> Self {
        Self {
            stream_events: true,
            stream_observations: true,
            role: None,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestedRole {
    Auto,
    Controller,
    Observer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignedRole {
    Controller,
    Observer,
}

/// Command message (controller only)
///
/// Either `start` (begin a round) or `actions` (applied in order), or both,
/// in which case the round starts first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: CommandType,
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<StartRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<String>>,
}

/// Round settings for a remote start. Missing fields use the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartRequest {
    #[serde(default)]
    pub player: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: ControlType,
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    pub action: ControlAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlAction {
    Claim,
    Release,
}

// ============== Game -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WelcomeType {
    #[serde(rename = "welcome")]
    Welcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckType {
    #[serde(rename = "ack")]
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckStatus {
    #[serde(rename = "ok")]
    Ok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    HandshakeRequired,
    ProtocolMismatch,
    NotController,
    ControllerActive,
    InvalidCommand,
    Backpressure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "event")]
    Event,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObservationType {
    #[serde(rename = "observation")]
    Observation,
}

/// Welcome message (response to hello)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: WelcomeType,
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub client_id: u64,
    pub role: AssignedRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_id: Option<u64>,
    pub game_id: String,
    pub capabilities: ServerCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCapabilities {
    pub formats: Vec<String>,
    pub actions: Vec<String>,
    pub start: bool,
}

/// Acknowledgment, sent once a command has been applied
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
    pub status: AckStatus,
    /// How many of the command's steps changed the round.
    pub applied: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

/// One round event, streamed to every client that asked for events
#[derive(Debug, Clone, Serialize)]
pub struct EventMessage {
    #[serde(rename = "type")]
    pub msg_type: EventType,
    pub seq: u64,
    pub ts: u64,
    pub event: QuizEvent,
}

/// Round state plus the top of the leaderboard
#[derive(Debug, Clone, Serialize)]
pub struct ObservationMessage {
    #[serde(rename = "type")]
    pub msg_type: ObservationType,
    pub seq: u64,
    pub ts: u64,
    pub round: Option<RoundSnapshot>,
    pub high_scores: Vec<ScoreRecord>,
}

// ============== Message Parsing ==============

/// Parsed incoming message
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
    Control(ControlMessage),
    Unknown(UnknownMessage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownMessage {
    pub seq: u64,
}

/// Parse one JSON line. Well-formed JSON with an unknown `type` is not an error.
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type")]
    enum InboundMessage {
        #[serde(rename = "hello")]
        Hello(HelloMessage),
        #[serde(rename = "command")]
        Command(CommandMessage),
        #[serde(rename = "control")]
        Control(ControlMessage),
    }

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(InboundMessage::Hello(m)) => Ok(ParsedMessage::Hello(m)),
        Ok(InboundMessage::Command(m)) => Ok(ParsedMessage::Command(m)),
        Ok(InboundMessage::Control(m)) => Ok(ParsedMessage::Control(m)),
        Err(e) => {
            let value: serde_json::Value = serde_json::from_str(json)?;
            let msg_type = value.get("type").and_then(|t| t.as_str()).unwrap_or("unknown");
            if matches!(msg_type, "hello" | "command" | "control") {
                return Err(e);
            }
            let seq = value.get("seq").and_then(|s| s.as_u64()).unwrap_or(0);
            Ok(ParsedMessage::Unknown(UnknownMessage { seq }))
        }
    }
}

/// Best-effort `seq` of a line that failed to parse.
pub fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let rest = s[start + 5..].trim_start().strip_prefix(':')?.trim_start();
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}

// ============== Utility Functions ==============

pub fn create_hello(seq: u64, client_name: &str, role: Option<RequestedRole>) -> HelloMessage {
    HelloMessage {
        msg_type: HelloType::Hello,
        seq,
        ts: current_timestamp_ms(),
        client: ClientInfo {
            name: client_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        protocol_version: PROTOCOL_VERSION.to_string(),
        requested: RequestedCapabilities {
            role,
            ..RequestedCapabilities::default()
        },
    }
}

pub fn create_command(seq: u64, actions: &[&str]) -> CommandMessage {
    CommandMessage {
        msg_type: CommandType::Command,
        seq,
        ts: current_timestamp_ms(),
        start: None,
        actions: Some(actions.iter().map(|a| a.to_string()).collect()),
    }
}

pub fn create_welcome(
    seq: u64,
    protocol_version: &str,
    client_id: u64,
    role: AssignedRole,
    controller_id: Option<u64>,
) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: WelcomeType::Welcome,
        seq,
        ts: current_timestamp_ms(),
        protocol_version: protocol_version.to_string(),
        client_id,
        role,
        controller_id,
        game_id: GAME_ID.to_string(),
        capabilities: ServerCapabilities {
            formats: vec!["json".to_string()],
            actions: ACTION_NAMES.iter().map(|a| a.to_string()).collect(),
            start: true,
        },
    }
}

pub fn create_ack(seq: u64, applied: u32) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: current_timestamp_ms(),
        status: AckStatus::Ok,
        applied,
    }
}

pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

pub fn create_event(seq: u64, event: QuizEvent) -> EventMessage {
    EventMessage {
        msg_type: EventType::Event,
        seq,
        ts: current_timestamp_ms(),
        event,
    }
}

pub fn create_observation(
    seq: u64,
    round: Option<RoundSnapshot>,
    high_scores: Vec<ScoreRecord>,
) -> ObservationMessage {
    ObservationMessage {
        msg_type: ObservationType::Observation,
        seq,
        ts: current_timestamp_ms(),
        round,
        high_scores,
    }
}

/// Current timestamp in milliseconds
pub fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hello() {
        let json = r#"{"type":"hello","seq":1,"ts":1234567890,"client":{"name":"bot","version":"1.0.0"},"protocol_version":"1.0.0","requested":{"stream_observations":false}}"#;

        match parse_message(json).unwrap() {
            ParsedMessage::Hello(msg) => {
                assert_eq!(msg.msg_type, HelloType::Hello);
                assert_eq!(msg.seq, 1);
                assert_eq!(msg.client.name, "bot");
                assert!(!msg.requested.stream_observations);
                assert!(msg.requested.stream_events);
                assert_eq!(msg.requested.role, None);
            }
            other => panic!("Expected Hello message, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_hello_without_requested() {
        let json = r#"{"type":"hello","seq":1,"client":{"name":"bot","version":"1"},"protocol_version":"1.0.0"}"#;
        match parse_message(json).unwrap() {
            ParsedMessage::Hello(msg) => assert!(msg.requested.stream_observations),
            other => panic!("Expected Hello message, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_command() {
        let json = r#"{"type":"command","seq":2,"ts":1,"start":{"category":"science","mode":"survival"},"actions":["select1","submit"]}"#;

        match parse_message(json).unwrap() {
            ParsedMessage::Command(msg) => {
                let start = msg.start.unwrap();
                assert_eq!(start.category.as_deref(), Some("science"));
                assert_eq!(start.player, None);
                assert_eq!(msg.actions.unwrap(), vec!["select1", "submit"]);
            }
            other => panic!("Expected Command message, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_control() {
        let json = r#"{"type":"control","seq":3,"ts":1234567910,"action":"claim"}"#;
        match parse_message(json).unwrap() {
            ParsedMessage::Control(msg) => assert_eq!(msg.action, ControlAction::Claim),
            other => panic!("Expected Control message, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_type_is_not_an_error() {
        match parse_message(r#"{"type":"ping","seq":9}"#).unwrap() {
            ParsedMessage::Unknown(u) => assert_eq!(u.seq, 9),
            other => panic!("Expected Unknown message, got {other:?}"),
        }
        assert!(parse_message(r#"{"type":"command"}"#).is_err());
        assert!(parse_message("not json").is_err());
    }

    #[test]
    fn test_extract_seq() {
        assert_eq!(extract_seq_best_effort(r#"{"seq": 42, "type":"command""#), Some(42));
        assert_eq!(extract_seq_best_effort(r#"{"seq":"x"}"#), None);
        assert_eq!(extract_seq_best_effort("{}"), None);
    }

    #[test]
    fn test_create_welcome() {
        let welcome = create_welcome(1, PROTOCOL_VERSION, 7, AssignedRole::Controller, Some(7));
        let json = serde_json::to_value(&welcome).unwrap();
        assert_eq!(json["type"], "welcome");
        assert_eq!(json["role"], "controller");
        assert_eq!(json["game_id"], GAME_ID);
        assert_eq!(json["capabilities"]["actions"].as_array().unwrap().len(), ACTION_NAMES.len());
    }

    #[test]
    fn test_error_codes_are_snake_case() {
        let error = create_error(5, ErrorCode::NotController, "Only controller may send commands");
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["code"], "not_controller");
    }

    #[test]
    fn test_event_message_carries_kind() {
        let msg = create_event(4, QuizEvent::Tick { time_left: 9 });
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "event");
        assert_eq!(json["event"]["kind"], "tick");
        assert_eq!(json["event"]["timeLeft"], 9);
    }

    #[test]
    fn test_action_names_parse() {
        for name in ACTION_NAMES {
            assert!(
                crate::types::QuizAction::from_str(name).is_some(),
                "unparseable action {name}"
            );
        }
    }
}
