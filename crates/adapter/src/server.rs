//! TCP server for the remote-control adapter
//!
//! Handles incoming connections and manages client lifecycle.
//! Uses tokio for async networking.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use arrayvec::ArrayVec;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, watch, RwLock};
use tracing::{debug, info, warn};

use crate::protocol::*;
use crate::runtime::{ClientCommand, InboundCommand, InboundPayload, OutboundMessage};
use crate::types::{Difficulty, Mode, QuizAction, RoundConfig};

pub const DEFAULT_PORT: u16 = 7878;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    pub max_pending_commands: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            protocol_version: PROTOCOL_VERSION.to_string(),
            max_pending_commands: 10,
        }
    }
}

impl ServerConfig {
    /// Read `QUIZ_ADAPTER_HOST`, `QUIZ_ADAPTER_PORT` and `QUIZ_ADAPTER_MAX_PENDING`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with an explicit variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let host = lookup("QUIZ_ADAPTER_HOST")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);
        let port = lookup("QUIZ_ADAPTER_PORT")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);
        let max_pending_commands = lookup("QUIZ_ADAPTER_MAX_PENDING")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.max_pending_commands);

        Self {
            host,
            port,
            protocol_version: defaults.protocol_version,
            max_pending_commands,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid adapter address {}:{}", self.host, self.port))
    }
}

/// Connection summary published for the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServerStatus {
    pub client_count: usize,
    pub controller_id: Option<usize>,
}

/// Shared server state
pub struct ServerState {
    config: ServerConfig,
    clients: RwLock<Vec<ClientHandle>>,
    controller: RwLock<Option<usize>>,
    status_tx: Option<watch::Sender<ServerStatus>>,
}

impl ServerState {
    pub fn new(config: ServerConfig, status_tx: Option<watch::Sender<ServerStatus>>) -> Self {
        Self {
            config,
            clients: RwLock::new(Vec::new()),
            controller: RwLock::new(None),
            status_tx,
        }
    }

    /// Check if the adapter is disabled via `QUIZ_ADAPTER_DISABLED`
    pub fn is_disabled() -> bool {
        std::env::var("QUIZ_ADAPTER_DISABLED")
            .map(|v| is_truthy(&v))
            .unwrap_or(false)
    }

    async fn publish_status(&self) {
        let Some(tx) = self.status_tx.as_ref() else {
            return;
        };
        let controller_id = *self.controller.read().await;
        let client_count = self.clients.read().await.len();
        tx.send_replace(ServerStatus {
            client_count,
            controller_id,
        });
    }
}

fn is_truthy(v: &str) -> bool {
    matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes")
}

/// Handle to a connected client
pub struct ClientHandle {
    pub id: usize,
    pub addr: SocketAddr,
    pub is_controller: bool,
    pub stream_events: bool,
    pub stream_observations: bool,
    pub handshaken: bool,
    pub last_seq: Option<u64>,
    pub tx: mpsc::UnboundedSender<ClientOutbound>,
}

#[derive(Debug, Clone)]
pub enum ClientOutbound {
    Line(String),
    Ack(AckMessage),
    Error(ErrorMessage),
    Welcome(WelcomeMessage),
}

async fn is_handshaken(state: &ServerState, client_id: usize) -> bool {
    let clients = state.clients.read().await;
    clients
        .iter()
        .find(|c| c.id == client_id)
        .map(|c| c.handshaken)
        .unwrap_or(false)
}

async fn is_controller(state: &ServerState, client_id: usize) -> bool {
    *state.controller.read().await == Some(client_id)
}

/// Record `seq` if it is strictly greater than the last one seen.
async fn check_and_update_seq(state: &ServerState, client_id: usize, seq: u64) -> bool {
    let mut clients = state.clients.write().await;
    let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
        return true;
    };

    match client.last_seq {
        Some(prev) if seq <= prev => false,
        _ => {
            client.last_seq = Some(seq);
            true
        }
    }
}

/// Start the TCP server
///
/// `ready_tx` receives the bound address once the listener is up; with port 0
/// that is how callers learn the real port.
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
    status_tx: Option<watch::Sender<ServerStatus>>,
) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind adapter on {addr}"))?;
    let bound = listener.local_addr()?;
    info!(%bound, "adapter listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::new(config, status_tx));
    let mut client_id_counter = 0usize;

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                dispatch(&state, msg).await;
            }
        });
    }

    // Accept incoming connections
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;

        info!(client_id, %addr, "client connected");

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, addr, client_id, Arc::clone(&state), command_tx).await {
                warn!(client_id, error = %e, "client error");
                remove_client(&state, client_id).await;
            }
            info!(client_id, "client disconnected");
        });
    }
}

async fn dispatch(state: &ServerState, msg: OutboundMessage) {
    let clients = state.clients.read().await;
    match msg {
        OutboundMessage::ToClient { client_id, line } => {
            if let Some(c) = clients.iter().find(|c| c.id == client_id) {
                let _ = c.tx.send(ClientOutbound::Line(line));
            }
        }
        OutboundMessage::ToClientAck { client_id, ack } => {
            if let Some(c) = clients.iter().find(|c| c.id == client_id) {
                let _ = c.tx.send(ClientOutbound::Ack(ack));
            }
        }
        OutboundMessage::ToClientError { client_id, err } => {
            if let Some(c) = clients.iter().find(|c| c.id == client_id) {
                let _ = c.tx.send(ClientOutbound::Error(err));
            }
        }
        OutboundMessage::BroadcastEvent { line } => {
            for c in clients.iter().filter(|c| c.handshaken && c.stream_events) {
                let _ = c.tx.send(ClientOutbound::Line(line.clone()));
            }
        }
        OutboundMessage::BroadcastObservation { line } => {
            for c in clients.iter().filter(|c| c.handshaken && c.stream_observations) {
                let _ = c.tx.send(ClientOutbound::Line(line.clone()));
            }
        }
    }
}

/// Remove a client; if it was the controller, promote the lowest remaining id.
async fn remove_client(state: &ServerState, client_id: usize) {
    {
        let mut controller = state.controller.write().await;
        let mut clients = state.clients.write().await;

        let was_controller = *controller == Some(client_id);
        clients.retain(|c| c.id != client_id);

        if was_controller {
            let next_id = clients.iter().filter(|c| c.handshaken).map(|c| c.id).min();
            *controller = next_id;
            if let Some(new_id) = next_id {
                if let Some(c) = clients.iter_mut().find(|c| c.id == new_id) {
                    c.is_controller = true;
                }
                info!(client_id = new_id, "client promoted to controller");
            }
        }
    }
    state.publish_status().await;
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    client_id: usize,
    state: Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);

    let (tx, mut rx) = mpsc::unbounded_channel::<ClientOutbound>();

    {
        let mut clients = state.clients.write().await;
        clients.push(ClientHandle {
            id: client_id,
            addr,
            is_controller: false,
            stream_events: false,
            stream_observations: false,
            handshaken: false,
            last_seq: None,
            tx: tx.clone(),
        });
    }
    state.publish_status().await;

    // Writer task: one JSON object per line.
    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = rx.recv().await {
            buf.clear();
            let encoded = match msg {
                ClientOutbound::Line(line) => {
                    buf.extend_from_slice(line.as_bytes());
                    Ok(())
                }
                ClientOutbound::Ack(ack) => serde_json::to_writer(&mut buf, &ack),
                ClientOutbound::Error(err) => serde_json::to_writer(&mut buf, &err),
                ClientOutbound::Welcome(welcome) => serde_json::to_writer(&mut buf, &welcome),
            };
            if encoded.is_err() {
                continue;
            }
            buf.push(b'\n');
            if writer.write_all(&buf).await.is_err() || writer.flush().await.is_err() {
                break;
            }
        }
    });

    let send_error = |seq: u64, code: ErrorCode, message: &str| {
        let _ = tx.send(ClientOutbound::Error(create_error(seq, code, message)));
    };

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        debug!(client_id, line = trimmed, "received");

        match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                if is_handshaken(&state, client_id).await
                    && !check_and_update_seq(&state, client_id, hello.seq).await
                {
                    send_error(hello.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }

                if !hello.protocol_version.starts_with("1.") {
                    send_error(
                        hello.seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("Protocol version {} not supported", hello.protocol_version),
                    );
                    break;
                }

                let wants_control = hello.requested.role != Some(RequestedRole::Observer);
                let (role, controller_id) = {
                    let mut controller = state.controller.write().await;
                    let mut clients = state.clients.write().await;
                    if wants_control && controller.is_none() {
                        *controller = Some(client_id);
                    }
                    let role = if *controller == Some(client_id) {
                        AssignedRole::Controller
                    } else {
                        AssignedRole::Observer
                    };
                    if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
                        client.handshaken = true;
                        client.last_seq = Some(hello.seq);
                        client.is_controller = role == AssignedRole::Controller;
                        client.stream_events = hello.requested.stream_events;
                        client.stream_observations = hello.requested.stream_observations;
                    }
                    (role, *controller)
                };
                state.publish_status().await;
                info!(client_id, client = %hello.client.name, ?role, "handshake complete");

                let welcome = create_welcome(
                    hello.seq,
                    &state.config.protocol_version,
                    client_id as u64,
                    role,
                    controller_id.map(|id| id as u64),
                );
                let _ = tx.send(ClientOutbound::Welcome(welcome));

                if hello.requested.stream_observations {
                    let _ = command_tx.try_send(InboundCommand {
                        client_id,
                        seq: hello.seq,
                        payload: InboundPayload::SnapshotRequest,
                    });
                }
            }

            Ok(ParsedMessage::Command(cmd)) => {
                if !is_handshaken(&state, client_id).await {
                    send_error(cmd.seq, ErrorCode::HandshakeRequired, "Send hello before command");
                    continue;
                }
                if !check_and_update_seq(&state, client_id, cmd.seq).await {
                    send_error(cmd.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }
                if !is_controller(&state, client_id).await {
                    send_error(cmd.seq, ErrorCode::NotController, "Only controller may send commands");
                    continue;
                }

                let mapped = match map_command(&cmd) {
                    Ok(c) => c,
                    Err(message) => {
                        send_error(cmd.seq, ErrorCode::InvalidCommand, &message);
                        continue;
                    }
                };

                // Ack is sent by the game loop once the command is applied.
                if command_tx
                    .try_send(InboundCommand {
                        client_id,
                        seq: cmd.seq,
                        payload: InboundPayload::Command(mapped),
                    })
                    .is_err()
                {
                    send_error(cmd.seq, ErrorCode::Backpressure, "Command queue is full");
                }
            }

            Ok(ParsedMessage::Control(ctrl)) => {
                if !is_handshaken(&state, client_id).await {
                    send_error(ctrl.seq, ErrorCode::HandshakeRequired, "Send hello before control");
                    continue;
                }
                if !check_and_update_seq(&state, client_id, ctrl.seq).await {
                    send_error(ctrl.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }

                let result = {
                    let mut controller = state.controller.write().await;
                    let mut clients = state.clients.write().await;
                    let outcome = match ctrl.action {
                        ControlAction::Claim if controller.is_none() => {
                            *controller = Some(client_id);
                            Ok(true)
                        }
                        ControlAction::Claim if *controller == Some(client_id) => Ok(true),
                        ControlAction::Claim => {
                            Err((ErrorCode::ControllerActive, "Controller already assigned"))
                        }
                        ControlAction::Release if *controller == Some(client_id) => {
                            *controller = None;
                            Ok(false)
                        }
                        ControlAction::Release => {
                            Err((ErrorCode::NotController, "Only controller may release"))
                        }
                    };
                    if let Ok(now_controller) = outcome {
                        if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
                            client.is_controller = now_controller;
                        }
                    }
                    outcome
                };

                match result {
                    Ok(_) => {
                        state.publish_status().await;
                        let _ = tx.send(ClientOutbound::Ack(create_ack(ctrl.seq, 1)));
                    }
                    Err((code, message)) => send_error(ctrl.seq, code, message),
                }
            }

            Ok(ParsedMessage::Unknown(unknown)) => {
                if is_handshaken(&state, client_id).await
                    && !check_and_update_seq(&state, client_id, unknown.seq).await
                {
                    send_error(unknown.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }
                send_error(unknown.seq, ErrorCode::InvalidCommand, "Unknown message type");
            }

            Err(e) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                send_error(seq, ErrorCode::InvalidCommand, &format!("JSON parse error: {e}"));
            }
        }
    }

    // Removing the handle drops the last sender, so the writer drains and exits.
    remove_client(&state, client_id).await;
    drop(tx);
    let _ = write_task.await;
    Ok(())
}

/// Translate a wire command into the game-loop command.
pub fn map_command(cmd: &CommandMessage) -> Result<ClientCommand, String> {
    let start = cmd.start.as_ref().map(map_start).transpose()?;

    let mut actions: ArrayVec<QuizAction, MAX_ACTIONS> = ArrayVec::new();
    for name in cmd.actions.iter().flatten() {
        let action = QuizAction::from_str(name).ok_or_else(|| format!("Unknown action: {name}"))?;
        actions
            .try_push(action)
            .map_err(|_| format!("At most {MAX_ACTIONS} actions per command"))?;
    }

    if start.is_none() && actions.is_empty() {
        return Err("Command needs start or actions".to_string());
    }
    Ok(ClientCommand { start, actions })
}

fn map_start(req: &StartRequest) -> Result<RoundConfig, String> {
    let defaults = RoundConfig::default();
    let mode = match req.mode.as_deref() {
        Some(s) => Mode::from_str(s).ok_or_else(|| format!("Unknown mode: {s}"))?,
        None => defaults.mode,
    };
    let difficulty = match req.difficulty.as_deref() {
        Some(s) => Difficulty::from_str(s).ok_or_else(|| format!("Unknown difficulty: {s}"))?,
        None => defaults.difficulty,
    };
    Ok(RoundConfig::new(
        req.player.clone().unwrap_or(defaults.player_name),
        req.category.clone().unwrap_or(defaults.category),
        difficulty,
        mode,
    ))
}
