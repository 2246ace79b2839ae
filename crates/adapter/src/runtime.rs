//! Adapter runtime integration.
//!
//! Bridges the sync game loop with the async TCP server.

use std::net::SocketAddr;

use anyhow::Context;
use arrayvec::ArrayVec;
use serde::Serialize;
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{info, warn};

use crate::core::{LedgerStore, QuizEvent, QuizSession};
use crate::protocol::{
    create_ack, create_error, create_event, create_observation, AckMessage, ErrorCode,
    ErrorMessage, MAX_ACTIONS,
};
use crate::server::{run_server, ServerConfig, ServerState, ServerStatus};
use crate::types::{QuizAction, RoundConfig};

/// Leaderboard entries included in each observation.
pub const OBSERVED_HIGH_SCORES: usize = 10;

/// Command delivered to the game loop.
#[derive(Debug, Clone)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub payload: InboundPayload,
}

#[derive(Debug, Clone)]
pub enum InboundPayload {
    Command(ClientCommand),
    /// A client finished its handshake and wants the current state.
    SnapshotRequest,
}

/// Command payload: an optional round start, then actions in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCommand {
    pub start: Option<RoundConfig>,
    pub actions: ArrayVec<QuizAction, MAX_ACTIONS>,
}

impl ClientCommand {
    /// Apply to a session. Returns how many steps changed the round.
    pub fn apply<S: LedgerStore>(&self, session: &mut QuizSession<S>) -> u32 {
        let mut applied = 0;
        if let Some(config) = &self.start {
            session.start(config.clone());
            applied += 1;
        }
        for &action in &self.actions {
            if session.apply_action(action) {
                applied += 1;
            }
        }
        applied
    }
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    ToClient { client_id: usize, line: String },
    ToClientAck { client_id: usize, ack: AckMessage },
    ToClientError { client_id: usize, err: ErrorMessage },
    BroadcastEvent { line: String },
    BroadcastObservation { line: String },
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    addr: SocketAddr,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    status_rx: watch::Receiver<ServerStatus>,
    out_seq: u64,
}

impl Adapter {
    /// Start the adapter from environment variables.
    ///
    /// Returns `Ok(None)` if `QUIZ_ADAPTER_DISABLED` is set.
    pub fn start_from_env() -> anyhow::Result<Option<Self>> {
        if ServerState::is_disabled() {
            info!("adapter disabled via QUIZ_ADAPTER_DISABLED");
            return Ok(None);
        }
        Self::start(ServerConfig::from_env()).map(Some)
    }

    /// Start the server on its own runtime and wait until it is listening.
    pub fn start(config: ServerConfig) -> anyhow::Result<Self> {
        let max_pending = config.max_pending_commands.max(1);
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
        let (ready_tx, ready_rx) = oneshot::channel::<SocketAddr>();
        let (status_tx, status_rx) = watch::channel(ServerStatus::default());

        let rt = Runtime::new().context("failed to create tokio runtime")?;
        let server = rt.spawn(run_server(config, cmd_tx, out_rx, Some(ready_tx), Some(status_tx)));

        let addr = match rt.block_on(ready_rx) {
            Ok(addr) => addr,
            Err(_) => {
                // The server exited before binding; surface its error.
                return match rt.block_on(server) {
                    Ok(Err(e)) => Err(e),
                    Ok(Ok(())) => Err(anyhow::anyhow!("adapter stopped before listening")),
                    Err(e) => Err(anyhow::Error::new(e).context("adapter task failed")),
                };
            }
        };

        Ok(Self {
            _rt: rt,
            addr,
            cmd_rx,
            out_tx,
            status_rx,
            out_seq: 0,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn status(&self) -> ServerStatus {
        *self.status_rx.borrow()
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }

    /// Apply every queued command to `session` and acknowledge it.
    ///
    /// Snapshot requests are answered directly. Returns whether any command
    /// was applied, so the caller knows to broadcast.
    pub fn pump<S: LedgerStore>(&mut self, session: &mut QuizSession<S>) -> bool {
        let mut any = false;
        while let Some(cmd) = self.try_recv() {
            match cmd.payload {
                InboundPayload::Command(command) => {
                    let applied = command.apply(session);
                    self.send(OutboundMessage::ToClientAck {
                        client_id: cmd.client_id,
                        ack: create_ack(cmd.seq, applied),
                    });
                    any = true;
                }
                InboundPayload::SnapshotRequest => {
                    let seq = self.next_seq();
                    let obs = create_observation(
                        seq,
                        session.snapshot(),
                        session.ledger().top_n(OBSERVED_HIGH_SCORES).to_vec(),
                    );
                    if let Some(line) = encode(&obs) {
                        self.send(OutboundMessage::ToClient {
                            client_id: cmd.client_id,
                            line,
                        });
                    }
                }
            }
        }
        any
    }

    pub fn send_error(&self, client_id: usize, seq: u64, code: ErrorCode, message: &str) {
        self.send(OutboundMessage::ToClientError {
            client_id,
            err: create_error(seq, code, message),
        });
    }

    /// Stream events to every client that asked for them.
    pub fn broadcast_events(&mut self, events: &[QuizEvent]) {
        for event in events {
            let seq = self.next_seq();
            if let Some(line) = encode(&create_event(seq, event.clone())) {
                self.send(OutboundMessage::BroadcastEvent { line });
            }
        }
    }

    /// Send the current round and leaderboard to observing clients.
    pub fn broadcast_observation<S: LedgerStore>(&mut self, session: &QuizSession<S>) {
        let seq = self.next_seq();
        let obs = create_observation(
            seq,
            session.snapshot(),
            session.ledger().top_n(OBSERVED_HIGH_SCORES).to_vec(),
        );
        if let Some(line) = encode(&obs) {
            self.send(OutboundMessage::BroadcastObservation { line });
        }
    }

    fn next_seq(&mut self) -> u64 {
        self.out_seq += 1;
        self.out_seq
    }
}

fn encode<T: Serialize>(msg: &T) -> Option<String> {
    match serde_json::to_string(msg) {
        Ok(line) => Some(line),
        Err(e) => {
            warn!(error = %e, "failed to encode outbound message");
            None
        }
    }
}
