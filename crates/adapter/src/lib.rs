//! Adapter module - remote control via TCP socket with JSON protocol
//!
//! This crate lets an external client (a bot, a test harness, a second
//! screen) drive or watch a quiz round over a TCP connection.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: Client connects to TCP socket (default: 127.0.0.1:7878)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome`
//! 3. **Controller Assignment**: First client to hello becomes the controller
//! 4. **Streaming**: Server sends round events and observations
//! 5. **Commanding**: Controller starts rounds and sends player actions
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: Initial handshake with client info and requested streams
//! - **command**: Start a round and/or apply actions (`select0`..`select3`,
//!   `submit`, `skip`, `hint`, `fiftyFifty`, `extraTime`, `doublePoints`, `quit`)
//! - **control**: Claim or release controller status
//!
//! ## Server → Client
//!
//! - **welcome**: Response to hello with assigned role and capabilities
//! - **event**: One round event (tick, answer result, round ended, ...)
//! - **observation**: Round snapshot plus the top of the leaderboard
//! - **ack**: Command applied
//! - **error**: Error response with code and message
//!
//! # Environment Variables
//!
//! - `QUIZ_ADAPTER_HOST`: Bind address (default: "127.0.0.1")
//! - `QUIZ_ADAPTER_PORT`: Port number (default: 7878)
//! - `QUIZ_ADAPTER_MAX_PENDING`: Command queue depth (default: 10)
//! - `QUIZ_ADAPTER_DISABLED`: Set to "1" or "true" to disable the adapter entirely
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":0,"client":{"name":"bot","version":"1.0.0"},"protocol_version":"1.0.0"}
//! Server -> Client: {"type":"welcome","seq":1,"ts":...,"client_id":1,"role":"controller",...}
//! Client -> Server: {"type":"command","seq":2,"ts":0,"start":{"category":"science"},"actions":["select1","submit"]}
//! Server -> Client: {"type":"ack","seq":2,"ts":...,"status":"ok","applied":3}
//! Server -> Client: {"type":"event","seq":5,"ts":...,"event":{"kind":"answerResult",...}}
//! ```
//!
//! The game loop owns the session: the server only validates and queues
//! commands, and [`Adapter::pump`] applies them between ticks.

pub mod protocol;
pub mod runtime;
pub mod server;

pub use tui_quiz_core as core;
pub use tui_quiz_types as types;

// Re-export protocol types for convenience
pub use protocol::*;
pub use runtime::{Adapter, ClientCommand, InboundCommand, InboundPayload, OutboundMessage};
pub use server::*;
