//! WebSocket message protocol
//!
//! Messages are JSON objects tagged by a `type` field. Clients feed query
//! edits in; the server pushes every published snapshot and every backend
//! failure out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::search::{SearchFailure, SearchSnapshot};

/// Message sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Raw query edit, typically one per keystroke
    SetQuery { text: String },
    /// Ping to keep connection alive
    Ping { timestamp: DateTime<Utc> },
}

/// Message sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Welcome message on connection
    Welcome {
        session_id: String,
        server_time: DateTime<Utc>,
    },
    /// Published search state
    Snapshot { snapshot: SearchSnapshot },
    /// A search failed; the previous result is still current
    Failure {
        generation: u64,
        query: String,
        message: String,
        recoverable: bool,
        occurred_at: DateTime<Utc>,
    },
    /// Pong response to ping
    Pong { timestamp: DateTime<Utc> },
    /// Error message
    Error { code: String, message: String },
}

impl From<SearchFailure> for ServerMessage {
    fn from(failure: SearchFailure) -> Self {
        ServerMessage::Failure {
            generation: failure.generation,
            query: failure.query,
            message: failure.error.to_string(),
            recoverable: failure.error.is_recoverable(),
            occurred_at: failure.occurred_at,
        }
    }
}
