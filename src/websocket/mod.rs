//! WebSocket streaming module
//!
//! Streams search snapshots to connected clients and accepts query edits
//! from them, so a browser search box can be wired directly to the
//! pipeline.
//!
//! - **Messages**: JSON protocol for client-server communication
//! - **Server**: WebSocket endpoint and per-connection loop

pub mod messages;
pub mod server;

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use messages::{ClientMessage, ServerMessage};
pub use server::{run_session, websocket_handler};

/// WebSocket configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSocketConfig {
    /// Heartbeat interval in seconds, at least 1
    pub heartbeat_interval_secs: u64,
}

impl WebSocketConfig {
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs.max(1))
    }
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heartbeat_interval() {
        assert_eq!(WebSocketConfig::default().heartbeat_interval(), Duration::from_secs(30));

        let zero = WebSocketConfig {
            heartbeat_interval_secs: 0,
        };
        assert_eq!(zero.heartbeat_interval(), Duration::from_secs(1));
    }
}
