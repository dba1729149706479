//! WebSocket server implementation
//!
//! Each connection gets the current snapshot on connect, then every
//! subsequent publication and failure. Incoming `set_query` messages are
//! forwarded to the shared pipeline.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        ConnectInfo, State, WebSocketUpgrade,
    },
    response::Response,
};
use chrono::Utc;
use futures::{Sink, SinkExt, Stream, StreamExt};
use std::net::SocketAddr;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::{interval_at, Instant};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::messages::{ClientMessage, ServerMessage};
use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::metrics::WEBSOCKET_SESSIONS_ACTIVE;

/// WebSocket endpoint handler
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Response {
    info!(remote_addr = %addr, "WebSocket connection request");

    ws.on_upgrade(move |socket| handle_socket(socket, state, addr))
}

/// Handle a WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState, addr: SocketAddr) {
    let (sender, receiver) = socket.split();
    let session_id = Uuid::new_v4().to_string();

    info!(session_id = %session_id, remote_addr = %addr, "WebSocket session started");
    WEBSOCKET_SESSIONS_ACTIVE.inc();

    run_session(sender, receiver, &state, &session_id).await;

    WEBSOCKET_SESSIONS_ACTIVE.dec();
    info!(session_id = %session_id, "WebSocket session ended");
}

/// Drive one session over any message transport until the client leaves
///
/// Sends a welcome and the current snapshot, then every publication, every
/// failure and a periodic heartbeat. Client messages are applied to the
/// shared pipeline.
pub async fn run_session<S, R>(mut sender: S, mut receiver: R, state: &AppState, session_id: &str)
where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
    R: Stream<Item = std::result::Result<Message, axum::Error>> + Unpin,
{
    let mut snapshots = state.pipeline.subscribe();
    let mut failures = state.pipeline.subscribe_failures();
    let period = state.websocket.heartbeat_interval();
    let mut heartbeat = interval_at(Instant::now() + period, period);

    let welcome = ServerMessage::Welcome {
        session_id: session_id.to_string(),
        server_time: Utc::now(),
    };
    let current = ServerMessage::Snapshot {
        snapshot: snapshots.borrow_and_update().clone(),
    };

    for message in [welcome, current] {
        if let Err(e) = send_message(&mut sender, &message).await {
            error!(session_id = %session_id, error = %e, "Failed to send initial message");
            return;
        }
    }

    loop {
        let outgoing = tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    debug!(session_id = %session_id, "Search pipeline dropped");
                    break;
                }
                ServerMessage::Snapshot {
                    snapshot: snapshots.borrow_and_update().clone(),
                }
            }
            failure = failures.recv() => match failure {
                Ok(failure) => ServerMessage::from(failure),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(session_id = %session_id, skipped, "Session lagged behind failure channel");
                    continue;
                }
                Err(RecvError::Closed) => break,
            },
            _ = heartbeat.tick() => ServerMessage::Pong { timestamp: Utc::now() },
            incoming = receiver.next() => {
                let msg = match incoming {
                    Some(Ok(msg)) => msg,
                    Some(Err(e)) => {
                        error!(session_id = %session_id, error = ?e, "WebSocket error");
                        break;
                    }
                    None => break,
                };

                match msg {
                    Message::Text(text) => match handle_client_message(&text, &state) {
                        Ok(Some(reply)) => reply,
                        Ok(None) => continue,
                        Err(e) => {
                            warn!(session_id = %session_id, error = %e, "Invalid client message");
                            ServerMessage::Error {
                                code: e.error_code().to_string(),
                                message: format!("Failed to process message: {}", e),
                            }
                        }
                    },
                    Message::Binary(_) => ServerMessage::Error {
                        code: "UNSUPPORTED".to_string(),
                        message: "Binary messages are not supported".to_string(),
                    },
                    // Axum answers pings itself
                    Message::Ping(_) | Message::Pong(_) => continue,
                    Message::Close(_) => {
                        info!(session_id = %session_id, "Client closed connection");
                        break;
                    }
                }
            }
        };

        if let Err(e) = send_message(&mut sender, &outgoing).await {
            debug!(session_id = %session_id, error = %e, "Failed to send message, closing session");
            break;
        }
    }

    let _ = sender.close().await;
}

/// Handle a client message, returning an optional direct reply
fn handle_client_message(text: &str, state: &AppState) -> Result<Option<ServerMessage>> {
    let message: ClientMessage = serde_json::from_str(text)?;

    match message {
        ClientMessage::SetQuery { text } => {
            if state.pipeline.is_disposed() {
                return Err(AppError::Unavailable("search pipeline disposed".to_string()));
            }
            state.pipeline.set_query(text);
            Ok(None)
        }
        ClientMessage::Ping { timestamp } => Ok(Some(ServerMessage::Pong { timestamp })),
    }
}

async fn send_message<S>(sender: &mut S, message: &ServerMessage) -> Result<()>
where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    let json = serde_json::to_string(message)?;
    sender
        .send(Message::Text(json))
        .await
        .map_err(|e| AppError::Internal(format!("WebSocket send failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Person;
    use crate::search::{SearchConfig, SearchPipeline};
    use std::sync::Arc;

    fn test_state() -> AppState {
        let dataset = vec![Person::new("Omar", "Hendi"), Person::new("Aya", "Hendi")].into();
        let pipeline = SearchPipeline::new(dataset, SearchConfig::default()).unwrap();
        AppState::new(Arc::new(pipeline))
    }

    #[tokio::test]
    async fn test_set_query_is_forwarded() {
        let state = test_state();

        let reply = handle_client_message(r#"{"type":"set_query","text":"Om"}"#, &state).unwrap();

        assert!(reply.is_none());
        assert_eq!(state.pipeline.current_query(), "Om");
    }

    #[tokio::test]
    async fn test_ping_answers_pong_with_same_timestamp() {
        let state = test_state();
        let sent = Utc::now();
        let text = serde_json::json!({ "type": "ping", "timestamp": sent }).to_string();

        let reply = handle_client_message(&text, &state).unwrap();

        assert!(matches!(reply, Some(ServerMessage::Pong { timestamp }) if timestamp == sent));
    }

    #[tokio::test]
    async fn test_set_query_rejected_after_dispose() {
        let state = test_state();
        state.pipeline.dispose().await;

        let err = handle_client_message(r#"{"type":"set_query","text":"Om"}"#, &state).unwrap_err();

        assert!(matches!(err, AppError::Unavailable(_)));
        assert_eq!(state.pipeline.current_query(), "");
    }

    #[tokio::test]
    async fn test_malformed_message_is_rejected() {
        let state = test_state();

        let err = handle_client_message(r#"{"type":"subscribe"}"#, &state).unwrap_err();

        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }
}
