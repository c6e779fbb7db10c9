// Per-socket I/O task. Each connection owns one task that forwards parsed
// client events into the room and drains its private outbound queue; the
// room task never blocks on a socket.

use crate::interface_adapters::protocol::ClientMessage;
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::rng::next_conn_id;
use crate::use_cases::{RoomEvent, SessionCommand};

use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
};
use futures_util::SinkExt;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::mpsc;
use tracing::{debug, info, info_span, warn};

/// Per-session outbound queue depth. A socket that cannot drain this many
/// events starts losing frames instead of stalling the room.
const OUTBOUND_QUEUE_CAPACITY: usize = 256;
const LOG_THROTTLE: Duration = Duration::from_secs(2);

#[derive(Debug, serde::Deserialize)]
pub struct ConnectQuery {
    /// Optional external hub key presented at the handshake.
    #[serde(rename = "playerKey", default)]
    player_key: Option<String>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> impl IntoResponse {
    let input_tx = state.input_tx.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, input_tx, query.player_key))
}

async fn handle_socket(
    mut socket: WebSocket,
    input_tx: mpsc::Sender<RoomEvent>,
    player_key: Option<String>,
) {
    let conn_id = next_conn_id();
    let span = info_span!("conn", conn_id);
    let _enter = span.enter();

    let (outbound_tx, mut outbound_rx) = mpsc::channel::<SessionCommand>(OUTBOUND_QUEUE_CAPACITY);
    if input_tx
        .send(RoomEvent::Connect {
            conn_id,
            player_key,
            outbound: outbound_tx,
        })
        .await
        .is_err()
    {
        warn!("room task unavailable; refusing connection");
        let _ = socket.close().await;
        return;
    }

    let mut last_invalid_log = Instant::now() - LOG_THROTTLE;
    let mut last_full_log = Instant::now() - LOG_THROTTLE;

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(message) => {
                                match input_tx.try_send(RoomEvent::Message { conn_id, message }) {
                                    Ok(()) => {}
                                    Err(mpsc::error::TrySendError::Full(_)) => {
                                        if should_log(&mut last_full_log) {
                                            warn!("input channel full; dropping frame");
                                        }
                                    }
                                    Err(mpsc::error::TrySendError::Closed(_)) => break,
                                }
                            }
                            Err(err) => {
                                // Unknown events and malformed payloads are
                                // silently dropped.
                                if should_log(&mut last_invalid_log) {
                                    debug!(error = %err, bytes = text.len(), "ignoring unparseable frame");
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Binary(_))) => {
                        if should_log(&mut last_invalid_log) {
                            debug!("ignoring binary frame");
                        }
                    }
                    Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        warn!(error = %err, "websocket recv error");
                        break;
                    }
                }
            }
            command = outbound_rx.recv() => {
                match command {
                    Some(SessionCommand::Event(bytes)) => {
                        if socket.send(Message::Text(bytes)).await.is_err() {
                            break;
                        }
                    }
                    Some(SessionCommand::Close) => {
                        let _ = socket
                            .send(Message::Close(Some(CloseFrame {
                                code: close_code::POLICY,
                                reason: "kicked".into(),
                            })))
                            .await;
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    // The room learns about the disconnect even when its queue is busy.
    let _ = input_tx.send(RoomEvent::Disconnect { conn_id }).await;
    let _ = socket.close().await;
    info!("socket closed");
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}
