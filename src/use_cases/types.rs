// Inputs and outputs of the room task.

use crate::interface_adapters::protocol::ClientMessage;
use axum::extract::ws::Utf8Bytes;
use tokio::sync::mpsc;

/// Commands the room task pushes onto a session's outbound queue.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    /// A serialized server event to forward on the socket.
    Event(Utf8Bytes),
    /// The socket task should close the connection (admin kick).
    Close,
}

/// Events marshalled onto the room task's input channel. Socket tasks and
/// async completions are the producers; the room task is the only consumer.
#[derive(Debug)]
pub enum RoomEvent {
    Connect {
        conn_id: u64,
        player_key: Option<String>,
        outbound: mpsc::Sender<SessionCommand>,
    },
    Disconnect {
        conn_id: u64,
    },
    Message {
        conn_id: u64,
        message: ClientMessage,
    },
    /// A hub name lookup finished for a connected player.
    NameResolved {
        user_id: String,
        label: String,
    },
    /// A hub score submission finished for an `admin:endGame` request.
    ScoresSubmitted {
        conn_id: u64,
        user_ids: Vec<String>,
        success: bool,
    },
}
