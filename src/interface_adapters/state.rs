use crate::use_cases::RoomEvent;
use tokio::sync::{mpsc, watch};

#[derive(Clone)]
pub struct AppState {
    // Inputs flowing from sockets into the room task.
    pub input_tx: mpsc::Sender<RoomEvent>,
    // Connected player count published by the room task.
    pub users_rx: watch::Receiver<usize>,
}
