// Use cases layer: the room simulation and its supporting workflows.

pub mod room;
pub mod scoring;
pub mod timers;
pub mod types;

pub use room::{room_task, Room};
pub use types::{RoomEvent, SessionCommand};
