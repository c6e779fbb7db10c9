// Network adapter for client game sockets.

pub mod client;

pub use client::ws_handler;
