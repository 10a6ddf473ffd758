//! IPC module for daemon-page communication

mod protocol;
mod server;

pub use server::Server;
