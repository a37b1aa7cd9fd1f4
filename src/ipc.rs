//! i3-ipc compatible control socket.

pub mod client;
pub mod protocol;
pub mod server;

pub use client::{IpcClient, SOCKET_ENV, socket_path};
pub use protocol::{IpcError, Message, MessageType};
pub use server::IpcServer;
