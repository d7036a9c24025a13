//! Serial Protocol Communication
//!
//! Implements the MHS-52xx line-oriented ASCII protocol.
//!
//! Every command is preceded by a probe line, and the instrument echoes the
//! command before its answer.

pub mod commands;
mod connection;
mod error;
mod reply;
pub mod serial;
mod transport;

pub use commands::{Access, Address, Command, Opcode};
pub use connection::{Connection, ConnectionConfig};
pub use error::ProtocolError;
pub use reply::{Reply, ReplyStatus};
pub use serial::{clear_buffers, configure_port, open_port};
pub use transport::{SerialTransport, Transport};

/// Default baud rate of the MHS-52xx
pub const DEFAULT_BAUD_RATE: u32 = 57600;

/// Default read timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 100;

/// Ready ping written before every command
pub const PROBE: &[u8] = b":\n";

/// Bytes drained after the probe
pub const PROBE_ACK_LEN: usize = 5;

/// Size of the single reply read window
pub const REPLY_WINDOW: usize = 255;

/// Line terminator appended to every command
pub const TERMINATOR: u8 = b'\n';
