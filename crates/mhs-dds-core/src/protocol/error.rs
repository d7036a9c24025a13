//! Protocol errors

use thiserror::Error;

/// Errors that can occur while talking to the function generator
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Opening or configuring the serial port failed
    #[error("Connection to '{port}' failed: {reason}")]
    ConnectionFailed {
        /// Port name as configured
        port: String,
        /// Underlying failure
        reason: String,
    },

    /// A read or write on the open port failed
    #[error("Serial port error: {0}")]
    SerialError(String),

    /// The instrument has no command for this operation
    #[error("Operation not supported: {0}")]
    Unsupported(&'static str),

    /// A checked parameter was out of range
    #[error("Invalid {name}: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// The blocking task running a shared transaction panicked or was cancelled
    #[error("Transaction task failed: {0}")]
    TaskFailed(String),

    /// Connection config could not be parsed or written
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem error while loading or saving config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
