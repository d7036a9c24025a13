//! Connection management
//!
//! Runs the probe/command transaction against the function generator.
//!
//! Every transaction is:
//! 1. write the probe `":\n"`
//! 2. read up to 5 bytes and drop them (probe acknowledgement)
//! 3. write the command followed by `"\n"`
//! 4. read up to 255 bytes in one timed window
//! 5. cut the echoed command off the front of that window
//!
//! Short or empty reads are normal outcomes and never raise an error.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};

use super::{
    serial::{clear_buffers, configure_port, open_port},
    Command, ProtocolError, Reply, SerialTransport, Transport, DEFAULT_BAUD_RATE,
    DEFAULT_TIMEOUT_MS, PROBE, PROBE_ACK_LEN, REPLY_WINDOW, TERMINATOR,
};

/// Connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Serial port name (e.g. "/dev/ttyUSB0" or "COM4")
    pub port_name: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Read timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            port_name: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl ConnectionConfig {
    /// Default settings for the given port
    pub fn new(port_name: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            ..Self::default()
        }
    }

    /// Per-user config file location (`<config dir>/mhs-dds/connection.json`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("mhs-dds").join("connection.json"))
    }

    /// Load a config from a JSON file; missing fields take their defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ProtocolError> {
        let content = fs::read_to_string(path.as_ref())?;
        serde_json::from_str(&content).map_err(|e| {
            ProtocolError::Config(format!("{}: {}", path.as_ref().display(), e))
        })
    }

    /// Save the config as pretty-printed JSON, creating parent directories
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ProtocolError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ProtocolError::Config(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Instrument connection; owns its transport exclusively
///
/// Not safe to share between threads without serialising whole transactions,
/// since interleaved probe/command sequences corrupt the echo offset.
pub struct Connection<T: Transport = SerialTransport> {
    transport: T,
    /// Metrics: cumulative bytes sent & received, completed transactions
    tx_bytes: u64,
    rx_bytes: u64,
    transactions: u64,
}

impl Connection<SerialTransport> {
    /// Open and configure the serial port described by `config`
    ///
    /// This is the only fatal step; failures come back as
    /// [`ProtocolError::ConnectionFailed`].
    pub fn open(config: &ConnectionConfig) -> Result<Self, ProtocolError> {
        let connection_failed = |e: ProtocolError| ProtocolError::ConnectionFailed {
            port: config.port_name.clone(),
            reason: e.to_string(),
        };

        let mut port = open_port(
            &config.port_name,
            Some(config.baud_rate),
            Some(config.timeout_ms),
        )?;
        configure_port(port.as_mut()).map_err(connection_failed)?;
        clear_buffers(port.as_mut()).map_err(connection_failed)?;

        info!(
            port = %config.port_name,
            baud = config.baud_rate,
            timeout_ms = config.timeout_ms,
            "opened instrument port"
        );

        Ok(Self::with_transport(SerialTransport::new(port)))
    }
}

impl<T: Transport> Connection<T> {
    /// Wrap an already-open transport
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            tx_bytes: 0,
            rx_bytes: 0,
            transactions: 0,
        }
    }

    /// Execute a command and return its reply
    pub fn execute(&mut self, command: &Command) -> Result<Reply, ProtocolError> {
        self.transact(&command.to_wire(), command.echo_len())
    }

    /// Execute a raw command string (without terminator)
    ///
    /// The first `command.len()` bytes of the read window are treated as the echo.
    pub fn execute_raw(&mut self, command: &str) -> Result<Reply, ProtocolError> {
        self.transact(command, command.len())
    }

    fn transact(&mut self, command: &str, echo_len: usize) -> Result<Reply, ProtocolError> {
        self.write(PROBE)?;
        let ack = self.read(PROBE_ACK_LEN)?;
        trace!("probe ack: {:?}", String::from_utf8_lossy(&ack));

        let mut framed = Vec::with_capacity(command.len() + 1);
        framed.extend_from_slice(command.as_bytes());
        framed.push(TERMINATOR);
        self.write(&framed)?;

        let raw = self.read(REPLY_WINDOW)?;
        trace!("raw reply: {:?}", String::from_utf8_lossy(&raw));

        let reply = Reply::from_raw(&raw, echo_len);
        self.transactions = self.transactions.saturating_add(1);

        debug!(
            command,
            raw_len = raw.len(),
            reply = %reply.text(),
            "transaction complete"
        );

        Ok(reply)
    }

    /// Cumulative (tx bytes, rx bytes, transactions)
    pub fn counters(&self) -> (u64, u64, u64) {
        (self.tx_bytes, self.rx_bytes, self.transactions)
    }

    /// Borrow the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Release the transport
    pub fn into_inner(self) -> T {
        self.transport
    }

    fn write(&mut self, data: &[u8]) -> Result<(), ProtocolError> {
        self.transport
            .write_bytes(data)
            .map_err(|e| ProtocolError::SerialError(e.to_string()))?;
        self.tx_bytes = self.tx_bytes.saturating_add(data.len() as u64);
        Ok(())
    }

    fn read(&mut self, max: usize) -> Result<Vec<u8>, ProtocolError> {
        match self.transport.read_bytes(max) {
            Ok(data) => {
                self.rx_bytes = self.rx_bytes.saturating_add(data.len() as u64);
                Ok(data)
            }
            Err(e) => {
                warn!("read failed: {}", e);
                Err(ProtocolError::SerialError(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Address, Opcode};
    use std::collections::VecDeque;
    use std::io;

    /// Replays canned read windows and records writes
    struct ScriptedTransport {
        written: Vec<Vec<u8>>,
        reads: VecDeque<Vec<u8>>,
    }

    impl ScriptedTransport {
        fn new(reads: &[&str]) -> Self {
            Self {
                written: Vec::new(),
                reads: reads.iter().map(|r| r.as_bytes().to_vec()).collect(),
            }
        }
    }

    impl Transport for ScriptedTransport {
        fn write_bytes(&mut self, data: &[u8]) -> io::Result<()> {
            self.written.push(data.to_vec());
            Ok(())
        }

        fn read_bytes(&mut self, max: usize) -> io::Result<Vec<u8>> {
            let mut data = self.reads.pop_front().unwrap_or_default();
            data.truncate(max);
            Ok(data)
        }
    }

    #[test]
    fn test_connection_config_default() {
        let config = ConnectionConfig::default();
        assert_eq!(config.baud_rate, 57600);
        assert_eq!(config.timeout_ms, 100);
        assert!(config.port_name.is_empty());
    }

    #[test]
    fn test_connection_config_partial_json() {
        let config: ConnectionConfig = serde_json::from_str(r#"{"port_name": "COM4"}"#).unwrap();
        assert_eq!(config, ConnectionConfig::new("COM4"));
    }

    #[test]
    fn test_transaction_sequence() {
        let transport = ScriptedTransport::new(&[":\r\n", ":s1b1\r\n"]);
        let mut conn = Connection::with_transport(transport);

        let reply = conn.execute_raw(":s1b1").unwrap();
        assert_eq!(reply.as_bytes(), b"\r\n");

        let transport = conn.into_inner();
        assert_eq!(transport.written, vec![b":\n".to_vec(), b":s1b1\n".to_vec()]);
    }

    #[test]
    fn test_probe_ack_is_bounded() {
        let transport = ScriptedTransport::new(&[":\r\nGARBAGE", ":r0c5.20"]);
        let mut conn = Connection::with_transport(transport);
        let reply = conn.execute(&Command::version()).unwrap();
        assert_eq!(reply.text(), "5.20");
    }

    #[test]
    fn test_counters() {
        let transport = ScriptedTransport::new(&[":\r\n", ":s1b1OK"]);
        let mut conn = Connection::with_transport(transport);
        conn.execute_raw(":s1b1").unwrap();

        let (tx, rx, transactions) = conn.counters();
        assert_eq!(tx, 2 + 6);
        assert_eq!(rx, 3 + 7);
        assert_eq!(transactions, 1);
    }

    #[test]
    fn test_execute_strips_command_echo() {
        let transport = ScriptedTransport::new(&[":\r\n", ":s12f-1000OK"]);
        let mut conn = Connection::with_transport(transport);

        let command = Command::set(Address(12), Opcode::Frequency, -1000);
        let reply = conn.execute(&command).unwrap();
        assert_eq!(reply.as_bytes(), b"OK");
        assert_eq!(reply.raw_len(), command.echo_len() + 2);
    }
}
