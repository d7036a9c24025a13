use mhs_dds_core::protocol::{
    Address, Command, Connection, Opcode, ProtocolError, ReplyStatus, Transport,
};
use pretty_assertions::assert_eq;
use std::io;

/// Mock serial port for testing
///
/// Acknowledges the probe, then echoes each command line followed by `suffix`.
struct MockSerial {
    send_buffer: Vec<u8>,
    recv_buffer: Vec<u8>,
    suffix: Vec<u8>,
    silent: bool,
    fail_on_send: bool,
    fail_on_read: bool,
}

impl MockSerial {
    fn new() -> Self {
        Self {
            send_buffer: Vec::new(),
            recv_buffer: Vec::new(),
            suffix: Vec::new(),
            silent: false,
            fail_on_send: false,
            fail_on_read: false,
        }
    }

    fn echoing(suffix: &[u8]) -> Self {
        Self {
            suffix: suffix.to_vec(),
            ..Self::new()
        }
    }

    fn silent() -> Self {
        Self {
            silent: true,
            ..Self::new()
        }
    }
}

impl Transport for MockSerial {
    fn write_bytes(&mut self, data: &[u8]) -> io::Result<()> {
        if self.fail_on_send {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "Serial write failed"));
        }
        self.send_buffer.extend_from_slice(data);
        if self.silent {
            return Ok(());
        }
        if data == b":\n" {
            self.recv_buffer.extend_from_slice(b":\r\n");
        } else {
            let line = data.strip_suffix(b"\n").unwrap_or(data);
            self.recv_buffer.extend_from_slice(line);
            self.recv_buffer.extend_from_slice(&self.suffix);
        }
        Ok(())
    }

    fn read_bytes(&mut self, max: usize) -> io::Result<Vec<u8>> {
        if self.fail_on_read {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "device unplugged"));
        }
        let n = max.min(self.recv_buffer.len());
        Ok(self.recv_buffer.drain(..n).collect())
    }
}

#[test]
fn test_echo_stripped_for_various_lengths() {
    for cmd in [":r0", ":s1b1", ":s1f50000"] {
        let mut conn = Connection::with_transport(MockSerial::echoing(b"OK"));
        let reply = conn.execute_raw(cmd).unwrap();
        assert_eq!(reply.as_bytes(), b"OK", "command {cmd:?}");
        assert_eq!(reply.raw_len(), cmd.len() + 2);
    }
}

#[test]
fn test_silent_device_gives_empty_reply() {
    let mut conn = Connection::with_transport(MockSerial::silent());
    let reply = conn.execute(&Command::version()).unwrap();
    assert!(reply.is_empty());
    assert_eq!(reply.status(), ReplyStatus::Empty);
}

#[test]
fn test_wire_framing() {
    let mut conn = Connection::with_transport(MockSerial::silent());
    conn.execute(&Command::set(Address::channel(1), Opcode::Waveform, 1))
        .unwrap();
    conn.execute(&Command::version()).unwrap();

    let sent = conn.into_inner().send_buffer;
    assert_eq!(sent, b":\n:s1w1\n:\n:r0c\n".to_vec());
}

#[test]
fn test_reply_is_unconfirmed() {
    let mut conn = Connection::with_transport(MockSerial::echoing(b"\r\n"));
    let reply = conn
        .execute(&Command::set(Address::channel(2), Opcode::Amplitude, 500))
        .unwrap();
    assert_eq!(reply.status(), ReplyStatus::Unconfirmed);
    assert_eq!(reply.text(), "");
}

#[test]
fn test_write_failure_is_serial_error() {
    let mut mock = MockSerial::new();
    mock.fail_on_send = true;
    let mut conn = Connection::with_transport(mock);
    let result = conn.execute(&Command::version());
    assert!(matches!(result, Err(ProtocolError::SerialError(_))));
}

#[test]
fn test_read_failure_is_serial_error() {
    let mut mock = MockSerial::new();
    mock.fail_on_read = true;
    let mut conn = Connection::with_transport(mock);
    let result = conn.execute(&Command::version());
    assert!(matches!(result, Err(ProtocolError::SerialError(_))));
}

#[test]
fn test_protocol_error_display() {
    let err = ProtocolError::ConnectionFailed {
        port: "COM4".to_string(),
        reason: "No such file or directory".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Connection to 'COM4' failed: No such file or directory"
    );
    assert!(!ProtocolError::Unsupported("set_pulse_time")
        .to_string()
        .is_empty());
    assert_eq!(
        ProtocolError::TaskFailed("task cancelled".to_string()).to_string(),
        "Transaction task failed: task cancelled"
    );
}
