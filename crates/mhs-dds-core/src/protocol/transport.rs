//! Byte transport abstraction

use serialport::SerialPort;
use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

/// Size of a single `read()` call on the serial port
const READ_CHUNK: usize = 256;

/// Byte pipe the connection talks through
///
/// Reads are best effort: `read_bytes(n)` returns at most `n` bytes, and fewer
/// (possibly none) when the read timeout expires first. A timeout is not an error.
pub trait Transport: Send {
    /// Write all bytes
    fn write_bytes(&mut self, data: &[u8]) -> io::Result<()>;

    /// Read up to `max` bytes within the read timeout
    fn read_bytes(&mut self, max: usize) -> io::Result<Vec<u8>>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write_bytes(&mut self, data: &[u8]) -> io::Result<()> {
        (**self).write_bytes(data)
    }

    fn read_bytes(&mut self, max: usize) -> io::Result<Vec<u8>> {
        (**self).read_bytes(max)
    }
}

/// Serial port wrapper implementing [`Transport`]
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    timeout: Duration,
}

impl SerialTransport {
    /// Wrap an open port; its current timeout becomes the read window
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        let timeout = port.timeout();
        Self { port, timeout }
    }

    /// Name of the underlying port, if the OS reports one
    pub fn name(&self) -> Option<String> {
        self.port.name()
    }
}

/// Time left in a read window, `None` once it has closed
fn remaining_window(deadline: Instant, now: Instant) -> Option<Duration> {
    deadline
        .checked_duration_since(now)
        .filter(|left| !left.is_zero())
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
    )
}

impl Transport for SerialTransport {
    fn write_bytes(&mut self, data: &[u8]) -> io::Result<()> {
        self.port.write_all(data)?;
        self.port.flush()
    }

    fn read_bytes(&mut self, max: usize) -> io::Result<Vec<u8>> {
        let mut out = Vec::with_capacity(max);
        let mut buffer = [0u8; READ_CHUNK];
        let deadline = Instant::now() + self.timeout;

        // Keep collecting until the window is full or the port goes quiet.
        // Each read may only wait for what is left of the window.
        let result = loop {
            if out.len() >= max {
                break Ok(());
            }
            let Some(left) = remaining_window(deadline, Instant::now()) else {
                break Ok(());
            };
            if let Err(e) = self.port.set_timeout(left) {
                break Err(io::Error::new(io::ErrorKind::Other, e));
            }
            let want = (max - out.len()).min(buffer.len());
            match self.port.read(&mut buffer[..want]) {
                Ok(0) => break Ok(()),
                Ok(n) => out.extend_from_slice(&buffer[..n]),
                Err(ref e) if is_timeout(e) => break Ok(()),
                Err(e) => break Err(e),
            }
        };

        self.port
            .set_timeout(self.timeout)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        result.map(|()| out)
    }
}
