//! Simulated instrument for offline use and tests
//!
//! Behaves like the MHS-52xx on the wire: acknowledges the probe, echoes every
//! command line and answers `:r` queries from the values last set with `:s`.

use std::collections::{HashMap, VecDeque};
use std::io;

use crate::protocol::{Access, Address, Opcode, Transport};

/// Version string reported for `:r0c`
pub const SIMULATED_VERSION: &str = "5225";

/// A parsed command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Line {
    access: Access,
    address: Address,
    opcode: Opcode,
    payload: Option<i64>,
}

fn parse_line(line: &str) -> Option<Line> {
    let rest = line.strip_prefix(':')?;
    let mut chars = rest.chars();
    let access = match chars.next()? {
        'r' => Access::Read,
        's' => Access::Set,
        _ => return None,
    };
    let rest = chars.as_str();

    let digits = rest.chars().take_while(char::is_ascii_digit).count();
    let address = Address(rest[..digits].parse().ok()?);
    let mut tail = rest[digits..].chars();
    let opcode = Opcode::from_code(tail.next()?)?;
    let payload = match tail.as_str() {
        "" => None,
        value => Some(value.parse().ok()?),
    };

    Some(Line {
        access,
        address,
        opcode,
        payload,
    })
}

/// In-memory stand-in for the function generator
#[derive(Debug, Default)]
pub struct SimulatedInstrument {
    /// Bytes waiting to be read by the host
    output: VecDeque<u8>,
    /// Partial line received so far
    line: Vec<u8>,
    /// Last value written per (address, opcode)
    values: HashMap<(u8, Opcode), i64>,
    /// Every complete line received, terminator removed
    received: Vec<String>,
}

impl SimulatedInstrument {
    /// Fresh instrument with nothing set
    pub fn new() -> Self {
        Self::default()
    }

    /// Last value set for `opcode` at `address`
    pub fn value(&self, address: Address, opcode: Opcode) -> Option<i64> {
        self.values.get(&(address.0, opcode)).copied()
    }

    /// All lines received from the host, probes included
    pub fn received(&self) -> &[String] {
        &self.received
    }

    fn respond(&mut self, line: &str) {
        self.received.push(line.to_string());

        if line == ":" {
            self.output.extend(b":\r\n");
            return;
        }

        // Unknown lines are echoed with nothing after them
        self.output.extend(line.as_bytes());
        let Some(parsed) = parse_line(line) else {
            return;
        };

        match parsed.access {
            Access::Set => {
                if let Some(value) = parsed.payload {
                    self.values.insert((parsed.address.0, parsed.opcode), value);
                }
                self.output.extend(b"ok\r\n");
            }
            Access::Read => {
                let answer = match parsed.opcode {
                    Opcode::Version => SIMULATED_VERSION.to_string(),
                    opcode => self
                        .value(parsed.address, opcode)
                        .unwrap_or_default()
                        .to_string(),
                };
                self.output.extend(answer.as_bytes());
                self.output.extend(b"\r\n");
            }
        }
    }
}

impl Transport for SimulatedInstrument {
    fn write_bytes(&mut self, data: &[u8]) -> io::Result<()> {
        for &byte in data {
            if byte == b'\n' {
                let raw = std::mem::take(&mut self.line);
                let line = String::from_utf8_lossy(&raw);
                let line = line.trim_end_matches('\r').to_string();
                self.respond(&line);
            } else {
                self.line.push(byte);
            }
        }
        Ok(())
    }

    fn read_bytes(&mut self, max: usize) -> io::Result<Vec<u8>> {
        let n = max.min(self.output.len());
        Ok(self.output.drain(..n).collect())
    }
}
