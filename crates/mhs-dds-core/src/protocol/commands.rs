//! Protocol commands
//!
//! Defines the opcodes and addresses understood by the MHS-52xx firmware and the
//! immutable [`Command`] value built for each transaction.
//!
//! Wire form (terminator appended by the connection, never stored here):
//! - setter: `:s{address}{opcode}{payload}`
//! - query:  `:r{address}{opcode}`

use serde::{Deserialize, Serialize};
use std::fmt;

/// Single-letter parameter selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    /// Firmware version ('c', read only)
    Version,

    /// Output enable and global flags ('b')
    Enable,

    /// Waveform type ('w')
    Waveform,

    /// Duty cycle in thousandths ('d')
    DutyCycle,

    /// Amplitude in millivolts ('a')
    Amplitude,

    /// Offset, shifted by +120 ('o')
    Offset,

    /// Phase in degrees ('p')
    Phase,

    /// Frequency in 0.01 Hz units ('f')
    Frequency,

    /// Full-scale (non-attenuated) output ('y')
    Attenuation,
}

impl Opcode {
    /// All known opcodes
    pub const ALL: [Opcode; 9] = [
        Opcode::Version,
        Opcode::Enable,
        Opcode::Waveform,
        Opcode::DutyCycle,
        Opcode::Amplitude,
        Opcode::Offset,
        Opcode::Phase,
        Opcode::Frequency,
        Opcode::Attenuation,
    ];

    /// Protocol character for this opcode
    pub fn code(&self) -> char {
        match self {
            Opcode::Version => 'c',
            Opcode::Enable => 'b',
            Opcode::Waveform => 'w',
            Opcode::DutyCycle => 'd',
            Opcode::Amplitude => 'a',
            Opcode::Offset => 'o',
            Opcode::Phase => 'p',
            Opcode::Frequency => 'f',
            Opcode::Attenuation => 'y',
        }
    }

    /// Look up an opcode from its protocol character
    pub fn from_code(code: char) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.code() == code)
    }

    /// Whether the opcode can be written with `:s`
    pub fn is_settable(&self) -> bool {
        !matches!(self, Opcode::Version)
    }
}

/// Read or write access selector (`r` / `s`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Access {
    /// Query a value
    Read,
    /// Set a value
    Set,
}

impl Access {
    /// Protocol character for this access mode
    pub fn code(&self) -> char {
        match self {
            Access::Read => 'r',
            Access::Set => 's',
        }
    }
}

/// Target address of a command
///
/// Waveform channels are 1 and 2. The remaining values are fixed slots for
/// instrument-wide flags. Rendered as a bare decimal integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(pub u8);

impl Address {
    /// The instrument itself (version query)
    pub const INSTRUMENT: Address = Address(0);
    /// Channel 2 follows channel 1
    pub const TRACKING: Address = Address(3);
    /// External input is TTL
    pub const TTL_INPUT: Address = Address(4);
    /// Frequency counter engaged
    pub const COUNTER: Address = Address(6);

    /// Address of a waveform channel (not validated)
    pub fn channel(channel: u8) -> Self {
        Address(channel)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single command sent to the instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Read or set
    pub access: Access,
    /// Channel or flag slot
    pub address: Address,
    /// Parameter selector
    pub opcode: Opcode,
    /// Integer payload (setters only)
    pub payload: Option<i64>,
}

impl Command {
    /// Build a setter command carrying `payload`
    ///
    /// `opcode` must be settable; the version opcode is read only.
    pub fn set(address: Address, opcode: Opcode, payload: i64) -> Self {
        debug_assert!(opcode.is_settable(), "{:?} cannot be set", opcode);
        Self {
            access: Access::Set,
            address,
            opcode,
            payload: Some(payload),
        }
    }

    /// Build a query command
    pub fn query(address: Address, opcode: Opcode) -> Self {
        Self {
            access: Access::Read,
            address,
            opcode,
            payload: None,
        }
    }

    /// Firmware version query (`:r0c`)
    pub fn version() -> Self {
        Self::query(Address::INSTRUMENT, Opcode::Version)
    }

    /// Serialize without terminator
    pub fn to_wire(&self) -> String {
        self.to_string()
    }

    /// Length of the serialized command, which is also the length of the echo
    /// the instrument sends back before its answer
    pub fn echo_len(&self) -> usize {
        self.to_wire().len()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            ":{}{}{}",
            self.access.code(),
            self.address,
            self.opcode.code()
        )?;
        if let Some(payload) = self.payload {
            write!(f, "{}", payload)?;
        }
        Ok(())
    }
}
