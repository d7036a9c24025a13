//! # mhs-dds Core Library
//!
//! Host-side driver for MHS-52xx series dual-channel DDS function generators.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - The probe/command transaction engine over a serial link
//! - Encoding of frequency, amplitude, offset, phase, duty cycle and flags
//! - A simulated instrument for offline use
//! - A shared handle for async callers
//!
//! ## Example
//!
//! ```rust,ignore
//! use mhs_dds_core::prelude::*;
//!
//! let config = ConnectionConfig::new("/dev/ttyUSB0");
//! let mut dds = Generator::open(&config)?;
//!
//! println!("Version: {}", dds.get_version()?.text());
//! dds.chan_on(1)?;
//! dds.set_waveform(1, Waveform::Square)?;
//! dds.set_frequency(1, 5000.0)?;
//! ```

pub mod codec;
pub mod generator;
pub mod protocol;
pub mod shared;
pub mod simulator;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::codec::{Channel, DutyCycle, Waveform};
    pub use crate::generator::Generator;
    pub use crate::protocol::{
        Address, Command, Connection, ConnectionConfig, Opcode, ProtocolError, Reply,
        ReplyStatus, Transport,
    };
    pub use crate::shared::SharedGenerator;
    pub use crate::simulator::SimulatedInstrument;
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
