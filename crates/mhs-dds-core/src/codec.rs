//! Parameter Codec
//!
//! Converts human units into the integers the MHS-52xx expects on the wire:
//! - Frequency: Hz → 0.01 Hz units
//! - Offset: signed percent → 0..=240 (shifted by +120, saturating)
//! - Phase: degrees → whole degrees (truncated)
//! - Booleans → 1/0 flags (attenuation is inverted)
//!
//! Only the offset is clamped. Everything else goes to the wire as given and the
//! firmware decides what to do with it.

use serde::{Deserialize, Serialize};

use crate::protocol::ProtocolError;

/// Offset zero point on the wire
pub const OFFSET_BIAS: i64 = 120;

/// Largest encoded offset
pub const OFFSET_MAX: i64 = 240;

/// Frequency units per hertz
pub const FREQUENCY_SCALE: f64 = 100.0;

/// Duty cycle units for 100 %
pub const DUTY_FULL_SCALE: i64 = 1000;

/// First arbitrary-waveform slot
pub const ARBITRARY_BASE: u32 = 100;

/// Output waveform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Waveform {
    /// Code 0
    Sine,
    /// Code 1
    Square,
    /// Code 2
    Triangle,
    /// Rising sawtooth, code 3
    RampUp,
    /// Falling sawtooth, code 4
    RampDown,
    /// Arbitrary waveform slot, counted from 0 (`100 + slot` on the wire)
    Arbitrary(u32),
    /// Any other code, sent unvalidated
    Raw(u32),
}

impl Waveform {
    /// Wire code for this waveform
    pub fn code(&self) -> u32 {
        match self {
            Waveform::Sine => 0,
            Waveform::Square => 1,
            Waveform::Triangle => 2,
            Waveform::RampUp => 3,
            Waveform::RampDown => 4,
            Waveform::Arbitrary(slot) => ARBITRARY_BASE.saturating_add(*slot),
            Waveform::Raw(code) => *code,
        }
    }

    /// Decode a wire code
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => Waveform::Sine,
            1 => Waveform::Square,
            2 => Waveform::Triangle,
            3 => Waveform::RampUp,
            4 => Waveform::RampDown,
            c if c >= ARBITRARY_BASE => Waveform::Arbitrary(c - ARBITRARY_BASE),
            c => Waveform::Raw(c),
        }
    }
}

impl From<u32> for Waveform {
    fn from(code: u32) -> Self {
        Waveform::from_code(code)
    }
}

/// Encode a signed percent offset: `clamp(offset + 120, 0, 240)`
pub fn encode_offset(offset: i64) -> i64 {
    offset.saturating_add(OFFSET_BIAS).clamp(0, OFFSET_MAX)
}

/// Decode an encoded offset back to signed percent
pub fn decode_offset(encoded: i64) -> i64 {
    encoded.saturating_sub(OFFSET_BIAS)
}

/// Encode a frequency in hertz as 0.01 Hz units
///
/// Negative values pass through. Fractions below 0.01 Hz are rounded.
pub fn encode_frequency(hertz: f64) -> i64 {
    (hertz * FREQUENCY_SCALE).round() as i64
}

/// Decode 0.01 Hz units to hertz
pub fn decode_frequency(encoded: i64) -> f64 {
    encoded as f64 / FREQUENCY_SCALE
}

/// Truncate a phase in degrees toward zero
pub fn encode_phase(degrees: f64) -> i64 {
    degrees.trunc() as i64
}

/// Boolean flag payload
pub fn encode_flag(on: bool) -> i64 {
    i64::from(on)
}

/// Attenuation payload; the flag on the wire means "full scale"
pub fn encode_attenuation(attenuate: bool) -> i64 {
    encode_flag(!attenuate)
}

/// Duty cycle validated to 0..=1000 thousandths
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DutyCycle(u16);

impl DutyCycle {
    /// From thousandths (1000 = 100 %)
    pub fn from_thousandths(value: i64) -> Result<Self, ProtocolError> {
        if (0..=DUTY_FULL_SCALE).contains(&value) {
            Ok(Self(value as u16))
        } else {
            Err(ProtocolError::InvalidParameter {
                name: "duty cycle",
                reason: format!("{} is outside 0..={}", value, DUTY_FULL_SCALE),
            })
        }
    }

    /// From a fraction in 0.0..=1.0
    pub fn from_fraction(fraction: f64) -> Result<Self, ProtocolError> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(ProtocolError::InvalidParameter {
                name: "duty cycle",
                reason: format!("{} is outside 0.0..=1.0", fraction),
            });
        }
        Self::from_thousandths((fraction * DUTY_FULL_SCALE as f64).round() as i64)
    }

    /// Value in thousandths
    pub fn thousandths(&self) -> i64 {
        i64::from(self.0)
    }
}

/// Waveform output channel validated to 1 or 2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel(u8);

impl Channel {
    /// First output
    pub const ONE: Channel = Channel(1);
    /// Second output
    pub const TWO: Channel = Channel(2);

    /// Validate an output channel number
    pub fn output(channel: u8) -> Result<Self, ProtocolError> {
        match channel {
            1 | 2 => Ok(Self(channel)),
            other => Err(ProtocolError::InvalidParameter {
                name: "channel",
                reason: format!("{} is not an output channel (1 or 2)", other),
            }),
        }
    }

    /// Channel number as sent on the wire
    pub fn number(&self) -> u8 {
        self.0
    }
}

impl From<Channel> for u8 {
    fn from(channel: Channel) -> Self {
        channel.0
    }
}
