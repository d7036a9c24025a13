//! Function generator API
//!
//! One method per instrument setting. Each call builds a fresh [`Command`], runs a
//! single transaction and hands back the raw [`Reply`]. Nothing about the
//! instrument state is cached here.

use tracing::{debug, warn};

use crate::codec::{
    decode_frequency, decode_offset, encode_attenuation, encode_flag, encode_frequency,
    encode_offset, encode_phase, Channel, DutyCycle, Waveform, OFFSET_MAX,
};
use crate::protocol::{
    Address, Command, Connection, ConnectionConfig, Opcode, ProtocolError, Reply,
    SerialTransport, Transport,
};

/// MHS-52xx dual-channel DDS function generator
pub struct Generator<T: Transport = SerialTransport> {
    connection: Connection<T>,
}

impl Generator<SerialTransport> {
    /// Open the generator's serial port
    pub fn open(config: &ConnectionConfig) -> Result<Self, ProtocolError> {
        Ok(Self::new(Connection::open(config)?))
    }
}

impl<T: Transport> Generator<T> {
    /// Wrap an open connection
    pub fn new(connection: Connection<T>) -> Self {
        Self { connection }
    }

    /// Build a generator directly on a transport
    pub fn with_transport(transport: T) -> Self {
        Self::new(Connection::with_transport(transport))
    }

    /// Borrow the underlying connection
    pub fn connection(&self) -> &Connection<T> {
        &self.connection
    }

    /// Mutably borrow the underlying connection
    pub fn connection_mut(&mut self) -> &mut Connection<T> {
        &mut self.connection
    }

    /// Release the underlying connection
    pub fn into_connection(self) -> Connection<T> {
        self.connection
    }

    fn set(&mut self, address: Address, opcode: Opcode, payload: i64) -> Result<Reply, ProtocolError> {
        self.connection.execute(&Command::set(address, opcode, payload))
    }

    /// Firmware version string (`:r0c`), uninterpreted
    pub fn get_version(&mut self) -> Result<Reply, ProtocolError> {
        self.connection.execute(&Command::version())
    }

    /// Enable output on `channel`
    pub fn chan_on(&mut self, channel: u8) -> Result<Reply, ProtocolError> {
        self.set(Address::channel(channel), Opcode::Enable, encode_flag(true))
    }

    /// Disable output on `channel`
    pub fn chan_off(&mut self, channel: u8) -> Result<Reply, ProtocolError> {
        self.set(Address::channel(channel), Opcode::Enable, encode_flag(false))
    }

    /// Select the waveform for `channel`
    pub fn set_waveform(
        &mut self,
        channel: u8,
        waveform: impl Into<Waveform>,
    ) -> Result<Reply, ProtocolError> {
        let code = waveform.into().code();
        self.set(Address::channel(channel), Opcode::Waveform, i64::from(code))
    }

    /// Duty cycle in thousandths (1000 = 100 %), not range checked
    pub fn set_duty_cycle(&mut self, channel: u8, duty: i64) -> Result<Reply, ProtocolError> {
        self.set(Address::channel(channel), Opcode::DutyCycle, duty)
    }

    /// Amplitude in millivolts
    pub fn set_amplitude(&mut self, channel: u8, millivolts: i64) -> Result<Reply, ProtocolError> {
        self.set(Address::channel(channel), Opcode::Amplitude, millivolts)
    }

    /// Offset from the zero line in signed percent; saturates at ±120
    pub fn set_offset(&mut self, channel: u8, offset: i64) -> Result<Reply, ProtocolError> {
        let encoded = encode_offset(offset);
        if decode_offset(encoded) != offset {
            warn!(offset, encoded, "offset out of range, clamped");
        }
        debug!("offset = {}", encoded);
        self.set(Address::channel(channel), Opcode::Offset, encoded)
    }

    /// Phase in degrees, truncated
    pub fn set_phase(&mut self, channel: u8, degrees: f64) -> Result<Reply, ProtocolError> {
        self.set(Address::channel(channel), Opcode::Phase, encode_phase(degrees))
    }

    /// Frequency in hertz (0.01 Hz resolution)
    pub fn set_frequency(&mut self, channel: u8, hertz: f64) -> Result<Reply, ProtocolError> {
        self.set(Address::channel(channel), Opcode::Frequency, encode_frequency(hertz))
    }

    /// Attenuate `channel` by 20 dB
    pub fn set_attenuation(&mut self, channel: u8, attenuate: bool) -> Result<Reply, ProtocolError> {
        self.set(
            Address::channel(channel),
            Opcode::Attenuation,
            encode_attenuation(attenuate),
        )
    }

    /// Make channel 2 follow channel 1's frequency
    ///
    /// Amplitude and duty cycle are tracked too if they are equal on both
    /// channels when tracking is switched on.
    pub fn set_tracking(&mut self, track: bool) -> Result<Reply, ProtocolError> {
        self.set(Address::TRACKING, Opcode::Enable, encode_flag(track))
    }

    /// Switch the external input to TTL
    pub fn ttl_input(&mut self, ttl: bool) -> Result<Reply, ProtocolError> {
        self.set(Address::TTL_INPUT, Opcode::Enable, encode_flag(ttl))
    }

    /// Engage the frequency counter
    pub fn engage_counter(&mut self, counter: bool) -> Result<Reply, ProtocolError> {
        self.set(Address::COUNTER, Opcode::Enable, encode_flag(counter))
    }

    /// Setting duty by pulse width has no known command; always fails without
    /// touching the port.
    pub fn set_pulse_time(&mut self, _channel: u8, _pulse_us: f64) -> Result<Reply, ProtocolError> {
        Err(ProtocolError::Unsupported("set_pulse_time"))
    }

    /// Query a parameter (`:r{channel}{opcode}`)
    pub fn query(&mut self, channel: u8, opcode: Opcode) -> Result<Reply, ProtocolError> {
        self.connection
            .execute(&Command::query(Address::channel(channel), opcode))
    }

    /// Read back the frequency in hertz; `None` if the reply is not a number
    pub fn read_frequency(&mut self, channel: u8) -> Result<Option<f64>, ProtocolError> {
        let reply = self.query(channel, Opcode::Frequency)?;
        Ok(reply.parse_integer().map(decode_frequency))
    }

    /// Read back the offset in signed percent
    ///
    /// `None` if the reply is not a number in the encoded range 0..=240.
    pub fn read_offset(&mut self, channel: u8) -> Result<Option<i64>, ProtocolError> {
        let reply = self.query(channel, Opcode::Offset)?;
        Ok(reply
            .parse_integer()
            .filter(|encoded| (0..=OFFSET_MAX).contains(encoded))
            .map(decode_offset))
    }

    /// Duty cycle with range checking
    pub fn set_duty(&mut self, channel: Channel, duty: DutyCycle) -> Result<Reply, ProtocolError> {
        self.set_duty_cycle(channel.number(), duty.thousandths())
    }

    /// Duty cycle from a fraction in 0.0..=1.0
    pub fn set_duty_fraction(&mut self, channel: Channel, fraction: f64) -> Result<Reply, ProtocolError> {
        let duty = DutyCycle::from_fraction(fraction)?;
        self.set_duty(channel, duty)
    }
}
