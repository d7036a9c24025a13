//! Instrument replies
//!
//! The firmware echoes every command before answering. A [`Reply`] is whatever
//! remains of the read window once that echo has been cut off.

use std::fmt;

/// What the driver knows about a reply
///
/// The firmware has no ack/nack, so a non-empty answer is never proof that a
/// setting was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyStatus {
    /// Nothing arrived past the echo (timeout or silent device)
    Empty,
    /// Bytes arrived but were not interpreted
    Unconfirmed,
}

/// Reply to one transaction, echo already stripped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    data: Vec<u8>,
    raw_len: usize,
}

impl Reply {
    /// Strip `echo_len` bytes from a raw read buffer
    ///
    /// A buffer shorter than the echo yields an empty reply.
    pub fn from_raw(raw: &[u8], echo_len: usize) -> Self {
        let data = raw.get(echo_len..).map(<[u8]>::to_vec).unwrap_or_default();
        Self {
            data,
            raw_len: raw.len(),
        }
    }

    /// Bytes after the echo
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the reply, returning the bytes after the echo
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Number of bytes read before stripping
    pub fn raw_len(&self) -> usize {
        self.raw_len
    }

    /// Number of bytes after the echo
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether nothing followed the echo
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Classify the reply
    pub fn status(&self) -> ReplyStatus {
        if self.data.is_empty() {
            ReplyStatus::Empty
        } else {
            ReplyStatus::Unconfirmed
        }
    }

    /// Reply as text with surrounding whitespace and line endings removed
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).trim().to_string()
    }

    /// Parse the reply as a decimal integer
    ///
    /// Returns `None` for empty or non-numeric replies.
    pub fn parse_integer(&self) -> Option<i64> {
        self.text().parse().ok()
    }
}

impl AsRef<[u8]> for Reply {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.data))
    }
}
