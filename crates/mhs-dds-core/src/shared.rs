//! Shared generator handle for async callers
//!
//! The probe/command/read sequence is not atomic on the wire, so the lock is held
//! for the whole closure and the blocking I/O runs on tokio's blocking pool.

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::generator::Generator;
use crate::protocol::{Command, ProtocolError, Reply, SerialTransport, Transport};

/// Cloneable handle serialising access to one [`Generator`]
pub struct SharedGenerator<T: Transport + 'static = SerialTransport> {
    inner: Arc<Mutex<Generator<T>>>,
}

impl<T: Transport + 'static> Clone for SharedGenerator<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transport + 'static> SharedGenerator<T> {
    /// Take ownership of a generator
    pub fn new(generator: Generator<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(generator)),
        }
    }

    /// Run `f` with exclusive access to the generator
    ///
    /// Use one call for several operations that must not be interleaved with
    /// other users.
    pub async fn with<R, F>(&self, f: F) -> Result<R, ProtocolError>
    where
        F: FnOnce(&mut Generator<T>) -> Result<R, ProtocolError> + Send + 'static,
        R: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let mut generator = inner.blocking_lock();
            f(&mut *generator)
        })
        .await
        .map_err(|e| ProtocolError::TaskFailed(e.to_string()))?
    }

    /// Execute a single command
    pub async fn execute(&self, command: Command) -> Result<Reply, ProtocolError> {
        self.with(move |generator| generator.connection_mut().execute(&command))
            .await
    }

    /// Set the frequency of `channel` in hertz
    pub async fn set_frequency(&self, channel: u8, hertz: f64) -> Result<Reply, ProtocolError> {
        self.with(move |generator| generator.set_frequency(channel, hertz))
            .await
    }
}
