//! Raw transport boundary: the single logical session the engine reads and
//! writes. Framing and socket handling live behind this trait; the engine
//! only consumes complete inbound units.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("connection closed by peer")]
    Closed,
    #[error("transport is not connected")]
    NotConnected,
}

/// Blocking transport for one session.
///
/// `read_next_unit` blocks until a complete inbound unit is available and is
/// the engine's only suspension point. `Ok(None)` signals a clean end of
/// stream; connection loss surfaces as `Err`.
pub trait Transport {
    fn connect(&mut self, server: &str, port: u16) -> Result<(), TransportError>;

    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    fn read_next_unit(&mut self) -> Result<Option<Vec<u8>>, TransportError>;

    fn disconnect(&mut self);
}
