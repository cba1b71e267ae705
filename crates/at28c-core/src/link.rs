//! Command link to the bridge
//!
//! [`Link`] owns a transport and turns logical read, write and SDP operations
//! into protocol frames. Each frame is answered by exactly one byte; when the
//! bridge stays silent for [`READ_TIMEOUT`] the operation fails with
//! [`Error::NoResponse`] and the caller is expected to give up.

use crate::error::{Error, Result};
use crate::protocol::*;
use crate::transport::Transport;

/// Outcome of a single write transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteAck {
    /// Byte that was sent
    pub expected: u8,
    /// Byte the bridge read back after the write
    pub echoed: u8,
}

impl WriteAck {
    /// Whether the echo matches the written byte exactly
    pub fn ok(&self) -> bool {
        self.expected == self.echoed
    }

    /// Whether the echo matches the written byte on the masked bits
    pub fn ok_masked(&self, mask: u8) -> bool {
        masked_eq(self.expected, self.echoed, mask)
    }
}

/// Bridge connection
pub struct Link<T: Transport> {
    transport: T,
}

impl<T: Transport> Link<T> {
    /// Wrap an opened transport
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Get a reference to the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get a mutable reference to the transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Release the transport
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Send a frame and wait for the single response byte
    pub fn send_and_await_byte(&mut self, frame: &[u8]) -> Result<u8> {
        log::trace!("link: -> {:02X?}", frame);
        self.transport.write(frame)?;
        self.transport.flush()?;

        let mut response = [0u8];
        let n = self.transport.read_timeout(&mut response, READ_TIMEOUT)?;
        if n == 0 {
            log::error!("link: no response to frame {:02X?}", frame);
            let opcode = frame.first().copied().unwrap_or_default();
            return Err(Error::NoResponse { opcode });
        }

        log::trace!("link: <- {:02X}", response[0]);
        Ok(response[0])
    }

    /// Write a byte and collect the echo
    ///
    /// A mismatching echo is not an error; check [`WriteAck::ok`].
    pub fn write_byte(&mut self, address: u16, data: u8) -> Result<WriteAck> {
        let echoed = self.send_and_await_byte(&encode_write(address, data))?;
        Ok(WriteAck {
            expected: data,
            echoed,
        })
    }

    /// Read a byte
    pub fn read_byte(&mut self, address: u16) -> Result<u8> {
        self.send_and_await_byte(&encode_read(address))
    }

    /// Toggle software data protection, returning the raw response byte
    pub fn set_sdp(&mut self, enable: bool) -> Result<u8> {
        self.send_and_await_byte(&encode_sdp(enable))
    }
}
