//! Byte-wide register transport and the method-call adapter.
//!
//! The EC is reached through a single firmware method that takes an 8-byte
//! little-endian request buffer and answers with a 32-bit value:
//!
//! ```text
//! offset  0       2       4           6
//!         address data    operation   reserved
//! ```
//!
//! A read uses operation `0x0100` and returns the register in the low byte of
//! the answer. A write uses operation `0x0000`. When the EC does not respond
//! the firmware answers with [`EC_NO_RESPONSE`].

use crate::ec::log::trace;

/// Answer returned by the firmware when the EC did not respond.
pub const EC_NO_RESPONSE: u32 = 0xFEFE_FEFE;

const OP_WRITE: u16 = 0x0000;
const OP_READ: u16 = 0x0100;

/// The only failure a transport may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    #[error("firmware did not answer")]
    Unreachable,
}

/// One-byte read/write access to EC registers.
pub trait RegisterTransport {
    fn read(&mut self, addr: u16) -> Result<u8, TransportError>;
    fn write(&mut self, addr: u16, value: u8) -> Result<(), TransportError>;
}

/// Raw firmware method call.
pub trait MethodCall {
    /// Evaluates the get/set method with `input` and returns its 32-bit answer.
    fn get_set_ulong(&mut self, input: &[u8; 8]) -> Result<u32, TransportError>;
}

/// Encodes a request buffer.
pub fn encode_request(addr: u16, data: u16, operation: u16) -> [u8; 8] {
    let mut buf = [0u8; 8];
    buf[0..2].copy_from_slice(&addr.to_le_bytes());
    buf[2..4].copy_from_slice(&data.to_le_bytes());
    buf[4..6].copy_from_slice(&operation.to_le_bytes());
    buf
}

/// [`RegisterTransport`] on top of a [`MethodCall`].
#[derive(Debug)]
pub struct MethodTransport<C: MethodCall> {
    call: C,
}

impl<C: MethodCall> MethodTransport<C> {
    pub fn new(call: C) -> Self {
        Self { call }
    }

    /// Consume the transport and return the method call.
    pub fn release(self) -> C {
        self.call
    }

    fn evaluate(&mut self, input: &[u8; 8]) -> Result<u32, TransportError> {
        match self.call.get_set_ulong(input)? {
            EC_NO_RESPONSE => Err(TransportError::Unreachable),
            output => Ok(output),
        }
    }
}

impl<C: MethodCall> RegisterTransport for MethodTransport<C> {
    fn read(&mut self, addr: u16) -> Result<u8, TransportError> {
        let output = self.evaluate(&encode_request(addr, 0, OP_READ))?;
        let value = (output & 0xFF) as u8;
        trace!("ec read {:#06x} -> {:#04x}", addr, value);
        Ok(value)
    }

    fn write(&mut self, addr: u16, value: u8) -> Result<(), TransportError> {
        trace!("ec write {:#06x} <- {:#04x}", addr, value);
        self.evaluate(&encode_request(addr, u16::from(value), OP_WRITE))?;
        Ok(())
    }
}
