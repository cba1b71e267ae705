//! Bridge protocol constants and frame encoding
//!
//! The USB-serial bridge understands four single-byte opcodes. Read and
//! write frames carry a 15-bit address split over two bytes; the top bit of
//! the high byte is always clear. Every frame is answered with exactly one
//! byte.

use core::time::Duration;

/// Read a byte: `r`, addr_hi, addr_lo
pub const CMD_READ: u8 = b'r';
/// Write a byte: `w`, addr_hi, addr_lo, data
pub const CMD_WRITE: u8 = b'w';
/// Enable software data protection
pub const CMD_SDP_ENABLE: u8 = b'e';
/// Disable software data protection
pub const CMD_SDP_DISABLE: u8 = b'd';

/// Response sent by the bridge after enabling SDP
pub const SDP_ENABLED_RESPONSE: u8 = b'E';
/// Response sent by the bridge after disabling SDP
pub const SDP_DISABLED_RESPONSE: u8 = b'D';

/// Size of the device address space (32 KiB)
pub const ROM_SIZE: usize = 32 * 1024;
/// Mask for the high address byte (bit 7 is always zero)
pub const ADDR_HI_MASK: u8 = 0x7F;

/// Link baud rate
pub const BAUD_RATE: u32 = 115_200;
/// Read timeout for a single response byte
pub const READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Length of a write frame
pub const WRITE_FRAME_LEN: usize = 4;
/// Length of a read frame
pub const READ_FRAME_LEN: usize = 3;

/// Split an address into the (high, low) bytes used on the wire
#[inline]
pub const fn encode_address(address: u16) -> (u8, u8) {
    (((address >> 8) as u8) & ADDR_HI_MASK, address as u8)
}

/// Reassemble an address from its wire bytes
#[inline]
pub const fn decode_address(hi: u8, lo: u8) -> u16 {
    (((hi & ADDR_HI_MASK) as u16) << 8) | lo as u16
}

/// Build a write frame
pub const fn encode_write(address: u16, data: u8) -> [u8; WRITE_FRAME_LEN] {
    let (hi, lo) = encode_address(address);
    [CMD_WRITE, hi, lo, data]
}

/// Build a read frame
pub const fn encode_read(address: u16) -> [u8; READ_FRAME_LEN] {
    let (hi, lo) = encode_address(address);
    [CMD_READ, hi, lo]
}

/// Build an SDP enable/disable frame
pub const fn encode_sdp(enable: bool) -> [u8; 1] {
    if enable {
        [CMD_SDP_ENABLE]
    } else {
        [CMD_SDP_DISABLE]
    }
}

/// Compare two bytes on the bits selected by `mask`
#[inline]
pub const fn masked_eq(a: u8, b: u8, mask: u8) -> bool {
    (a & mask) == (b & mask)
}
