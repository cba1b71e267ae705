//! Error types for at28c-core
//!
//! This module provides a no_std compatible error type that can be used
//! throughout the crate. Verification mismatches are not errors: they are
//! collected in [`SweepResult`](crate::sweep::SweepResult) values instead.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Link errors
    /// The bridge sent no byte before the read timeout expired
    ///
    /// The protocol has no way to resynchronize, so this is fatal for the
    /// whole operation.
    NoResponse {
        /// Opcode of the frame that went unanswered
        opcode: u8,
    },
    /// The transport failed to send or receive
    IoError,

    // Address/size errors
    /// Start address is beyond the 15-bit address space
    AddressOutOfBounds {
        /// The rejected address
        address: u32,
    },
    /// An explicit size asks for more bytes than the image holds
    ImageTooShort {
        /// Bytes needed by the requested range
        needed: usize,
        /// Bytes available in the image
        available: usize,
    },
    /// The reference image does not cover the range under test
    ReferenceTooShort {
        /// Bytes needed to cover the range end
        needed: usize,
        /// Bytes available in the reference image
        available: usize,
    },

    // Sink errors
    /// Writing a downloaded byte to the output sink failed
    SinkError,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoResponse { opcode } => write!(
                f,
                "no response from programmer (command '{}')",
                char::from(*opcode)
            ),
            Self::IoError => write!(f, "I/O error on programmer link"),
            Self::AddressOutOfBounds { address } => {
                write!(f, "address {} is outside the 32 KiB address space", address)
            }
            Self::ImageTooShort { needed, available } => write!(
                f,
                "image holds {} bytes but {} were requested",
                available, needed
            ),
            Self::ReferenceTooShort { needed, available } => write!(
                f,
                "reference image holds {} bytes but the range needs {}",
                available, needed
            ),
            Self::SinkError => write!(f, "failed to store downloaded data"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_display_no_response() {
        let err = Error::NoResponse { opcode: b'r' };
        assert_eq!(
            err.to_string(),
            "no response from programmer (command 'r')"
        );
    }

    #[test]
    fn test_display_sizes() {
        let err = Error::ImageTooShort {
            needed: 16,
            available: 4,
        };
        assert_eq!(err.to_string(), "image holds 4 bytes but 16 were requested");
    }
}
