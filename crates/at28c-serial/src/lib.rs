//! at28c-serial - USB-serial bridge transport
//!
//! This crate opens the serial device exposed by the programmer bridge and
//! implements [`at28c_core::Transport`] on top of it.
//!
//! # Example
//!
//! ```no_run
//! use at28c_core::Link;
//! use at28c_serial::SerialTransport;
//!
//! let transport = SerialTransport::open("/dev/ttyACM0")?;
//! let mut link = Link::new(transport);
//! let byte = link.read_byte(0)?;
//! println!("Byte at 0: 0x{:02X}", byte);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod transport;

// Re-exports
pub use error::{Result, SerialError};
pub use transport::{available_ports, PortInfo, SerialTransport};

/// Open a link to the bridge on a serial port
pub fn open_serial(device: &str) -> Result<at28c_core::Link<SerialTransport>> {
    let transport = SerialTransport::open(device)?;
    Ok(at28c_core::Link::new(transport))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_port() {
        let err = SerialTransport::open("/dev/at28c-does-not-exist").err();
        assert!(matches!(err, Some(SerialError::OpenFailed { .. })));
    }

    #[test]
    fn test_error_maps_to_core() {
        let err = SerialError::from(std::io::Error::new(std::io::ErrorKind::Other, "gone"));
        assert_eq!(at28c_core::Error::from(err), at28c_core::Error::IoError);
    }
}
