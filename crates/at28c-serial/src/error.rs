//! Error types for the serial transport

use thiserror::Error;

/// Serial transport errors
#[derive(Debug, Error)]
pub enum SerialError {
    /// Failed to open or configure the port
    #[error("Failed to open {device}: {source}")]
    OpenFailed {
        /// Device path
        device: String,
        /// Underlying error
        #[source]
        source: serialport::Error,
    },

    /// I/O error during communication
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serial port error
    #[error("Serial port error: {0}")]
    PortError(#[from] serialport::Error),
}

/// Result type for serial transport operations
pub type Result<T> = std::result::Result<T, SerialError>;

impl From<SerialError> for at28c_core::Error {
    fn from(e: SerialError) -> Self {
        log::error!("serial: {}", e);
        at28c_core::Error::IoError
    }
}
