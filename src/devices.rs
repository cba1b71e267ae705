//! Device registration and dispatch
//!
//! A device is either a serial port with the programmer bridge behind it or
//! one of the built-in devices enabled at compile time.

use at28c_core::{Link, Transport};
use thiserror::Error;

/// Link over whichever transport the device name selected
pub type DeviceLink = Link<Box<dyn Transport>>;

/// Information about a device
pub struct DeviceInfo {
    /// Name to pass to `--device`
    pub name: String,
    /// Short description
    pub description: String,
}

/// Errors raised while opening a device
#[derive(Debug, Error)]
pub enum DeviceError {
    /// Serial support is compiled out and the name is not a built-in device
    #[cfg(not(feature = "serial"))]
    #[error("unknown device '{0}' (serial support not compiled in)")]
    Unknown(String),

    #[cfg(feature = "serial")]
    #[error(transparent)]
    Serial(#[from] at28c_serial::SerialError),
}

/// Built-in devices (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn builtin_devices() -> Vec<DeviceInfo> {
    let mut devices = Vec::new();

    #[cfg(feature = "dummy")]
    devices.push(DeviceInfo {
        name: "dummy".to_string(),
        description: "In-memory chip emulator for testing".to_string(),
    });

    devices
}

/// Generate a short list of built-in device names for CLI help
pub fn builtin_names_short() -> String {
    let devices = builtin_devices();
    if devices.is_empty() {
        return "none".to_string();
    }
    let names: Vec<&str> = devices.iter().map(|d| d.name.as_str()).collect();
    names.join(", ")
}

/// All devices: built-ins first, then the serial ports found on the system
pub fn available_devices() -> Vec<DeviceInfo> {
    #[allow(unused_mut)]
    let mut devices = builtin_devices();

    #[cfg(feature = "serial")]
    match at28c_serial::available_ports() {
        Ok(ports) => devices.extend(ports.into_iter().map(|p| DeviceInfo {
            name: p.name,
            description: p.description,
        })),
        Err(e) => log::warn!("Failed to enumerate serial ports: {}", e),
    }

    devices
}

/// Open a device by name
pub fn open_device(name: &str) -> Result<DeviceLink, DeviceError> {
    #[cfg(feature = "dummy")]
    if name == "dummy" {
        log::info!("Using in-memory emulator");
        let transport: Box<dyn Transport> = Box::new(at28c_dummy::DummyEeprom::new_default());
        return Ok(Link::new(transport));
    }

    open_serial(name)
}

#[cfg(feature = "serial")]
fn open_serial(name: &str) -> Result<DeviceLink, DeviceError> {
    let transport: Box<dyn Transport> = Box::new(at28c_serial::SerialTransport::open(name)?);
    log::info!("Opened {}", name);
    Ok(Link::new(transport))
}

#[cfg(not(feature = "serial"))]
fn open_serial(name: &str) -> Result<DeviceLink, DeviceError> {
    Err(DeviceError::Unknown(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "dummy")]
    #[test]
    fn test_open_dummy() {
        let mut link = open_device("dummy").unwrap();
        assert!(link.write_byte(0, 0x42).unwrap().ok());
        assert_eq!(link.read_byte(0).unwrap(), 0x42);
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn test_builtin_listed() {
        assert!(builtin_names_short().contains("dummy"));
        assert!(available_devices().iter().any(|d| d.name == "dummy"));
    }

    #[cfg(feature = "serial")]
    #[test]
    fn test_open_missing_port() {
        let err = open_device("/dev/at28c-does-not-exist").err();
        assert!(matches!(err, Some(DeviceError::Serial(_))));
    }
}
