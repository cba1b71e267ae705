//! Serial port transport implementation
//!
//! The bridge enumerates as a USB CDC device. Link parameters are fixed by
//! the protocol: 115200 baud, 8 data bits, no parity, one stop bit, no flow
//! control, one second read timeout.

use std::io::{Read, Write};
use std::time::Duration;

use at28c_core::protocol::{BAUD_RATE, READ_TIMEOUT};
use at28c_core::transport::Transport;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

use crate::error::{Result, SerialError};

/// Serial port transport
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Open a serial port with the bridge's link parameters
    pub fn open(device: &str) -> Result<Self> {
        let port = serialport::new(device, BAUD_RATE)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|source| SerialError::OpenFailed {
                device: device.to_string(),
                source,
            })?;

        log::info!("Opened serial port {} at {} baud", device, BAUD_RATE);

        Ok(Self { port })
    }

    /// Name of the underlying port, if known
    pub fn name(&self) -> Option<String> {
        self.port.name()
    }

    fn read_with_timeout(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        let old_timeout = self.port.timeout();
        if old_timeout != timeout {
            self.port.set_timeout(timeout)?;
        }

        let result = match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(SerialError::from(e)),
        };

        if old_timeout != timeout {
            self.port.set_timeout(old_timeout)?;
        }
        result
    }
}

impl Transport for SerialTransport {
    fn write(&mut self, data: &[u8]) -> at28c_core::Result<()> {
        self.port.write_all(data).map_err(SerialError::from)?;
        Ok(())
    }

    fn read_timeout(&mut self, buf: &mut [u8], timeout: Duration) -> at28c_core::Result<usize> {
        Ok(self.read_with_timeout(buf, timeout)?)
    }

    fn flush(&mut self) -> at28c_core::Result<()> {
        self.port.flush().map_err(SerialError::from)?;
        Ok(())
    }
}

/// A serial port that looks like it could host the bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    /// Device path
    pub name: String,
    /// Human-readable description
    pub description: String,
}

/// List the serial ports present on this machine
pub fn available_ports() -> Result<Vec<PortInfo>> {
    let ports = serialport::available_ports()?;
    Ok(ports
        .into_iter()
        .map(|p| {
            let description = match p.port_type {
                serialport::SerialPortType::UsbPort(usb) => format!(
                    "USB {:04x}:{:04x} {}",
                    usb.vid,
                    usb.pid,
                    usb.product.unwrap_or_default()
                ),
                serialport::SerialPortType::BluetoothPort => "Bluetooth".to_string(),
                serialport::SerialPortType::PciPort => "PCI".to_string(),
                serialport::SerialPortType::Unknown => "Unknown".to_string(),
            };
            PortInfo {
                name: p.port_name,
                description: description.trim_end().to_string(),
            }
        })
        .collect())
}
