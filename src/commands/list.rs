//! List command implementation

use crate::devices;

/// List built-in devices and the serial ports found on this system
pub fn list_devices() {
    let devices = devices::available_devices();

    println!("Available devices:");
    println!();
    if devices.is_empty() {
        println!("  (none found)");
        return;
    }
    for device in &devices {
        println!("  {:<20} - {}", device.name, device.description);
    }
}
