//! CLI argument parsing

use crate::devices;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse a string as a hex or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// Parse a string as a hex or decimal u8 (used for masks)
fn parse_hex_u8(s: &str) -> Result<u8, String> {
    let value = parse_hex_u32(s)?;
    u8::try_from(value).map_err(|_| format!("Value {} does not fit in 8 bits", value))
}

/// Generate dynamic help text for the device argument
fn device_help() -> String {
    format!(
        "Serial port of the programmer, or a built-in device [built-in: {}]",
        devices::builtin_names_short()
    )
}

#[derive(Parser)]
#[command(name = "at28c")]
#[command(
    author,
    version,
    about = "Programmer and tester for AT28C256-compatible EEPROM/SRAM chips",
    long_about = None
)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload an image, download the chip, or toggle software data protection
    Program {
        /// Device to use
        #[arg(short, long, help = device_help())]
        device: String,

        /// Image file to write to the chip
        #[arg(short, long, conflicts_with = "output")]
        input: Option<PathBuf>,

        /// File to save the chip contents to
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Start address (hex or decimal)
        #[arg(short, long, default_value = "0", value_parser = parse_hex_u32)]
        address: u32,

        /// Number of bytes; 0 means the image size on upload and the rest of
        /// the chip on download
        #[arg(short, long, default_value = "0", value_parser = parse_hex_u32)]
        size: u32,

        /// Enable software data protection after the transfer
        #[arg(short = 'E', long)]
        sdp_enable: bool,

        /// Disable software data protection before the transfer
        #[arg(short = 'D', long)]
        sdp_disable: bool,
    },

    /// Test the chip with fixed and random patterns and a retention check
    Test {
        /// Device to use
        #[arg(short, long, help = device_help())]
        device: String,

        /// Compare the chip against this full chip dump instead of writing
        /// patterns
        #[arg(short, long)]
        reference: Option<PathBuf>,

        /// Start address (hex or decimal)
        #[arg(short, long, default_value = "0", value_parser = parse_hex_u32)]
        address: u32,

        /// Number of bytes; 0 means the rest of the chip
        #[arg(short, long, default_value = "0", value_parser = parse_hex_u32)]
        size: u32,

        /// Only compare the data bits set in this mask (hex or decimal)
        #[arg(short, long, default_value = "255", value_parser = parse_hex_u8)]
        mask: u8,

        /// Seconds to wait between the retention write and read passes
        #[arg(long, default_value = "60")]
        hold: u64,
    },

    /// List serial ports and built-in devices
    ListDevices,
}
