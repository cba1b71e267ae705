//! at28c - Programmer and tester for AT28C256-compatible chips
//!
//! Drives a USB-serial bridge that exposes a 32 KiB parallel EEPROM or SRAM
//! through a four-command byte protocol.
//!
//! # Architecture
//!
//! - `at28c-core` holds the protocol, the image programmer and the tester.
//!   It never touches files or ports.
//! - `at28c-serial` and `at28c-dummy` provide transports: the real serial
//!   bridge and an in-memory emulator.
//! - This binary parses the command line, opens the device, wires files and
//!   progress bars into the core and turns the reports into an exit status.

mod cli;
mod commands;
mod devices;

use at28c_core::image::ProgramConfig;
use at28c_core::tester::TestConfig;
use clap::Parser;
use cli::{Cli, Commands};
use commands::program::ProgramOptions;
use commands::test::TestOptions;
use std::time::Duration;

/// Treat a size of 0 as "not given"
fn optional_size(size: u32) -> Option<usize> {
    (size > 0).then_some(size as usize)
}

/// Log level selected by the number of `-v` flags
fn log_level(verbose: u8) -> log::LevelFilter {
    match verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are not errors
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    // Initialize logger; RUST_LOG still overrides the -v level
    env_logger::Builder::new()
        .filter_level(log_level(cli.verbose))
        .parse_default_env()
        .init();

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Program {
            device,
            input,
            output,
            address,
            size,
            sdp_enable,
            sdp_disable,
        } => {
            let options = ProgramOptions {
                input,
                output,
                config: ProgramConfig {
                    address,
                    size: optional_size(size),
                    sdp_enable,
                    sdp_disable,
                },
            };
            commands::program::run(&device, &options)
        }
        Commands::Test {
            device,
            reference,
            address,
            size,
            mask,
            hold,
        } => {
            let config = TestConfig::new(address, optional_size(size), mask)?
                .with_retention_hold(Duration::from_secs(hold));
            let options = TestOptions { reference, config };
            commands::test::run(&device, &options)
        }
        Commands::ListDevices => {
            commands::list_devices();
            Ok(())
        }
    }
}
