//! Program command implementation

use super::{read_file, CommandError, IndicatifProgress, WriteSink};
use crate::devices;
use at28c_core::image::{self, ProgramConfig, ProgramReport, Transfer};
use at28c_core::progress::Progress;
use at28c_core::{Link, Transport};
use std::fs::File;
use std::path::PathBuf;

/// Options of the program command
#[derive(Debug, Clone, Default)]
pub struct ProgramOptions {
    /// Image to upload
    pub input: Option<PathBuf>,
    /// Destination of a download
    pub output: Option<PathBuf>,
    /// Address range and SDP handling
    pub config: ProgramConfig,
}

impl ProgramOptions {
    /// Reject invocations that would not do anything
    pub fn validate(&self) -> Result<(), CommandError> {
        let has_file = self.input.is_some() || self.output.is_some();
        let has_sdp = self.config.sdp_enable || self.config.sdp_disable;
        if !has_file && !has_sdp {
            return Err(CommandError::NothingToDo);
        }
        Ok(())
    }
}

/// Run the program command
pub fn run(device: &str, options: &ProgramOptions) -> Result<(), Box<dyn std::error::Error>> {
    options.validate()?;
    let mut link = devices::open_device(device)?;
    let mut progress = IndicatifProgress::new();
    program_device(&mut link, options, &mut progress)
}

/// Upload or download an image and toggle SDP on an opened link
pub fn program_device<T: Transport>(
    link: &mut Link<T>,
    options: &ProgramOptions,
    progress: &mut dyn Progress,
) -> Result<(), Box<dyn std::error::Error>> {
    options.validate()?;
    let config = &options.config;

    let report = if let Some(input) = &options.input {
        let data = read_file(input)?;
        println!("Read {} bytes from {:?}", data.len(), input);
        image::program(link, config, Transfer::Upload(&data), progress)?
    } else if let Some(output) = &options.output {
        // Fail on a bad range before creating the file
        let range = image::download_range(config.address, config.size)?;
        let mut sink = WriteSink::new(File::create(output)?);
        let report = image::program(link, config, Transfer::Download(&mut sink), progress)?;
        sink.finish()?;
        println!("Saved {} bytes from {} to {:?}", range.len(), range, output);
        report
    } else {
        image::program(link, config, Transfer::None, progress)?
    };

    print_report(&report);

    match &report.transfer {
        Some(result) if !result.ok() => Err(CommandError::VerificationFailed {
            operation: "upload",
            mismatches: result.mismatches.len(),
        }
        .into()),
        _ => Ok(()),
    }
}

fn print_report(report: &ProgramReport) {
    if let Some(response) = report.sdp_disabled {
        println!("SDP disabled (response {:?})", char::from(response));
    }
    if let Some(result) = &report.transfer {
        if result.ok() {
            println!("Transfer of {} complete", result.range);
        } else {
            println!(
                "Transfer of {} failed at {} address(es)",
                result.range,
                result.failing_addresses().len()
            );
        }
    }
    if let Some(response) = report.sdp_enabled {
        println!("SDP enabled (response {:?})", char::from(response));
    }
}
