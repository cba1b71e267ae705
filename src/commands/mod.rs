//! CLI command implementations
//!
//! Each command is split in two: a `run` entry point that validates the
//! options and opens the device, and a function that works on any
//! [`Link`](at28c_core::Link). The latter is what the tests drive against the
//! in-memory emulator.

mod list;
pub mod program;
mod progress;
pub mod test;

pub use list::list_devices;
pub use progress::IndicatifProgress;

use at28c_core::image::ImageSink;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;
use thiserror::Error;

/// Failures detected by the commands themselves
#[derive(Debug, Error)]
pub enum CommandError {
    /// `program` was given neither a file nor an SDP option
    #[error("nothing to do: specify --input, --output, --sdp-enable or --sdp-disable")]
    NothingToDo,

    /// A verification found mismatches
    #[error("{operation} failed with {mismatches} mismatch(es)")]
    VerificationFailed {
        operation: &'static str,
        mismatches: usize,
    },
}

/// Read a whole image file
pub fn read_file(path: &Path) -> io::Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;
    Ok(data)
}

/// [`ImageSink`] writing to any `std::io::Write`
pub struct WriteSink<W: Write> {
    writer: BufWriter<W>,
}

impl<W: Write> WriteSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
        }
    }

    /// Flush buffered bytes and release the writer
    pub fn finish(self) -> io::Result<W> {
        self.writer.into_inner().map_err(|e| e.into_error())
    }
}

impl<W: Write> ImageSink for WriteSink<W> {
    fn put(&mut self, byte: u8) -> at28c_core::Result<()> {
        self.writer.write_all(&[byte]).map_err(|e| {
            log::error!("Failed to write image: {}", e);
            at28c_core::Error::SinkError
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_sink() {
        let mut sink = WriteSink::new(Vec::new());
        for byte in [1, 2, 3] {
            sink.put(byte).unwrap();
        }
        assert_eq!(sink.finish().unwrap(), [1, 2, 3]);
    }

    #[test]
    fn test_error_messages() {
        let err = CommandError::VerificationFailed {
            operation: "upload",
            mismatches: 2,
        };
        assert_eq!(err.to_string(), "upload failed with 2 mismatch(es)");
        assert!(CommandError::NothingToDo.to_string().contains("nothing to do"));
    }
}
