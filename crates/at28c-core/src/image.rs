//! Image programmer
//!
//! Copies bytes between a host-side image and the device address space one
//! address at a time. Uploads check the echo of every write but never stop
//! on a mismatch, so the caller gets the complete list of failing addresses.
//! Only transport failures abort a transfer.

use alloc::vec::Vec;

use crate::error::{Error, Result};
use crate::link::Link;
use crate::progress::Progress;
use crate::range::AddressRange;
use crate::sweep::{is_checkpoint, Mismatch, MismatchKind, Phase, SweepResult};
use crate::transport::Transport;

/// Destination for downloaded bytes
pub trait ImageSink {
    /// Append one byte
    fn put(&mut self, byte: u8) -> Result<()>;
}

impl ImageSink for Vec<u8> {
    fn put(&mut self, byte: u8) -> Result<()> {
        self.push(byte);
        Ok(())
    }
}

/// Resolve the range of an upload
///
/// Without an explicit size (or with size 0) the whole image is uploaded.
/// An explicit size must not ask for more bytes than the image holds.
pub fn upload_range(image_len: usize, address: u32, size: Option<usize>) -> Result<AddressRange> {
    match size {
        Some(size) if size > 0 => {
            let range = AddressRange::with_size(address, size)?;
            if range.len() > image_len {
                return Err(Error::ImageTooShort {
                    needed: range.len(),
                    available: image_len,
                });
            }
            Ok(range)
        }
        _ => AddressRange::with_size(address, image_len),
    }
}

/// Resolve the range of a download
///
/// Without an explicit size (or with size 0) the download runs to the end of
/// the device.
pub fn download_range(address: u32, size: Option<usize>) -> Result<AddressRange> {
    AddressRange::with_optional_size(address, size)
}

/// Upload `image` to the device
///
/// Byte `i` of the image goes to address `address + i`.
pub fn upload<T: Transport>(
    link: &mut Link<T>,
    image: &[u8],
    address: u32,
    size: Option<usize>,
    progress: &mut dyn Progress,
) -> Result<SweepResult> {
    let range = upload_range(image.len(), address, size)?;
    upload_in_range(link, image, range, progress)
}

fn upload_in_range<T: Transport>(
    link: &mut Link<T>,
    image: &[u8],
    range: AddressRange,
    progress: &mut dyn Progress,
) -> Result<SweepResult> {
    log::debug!("Uploading {} bytes to {}", range.len(), range);

    let mut result = SweepResult::new(range);
    progress.begin(Phase::Upload, &range);

    for (data, address) in image.iter().zip(range.addresses()) {
        if is_checkpoint(address) {
            progress.checkpoint(address);
        }

        let ack = link.write_byte(address, *data)?;
        if !ack.ok() {
            let mismatch = Mismatch {
                address,
                expected: ack.expected,
                observed: ack.echoed,
                kind: MismatchKind::WriteAck,
            };
            log::warn!("{}", mismatch);
            progress.mismatch(&mismatch);
            result.push(mismatch);
        }
    }

    progress.end(Phase::Upload, &result);
    Ok(result)
}

/// Download device contents into `sink`
///
/// Nothing is compared; the returned result is always passing unless the
/// transfer fails.
pub fn download<T: Transport, S: ImageSink + ?Sized>(
    link: &mut Link<T>,
    address: u32,
    size: Option<usize>,
    sink: &mut S,
    progress: &mut dyn Progress,
) -> Result<SweepResult> {
    let range = download_range(address, size)?;
    download_in_range(link, range, sink, progress)
}

fn download_in_range<T: Transport, S: ImageSink + ?Sized>(
    link: &mut Link<T>,
    range: AddressRange,
    sink: &mut S,
    progress: &mut dyn Progress,
) -> Result<SweepResult> {
    log::debug!("Downloading {}", range);

    let result = SweepResult::new(range);
    progress.begin(Phase::Download, &range);

    for address in range.addresses() {
        if is_checkpoint(address) {
            progress.checkpoint(address);
        }
        let byte = link.read_byte(address)?;
        sink.put(byte)?;
    }

    progress.end(Phase::Download, &result);
    Ok(result)
}

/// Enable or disable software data protection
///
/// Returns the raw response byte. It is reported, not validated.
pub fn set_sdp<T: Transport>(link: &mut Link<T>, enable: bool) -> Result<u8> {
    let response = link.set_sdp(enable)?;
    log::info!(
        "{} SDP: response 0x{:02X} ({:?})",
        if enable { "Enabled" } else { "Disabled" },
        response,
        char::from(response)
    );
    Ok(response)
}

/// What to transfer in a programming run
pub enum Transfer<'a> {
    /// Write an image to the device
    Upload(&'a [u8]),
    /// Read the device into a sink
    Download(&'a mut dyn ImageSink),
    /// Only toggle SDP
    None,
}

/// Options of a programming run
#[derive(Debug, Clone, Default)]
pub struct ProgramConfig {
    /// Start address
    pub address: u32,
    /// Transfer size; `None` or 0 selects the default for the direction
    pub size: Option<usize>,
    /// Enable SDP after the transfer
    pub sdp_enable: bool,
    /// Disable SDP before the transfer
    pub sdp_disable: bool,
}

/// Outcome of a programming run
#[derive(Debug, Clone, Default)]
pub struct ProgramReport {
    /// Response to the SDP disable command, if sent
    pub sdp_disabled: Option<u8>,
    /// Result of the upload or download, if any
    pub transfer: Option<SweepResult>,
    /// Response to the SDP enable command, if sent
    pub sdp_enabled: Option<u8>,
}

impl ProgramReport {
    /// Whether the transfer (if any) verified
    pub fn ok(&self) -> bool {
        self.transfer.as_ref().map_or(true, SweepResult::ok)
    }
}

/// Run a complete programming session
///
/// Order: SDP disable, then the transfer, then SDP enable. The transfer range
/// is resolved before anything is sent, so a bad range or a short image
/// fails without touching the device.
pub fn program<T: Transport>(
    link: &mut Link<T>,
    config: &ProgramConfig,
    transfer: Transfer<'_>,
    progress: &mut dyn Progress,
) -> Result<ProgramReport> {
    let range = match &transfer {
        Transfer::Upload(image) => Some(upload_range(image.len(), config.address, config.size)?),
        Transfer::Download(_) => Some(download_range(config.address, config.size)?),
        Transfer::None => None,
    };

    let mut report = ProgramReport::default();

    if config.sdp_disable {
        report.sdp_disabled = Some(set_sdp(link, false)?);
    }

    report.transfer = match (transfer, range) {
        (Transfer::Upload(image), Some(range)) => {
            Some(upload_in_range(link, image, range, progress)?)
        }
        (Transfer::Download(sink), Some(range)) => {
            Some(download_in_range(link, range, sink, progress)?)
        }
        _ => None,
    };

    if config.sdp_enable {
        report.sdp_enabled = Some(set_sdp(link, true)?);
    }

    Ok(report)
}
