//! Address ranges within the 32 KiB device

use core::fmt;
use core::ops::Range;

use crate::error::{Error, Result};
use crate::protocol::ROM_SIZE;

/// Half-open address range `[start, end)`, with `end <= ROM_SIZE`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRange {
    start: u16,
    end: u16,
}

impl AddressRange {
    /// Range of `size` bytes from `start`, clipped at the end of the device
    pub fn with_size(start: u32, size: usize) -> Result<Self> {
        let start = Self::check_start(start)?;
        let end = core::cmp::min((start as usize).saturating_add(size), ROM_SIZE);
        Ok(Self {
            start,
            end: end as u16,
        })
    }

    /// Range from `start` to the end of the device
    pub fn to_end(start: u32) -> Result<Self> {
        Self::with_size(start, ROM_SIZE)
    }

    /// Range from `start` with an optional size, where `None` or 0 means
    /// "up to the end of the device"
    pub fn with_optional_size(start: u32, size: Option<usize>) -> Result<Self> {
        match size {
            Some(size) if size > 0 => Self::with_size(start, size),
            _ => Self::to_end(start),
        }
    }

    /// The whole device
    pub fn full() -> Self {
        Self {
            start: 0,
            end: ROM_SIZE as u16,
        }
    }

    fn check_start(start: u32) -> Result<u16> {
        if start as usize >= ROM_SIZE {
            return Err(Error::AddressOutOfBounds { address: start });
        }
        Ok(start as u16)
    }

    /// First address
    pub fn start(&self) -> u16 {
        self.start
    }

    /// One past the last address
    pub fn end(&self) -> u16 {
        self.end
    }

    /// Last address, if the range is not empty
    pub fn last(&self) -> Option<u16> {
        if self.is_empty() {
            None
        } else {
            Some(self.end - 1)
        }
    }

    /// Number of addresses
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    /// Whether the range holds no address
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `address` lies in the range
    pub fn contains(&self, address: u16) -> bool {
        address >= self.start && address < self.end
    }

    /// Iterate over the addresses
    pub fn addresses(&self) -> Range<u16> {
        self.start..self.end
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.last() {
            Some(last) => write!(f, "{} to {}", self.start, last),
            None => write!(f, "{} (empty)", self.start),
        }
    }
}
