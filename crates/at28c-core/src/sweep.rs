//! Per-sweep verification results
//!
//! Every pass over an address range returns a [`SweepResult`]. Mismatches
//! are soft failures: they are collected here and never abort the sweep.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use core::fmt;

use crate::range::AddressRange;

/// Addresses between progress checkpoints
pub const PROGRESS_INTERVAL: u16 = 1024;

/// Whether `address` is a progress checkpoint
#[inline]
pub fn is_checkpoint(address: u16) -> bool {
    address % PROGRESS_INTERVAL == 0
}

/// Named sweep, used for progress reporting and summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Image upload
    Upload,
    /// Image download
    Download,
    /// Comparison against a reference image
    Reference,
    /// Write/read-back of a fixed byte
    Pattern(u8),
    /// Write/read-back of random bytes
    RandomPattern,
    /// Retention test, write pass
    RetentionWrite,
    /// Retention test, read pass after the hold
    RetentionRead,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upload => write!(f, "upload"),
            Self::Download => write!(f, "download"),
            Self::Reference => write!(f, "reference check"),
            Self::Pattern(pattern) => write!(f, "pattern {:#010b}", pattern),
            Self::RandomPattern => write!(f, "random pattern"),
            Self::RetentionWrite => write!(f, "retention write"),
            Self::RetentionRead => write!(f, "retention read"),
        }
    }
}

/// Where a mismatch was observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchKind {
    /// The byte echoed after a write differs from the written byte
    WriteAck,
    /// A read returned a different byte than expected
    ReadBack,
}

/// A single failing address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    /// Device address
    pub address: u16,
    /// Expected value (masked when compared under a mask)
    pub expected: u8,
    /// Observed value (masked when compared under a mask)
    pub observed: u8,
    /// Which check failed
    pub kind: MismatchKind,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            MismatchKind::WriteAck => "Write error",
            MismatchKind::ReadBack => "Error",
        };
        write!(
            f,
            "{} at {}: {:#010b} != {:#010b}",
            what, self.address, self.observed, self.expected
        )
    }
}

/// Result of one sweep over an address range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepResult {
    /// Range that was swept
    pub range: AddressRange,
    /// Failing addresses, in sweep order
    pub mismatches: Vec<Mismatch>,
}

impl SweepResult {
    /// Empty (passing) result for `range`
    pub fn new(range: AddressRange) -> Self {
        Self {
            range,
            mismatches: Vec::new(),
        }
    }

    /// Whether no mismatch was recorded
    pub fn ok(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// Record a mismatch
    pub fn push(&mut self, mismatch: Mismatch) {
        self.mismatches.push(mismatch);
    }

    /// Number of mismatches of the given kind
    pub fn count(&self, kind: MismatchKind) -> usize {
        self.mismatches.iter().filter(|m| m.kind == kind).count()
    }

    /// Distinct failing addresses, in order of first failure
    pub fn failing_addresses(&self) -> Vec<u16> {
        let mut seen = BTreeSet::new();
        self.mismatches
            .iter()
            .map(|m| m.address)
            .filter(|address| seen.insert(*address))
            .collect()
    }
}
