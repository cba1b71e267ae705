//! Progress reporting for sweeps
//!
//! The core never prints. Front ends implement [`Progress`] to draw bars or
//! log lines; [`NoProgress`] discards everything.

use core::time::Duration;

use crate::range::AddressRange;
use crate::sweep::{Mismatch, Phase, SweepResult};

/// Progress reporter trait
pub trait Progress {
    /// Called when a sweep starts
    fn begin(&mut self, phase: Phase, range: &AddressRange);

    /// Called at every checkpoint address (multiples of 1024)
    fn checkpoint(&mut self, address: u16);

    /// Called for every failing address
    fn mismatch(&mut self, mismatch: &Mismatch);

    /// Called when a sweep is complete
    fn end(&mut self, phase: Phase, result: &SweepResult);

    /// Called before an uninterruptible hold
    fn waiting(&mut self, duration: Duration);
}

/// A no-op progress reporter
pub struct NoProgress;

impl Progress for NoProgress {
    fn begin(&mut self, _phase: Phase, _range: &AddressRange) {}
    fn checkpoint(&mut self, _address: u16) {}
    fn mismatch(&mut self, _mismatch: &Mismatch) {}
    fn end(&mut self, _phase: Phase, _result: &SweepResult) {}
    fn waiting(&mut self, _duration: Duration) {}
}
