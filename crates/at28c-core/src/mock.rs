//! Scripted transport for unit tests

use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::Cell;
use core::time::Duration;

use crate::error::Result;
use crate::progress::Progress;
use crate::protocol::*;
use crate::range::AddressRange;
use crate::sweep::{Mismatch, Phase, SweepResult};
use crate::transport::Transport;

/// Frame-level device model with fault knobs
pub struct MockTransport {
    pub memory: Vec<u8>,
    /// Every byte written by the host
    pub sent: Vec<u8>,
    /// Addresses of write frames, in order
    pub writes: Vec<u16>,
    /// Addresses of read frames, in order
    pub reads: Vec<u16>,
    /// Data lines that always read as 0
    pub stuck_low: u8,
    /// Data lines that always read as 1
    pub stuck_high: u8,
    /// Stop answering after this many responses
    pub respond_limit: Option<usize>,
    /// Bits that read as 0 once the flag has been raised
    pub leak: Option<(Rc<Cell<bool>>, u8)>,
    responses: usize,
    pending: Option<u8>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            memory: vec![0xFF; ROM_SIZE],
            sent: Vec::new(),
            writes: Vec::new(),
            reads: Vec::new(),
            stuck_low: 0,
            stuck_high: 0,
            respond_limit: None,
            leak: None,
            responses: 0,
            pending: None,
        }
    }

    fn observe(&self, address: u16) -> u8 {
        let mut value = (self.memory[address as usize] & !self.stuck_low) | self.stuck_high;
        if let Some((flag, mask)) = &self.leak {
            if flag.get() {
                value &= !mask;
            }
        }
        value
    }

    fn respond(&mut self, byte: u8) {
        if let Some(limit) = self.respond_limit {
            if self.responses >= limit {
                return;
            }
        }
        self.responses += 1;
        self.pending = Some(byte);
    }
}

impl Transport for MockTransport {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.sent.extend_from_slice(data);
        match data {
            [CMD_WRITE, hi, lo, value] => {
                let address = decode_address(*hi, *lo);
                self.writes.push(address);
                self.memory[address as usize] = *value;
                let echo = self.observe(address);
                self.respond(echo);
            }
            [CMD_READ, hi, lo] => {
                let address = decode_address(*hi, *lo);
                self.reads.push(address);
                let value = self.observe(address);
                self.respond(value);
            }
            [CMD_SDP_ENABLE] => self.respond(SDP_ENABLED_RESPONSE),
            [CMD_SDP_DISABLE] => self.respond(SDP_DISABLED_RESPONSE),
            [] => {}
            _ => panic!("unexpected frame {:02X?}", data),
        }
        Ok(())
    }

    fn read_timeout(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize> {
        match self.pending.take() {
            Some(byte) if !buf.is_empty() => {
                buf[0] = byte;
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}

/// Progress reporter that remembers what it was told
#[derive(Default)]
pub struct RecordingProgress {
    pub begun: Vec<(Phase, AddressRange)>,
    pub checkpoints: Vec<u16>,
    pub mismatches: Vec<Mismatch>,
    pub ended: Vec<(Phase, bool)>,
    pub waits: Vec<Duration>,
}

impl Progress for RecordingProgress {
    fn begin(&mut self, phase: Phase, range: &AddressRange) {
        self.begun.push((phase, *range));
    }

    fn checkpoint(&mut self, address: u16) {
        self.checkpoints.push(address);
    }

    fn mismatch(&mut self, mismatch: &Mismatch) {
        self.mismatches.push(*mismatch);
    }

    fn end(&mut self, phase: Phase, result: &SweepResult) {
        self.ended.push((phase, result.ok()));
    }

    fn waiting(&mut self, duration: Duration) {
        self.waits.push(duration);
    }
}
