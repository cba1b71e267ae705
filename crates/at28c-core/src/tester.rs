//! Pattern and retention tester
//!
//! A test run sweeps an address range with a sequence of phases:
//!
//! 1. Fixed patterns `0x00`, `0x55`, `0xAA`, `0xFF`: write each address,
//!    read it back, compare.
//! 2. A random pattern: same, with an independent random byte per address.
//! 3. Retention: write `0x55` everywhere, hold for [`RETENTION_HOLD`], read
//!    everything back. Only runs when every pattern phase passed.
//!
//! When a reference image is supplied the run instead compares the device
//! contents against it and writes nothing.
//!
//! All comparisons, including write echoes, only look at the bits selected by
//! the mask. A mismatch is recorded and the sweep goes on; a transport
//! failure ends the whole run.

use alloc::vec::Vec;
use core::time::Duration;

use rand::{Rng, RngCore};

use crate::error::{Error, Result};
use crate::link::Link;
use crate::progress::Progress;
use crate::protocol::masked_eq;
use crate::range::AddressRange;
use crate::sweep::{is_checkpoint, Mismatch, MismatchKind, Phase, SweepResult};
use crate::transport::Transport;

/// Fixed patterns, in test order
pub const FIXED_PATTERNS: [u8; 4] = [0x00, 0x55, 0xAA, 0xFF];
/// Pattern written by the retention phase
pub const RETENTION_PATTERN: u8 = 0x55;
/// Default hold between the retention write and read passes
pub const RETENTION_HOLD: Duration = Duration::from_secs(60);
/// Default comparison mask (all bits)
pub const DEFAULT_MASK: u8 = 0xFF;

/// Blocking wait used for the retention hold
pub trait Delay {
    /// Block for `duration`
    fn delay(&mut self, duration: Duration);
}

/// Delay backed by `std::thread::sleep`
#[cfg(feature = "std")]
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

#[cfg(feature = "std")]
impl Delay for StdDelay {
    fn delay(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Delay that returns immediately
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDelay;

impl Delay for NoDelay {
    fn delay(&mut self, _duration: Duration) {}
}

/// Byte written at each address of a pattern sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// The same byte everywhere
    Fixed(u8),
    /// A fresh random byte per address
    Random,
}

impl Pattern {
    fn phase(self) -> Phase {
        match self {
            Pattern::Fixed(pattern) => Phase::Pattern(pattern),
            Pattern::Random => Phase::RandomPattern,
        }
    }
}

/// Tester options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestConfig {
    /// Addresses under test
    pub range: AddressRange,
    /// Bits that take part in comparisons
    pub mask: u8,
    /// Hold between retention write and read
    pub retention_hold: Duration,
}

impl TestConfig {
    /// Build a config from user options
    ///
    /// A size of `None` or 0 tests up to the end of the device.
    pub fn new(address: u32, size: Option<usize>, mask: u8) -> Result<Self> {
        Ok(Self {
            range: AddressRange::with_optional_size(address, size)?,
            mask,
            retention_hold: RETENTION_HOLD,
        })
    }

    /// Replace the retention hold
    pub fn with_retention_hold(mut self, hold: Duration) -> Self {
        self.retention_hold = hold;
        self
    }
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            range: AddressRange::full(),
            mask: DEFAULT_MASK,
            retention_hold: RETENTION_HOLD,
        }
    }
}

/// Result of one phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseOutcome {
    /// Which phase ran
    pub phase: Phase,
    /// What it found
    pub result: SweepResult,
}

/// What happened to the retention phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Retention {
    /// Reference mode, no retention phase
    NotApplicable,
    /// A pattern phase failed, retention was not attempted
    Skipped,
    /// Retention ran
    Ran(SweepResult),
}

/// Outcome of a complete test run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestReport {
    /// Reference or pattern phases, in execution order
    pub phases: Vec<PhaseOutcome>,
    /// Retention phase
    pub retention: Retention,
}

impl TestReport {
    /// Whether every phase that ran passed and none was skipped
    pub fn ok(&self) -> bool {
        let phases_ok = self.phases.iter().all(|p| p.result.ok());
        let retention_ok = match &self.retention {
            Retention::NotApplicable => true,
            Retention::Skipped => false,
            Retention::Ran(result) => result.ok(),
        };
        phases_ok && retention_ok
    }
}

/// Chip tester
pub struct Tester<R: RngCore, D: Delay> {
    config: TestConfig,
    rng: R,
    delay: D,
}

impl<R: RngCore, D: Delay> Tester<R, D> {
    /// Create a tester with the given random source and hold primitive
    pub fn new(config: TestConfig, rng: R, delay: D) -> Self {
        Self { config, rng, delay }
    }

    /// Get the configuration
    pub fn config(&self) -> &TestConfig {
        &self.config
    }

    /// Run the complete test sequence
    pub fn run<T: Transport>(
        &mut self,
        link: &mut Link<T>,
        reference: Option<&[u8]>,
        progress: &mut dyn Progress,
    ) -> Result<TestReport> {
        if let Some(reference) = reference {
            let result = self.check_reference(link, reference, progress)?;
            return Ok(TestReport {
                phases: alloc::vec![PhaseOutcome {
                    phase: Phase::Reference,
                    result,
                }],
                retention: Retention::NotApplicable,
            });
        }

        let mut phases = Vec::with_capacity(FIXED_PATTERNS.len() + 1);
        let sweeps = FIXED_PATTERNS
            .iter()
            .map(|&p| Pattern::Fixed(p))
            .chain(core::iter::once(Pattern::Random));

        for pattern in sweeps {
            let result = self.check_pattern(link, pattern, progress)?;
            phases.push(PhaseOutcome {
                phase: pattern.phase(),
                result,
            });
        }

        let retention = if phases.iter().all(|p| p.result.ok()) {
            Retention::Ran(self.check_retention(link, progress)?)
        } else {
            log::warn!("Skipping retention check: pattern checks failed");
            Retention::Skipped
        };

        Ok(TestReport { phases, retention })
    }

    /// Compare the device against a reference image
    ///
    /// The reference is indexed by device address, so it must cover the
    /// whole range under test.
    pub fn check_reference<T: Transport>(
        &mut self,
        link: &mut Link<T>,
        reference: &[u8],
        progress: &mut dyn Progress,
    ) -> Result<SweepResult> {
        let range = self.config.range;
        let needed = range.end() as usize;
        if !range.is_empty() && reference.len() < needed {
            return Err(Error::ReferenceTooShort {
                needed,
                available: reference.len(),
            });
        }

        let mask = self.config.mask;
        let mut result = SweepResult::new(range);
        progress.begin(Phase::Reference, &range);

        for address in range.addresses() {
            if is_checkpoint(address) {
                progress.checkpoint(address);
            }
            let observed = link.read_byte(address)?;
            let expected = reference[address as usize];
            if !masked_eq(observed, expected, mask) {
                record(
                    &mut result,
                    progress,
                    address,
                    expected & mask,
                    observed & mask,
                    MismatchKind::ReadBack,
                );
            }
        }

        progress.end(Phase::Reference, &result);
        Ok(result)
    }

    /// Write a pattern to every address and read each byte straight back
    pub fn check_pattern<T: Transport>(
        &mut self,
        link: &mut Link<T>,
        pattern: Pattern,
        progress: &mut dyn Progress,
    ) -> Result<SweepResult> {
        let range = self.config.range;
        let mask = self.config.mask;
        let phase = pattern.phase();
        let mut result = SweepResult::new(range);

        log::debug!("Checking {} over {}", phase, range);
        progress.begin(phase, &range);

        for address in range.addresses() {
            if is_checkpoint(address) {
                progress.checkpoint(address);
            }

            let value = match pattern {
                Pattern::Fixed(p) => p,
                Pattern::Random => self.rng.gen::<u8>(),
            };

            let ack = link.write_byte(address, value)?;
            if !ack.ok_masked(mask) {
                record(
                    &mut result,
                    progress,
                    address,
                    value & mask,
                    ack.echoed & mask,
                    MismatchKind::WriteAck,
                );
            }

            let observed = link.read_byte(address)?;
            if !masked_eq(observed, value, mask) {
                record(
                    &mut result,
                    progress,
                    address,
                    value & mask,
                    observed & mask,
                    MismatchKind::ReadBack,
                );
            }
        }

        progress.end(phase, &result);
        Ok(result)
    }

    /// Write the retention pattern, hold, then read everything back
    pub fn check_retention<T: Transport>(
        &mut self,
        link: &mut Link<T>,
        progress: &mut dyn Progress,
    ) -> Result<SweepResult> {
        let range = self.config.range;
        let mask = self.config.mask;
        let expected = RETENTION_PATTERN & mask;
        let mut result = SweepResult::new(range);

        progress.begin(Phase::RetentionWrite, &range);
        for address in range.addresses() {
            if is_checkpoint(address) {
                progress.checkpoint(address);
            }
            let ack = link.write_byte(address, RETENTION_PATTERN)?;
            if !ack.ok_masked(mask) {
                record(
                    &mut result,
                    progress,
                    address,
                    expected,
                    ack.echoed & mask,
                    MismatchKind::WriteAck,
                );
            }
        }
        progress.end(Phase::RetentionWrite, &result);

        let hold = self.config.retention_hold;
        log::info!("Waiting for {} seconds before reading", hold.as_secs());
        progress.waiting(hold);
        self.delay.delay(hold);

        progress.begin(Phase::RetentionRead, &range);
        for address in range.addresses() {
            if is_checkpoint(address) {
                progress.checkpoint(address);
            }
            let observed = link.read_byte(address)?;
            if !masked_eq(observed, RETENTION_PATTERN, mask) {
                record(
                    &mut result,
                    progress,
                    address,
                    expected,
                    observed & mask,
                    MismatchKind::ReadBack,
                );
            }
        }
        progress.end(Phase::RetentionRead, &result);

        Ok(result)
    }
}

fn record(
    result: &mut SweepResult,
    progress: &mut dyn Progress,
    address: u16,
    expected: u8,
    observed: u8,
    kind: MismatchKind,
) {
    let mismatch = Mismatch {
        address,
        expected,
        observed,
        kind,
    };
    log::warn!("{}", mismatch);
    progress.mismatch(&mismatch);
    result.push(mismatch);
}
