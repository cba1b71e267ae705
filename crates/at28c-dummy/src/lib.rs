//! at28c-dummy - In-memory bridge emulator for testing
//!
//! This crate emulates the programmer bridge together with an AT28C256 in
//! memory. It parses the byte stream the same way the bridge firmware does,
//! so partial frames, SDP and unknown opcodes behave like the real thing.
//! It's useful for testing and development without real hardware.

use std::collections::VecDeque;
use std::time::Duration;

use at28c_core::error::Result;
use at28c_core::protocol::*;
use at28c_core::transport::Transport;

/// Configuration for the dummy device
#[derive(Debug, Clone, Default)]
pub struct DummyConfig {
    /// Data lines that always read as 0
    pub stuck_low: u8,
    /// Data lines that always read as 1
    pub stuck_high: u8,
    /// Stop answering after this many responses (simulates a dropped link)
    pub respond_limit: Option<usize>,
    /// Start with software data protection enabled
    pub sdp_enabled: bool,
}

/// Command parser state, mirroring the bridge firmware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Opcode,
    AddressHigh { opcode: u8 },
    AddressLow { opcode: u8, hi: u8 },
    Data { address: u16 },
    /// An unknown opcode got its address bytes; the firmware never leaves
    /// this state
    Jammed,
}

/// Dummy bridge + EEPROM
///
/// Emulates the chip in memory for testing purposes.
pub struct DummyEeprom {
    config: DummyConfig,
    data: Vec<u8>,
    state: State,
    sdp_enabled: bool,
    responses: VecDeque<u8>,
    sent: usize,
}

impl DummyEeprom {
    /// Create a new dummy device with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        let sdp_enabled = config.sdp_enabled;
        Self {
            config,
            data: vec![0xFF; ROM_SIZE],
            state: State::Opcode,
            sdp_enabled,
            responses: VecDeque::new(),
            sent: 0,
        }
    }

    /// Create a new dummy device with default configuration
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Create a dummy device with pre-filled data
    pub fn with_data(config: DummyConfig, initial_data: &[u8]) -> Self {
        let mut device = Self::new(config);
        let len = std::cmp::min(initial_data.len(), device.data.len());
        device.data[..len].copy_from_slice(&initial_data[..len]);
        device
    }

    /// Get a reference to the memory contents
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get a mutable reference to the memory contents
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// Whether software data protection is active
    pub fn sdp_enabled(&self) -> bool {
        self.sdp_enabled
    }

    /// Whether the command parser is stuck after an unknown opcode
    pub fn is_jammed(&self) -> bool {
        self.state == State::Jammed
    }

    fn read_cell(&self, address: u16) -> u8 {
        (self.data[address as usize] & !self.config.stuck_low) | self.config.stuck_high
    }

    fn write_cell(&mut self, address: u16, byte: u8) {
        // Protected writes are dropped by the chip
        if self.sdp_enabled {
            log::debug!("dummy: write to 0x{:04X} ignored, SDP enabled", address);
            return;
        }
        self.data[address as usize] = byte;
    }

    fn respond(&mut self, byte: u8) {
        if let Some(limit) = self.config.respond_limit {
            if self.sent >= limit {
                log::debug!("dummy: link dropped, not answering");
                return;
            }
        }
        self.sent += 1;
        self.responses.push_back(byte);
    }

    fn feed(&mut self, byte: u8) {
        self.state = match self.state {
            State::Opcode => match byte {
                CMD_SDP_ENABLE => {
                    self.sdp_enabled = true;
                    self.respond(SDP_ENABLED_RESPONSE);
                    State::Opcode
                }
                CMD_SDP_DISABLE => {
                    self.sdp_enabled = false;
                    self.respond(SDP_DISABLED_RESPONSE);
                    State::Opcode
                }
                opcode => State::AddressHigh { opcode },
            },
            State::AddressHigh { opcode } => State::AddressLow { opcode, hi: byte },
            State::AddressLow { opcode, hi } => {
                let address = decode_address(hi, byte);
                match opcode {
                    CMD_READ => {
                        let value = self.read_cell(address);
                        self.respond(value);
                        State::Opcode
                    }
                    CMD_WRITE => State::Data { address },
                    other => {
                        log::warn!("dummy: unknown opcode 0x{:02X}, parser jammed", other);
                        State::Jammed
                    }
                }
            }
            State::Data { address } => {
                self.write_cell(address, byte);
                let echo = self.read_cell(address);
                self.respond(echo);
                State::Opcode
            }
            State::Jammed => State::Jammed,
        };
    }
}

impl Transport for DummyEeprom {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        for &byte in data {
            self.feed(byte);
        }
        Ok(())
    }

    fn read_timeout(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize> {
        let mut n = 0;
        while n < buf.len() {
            match self.responses.pop_front() {
                Some(byte) => {
                    buf[n] = byte;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use at28c_core::image::{self, ProgramConfig, Transfer};
    use at28c_core::progress::NoProgress;
    use at28c_core::tester::{NoDelay, Retention, TestConfig, Tester};
    use at28c_core::{AddressRange, Error, Link};
    use rand::rngs::mock::StepRng;

    fn tester(config: TestConfig) -> Tester<StepRng, NoDelay> {
        Tester::new(
            config.with_retention_hold(Duration::ZERO),
            StepRng::new(7, 0x0101_0101),
            NoDelay,
        )
    }

    #[test]
    fn test_read_write() {
        let mut link = Link::new(DummyEeprom::new_default());

        let ack = link.write_byte(0x1000, 0x12).unwrap();
        assert!(ack.ok());
        assert_eq!(link.read_byte(0x1000).unwrap(), 0x12);
        assert_eq!(link.read_byte(0x1001).unwrap(), 0xFF);
    }

    #[test]
    fn test_frames_split_across_writes() {
        let mut device = DummyEeprom::new_default();
        for byte in encode_write(0x0203, 0x42) {
            device.write(&[byte]).unwrap();
        }
        let mut buf = [0u8; 4];
        assert_eq!(device.read_timeout(&mut buf, READ_TIMEOUT).unwrap(), 1);
        assert_eq!(buf[0], 0x42);
        assert_eq!(device.data()[0x0203], 0x42);
    }

    #[test]
    fn test_sdp() {
        let mut link = Link::new(DummyEeprom::new_default());

        assert_eq!(link.set_sdp(true).unwrap(), b'E');
        assert!(link.transport().sdp_enabled());

        // Protected: the write is dropped and the echo shows the old byte
        let ack = link.write_byte(10, 0x00).unwrap();
        assert!(!ack.ok());
        assert_eq!(ack.echoed, 0xFF);

        assert_eq!(link.set_sdp(false).unwrap(), b'D');
        assert!(link.write_byte(10, 0x00).unwrap().ok());
    }

    #[test]
    fn test_unknown_opcode_jams() {
        let mut link = Link::new(DummyEeprom::new_default());

        let err = link.send_and_await_byte(&[b'x', 0, 0]).unwrap_err();
        assert_eq!(err, Error::NoResponse { opcode: b'x' });
        assert!(link.transport().is_jammed());
        assert!(link.read_byte(0).is_err());
    }

    #[test]
    fn test_upload_download_roundtrip() {
        let mut link = Link::new(DummyEeprom::new_default());
        let image: Vec<u8> = (0..2048u32).map(|i| (i * 31) as u8).collect();

        let result = image::upload(&mut link, &image, 4096, None, &mut NoProgress).unwrap();
        assert!(result.ok());

        let mut data = Vec::new();
        image::download(&mut link, 4096, Some(2048), &mut data, &mut NoProgress).unwrap();
        assert_eq!(data, image);
    }

    #[test]
    fn test_program_with_sdp() {
        let mut link = Link::new(DummyEeprom::new(DummyConfig {
            sdp_enabled: true,
            ..Default::default()
        }));
        let config = ProgramConfig {
            address: 100,
            size: None,
            sdp_enable: true,
            sdp_disable: true,
        };
        let image = [0xDE, 0xAD, 0xBE, 0xEF];

        let report =
            image::program(&mut link, &config, Transfer::Upload(&image), &mut NoProgress).unwrap();

        assert!(report.ok());
        assert_eq!(report.sdp_disabled, Some(b'D'));
        assert_eq!(report.sdp_enabled, Some(b'E'));
        let device = link.transport();
        assert!(device.sdp_enabled());
        assert_eq!(&device.data()[100..104], &image);
        assert_eq!(device.data()[99], 0xFF);
        assert_eq!(device.data()[104], 0xFF);
    }

    #[test]
    fn test_upload_to_protected_chip_fails() {
        let mut link = Link::new(DummyEeprom::new(DummyConfig {
            sdp_enabled: true,
            ..Default::default()
        }));

        let result = image::upload(&mut link, &[1, 2, 3], 0, None, &mut NoProgress).unwrap();

        assert!(!result.ok());
        assert_eq!(result.failing_addresses(), [0, 1, 2]);
    }

    #[test]
    fn test_full_test_run_on_good_chip() {
        let mut link = Link::new(DummyEeprom::new_default());
        let config = TestConfig::new(0, Some(2048), 0xFF).unwrap();

        let report = tester(config).run(&mut link, None, &mut NoProgress).unwrap();

        assert!(report.ok());
        assert_eq!(report.phases.len(), 5);
        assert!(matches!(report.retention, Retention::Ran(_)));
    }

    #[test]
    fn test_stuck_data_line() {
        let mut link = Link::new(DummyEeprom::new(DummyConfig {
            stuck_high: 0x10,
            ..Default::default()
        }));
        let config = TestConfig::new(0, Some(256), 0xFF).unwrap();

        let report = tester(config).run(&mut link, None, &mut NoProgress).unwrap();

        assert!(!report.ok());
        assert_eq!(report.retention, Retention::Skipped);
    }

    #[test]
    fn test_mask_hides_stuck_line() {
        let mut link = Link::new(DummyEeprom::new(DummyConfig {
            stuck_high: 0xF0,
            ..Default::default()
        }));
        let config = TestConfig::new(0, Some(256), 0x0F).unwrap();

        let report = tester(config).run(&mut link, None, &mut NoProgress).unwrap();

        assert!(report.ok());
    }

    #[test]
    fn test_reference_mode() {
        let contents: Vec<u8> = (0..ROM_SIZE).map(|i| (i % 251) as u8).collect();
        let mut link = Link::new(DummyEeprom::with_data(DummyConfig::default(), &contents));
        let config = TestConfig::new(1000, Some(1000), 0xFF).unwrap();

        let report = tester(config)
            .run(&mut link, Some(contents.as_slice()), &mut NoProgress)
            .unwrap();

        assert!(report.ok());
        assert_eq!(report.retention, Retention::NotApplicable);
        assert_eq!(link.transport().data(), contents.as_slice());
    }

    #[test]
    fn test_reference_finds_corrupted_cell() {
        let mut link = Link::new(DummyEeprom::new_default());
        let reference = link.transport().data().to_vec();
        link.transport_mut().data_mut()[500] = 0x00;
        let config = TestConfig::new(0, Some(1024), 0xFF).unwrap();

        let report = tester(config)
            .run(&mut link, Some(reference.as_slice()), &mut NoProgress)
            .unwrap();

        assert!(!report.ok());
        assert_eq!(report.phases[0].result.failing_addresses(), [500]);
    }

    #[test]
    fn test_config_kept() {
        let device = DummyEeprom::new(DummyConfig {
            stuck_low: 0x80,
            respond_limit: Some(3),
            ..Default::default()
        });
        assert_eq!(device.config().stuck_low, 0x80);
        assert_eq!(device.config().respond_limit, Some(3));
        assert!(!device.sdp_enabled());
    }

    #[test]
    fn test_dropped_link_aborts() {
        let mut link = Link::new(DummyEeprom::new(DummyConfig {
            respond_limit: Some(100),
            ..Default::default()
        }));
        let config = TestConfig {
            range: AddressRange::full(),
            ..TestConfig::default()
        };

        let err = tester(config)
            .run(&mut link, None, &mut NoProgress)
            .unwrap_err();

        assert!(matches!(err, Error::NoResponse { .. }));
    }
}
