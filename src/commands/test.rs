//! Test command implementation

use super::{read_file, CommandError, IndicatifProgress};
use crate::devices;
use at28c_core::progress::Progress;
use at28c_core::tester::{Delay, Retention, StdDelay, TestConfig, TestReport, Tester};
use at28c_core::{Link, SweepResult, Transport};
use rand::RngCore;
use std::path::PathBuf;

/// Options of the test command
#[derive(Debug, Clone)]
pub struct TestOptions {
    /// Full chip dump to compare against instead of running the pattern suite
    pub reference: Option<PathBuf>,
    /// Address range, mask and retention hold
    pub config: TestConfig,
}

/// Run the test command
pub fn run(device: &str, options: &TestOptions) -> Result<(), Box<dyn std::error::Error>> {
    // Load the reference before touching the device
    let reference = match &options.reference {
        Some(path) => {
            let data = read_file(path)?;
            println!("Read {} reference bytes from {:?}", data.len(), path);
            Some(data)
        }
        None => None,
    };

    let mut link = devices::open_device(device)?;
    let mut tester = Tester::new(options.config, rand::thread_rng(), StdDelay);
    let mut progress = IndicatifProgress::new();
    test_device(&mut link, &mut tester, reference.as_deref(), &mut progress)
}

/// Run the test sequence on an opened link and print a summary
pub fn test_device<T: Transport, R: RngCore, D: Delay>(
    link: &mut Link<T>,
    tester: &mut Tester<R, D>,
    reference: Option<&[u8]>,
    progress: &mut dyn Progress,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = *tester.config();
    println!("Testing {} with mask {:#010b}", config.range, config.mask);

    let report = tester.run(link, reference, progress)?;
    print_summary(&report);

    if report.ok() {
        println!("All checks passed");
        return Ok(());
    }

    let mut mismatches: usize = report.phases.iter().map(|p| p.result.mismatches.len()).sum();
    if let Retention::Ran(result) = &report.retention {
        mismatches += result.mismatches.len();
    }
    Err(CommandError::VerificationFailed {
        operation: "test",
        mismatches,
    }
    .into())
}

fn status(result: &SweepResult) -> String {
    if result.ok() {
        "passed".to_string()
    } else {
        format!("FAILED at {} address(es)", result.failing_addresses().len())
    }
}

fn print_summary(report: &TestReport) {
    println!();
    println!("Summary");
    println!("=======");
    for outcome in &report.phases {
        println!("  {:<24} {}", outcome.phase.to_string(), status(&outcome.result));
    }
    match &report.retention {
        Retention::NotApplicable => {}
        Retention::Skipped => println!("  {:<24} skipped (pattern checks failed)", "retention"),
        Retention::Ran(result) => println!("  {:<24} {}", "retention", status(result)),
    }
}

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use at28c_core::progress::NoProgress;
    use at28c_core::tester::NoDelay;
    use at28c_core::Error;
    use at28c_dummy::{DummyConfig, DummyEeprom};
    use rand::rngs::mock::StepRng;
    use std::time::Duration;

    fn tester(address: u32, size: usize, mask: u8) -> Tester<StepRng, NoDelay> {
        let config = TestConfig::new(address, Some(size), mask)
            .unwrap()
            .with_retention_hold(Duration::ZERO);
        Tester::new(config, StepRng::new(3, 0x0102_0304), NoDelay)
    }

    #[test]
    fn test_good_chip_passes() {
        let mut link = Link::new(DummyEeprom::new_default());
        let mut tester = tester(0x100, 512, 0xFF);

        test_device(&mut link, &mut tester, None, &mut NoProgress).unwrap();

        let data = link.transport().data();
        assert!(data[0x100..0x300].iter().all(|&b| b == 0x55));
        assert_eq!(data[0x300], 0xFF);
    }

    #[test]
    fn test_stuck_line_fails() {
        let mut link = Link::new(DummyEeprom::new(DummyConfig {
            stuck_low: 0x01,
            ..Default::default()
        }));
        let mut tester = tester(0, 64, 0xFF);

        let err = test_device(&mut link, &mut tester, None, &mut NoProgress).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<CommandError>(),
            Some(CommandError::VerificationFailed { operation: "test", .. })
        ));
    }

    #[test]
    fn test_mask_excludes_stuck_line() {
        let mut link = Link::new(DummyEeprom::new(DummyConfig {
            stuck_low: 0x01,
            ..Default::default()
        }));
        let mut tester = tester(0, 64, 0xFE);

        test_device(&mut link, &mut tester, None, &mut NoProgress).unwrap();
    }

    #[test]
    fn test_reference_file() {
        let contents: Vec<u8> = (0..32768u32).map(|i| (i * 7) as u8).collect();
        let mut link = Link::new(DummyEeprom::with_data(DummyConfig::default(), &contents));
        let mut tester = tester(0, 0, 0xFF);

        test_device(&mut link, &mut tester, Some(contents.as_slice()), &mut NoProgress).unwrap();

        let mut altered = contents.clone();
        altered[1234] ^= 0x10;
        let err = test_device(&mut link, &mut tester, Some(altered.as_slice()), &mut NoProgress)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CommandError>(),
            Some(CommandError::VerificationFailed { mismatches: 1, .. })
        ));
    }

    #[test]
    fn test_short_reference() {
        let mut link = Link::new(DummyEeprom::new_default());
        let mut tester = tester(0, 0, 0xFF);

        let err = test_device(&mut link, &mut tester, Some(&[0xFF; 100][..]), &mut NoProgress)
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::ReferenceTooShort { available: 100, .. })
        ));
    }
}
