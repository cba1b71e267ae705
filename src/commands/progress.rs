//! Progress reporting with indicatif progress bars

use at28c_core::progress::Progress;
use at28c_core::sweep::{Mismatch, Phase, SweepResult};
use at28c_core::AddressRange;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter using indicatif progress bars
///
/// Each sweep gets its own bar. Mismatches are printed above the bars so
/// they stay on screen after the bar is gone.
pub struct IndicatifProgress {
    multi: MultiProgress,
    current_bar: Option<ProgressBar>,
    start: u16,
}

impl IndicatifProgress {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            current_bar: None,
            start: 0,
        }
    }

    fn create_bar(&mut self, total: u64, phase: Phase) {
        let pb = self.multi.add(ProgressBar::new(total));
        pb.set_style(
            ProgressStyle::default_bar()
                .template(&format!(
                    "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}}) {}",
                    phase
                ))
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        self.current_bar = Some(pb);
    }

    fn create_spinner(&mut self, message: String) {
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(100));
        self.current_bar = Some(pb);
    }

    fn finish(&mut self, message: String) {
        if let Some(pb) = self.current_bar.take() {
            pb.finish_with_message(message);
        }
    }

    // Hidden bars (no terminal) swallow println, so fall back to stdout
    fn println(&self, line: String) {
        if self.multi.is_hidden() || self.multi.println(&line).is_err() {
            println!("{}", line);
        }
    }
}

impl Default for IndicatifProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress for IndicatifProgress {
    fn begin(&mut self, phase: Phase, range: &AddressRange) {
        self.finish(String::new());
        self.println(format!("Starting {} from {}", phase, range));
        self.start = range.start();
        self.create_bar(range.len() as u64, phase);
    }

    fn checkpoint(&mut self, address: u16) {
        if let Some(pb) = &self.current_bar {
            pb.set_position(u64::from(address - self.start));
        }
    }

    fn mismatch(&mut self, mismatch: &Mismatch) {
        self.println(format!("- {}", mismatch));
    }

    fn end(&mut self, phase: Phase, result: &SweepResult) {
        if let Some(pb) = &self.current_bar {
            pb.set_position(result.range.len() as u64);
        }
        let status = if result.ok() { "passed" } else { "FAILED" };
        self.finish(format!("{} {}", phase, status));
    }

    fn waiting(&mut self, duration: Duration) {
        self.finish(String::new());
        self.create_spinner(format!(
            "Waiting {} seconds before reading back...",
            duration.as_secs()
        ));
    }
}
