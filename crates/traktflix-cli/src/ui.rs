use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;

/// Countdown shown while waiting for the user to approve the device code.
pub struct Countdown {
    bar: ProgressBar,
    total: u64,
}

impl Countdown {
    pub fn new(total_secs: u64, quiet: bool) -> Self {
        let bar = if quiet || !std::io::stderr().is_terminal() {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(total_secs)
        };
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} Waiting for approval [{bar:30.cyan/blue}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▉▊▋▌▍▎▏  "),
        );

        let countdown = Self { bar, total: total_secs };
        countdown.set_remaining(total_secs);
        countdown
    }

    pub fn set_remaining(&self, remaining: u64) {
        self.bar.set_position(self.total.saturating_sub(remaining));
        self.bar.set_message(format!("{}s left", remaining));
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
