//! Terminal progress indicator for the delivery phase.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    /// Start a ticking spinner with the given message. Draws to stderr, so
    /// command output stays clean.
    pub fn start(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.blue} {wide_msg}")
                .unwrap(),
        );
        bar.enable_steady_tick(Duration::from_millis(80));
        bar.set_message(message.to_string());
        Self { bar }
    }

    /// Stop the spinner, replacing it with a final line.
    pub fn stop(self, message: &str) {
        self.bar
            .set_style(ProgressStyle::default_spinner().template("{wide_msg}").unwrap());
        self.bar.finish_with_message(message.to_string());
    }
}
