//! Progress reporting for cache population

use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar over the static manifest during install
///
/// Hidden automatically when stderr is not a terminal.
pub struct InstallProgress {
    bar: ProgressBar,
}

impl InstallProgress {
    /// Create a bar sized to the manifest resource count
    pub fn new(total: u64) -> Self {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::with_template("  [{bar:30}] {pos}/{len} {msg}")
                .expect("valid progress template")
                .progress_chars("=> "),
        );
        Self { bar }
    }

    /// Record that a resource is being fetched
    pub fn resource(&self, path: &str) {
        self.bar.set_message(path.to_string());
        self.bar.inc(1);
    }

    /// Finish successfully and clear the bar
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    /// Abandon on failure, leaving the last message visible
    pub fn abandon(&self) {
        self.bar.abandon();
    }
}
