//! Per-tile progress display for a single outpainting run

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::LazyLock;

static PROGRESS_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("{msg} [{bar:30.cyan/blue}] {pos}/{len} [{elapsed_precise}]")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// Tracks processed tiles against the planned total
///
/// Skipped tiles advance the bar too, since the plan length is fixed
/// before the run starts.
pub struct TileProgress {
    bar: ProgressBar,
}

impl TileProgress {
    /// Create a visible progress bar
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(PROGRESS_STYLE.clone());
        bar.set_message("Outpainting tile");
        Self { bar }
    }

    /// Create a progress tracker that draws nothing
    pub fn hidden(total: usize) -> Self {
        let bar = ProgressBar::hidden();
        bar.set_length(total as u64);
        Self { bar }
    }

    /// Mark one more tile as processed
    pub fn tick(&self) {
        self.bar.inc(1);
    }

    /// Tiles processed so far
    pub fn position(&self) -> usize {
        usize::try_from(self.bar.position()).unwrap_or(usize::MAX)
    }

    /// Tiles in the plan
    pub fn total(&self) -> usize {
        self.bar
            .length()
            .and_then(|len| usize::try_from(len).ok())
            .unwrap_or(0)
    }

    /// Resize to a new plan length and reset the position
    pub fn reset(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
    }

    /// Close the bar, keeping the final state on screen
    pub fn finish(&self) {
        self.bar.finish_with_message("Outpainting done");
    }

    /// Close the bar and remove it from the screen
    pub fn abandon(&self) {
        self.bar.abandon_with_message("Outpainting stopped");
    }
}
