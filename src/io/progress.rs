//! Batch progress display

use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::LazyLock;

static BATCH_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] Masks: [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

/// Progress display for batch mask processing
///
/// A single bar tracks the batch; the message shows the mask currently
/// being analyzed
pub struct ProgressManager {
    bar: Option<ProgressBar>,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressManager {
    /// Create an idle progress manager
    pub const fn new() -> Self {
        Self { bar: None }
    }

    /// Initialize the bar for a batch of the given size
    pub fn initialize(&mut self, mask_count: usize) {
        let bar = ProgressBar::new(mask_count as u64);
        bar.set_style(BATCH_STYLE.clone());
        self.bar = Some(bar);
    }

    /// Show the mask currently being processed
    pub fn start_mask(&self, path: &Path) {
        if let Some(bar) = &self.bar {
            let display_name = path.file_name().map_or_else(
                || path.display().to_string(),
                |name| name.to_string_lossy().into_owned(),
            );
            bar.set_message(display_name);
        }
    }

    /// Record a finished mask
    pub fn complete_mask(&self) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    /// Finish the batch display
    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_with_message("done");
        }
    }
}
