// ABOUTME: Terminal progress bar observer for uploads and downloads.
// ABOUTME: Renders percent complete with indicatif and prints rejected paths above the bar.

use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};

use crate::error::ClientError;
use crate::transfer::{TransferKind, TransferObserver, TransferOutcome};

/// Draws one bar per transfer.
pub struct BarObserver {
    bar: ProgressBar,
}

impl BarObserver {
    pub fn new(kind: TransferKind) -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(Self::style());
        bar.set_prefix(kind.label());
        Self { bar }
    }

    /// Observer whose bar never draws, for non-interactive output.
    pub fn hidden(kind: TransferKind) -> Self {
        let bar = ProgressBar::hidden();
        bar.set_prefix(kind.label());
        Self { bar }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos:>3}% {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl TransferObserver for BarObserver {
    fn on_rejected(&mut self, path: &Path) {
        self.bar
            .println(format!("Invalid file path: {}", path.display()));
    }

    fn on_progress(&mut self, percent: u8, status: &str) {
        self.bar.set_position(u64::from(percent));
        self.bar.set_message(status.to_string());
    }

    fn on_finish(&mut self, result: Result<TransferOutcome, &ClientError>) {
        match result {
            Ok(TransferOutcome::Completed) => self.bar.finish_with_message("done"),
            Ok(TransferOutcome::StreamEnded { .. }) => {
                self.bar.abandon_with_message("stream ended early")
            }
            Ok(TransferOutcome::NothingToTransfer) => {
                self.bar.finish_and_clear();
                println!("No valid file paths to transfer.");
            }
            Err(e) => self.bar.abandon_with_message(e.to_string()),
        }
    }
}
