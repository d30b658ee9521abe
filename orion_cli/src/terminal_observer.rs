use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

use orion_core::progress::{format_bytes, ProgressObserver, ProgressSnapshot};

/// Renders a single download as an indicatif terminal bar.
///
/// The bar is created on the first snapshot that carries a known total size;
/// until then a spinner shows the bytes received so far.
pub struct TerminalProgressObserver {
    label: String,
    bar: Mutex<Option<ProgressBar>>,
}

impl TerminalProgressObserver {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            bar: Mutex::new(None),
        }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{bar:30.cyan/blue}] {bytes}/{total_bytes} ({binary_bytes_per_sec}) ETA {eta} — {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-")
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner} {bytes} ({binary_bytes_per_sec}) — {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    /// Create or reshape the bar for `snapshot` and move it to the reported
    /// position.
    fn update(&self, snapshot: &ProgressSnapshot) {
        let Ok(mut slot) = self.bar.lock() else {
            return;
        };
        let total = whole_bytes(snapshot.total_size);

        let bar = slot.get_or_insert_with(|| {
            if total > 0 {
                let pb = ProgressBar::new(total);
                pb.set_style(Self::bar_style());
                pb
            } else {
                let pb = ProgressBar::new_spinner();
                pb.set_style(Self::spinner_style());
                pb.enable_steady_tick(Duration::from_millis(100));
                pb
            }
        });

        // A spinner turns into a bar once aria2 learns the file size.
        if total > 0 && bar.length() != Some(total) {
            bar.disable_steady_tick();
            bar.set_style(Self::bar_style());
            bar.set_length(total);
        }
        bar.set_position(whole_bytes(snapshot.completed_size));

        let status = snapshot.status.as_deref().unwrap_or("unknown");
        bar.set_message(format!("{} [{}]", self.label, status));
    }
}

#[async_trait]
impl ProgressObserver for TerminalProgressObserver {
    async fn on_progress(&self, snapshot: &ProgressSnapshot) {
        self.update(snapshot);
    }

    async fn on_complete(&self, snapshot: &ProgressSnapshot) {
        self.update(snapshot);
        if let Ok(slot) = self.bar.lock() {
            if let Some(pb) = slot.as_ref() {
                let total = format_bytes(whole_bytes(snapshot.completed_size));
                pb.finish_with_message(format!("{} complete — {}", self.label, total));
            }
        }
    }

    async fn on_error(&self, error: &str) {
        if let Ok(slot) = self.bar.lock() {
            match slot.as_ref() {
                Some(pb) => pb.abandon_with_message(format!("Failed: {}", error)),
                None => eprintln!("{} failed: {}", self.label, error),
            }
        }
    }
}

/// Bar positions are whole bytes; negative or missing sizes count as zero.
fn whole_bytes(size: Option<f64>) -> u64 {
    size.map_or(0, |b| b.max(0.0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_bytes_clamps() {
        assert_eq!(whole_bytes(None), 0);
        assert_eq!(whole_bytes(Some(-1.0)), 0);
        assert_eq!(whole_bytes(Some(2048.7)), 2048);
    }
}
