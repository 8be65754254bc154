//! "Working…" indicator shown while a blocking tool call runs

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Animated spinner guard.
///
/// The animation runs on indicatif's tick thread and is finished and cleared
/// when the guard drops, so it never outlives the call it decorates.
pub struct Spinner {
    bar: Option<ProgressBar>,
}

impl Spinner {
    pub fn start(message: impl Into<String>) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(message.into());
        bar.enable_steady_tick(Duration::from_millis(120));
        Self::from_bar(bar)
    }

    /// Wrap an existing bar; it is finished when the guard drops
    pub(crate) fn from_bar(bar: ProgressBar) -> Self {
        Self { bar: Some(bar) }
    }

    /// A spinner that draws nothing
    pub fn hidden() -> Self {
        Self { bar: None }
    }

    pub fn is_visible(&self) -> bool {
        self.bar.is_some()
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}
