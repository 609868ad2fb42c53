// Fri Oct 16 2026 - Alex

use crate::progress::ProgressSink;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}";

/// Terminal progress bar; one bar per task
pub struct BarProgress {
    bar: Option<ProgressBar>,
    hidden: bool,
}

impl BarProgress {
    pub fn new() -> Self {
        Self { bar: None, hidden: false }
    }

    /// Same behavior, nothing drawn
    pub fn hidden() -> Self {
        Self { bar: None, hidden: true }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░ ")
    }

    pub fn position(&self) -> u64 {
        self.bar.as_ref().map(|bar| bar.position()).unwrap_or(0)
    }

    pub fn is_finished(&self) -> bool {
        self.bar.as_ref().map(|bar| bar.is_finished()).unwrap_or(false)
    }
}

impl Default for BarProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for BarProgress {
    fn start(&mut self, task: &str, total: u64) {
        if let Some(previous) = self.bar.take() {
            previous.finish_and_clear();
        }
        let bar = ProgressBar::new(total);
        if self.hidden {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        bar.set_style(Self::style());
        bar.set_message(task.to_string());
        self.bar = Some(bar);
    }

    fn report(&mut self, completed: u64, _message: &str) {
        if let Some(bar) = &self.bar {
            bar.set_position(completed);
        }
    }

    fn finish(&mut self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.finish_with_message(message.to_string());
        }
    }
}
