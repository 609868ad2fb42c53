// Fri Oct 16 2026 - Alex

use crate::progress::ProgressSink;

/// Logs start, every 10% step and completion at info
#[derive(Debug, Default)]
pub struct LogProgress {
    task: String,
    total: u64,
    current: u64,
    last_percent: u64,
}

impl LogProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn maybe_log(&mut self) {
        if self.total == 0 {
            return;
        }

        let percent = (self.current * 100) / self.total;
        if percent > self.last_percent && percent % 10 == 0 {
            log::info!("[{}] Progress: {}% ({}/{})", self.task, percent, self.current, self.total);
            self.last_percent = percent;
        }
    }
}

impl ProgressSink for LogProgress {
    fn start(&mut self, task: &str, total: u64) {
        self.task = task.to_string();
        self.total = total;
        self.current = 0;
        self.last_percent = 0;
        log::info!("[{}] Starting (0/{})", self.task, total);
    }

    fn report(&mut self, completed: u64, _message: &str) {
        self.current = completed;
        self.maybe_log();
    }

    fn finish(&mut self, message: &str) {
        log::info!("[{}] Completed ({}/{}): {}", self.task, self.current, self.total, message);
    }
}
