// Fri Oct 16 2026 - Alex

//! Optional progress side-channel for the two passes. A pass computes the
//! same result whether or not a sink is attached.

pub mod bar;
pub mod log_sink;

pub use bar::BarProgress;
pub use log_sink::LogProgress;

pub trait ProgressSink {
    fn start(&mut self, task: &str, total: u64);

    fn report(&mut self, completed: u64, message: &str);

    fn finish(&mut self, message: &str);
}

/// Thin wrapper that turns an absent sink into no-ops
pub struct ProgressScope<'a> {
    sink: Option<&'a mut dyn ProgressSink>,
    completed: u64,
}

impl<'a> ProgressScope<'a> {
    pub fn new(sink: Option<&'a mut dyn ProgressSink>) -> Self {
        Self { sink, completed: 0 }
    }

    pub fn start(&mut self, task: &str, total: u64) {
        self.completed = 0;
        if let Some(sink) = self.sink.as_mut() {
            sink.start(task, total);
        }
    }

    pub fn step(&mut self, message: &str) {
        self.completed += 1;
        if let Some(sink) = self.sink.as_mut() {
            sink.report(self.completed, message);
        }
    }

    pub fn finish(&mut self, message: &str) {
        if let Some(sink) = self.sink.as_mut() {
            sink.finish(message);
        }
    }

    pub fn completed(&self) -> u64 {
        self.completed
    }
}

/// Records every call, for tests
#[derive(Debug, Default, Clone)]
pub struct RecordingProgress {
    pub tasks: Vec<(String, u64)>,
    pub reports: Vec<u64>,
    pub finished: Vec<String>,
}

impl ProgressSink for RecordingProgress {
    fn start(&mut self, task: &str, total: u64) {
        self.tasks.push((task.to_string(), total));
    }

    fn report(&mut self, completed: u64, _message: &str) {
        self.reports.push(completed);
    }

    fn finish(&mut self, message: &str) {
        self.finished.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_without_sink_counts() {
        let mut scope = ProgressScope::new(None);
        scope.start("task", 2);
        scope.step("a");
        scope.step("b");
        scope.finish("done");
        assert_eq!(scope.completed(), 2);
    }

    #[test]
    fn test_scope_forwards_to_sink() {
        let mut recorder = RecordingProgress::default();
        {
            let mut scope = ProgressScope::new(Some(&mut recorder));
            scope.start("task", 3);
            scope.step("a");
            scope.step("b");
            scope.finish("done");
        }
        assert_eq!(recorder.tasks, vec![("task".to_string(), 3)]);
        assert_eq!(recorder.reports, vec![1, 2]);
        assert_eq!(recorder.finished, vec!["done".to_string()]);
    }
}
