use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while a dataset is read; reports rows as they arrive.
pub struct ProgressReporter {
    progress_bar: Option<ProgressBar>,
}

impl ProgressReporter {
    pub fn new_spinner(message: &str, silent: bool) -> Self {
        if silent {
            return Self { progress_bar: None };
        }

        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed_precise}] {pos} rows")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self {
            progress_bar: Some(pb),
        }
    }

    pub fn increment(&self, delta: u64) {
        if let Some(ref pb) = self.progress_bar {
            pb.inc(delta);
        }
    }

    pub fn finish_with_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_with_message(message.to_string());
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(ref pb) = self.progress_bar {
            if !pb.is_finished() {
                pb.finish_and_clear();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_reporter_draws_nothing() {
        let reporter = ProgressReporter::new_spinner("Reading snapshot.csv", true);
        assert!(reporter.progress_bar.is_none());
        reporter.increment(10);
        reporter.finish_with_message("Read 10 rows");
    }

    #[test]
    fn test_finish_keeps_summary_message() {
        let reporter = ProgressReporter::new_spinner("Reading snapshot.csv", false);
        reporter.increment(3);
        reporter.finish_with_message("Read 3 rows");

        let pb = reporter.progress_bar.as_ref().unwrap();
        assert!(pb.is_finished());
        assert_eq!(pb.position(), 3);
        assert_eq!(pb.message(), "Read 3 rows");
    }
}
