//! Run statistics and progress reporting (§4.10). Counters are guarded by
//! one mutex, matching the single-lock-per-shared-resource rule in §5.

use std::collections::HashMap;
use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};

#[derive(Debug, Default, Clone)]
pub struct Counters {
    pub total_urls: u64,
    pub parameters_tested: u64,
    pub payloads_tested: u64,
    pub successful_payloads: u64,
    pub failed_payloads: u64,
    pub errors: u64,
    pub error_kinds: HashMap<String, u64>,
}

pub struct Stats {
    inner: Mutex<Counters>,
}

impl Stats {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Counters::default()),
        }
    }

    pub fn set_total_urls(&self, n: u64) {
        self.inner.lock().unwrap().total_urls = n;
    }

    pub fn record_parameter_tested(&self) {
        self.inner.lock().unwrap().parameters_tested += 1;
    }

    pub fn record_payload_success(&self) {
        let mut c = self.inner.lock().unwrap();
        c.payloads_tested += 1;
        c.successful_payloads += 1;
    }

    pub fn record_payload_failure(&self) {
        let mut c = self.inner.lock().unwrap();
        c.payloads_tested += 1;
        c.failed_payloads += 1;
    }

    pub fn record_error(&self, kind: &str) {
        let mut c = self.inner.lock().unwrap();
        c.errors += 1;
        *c.error_kinds.entry(kind.to_string()).or_insert(0) += 1;
    }

    pub fn snapshot(&self) -> Counters {
        self.inner.lock().unwrap().clone()
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

/// Abstracts the terminal progress bar so the orchestrator doesn't depend
/// on a concrete rendering backend. Advanced exactly once per payload
/// attempt, including skips and errors, so it always reaches completion.
pub trait ProgressSink: Send + Sync {
    fn inc(&self, delta: u64);
    fn finish(&self);
}

/// `indicatif`-backed implementation used outside of tests.
pub struct IndicatifProgress {
    bar: ProgressBar,
}

impl IndicatifProgress {
    pub fn new(total: u64) -> Self {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} payloads",
            )
            .unwrap()
            .progress_chars("=>-"),
        );
        Self { bar }
    }
}

impl ProgressSink for IndicatifProgress {
    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn finish(&self) {
        self.bar.finish();
    }
}

/// No-op implementation used by tests and anywhere the real bar would
/// clutter output.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn inc(&self, _delta: u64) {}
    fn finish(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_across_categories() {
        let stats = Stats::new();
        stats.set_total_urls(3);
        stats.record_parameter_tested();
        stats.record_payload_success();
        stats.record_payload_failure();
        stats.record_error("Transport");
        stats.record_error("Transport");

        let snap = stats.snapshot();
        assert_eq!(snap.total_urls, 3);
        assert_eq!(snap.parameters_tested, 1);
        assert_eq!(snap.payloads_tested, 2);
        assert_eq!(snap.successful_payloads, 1);
        assert_eq!(snap.failed_payloads, 1);
        assert_eq!(snap.errors, 2);
        assert_eq!(snap.error_kinds.get("Transport"), Some(&2));
    }

    #[test]
    fn null_progress_is_inert() {
        let progress = NullProgress;
        progress.inc(5);
        progress.finish();
    }
}
