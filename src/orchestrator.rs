//! Scan orchestrator. Batches input URLs, fans parameters out to bounded
//! workers, and drives each worker's payload loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashSet;
use tokio::sync::Semaphore;
use tokio::time::sleep;

use crate::alert_validator;
use crate::browser_pool::BrowserPool;
use crate::http_client::HttpClient;
use crate::model::{Finding, XssType};
use crate::notify::NotificationAdapter;
use crate::rate_limiter::RateLimiter;
use crate::reflection;
use crate::sink::Sink;
use crate::stats::{ProgressSink, Stats};
use crate::url_normalizer;

const URL_BATCH: usize = 5;

pub struct OrchestratorConfig {
    pub workers: u16,
    pub request_timeout_secs: u64,
    pub alert_timeout_secs: u64,
}

pub struct Orchestrator {
    config: OrchestratorConfig,
    http: Arc<HttpClient>,
    pool: Arc<BrowserPool>,
    rate_limiter: RateLimiter,
    sink: Arc<Sink>,
    stats: Arc<Stats>,
    progress: Arc<dyn ProgressSink>,
    notifier: Option<Arc<NotificationAdapter>>,
    tested_contexts: Arc<DashSet<String>>,
    stop: Arc<AtomicBool>,
}

impl Orchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: OrchestratorConfig,
        http: Arc<HttpClient>,
        pool: Arc<BrowserPool>,
        rate_limiter: RateLimiter,
        sink: Arc<Sink>,
        stats: Arc<Stats>,
        progress: Arc<dyn ProgressSink>,
        notifier: Option<Arc<NotificationAdapter>>,
        stop: Arc<AtomicBool>,
    ) -> Self {
        Self {
            config,
            http,
            pool,
            rate_limiter,
            sink,
            stats,
            progress,
            notifier,
            tested_contexts: Arc::new(DashSet::new()),
            stop,
        }
    }

    /// Best-effort HEAD warm-up on the first `min(3, urls.len())` URLs
    /// (§4.8 supplement), failures ignored.
    pub async fn warm_up(&self, urls: &[String]) {
        for url in urls.iter().take(3) {
            let _ = self.http.head(url, Duration::from_secs(2)).await;
        }
    }

    /// Runs the whole scan: iterates `urls` in batches of `URL_BATCH`,
    /// fanning one worker per untested parameter context.
    pub async fn run(&self, urls: Vec<String>, payloads: Arc<Vec<String>>) {
        self.stats.set_total_urls(urls.len() as u64);
        let semaphore = Arc::new(Semaphore::new((self.config.workers as usize).min(10)));

        for batch in urls.chunks(URL_BATCH) {
            if self.stop.load(Ordering::Relaxed) {
                break;
            }
            let mut handles = Vec::new();
            for url in batch {
                if self.stop.load(Ordering::Relaxed) {
                    break;
                }
                let params = url_normalizer::params(url);
                for param in params {
                    if param.value.is_none() {
                        continue;
                    }
                    let context = url_normalizer::parameter_context(url, &param.name);
                    if !self.tested_contexts.insert(context) {
                        continue;
                    }
                    self.stats.record_parameter_tested();

                    let permit = semaphore.clone().acquire_owned().await.unwrap();
                    let url = url.clone();
                    let parameter = param.name.clone();
                    let payloads = payloads.clone();
                    let http = self.http.clone();
                    let pool = self.pool.clone();
                    let rate_limiter = self.rate_limiter.clone();
                    let sink = self.sink.clone();
                    let stats = self.stats.clone();
                    let progress = self.progress.clone();
                    let notifier = self.notifier.clone();
                    let request_timeout_secs = self.config.request_timeout_secs;
                    let alert_timeout_secs = self.config.alert_timeout_secs;
                    let stop = self.stop.clone();

                    handles.push(tokio::spawn(async move {
                        let _permit = permit;
                        process_parameter(
                            &url,
                            &parameter,
                            &payloads,
                            &http,
                            &pool,
                            &rate_limiter,
                            &sink,
                            &stats,
                            progress.as_ref(),
                            notifier.as_deref(),
                            request_timeout_secs,
                            alert_timeout_secs,
                            &stop,
                        )
                        .await;
                    }));
                    sleep(Duration::from_millis(100)).await;
                }
            }
            for handle in handles {
                let _ = handle.await;
            }
            sleep(Duration::from_millis(200)).await;
        }

        self.progress.finish();
    }
}

/// Worker task for one `(url, parameter)` pair (§4.8).
#[allow(clippy::too_many_arguments)]
async fn process_parameter(
    url: &str,
    parameter: &str,
    payloads: &[String],
    http: &HttpClient,
    pool: &BrowserPool,
    rate_limiter: &RateLimiter,
    sink: &Sink,
    stats: &Stats,
    progress: &dyn ProgressSink,
    notifier: Option<&NotificationAdapter>,
    request_timeout_secs: u64,
    alert_timeout_secs: u64,
    stop: &AtomicBool,
) {
    let n = payloads.len();
    for (i, payload) in payloads.iter().enumerate() {
        if stop.load(Ordering::Relaxed) {
            break;
        }

        rate_limiter.acquire().await;

        let targets = url_normalizer::inject(url, payload);
        let Some((injected_url, _)) = targets.into_iter().find(|(_, p)| p == parameter) else {
            progress.inc(1);
            continue;
        };

        let (status, body) = match http.get(&injected_url).await {
            Ok(pair) => pair,
            Err(_) => {
                stats.record_error("Transport");
                stats.record_payload_failure();
                progress.inc(1);
                continue;
            }
        };
        if status != 200 {
            stats.record_payload_failure();
            progress.inc(1);
            continue;
        }

        let reflected = reflection::is_reflected(&body, payload);
        let potential_dom = crate::dom_heuristic::has_dom_sink_indicator(&body);
        if !reflected && !potential_dom {
            stats.record_payload_failure();
            progress.inc(1);
            continue;
        }

        let outcome = alert_validator::validate(
            pool,
            http,
            stats,
            &injected_url,
            payload,
            request_timeout_secs,
            alert_timeout_secs,
        )
        .await;

        match outcome.classify() {
            Some(xss_type) => {
                let finding = build_finding(url, parameter, payload, &injected_url, &outcome, xss_type);
                sink.record(finding.clone()).await;
                stats.record_payload_success();
                if let Some(notifier) = notifier {
                    if let Err(e) = notifier.notify(&finding).await {
                        tracing::warn!("notification failed: {e}");
                    }
                }
                let remaining = (n - 1 - i) as u64;
                progress.inc(1 + remaining);
                break;
            }
            None => {
                stats.record_payload_failure();
                progress.inc(1);
            }
        }
    }
}

fn build_finding(
    url: &str,
    parameter: &str,
    payload: &str,
    injected_url: &str,
    outcome: &crate::model::AlertOutcome,
    xss_type: XssType,
) -> Finding {
    Finding {
        timestamp: chrono::Local::now().to_rfc3339(),
        domain: url_normalizer::host(url),
        parameter: parameter.to_string(),
        payload: payload.to_string(),
        url: injected_url.to_string(),
        alert_text: outcome.alert_text.clone().unwrap_or_default(),
        xss_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_sums_to_payload_count_on_early_break() {
        let n = 10usize;
        let first_hit_index = 3usize; // 0-based
        let mut total = 0u64;
        for i in 0..=first_hit_index {
            if i == first_hit_index {
                total += 1 + (n - 1 - i) as u64;
            } else {
                total += 1;
            }
        }
        assert_eq!(total, n as u64);
    }
}
