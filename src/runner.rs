//! Wires the whole scan together: logging, input loading, component
//! construction, orchestrator run, cleanup.

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use chrono::Local;

use crate::browser_pool::BrowserPool;
use crate::cli::Cli;
use crate::config::Config;
use crate::error::ScanError;
use crate::headers;
use crate::http_client::{self, HttpClient};
use crate::notify::NotificationAdapter;
use crate::orchestrator::{Orchestrator, OrchestratorConfig};
use crate::rate_limiter::RateLimiter;
use crate::sink::Sink;
use crate::stats::{IndicatifProgress, ProgressSink, Stats};
use crate::url_normalizer;
use crate::utils;

fn init_logging(debug: bool, verbose: bool) {
    use tracing_subscriber::EnvFilter;
    let crate_level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };
    let filter_str = format!("xss_hunter={crate_level},reqwest=info,hyper=info");
    let env_filter = EnvFilter::try_new(&filter_str).unwrap_or_else(|_| EnvFilter::new(crate_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}

pub async fn run_from_cli(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.debug, cli.verbose);
    let config = Config::from_cli(cli)?;

    let urls = load_urls(&config).await?;
    let payloads = Arc::new(load_payloads(&config.payloads_path).await?);
    tracing::info!(url_count = urls.len(), payload_count = payloads.len(), "loaded input");

    let custom_headers = headers::parse_custom_headers(&config.raw_headers)
        .map_err(ScanError::InputInvalid)?;
    let request_headers = headers::merge_headers(headers::default_headers(), custom_headers);

    let client = http_client::build_client(config.workers, config.request_timeout_secs);
    let http = Arc::new(HttpClient::new(client.clone(), request_headers.clone()));
    let rate_limiter = RateLimiter::new(config.rate_limit);
    let pool = Arc::new(
        BrowserPool::launch(config.workers, &request_headers)
            .await
            .map_err(anyhow::Error::from)?,
    );

    let output_path = resolve_output_path(&config);
    let sink = Arc::new(Sink::new(config.output_mode, output_path.clone()));
    let stats = Arc::new(Stats::new());
    let progress: Arc<dyn ProgressSink> =
        Arc::new(IndicatifProgress::new((urls.len() * payloads.len()).max(1) as u64));

    let notifier = match (&config.notify_token, &config.notify_chat_id) {
        (Some(token), Some(chat_id)) => Some(Arc::new(NotificationAdapter::new(
            client.clone(),
            token.clone(),
            chat_id.clone(),
        ))),
        _ => None,
    };

    let stop = Arc::new(AtomicBool::new(false));
    spawn_signal_handler(stop.clone());

    let orchestrator = Orchestrator::new(
        OrchestratorConfig {
            workers: config.workers,
            request_timeout_secs: config.request_timeout_secs,
            alert_timeout_secs: config.alert_timeout_secs,
        },
        http.clone(),
        pool.clone(),
        rate_limiter,
        sink.clone(),
        stats.clone(),
        progress,
        notifier,
        stop,
    );

    orchestrator.warm_up(&urls).await;
    orchestrator.run(urls, payloads).await;

    sink.flush().await?;

    let snapshot = stats.snapshot();
    println!(
        "scanned {} urls, {} parameters, {} payloads ({} hits, {} misses, {} errors)",
        snapshot.total_urls,
        snapshot.parameters_tested,
        snapshot.payloads_tested,
        snapshot.successful_payloads,
        snapshot.failed_payloads,
        snapshot.errors,
    );
    if sink.count().await > 0 {
        println!("results written to {}", output_path.display());
    }

    pool.close().await;
    Ok(())
}

fn spawn_signal_handler(stop: Arc<AtomicBool>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("stop requested, finishing in-flight work");
            stop.store(true, std::sync::atomic::Ordering::Relaxed);
        }
    });
}

async fn load_urls(config: &Config) -> Result<Vec<String>, ScanError> {
    let raw: Vec<String> = if let Some(domain) = &config.domain {
        vec![domain.clone()]
    } else if let Some(list_path) = &config.list {
        let content = tokio::fs::read_to_string(list_path)
            .await
            .map_err(|e| ScanError::InputInvalid(format!("failed to read {list_path}: {e}")))?;
        content.lines().map(|l| l.trim().to_string()).filter(|l| !l.is_empty()).collect()
    } else {
        return Err(ScanError::InputInvalid("no input source provided".into()));
    };

    let total = raw.len();
    let valid: Vec<String> = raw.into_iter().filter(|u| url_normalizer::validate(u)).collect();
    let valid_count = valid.len();
    let deduped = utils::dedup_preserve_order(valid, |u| url_normalizer::signature(u));
    let skipped_duplicates = valid_count.saturating_sub(deduped.len());

    tracing::info!(
        total,
        unique = deduped.len(),
        skipped_duplicates,
        "url list loaded"
    );

    if deduped.is_empty() {
        return Err(ScanError::InputInvalid("no valid URLs found".into()));
    }
    Ok(deduped)
}

async fn load_payloads(path: &str) -> Result<Vec<String>, ScanError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ScanError::InputInvalid(format!("payload file {path} not found: {e}")))?;
    let raw: Vec<String> = content.lines().map(str::to_string).filter(|l| !l.is_empty()).collect();
    Ok(utils::dedup_preserve_order(raw, |p| p.clone()))
}

/// §6.4: `scans/<basename>/xss_results_<YYYYmmdd_HHMMSS>.{txt,json}`.
fn resolve_output_path(config: &Config) -> PathBuf {
    let ext = if matches!(config.output_mode, crate::sink::OutputMode::Json) {
        "json"
    } else {
        "txt"
    };
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");

    if let Some(output) = &config.output {
        let path = Path::new(output);
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("xss_results");
        let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();
        return parent.join(format!("{stem}_{timestamp}.{ext}"));
    }

    let basename = match &config.domain {
        Some(url) => url_normalizer::host(url),
        None => config
            .list
            .as_deref()
            .and_then(|p| Path::new(p).file_stem())
            .and_then(|s| s.to_str())
            .unwrap_or("scan")
            .to_string(),
    };
    PathBuf::from("scans").join(basename).join(format!("xss_results_{timestamp}.{ext}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_uses_domain_host_when_no_flag_given() {
        let config = Config {
            domain: Some("https://example.com/?q=1".to_string()),
            list: None,
            payloads_path: "xss_payloads.txt".to_string(),
            raw_headers: vec![],
            workers: 10,
            request_timeout_secs: 8,
            alert_timeout_secs: 6,
            batch_size: 15,
            rate_limit: 12,
            output_mode: crate::sink::OutputMode::Text,
            output: None,
            notify_token: None,
            notify_chat_id: None,
            verbose: false,
            debug: false,
        };
        let path = resolve_output_path(&config);
        assert!(path.starts_with("scans/example.com"));
        assert!(path.to_string_lossy().ends_with(".txt"));
    }
}
