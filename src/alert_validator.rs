//! Alert validator (§4.7) — the oracle. Borrows a page from the pool,
//! watches for a JS dialog, optionally instruments the DOM, navigates, and
//! classifies the result.

use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::page::EventJavascriptDialogOpening;
use futures::StreamExt;
use tokio::sync::Mutex;

use crate::browser_pool::BrowserPool;
use crate::dom_heuristic;
use crate::http_client::HttpClient;
use crate::model::AlertOutcome;
use crate::reflection;
use crate::stats::Stats;

const INSTRUMENTATION_SCRIPT: &str = r#"
(() => {
  window._domModified = false;
  window._scriptExecuted = false;
  const observer = new MutationObserver(() => { window._domModified = true; });
  const attach = () => {
    if (document.body) {
      observer.observe(document.body, { childList: true, characterData: true, subtree: true });
    }
  };
  if (document.body) { attach(); } else { document.addEventListener('DOMContentLoaded', attach); }
  const realSetTimeout = window.setTimeout;
  window.setTimeout = function (...args) { window._scriptExecuted = true; return realSetTimeout.apply(window, args); };
  const realEval = window.eval;
  window.eval = function (...args) { window._scriptExecuted = true; return realEval.apply(window, args); };
})();
"#;

/// Runs the oracle for one injected URL/payload pair.
///
/// `payload` is the raw (un-encoded) payload used for the §4.5 reflection
/// check; `injected_url` is the URL with it already substituted in.
#[allow(clippy::too_many_arguments)]
pub async fn validate(
    pool: &BrowserPool,
    http: &HttpClient,
    stats: &Stats,
    injected_url: &str,
    payload: &str,
    request_timeout_secs: u64,
    alert_timeout_secs: u64,
) -> AlertOutcome {
    let mut outcome = AlertOutcome::default();

    let body = match http.get(injected_url).await {
        Ok((_, body)) => body,
        Err(_) => return outcome,
    };
    outcome.reflected = reflection::is_reflected(&body, payload);
    let static_dom_hit = dom_heuristic::has_dom_sink_indicator(&body);

    let page = pool.acquire().await;
    let dialog_text: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
    let dialog_fired = Arc::new(Mutex::new(false));

    let listener_result = page.event_listener::<EventJavascriptDialogOpening>().await;
    let listener_task = match listener_result {
        Ok(mut stream) => {
            let dialog_text = dialog_text.clone();
            let dialog_fired = dialog_fired.clone();
            let page_for_dismiss = page.clone();
            Some(tokio::spawn(async move {
                while let Some(event) = stream.next().await {
                    *dialog_text.lock().await = Some(event.message.clone());
                    *dialog_fired.lock().await = true;
                    let _ = page_for_dismiss.handle_dialog(true, None).await;
                }
            }))
        }
        Err(_) => {
            stats.record_error("Instrumentation");
            None
        }
    };

    if static_dom_hit && page.evaluate_on_new_document(INSTRUMENTATION_SCRIPT).await.is_err() {
        stats.record_error("Instrumentation");
    }

    let nav_result = tokio::time::timeout(
        Duration::from_secs(request_timeout_secs),
        page.goto(injected_url),
    )
    .await;

    let navigated = match nav_result {
        Ok(Ok(_)) => true,
        Ok(Err(_)) | Err(_) => {
            stats.record_error("Navigation");
            false
        }
    };

    if navigated {
        let _ = tokio::time::timeout(
            Duration::from_secs(request_timeout_secs),
            page.wait_for_navigation(),
        )
        .await;
    }

    tokio::time::sleep(Duration::from_secs(alert_timeout_secs)).await;

    let dom_modified = match page.evaluate("window._domModified === true").await {
        Ok(v) => v.into_value::<bool>().unwrap_or(false),
        Err(_) => {
            stats.record_error("Instrumentation");
            false
        }
    };
    let script_executed = match page.evaluate("window._scriptExecuted === true").await {
        Ok(v) => v.into_value::<bool>().unwrap_or(false),
        Err(_) => {
            stats.record_error("Instrumentation");
            false
        }
    };

    if let Some(task) = listener_task {
        task.abort();
    }
    pool.release(page).await;

    outcome.alert_fired = *dialog_fired.lock().await;
    outcome.alert_text = dialog_text.lock().await.clone();
    outcome.dom_evidence = static_dom_hit || dom_modified || script_executed;

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::XssType;

    #[test]
    fn classification_matches_truth_table() {
        let mut outcome = AlertOutcome {
            alert_fired: true,
            alert_text: Some("1".into()),
            reflected: true,
            dom_evidence: true,
        };
        assert_eq!(outcome.classify(), Some(XssType::Both));

        outcome.dom_evidence = false;
        assert_eq!(outcome.classify(), Some(XssType::Reflected));

        outcome.reflected = false;
        outcome.dom_evidence = true;
        assert_eq!(outcome.classify(), Some(XssType::Dom));

        outcome.dom_evidence = false;
        assert_eq!(outcome.classify(), Some(XssType::Reflected));

        outcome.alert_fired = false;
        assert_eq!(outcome.classify(), None);
    }
}
