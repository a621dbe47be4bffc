//! Browser-context pool (§4.2): one headless Chrome instance, `W` pages
//! pre-created at startup and handed out through a bounded channel.
//!
//! chromiumoxide has no first-class `BrowserContext` object the way
//! Playwright does, so isolation is approximated with one dedicated `Page`
//! per pool slot.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::sync::mpsc::{self, Receiver, Sender};

use crate::error::ScanError;

/// Bounded pool of ready-to-use pages. `acquire`/`release` are the only
/// public operations; every borrow must be returned on all exit paths.
pub struct BrowserPool {
    browser: Arc<Browser>,
    tx: Sender<Page>,
    rx: tokio::sync::Mutex<Receiver<Page>>,
}

impl BrowserPool {
    /// Launches one headless browser and fills the pool with `size` pages,
    /// each preloaded with `headers`.
    pub async fn launch(size: u16, headers: &HashMap<String, String>) -> Result<Self, ScanError> {
        let config = BrowserConfig::builder()
            .no_sandbox()
            .args(vec![
                "--disable-blink-features=AutomationControlled",
                "--disable-dev-shm-usage",
                "--disable-gpu",
                "--window-size=1920,1080",
            ])
            .build()
            .map_err(|e| ScanError::Navigation(format!("browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScanError::Navigation(format!("browser launch: {e}")))?;

        tokio::spawn(async move {
            while handler.next().await.is_some() {}
        });

        let browser = Arc::new(browser);
        let (tx, rx) = mpsc::channel(size as usize);

        for _ in 0..size {
            let page = new_page(&browser, headers).await?;
            tx.send(page)
                .await
                .map_err(|_| ScanError::Navigation("pool channel closed during fill".into()))?;
        }

        Ok(Self {
            browser,
            tx,
            rx: tokio::sync::Mutex::new(rx),
        })
    }

    /// Blocks until a page is available.
    pub async fn acquire(&self) -> Page {
        let mut rx = self.rx.lock().await;
        rx.recv()
            .await
            .expect("browser pool channel closed while a sender handle remains")
    }

    /// Returns a page to the pool. Must be called on every code path that
    /// calls `acquire`, including error paths.
    pub async fn release(&self, page: Page) {
        let _ = self.tx.send(page).await;
    }

    /// Closes the underlying browser with a hard deadline (§5 cleanup cap).
    pub async fn close(&self) {
        let _ = tokio::time::timeout(Duration::from_secs(2), async {
            let _ = self.browser.close().await;
        })
        .await;
    }
}

async fn new_page(browser: &Browser, headers: &HashMap<String, String>) -> Result<Page, ScanError> {
    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| ScanError::Navigation(format!("new page: {e}")))?;
    let _ = page.set_extra_http_headers(headers.clone()).await;
    Ok(page)
}

#[cfg(test)]
mod tests {
    // Launching a real browser in unit tests isn't practical in this
    // environment; pool sizing/arity is covered indirectly by the
    // orchestrator tests that stub out acquisition.
}
