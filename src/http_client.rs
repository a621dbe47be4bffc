//! Pooled HTTP client: connection cap `W*3`, DNS-cache/keep-alive tuned via
//! reqwest's connection-pool knobs, TLS verification disabled since targets
//! may present self-signed or mismatched certs during testing.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Client, ClientBuilder};

/// Builds the single client shared by every worker.
pub fn build_client(workers: u16, request_timeout_secs: u64) -> Client {
    let max_idle_per_host = workers as usize * 3;
    ClientBuilder::new()
        .pool_max_idle_per_host(max_idle_per_host)
        .pool_idle_timeout(Some(Duration::from_secs(300)))
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .timeout(Duration::from_secs(request_timeout_secs))
        .connect_timeout(Duration::from_secs((request_timeout_secs / 2).max(1)))
        .danger_accept_invalid_certs(true)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .expect("failed to build HTTP client")
}

/// Thin wrapper exposing exactly the operation §4.3 names: `GET(url) ->
/// (status, body)`, with the run's header set attached to every request.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    headers: HashMap<String, String>,
}

impl HttpClient {
    pub fn new(client: Client, headers: HashMap<String, String>) -> Self {
        Self { client, headers }
    }

    pub async fn get(&self, url: &str) -> reqwest::Result<(u16, String)> {
        let mut req = self.client.get(url);
        for (name, value) in &self.headers {
            req = req.header(name, value);
        }
        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        Ok((status, body))
    }

    /// Best-effort HEAD warm-up (§4.8): failures are ignored by the caller.
    pub async fn head(&self, url: &str, timeout: Duration) -> reqwest::Result<()> {
        let mut req = self.client.head(url).timeout(timeout);
        for (name, value) in &self.headers {
            req = req.header(name, value);
        }
        req.send().await?;
        Ok(())
    }

    pub fn inner(&self) -> &Client {
        &self.client
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds_with_expected_timeout() {
        let client = build_client(10, 8);
        assert!(client.clone().get("https://example.com").build().is_ok());
    }
}
