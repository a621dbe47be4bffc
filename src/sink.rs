//! Result sink (§4.9): serialised behind one mutex, two output modes chosen
//! once at start, flushed to disk on run completion.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::sync::Mutex;

use crate::error::ScanError;
use crate::model::Finding;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Json,
}

pub struct Sink {
    mode: OutputMode,
    output_path: PathBuf,
    buffer: Mutex<Vec<Finding>>,
}

impl Sink {
    pub fn new(mode: OutputMode, output_path: impl Into<PathBuf>) -> Self {
        Self {
            mode,
            output_path: output_path.into(),
            buffer: Mutex::new(Vec::new()),
        }
    }

    /// Appends one finding to the in-memory buffer (§4.9).
    pub async fn record(&self, finding: Finding) {
        self.buffer.lock().await.push(finding);
    }

    /// Flushes the buffer to `output_path`. No file is created if the
    /// buffer is empty.
    pub async fn flush(&self) -> Result<(), ScanError> {
        let findings = self.buffer.lock().await;
        if findings.is_empty() {
            return Ok(());
        }
        if let Some(parent) = Path::new(&self.output_path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| ScanError::SinkWrite(e.to_string()))?;
            }
        }
        let content = match self.mode {
            OutputMode::Text => render_text(&findings),
            OutputMode::Json => {
                serde_json::to_string_pretty(&*findings).map_err(|e| ScanError::SinkWrite(e.to_string()))?
            }
        };
        fs::write(&self.output_path, content)
            .await
            .map_err(|e| ScanError::SinkWrite(e.to_string()))
    }

    pub async fn count(&self) -> usize {
        self.buffer.lock().await.len()
    }
}

fn render_text(findings: &[Finding]) -> String {
    let mut lines = Vec::with_capacity(findings.len() * 8);
    for f in findings {
        lines.push("XSS Found:".to_string());
        lines.push(format!("Type: {} XSS", f.xss_type.label()));
        lines.push(format!("Domain: {}", f.domain));
        lines.push(format!("Parameter: {}", f.parameter));
        lines.push(format!("Payload: {}", f.payload));
        lines.push(format!("URL: {}", f.url));
        lines.push(format!("Alert Text: {}", f.alert_text));
        lines.push(String::new());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::XssType;

    fn sample_finding() -> Finding {
        Finding {
            timestamp: "2026-07-30T00:00:00Z".into(),
            domain: "example.com".into(),
            parameter: "q".into(),
            payload: "<script>alert(1)</script>".into(),
            url: "https://example.com/?q=%3Cscript%3E".into(),
            alert_text: "1".into(),
            xss_type: XssType::Reflected,
        }
    }

    #[test]
    fn text_rendering_matches_expected_block_shape() {
        let rendered = render_text(&[sample_finding()]);
        assert!(rendered.starts_with("XSS Found:\nType: Reflected XSS\nDomain: example.com"));
        assert!(!rendered.ends_with('\n'));
    }

    #[tokio::test]
    async fn flush_creates_no_file_when_empty() {
        let dir = std::env::temp_dir().join(format!("xss-sink-test-{}", std::process::id()));
        let path = dir.join("out.json");
        let sink = Sink::new(OutputMode::Json, &path);
        sink.flush().await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn flush_writes_json_array() {
        let dir = std::env::temp_dir().join(format!("xss-sink-test-json-{}", std::process::id()));
        let path = dir.join("out.json");
        let sink = Sink::new(OutputMode::Json, &path);
        sink.record(sample_finding()).await;
        sink.flush().await.unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.trim_start().starts_with('['));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
