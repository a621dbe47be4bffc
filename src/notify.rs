//! Notification adapter: fixed Telegram `sendMessage` webhook shape,
//! failures logged and never propagated.

use reqwest::Client;
use serde::Serialize;

use crate::model::Finding;

#[derive(Serialize)]
struct ChatMessage<'a> {
    chat_id: &'a str,
    text: String,
    parse_mode: &'static str,
}

/// Posts a finding to a fixed chat-webhook endpoint. Construction requires
/// both a bearer token and a chat identifier; without either, notifications
/// are simply not configured by the caller.
pub struct NotificationAdapter {
    client: Client,
    bot_token: String,
    chat_id: String,
}

impl NotificationAdapter {
    pub fn new(client: Client, bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            client,
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
        }
    }

    /// Sends one finding. Errors are logged by the caller via the returned
    /// `Result`; the orchestrator never lets this block or abort the scan.
    pub async fn notify(&self, finding: &Finding) -> Result<(), reqwest::Error> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);
        let text = render_text(finding);
        let body = ChatMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "HTML",
        };
        self.client.post(url).json(&body).send().await?;
        Ok(())
    }
}

fn render_text(finding: &Finding) -> String {
    format!(
        "<b>XSS Found</b>\nType: {}\nDomain: {}\nParameter: {}\nPayload: <code>{}</code>\nURL: {}",
        finding.xss_type.label(),
        html_escape::encode_text(&finding.domain),
        html_escape::encode_text(&finding.parameter),
        html_escape::encode_text(&finding.payload),
        html_escape::encode_text(&finding.url),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::XssType;

    #[test]
    fn render_escapes_payload_html() {
        let finding = Finding {
            timestamp: "2026-07-30T00:00:00Z".into(),
            domain: "example.com".into(),
            parameter: "q".into(),
            payload: "<script>alert(1)</script>".into(),
            url: "https://example.com/?q=1".into(),
            alert_text: "1".into(),
            xss_type: XssType::Reflected,
        };
        let text = render_text(&finding);
        assert!(!text.contains("<script>alert(1)</script>"));
        assert!(text.contains("&lt;script&gt;"));
    }
}
