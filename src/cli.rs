//! Command-line surface, built with `clap`'s derive API.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "xss-hunter", about = "Automated reflected/DOM XSS scanner")]
pub struct Cli {
    /// Single target URL.
    #[arg(short = 'd', long = "domain", conflicts_with = "list")]
    pub domain: Option<String>,

    /// Path to a newline-delimited file of target URLs.
    #[arg(short = 'l', long = "list", conflicts_with = "domain")]
    pub list: Option<String>,

    /// Payload file, one payload per line.
    #[arg(short = 'p', long = "payloads", default_value = "xss_payloads.txt")]
    pub payloads: String,

    /// Custom request header, `"Name: Value"`. Repeatable.
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Worker count / context-pool size (1-30).
    #[arg(short = 'w', long = "workers", default_value_t = 10)]
    pub workers: u16,

    /// HTTP and navigation timeout in seconds (1-60).
    #[arg(short = 't', long = "timeout", default_value_t = 8)]
    pub timeout: u64,

    /// Post-load dwell for dialog capture, in seconds (1-30).
    #[arg(short = 'a', long = "alert-timeout", default_value_t = 6)]
    pub alert_timeout: u64,

    /// Soft cap on payloads per batch (1-1000, capped at 15).
    #[arg(short = 'b', long = "batch-size", default_value_t = 15)]
    pub batch_size: u32,

    /// Global requests/second (1-100).
    #[arg(short = 'r', long = "rate-limit", default_value_t = 12)]
    pub rate_limit: u16,

    /// Emit structured JSON results instead of text.
    #[arg(short = 'j', long = "json")]
    pub json: bool,

    /// Output file path; a timestamp is injected before the extension.
    #[arg(short = 'o', long = "output")]
    pub output: Option<String>,

    /// Telegram bot token for finding notifications.
    #[arg(long = "notify-token")]
    pub notify_token: Option<String>,

    /// Telegram chat id for finding notifications.
    #[arg(long = "notify-chat-id")]
    pub notify_chat_id: Option<String>,

    /// Verbose (info-level) logging.
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Debug (trace-level) logging.
    #[arg(long, global = true)]
    pub debug: bool,
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_and_list_are_mutually_exclusive() {
        let result = Cli::try_parse_from([
            "xss-hunter",
            "-d",
            "https://a/?q=1",
            "-l",
            "urls.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn defaults_match_spec_table() {
        let cli = Cli::try_parse_from(["xss-hunter", "-d", "https://a/?q=1"]).unwrap();
        assert_eq!(cli.workers, 10);
        assert_eq!(cli.timeout, 8);
        assert_eq!(cli.alert_timeout, 6);
        assert_eq!(cli.batch_size, 15);
        assert_eq!(cli.rate_limit, 12);
        assert!(!cli.json);
    }
}
