//! Validated run configuration (§6.2), built from [`crate::cli::Cli`].
//! Out-of-range values are fatal (`InputInvalid`, exit 2).

use crate::cli::Cli;
use crate::error::ScanError;
use crate::sink::OutputMode;

pub struct Config {
    pub domain: Option<String>,
    pub list: Option<String>,
    pub payloads_path: String,
    pub raw_headers: Vec<String>,
    pub workers: u16,
    pub request_timeout_secs: u64,
    pub alert_timeout_secs: u64,
    pub batch_size: u32,
    pub rate_limit: u16,
    pub output_mode: OutputMode,
    pub output: Option<String>,
    pub notify_token: Option<String>,
    pub notify_chat_id: Option<String>,
    pub verbose: bool,
    pub debug: bool,
}

fn in_range<T: PartialOrd + std::fmt::Display + Copy>(
    name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<T, ScanError> {
    if value < min || value > max {
        return Err(ScanError::InputInvalid(format!(
            "{name} must be between {min} and {max}, got {value}"
        )));
    }
    Ok(value)
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self, ScanError> {
        if cli.domain.is_none() && cli.list.is_none() {
            return Err(ScanError::InputInvalid(
                "one of -d/--domain or -l/--list is required".into(),
            ));
        }

        let workers = in_range("workers", cli.workers, 1, 30)?;
        let request_timeout_secs = in_range("timeout", cli.timeout, 1, 60)?;
        let alert_timeout_secs = in_range("alert-timeout", cli.alert_timeout, 1, 30)?;
        let batch_size = in_range("batch-size", cli.batch_size, 1, 1000)?.min(15);
        let rate_limit = in_range("rate-limit", cli.rate_limit, 1, 100)?;

        Ok(Self {
            domain: cli.domain,
            list: cli.list,
            payloads_path: cli.payloads,
            raw_headers: cli.headers,
            workers,
            request_timeout_secs,
            alert_timeout_secs,
            batch_size,
            rate_limit,
            output_mode: if cli.json { OutputMode::Json } else { OutputMode::Text },
            output: cli.output,
            notify_token: cli.notify_token,
            notify_chat_id: cli.notify_chat_id,
            verbose: cli.verbose,
            debug: cli.debug,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn rejects_worker_count_out_of_range() {
        let cli = Cli::parse_from(["xss-hunter", "-d", "https://a/?q=1", "-w", "99"]);
        assert!(Config::from_cli(cli).is_err());
    }

    #[test]
    fn batch_size_is_capped_at_fifteen() {
        let cli = Cli::parse_from(["xss-hunter", "-d", "https://a/?q=1", "-b", "500"]);
        let config = Config::from_cli(cli).unwrap();
        assert_eq!(config.batch_size, 15);
    }

    #[test]
    fn requires_domain_or_list() {
        let cli = Cli::parse_from(["xss-hunter"]);
        assert!(Config::from_cli(cli).is_err());
    }
}
