use thiserror::Error;

/// Internal error taxonomy. Only `InputInvalid` and a browser start failure
/// are fatal; everything else is swallowed by the orchestrator, counted in
/// `Stats`, and turned into "no finding" for the task that hit it.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid input: {0}")]
    InputInvalid(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("navigation error: {0}")]
    Navigation(String),

    #[error("instrumentation error: {0}")]
    Instrumentation(String),

    #[error("failed to write results: {0}")]
    SinkWrite(String),

    #[error("notification failed: {0}")]
    NotificationFailed(String),
}

impl ScanError {
    /// Coarse label used for the stats error-kind histogram (§4.10).
    pub fn kind(&self) -> &'static str {
        match self {
            ScanError::InputInvalid(_) => "InputInvalid",
            ScanError::Transport(_) => "Transport",
            ScanError::Navigation(_) => "Navigation",
            ScanError::Instrumentation(_) => "Instrumentation",
            ScanError::SinkWrite(_) => "SinkWrite",
            ScanError::NotificationFailed(_) => "NotificationFailed",
        }
    }
}
