use serde::{Deserialize, Serialize};

/// A single query parameter as it appeared in an input URL.
///
/// `value` is `None` for a bare name with no `=`; §4.4 excludes those from
/// injection but they still count toward `validate`'s "has at least one
/// parameter" check only when some *other* parameter in the URL has a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParam {
    pub name: String,
    pub value: Option<String>,
}

/// Classification of a confirmed finding (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum XssType {
    Reflected,
    Dom,
    Both,
}

impl XssType {
    pub fn label(&self) -> &'static str {
        match self {
            XssType::Reflected => "Reflected",
            XssType::Dom => "Dom",
            XssType::Both => "Both",
        }
    }
}

/// `(timestamp, host, parameter, payload, injected_url, alert_text, xss_type)` — §3.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub timestamp: String,
    pub domain: String,
    pub parameter: String,
    pub payload: String,
    pub url: String,
    pub alert_text: String,
    #[serde(rename = "type")]
    pub xss_type: XssType,
}

/// A scan task: `(url, parameter)`, consumed once by a worker (§3).
#[derive(Debug, Clone)]
pub struct ScanTask {
    pub url: String,
    pub parameter: String,
}

/// Outcome of the alert validator (§4.7), before classification is applied.
#[derive(Debug, Clone, Default)]
pub struct AlertOutcome {
    pub alert_fired: bool,
    pub alert_text: Option<String>,
    pub reflected: bool,
    pub dom_evidence: bool,
}

impl AlertOutcome {
    /// Classification rules from §4.7. Returns `None` when no alert fired —
    /// the "no finding" case.
    pub fn classify(&self) -> Option<XssType> {
        if !self.alert_fired {
            return None;
        }
        Some(match (self.reflected, self.dom_evidence) {
            (true, true) => XssType::Both,
            (true, false) => XssType::Reflected,
            (false, true) => XssType::Dom,
            (false, false) => XssType::Reflected, // documented default, §9
        })
    }
}
