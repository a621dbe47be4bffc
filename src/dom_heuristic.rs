//! Static DOM-sink heuristic (§4.6). Pre-filter only — a true positive here
//! only means "worth a browser check", not "vulnerable".

use once_cell::sync::Lazy;
use regex::Regex;

static PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?is)getElementById\([^)]*\)\s*\.\s*innerHTML").unwrap(),
        Regex::new(r"(?is)location\s*\.\s*(search|hash|href).*?(innerHTML|eval|document\.write)")
            .unwrap(),
        Regex::new(r"(?is)URLSearchParams.*?innerHTML").unwrap(),
        Regex::new(r"(?is)window\.onload.*?innerHTML").unwrap(),
        Regex::new(r"(?is)document\.write\s*\(").unwrap(),
        Regex::new(r"(?is)\beval\s*\(").unwrap(),
        Regex::new(r"(?is)setTimeout\s*\(").unwrap(),
        Regex::new(r"(?is)setInterval\s*\(").unwrap(),
        Regex::new(r"(?is)new\s+Function\s*\(").unwrap(),
    ]
});

/// §4.6: true if any static DOM-sink indicator is found in `body`.
pub fn has_dom_sink_indicator(body: &str) -> bool {
    PATTERNS.iter().any(|p| p.is_match(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_get_element_by_id_inner_html() {
        assert!(has_dom_sink_indicator(
            "document.getElementById('greeting').innerHTML = new URLSearchParams(location.search).get('name')"
        ));
    }

    #[test]
    fn detects_bare_eval() {
        assert!(has_dom_sink_indicator("eval(userInput)"));
    }

    #[test]
    fn no_match_on_plain_html() {
        assert!(!has_dom_sink_indicator("<div>hello</div>"));
    }
}
