//! Reflection pre-filter (§4.5). False positives here are acceptable — the
//! alert validator (§4.7) is the oracle.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;

static SVG_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?is)<svg[^>]*>(.*?)</svg>").unwrap(),
        Regex::new(r"(?i)<svg[^>]*onload\s*=").unwrap(),
        Regex::new(r"(?i)<svg[^>]*on\w+\s*=").unwrap(),
    ]
});

static JS_URL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)javascript:.*(alert|confirm|prompt|eval)").unwrap(),
        Regex::new(r"(?i)data:text/html.*base64").unwrap(),
    ]
});

static EVENT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r#"(?i)on\w+\s*=\s*["']?.*(alert|confirm|prompt|eval)"#).unwrap(),
        Regex::new(r#"(?i)on\w+\s*=\s*["']?.*(location|document|window|this)"#).unwrap(),
    ]
});

static DATA_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?is)data:text/html.*,").unwrap(),
        Regex::new(r"(?is)data:image/svg.*,").unwrap(),
        Regex::new(r"(?is)data:application/x-.*,").unwrap(),
    ]
});

static EXPRESSION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)expression\s*\(").unwrap(),
        Regex::new(r"(?i)expr\s*\(").unwrap(),
    ]
});

static CONCAT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?s)\$\{.*\}").unwrap(),
        Regex::new(r#"["'][\s+]*\+[\s+]*["']"#).unwrap(),
        Regex::new(r"`[^`]*\$\{[^}]*\}[^`]*`").unwrap(),
    ]
});

static CONSTRUCTOR_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"constructor\s*\(").unwrap(),
        Regex::new(r"constructor\s*\[").unwrap(),
        Regex::new(r"\[constructor\]").unwrap(),
    ]
});

static ESCAPE_SEQUENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\\x[0-9a-f]{2}|\\u[0-9a-f]{4}|&#x[0-9a-f]+;)").unwrap());

/// All encoded variations of `payload` that §4.5 rule 2 requires checking.
pub fn encoded_variations(payload: &str) -> Vec<String> {
    let mut variations = vec![
        urlencoding::encode(payload).into_owned(),
        percent_encode_plus(payload),
        html_escape::encode_text(payload).into_owned(),
        html_escape::encode_text_minimal(payload).into_owned(),
        urlencoding::encode(&urlencoding::encode(payload)).into_owned(),
        html_escape::encode_text(&html_escape::encode_text(payload).into_owned()).into_owned(),
        unicode_escape(payload),
        BASE64.encode(payload),
    ];
    variations.push(decimal_ncr(payload));
    variations.push(hex_ncr(payload));
    variations
}

fn percent_encode_plus(s: &str) -> String {
    urlencoding::encode(s).replace("%20", "+")
}

fn unicode_escape(s: &str) -> String {
    s.chars().map(|c| format!("\\u{:04x}", c as u32)).collect()
}

fn decimal_ncr(s: &str) -> String {
    s.chars().map(|c| format!("&#{};", c as u32)).collect()
}

fn hex_ncr(s: &str) -> String {
    s.chars().map(|c| format!("&#x{:x};", c as u32)).collect()
}

/// Decodes `\xNN`, `\uNNNN`, and `&#xNN;` escape sequences embedded in a
/// payload back to their literal characters (§4.5 rule 4).
fn decode_escape_sequences(payload: &str) -> Option<String> {
    if !ESCAPE_SEQUENCE.is_match(payload) {
        return None;
    }
    let mut out = String::new();
    let mut rest = payload;
    while let Some(m) = ESCAPE_SEQUENCE.find(rest) {
        out.push_str(&rest[..m.start()]);
        let token = &rest[m.start()..m.end()];
        let hex = token
            .trim_start_matches("\\x")
            .trim_start_matches("\\u")
            .trim_start_matches("&#x")
            .trim_end_matches(';');
        let code = u32::from_str_radix(hex, 16).ok()?;
        out.push(char::from_u32(code)?);
        rest = &rest[m.end()..];
    }
    out.push_str(rest);
    Some(out)
}

/// §4.5: does `payload` reflect in raw response body `body`?
pub fn is_reflected(body: &str, payload: &str) -> bool {
    if body.contains(payload) {
        return true;
    }
    if html_escape::decode_html_entities(body).contains(payload) {
        return true;
    }
    if encoded_variations(payload).iter().any(|v| body.contains(v)) {
        return true;
    }

    let lower = payload.to_lowercase();
    if lower.contains("svg") && SVG_PATTERNS.iter().any(|p| p.is_match(body)) {
        return true;
    }
    if lower.contains("javascript:") && JS_URL_PATTERNS.iter().any(|p| p.is_match(body)) {
        return true;
    }
    let has_event_name = ["onload", "onerror", "onmouseover", "onclick", "onfocus"]
        .iter()
        .any(|e| lower.contains(e));
    if has_event_name && EVENT_PATTERNS.iter().any(|p| p.is_match(body)) {
        return true;
    }
    if lower.contains("data:") && DATA_PATTERNS.iter().any(|p| p.is_match(body)) {
        return true;
    }
    if lower.contains("expression") && EXPRESSION_PATTERNS.iter().any(|p| p.is_match(body)) {
        return true;
    }
    if (payload.contains('`') || payload.contains('+') || payload.contains("${"))
        && CONCAT_PATTERNS.iter().any(|p| p.is_match(body))
    {
        return true;
    }
    if payload.contains("constructor") && CONSTRUCTOR_PATTERNS.iter().any(|p| p.is_match(body)) {
        return true;
    }
    if let Some(decoded) = decode_escape_sequences(payload) {
        if body.contains(&decoded) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_reflection() {
        assert!(is_reflected(
            "<div><script>alert(1)</script></div>",
            "<script>alert(1)</script>"
        ));
    }

    #[test]
    fn html_escaped_reflection() {
        let payload = "<img src=x onerror=alert(7)>";
        let body = html_escape::encode_text(payload).into_owned();
        assert!(is_reflected(&body, payload));
    }

    #[test]
    fn no_reflection() {
        assert!(!is_reflected("<div>hello</div>", "<script>alert(1)</script>"));
    }

    #[test]
    fn escape_sequence_decode_roundtrip() {
        let encoded = "\\x3cscript\\x3e";
        assert_eq!(decode_escape_sequences(encoded).unwrap(), "<script>");
    }

    #[test]
    fn encoded_variations_reverse_to_original() {
        let payload = "<script>alert(1)</script>";
        let variations = encoded_variations(payload);
        let percent = &variations[0];
        assert_eq!(urlencoding::decode(percent).unwrap(), payload);
        let html = &variations[2];
        assert_eq!(html_escape::decode_html_entities(html).as_ref(), payload);
    }
}
