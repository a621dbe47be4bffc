//! Default request header set (§6.3): a browser-plausible Chrome profile
//! with randomised version/viewport/memory/language, overridable by custom
//! headers parsed from `-H` flags.

use std::collections::HashMap;

use rand::seq::SliceRandom;

const CHROME_VERSIONS: [&str; 3] = ["122.0.6261.112", "122.0.6261.94", "122.0.6261.69"];
const VIEWPORT_WIDTHS: [u16; 5] = [1366, 1440, 1536, 1920, 2560];
const DEVICE_MEMORIES: [u8; 4] = [2, 4, 8, 16];
const LANGUAGES: [&str; 4] = [
    "en-US,en;q=0.9",
    "en-US,en;q=0.9,es;q=0.8",
    "en-GB,en;q=0.9,en-US;q=0.8",
    "en-US,en;q=0.9,fr;q=0.8",
];

/// Builds the default Chrome-shaped header set with randomised fields.
pub fn default_headers() -> HashMap<String, String> {
    let mut rng = rand::thread_rng();
    let chrome_version = CHROME_VERSIONS.choose(&mut rng).unwrap();
    let viewport = VIEWPORT_WIDTHS.choose(&mut rng).unwrap();
    let memory = DEVICE_MEMORIES.choose(&mut rng).unwrap();
    let language = LANGUAGES.choose(&mut rng).unwrap();

    let mut headers = HashMap::new();
    headers.insert(
        "User-Agent".to_string(),
        format!(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{chrome_version} Safari/537.36"
        ),
    );
    headers.insert(
        "Accept".to_string(),
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8".to_string(),
    );
    headers.insert("Accept-Language".to_string(), language.to_string());
    headers.insert("Accept-Encoding".to_string(), "gzip, deflate, br".to_string());
    headers.insert(
        "Sec-Ch-Ua".to_string(),
        format!(r#""Chromium";v="{chrome_version}", "Google Chrome";v="{chrome_version}", "Not(A:Brand";v="24""#),
    );
    headers.insert("Sec-Ch-Ua-Mobile".to_string(), "?0".to_string());
    headers.insert("Sec-Ch-Ua-Platform".to_string(), "\"Windows\"".to_string());
    headers.insert("Sec-Fetch-Dest".to_string(), "document".to_string());
    headers.insert("Sec-Fetch-Mode".to_string(), "navigate".to_string());
    headers.insert("Sec-Fetch-Site".to_string(), "none".to_string());
    headers.insert("Sec-Fetch-User".to_string(), "?1".to_string());
    headers.insert("Upgrade-Insecure-Requests".to_string(), "1".to_string());
    headers.insert("DNT".to_string(), "1".to_string());
    headers.insert("Viewport-Width".to_string(), viewport.to_string());
    headers.insert("Device-Memory".to_string(), memory.to_string());
    headers
}

/// Title-cases a header name (`content-type` -> `Content-Type`) the way
/// custom headers are normalised before merging (§6.1).
pub fn title_case_header(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Parses `-H "Name: Value"` flags (first `:` only, trimmed), title-cases
/// names, and overrides the default set on conflict (§6.1, §6.3).
pub fn parse_custom_headers(raw: &[String]) -> Result<HashMap<String, String>, String> {
    let mut out = HashMap::new();
    for entry in raw {
        let Some((name, value)) = entry.split_once(':') else {
            return Err(format!("invalid header format: {entry}"));
        };
        let name = title_case_header(name.trim());
        let value = value.trim().to_string();
        if name.is_empty() {
            return Err(format!("invalid header format: {entry}"));
        }
        out.insert(name, value);
    }
    Ok(out)
}

pub fn merge_headers(
    defaults: HashMap<String, String>,
    custom: HashMap<String, String>,
) -> HashMap<String, String> {
    let mut merged = defaults;
    merged.extend(custom);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_cases_header_names() {
        assert_eq!(title_case_header("x-custom-header"), "X-Custom-Header");
    }

    #[test]
    fn custom_header_overrides_default() {
        let defaults = default_headers();
        let custom = parse_custom_headers(&["User-Agent: custom-ua".to_string()]).unwrap();
        let merged = merge_headers(defaults, custom);
        assert_eq!(merged.get("User-Agent").unwrap(), "custom-ua");
    }

    #[test]
    fn rejects_header_without_colon() {
        assert!(parse_custom_headers(&["NoColonHere".to_string()]).is_err());
    }
}
