//! URL validation, parameter extraction, and dedup signatures (§3, §4.4).
//!
//! Query parameters placed after a fragment (`…/#/path?p=v`, common in SPA
//! routers) must be recognised the same way as ordinary query parameters, so
//! this module tokenises the query string itself rather than relying on
//! `url::Url::query()`, which treats everything after `#` as an opaque
//! fragment.

use crate::model::QueryParam;

/// Returns the raw (still percent-encoded) query string, whichever side of a
/// `#` it lives on.
fn raw_query_part(url: &str) -> Option<&str> {
    if let Some(frag_pos) = url.find('#') {
        let after_fragment = &url[frag_pos + 1..];
        if let Some(q) = after_fragment.find('?') {
            return Some(&after_fragment[q + 1..]);
        }
    }
    url.find('?').map(|q| &url[q + 1..])
}

/// Splits a raw query string into `(name, value)` tokens in original order.
/// A token without `=` yields `value: None` and is not an injection target.
fn parse_params(query: &str) -> Vec<QueryParam> {
    query
        .split('&')
        .filter(|tok| !tok.is_empty())
        .filter_map(|tok| match tok.split_once('=') {
            Some((name, value)) if !name.is_empty() => Some(QueryParam {
                name: name.to_string(),
                value: Some(value.to_string()),
            }),
            None if !tok.is_empty() => Some(QueryParam {
                name: tok.to_string(),
                value: None,
            }),
            _ => None,
        })
        .collect()
}

/// §4.4 `validate(url)`.
pub fn validate(url: &str) -> bool {
    let decoded = urlencoding::decode(url)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| url.to_string());

    if !(decoded.starts_with("http://") || decoded.starts_with("https://")) {
        return false;
    }
    let Some(query) = raw_query_part(&decoded) else {
        return false;
    };
    parse_params(query)
        .iter()
        .any(|p| p.value.is_some() && !p.name.is_empty())
}

/// Returns the parameter names+values present in `url`, in original order.
/// Parameters without `=` are included (their `value` is `None`) since some
/// callers (parameter enumeration) need to see every named parameter, but
/// injection targets are filtered separately in [`inject`].
pub fn params(url: &str) -> Vec<QueryParam> {
    raw_query_part(url).map(parse_params).unwrap_or_default()
}

/// §3 URL signature: `scheme://host/path?name1=&name2=…`, values stripped,
/// parameter order preserved. Parameters without `=` are excluded, matching
/// the reference loader's dedup behaviour.
pub fn signature(url: &str) -> String {
    let base = base_without_query(url);
    let names: Vec<String> = params(url)
        .into_iter()
        .filter(|p| p.value.is_some())
        .map(|p| format!("{}=", p.name))
        .collect();
    if names.is_empty() {
        base
    } else {
        format!("{base}?{}", names.join("&"))
    }
}

/// `scheme://host/path`, dropping query and fragment.
fn base_without_query(url: &str) -> String {
    let without_fragment = url.split('#').next().unwrap_or(url);
    let without_query = without_fragment.split('?').next().unwrap_or(without_fragment);
    without_query.to_string()
}

/// Host as used by [`parameter_context`] and the HEAD warm-up: everything
/// between `scheme://` and the next `/`, `?`, or `#`.
pub fn host(url: &str) -> String {
    let after_scheme = url
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(url);
    let end = after_scheme
        .find(['/', '?', '#'])
        .unwrap_or(after_scheme.len());
    after_scheme[..end].to_string()
}

fn path(url: &str) -> String {
    let after_scheme = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    let after_host = after_scheme
        .find('/')
        .map(|i| &after_scheme[i..])
        .unwrap_or("/");
    let before_query_or_fragment_len = after_host.find(['?', '#']).unwrap_or(after_host.len());
    after_host[..before_query_or_fragment_len].to_string()
}

/// §3 parameter context: `host + normalised_path + ":" + lowercased_param_name`.
pub fn parameter_context(url: &str, param: &str) -> String {
    let normalized_path = path(url).trim_end_matches('/').to_string();
    format!("{}{}:{}", host(url), normalized_path, param.to_lowercase())
}

/// §4.4 `inject(url, payload)`: one candidate URL per parameter that
/// originally carried an `=` sign, with that parameter's value replaced by
/// the percent-encoded payload. Other parameters keep their original,
/// untouched encoding.
pub fn inject(url: &str, payload: &str) -> Vec<(String, String)> {
    let Some(query) = raw_query_part(url) else {
        return Vec::new();
    };
    let tokens: Vec<&str> = query.split('&').filter(|t| !t.is_empty()).collect();
    let encoded_payload = urlencoding::encode(payload);

    let mut out = Vec::new();
    for (idx, tok) in tokens.iter().enumerate() {
        let Some((name, _)) = tok.split_once('=') else {
            continue;
        };
        if name.is_empty() {
            continue;
        }
        let new_query: String = tokens
            .iter()
            .enumerate()
            .map(|(i, t)| {
                if i == idx {
                    format!("{name}={encoded_payload}")
                } else {
                    t.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("&");

        let new_url = replace_query(url, &new_query);
        out.push((new_url, name.to_string()));
    }
    out
}

/// Rebuilds `url` with its query portion replaced, preserving whatever came
/// before it (including a fragment-embedded query, §4.4).
fn replace_query(url: &str, new_query: &str) -> String {
    if let Some(frag_pos) = url.find('#') {
        let after_fragment = &url[frag_pos + 1..];
        if let Some(q) = after_fragment.find('?') {
            let prefix = &url[..frag_pos + 1 + q + 1];
            return format!("{prefix}{new_query}");
        }
    }
    if let Some(q) = url.find('?') {
        return format!("{}{new_query}", &url[..q + 1]);
    }
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_basic_url() {
        assert!(validate("https://example.com/x?q=1"));
    }

    #[test]
    fn validate_rejects_missing_query() {
        assert!(!validate("https://example.com/x"));
    }

    #[test]
    fn validate_rejects_non_http_scheme() {
        assert!(!validate("ftp://example.com/x?q=1"));
    }

    #[test]
    fn validate_accepts_fragment_embedded_params() {
        assert!(validate("http://testhtml5.vulnweb.com/#/redir?url=value"));
    }

    #[test]
    fn validate_rejects_nameless_param() {
        assert!(!validate("https://example.com/x?=1"));
    }

    #[test]
    fn signature_strips_values_keeps_order() {
        assert_eq!(
            signature("https://a/x?u=1&v=2"),
            "https://a/x?u=&v="
        );
    }

    #[test]
    fn signature_ignores_value_differences() {
        assert_eq!(
            signature("https://a/x?u=1"),
            signature("https://a/x?u=999")
        );
    }

    #[test]
    fn signature_is_sensitive_to_name_order() {
        assert_ne!(
            signature("https://a/x?u=1&v=2"),
            signature("https://a/x?v=2&u=1")
        );
    }

    #[test]
    fn signature_excludes_nameless_params() {
        assert_eq!(
            signature("https://a/x?u=1&v=2&standalone"),
            "https://a/x?u=&v="
        );
    }

    #[test]
    fn inject_targets_only_equals_params() {
        let out = inject("https://a/x?u=1&standalone&v=2", "<script>");
        assert_eq!(out.len(), 2);
        assert!(out.iter().any(|(_, p)| p == "u"));
        assert!(out.iter().any(|(_, p)| p == "v"));
        assert!(out[0].0.contains("u=%3Cscript%3E") || out[1].0.contains("u=%3Cscript%3E"));
    }

    #[test]
    fn parameter_context_lowercases_and_normalises_path() {
        assert_eq!(
            parameter_context("https://Example.com/x/?Q=1", "Q"),
            "Example.com/x:q"
        );
    }
}
