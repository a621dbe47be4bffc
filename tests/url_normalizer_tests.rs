use xss_hunter::url_normalizer::{inject, parameter_context, signature, validate};

#[test]
fn end_to_end_dedup_by_signature() {
    let urls = [
        "https://shop.example.com/search?q=shoes&sort=asc",
        "https://shop.example.com/search?q=boots&sort=desc",
        "https://shop.example.com/search?sort=asc&q=shoes",
    ];
    assert!(urls.iter().all(|u| validate(u)));
    assert_eq!(signature(urls[0]), signature(urls[1]));
    assert_ne!(signature(urls[0]), signature(urls[2]));
}

#[test]
fn injection_targets_match_parameter_contexts() {
    let url = "https://shop.example.com/search?q=shoes&sort=asc";
    let targets = inject(url, "<svg onload=alert(1)>");
    assert_eq!(targets.len(), 2);

    for (injected_url, parameter) in &targets {
        let context = parameter_context(url, parameter);
        assert_eq!(context, format!("shop.example.com/search:{}", parameter.to_lowercase()));
        assert!(injected_url.contains(parameter));
    }
}
