use std::collections::HashMap;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use xss_hunter::http_client::{build_client, HttpClient};

#[tokio::test]
async fn get_returns_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reflect"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<div>hello</div>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = build_client(10, 8);
    let http = HttpClient::new(client, HashMap::new());
    let url = format!("{}/reflect", server.uri());
    let (status, body) = http.get(&url).await.unwrap();

    assert_eq!(status, 200);
    assert_eq!(body, "<div>hello</div>");
}

#[tokio::test]
async fn attached_headers_reach_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/headers"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = build_client(10, 8);
    let mut headers = HashMap::new();
    headers.insert("X-Scan-Id".to_string(), "abc123".to_string());
    let http = HttpClient::new(client, headers);
    let url = format!("{}/headers", server.uri());
    let (status, _) = http.get(&url).await.unwrap();

    assert_eq!(status, 200);
}
