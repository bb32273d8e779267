use bitrise_build_log_cli::http::{
  build_api_url, ApiClient, CallApi, CallApiParams, FetchError, HttpError, HttpLogFetcher, RemoteLogFetcher,
};
use mockito::Matcher;
use serde_json::json;
use std::time::Duration;

#[test]
fn build_api_url_joins_with_single_slash() {
  assert_eq!(
    build_api_url("https://api.bitrise.io/v0.1/", "/apps/abc/builds", &[]),
    "https://api.bitrise.io/v0.1/apps/abc/builds"
  );
  assert_eq!(
    build_api_url("https://api.bitrise.io/v0.1", "builds", &[]),
    "https://api.bitrise.io/v0.1/builds"
  );
}

#[test]
fn build_api_url_encodes_query_in_order() {
  let params = vec![
    ("branch".to_string(), "feature/login fix".to_string()),
    ("limit".to_string(), "5".to_string()),
  ];
  let url = build_api_url("https://api.bitrise.io/v0.1", "/builds", &params);
  assert_eq!(url, "https://api.bitrise.io/v0.1/builds?branch=feature%2Flogin%20fix&limit=5");
}

#[test]
fn call_api_sends_token_and_returns_body() {
  let mut server = mockito::Server::new();
  let mock = server
    .mock("GET", "/apps/app-1/builds")
    .match_header("authorization", "secret-pat")
    .match_header("accept", "application/json")
    .match_query(Matcher::UrlEncoded("branch".into(), "main".into()))
    .with_status(200)
    .with_body(r#"{"data":[]}"#)
    .create();

  let client = ApiClient::new(&server.url(), "secret-pat").expect("client");
  let body = client
    .call_api(&CallApiParams::get("/apps/app-1/builds").with_param("branch", "main"))
    .expect("call api");

  assert_eq!(body, r#"{"data":[]}"#);
  mock.assert();
}

#[test]
fn call_api_posts_json_body() {
  let mut server = mockito::Server::new();
  let mock = server
    .mock("POST", "/apps/a/builds/b/abort")
    .match_body(Matcher::Json(json!({ "abort_reason": "stop" })))
    .with_status(200)
    .with_body("{}")
    .create();

  let client = ApiClient::new(&server.url(), "pat").expect("client");
  client
    .call_api(&CallApiParams::post("/apps/a/builds/b/abort", json!({ "abort_reason": "stop" })))
    .expect("call api");

  mock.assert();
}

#[test]
fn call_api_rejects_error_status() {
  let mut server = mockito::Server::new();
  let _mock = server.mock("GET", "/builds").with_status(401).create();

  let client = ApiClient::new(&server.url(), "bad").expect("client");
  let err = client.call_api(&CallApiParams::get("/builds")).expect_err("should fail");

  assert!(matches!(err, HttpError::Status(401)));
  assert_eq!(err.to_string(), "unexpected status code 401");
}

#[test]
fn fetcher_returns_raw_bytes() {
  let mut server = mockito::Server::new();
  let mock = server
    .mock("GET", "/raw.log")
    .with_status(200)
    .with_body("line1\nline2\n")
    .create();

  let fetcher = HttpLogFetcher::new().expect("fetcher");
  let body = fetcher.fetch(&format!("{}/raw.log", server.url())).expect("fetch");

  assert_eq!(body, b"line1\nline2\n");
  mock.assert();
}

#[test]
fn fetcher_reports_non_success_status() {
  let mut server = mockito::Server::new();
  let _mock = server.mock("GET", "/expired.log").with_status(403).create();

  let fetcher = HttpLogFetcher::new().expect("fetcher");
  let err = fetcher
    .fetch(&format!("{}/expired.log", server.url()))
    .expect_err("should fail");

  assert!(matches!(err, FetchError::Status(403)));
}

#[test]
fn fetcher_gives_up_on_slow_download() {
  let mut server = mockito::Server::new();
  let _mock = server
    .mock("GET", "/slow.log")
    .with_status(200)
    .with_body_from_request(|_request| {
      std::thread::sleep(Duration::from_millis(800));
      b"late".to_vec()
    })
    .create();

  let fetcher = HttpLogFetcher::with_timeout(Duration::from_millis(100)).expect("fetcher");
  let err = fetcher
    .fetch(&format!("{}/slow.log", server.url()))
    .expect_err("should time out");

  assert!(matches!(err, FetchError::Timeout(timeout) if timeout == Duration::from_millis(100)));
  assert_eq!(err.to_string(), "http get: timed out after 100ms");
}
