use bitrise_build_log_cli::commands::builds::{
  abort_build, abort_build_params, get_build_bitrise_yml, list_build_workflows, list_builds, list_builds_params,
  AbortBuildArgs, BuildRef, ListBuildsArgs,
};
use bitrise_build_log_cli::http::{CallApi, CallApiParams, HttpError};
use reqwest::Method;
use serde_json::json;
use std::cell::RefCell;

#[derive(Default)]
struct RecordingApi {
  calls: RefCell<Vec<CallApiParams>>,
  fail_with: Option<u16>,
}

impl CallApi for RecordingApi {
  fn call_api(&self, params: &CallApiParams) -> Result<String, HttpError> {
    self.calls.borrow_mut().push(params.clone());
    match self.fail_with {
      Some(status) => Err(HttpError::Status(status)),
      None => Ok(r#"{"data":"ok"}"#.to_string()),
    }
  }
}

fn build() -> BuildRef {
  BuildRef {
    app_slug: "app-1".to_string(),
    build_slug: "build-1".to_string(),
  }
}

#[test]
fn list_builds_without_app_uses_global_endpoint() {
  let params = list_builds_params(&ListBuildsArgs::default());
  assert_eq!(params.path, "/builds");
  assert!(params.params.is_empty());
}

#[test]
fn list_builds_forwards_only_supplied_filters() {
  let args = ListBuildsArgs {
    app_slug: Some("app-1".to_string()),
    branch: Some("main".to_string()),
    workflow: Some(String::new()),
    status: Some(2),
    limit: Some(10),
    ..ListBuildsArgs::default()
  };
  let params = list_builds_params(&args);

  assert_eq!(params.path, "/apps/app-1/builds");
  assert_eq!(
    params.params,
    vec![
      ("branch".to_string(), "main".to_string()),
      ("status".to_string(), "2".to_string()),
      ("limit".to_string(), "10".to_string()),
    ]
  );
}

#[test]
fn list_builds_returns_raw_body() {
  let api = RecordingApi::default();
  let body = list_builds(&api, &ListBuildsArgs::default()).expect("list");
  assert_eq!(body, r#"{"data":"ok"}"#);
}

#[test]
fn build_scoped_endpoints() {
  let api = RecordingApi::default();
  get_build_bitrise_yml(&api, &build()).expect("yml");
  list_build_workflows(&api, "app-1").expect("workflows");

  let calls = api.calls.borrow();
  assert_eq!(calls[0].path, "/apps/app-1/builds/build-1/bitrise.yml");
  assert_eq!(calls[1].path, "/apps/app-1/build-workflows");
  assert!(calls.iter().all(|call| call.method == Method::GET));
}

#[test]
fn abort_build_defaults_reason_and_flags() {
  let params = abort_build_params(&AbortBuildArgs::new(build()));

  assert_eq!(params.method, Method::POST);
  assert_eq!(params.path, "/apps/app-1/builds/build-1/abort");
  assert_eq!(
    params.body,
    Some(json!({
      "abort_reason": "aborted via MCP",
      "abort_with_success": false,
      "skip_git_status_report": false,
      "skip_notifications": false
    }))
  );
}

#[test]
fn abort_build_failure_reports_call_api_error() {
  let api = RecordingApi {
    fail_with: Some(500),
    ..RecordingApi::default()
  };
  let args = AbortBuildArgs {
    abort_reason: Some("flaky".to_string()),
    ..AbortBuildArgs::new(build())
  };

  let err = abort_build(&api, &args).expect_err("should fail");

  assert_eq!(err.error_code, "CALL_API_FAILED");
  assert_eq!(err.details.as_deref(), Some("call api: unexpected status code 500"));
  assert_eq!(api.calls.borrow()[0].body.as_ref().unwrap()["abort_reason"], "flaky");
}
