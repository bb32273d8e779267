use crate::http::{encode_segment, CallApi, CallApiParams, HttpError};
use crate::output::{error_output, ErrorOutput};
use serde_json::json;

pub const DEFAULT_ABORT_REASON: &str = "aborted via MCP";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListBuildsArgs {
  pub app_slug: Option<String>,
  pub sort_by: Option<String>,
  pub branch: Option<String>,
  pub workflow: Option<String>,
  pub status: Option<i64>,
  pub next: Option<String>,
  pub limit: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRef {
  pub app_slug: String,
  pub build_slug: String,
}

impl BuildRef {
  fn path(&self, suffix: &str) -> String {
    format!(
      "/apps/{}/builds/{}{suffix}",
      encode_segment(&self.app_slug),
      encode_segment(&self.build_slug)
    )
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbortBuildArgs {
  pub build: BuildRef,
  pub abort_reason: Option<String>,
  pub abort_with_success: bool,
  pub skip_git_status_report: bool,
  pub skip_notifications: bool,
}

impl AbortBuildArgs {
  pub fn new(build: BuildRef) -> Self {
    Self {
      build,
      abort_reason: None,
      abort_with_success: false,
      skip_git_status_report: false,
      skip_notifications: false,
    }
  }
}

fn map_http_error(err: HttpError) -> ErrorOutput {
  error_output("CALL_API_FAILED", "Failed to call the Bitrise API.", Some(format!("call api: {err}")))
}

fn call(api: &impl CallApi, params: CallApiParams) -> Result<String, ErrorOutput> {
  api.call_api(&params).map_err(map_http_error)
}

pub fn list_builds_params(args: &ListBuildsArgs) -> CallApiParams {
  let path = match args.app_slug.as_deref().filter(|slug| !slug.is_empty()) {
    Some(slug) => format!("/apps/{}/builds", encode_segment(slug)),
    None => "/builds".to_string(),
  };
  let mut params = CallApiParams::get(path);
  let strings = [
    ("sort_by", &args.sort_by),
    ("branch", &args.branch),
    ("workflow", &args.workflow),
  ];
  for (key, value) in strings {
    if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
      params = params.with_param(key, value);
    }
  }
  if let Some(status) = args.status {
    params = params.with_param("status", status.to_string());
  }
  if let Some(next) = args.next.as_deref().filter(|v| !v.is_empty()) {
    params = params.with_param("next", next);
  }
  if let Some(limit) = args.limit {
    params = params.with_param("limit", limit.to_string());
  }
  params
}

pub fn list_builds(api: &impl CallApi, args: &ListBuildsArgs) -> Result<String, ErrorOutput> {
  call(api, list_builds_params(args))
}

pub fn get_build(api: &impl CallApi, build: &BuildRef) -> Result<String, ErrorOutput> {
  call(api, CallApiParams::get(build.path("")))
}

pub fn get_build_bitrise_yml(api: &impl CallApi, build: &BuildRef) -> Result<String, ErrorOutput> {
  call(api, CallApiParams::get(build.path("/bitrise.yml")))
}

pub fn list_build_workflows(api: &impl CallApi, app_slug: &str) -> Result<String, ErrorOutput> {
  call(
    api,
    CallApiParams::get(format!("/apps/{}/build-workflows", encode_segment(app_slug))),
  )
}

pub fn abort_build_params(args: &AbortBuildArgs) -> CallApiParams {
  let reason = args
    .abort_reason
    .as_deref()
    .filter(|reason| !reason.is_empty())
    .unwrap_or(DEFAULT_ABORT_REASON);
  CallApiParams::post(
    args.build.path("/abort"),
    json!({
      "abort_reason": reason,
      "abort_with_success": args.abort_with_success,
      "skip_git_status_report": args.skip_git_status_report,
      "skip_notifications": args.skip_notifications,
    }),
  )
}

pub fn abort_build(api: &impl CallApi, args: &AbortBuildArgs) -> Result<String, ErrorOutput> {
  tracing::info!(app = %args.build.app_slug, build = %args.build.build_slug, "aborting build");
  call(api, abort_build_params(args))
}
