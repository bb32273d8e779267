use bitrise_build_log_cli::commands::build_log::{get_build_log, GetBuildLogArgs, DEFAULT_LIMIT};
use bitrise_build_log_cli::commands::builds::{
  abort_build, get_build, get_build_bitrise_yml, list_build_workflows, list_builds, AbortBuildArgs, BuildRef,
  ListBuildsArgs,
};
use bitrise_build_log_cli::config::ApiGroups;
use bitrise_build_log_cli::http::{CallApi, RemoteLogFetcher};
use bitrise_build_log_cli::log_window::LogWindowResult;
use bitrise_build_log_cli::output::{error_output, serialize_error, ErrorOutput};
use serde_json::{json, Map, Value};

use crate::protocol::{Request, Response};
use crate::tools::{
  list_tools, tool_enabled, ABORT_BUILD_TOOL, GET_BUILD_BITRISE_YML_TOOL, GET_BUILD_LOG_TOOL, GET_BUILD_TOOL,
  LIST_BUILDS_TOOL, LIST_BUILD_WORKFLOWS_TOOL,
};

const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

pub trait BuildsProvider {
  fn get_build_log(&self, args: &GetBuildLogArgs) -> Result<LogWindowResult, ErrorOutput>;
  fn list_builds(&self, args: &ListBuildsArgs) -> Result<String, ErrorOutput>;
  fn get_build(&self, build: &BuildRef) -> Result<String, ErrorOutput>;
  fn get_build_bitrise_yml(&self, build: &BuildRef) -> Result<String, ErrorOutput>;
  fn list_build_workflows(&self, app_slug: &str) -> Result<String, ErrorOutput>;
  fn abort_build(&self, args: &AbortBuildArgs) -> Result<String, ErrorOutput>;
}

pub struct BitriseBuilds<A, F> {
  api: A,
  fetcher: F,
}

impl<A: CallApi, F: RemoteLogFetcher> BitriseBuilds<A, F> {
  pub fn new(api: A, fetcher: F) -> Self {
    Self { api, fetcher }
  }
}

impl<A: CallApi, F: RemoteLogFetcher> BuildsProvider for BitriseBuilds<A, F> {
  fn get_build_log(&self, args: &GetBuildLogArgs) -> Result<LogWindowResult, ErrorOutput> {
    get_build_log(&self.api, &self.fetcher, args)
  }

  fn list_builds(&self, args: &ListBuildsArgs) -> Result<String, ErrorOutput> {
    list_builds(&self.api, args)
  }

  fn get_build(&self, build: &BuildRef) -> Result<String, ErrorOutput> {
    get_build(&self.api, build)
  }

  fn get_build_bitrise_yml(&self, build: &BuildRef) -> Result<String, ErrorOutput> {
    get_build_bitrise_yml(&self.api, build)
  }

  fn list_build_workflows(&self, app_slug: &str) -> Result<String, ErrorOutput> {
    list_build_workflows(&self.api, app_slug)
  }

  fn abort_build(&self, args: &AbortBuildArgs) -> Result<String, ErrorOutput> {
    abort_build(&self.api, args)
  }
}

pub fn handle_request(request: Request, provider: &impl BuildsProvider, groups: &ApiGroups) -> Option<Response> {
  let id = request.id?;
  match request.method.as_str() {
    "initialize" => {
      let protocol_version = request
        .params
        .as_ref()
        .and_then(|params| params.get("protocolVersion"))
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_PROTOCOL_VERSION)
        .to_string();
      Some(Response::success(
        id,
        json!({
          "protocolVersion": protocol_version,
          "capabilities": { "tools": { "listChanged": false } },
          "serverInfo": { "name": "bitrise-build-log-mcp", "version": env!("CARGO_PKG_VERSION") }
        }),
      ))
    }
    "ping" => Some(Response::success(id, json!({}))),
    "tools/list" => Some(Response::success(id, list_tools(groups))),
    "tools/call" => Some(handle_tools_call(id, request.params, provider, groups)),
    _ => Some(Response::method_not_found(id, "Method not found")),
  }
}

fn handle_tools_call(id: Value, params: Option<Value>, provider: &impl BuildsProvider, groups: &ApiGroups) -> Response {
  let params = match params {
    Some(value) => value,
    None => return Response::invalid_params(id, "Missing params"),
  };
  let params_obj = match params.as_object() {
    Some(value) => value,
    None => return Response::invalid_params(id, "params must be an object"),
  };
  let name = match params_obj.get("name").and_then(Value::as_str) {
    Some(value) => value,
    None => return Response::invalid_params(id, "Missing tool name"),
  };
  if !tool_enabled(name, groups) {
    return Response::method_not_found(id, "Unknown tool");
  }

  let args = params_obj
    .get("arguments")
    .and_then(Value::as_object)
    .cloned()
    .unwrap_or_default();

  let outcome = match call_tool(name, &args, provider) {
    Ok(outcome) => outcome,
    Err(message) => return Response::invalid_params(id, message),
  };

  match outcome {
    Ok(text) => Response::tool_text(id, text, false),
    Err(err) => {
      tracing::warn!(tool = name, code = %err.error_code, "tool call failed");
      Response::tool_text(id, serialize_error(err), true)
    }
  }
}

/// Decodes arguments and runs the tool. The outer error is an argument problem, the
/// inner one an operation failure reported back to the client as a tool error.
fn call_tool(
  name: &str,
  args: &Map<String, Value>,
  provider: &impl BuildsProvider,
) -> Result<Result<String, ErrorOutput>, String> {
  let outcome = match name {
    GET_BUILD_LOG_TOOL => {
      let args = get_build_log_args(args)?;
      provider.get_build_log(&args).and_then(|window| to_json(&window))
    }
    LIST_BUILDS_TOOL => provider.list_builds(&list_builds_args(args)?),
    GET_BUILD_TOOL => provider.get_build(&build_ref(args)?),
    GET_BUILD_BITRISE_YML_TOOL => provider.get_build_bitrise_yml(&build_ref(args)?),
    LIST_BUILD_WORKFLOWS_TOOL => provider.list_build_workflows(&require_string(args, "app_slug")?),
    ABORT_BUILD_TOOL => provider.abort_build(&abort_build_args(args)?),
    _ => return Err(format!("Unsupported tool: {name}")),
  };
  Ok(outcome)
}

fn to_json(window: &LogWindowResult) -> Result<String, ErrorOutput> {
  serde_json::to_string(window)
    .map_err(|err| error_output("SERIALIZE_FAILED", "Failed to serialize output.", Some(err.to_string())))
}

fn require_string(args: &Map<String, Value>, key: &str) -> Result<String, String> {
  match optional_string(args, key)? {
    Some(value) => Ok(value),
    None => Err(format!("required argument \"{key}\" not found")),
  }
}

fn optional_string(args: &Map<String, Value>, key: &str) -> Result<Option<String>, String> {
  match args.get(key) {
    None | Some(Value::Null) => Ok(None),
    Some(Value::String(value)) => Ok(Some(value.clone())),
    Some(_) => Err(format!("{key} must be a string")),
  }
}

fn optional_int(args: &Map<String, Value>, key: &str) -> Result<Option<i64>, String> {
  match args.get(key) {
    None | Some(Value::Null) => Ok(None),
    Some(value) => value
      .as_i64()
      .or_else(|| value.as_f64().map(|v| v as i64))
      .map(Some)
      .ok_or_else(|| format!("{key} must be a number")),
  }
}

fn optional_bool(args: &Map<String, Value>, key: &str) -> Result<Option<bool>, String> {
  match args.get(key) {
    None | Some(Value::Null) => Ok(None),
    Some(Value::Bool(value)) => Ok(Some(*value)),
    Some(_) => Err(format!("{key} must be a boolean")),
  }
}

fn build_ref(args: &Map<String, Value>) -> Result<BuildRef, String> {
  Ok(BuildRef {
    app_slug: require_string(args, "app_slug")?,
    build_slug: require_string(args, "build_slug")?,
  })
}

fn get_build_log_args(args: &Map<String, Value>) -> Result<GetBuildLogArgs, String> {
  Ok(GetBuildLogArgs {
    app_slug: require_string(args, "app_slug")?,
    build_slug: require_string(args, "build_slug")?,
    step_uuid: optional_string(args, "step_uuid")?,
    offset: optional_int(args, "offset")?.unwrap_or(0),
    limit: optional_int(args, "limit")?.unwrap_or(DEFAULT_LIMIT),
  })
}

fn list_builds_args(args: &Map<String, Value>) -> Result<ListBuildsArgs, String> {
  Ok(ListBuildsArgs {
    app_slug: optional_string(args, "app_slug")?,
    sort_by: optional_string(args, "sort_by")?,
    branch: optional_string(args, "branch")?,
    workflow: optional_string(args, "workflow")?,
    status: optional_int(args, "status")?,
    next: optional_string(args, "next")?,
    limit: optional_int(args, "limit")?,
  })
}

fn abort_build_args(args: &Map<String, Value>) -> Result<AbortBuildArgs, String> {
  Ok(AbortBuildArgs {
    build: build_ref(args)?,
    abort_reason: optional_string(args, "abort_reason")?,
    abort_with_success: optional_bool(args, "abort_with_success")?.unwrap_or(false),
    skip_git_status_report: optional_bool(args, "skip_git_status_report")?.unwrap_or(false),
    skip_notifications: optional_bool(args, "skip_notifications")?.unwrap_or(false),
  })
}
