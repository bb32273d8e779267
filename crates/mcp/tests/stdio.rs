use bitrise_build_log_cli::commands::build_log::GetBuildLogArgs;
use bitrise_build_log_cli::commands::builds::{AbortBuildArgs, BuildRef, ListBuildsArgs};
use bitrise_build_log_cli::config::ApiGroups;
use bitrise_build_log_cli::log_window::LogWindowResult;
use bitrise_build_log_cli::output::{error_output, ErrorOutput};
use bitrise_build_log_mcp::handlers::BuildsProvider;
use bitrise_build_log_mcp::stdio::{handle_line, serve};
use std::io::Cursor;

struct FailingBuilds;

fn failure() -> ErrorOutput {
  error_output("TEST", "test", None)
}

impl BuildsProvider for FailingBuilds {
  fn get_build_log(&self, _args: &GetBuildLogArgs) -> Result<LogWindowResult, ErrorOutput> {
    Err(failure())
  }

  fn list_builds(&self, _args: &ListBuildsArgs) -> Result<String, ErrorOutput> {
    Err(failure())
  }

  fn get_build(&self, _build: &BuildRef) -> Result<String, ErrorOutput> {
    Err(failure())
  }

  fn get_build_bitrise_yml(&self, _build: &BuildRef) -> Result<String, ErrorOutput> {
    Err(failure())
  }

  fn list_build_workflows(&self, _app_slug: &str) -> Result<String, ErrorOutput> {
    Err(failure())
  }

  fn abort_build(&self, _args: &AbortBuildArgs) -> Result<String, ErrorOutput> {
    Err(failure())
  }
}

#[test]
fn handle_line_returns_parse_error_response() {
  let response = handle_line("{not json}", &FailingBuilds, &ApiGroups::default()).expect("response");
  let value: serde_json::Value = serde_json::from_str(&response).expect("json");
  assert_eq!(value["error"]["code"], -32700);
}

#[test]
fn handle_line_ignores_blank_lines() {
  assert!(handle_line("   ", &FailingBuilds, &ApiGroups::default()).is_none());
}

#[test]
fn serve_answers_each_request_line() {
  let input = concat!(
    r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
    "\n\n",
    r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
    "\n",
    r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"get_build","arguments":{"app_slug":"a","build_slug":"b"}}}"#,
    "\n"
  );
  let mut output = Vec::new();

  serve(Cursor::new(input), &mut output, &FailingBuilds, &ApiGroups::default()).expect("serve");

  let text = String::from_utf8(output).expect("utf8");
  let lines: Vec<serde_json::Value> = text
    .lines()
    .map(|line| serde_json::from_str(line).expect("json line"))
    .collect();
  assert_eq!(lines.len(), 2);
  assert_eq!(lines[0]["id"], 1);
  assert_eq!(lines[1]["id"], 2);
  assert_eq!(lines[1]["result"]["isError"], true);
  let payload: serde_json::Value =
    serde_json::from_str(lines[1]["result"]["content"][0]["text"].as_str().expect("text")).expect("payload");
  assert_eq!(payload["errorCode"], "TEST");
}
