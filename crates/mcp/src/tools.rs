use bitrise_build_log_cli::commands::build_log::DEFAULT_LIMIT;
use bitrise_build_log_cli::config::ApiGroups;
use serde_json::{json, Value};

pub const GET_BUILD_LOG_TOOL: &str = "get_build_log";
pub const LIST_BUILDS_TOOL: &str = "list_builds";
pub const GET_BUILD_TOOL: &str = "get_build";
pub const GET_BUILD_BITRISE_YML_TOOL: &str = "get_build_bitrise_yml";
pub const LIST_BUILD_WORKFLOWS_TOOL: &str = "list_build_workflows";
pub const ABORT_BUILD_TOOL: &str = "abort_build";

const READ_ONLY_BUILDS: &[&str] = &["builds", "read-only"];
const BUILDS: &[&str] = &["builds"];

const APP_SLUG_DESCRIPTION: &str =
  r#"Identifier of the Bitrise app (e.g., "d8db74e2675d54c4" or "8eb495d0-f653-4eed-910b-8d6b56cc0ec7")"#;

pub struct ToolSpec {
  pub name: &'static str,
  pub api_groups: &'static [&'static str],
  definition: fn() -> Value,
}

impl ToolSpec {
  pub fn definition(&self) -> Value {
    let mut value = (self.definition)();
    if let Some(object) = value.as_object_mut() {
      object.insert("name".to_string(), json!(self.name));
    }
    value
  }
}

pub const TOOLS: &[ToolSpec] = &[
  ToolSpec {
    name: LIST_BUILDS_TOOL,
    api_groups: READ_ONLY_BUILDS,
    definition: list_builds_definition,
  },
  ToolSpec {
    name: GET_BUILD_TOOL,
    api_groups: READ_ONLY_BUILDS,
    definition: get_build_definition,
  },
  ToolSpec {
    name: ABORT_BUILD_TOOL,
    api_groups: BUILDS,
    definition: abort_build_definition,
  },
  ToolSpec {
    name: GET_BUILD_LOG_TOOL,
    api_groups: READ_ONLY_BUILDS,
    definition: get_build_log_definition,
  },
  ToolSpec {
    name: GET_BUILD_BITRISE_YML_TOOL,
    api_groups: READ_ONLY_BUILDS,
    definition: get_build_bitrise_yml_definition,
  },
  ToolSpec {
    name: LIST_BUILD_WORKFLOWS_TOOL,
    api_groups: READ_ONLY_BUILDS,
    definition: list_build_workflows_definition,
  },
];

pub fn find_tool(name: &str) -> Option<&'static ToolSpec> {
  TOOLS.iter().find(|tool| tool.name == name)
}

pub fn tool_enabled(name: &str, groups: &ApiGroups) -> bool {
  find_tool(name).is_some_and(|tool| groups.any_enabled(tool.api_groups))
}

pub fn list_tools(groups: &ApiGroups) -> Value {
  let tools: Vec<Value> = TOOLS
    .iter()
    .filter(|tool| groups.any_enabled(tool.api_groups))
    .map(ToolSpec::definition)
    .collect();
  json!({
    "tools": tools,
    "nextCursor": null
  })
}

fn read_only_annotations() -> Value {
  json!({
    "readOnlyHint": true,
    "destructiveHint": false,
    "openWorldHint": true
  })
}

fn build_ref_schema() -> Value {
  json!({
    "type": "object",
    "properties": {
      "app_slug": { "type": "string", "description": "Identifier of the Bitrise app" },
      "build_slug": { "type": "string", "description": "Identifier of the build" }
    },
    "required": ["app_slug", "build_slug"]
  })
}

fn get_build_log_definition() -> Value {
  json!({
    "title": "Get Build Log",
    "description": "Get the build log of a specified build of a Bitrise app.",
    "inputSchema": {
      "type": "object",
      "properties": {
        "app_slug": { "type": "string", "description": APP_SLUG_DESCRIPTION },
        "build_slug": { "type": "string", "description": "Identifier of the Bitrise build" },
        "step_uuid": {
          "type": "string",
          "description": "UUID of the step to get the log for. If not provided, the full build log is returned. Always provide this value whenever possible to avoid large log responses and running out of the LLM context window."
        },
        "offset": {
          "type": "number",
          "description": "The line number to start reading from. Defaults to 0. Set -1 to read from the end of the log. Failures are usually at the end of the log.",
          "default": 0
        },
        "limit": {
          "type": "number",
          "description": "The number of lines to read. Defaults to 2000. Set to a high value to read the entire log.",
          "default": DEFAULT_LIMIT
        }
      },
      "required": ["app_slug", "build_slug"]
    },
    "outputSchema": {
      "type": "object",
      "properties": {
        "log_lines": { "type": "string", "description": "The requested lines of the build log." },
        "next_offset": {
          "type": "integer",
          "description": "The offset to use to read the next portion of the log, if any. Omitted when nothing is left in this direction."
        },
        "total_lines": { "type": "integer", "description": "The total number of lines in the build log." }
      },
      "required": ["log_lines", "total_lines"]
    },
    "annotations": read_only_annotations()
  })
}

fn list_builds_definition() -> Value {
  json!({
    "title": "List Builds",
    "description": "List all the builds of a specified Bitrise app or all accessible builds.",
    "inputSchema": {
      "type": "object",
      "properties": {
        "app_slug": { "type": "string", "description": "Identifier of the Bitrise app" },
        "sort_by": {
          "type": "string",
          "description": "Order of builds: created_at (default), running_first",
          "enum": ["created_at", "running_first"],
          "default": "created_at"
        },
        "branch": { "type": "string", "description": "Filter builds by branch" },
        "workflow": { "type": "string", "description": "Filter builds by workflow" },
        "status": {
          "type": "number",
          "description": "Filter builds by status (0: not finished, 1: successful, 2: failed, 3: aborted, 4: in-progress)",
          "enum": [0, 1, 2, 3, 4]
        },
        "next": { "type": "string", "description": "Slug of the first build in the response" },
        "limit": { "type": "number", "description": "Max number of elements per page (default: 50)" }
      }
    },
    "annotations": read_only_annotations()
  })
}

fn get_build_definition() -> Value {
  json!({
    "title": "Get Build",
    "description": "Get a specific build of a given app.",
    "inputSchema": build_ref_schema(),
    "annotations": read_only_annotations()
  })
}

fn get_build_bitrise_yml_definition() -> Value {
  json!({
    "title": "Get Build bitrise.yml",
    "description": "Get the bitrise.yml of a build.",
    "inputSchema": build_ref_schema(),
    "annotations": read_only_annotations()
  })
}

fn list_build_workflows_definition() -> Value {
  json!({
    "title": "List Build Workflows",
    "description": "List the workflows of an app.",
    "inputSchema": {
      "type": "object",
      "properties": {
        "app_slug": { "type": "string", "description": "Identifier of the Bitrise app" }
      },
      "required": ["app_slug"]
    },
    "annotations": read_only_annotations()
  })
}

fn abort_build_definition() -> Value {
  json!({
    "title": "Abort Build",
    "description": "Abort a specific build.",
    "inputSchema": {
      "type": "object",
      "properties": {
        "app_slug": { "type": "string", "description": "Identifier of the Bitrise app" },
        "build_slug": { "type": "string", "description": "Identifier of the build" },
        "abort_reason": { "type": "string", "description": "Reason for aborting the build" },
        "abort_with_success": {
          "type": "boolean",
          "description": "If set to true, the aborted build will be marked as successful",
          "default": false
        },
        "skip_git_status_report": {
          "type": "boolean",
          "description": "If set to true, skip sending git status report",
          "default": false
        },
        "skip_notifications": {
          "type": "boolean",
          "description": "If set to true, skip sending notifications",
          "default": false
        }
      },
      "required": ["app_slug", "build_slug"]
    },
    "annotations": {
      "readOnlyHint": false,
      "destructiveHint": true,
      "idempotentHint": true,
      "openWorldHint": true
    }
  })
}
