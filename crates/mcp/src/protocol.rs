use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// JSON-RPC error codes the server answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Parse,
  MethodNotFound,
  InvalidParams,
}

impl ErrorKind {
  pub fn code(self) -> i64 {
    match self {
      ErrorKind::Parse => -32700,
      ErrorKind::MethodNotFound => -32601,
      ErrorKind::InvalidParams => -32602,
    }
  }
}

/// One line of input. Requests without an `id` are notifications.
#[derive(Debug, Deserialize)]
pub struct Request {
  #[serde(default)]
  pub jsonrpc: Option<String>,
  #[serde(default)]
  pub id: Option<Value>,
  pub method: String,
  #[serde(default)]
  pub params: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
  pub code: i64,
  pub message: String,
}

#[derive(Debug, Serialize)]
pub struct Response {
  pub jsonrpc: &'static str,
  pub id: Value,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub result: Option<Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<ErrorBody>,
}

impl Response {
  pub fn success(id: Value, result: Value) -> Self {
    Self {
      jsonrpc: "2.0",
      id,
      result: Some(result),
      error: None,
    }
  }

  pub fn failure(id: Value, kind: ErrorKind, message: impl Into<String>) -> Self {
    Self {
      jsonrpc: "2.0",
      id,
      result: None,
      error: Some(ErrorBody {
        code: kind.code(),
        message: message.into(),
      }),
    }
  }

  /// Unparseable input has no id to echo back.
  pub fn parse_error(detail: impl std::fmt::Display) -> Self {
    Self::failure(Value::Null, ErrorKind::Parse, format!("Parse error: {detail}"))
  }

  pub fn method_not_found(id: Value, message: impl Into<String>) -> Self {
    Self::failure(id, ErrorKind::MethodNotFound, message)
  }

  pub fn invalid_params(id: Value, message: impl Into<String>) -> Self {
    Self::failure(id, ErrorKind::InvalidParams, message)
  }

  /// A `tools/call` result carrying a single text block.
  pub fn tool_text(id: Value, text: impl Into<String>, is_error: bool) -> Self {
    Self::success(
      id,
      json!({
        "content": [{ "type": "text", "text": text.into() }],
        "isError": is_error
      }),
    )
  }
}
