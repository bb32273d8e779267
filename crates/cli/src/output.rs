use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOutput {
  pub ok: bool,
  pub error_code: String,
  pub message: String,
  pub details: Option<String>,
}

pub fn error_output(code: &str, message: &str, details: Option<String>) -> ErrorOutput {
  ErrorOutput {
    ok: false,
    error_code: code.to_string(),
    message: message.to_string(),
    details,
  }
}

pub fn serialize_error(err: ErrorOutput) -> String {
  let code = err.error_code.clone();
  let message = err.message.clone();
  serde_json::to_string(&err)
    .unwrap_or_else(|_| format!("{{\"ok\":false,\"errorCode\":\"{code}\",\"message\":\"{message}\"}}"))
}
