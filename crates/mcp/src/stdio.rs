use bitrise_build_log_cli::config::ApiGroups;
use std::io::{self, BufRead, Write};

use crate::handlers::{handle_request, BuildsProvider};
use crate::protocol::Response;

pub fn handle_line(line: &str, provider: &impl BuildsProvider, groups: &ApiGroups) -> Option<String> {
  let trimmed = line.trim();
  if trimmed.is_empty() {
    return None;
  }

  match serde_json::from_str(trimmed) {
    Ok(request) => handle_request(request, provider, groups)
      .and_then(|response| serde_json::to_string(&response).ok()),
    Err(err) => serde_json::to_string(&Response::parse_error(err)).ok(),
  }
}

/// Serves newline-delimited JSON-RPC until the input closes.
pub fn serve<R, W>(input: R, mut output: W, provider: &impl BuildsProvider, groups: &ApiGroups) -> io::Result<()>
where
  R: BufRead,
  W: Write,
{
  for line in input.lines() {
    let line = match line {
      Ok(line) => line,
      Err(err) => {
        tracing::warn!(error = %err, "failed to read request line");
        continue;
      }
    };

    if let Some(response) = handle_line(&line, provider, groups) {
      writeln!(output, "{response}")?;
      output.flush()?;
    }
  }
  tracing::info!("stdin closed, shutting down");
  Ok(())
}
