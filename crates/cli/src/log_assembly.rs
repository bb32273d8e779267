use crate::http::{FetchError, RemoteLogFetcher};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

pub const INCOMPLETE_LOG_MARKER: &str = "[incomplete log: processing is still ongoing]\n\n";

#[derive(Debug, Error)]
pub enum AssembleError {
  #[error("get raw log: {0}")]
  Fetch(#[from] FetchError),
  #[error("get step raw log: {0}")]
  StepFetch(FetchError),
  #[error("unmarshal log response: {0}")]
  Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogChunk {
  #[serde(rename = "chunk", default, deserialize_with = "null_as_default")]
  pub content: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub position: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawLogReference {
  DownloadUrl(String),
  Chunks(Vec<LogChunk>),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StepLogReference {
  #[serde(rename = "expiring_raw_log_url")]
  pub url: String,
}

#[derive(Debug, Deserialize)]
struct BuildLogResponse {
  #[serde(default)]
  expiring_raw_log_url: Option<String>,
  #[serde(default)]
  log_chunks: Option<Vec<LogChunk>>,
}

#[derive(Debug, Deserialize)]
struct StepLogMessage {
  #[serde(default, deserialize_with = "null_as_default")]
  message: String,
}

/// Explicit `null` fields read as the zero value, same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads the build-level log metadata. An empty download URL falls back to the chunk list.
pub fn parse_build_log_reference(body: &str) -> Result<RawLogReference, AssembleError> {
  let response: BuildLogResponse = serde_json::from_str(body)?;
  match response.expiring_raw_log_url {
    Some(url) if !url.is_empty() => Ok(RawLogReference::DownloadUrl(url)),
    _ => Ok(RawLogReference::Chunks(response.log_chunks.unwrap_or_default())),
  }
}

pub fn parse_step_log_reference(body: &str) -> Result<StepLogReference, AssembleError> {
  Ok(serde_json::from_str(body)?)
}

/// Joins chunk contents in list order. The list order is trusted as-is; `position` is only
/// consulted to decide whether the first chunk has been produced yet.
pub fn concat_chunks(chunks: &[LogChunk]) -> String {
  let content: String = chunks.iter().map(|chunk| chunk.content.as_str()).collect();
  if chunks.iter().any(|chunk| chunk.position == 1) {
    content
  } else {
    format!("{INCOMPLETE_LOG_MARKER}{content}")
  }
}

fn decode(body: Vec<u8>) -> String {
  String::from_utf8(body).unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
}

pub struct LogAssembler<'a, F: RemoteLogFetcher> {
  fetcher: &'a F,
}

impl<'a, F: RemoteLogFetcher> LogAssembler<'a, F> {
  pub fn new(fetcher: &'a F) -> Self {
    Self { fetcher }
  }

  pub fn assemble_build_log(&self, reference: &RawLogReference) -> Result<String, AssembleError> {
    match reference {
      RawLogReference::DownloadUrl(url) => {
        let body = self.fetcher.fetch(url)?;
        Ok(decode(body))
      }
      RawLogReference::Chunks(chunks) => {
        tracing::debug!(chunks = chunks.len(), "assembling build log from chunks");
        Ok(concat_chunks(chunks))
      }
    }
  }
}

pub struct StepLogAssembler<'a, F: RemoteLogFetcher> {
  fetcher: &'a F,
}

impl<'a, F: RemoteLogFetcher> StepLogAssembler<'a, F> {
  pub fn new(fetcher: &'a F) -> Self {
    Self { fetcher }
  }

  /// Messages are concatenated without separators; line breaks live inside the messages.
  pub fn assemble_step_log(&self, reference: &StepLogReference) -> Result<String, AssembleError> {
    let body = self.fetcher.fetch(&reference.url).map_err(AssembleError::StepFetch)?;
    let messages: Vec<StepLogMessage> = serde_json::from_slice(&body)?;
    Ok(messages.into_iter().map(|record| record.message).collect())
  }
}
