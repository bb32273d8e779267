use reqwest::Method;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_BASE_URL: &str = "https://api.bitrise.io/v0.1";

const API_TIMEOUT: Duration = Duration::from_secs(30);
const RAW_LOG_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum HttpError {
  #[error("create client: {0}")]
  ClientBuild(String),
  #[error("execute request: {0}")]
  RequestFailed(String),
  #[error("unexpected status code {0}")]
  Status(u16),
  #[error("read response body: {0}")]
  Body(String),
}

#[derive(Debug, Error)]
pub enum FetchError {
  #[error("http get: {0}")]
  Request(String),
  #[error("http get: timed out after {0:?}")]
  Timeout(Duration),
  #[error("http status code {0}")]
  Status(u16),
  #[error("read body: {0}")]
  Body(String),
}

/// One request against the Bitrise API, relative to the client's base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct CallApiParams {
  pub method: Method,
  pub path: String,
  pub params: Vec<(String, String)>,
  pub body: Option<Value>,
}

impl CallApiParams {
  pub fn get(path: impl Into<String>) -> Self {
    Self {
      method: Method::GET,
      path: path.into(),
      params: Vec::new(),
      body: None,
    }
  }

  pub fn post(path: impl Into<String>, body: Value) -> Self {
    Self {
      method: Method::POST,
      path: path.into(),
      params: Vec::new(),
      body: Some(body),
    }
  }

  pub fn with_param(mut self, key: &str, value: impl Into<String>) -> Self {
    self.params.push((key.to_string(), value.into()));
    self
  }
}

pub trait CallApi {
  fn call_api(&self, params: &CallApiParams) -> Result<String, HttpError>;
}

/// Single-shot download of a pre-signed log URL handed out by the backend.
pub trait RemoteLogFetcher {
  fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

pub fn encode_segment(segment: &str) -> String {
  urlencoding::encode(segment).into_owned()
}

pub fn build_api_url(base_url: &str, path: &str, params: &[(String, String)]) -> String {
  let base = base_url.trim_end_matches('/');
  let mut url = if path.starts_with('/') {
    format!("{base}{path}")
  } else {
    format!("{base}/{path}")
  };
  for (index, (key, value)) in params.iter().enumerate() {
    url.push(if index == 0 { '?' } else { '&' });
    url.push_str(&urlencoding::encode(key));
    url.push('=');
    url.push_str(&urlencoding::encode(value));
  }
  url
}

pub struct ApiClient {
  base_url: String,
  token: String,
  client: reqwest::blocking::Client,
}

impl ApiClient {
  pub fn new(base_url: &str, token: &str) -> Result<Self, HttpError> {
    let client = reqwest::blocking::Client::builder()
      .timeout(API_TIMEOUT)
      .user_agent(concat!("bitrise-build-log/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|err| HttpError::ClientBuild(err.to_string()))?;
    Ok(Self {
      base_url: base_url.trim_end_matches('/').to_string(),
      token: token.to_string(),
      client,
    })
  }
}

impl CallApi for ApiClient {
  fn call_api(&self, params: &CallApiParams) -> Result<String, HttpError> {
    let url = build_api_url(&self.base_url, &params.path, &params.params);
    tracing::debug!(method = %params.method, path = %params.path, "calling bitrise api");

    let mut request = self
      .client
      .request(params.method.clone(), url)
      .header(reqwest::header::ACCEPT, "application/json")
      .header(reqwest::header::CONTENT_TYPE, "application/json")
      .header(reqwest::header::AUTHORIZATION, &self.token);
    if let Some(body) = &params.body {
      request = request.json(body);
    }

    let response = request
      .send()
      .map_err(|err| HttpError::RequestFailed(err.to_string()))?;
    let status = response.status();
    if status.as_u16() >= 400 {
      return Err(HttpError::Status(status.as_u16()));
    }

    response.text().map_err(|err| HttpError::Body(err.to_string()))
  }
}

pub struct HttpLogFetcher {
  client: reqwest::blocking::Client,
  timeout: Duration,
}

impl HttpLogFetcher {
  pub fn new() -> Result<Self, FetchError> {
    Self::with_timeout(RAW_LOG_TIMEOUT)
  }

  pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
    let client = reqwest::blocking::Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|err| FetchError::Request(err.to_string()))?;
    Ok(Self { client, timeout })
  }

  fn timeout_or(&self, err: reqwest::Error, other: fn(String) -> FetchError) -> FetchError {
    if err.is_timeout() {
      FetchError::Timeout(self.timeout)
    } else {
      other(err.to_string())
    }
  }
}

impl RemoteLogFetcher for HttpLogFetcher {
  fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
    let response = self
      .client
      .get(url)
      .send()
      .map_err(|err| self.timeout_or(err, FetchError::Request))?;

    if !response.status().is_success() {
      return Err(FetchError::Status(response.status().as_u16()));
    }

    let body = response
      .bytes()
      .map_err(|err| self.timeout_or(err, FetchError::Body))?;
    tracing::debug!(bytes = body.len(), "downloaded raw log");
    Ok(body.to_vec())
  }
}
