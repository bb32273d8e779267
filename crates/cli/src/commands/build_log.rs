use crate::commands::{connect, print_json};
use crate::config::Config;
use crate::http::{encode_segment, CallApi, CallApiParams, HttpError, RemoteLogFetcher};
use crate::log_assembly::{
  parse_build_log_reference, parse_step_log_reference, AssembleError, LogAssembler, StepLogAssembler,
};
use crate::log_window::{peek, LogWindowRequest, LogWindowResult};
use crate::output::{error_output, serialize_error, ErrorOutput};
use clap::Parser;
use thiserror::Error;

pub const DEFAULT_LIMIT: i64 = 2000;

#[derive(Debug, Error)]
pub enum BuildLogError {
  #[error("limit must be greater than 0")]
  InvalidLimit,
  #[error("call api: {0}")]
  Api(#[from] HttpError),
  #[error("get log: {0}")]
  Assemble(#[from] AssembleError),
}

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
pub struct GetBuildLogArgs {
  #[arg(long = "app")]
  pub app_slug: String,
  #[arg(long = "build")]
  pub build_slug: String,
  /// Read a single step's log instead of the whole build.
  #[arg(long = "step")]
  pub step_uuid: Option<String>,
  /// First line to read; negative values count back from the end (-1 is the last line).
  #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
  pub offset: i64,
  #[arg(long, default_value_t = DEFAULT_LIMIT, allow_hyphen_values = true)]
  pub limit: i64,
}

impl GetBuildLogArgs {
  pub fn new(app_slug: impl Into<String>, build_slug: impl Into<String>) -> Self {
    Self {
      app_slug: app_slug.into(),
      build_slug: build_slug.into(),
      step_uuid: None,
      offset: 0,
      limit: DEFAULT_LIMIT,
    }
  }

  pub fn step(&self) -> Option<&str> {
    self.step_uuid.as_deref().filter(|uuid| !uuid.is_empty())
  }
}

pub fn build_log_path(app_slug: &str, build_slug: &str, step_uuid: Option<&str>) -> String {
  let mut path = format!(
    "/apps/{}/builds/{}/log",
    encode_segment(app_slug),
    encode_segment(build_slug)
  );
  if let Some(step) = step_uuid {
    path.push_str(&format!("/steps/{}", encode_segment(step)));
  }
  path
}

pub fn validate_limit(limit: i64) -> Result<(), BuildLogError> {
  if limit <= 0 {
    return Err(BuildLogError::InvalidLimit);
  }
  Ok(())
}

pub fn fetch_build_log(
  api: &impl CallApi,
  fetcher: &impl RemoteLogFetcher,
  args: &GetBuildLogArgs,
) -> Result<LogWindowResult, BuildLogError> {
  validate_limit(args.limit)?;

  let path = build_log_path(&args.app_slug, &args.build_slug, args.step());
  let body = api.call_api(&CallApiParams::get(path))?;

  let log = match args.step() {
    Some(_) => {
      let reference = parse_step_log_reference(&body)?;
      StepLogAssembler::new(fetcher).assemble_step_log(&reference)?
    }
    None => {
      let reference = parse_build_log_reference(&body)?;
      LogAssembler::new(fetcher).assemble_build_log(&reference)?
    }
  };

  let window = peek(LogWindowRequest {
    log: &log,
    offset: args.offset,
    limit: args.limit,
  });
  tracing::debug!(
    offset = args.offset,
    next_offset = window.next_offset,
    total_lines = window.total_lines,
    "paged build log"
  );
  Ok(window)
}

pub fn map_build_log_error(err: BuildLogError) -> ErrorOutput {
  let details = Some(err.to_string());
  match err {
    BuildLogError::InvalidLimit => error_output("INVALID_LIMIT", "limit must be greater than 0", None),
    BuildLogError::Api(_) => error_output("CALL_API_FAILED", "Failed to call the Bitrise API.", details),
    BuildLogError::Assemble(AssembleError::Fetch(_) | AssembleError::StepFetch(_)) => {
      error_output("FETCH_FAILED", "Failed to download the raw log.", details)
    }
    BuildLogError::Assemble(AssembleError::Parse(_)) => {
      error_output("PARSE_FAILED", "Unexpected build log response shape.", details)
    }
  }
}

pub fn get_build_log(
  api: &impl CallApi,
  fetcher: &impl RemoteLogFetcher,
  args: &GetBuildLogArgs,
) -> Result<LogWindowResult, ErrorOutput> {
  fetch_build_log(api, fetcher, args).map_err(map_build_log_error)
}

pub fn run(args: GetBuildLogArgs, config: &Config) -> Result<(), String> {
  validate_limit(args.limit)
    .map_err(map_build_log_error)
    .map_err(serialize_error)?;
  let (api, fetcher) = connect(config).map_err(serialize_error)?;
  let output = get_build_log(&api, &fetcher, &args).map_err(serialize_error)?;
  print_json(&output)
}
