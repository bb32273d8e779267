use crate::config::Config;
use crate::http::{ApiClient, HttpLogFetcher};
use crate::logging::init_logging;
use crate::output::{error_output, serialize_error, ErrorOutput};
use clap::{Parser, Subcommand};
use serde::Serialize;

pub mod build_log;
pub mod builds;

#[derive(Parser)]
#[command(name = "bitrise-build-log", version, about = "Page through Bitrise build logs")]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
  #[command(subcommand)]
  Logs(LogsCommand),
}

#[derive(Subcommand)]
pub enum LogsCommand {
  /// Print one window of a build or step log as JSON.
  Get(build_log::GetBuildLogArgs),
}

/// Builds the API client and raw log fetcher from a loaded configuration.
pub fn connect(config: &Config) -> Result<(ApiClient, HttpLogFetcher), ErrorOutput> {
  let token = config
    .require_token()
    .map_err(|err| error_output("MISSING_TOKEN", "Bitrise token is not configured.", Some(err.to_string())))?;
  let api = ApiClient::new(&config.api_base_url, token)
    .map_err(|err| error_output("CLIENT_INIT_FAILED", "Failed to create HTTP client.", Some(err.to_string())))?;
  let fetcher = HttpLogFetcher::new()
    .map_err(|err| error_output("CLIENT_INIT_FAILED", "Failed to create HTTP client.", Some(err.to_string())))?;
  Ok((api, fetcher))
}

pub(crate) fn print_json<T: Serialize>(output: &T) -> Result<(), String> {
  let json = serde_json::to_string(output).map_err(|err| {
    serialize_error(error_output(
      "SERIALIZE_FAILED",
      "Failed to serialize output.",
      Some(err.to_string()),
    ))
  })?;
  println!("{json}");
  Ok(())
}

pub fn run(cli: Cli) -> Result<(), String> {
  let config = Config::from_env();
  init_logging(&config.log_level);
  match cli.command {
    Commands::Logs(LogsCommand::Get(args)) => build_log::run(args, &config),
  }
}
