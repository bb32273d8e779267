use std::io;

use bitrise_build_log_cli::commands::connect;
use bitrise_build_log_cli::config::Config;
use bitrise_build_log_cli::logging::init_logging;
use bitrise_build_log_cli::output::serialize_error;
use bitrise_build_log_mcp::handlers::BitriseBuilds;
use bitrise_build_log_mcp::stdio::serve;

fn main() {
  let config = Config::from_env();
  init_logging(&config.log_level);

  let (api, fetcher) = match connect(&config) {
    Ok(clients) => clients,
    Err(err) => {
      eprintln!("{}", serialize_error(err));
      std::process::exit(1);
    }
  };
  let provider = BitriseBuilds::new(api, fetcher);

  tracing::info!(
    groups = ?config.enabled_api_groups.as_slice(),
    "starting bitrise build log MCP server on stdio"
  );
  if let Err(err) = serve(io::stdin().lock(), io::stdout(), &provider, &config.enabled_api_groups) {
    tracing::error!(error = %err, "stdio transport failed");
    std::process::exit(1);
  }
}
