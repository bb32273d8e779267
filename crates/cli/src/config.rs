use crate::http::DEFAULT_API_BASE_URL;
use thiserror::Error;

pub const DEFAULT_API_GROUPS: &str = "apps,builds,workspaces,webhooks,build-artifacts,group-roles,cache-items,pipelines,account,read-only,release-management";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("BITRISE_TOKEN must be provided")]
  MissingToken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiGroups(Vec<String>);

impl ApiGroups {
  pub fn parse(value: &str) -> Self {
    Self(
      value
        .split(',')
        .map(str::trim)
        .filter(|group| !group.is_empty())
        .map(str::to_string)
        .collect(),
    )
  }

  pub fn any_enabled(&self, groups: &[&str]) -> bool {
    self.0.iter().any(|enabled| groups.contains(&enabled.as_str()))
  }

  pub fn as_slice(&self) -> &[String] {
    &self.0
  }
}

impl Default for ApiGroups {
  fn default() -> Self {
    Self::parse(DEFAULT_API_GROUPS)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
  pub bitrise_token: Option<String>,
  pub api_base_url: String,
  pub enabled_api_groups: ApiGroups,
  pub log_level: String,
}

fn non_blank(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.trim().is_empty())
}

impl Config {
  pub fn from_lookup<F>(mut lookup: F) -> Self
  where
    F: FnMut(&str) -> Option<String>,
  {
    let bitrise_token = non_blank(lookup("BITRISE_TOKEN"));
    let api_base_url = non_blank(lookup("BITRISE_API_BASE_URL"))
      .map(|url| url.trim_end_matches('/').to_string())
      .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
    let enabled_api_groups = non_blank(lookup("ENABLED_API_GROUPS"))
      .map(|groups| ApiGroups::parse(&groups))
      .unwrap_or_default();
    let log_level = non_blank(lookup("LOG_LEVEL")).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

    Self {
      bitrise_token,
      api_base_url,
      enabled_api_groups,
      log_level,
    }
  }

  pub fn from_env() -> Self {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  pub fn require_token(&self) -> Result<&str, ConfigError> {
    self.bitrise_token.as_deref().ok_or(ConfigError::MissingToken)
  }
}
