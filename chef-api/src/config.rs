use crate::error::ChefApiResult;
use ::config::{Config, Environment, Map};
use serde::{de::DeserializeOwned, Deserialize};
use std::time::Duration;

/// Value of `X-Chef-Version` unless configured otherwise
pub const DEFAULT_CHEF_VERSION: &str = "11.0.4.x";
/// Number of sends before a request answered with 500 is given up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
/// Pause after each 500 response
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(5);

/// Prefix shared by every environment variable below
pub const ENV_PREFIX: &str = "CHEF";

/// Environment variable names read by [`ClientConfig::from_env`] and [`crate::Credentials::from_env`]
pub mod env_vars {
  pub const SERVER_URL: &str = "CHEF_SERVER_URL";
  pub const CLIENT_NAME: &str = "CHEF_CLIENT_NAME";
  pub const CLIENT_KEY: &str = "CHEF_CLIENT_KEY";
  pub const CHEF_VERSION: &str = "CHEF_VERSION";
  pub const MAX_ATTEMPTS: &str = "CHEF_MAX_ATTEMPTS";
  pub const RETRY_INTERVAL_SECS: &str = "CHEF_RETRY_INTERVAL_SECS";
}

/* --------------------------------------- */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Bounded retry of requests answered with 500: fixed interval, no backoff, no jitter
pub struct RetryPolicy {
  /// total number of sends, including the first one
  pub max_attempts: u32,
  /// sleep after every 500 response
  pub interval: Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      max_attempts: DEFAULT_MAX_ATTEMPTS,
      interval: DEFAULT_RETRY_INTERVAL,
    }
  }
}

impl RetryPolicy {
  pub fn new(max_attempts: u32, interval: Duration) -> Self {
    Self { max_attempts, interval }
  }

  /// Retry without sleeping in between
  pub fn no_wait(max_attempts: u32) -> Self {
    Self::new(max_attempts, Duration::ZERO)
  }
}

/* --------------------------------------- */
#[derive(Debug, Clone, PartialEq, Eq)]
/// Client configuration besides credentials
pub struct ClientConfig {
  /// e.g. `https://chef.example.com/organizations/acme`
  pub server_url: String,
  /// value of `X-Chef-Version`
  pub chef_version: String,
  /// default retry policy of [`crate::ChefClient::request`]
  pub retry: RetryPolicy,
}

impl ClientConfig {
  pub fn new(server_url: &str) -> Self {
    Self {
      server_url: server_url.to_string(),
      chef_version: DEFAULT_CHEF_VERSION.to_string(),
      retry: RetryPolicy::default(),
    }
  }

  /// Set `X-Chef-Version`
  pub fn set_chef_version(&mut self, chef_version: &str) -> &mut Self {
    self.chef_version = chef_version.to_string();
    self
  }

  /// Set the default retry policy
  pub fn set_retry(&mut self, retry: RetryPolicy) -> &mut Self {
    self.retry = retry;
    self
  }

  /// Reads `CHEF_SERVER_URL` and the optional `CHEF_VERSION`, `CHEF_MAX_ATTEMPTS`, `CHEF_RETRY_INTERVAL_SECS`
  pub fn from_env() -> ChefApiResult<Self> {
    Ok(load_env::<ClientEnv>(None)?.into())
  }
}

/// `CHEF_*` variables, keyed by the name after the prefix
#[derive(Debug, Deserialize)]
struct ClientEnv {
  server_url: String,
  #[serde(rename = "version")]
  chef_version: Option<String>,
  max_attempts: Option<u32>,
  retry_interval_secs: Option<u64>,
}

impl From<ClientEnv> for ClientConfig {
  fn from(env: ClientEnv) -> Self {
    let mut config = Self::new(&env.server_url);
    if let Some(chef_version) = env.chef_version {
      config.set_chef_version(&chef_version);
    }
    if let Some(max_attempts) = env.max_attempts {
      config.retry.max_attempts = max_attempts;
    }
    if let Some(secs) = env.retry_interval_secs {
      config.retry.interval = Duration::from_secs(secs);
    }
    config
  }
}

/// Deserializes the `CHEF_*` environment, or the given variables instead of the process environment
pub(crate) fn load_env<T: DeserializeOwned>(vars: Option<Map<String, String>>) -> ChefApiResult<T> {
  let environment = Environment::default().prefix(ENV_PREFIX).source(vars);
  let settings = Config::builder().add_source(environment).build()?;
  Ok(settings.try_deserialize()?)
}

/* --------------------------------------- */
#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::ChefApiError;

  fn vars(pairs: &[(&str, &str)]) -> Option<Map<String, String>> {
    Some(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
  }

  fn config_from(pairs: &[(&str, &str)]) -> ChefApiResult<ClientConfig> {
    load_env::<ClientEnv>(vars(pairs)).map(ClientConfig::from)
  }

  #[test]
  fn test_defaults() {
    let config = ClientConfig::new("https://chef.example.com");
    assert_eq!(config.chef_version, "11.0.4.x");
    assert_eq!(config.retry, RetryPolicy::new(5, Duration::from_secs(5)));
  }

  #[test]
  fn test_env_overrides() {
    let config = config_from(&[
      (env_vars::SERVER_URL, "https://chef.example.com/organizations/acme"),
      (env_vars::CHEF_VERSION, "12.0.0"),
      (env_vars::MAX_ATTEMPTS, "3"),
      (env_vars::RETRY_INTERVAL_SECS, "0"),
    ])
    .unwrap();
    assert_eq!(config.server_url, "https://chef.example.com/organizations/acme");
    assert_eq!(config.chef_version, "12.0.0");
    assert_eq!(config.retry, RetryPolicy::no_wait(3));
  }

  #[test]
  fn test_env_only_server_url() {
    let config = config_from(&[(env_vars::SERVER_URL, "https://chef.example.com")]).unwrap();
    assert_eq!(config, ClientConfig::new("https://chef.example.com"));
  }

  #[test]
  fn test_env_errors() {
    assert!(matches!(config_from(&[]), Err(ChefApiError::Config(_))));
    assert!(matches!(
      config_from(&[
        (env_vars::SERVER_URL, "https://chef.example.com"),
        (env_vars::MAX_ATTEMPTS, "many"),
      ]),
      Err(ChefApiError::Config(_))
    ));
  }
}
