use chef_auth::prelude::ChefAuthError;
use thiserror::Error;

/// Result type for the chef api client
pub type ChefApiResult<T> = std::result::Result<T, ChefApiError>;

/// Error type for the chef api client
#[derive(Error, Debug)]
pub enum ChefApiError {
  /// The server url has no scheme or authority
  #[error("Invalid server url: {0}")]
  InvalidServerUrl(String),

  /// Every attempt was answered with 500
  #[error("Chef API requests failed: {path} ({attempts} attempts)")]
  RequestFailed { path: String, attempts: u32 },

  /// Connection-level failure, not retried
  #[error("Transport error: {0}")]
  Transport(#[from] ureq::Error),

  /// Header name not representable on the wire
  #[error("Invalid header name: {0}")]
  InvalidHeaderName(#[from] http::header::InvalidHeaderName),

  /// Header value not representable on the wire
  #[error("Invalid header value: {0}")]
  InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

  /// Failed to build the http request
  #[error("Http error: {0}")]
  Http(#[from] http::Error),

  /// Inherited from ChefAuthError, e.g., a malformed private key
  #[error("ChefAuthError: {0}")]
  ChefAuthError(#[from] ChefAuthError),

  /// Failed to read key material
  #[error("Io error: {0}")]
  Io(#[from] std::io::Error),

  /// Missing or invalid configuration value
  #[error("Invalid configuration: {0}")]
  Config(#[from] ::config::ConfigError),
}
