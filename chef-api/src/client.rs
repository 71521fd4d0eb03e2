use crate::{
  config::{load_env, ClientConfig, RetryPolicy},
  error::{ChefApiError, ChefApiResult},
  trace::*,
  transport::{Transport, UreqTransport},
};
use bytes::Bytes;
use chef_auth::prelude::{build_headers, AuthorizationHeaders, SecretKey, SIGN_HEADER, SIGN_VERSION};
use http::{
  header::{HeaderName, HeaderValue},
  uri::{Authority, Scheme},
  HeaderMap, Method, Request, Response, StatusCode, Uri,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Status code treated as transient and retried
const TRANSIENT_STATUS: StatusCode = StatusCode::INTERNAL_SERVER_ERROR;

/* --------------------------------------- */
/// Client name and its RSA private key
#[derive(Debug, Clone)]
pub struct Credentials {
  client_name: String,
  secret_key: SecretKey,
}

impl Credentials {
  pub fn new(client_name: &str, secret_key: SecretKey) -> Self {
    Self {
      client_name: client_name.to_string(),
      secret_key,
    }
  }

  /// Parses the PEM key. Malformed key material fails here, before any request is made.
  pub fn from_pem(client_name: &str, pem: &str) -> ChefApiResult<Self> {
    Ok(Self::new(client_name, SecretKey::from_pem(pem)?))
  }

  /// Reads a PEM key file, e.g. `/etc/chef/client.pem`
  pub fn from_key_file(client_name: &str, key_path: impl AsRef<Path>) -> ChefApiResult<Self> {
    let pem = std::fs::read_to_string(key_path)?;
    Self::from_pem(client_name, &pem)
  }

  /// Reads `CHEF_CLIENT_NAME` and the key file named by `CHEF_CLIENT_KEY`
  pub fn from_env() -> ChefApiResult<Self> {
    let env = load_env::<CredentialsEnv>(None)?;
    Self::from_key_file(&env.client_name, env.client_key)
  }

  pub fn client_name(&self) -> &str {
    &self.client_name
  }

  pub fn secret_key(&self) -> &SecretKey {
    &self.secret_key
  }
}

#[derive(Debug, Deserialize)]
struct CredentialsEnv {
  client_name: String,
  client_key: PathBuf,
}

/* --------------------------------------- */
#[derive(Debug, Clone, PartialEq, Eq)]
/// Where the server lives, derived once from the server url
pub struct Endpoint {
  base_url: String,
  scheme: Scheme,
  host: Authority,
  /// path of the server url without trailing `/`, empty for the root
  path_prefix: String,
}

impl Endpoint {
  pub fn parse(server_url: &str) -> ChefApiResult<Self> {
    let uri = server_url
      .parse::<Uri>()
      .map_err(|e| ChefApiError::InvalidServerUrl(format!("{server_url}: {e}")))?;
    let scheme = uri
      .scheme()
      .cloned()
      .ok_or_else(|| ChefApiError::InvalidServerUrl(format!("{server_url}: no scheme")))?;
    let host = uri
      .authority()
      .cloned()
      .ok_or_else(|| ChefApiError::InvalidServerUrl(format!("{server_url}: no host")))?;
    if uri.query().is_some() {
      return Err(ChefApiError::InvalidServerUrl(format!("{server_url}: query is not allowed")));
    }
    Ok(Self {
      base_url: server_url.to_string(),
      scheme,
      host,
      path_prefix: uri.path().trim_end_matches('/').to_string(),
    })
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  /// Value of the `Host` header
  pub fn host(&self) -> &str {
    self.host.as_str()
  }

  pub fn path_prefix(&self) -> &str {
    &self.path_prefix
  }

  /// Prefix + path, the path that is both sent and signed
  pub fn full_path(&self, path: &str) -> String {
    format!("{}{}", self.path_prefix, path)
  }

  fn uri(&self, full_path: &str) -> ChefApiResult<Uri> {
    Uri::builder()
      .scheme(self.scheme.clone())
      .authority(self.host.clone())
      .path_and_query(full_path)
      .build()
      .map_err(ChefApiError::from)
  }
}

/* --------------------------------------- */
/// Client of a single chef server.
///
/// Each request is signed once and then sent up to `max_attempts` times while the server answers 500.
/// The transport is used from one caller at a time; wrap the client in a lock to share it.
#[derive(Debug)]
pub struct ChefClient<T = UreqTransport> {
  endpoint: Endpoint,
  credentials: Credentials,
  /// headers sent with every request, owned by this client
  base_headers: AuthorizationHeaders,
  retry: RetryPolicy,
  transport: T,
}

impl ChefClient<UreqTransport> {
  pub fn new(config: &ClientConfig, credentials: Credentials) -> ChefApiResult<Self> {
    Self::with_transport(config, credentials, UreqTransport::new())
  }
}

impl<T> ChefClient<T>
where
  T: Transport,
{
  pub fn with_transport(config: &ClientConfig, credentials: Credentials, transport: T) -> ChefApiResult<Self> {
    let endpoint = Endpoint::parse(&config.server_url)?;
    let base_headers = [
      ("Accept", "application/json"),
      ("X-Chef-Version", config.chef_version.as_str()),
      (SIGN_HEADER, SIGN_VERSION),
      ("Content-Type", "application/json"),
      ("Host", endpoint.host()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    debug!(
      "Chef client for {} as {}",
      endpoint.base_url(),
      credentials.client_name()
    );

    Ok(Self {
      endpoint,
      credentials,
      base_headers,
      retry: config.retry,
      transport,
    })
  }

  /// Send a signed request with the configured retry policy
  pub fn request(&self, method: Method, path: &str, body: impl Into<Bytes>) -> ChefApiResult<Response<Bytes>> {
    self.request_with_policy(method, path, body, &self.retry)
  }

  /// Send a signed request with the given retry policy.
  ///
  /// Any status other than 500 is returned as is. After every 500 the calling thread sleeps
  /// `policy.interval`, including after the last attempt. When all attempts got 500, fails with
  /// [`ChefApiError::RequestFailed`] naming `path`. Transport errors are returned immediately.
  ///
  /// The authorization headers, and so `X-Ops-Timestamp`, are computed once and reused by every attempt.
  pub fn request_with_policy(
    &self,
    method: Method,
    path: &str,
    body: impl Into<Bytes>,
    policy: &RetryPolicy,
  ) -> ChefApiResult<Response<Bytes>> {
    let body: Bytes = body.into();
    let full_path = self.endpoint.full_path(path);
    let headers = build_headers(
      &self.base_headers,
      method.as_str(),
      &full_path,
      self.credentials.secret_key(),
      self.credentials.client_name(),
      &body,
    )?;
    let header_map = to_header_map(&headers)?;
    let uri = self.endpoint.uri(&full_path)?;

    for attempt in 1..=policy.max_attempts {
      let mut request = Request::builder()
        .method(method.clone())
        .uri(uri.clone())
        .body(body.clone())?;
      *request.headers_mut() = header_map.clone();

      debug!("{} {} (attempt {}/{})", method, full_path, attempt, policy.max_attempts);
      let response = self.transport.send(request)?;
      if response.status() != TRANSIENT_STATUS {
        return Ok(response);
      }
      warn!(
        "{} {} answered {}, retrying in {:?}",
        method,
        full_path,
        response.status(),
        policy.interval
      );
      std::thread::sleep(policy.interval);
    }

    error!("{} {} failed after {} attempts", method, full_path, policy.max_attempts);
    Err(ChefApiError::RequestFailed {
      path: path.to_string(),
      attempts: policy.max_attempts,
    })
  }

  pub fn endpoint(&self) -> &Endpoint {
    &self.endpoint
  }

  pub fn credentials(&self) -> &Credentials {
    &self.credentials
  }

  /// Headers sent with every request before signing
  pub fn base_headers(&self) -> &AuthorizationHeaders {
    &self.base_headers
  }

  pub fn retry_policy(&self) -> &RetryPolicy {
    &self.retry
  }

  pub fn transport(&self) -> &T {
    &self.transport
  }
}

/// Converts signed headers to wire headers. Names are case-insensitive from here on.
pub fn to_header_map(headers: &AuthorizationHeaders) -> ChefApiResult<HeaderMap> {
  let mut header_map = HeaderMap::with_capacity(headers.len());
  for (name, value) in headers {
    header_map.insert(HeaderName::try_from(name.as_str())?, HeaderValue::from_str(value)?);
  }
  Ok(header_map)
}

/// Converts received wire headers back to a map suitable for verification
pub fn from_header_map(header_map: &HeaderMap) -> AuthorizationHeaders {
  header_map
    .iter()
    .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string())))
    .collect()
}

/* --------------------------------------- */
#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::env_vars;

  #[test]
  fn test_endpoint_with_prefix() {
    let endpoint = Endpoint::parse("https://chef.example.com/organizations/acme").unwrap();
    assert_eq!(endpoint.host(), "chef.example.com");
    assert_eq!(endpoint.path_prefix(), "/organizations/acme");
    assert_eq!(endpoint.full_path("/nodes/web1"), "/organizations/acme/nodes/web1");
    assert_eq!(
      endpoint.uri("/organizations/acme/nodes/web1").unwrap().to_string(),
      "https://chef.example.com/organizations/acme/nodes/web1"
    );
  }

  #[test]
  fn test_endpoint_root() {
    let endpoint = Endpoint::parse("https://chef.example.com:8443").unwrap();
    assert_eq!(endpoint.host(), "chef.example.com:8443");
    assert_eq!(endpoint.path_prefix(), "");
    assert_eq!(endpoint.full_path("/cookbooks"), "/cookbooks");

    let endpoint = Endpoint::parse("https://chef.example.com/").unwrap();
    assert_eq!(endpoint.path_prefix(), "");
  }

  #[test]
  fn test_endpoint_invalid() {
    assert!(matches!(
      Endpoint::parse("chef.example.com"),
      Err(ChefApiError::InvalidServerUrl(_))
    ));
    assert!(matches!(
      Endpoint::parse("/organizations/acme"),
      Err(ChefApiError::InvalidServerUrl(_))
    ));
    assert!(matches!(
      Endpoint::parse("https://chef.example.com/?x=1"),
      Err(ChefApiError::InvalidServerUrl(_))
    ));
  }

  #[test]
  fn test_header_map_roundtrip() {
    let headers = [("X-Ops-UserId", "admin"), ("X-Ops-Authorization-1", "abc+/=")]
      .into_iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect::<AuthorizationHeaders>();
    let header_map = to_header_map(&headers).unwrap();
    assert_eq!(header_map.get("x-ops-userid").unwrap(), "admin");

    let back = from_header_map(&header_map);
    assert_eq!(back.get("x-ops-authorization-1").map(String::as_str), Some("abc+/="));
  }

  #[test]
  fn test_credentials_env() {
    let vars = [(env_vars::CLIENT_NAME, "admin"), (env_vars::CLIENT_KEY, "/etc/chef/client.pem")]
      .into_iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect();
    let env = load_env::<CredentialsEnv>(Some(vars)).unwrap();
    assert_eq!(env.client_name, "admin");
    assert_eq!(env.client_key, PathBuf::from("/etc/chef/client.pem"));

    let vars = [(env_vars::CLIENT_NAME.to_string(), "admin".to_string())].into_iter().collect();
    assert!(matches!(
      load_env::<CredentialsEnv>(Some(vars)),
      Err(ChefApiError::Config(_))
    ));
  }
}
