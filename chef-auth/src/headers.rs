use crate::{
  canonical::{canonical_time, CanonicalRequest},
  crypto::{SigningKey, VerifyingKey},
  digest::{chunk_encode, content_hash},
  error::{ChefAuthError, ChefAuthResult},
  trace::*,
};
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, TimeZone, Utc};
use indexmap::IndexMap;

/// Prefix of the numbered signature chunk headers, `X-Ops-Authorization-1`, `X-Ops-Authorization-2`, ...
pub const AUTHORIZATION_HEADER_PREFIX: &str = "X-Ops-Authorization-";
/// Header carrying the canonical timestamp
pub const TIMESTAMP_HEADER: &str = "X-Ops-Timestamp";
/// Header carrying the content hash of the body
pub const CONTENT_HASH_HEADER: &str = "X-Ops-Content-Hash";
/// Header carrying the client name
pub const USER_ID_HEADER: &str = "X-Ops-UserId";
/// Header announcing the signing protocol
pub const SIGN_HEADER: &str = "X-Ops-Sign";
/// Only supported signing protocol
pub const SIGN_VERSION: &str = "version=1.0";

/// Header name to value, in insertion order. Names keep their exact case.
pub type AuthorizationHeaders = IndexMap<String, String>;

/* --------------------------------------- */
/// Builds the signed header set for a request at the current time.
///
/// `base_headers` is copied, never mutated. The returned map holds the base headers followed by
/// `X-Ops-Authorization-N` for each signature line, then `X-Ops-Timestamp`, `X-Ops-Content-Hash` and `X-Ops-UserId`.
pub fn build_headers<K>(
  base_headers: &AuthorizationHeaders,
  method: &str,
  path: &str,
  signing_key: &K,
  user_id: &str,
  body: &[u8],
) -> ChefAuthResult<AuthorizationHeaders>
where
  K: SigningKey + ?Sized,
{
  build_headers_at(base_headers, method, path, signing_key, user_id, body, &Utc::now())
}

/// Same as [`build_headers`] with an explicit timestamp
pub fn build_headers_at<K, Tz>(
  base_headers: &AuthorizationHeaders,
  method: &str,
  path: &str,
  signing_key: &K,
  user_id: &str,
  body: &[u8],
  timestamp: &DateTime<Tz>,
) -> ChefAuthResult<AuthorizationHeaders>
where
  K: SigningKey + ?Sized,
  Tz: TimeZone,
{
  let mut headers = base_headers.clone();
  let timestamp = canonical_time(timestamp);
  let hashed_body = content_hash(body);

  let canonical = CanonicalRequest::new(method, path, &hashed_body, timestamp.as_str(), user_id);
  let signature = signing_key.sign(&canonical.as_bytes())?;
  let signature_lines = chunk_encode(&signature);
  debug!(
    "Signed {} {} as {} into {} authorization headers",
    method,
    path,
    user_id,
    signature_lines.len()
  );

  for (i, line) in signature_lines.into_iter().enumerate() {
    headers.insert(format!("{AUTHORIZATION_HEADER_PREFIX}{}", i + 1), line);
  }
  headers.insert(TIMESTAMP_HEADER.to_string(), timestamp);
  headers.insert(CONTENT_HASH_HEADER.to_string(), hashed_body);
  headers.insert(USER_ID_HEADER.to_string(), user_id.to_string());
  Ok(headers)
}

/* --------------------------------------- */
/// Verifies a signed header set against the request it came with, as the server does.
///
/// Header names are matched case-insensitively since they may have passed through the wire.
/// The signature lines are concatenated in numeric order starting at 1.
pub fn verify_headers<K>(
  headers: &AuthorizationHeaders,
  method: &str,
  path: &str,
  body: &[u8],
  verifying_key: &K,
) -> ChefAuthResult<()>
where
  K: VerifyingKey + ?Sized,
{
  let timestamp = required_header(headers, TIMESTAMP_HEADER)?;
  let user_id = required_header(headers, USER_ID_HEADER)?;
  let transmitted_hash = required_header(headers, CONTENT_HASH_HEADER)?;

  let hashed_body = content_hash(body);
  if hashed_body != transmitted_hash {
    return Err(ChefAuthError::InvalidSignature(
      "Content hash does not match the body".to_string(),
    ));
  }

  let signature_b64 = (1..)
    .map_while(|i| find_header(headers, &format!("{AUTHORIZATION_HEADER_PREFIX}{i}")))
    .collect::<String>();
  if signature_b64.is_empty() {
    return Err(ChefAuthError::MissingAuthorizationHeader(format!(
      "{AUTHORIZATION_HEADER_PREFIX}1"
    )));
  }
  let signature = general_purpose::STANDARD.decode(signature_b64)?;

  let canonical = CanonicalRequest::new(method, path, &hashed_body, timestamp, user_id);
  verifying_key.verify(&canonical.as_bytes(), &signature)
}

fn find_header<'a>(headers: &'a AuthorizationHeaders, name: &str) -> Option<&'a str> {
  headers
    .iter()
    .find(|(k, _)| k.eq_ignore_ascii_case(name))
    .map(|(_, v)| v.as_str())
}

fn required_header<'a>(headers: &'a AuthorizationHeaders, name: &str) -> ChefAuthResult<&'a str> {
  find_header(headers, name).ok_or_else(|| ChefAuthError::MissingAuthorizationHeader(name.to_string()))
}

/* --------------------------------------- */
