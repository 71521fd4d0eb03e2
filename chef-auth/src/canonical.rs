use crate::digest::content_hash;
use chrono::{DateTime, TimeZone, Utc};

/// strftime pattern of `X-Ops-Timestamp`: UTC, second precision, literal `Z`
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/* --------------------------------------- */
/// Collapses every run of `/` into a single `/` and strips a trailing `/` unless the path is the root.
pub fn canonical_path(path: &str) -> String {
  let mut canonical = String::with_capacity(path.len());
  let mut after_slash = false;
  for c in path.chars() {
    if c == '/' {
      if after_slash {
        continue;
      }
      after_slash = true;
    } else {
      after_slash = false;
    }
    canonical.push(c);
  }
  if canonical.len() > 1 && canonical.ends_with('/') {
    canonical.pop();
  }
  canonical
}

/// Formats a timestamp as `YYYY-MM-DDTHH:MM:SSZ` in UTC, dropping sub-second precision.
pub fn canonical_time<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> String {
  timestamp.with_timezone(&Utc).format(TIMESTAMP_FORMAT).to_string()
}

/// A value usable as the `X-Ops-Timestamp` field of a canonical request.
///
/// Structured times are formatted with [`canonical_time`]; strings are taken verbatim, as they are
/// when a received request is verified.
pub trait CanonicalTime {
  fn to_canonical_time(&self) -> String;
}

impl<Tz: TimeZone> CanonicalTime for DateTime<Tz> {
  fn to_canonical_time(&self) -> String {
    canonical_time(self)
  }
}

impl CanonicalTime for str {
  fn to_canonical_time(&self) -> String {
    self.to_string()
  }
}

impl CanonicalTime for String {
  fn to_canonical_time(&self) -> String {
    self.clone()
  }
}

/* --------------------------------------- */
/// Canonical request
/// The exact input of the private-key transform for `X-Ops-Sign: version=1.0`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
  /// uppercased http method
  method: String,
  /// content hash of the canonicalized path
  hashed_path: String,
  /// content hash of the request body
  content_hash: String,
  /// canonical timestamp
  timestamp: String,
  /// client name
  user_id: String,
}

impl CanonicalRequest {
  /// Builds the canonical request. The method is uppercased and the path is canonicalized then hashed.
  pub fn new<T>(method: &str, path: &str, content_hash_of_body: &str, timestamp: &T, user_id: &str) -> Self
  where
    T: CanonicalTime + ?Sized,
  {
    let path = canonical_path(path);
    Self {
      method: method.to_uppercase(),
      hashed_path: content_hash(path.as_bytes()),
      content_hash: content_hash_of_body.to_string(),
      timestamp: timestamp.to_canonical_time(),
      user_id: user_id.to_string(),
    }
  }

  /// Returns the canonical request string as bytes to be signed
  pub fn as_bytes(&self) -> Vec<u8> {
    self.to_string().into_bytes()
  }

  pub fn timestamp(&self) -> &str {
    &self.timestamp
  }
}

impl std::fmt::Display for CanonicalRequest {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "Method:{}\nHashed Path:{}\nX-Ops-Content-Hash:{}\nX-Ops-Timestamp:{}\nX-Ops-UserId:{}",
      self.method, self.hashed_path, self.content_hash, self.timestamp, self.user_id
    )
  }
}

/// Builds the five-line canonical request string
pub fn canonical_request<T>(method: &str, path: &str, content_hash_of_body: &str, timestamp: &T, user_id: &str) -> String
where
  T: CanonicalTime + ?Sized,
{
  CanonicalRequest::new(method, path, content_hash_of_body, timestamp, user_id).to_string()
}

/* --------------------------------------- */
