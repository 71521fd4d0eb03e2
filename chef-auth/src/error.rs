use thiserror::Error;

/// Result type for chef request signing
pub type ChefAuthResult<T> = std::result::Result<T, ChefAuthError>;

/// Error type for chef request signing
#[derive(Error, Debug)]
pub enum ChefAuthError {
  #[error("Base64 decode error: {0}")]
  Base64DecodeError(#[from] base64::DecodeError),

  /* ----- Crypto errors ----- */
  /// Private key material is malformed, unparsable or not an RSA key
  #[error("Failed to parse private key: {0}")]
  ParsePrivateKeyError(String),
  /// Invalid public key
  #[error("Failed to parse public key: {0}")]
  ParsePublicKeyError(String),

  /// The private-key transform failed, e.g., the canonical request does not fit in the modulus
  #[error("Failed to sign canonical request: {0}")]
  SignError(String),

  /// Invalid Signature
  #[error("Invalid Signature: {0}")]
  InvalidSignature(String),

  /* ----- Header errors ----- */
  /// A header required for verification is absent
  #[error("Missing authorization header: {0}")]
  MissingAuthorizationHeader(String),
}
