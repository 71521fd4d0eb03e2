use super::{SigningKey, VerifyingKey};
use crate::{
  error::{ChefAuthError, ChefAuthResult},
  trace::*,
};
use pkcs8::Document;
use rsa::{
  pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey},
  pkcs8::{DecodePrivateKey, DecodePublicKey},
  traits::PublicKeyParts,
  Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey,
};

/// PEM labels accepted for key material
mod pem_labels {
  /// PKCS#1 private key, as written by chef-server and `openssl genrsa -traditional`
  pub const RSA_PRIVATE_KEY: &str = "RSA PRIVATE KEY";
  /// PKCS#8 private key
  pub const PRIVATE_KEY: &str = "PRIVATE KEY";
  /// PKCS#1 public key
  pub const RSA_PUBLIC_KEY: &str = "RSA PUBLIC KEY";
  /// SubjectPublicKeyInfo
  pub const PUBLIC_KEY: &str = "PUBLIC KEY";
}

/// Padding of the raw private-key transform: PKCS#1 v1.5 block type 1 over the data itself, no DigestInfo prefix.
/// This is what OpenSSL's `RSA_private_encrypt` with `RSA_PKCS1_PADDING` produces, and it is deterministic.
fn padding() -> Pkcs1v15Sign {
  Pkcs1v15Sign::new_unprefixed()
}

/* -------------------------------- */
/// RSA secret key of a chef client
#[derive(Clone)]
pub struct SecretKey(RsaPrivateKey);

impl SecretKey {
  /// Derive secret key from der bytes, either PKCS#1 or PKCS#8
  pub fn from_der(der: &[u8]) -> ChefAuthResult<Self> {
    let sk = match RsaPrivateKey::from_pkcs1_der(der) {
      Ok(sk) => {
        debug!("Read PKCS#1 RSA private key");
        sk
      }
      Err(pkcs1_err) => {
        let sk = RsaPrivateKey::from_pkcs8_der(der)
          .map_err(|e| ChefAuthError::ParsePrivateKeyError(format!("neither PKCS#1 ({pkcs1_err}) nor PKCS#8 ({e})")))?;
        debug!("Read PKCS#8 RSA private key");
        sk
      }
    };
    Self::validated(sk)
  }

  /// Derive secret key from pem string
  pub fn from_pem(pem: &str) -> ChefAuthResult<Self> {
    let (label, doc) = Document::from_pem(pem).map_err(|e| ChefAuthError::ParsePrivateKeyError(e.to_string()))?;
    let sk = match label {
      pem_labels::RSA_PRIVATE_KEY => {
        RsaPrivateKey::from_pkcs1_der(doc.as_bytes()).map_err(|e| ChefAuthError::ParsePrivateKeyError(e.to_string()))?
      }
      pem_labels::PRIVATE_KEY => {
        RsaPrivateKey::from_pkcs8_der(doc.as_bytes()).map_err(|e| ChefAuthError::ParsePrivateKeyError(e.to_string()))?
      }
      _ => return Err(ChefAuthError::ParsePrivateKeyError(format!("Invalid tag: {label}"))),
    };
    debug!("Read RSA private key from PEM ({label})");
    Self::validated(sk)
  }

  fn validated(sk: RsaPrivateKey) -> ChefAuthResult<Self> {
    sk.validate()
      .map_err(|e| ChefAuthError::ParsePrivateKeyError(e.to_string()))?;
    Ok(Self(sk))
  }

  /// Get public key from secret key
  pub fn public_key(&self) -> PublicKey {
    PublicKey(self.0.to_public_key())
  }

  /// Modulus size in bytes, which is also the signature size
  pub fn size(&self) -> usize {
    self.0.size()
  }
}

impl std::fmt::Debug for SecretKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SecretKey").field("bits", &(self.size() * 8)).finish_non_exhaustive()
  }
}

impl SigningKey for SecretKey {
  /// Sign data
  fn sign(&self, data: &[u8]) -> ChefAuthResult<Vec<u8>> {
    self
      .0
      .sign(padding(), data)
      .map_err(|e| ChefAuthError::SignError(e.to_string()))
  }
}

impl VerifyingKey for SecretKey {
  fn verify(&self, data: &[u8], signature: &[u8]) -> ChefAuthResult<()> {
    self.public_key().verify(data, signature)
  }
}

/* -------------------------------- */
/// RSA public key of a chef client, used by the receiving side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey(RsaPublicKey);

impl PublicKey {
  /// Convert from pem string, either SubjectPublicKeyInfo or PKCS#1
  pub fn from_pem(pem: &str) -> ChefAuthResult<Self> {
    let (label, doc) = Document::from_pem(pem).map_err(|e| ChefAuthError::ParsePublicKeyError(e.to_string()))?;
    let pk = match label {
      pem_labels::PUBLIC_KEY => {
        RsaPublicKey::from_public_key_der(doc.as_bytes()).map_err(|e| ChefAuthError::ParsePublicKeyError(e.to_string()))?
      }
      pem_labels::RSA_PUBLIC_KEY => {
        RsaPublicKey::from_pkcs1_der(doc.as_bytes()).map_err(|e| ChefAuthError::ParsePublicKeyError(e.to_string()))?
      }
      _ => return Err(ChefAuthError::ParsePublicKeyError(format!("Invalid tag: {label}"))),
    };
    Ok(Self(pk))
  }
}

impl VerifyingKey for PublicKey {
  /// Verify signature
  fn verify(&self, data: &[u8], signature: &[u8]) -> ChefAuthResult<()> {
    self
      .0
      .verify(padding(), data, signature)
      .map_err(|e| ChefAuthError::InvalidSignature(e.to_string()))
  }
}
