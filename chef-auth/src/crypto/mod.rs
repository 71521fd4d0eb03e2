mod asymmetric;

use crate::error::ChefAuthResult;

pub use asymmetric::{PublicKey, SecretKey};

/// SigningKey trait
pub trait SigningKey {
  /// Applies the private-key transform to the data, returning a block of the modulus size
  fn sign(&self, data: &[u8]) -> ChefAuthResult<Vec<u8>>;
}

/// VerifyingKey trait
pub trait VerifyingKey {
  /// Checks that the signature is the private-key transform of the data
  fn verify(&self, data: &[u8], signature: &[u8]) -> ChefAuthResult<()>;
}
