use base64::{engine::general_purpose, Engine as _};
use sha1::{Digest, Sha1};

/// Maximum length of a single line of wrapped base64, as emitted by Ruby's `Base64.encode64`
pub const BASE64_LINE_WIDTH: usize = 60;

/* --------------------------------------- */
/// Base64-encodes the given bytes and splits the result into lines of at most 60 characters.
///
/// The lines are returned in order and carry no trailing newline. Empty input gives no lines.
/// Signatures are transmitted one line per `X-Ops-Authorization-N` header.
pub fn chunk_encode(data: &[u8]) -> Vec<String> {
  let encoded = general_purpose::STANDARD.encode(data);
  encoded
    .as_bytes()
    .chunks(BASE64_LINE_WIDTH)
    .map(|line| line.iter().map(|&b| b as char).collect())
    .collect()
}

/// Returns the content hash of the given bytes: SHA-1 digest, base64-encoded, wrapped at 60 characters and
/// joined by `\n`.
pub fn content_hash(data: &[u8]) -> String {
  chunk_encode(&derive_digest(data)).join("\n")
}

/// Returns the raw SHA-1 digest
fn derive_digest(data: &[u8]) -> Vec<u8> {
  let mut hasher = Sha1::new();
  hasher.update(data);
  hasher.finalize().to_vec()
}

/* --------------------------------------- */
