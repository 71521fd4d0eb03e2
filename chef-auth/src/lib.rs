//! # chef-auth
//!
//! `chef-auth` implements the request signing protocol of the Chef server API, `X-Ops-Sign: version=1.0`.
//!
//! A request is reduced to a five-line canonical string, the string is transformed with the client's RSA
//! private key (PKCS#1 v1.5 type-1 padding, no digest prefix), and the result is base64-encoded and split into
//! 60-character lines, each sent in its own numbered `X-Ops-Authorization-N` header.
//!
//! Everything in this crate is pure and deterministic given a timestamp; no I/O is performed.

mod canonical;
mod crypto;
mod digest;
mod error;
mod headers;
mod trace;

pub mod prelude {
  pub use crate::{
    canonical::{canonical_path, canonical_request, canonical_time, CanonicalRequest, CanonicalTime},
    crypto::{PublicKey, SecretKey, SigningKey, VerifyingKey},
    digest::{chunk_encode, content_hash, BASE64_LINE_WIDTH},
    error::{ChefAuthError, ChefAuthResult},
    headers::{
      build_headers, build_headers_at, verify_headers, AuthorizationHeaders, AUTHORIZATION_HEADER_PREFIX,
      CONTENT_HASH_HEADER, SIGN_HEADER, SIGN_VERSION, TIMESTAMP_HEADER, USER_ID_HEADER,
    },
  };
}

/* ----------------------------------------------------------------- */
