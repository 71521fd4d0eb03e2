//! # chef-api
//!
//! `chef-api` is a blocking client of the Chef server REST API. Every request is signed with the client's RSA key
//! through [`chef_auth`] and sent over a keep-alive connection; responses with status 500 are retried a bounded
//! number of times with a fixed pause.
//!
//! ```no_run
//! use chef_api::{ChefApiError, ChefClient, ClientConfig, Credentials};
//!
//! # fn main() -> Result<(), ChefApiError> {
//! let config = ClientConfig::new("https://chef.example.com/organizations/acme");
//! let credentials = Credentials::from_key_file("admin", "/etc/chef/client.pem")?;
//! let client = ChefClient::new(&config, credentials)?;
//! let res = client.request(http::Method::GET, "/nodes/web1", "")?;
//! println!("{} {}", res.status(), String::from_utf8_lossy(res.body()));
//! # Ok(())
//! # }
//! ```
//!
//! The [`session`] module defines the contract used to run commands on nodes over a secure remote shell.

mod client;
mod config;
mod error;
pub mod session;
mod trace;
mod transport;


pub use chef_auth::prelude;
pub use crate::client::{from_header_map, to_header_map, ChefClient, Credentials, Endpoint};
pub use crate::config::{env_vars, ClientConfig, RetryPolicy, DEFAULT_CHEF_VERSION, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_INTERVAL, ENV_PREFIX};
pub use crate::error::{ChefApiError, ChefApiResult};
pub use crate::transport::{Transport, UreqTransport};
