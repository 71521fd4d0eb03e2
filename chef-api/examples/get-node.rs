use chef_api::{ChefApiResult, ChefClient, ClientConfig, Credentials, RetryPolicy, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_INTERVAL};
use clap::Parser;
use http::Method;
use std::{path::PathBuf, time::Duration};
use tracing_subscriber::EnvFilter;

/// Fetches a node by name.
///
/// CHEF_SERVER_URL=https://chef.example.com/organizations/acme CHEF_CLIENT_NAME=admin \
/// CHEF_CLIENT_KEY=/etc/chef/client.pem RUST_LOG=chef_api=debug cargo run --example get-node -- web1
#[derive(Parser)]
#[command(name = "get-node")]
struct Args {
  /// Node name
  #[arg(default_value = "web1")]
  node: String,

  /// Chef server url, including the organization path
  #[arg(long, env = "CHEF_SERVER_URL")]
  server_url: String,

  /// Client name sent as X-Ops-UserId
  #[arg(long, env = "CHEF_CLIENT_NAME")]
  client_name: String,

  /// PEM private key of the client
  #[arg(long, env = "CHEF_CLIENT_KEY")]
  client_key: PathBuf,

  /// Sends per request while the server answers 500
  #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
  attempts: u32,

  /// Seconds to wait after each 500
  #[arg(long, default_value_t = DEFAULT_RETRY_INTERVAL.as_secs())]
  retry_interval: u64,
}

fn main() -> ChefApiResult<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let args = Args::parse();
  let mut config = ClientConfig::new(&args.server_url);
  config.set_retry(RetryPolicy::new(args.attempts, Duration::from_secs(args.retry_interval)));
  let credentials = Credentials::from_key_file(&args.client_name, &args.client_key)?;
  let client = ChefClient::new(&config, credentials)?;

  let res = client.request(Method::GET, &format!("/nodes/{}", args.node), "")?;
  println!("{}", res.status());
  println!("{}", String::from_utf8_lossy(res.body()));
  Ok(())
}
