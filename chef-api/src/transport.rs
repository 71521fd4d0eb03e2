use crate::error::ChefApiResult;
use bytes::Bytes;
use http::{Request, Response};
use ureq::Agent;

/* --------------------------------------- */
/// A blocking http transport that sends one request and reads the whole response.
///
/// Status codes are never turned into errors here; only connection-level failures are.
pub trait Transport {
  fn send(&self, request: Request<Bytes>) -> ChefApiResult<Response<Bytes>>;
}

impl<T: Transport + ?Sized> Transport for &T {
  fn send(&self, request: Request<Bytes>) -> ChefApiResult<Response<Bytes>> {
    (**self).send(request)
  }
}

/* --------------------------------------- */
/// Transport over a `ureq` agent. The agent keeps the connection to the server alive between requests.
///
/// Redirects are not followed: the signature covers the requested path only, so a 3xx goes back to the caller.
/// Response bodies are read whole, without a size limit.
#[derive(Debug, Clone)]
pub struct UreqTransport {
  agent: Agent,
}

impl Default for UreqTransport {
  fn default() -> Self {
    Self::new()
  }
}

impl UreqTransport {
  pub fn new() -> Self {
    let config = Agent::config_builder()
      .http_status_as_error(false)
      .max_redirects(0)
      .build();
    Self {
      agent: Agent::new_with_config(config),
    }
  }

  /// Use a preconfigured agent, e.g., with timeouts or a proxy.
  /// It must neither treat status codes as errors nor follow redirects.
  pub fn with_agent(agent: Agent) -> Self {
    Self { agent }
  }
}

impl Transport for UreqTransport {
  fn send(&self, request: Request<Bytes>) -> ChefApiResult<Response<Bytes>> {
    let (parts, body) = request.into_parts();
    let response = if body.is_empty() {
      self.agent.run(Request::from_parts(parts, ()))?
    } else {
      self.agent.run(Request::from_parts(parts, body.to_vec()))?
    };
    let (parts, mut body) = response.into_parts();
    let body = body.with_config().limit(u64::MAX).read_to_vec()?;
    Ok(Response::from_parts(parts, Bytes::from(body)))
  }
}
