//! TCP client for calling the greeter server.

use std::time::Duration;

use prost::Message;
use tokio::net::TcpStream;
use tracing::{debug, warn};

use greeter_protocol::{
    Code, DEFAULT_PORT, HelloReply, HelloRequest, Invocation, Outcome, SAY_HELLO, codec,
    read_message, write_message,
};

use crate::error::{ClientError, ClientResult};

/// Default call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Returns the default server endpoint.
pub fn default_endpoint() -> String {
    format!("127.0.0.1:{}", DEFAULT_PORT)
}

/// Client for the greeter service.
///
/// Each call opens its own connection and closes it when the call ends,
/// whether it succeeded, failed or timed out.
#[derive(Debug, Clone)]
pub struct GreeterClient {
    endpoint: String,
    timeout: Duration,
}

impl GreeterClient {
    /// Creates a new client.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
        }
    }

    /// Creates a client for the default endpoint and timeout.
    pub fn with_defaults() -> Self {
        Self::new(default_endpoint(), DEFAULT_TIMEOUT)
    }

    /// Returns the server endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the per-call timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Calls `SayHello` with the given name.
    pub async fn say_hello(&self, name: impl Into<String>) -> ClientResult<HelloReply> {
        self.unary(SAY_HELLO, &HelloRequest::new(name)).await
    }

    /// Calls any unary method on the server.
    pub async fn unary<Req, Rep>(&self, method: &str, request: &Req) -> ClientResult<Rep>
    where
        Req: Message,
        Rep: Message + Default,
    {
        call(&self.endpoint, method, request, self.timeout).await
    }
}

/// Performs one unary call against `endpoint`.
///
/// Connecting, sending and waiting for the reply are all bounded by
/// `timeout`. The timeout is also sent to the server as the call's deadline.
pub async fn call<Req, Rep>(
    endpoint: &str,
    method: &str,
    request: &Req,
    timeout: Duration,
) -> ClientResult<Rep>
where
    Req: Message,
    Rep: Message + Default,
{
    let invocation = Invocation::new(method, codec::encode(request), Some(timeout));

    debug!(
        endpoint = %endpoint,
        method = %method,
        request_id = %invocation.request_id,
        "calling server"
    );

    let outcome = tokio::time::timeout(timeout, exchange(endpoint, &invocation))
        .await
        .map_err(|_| ClientError::DeadlineExceeded(timeout))??;

    // Validate response correlation
    if outcome.request_id != invocation.request_id {
        warn!(
            expected = %invocation.request_id,
            received = %outcome.request_id,
            "outcome request_id mismatch"
        );
    }

    match outcome.code() {
        Code::Ok => Ok(codec::decode(&outcome.payload)?),
        Code::MalformedMessage => Err(ClientError::MalformedMessage(outcome.detail)),
        Code::DeadlineExceeded => Err(ClientError::DeadlineExceeded(timeout)),
        code => Err(ClientError::Status {
            code,
            detail: outcome.detail,
        }),
    }
}

/// Connects and performs the framed invocation/outcome exchange.
///
/// The stream lives only inside this future.
async fn exchange(endpoint: &str, invocation: &Invocation) -> ClientResult<Outcome> {
    let mut stream = TcpStream::connect(endpoint)
        .await
        .map_err(|e| ClientError::Connect {
            endpoint: endpoint.to_string(),
            source: e,
        })?;
    stream.set_nodelay(true)?;

    write_message(&mut stream, invocation).await?;
    debug!("invocation sent, waiting for outcome");

    let outcome: Outcome = read_message(&mut stream)
        .await?
        .ok_or(ClientError::ConnectionClosed)?;

    debug!(
        request_id = %outcome.request_id,
        code = %outcome.code(),
        "outcome received"
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let client = GreeterClient::new("10.0.0.1:7000", Duration::from_secs(10));
        assert_eq!(client.endpoint(), "10.0.0.1:7000");
        assert_eq!(client.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn default_client() {
        let client = GreeterClient::with_defaults();
        assert_eq!(client.endpoint(), "127.0.0.1:50051");
        assert_eq!(client.timeout(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn unresolvable_endpoint_is_connect_error() {
        let client = GreeterClient::new("no port here", Duration::from_secs(1));
        let result = client.say_hello("x").await;
        assert!(matches!(result, Err(ClientError::Connect { .. })));
    }
}
