//! Method table mapping method identifiers to typed handlers.
//!
//! Handlers are registered with their concrete request and reply types and
//! stored type-erased, so the connection loop only ever sees raw payloads.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use greeter_protocol::{Code, codec};
use prost::Message;

/// A failed dispatch: the status code and detail sent back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    code: Code,
    detail: String,
}

impl Status {
    /// Creates a status with the given code and detail.
    pub fn new(code: Code, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
        }
    }

    /// Returns the status code.
    pub fn code(&self) -> Code {
        self.code
    }

    /// Returns the detail text.
    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.detail)
    }
}

/// Set of methods that can be called by identifier with encoded payloads.
#[derive(Default, Clone)]
pub struct Router {
    methods: BTreeMap<String, Arc<dyn DynamicMethod>>,
}

impl Router {
    /// Creates an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a unary handler under `method`.
    ///
    /// A later registration under the same identifier replaces the earlier one.
    pub fn unary<Req, Rep, F, Fut>(mut self, method: impl Into<String>, handler: F) -> Self
    where
        Req: Message + Default + 'static,
        Rep: Message + Send + 'static,
        F: Fn(Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Rep> + Send + 'static,
    {
        let unary = UnaryMethod {
            handler,
            _types: PhantomData,
        };
        self.methods.insert(method.into(), Arc::new(unary));
        self
    }

    /// Returns the registered method identifiers in sorted order.
    pub fn methods(&self) -> Vec<&str> {
        self.methods.keys().map(String::as_str).collect()
    }

    /// Returns true if a handler is registered for `method`.
    pub fn has_method(&self, method: &str) -> bool {
        self.methods.contains_key(method)
    }

    /// Decodes `payload`, runs the handler for `method` and encodes its reply.
    ///
    /// The handler is not invoked when the method is unknown or the payload
    /// does not decode. With a `deadline`, the handler is abandoned once it
    /// runs longer than that.
    pub async fn route(
        &self,
        method: &str,
        payload: &[u8],
        deadline: Option<Duration>,
    ) -> Result<Vec<u8>, Status> {
        let call = self
            .methods
            .get(method)
            .ok_or_else(|| Status::new(Code::Unimplemented, format!("unknown method {method}")))?
            .call(payload)?;

        match deadline {
            Some(deadline) => tokio::time::timeout(deadline, call).await.map_err(|_| {
                Status::new(
                    Code::DeadlineExceeded,
                    format!("handler exceeded {}ms deadline", deadline.as_millis()),
                )
            }),
            None => Ok(call.await),
        }
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("methods", &self.methods())
            .finish()
    }
}

/// Type-erased handler stored in the router.
trait DynamicMethod: Send + Sync {
    fn call(&self, payload: &[u8]) -> Result<BoxFuture<'static, Vec<u8>>, Status>;
}

struct UnaryMethod<F, Req, Rep> {
    handler: F,
    _types: PhantomData<fn(Req) -> Rep>,
}

impl<F, Fut, Req, Rep> DynamicMethod for UnaryMethod<F, Req, Rep>
where
    Req: Message + Default + 'static,
    Rep: Message + Send + 'static,
    F: Fn(Req) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Rep> + Send + 'static,
{
    fn call(&self, payload: &[u8]) -> Result<BoxFuture<'static, Vec<u8>>, Status> {
        let request: Req = codec::decode(payload)
            .map_err(|e| Status::new(Code::MalformedMessage, e.to_string()))?;
        let reply = (self.handler)(request);
        Ok(Box::pin(async move { codec::encode(&reply.await) }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::future::ready;
    use greeter_protocol::{HelloReply, HelloRequest};

    fn echo_router() -> Router {
        Router::new().unary("/test.Echo/Echo", |req: HelloRequest| {
            ready(HelloReply::new(req.name))
        })
    }

    #[tokio::test]
    async fn routes_to_registered_method() {
        let router = echo_router();
        let payload = codec::encode(&HelloRequest::new("ping"));

        let reply = router.route("/test.Echo/Echo", &payload, None).await.unwrap();
        let reply: HelloReply = codec::decode(&reply).unwrap();
        assert_eq!(reply.message, "ping");
    }

    #[tokio::test]
    async fn unknown_method_is_unimplemented() {
        let router = echo_router();
        let status = router.route("/test.Echo/Missing", &[], None).await.unwrap_err();
        assert_eq!(status.code(), Code::Unimplemented);
        assert!(status.detail().contains("/test.Echo/Missing"));
    }

    #[tokio::test]
    async fn malformed_payload_skips_handler() {
        let called = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = called.clone();
        let router = Router::new().unary("m", move |req: HelloRequest| {
            flag.store(true, std::sync::atomic::Ordering::SeqCst);
            ready(HelloReply::new(req.name))
        });

        let status = router.route("m", &[0x0a, 0x05], None).await.unwrap_err();
        assert_eq!(status.code(), Code::MalformedMessage);
        assert!(!called.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn slow_handler_hits_deadline() {
        let router = Router::new().unary("slow", |_: HelloRequest| async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            HelloReply::default()
        });

        let status = router
            .route("slow", &[], Some(Duration::from_millis(20)))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::DeadlineExceeded);
    }

    #[tokio::test]
    async fn fast_handler_meets_deadline() {
        let router = echo_router();
        let result = router
            .route("/test.Echo/Echo", &[], Some(Duration::from_secs(5)))
            .await;
        assert!(result.is_ok());
    }

    #[test]
    fn methods_are_listed_sorted() {
        let router = Router::new()
            .unary("b", |r: HelloRequest| ready(HelloReply::new(r.name)))
            .unary("a", |r: HelloRequest| ready(HelloReply::new(r.name)));

        assert_eq!(router.methods(), vec!["a", "b"]);
        assert!(router.has_method("a"));
        assert!(!router.has_method("c"));
        assert_eq!(format!("{router:?}"), r#"Router { methods: ["a", "b"] }"#);
    }

    #[test]
    fn status_display() {
        let status = Status::new(Code::Internal, "boom");
        assert_eq!(status.to_string(), "INTERNAL: boom");
    }
}
