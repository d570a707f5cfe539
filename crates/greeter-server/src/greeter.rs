//! The `helloworld.Greeter` service.

use futures_util::future::ready;
use greeter_protocol::{HelloReply, HelloRequest, SAY_HELLO};
use tracing::info;

use crate::router::Router;

/// Returns `"Hello "` followed by the requested name.
///
/// Never fails; an empty name yields `"Hello "`.
pub fn say_hello(request: HelloRequest) -> HelloReply {
    info!(name = %request.name, "Received SayHello");
    HelloReply::new(format!("Hello {}", request.name))
}

/// Builds the router serving the greeter service.
pub fn greeter_router() -> Router {
    Router::new().unary(SAY_HELLO, |request: HelloRequest| ready(say_hello(request)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use greeter_protocol::{Code, codec};

    #[test]
    fn greets_by_name() {
        let reply = say_hello(HelloRequest::new("World"));
        assert_eq!(reply, HelloReply::new("Hello World"));
    }

    #[test]
    fn empty_name() {
        let reply = say_hello(HelloRequest::default());
        assert_eq!(reply.message, "Hello ");
    }

    #[test]
    fn keeps_name_verbatim() {
        for name in ["  padded  ", "Zoë", "multi\nline", "Hello"] {
            let reply = say_hello(HelloRequest::new(name));
            assert_eq!(reply.message, format!("Hello {name}"));
        }
    }

    #[test]
    fn router_serves_only_say_hello() {
        assert_eq!(greeter_router().methods(), vec![SAY_HELLO]);
    }

    #[tokio::test]
    async fn router_dispatches_say_hello() {
        let router = greeter_router();
        let payload = codec::encode(&HelloRequest::new("Ada"));

        let reply = router.route(SAY_HELLO, &payload, None).await.unwrap();
        let reply: HelloReply = codec::decode(&reply).unwrap();
        assert_eq!(reply.message, "Hello Ada");
    }

    #[tokio::test]
    async fn router_rejects_other_greeter_methods() {
        let status = greeter_router()
            .route("/helloworld.Greeter/SayGoodbye", &[], None)
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::Unimplemented);
    }
}
