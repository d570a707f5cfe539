//! Hello command: one `SayHello` call.

use tracing::info;

use crate::channel::GreeterClient;
use crate::error::ClientResult;

/// Calls `SayHello` with `name` and returns the greeting.
pub async fn greet(client: &GreeterClient, name: &str) -> ClientResult<String> {
    let reply = client.say_hello(name).await?;
    info!(endpoint = client.endpoint(), "Greeting: {}", reply.message);
    Ok(reply.message)
}

/// Calls `SayHello` and prints the greeting to stdout.
pub async fn run(client: &GreeterClient, name: &str) -> ClientResult<()> {
    let message = greet(client, name).await?;
    println!("{}", message);
    Ok(())
}
