//! Daemon-side request handling

use std::future::Future;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Turns one decoded request into one response
///
/// The server clones the handler once per accepted connection; shared state
/// belongs behind an `Arc`.
pub trait RequestHandler: Clone + Send + 'static {
    type Req: DeserializeOwned + Send + 'static;
    type Res: Serialize + Send + 'static;

    fn handle(&mut self, request: Self::Req) -> impl Future<Output = Self::Res> + Send;
}

/// Handler that replies with the request it received
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoHandler;

impl RequestHandler for EchoHandler {
    type Req = serde_json::Value;
    type Res = serde_json::Value;

    async fn handle(&mut self, request: Self::Req) -> Self::Res {
        request
    }
}
