//! Hosted generative model clients.

pub mod auth;
pub mod vertex;

#[cfg(any(test, feature = "testing"))]
pub mod fake;

use async_trait::async_trait;

use crate::error::GenzResult;
use crate::request::Part;

pub use auth::Credentials;
pub use vertex::VertexClient;

/// A model that turns an instruction plus request parts into one text reply.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send one request and wait for the complete (non-streamed) response.
    async fn generate(&self, system_instruction: &str, parts: &[Part]) -> GenzResult<String>;

    /// Short identifier used in logs.
    fn name(&self) -> &str;
}
