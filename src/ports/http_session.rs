use crate::domain::{HttpCall, HttpReply, Result};
use async_trait::async_trait;

/// Port for the pooled HTTP connection resource shared by every API call
#[async_trait]
pub trait HttpSessionPort: Send + Sync {
    /// Send one call and read its full body
    ///
    /// Non-2xx statuses are returned as a reply, not as an error.
    async fn execute(&self, call: &HttpCall) -> Result<HttpReply>;

    /// Release the underlying pool. Calling it again has no effect.
    ///
    /// Returns true only for the call that actually released it.
    async fn close(&self) -> bool;

    async fn is_closed(&self) -> bool;
}
