use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{ApiMethod, HttpCall, HttpReply, Result, TraderError};
use crate::ports::HttpSessionPort;

pub const USER_AGENT: &str = concat!("steam-trader/", env!("STEAM_TRADER_VERSION"));

/// Session backed by a pooled `reqwest::Client`.
///
/// Closing drops this session's handle on the pool; once every clone of the
/// client is gone the idle connections are released.
pub struct ReqwestSession {
    client: RwLock<Option<reqwest::Client>>,
}

impl ReqwestSession {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TraderError::InvalidConfiguration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::from_client(client))
    }

    /// Wrap an existing client, sharing its connection pool.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self {
            client: RwLock::new(Some(client)),
        }
    }
}

#[async_trait]
impl HttpSessionPort for ReqwestSession {
    async fn execute(&self, call: &HttpCall) -> Result<HttpReply> {
        let client = self.client.read().await.clone().ok_or(TraderError::SessionClosed)?;

        let mut request = client
            .request(convert_method(call.method), call.url.as_str())
            .timeout(call.timeout);

        match call.method {
            ApiMethod::Get => request = request.query(&call.query),
            ApiMethod::Post => request = request.form(&call.form),
        }

        let http_response = request.send().await.map_err(convert_error)?;
        let status = http_response.status();
        log::debug!("{} {} -> {}", call.method, call.url.path(), status);

        let content_type = http_response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = http_response.bytes().await.map_err(convert_error)?.to_vec();

        let mut reply = HttpReply::new(status).with_body(body);
        if let Some(content_type) = content_type {
            reply = reply.with_content_type(content_type);
        }
        Ok(reply)
    }

    async fn close(&self) -> bool {
        let released = self.client.write().await.take().is_some();
        if released {
            log::debug!("Released HTTP connection pool");
        }
        released
    }

    async fn is_closed(&self) -> bool {
        self.client.read().await.is_none()
    }
}

fn convert_method(method: ApiMethod) -> reqwest::Method {
    match method {
        ApiMethod::Get => reqwest::Method::GET,
        ApiMethod::Post => reqwest::Method::POST,
    }
}

// The URL of a GET carries the API key in its query string, keep it out of messages
fn convert_error(e: reqwest::Error) -> TraderError {
    let e = e.without_url();
    if e.is_timeout() {
        TraderError::Timeout
    } else {
        TraderError::ConnectionFailed(format!("HTTP request failed: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let session = ReqwestSession::new().unwrap();
        assert!(!session.is_closed().await);

        assert!(session.close().await);
        assert!(!session.close().await);

        assert!(session.is_closed().await);
    }

    #[tokio::test]
    async fn test_execute_after_close_fails() {
        let session = ReqwestSession::from_client(reqwest::Client::new());
        session.close().await;

        let call = HttpCall::new(
            ApiMethod::Get,
            "http://127.0.0.1:9/getbalance/".parse().unwrap(),
            &crate::domain::Envelope::new("k"),
            Duration::from_secs(1),
        );

        assert!(matches!(session.execute(&call).await, Err(TraderError::SessionClosed)));
    }

    #[tokio::test]
    async fn test_connection_error_does_not_expose_key() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let session = ReqwestSession::new().unwrap();
        let call = HttpCall::new(
            ApiMethod::Get,
            format!("http://{}/getbalance/", addr).parse().unwrap(),
            &crate::domain::Envelope::new("SUPER-SECRET-KEY"),
            Duration::from_secs(5),
        );

        let err = session.execute(&call).await.expect_err("closed port must fail");

        assert!(matches!(err, TraderError::ConnectionFailed(_)));
        assert!(!err.to_string().contains("SUPER-SECRET-KEY"), "key leaked: {}", err);
    }

    #[test]
    fn test_user_agent_names_crate() {
        assert!(USER_AGENT.starts_with("steam-trader/"));
    }
}
