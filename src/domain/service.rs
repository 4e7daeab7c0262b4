use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info_span, Instrument};
use url::Url;
use uuid::Uuid;

use super::{ApiMethod, ApiResponse, Envelope, HttpCall, Params, Result, TraderError};
use crate::ports::HttpSessionPort;

/// Generic request primitive: envelope assembly, dispatch and failure normalization.
#[derive(Clone)]
pub struct ApiService {
    api_key: String,
    base_url: Url,
    timeout: Duration,
    session: Arc<dyn HttpSessionPort>,
}

impl ApiService {
    pub fn new(api_key: String, base_url: Url, timeout: Duration, session: Arc<dyn HttpSessionPort>) -> Self {
        Self {
            api_key,
            base_url,
            timeout,
            session,
        }
    }

    pub fn session(&self) -> &Arc<dyn HttpSessionPort> {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Perform one API call.
    ///
    /// Returns `None` when the call could not complete (timeout, network error,
    /// non-2xx status, non-JSON content type, undecodable body). A decoded body is always returned,
    /// even when its `success` field is false; callers check it themselves.
    pub async fn request(
        &self,
        method: ApiMethod,
        endpoint: &str,
        query: Option<&Params>,
        body: Option<&Params>,
    ) -> Option<ApiResponse> {
        let span = info_span!("api_request", call_id = %Uuid::new_v4(), %method, endpoint);

        async move {
            match self.try_request(method, endpoint, query, body).await {
                Ok(response) => {
                    if !response.is_success() {
                        error!(
                            "API {} returned an error: {}",
                            endpoint,
                            response.error_detail().unwrap_or_else(|| "no details".to_string())
                        );
                    }
                    Some(response)
                }
                Err(TraderError::Timeout) => {
                    error!("Timed out requesting {}", endpoint);
                    None
                }
                Err(e) if e.is_transport() => {
                    error!("Network error requesting {}: {}", endpoint, e);
                    None
                }
                Err(e) => {
                    error!("Unexpected error requesting {}: {}", endpoint, e);
                    None
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn try_request(
        &self,
        method: ApiMethod,
        endpoint: &str,
        query: Option<&Params>,
        body: Option<&Params>,
    ) -> Result<ApiResponse> {
        let url = self.endpoint_url(endpoint)?;
        let envelope = Envelope::new(&self.api_key).merge(query).merge(body);
        debug!("{} {} {:?}", method, url.path(), envelope);

        let call = HttpCall::new(method, url, &envelope, self.timeout);

        let reply = tokio::time::timeout(self.timeout, self.session.execute(&call))
            .await
            .map_err(|_| TraderError::Timeout)??;

        if !reply.status.is_success() {
            return Err(TraderError::HttpStatus(reply.status));
        }
        if !reply.is_json() {
            return Err(TraderError::InvalidResponse(format!(
                "unexpected content type {}",
                reply.content_type.as_deref().unwrap_or("<none>")
            )));
        }

        ApiResponse::from_slice(&reply.body)
    }

    fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
        let relative = endpoint.trim_start_matches('/');
        if relative.is_empty() {
            return Err(TraderError::InvalidRequest("endpoint is empty".to_string()));
        }
        if Url::parse(relative).is_ok() {
            return Err(TraderError::InvalidRequest(format!(
                "endpoint {:?} must be a relative path",
                endpoint
            )));
        }

        self.base_url
            .join(relative)
            .map_err(|e| TraderError::InvalidRequest(format!("cannot join endpoint {:?}: {}", endpoint, e)))
    }
}
