#![cfg(test)]
#![allow(dead_code)]

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ServerBuilder;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn query_params(&self) -> Vec<(String, String)> {
        parse_urlencoded(self.query.as_deref().unwrap_or(""))
    }

    pub fn form_params(&self) -> Vec<(String, String)> {
        parse_urlencoded(&self.body)
    }
}

fn parse_urlencoded(input: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(input.as_bytes()).into_owned().collect()
}

#[derive(Debug, Clone)]
pub struct MockReply {
    pub status: u16,
    pub content_type: String,
    pub body: String,
    pub delay: Option<Duration>,
}

impl MockReply {
    pub fn json(value: Value) -> Self {
        Self {
            status: 200,
            content_type: "application/json".to_string(),
            body: value.to_string(),
            delay: None,
        }
    }

    pub fn raw(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "application/json".to_string(),
            body: body.to_string(),
            delay: None,
        }
    }

    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = content_type.to_string();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl Default for MockReply {
    fn default() -> Self {
        Self::json(serde_json::json!({"success": true}))
    }
}

#[derive(Default)]
struct ServerState {
    requests: Mutex<Vec<RecordedRequest>>,
    replies: Mutex<HashMap<String, MockReply>>,
}

/// Local stand-in for the trading API that records every request it receives.
pub struct MockApiServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
    server_handle: JoinHandle<()>,
}

impl MockApiServer {
    pub async fn start() -> Result<Self, Box<dyn std::error::Error>> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(ServerState::default());

        let server_state = state.clone();
        let server_handle = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, _)) => {
                        let io = TokioIo::new(stream);
                        let state = server_state.clone();

                        tokio::spawn(async move {
                            let service = service_fn(move |req| handle(req, state.clone()));

                            if let Err(_err) = ServerBuilder::new(TokioExecutor::new())
                                .serve_connection(io, service)
                                .await
                            {
                                // Clients hanging up after a timeout are expected
                            }
                        });
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            addr,
            state,
            server_handle,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Script the reply served for a path such as `/getbalance/`.
    pub fn reply_to(&self, path: &str, reply: MockReply) {
        self.state.replies.lock().unwrap().insert(path.to_string(), reply);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests().last().cloned().expect("server received no request")
    }
}

impl Drop for MockApiServer {
    fn drop(&mut self) {
        self.server_handle.abort();
    }
}

async fn handle(req: Request<Incoming>, state: Arc<ServerState>) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);
    let content_type = req
        .headers()
        .get(hyper::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let body = req
        .into_body()
        .collect()
        .await
        .map(|collected| collected.to_bytes())
        .unwrap_or_default();

    state.requests.lock().unwrap().push(RecordedRequest {
        method,
        path: path.clone(),
        query,
        content_type,
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    let reply = state.replies.lock().unwrap().get(&path).cloned().unwrap_or_default();
    if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
    }

    let response = Response::builder()
        .status(reply.status)
        .header(hyper::header::CONTENT_TYPE, reply.content_type.as_str())
        .body(Full::new(Bytes::from(reply.body)))
        .expect("valid mock response");

    Ok(response)
}
