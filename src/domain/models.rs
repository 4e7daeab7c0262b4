pub use http::StatusCode;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use super::{Result, TraderError};

/// Relative paths of the remote operations, joined onto the base address.
pub mod endpoints {
    pub const MIN_PRICES: &str = "getminprices/";
    pub const ORDER_BOOK: &str = "orderbook/";
    pub const INVENTORY: &str = "getinventory/";
    pub const CREATE_BUY_ORDER: &str = "createbuyorder/";
    pub const BUY: &str = "buy/";
    pub const SALE: &str = "sale/";
    pub const EDIT_PRICE: &str = "editprice/";
    pub const WS_TOKEN: &str = "getwstoken/";
    pub const BALANCE: &str = "getbalance/";
    pub const EXCHANGE: &str = "exchange/";
    pub const DISCOUNTS: &str = "getdiscounts/";
    pub const TRADE_LINK: &str = "settradelink/";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMethod {
    Get,
    Post,
}

impl ApiMethod {
    pub fn as_str(&self) -> &str {
        match self {
            ApiMethod::Get => "GET",
            ApiMethod::Post => "POST",
        }
    }
}

impl fmt::Display for ApiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiMethod {
    type Err = TraderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Ok(ApiMethod::Get),
            "POST" => Ok(ApiMethod::Post),
            other => Err(TraderError::InvalidRequest(format!("unsupported HTTP method {:?}", other))),
        }
    }
}

/// A single parameter value, rendered as text on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::UInt(v) => write!(f, "{}", v),
            // Debug keeps the fractional part on whole prices ("100.0", not "100")
            ParamValue::Float(v) => write!(f, "{:?}", v),
            ParamValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v.into())
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        ParamValue::UInt(v.into())
    }
}

impl From<u64> for ParamValue {
    fn from(v: u64) -> Self {
        ParamValue::UInt(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

/// Ordered parameter set. Inserting an existing name replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, ParamValue)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        let name = name.into();
        let value = value.into();

        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn extend_from(&mut self, other: &Params) {
        for (name, value) in &other.entries {
            self.insert(name.clone(), value.clone());
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(existing, _)| existing == name).map(|(_, value)| value)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect()
    }
}

/// Parameters actually sent with one request: the API key, then query, then body.
#[derive(Clone)]
pub struct Envelope {
    params: Params,
}

impl Envelope {
    pub const KEY_PARAM: &'static str = "key";

    pub fn new(api_key: &str) -> Self {
        Self {
            params: Params::new().with(Self::KEY_PARAM, api_key),
        }
    }

    pub fn merge(mut self, params: Option<&Params>) -> Self {
        if let Some(params) = params {
            self.params.extend_from(params);
        }
        self
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.params.to_pairs()
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, value) in &self.params.entries {
            if name == Self::KEY_PARAM {
                map.entry(name, &"<redacted>");
            } else {
                map.entry(name, &value.to_string());
            }
        }
        map.finish()
    }
}

/// Fully resolved HTTP exchange handed to a session.
#[derive(Clone)]
pub struct HttpCall {
    pub method: ApiMethod,
    pub url: Url,
    pub query: Vec<(String, String)>,
    pub form: Vec<(String, String)>,
    pub timeout: Duration,
}

impl HttpCall {
    /// GET carries the envelope in the query string, POST in a form body.
    pub fn new(method: ApiMethod, url: Url, envelope: &Envelope, timeout: Duration) -> Self {
        let (query, form) = match method {
            ApiMethod::Get => (envelope.to_pairs(), Vec::new()),
            ApiMethod::Post => (Vec::new(), envelope.to_pairs()),
        };

        Self {
            method,
            url,
            query,
            form,
            timeout,
        }
    }
}

impl fmt::Debug for HttpCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpCall")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("query", &param_names(&self.query))
            .field("form", &param_names(&self.form))
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl HttpReply {
    pub const JSON_MIME: &'static str = "application/json";

    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            content_type: None,
            body: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// JSON reply with the API's content type, as sessions and test doubles produce it.
    pub fn json(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self::new(status).with_content_type(Self::JSON_MIME).with_body(body.into())
    }

    /// Whether the declared media type is `application/json`, parameters ignored.
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .and_then(|value| value.split(';').next())
            .map(|mime| mime.trim().eq_ignore_ascii_case(Self::JSON_MIME))
            .unwrap_or(false)
    }
}

/// Decoded JSON object returned by the API.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    body: Map<String, Value>,
}

impl ApiResponse {
    pub const SUCCESS_FIELD: &'static str = "success";
    pub const ERROR_FIELD: &'static str = "error";

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| TraderError::InvalidResponse(format!("body is not JSON: {}", e)))?;

        match value {
            Value::Object(body) => Ok(Self { body }),
            other => Err(TraderError::InvalidResponse(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn is_success(&self) -> bool {
        self.body.get(Self::SUCCESS_FIELD).map(is_truthy).unwrap_or(false)
    }

    pub fn error_detail(&self) -> Option<String> {
        match self.body.get(Self::ERROR_FIELD) {
            None | Some(Value::Null) => None,
            Some(Value::String(detail)) => Some(detail.clone()),
            Some(other) => Some(other.to_string()),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.body.get(field)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.body
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.body
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.body.clone())
    }
}

impl From<Map<String, Value>> for ApiResponse {
    fn from(body: Map<String, Value>) -> Self {
        Self { body }
    }
}

fn param_names(pairs: &[(String, String)]) -> Vec<&str> {
    pairs.iter().map(|(name, _)| name.as_str()).collect()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
