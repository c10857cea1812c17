//! Transport capability and its reqwest implementation.

use async_trait::async_trait;
use log::debug;
use reqwest::{
    Client, Method,
    header::{AUTHORIZATION, HeaderValue},
};
use serde_json::Value;

/// A single request handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    /// JSON body, sent only when present.
    pub data: Option<Value>,
    /// Value of the `Authorization` header. `None` sends no header at all.
    pub authorization: Option<String>,
}

/// A successful (2xx) response.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub data: Value,
}

/// The response attached to a failed request.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    /// `None` when the status could not be read as a number.
    pub status: Option<u16>,
    /// `None` when the response had no body.
    pub data: Option<Value>,
}

/// Why a request failed.
#[derive(Debug)]
pub enum TransportError {
    /// No response was produced (DNS, connect, TLS, reading the body...).
    Network(anyhow::Error),
    /// The server answered with a non-success status.
    Response(RawResponse),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Network(err) => write!(f, "{}", err),
            TransportError::Response(resp) => match resp.status {
                Some(status) => write!(f, "HTTP {} response", status),
                None => write!(f, "HTTP response with an unreadable status"),
            },
        }
    }
}

impl std::error::Error for TransportError {}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// Transport backed by a shared `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[tracing::instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let mut builder = self.client.request(request.method, &request.url);

        if let Some(authorization) = request.authorization {
            let mut value = HeaderValue::from_str(&authorization)
                .map_err(|e| TransportError::Network(e.into()))?;
            value.set_sensitive(true);
            builder = builder.header(AUTHORIZATION, value);
        }

        if let Some(data) = &request.data {
            builder = builder.json(data);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Network(e.into()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::Network(e.into()))?;
        let data = parse_body(&bytes);

        debug!("{} -> {} ({} bytes)", request.url, status, bytes.len());

        if status.is_success() {
            Ok(TransportResponse {
                status: status.as_u16(),
                data: data.unwrap_or(Value::Null),
            })
        } else {
            Err(TransportError::Response(RawResponse {
                status: Some(status.as_u16()),
                data,
            }))
        }
    }
}

/// Decodes a response body: JSON when it parses, a plain string otherwise.
pub fn parse_body(bytes: &[u8]) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }
    match serde_json::from_slice(bytes) {
        Ok(value) => Some(value),
        Err(_) => Some(Value::String(String::from_utf8_lossy(bytes).into_owned())),
    }
}
