//! The transport boundary: how the engine reaches the network.
//!
//! The engine never speaks HTTP itself; it issues verbs through the
//! [`Transport`] trait and interprets the status/body pairs that come back.
//! Auth middleware, caching and connection pooling all live inside transport
//! implementations. The reqwest-backed [`HttpTransport`] ships behind the
//! `remote` feature (enabled by default).

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{HalError, TransportError};

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP verbs the engine issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

/// Status and parsed body surfaced across the transport boundary.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Value,
}

/// Asynchronous HTTP boundary consumed by the engine.
///
/// One method is required; the verb wrappers are provided. Implementations
/// must hand back the response for every completed exchange regardless of
/// status - the engine owns status interpretation.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<&Value>,
    ) -> Result<TransportResponse, TransportError>;

    async fn get(&self, uri: &str) -> Result<TransportResponse, TransportError> {
        self.send(Method::Get, uri, None).await
    }

    async fn post(&self, uri: &str, body: &Value) -> Result<TransportResponse, TransportError> {
        self.send(Method::Post, uri, Some(body)).await
    }

    async fn put(&self, uri: &str, body: &Value) -> Result<TransportResponse, TransportError> {
        self.send(Method::Put, uri, Some(body)).await
    }

    async fn patch(&self, uri: &str, body: &Value) -> Result<TransportResponse, TransportError> {
        self.send(Method::Patch, uri, Some(body)).await
    }

    async fn delete(&self, uri: &str) -> Result<TransportResponse, TransportError> {
        self.send(Method::Delete, uri, None).await
    }
}

/// Treat `200..=207` as success, `500` as a server fault carrying the body's
/// `error` field, anything else as an unexpected status.
pub(crate) fn expect_success(response: TransportResponse, uri: &str) -> Result<Value, HalError> {
    match response.status {
        status if (200..=207).contains(&status) => Ok(response.body),
        500 => Err(HalError::ServerFault {
            message: server_fault_message(&response.body),
        }),
        status => Err(HalError::UnexpectedStatus {
            status,
            url: uri.to_string(),
        }),
    }
}

/// Like [`expect_success`], but a 404 yields `Ok(None)` - the "not found"
/// sentinel for single-resource fetches.
pub(crate) fn success_or_not_found(
    response: TransportResponse,
    uri: &str,
) -> Result<Option<Value>, HalError> {
    if response.status == 404 {
        return Ok(None);
    }
    expect_success(response, uri).map(Some)
}

fn server_fault_message(body: &Value) -> String {
    body.get("error")
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| body.to_string())
}

/// Reqwest-backed transport.
///
/// Bodies are sent as JSON. Response bodies are parsed as JSON when
/// possible; empty bodies become `Value::Null` and non-JSON bodies are kept
/// as strings for the engine to interpret (count endpoints return bare
/// numerics).
#[cfg(feature = "remote")]
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

#[cfg(feature = "remote")]
impl HttpTransport {
    /// A transport with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Build` if the underlying client cannot be
    /// constructed.
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|source| TransportError::Build { source })?;
        Ok(Self { client })
    }

    /// Wrap a preconfigured client (custom timeouts, default headers,
    /// middleware).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "remote")]
#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<&Value>,
    ) -> Result<TransportResponse, TransportError> {
        tracing::debug!(method = method.as_str(), %uri, "sending request");

        let mut request = match method {
            Method::Get => self.client.get(uri),
            Method::Post => self.client.post(uri),
            Method::Put => self.client.put(uri),
            Method::Patch => self.client.patch(uri),
            Method::Delete => self.client.delete(uri),
        };
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|source| TransportError::Http {
                url: uri.to_string(),
                source,
            })?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|source| TransportError::Http {
                url: uri.to_string(),
                source,
            })?;

        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(TransportResponse { status, body })
    }
}
