//! Executes `HttpRequest` values against the network.
//!
//! # Design
//! The core never performs I/O on its own; anything that can turn an
//! `HttpRequest` into an `HttpResponse` implements [`Transport`]. The bundled
//! [`UreqTransport`] is blocking and enforces each request's own `timeout`
//! as a global per-call bound. Status codes are returned as data, never as errors,
//! so envelope handling stays in one place.

use std::time::Duration;

use ureq::Agent;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub trait Transport {
    /// Performs one round-trip. Implementations must not retry.
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by a shared `ureq` agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        // Disable status-as-error so 4xx/5xx bodies reach the envelope parser.
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn map_error(err: ureq::Error, timeout: Duration) -> TransportError {
    match err {
        ureq::Error::Timeout(_) => TransportError::Timeout(timeout),
        ureq::Error::Io(e) if e.kind() == std::io::ErrorKind::TimedOut => TransportError::Timeout(timeout),
        other => TransportError::Connection(other.to_string()),
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let timeout = request.timeout;
        let result = match request.method {
            HttpMethod::Get => {
                let mut builder = self
                    .agent
                    .get(&request.path)
                    .config()
                    .timeout_global(Some(timeout))
                    .build();
                for (key, value) in &request.headers {
                    builder = builder.header(key.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post => {
                let mut builder = self
                    .agent
                    .post(&request.path)
                    .config()
                    .timeout_global(Some(timeout))
                    .build();
                for (key, value) in &request.headers {
                    builder = builder.header(key.as_str(), value.as_str());
                }
                match &request.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };
        let mut response = result.map_err(|e| map_error(e, timeout))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or_default().to_string()))
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| map_error(e, timeout))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
