//! Executes `HttpRequest` values against the network.
//!
//! # Design
//! The core never performs I/O itself; `Transport` is the seam where a host
//! plugs in. `UreqTransport` is the blocking implementation used by the query
//! layer and the end-to-end tests. Status codes are returned as data (ureq's
//! status-as-error behavior is disabled) so `RentalClient` owns their
//! interpretation. No timeout is configured: a request waits until the
//! underlying connection resolves or fails.

use tracing::debug;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Performs one HTTP round-trip.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by a `ureq` agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    origin: Option<String>,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent, origin: None }
    }

    /// Origin used to resolve origin-relative request paths (`/api/v1/...`).
    pub fn with_origin(mut self, origin: &str) -> Self {
        self.origin = Some(origin.trim_end_matches('/').to_string());
        self
    }

    fn resolve(&self, path: &str) -> Result<String, ApiError> {
        if !path.starts_with('/') {
            return Ok(path.to_string());
        }
        match &self.origin {
            Some(origin) => Ok(format!("{origin}{path}")),
            None => Err(ApiError::Transport(format!(
                "relative path '{path}' requires a transport origin"
            ))),
        }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = self.resolve(&request.path)?;
        debug!(method = %request.method, url = %url, "API request");

        let result = match request.method {
            HttpMethod::Get => with_headers(self.agent.get(&url), &request.headers).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(&url), &request.headers).call(),
            HttpMethod::Post => {
                let builder = with_headers(self.agent.post(&url), &request.headers);
                match &request.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
            HttpMethod::Put => {
                let builder = with_headers(self.agent.put(&url), &request.headers);
                match &request.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };
        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        debug!(status, url = %url, "API response");
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse { status, headers, body })
    }
}

fn with_headers<B>(mut builder: ureq::RequestBuilder<B>, headers: &[(String, String)]) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}
