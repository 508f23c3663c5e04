//! Outbound HTTP capability.
//!
//! The pipeline only ever sees the [`Transport`] trait. [`ReqwestTransport`]
//! is the production implementation; tests swap in doubles that record calls.

use std::fmt::Write as _;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::HeaderMap, redirect, Client, Method, StatusCode, Version};

use super::types::UpstreamResponse;

/// Method actually used for the upstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundMethod {
    Get,
    Head,
    Post,
    Put,
    Delete,
}

impl OutboundMethod {
    pub fn as_method(&self) -> Method {
        match self {
            OutboundMethod::Get => Method::GET,
            OutboundMethod::Head => Method::HEAD,
            OutboundMethod::Post => Method::POST,
            OutboundMethod::Put => Method::PUT,
            OutboundMethod::Delete => Method::DELETE,
        }
    }
}

/// A fully prepared upstream call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub method: OutboundMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub accept_invalid_certs: bool,
}

impl OutboundRequest {
    /// First header value with the given name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Executes one outbound call. Implementations never retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: OutboundRequest) -> UpstreamResponse;
}

/// reqwest-backed transport.
///
/// A client is built per call, so nothing is pooled between requests.
/// Environment proxy settings are ignored; the upstream is always dialed
/// directly.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    connect_timeout: Duration,
    request_timeout: Duration,
    max_redirects: usize,
}

impl ReqwestTransport {
    pub fn new(connect_timeout: Duration, request_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            request_timeout,
            max_redirects: 10,
        }
    }

    fn client(&self, accept_invalid_certs: bool) -> reqwest::Result<Client> {
        Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout)
            .redirect(redirect::Policy::limited(self.max_redirects))
            .danger_accept_invalid_certs(accept_invalid_certs)
            .pool_max_idle_per_host(0)
            .no_proxy()
            .build()
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), Duration::from_secs(30))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: OutboundRequest) -> UpstreamResponse {
        let client = match self.client(request.accept_invalid_certs) {
            Ok(client) => client,
            Err(e) => {
                tracing::error!(error = %e, "Failed to build upstream client");
                return UpstreamResponse::failed();
            }
        };

        let mut builder = client.request(request.method.as_method(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "Upstream request failed");
                return UpstreamResponse::failed();
            }
        };

        let status = response.status();
        let raw_header_block = render_header_block(response.version(), status, response.headers());

        match response.bytes().await {
            Ok(raw_body) => UpstreamResponse {
                status_code: status.as_u16(),
                raw_header_block,
                raw_body,
                transport_failed: false,
            },
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "Failed to read upstream body");
                UpstreamResponse::failed()
            }
        }
    }
}

/// Status line plus one `Name: value` line per header, CRLF separated.
fn render_header_block(version: Version, status: StatusCode, headers: &HeaderMap) -> String {
    let mut block = format!("{:?} {}\r\n", version, status);
    for (name, value) in headers {
        let _ = write!(
            block,
            "{}: {}\r\n",
            name,
            String::from_utf8_lossy(value.as_bytes())
        );
    }
    block
}
