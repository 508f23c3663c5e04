//! Immutable settings for one proxy endpoint.

use super::error::ProxyError;
use super::types::ResponseMode;
use super::validate::PathValidator;

/// Settings shared by every request the handler serves.
///
/// Built once and never changed afterwards. [`ProxyConfig::new`] refuses an
/// empty base URL, so a handler can never exist without an upstream.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    base_url: String,
    response_mode: ResponseMode,
    validator: PathValidator,
    forward_cookies: bool,
    share_session: bool,
    put_as_delete: bool,
    accept_invalid_certs: bool,
}

impl ProxyConfig {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProxyError> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(ProxyError::EmptyBaseUrl);
        }

        Ok(Self {
            base_url,
            response_mode: ResponseMode::default(),
            validator: PathValidator::default(),
            forward_cookies: false,
            share_session: false,
            put_as_delete: true,
            accept_invalid_certs: true,
        })
    }

    pub fn with_response_mode(mut self, mode: ResponseMode) -> Self {
        self.response_mode = mode;
        self
    }

    pub fn with_path_pattern(mut self, pattern: &str) -> Result<Self, ProxyError> {
        self.validator = PathValidator::new(pattern)?;
        Ok(self)
    }

    /// Forward inbound cookies upstream and pass `Set-Cookie` back.
    pub fn with_cookie_forwarding(mut self, enabled: bool) -> Self {
        self.forward_cookies = enabled;
        self
    }

    /// Append the host-supplied session token to forwarded cookies.
    pub fn with_session_sharing(mut self, enabled: bool) -> Self {
        self.share_session = enabled;
        self
    }

    /// Send PUT upstream as DELETE, matching the legacy proxy.
    pub fn with_put_as_delete(mut self, enabled: bool) -> Self {
        self.put_as_delete = enabled;
        self
    }

    /// Skip certificate verification for HTTPS upstreams.
    pub fn with_accept_invalid_certs(mut self, enabled: bool) -> Self {
        self.accept_invalid_certs = enabled;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn response_mode(&self) -> ResponseMode {
        self.response_mode
    }

    pub fn validator(&self) -> &PathValidator {
        &self.validator
    }

    pub fn forward_cookies(&self) -> bool {
        self.forward_cookies
    }

    pub fn share_session(&self) -> bool {
        self.share_session
    }

    pub fn put_as_delete(&self) -> bool {
        self.put_as_delete
    }

    pub fn is_https(&self) -> bool {
        self.base_url
            .get(..8)
            .map(|scheme| scheme.eq_ignore_ascii_case("https://"))
            .unwrap_or(false)
    }

    /// Whether outbound calls run without peer verification.
    pub fn skips_tls_verification(&self) -> bool {
        self.accept_invalid_certs && self.is_https()
    }
}
