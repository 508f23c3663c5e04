//! Builds the outbound call and classifies what came back.

use super::config::ProxyConfig;
use super::transport::{OutboundMethod, OutboundRequest};
use super::types::{ErrorResult, InboundMethod, InboundRequest, UpstreamResponse};
use super::url::encode_pairs;

pub const USER_AGENT_PREFIX: &str = "SimpleProxy - ";

/// Sent after the prefix when the caller did not identify itself.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.1 (KHTML, like Gecko) Chrome/21.0.1180.57 Safari/537.1";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Headers a browser sends with an AJAX request.
const AJAX_HEADERS: [(&str, &str); 5] = [
    ("Accept", "application/json, text/javascript, */*; q=0.01"),
    ("Accept-Language", "en-us,en;q=0.5"),
    ("Accept-Encoding", "gzip, deflate"),
    ("Accept-Charset", "ISO-8859-1,utf-8;q=0.7,*;q=0.7"),
    ("X-Requested-With", "XMLHttpRequest"),
];

/// Translate the inbound request into the upstream call for `url`.
pub fn build_request(config: &ProxyConfig, request: &InboundRequest, url: String) -> OutboundRequest {
    let (method, body) = match request.method {
        InboundMethod::Get => (OutboundMethod::Get, None),
        InboundMethod::Head => (OutboundMethod::Head, None),
        InboundMethod::Post => (OutboundMethod::Post, Some(encode_pairs(&request.body))),
        InboundMethod::Put if !config.put_as_delete() => {
            (OutboundMethod::Put, Some(encode_pairs(&request.body)))
        }
        InboundMethod::Put | InboundMethod::Delete => {
            (OutboundMethod::Delete, Some(encode_pairs(&request.body)))
        }
    };

    let mut headers = Vec::with_capacity(8);
    if body.is_some() {
        headers.push(("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string()));
    }
    if let Some(cookie) = cookie_header(config, request) {
        headers.push(("Cookie".to_string(), cookie));
    }
    if request.is_xhr() {
        headers.extend(
            AJAX_HEADERS
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string())),
        );
    }
    let agent = request.user_agent().unwrap_or(DEFAULT_USER_AGENT);
    headers.push(("User-Agent".to_string(), format!("{}{}", USER_AGENT_PREFIX, agent)));

    OutboundRequest {
        method,
        url,
        headers,
        body,
        accept_invalid_certs: config.skips_tls_verification(),
    }
}

/// `k1=v1; k2=v2;`, plus the session pair when sharing is on.
fn cookie_header(config: &ProxyConfig, request: &InboundRequest) -> Option<String> {
    if !config.forward_cookies() || request.cookies.is_empty() {
        return None;
    }

    let mut pairs: Vec<String> = request
        .cookies
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect();

    if config.share_session() {
        if let Some(token) = request.session_token.as_deref().filter(|t| !t.is_empty()) {
            pairs.push(token.to_string());
        }
    }

    Some(format!("{};", pairs.join("; ")))
}

/// Anything but a completed call with status <= 200 is an error.
pub fn classify(response: &UpstreamResponse) -> Result<(), ErrorResult> {
    if response.transport_failed {
        return Err(ErrorResult::transport_failure());
    }
    match response.status_code {
        code if code > 200 => Err(ErrorResult::from_upstream_status(code)),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderName};

    fn config() -> ProxyConfig {
        ProxyConfig::new("http://api.local").unwrap()
    }

    #[test]
    fn test_get_has_no_body() {
        let out = build_request(&config(), &InboundRequest::new("/x"), "http://api.local/x".into());
        assert_eq!(out.method, OutboundMethod::Get);
        assert_eq!(out.body, None);
        assert_eq!(out.header("content-type"), None);
    }

    #[test]
    fn test_head_is_explicit() {
        let req = InboundRequest::new("/x").with_method(InboundMethod::Head);
        let out = build_request(&config(), &req, "u".into());
        assert_eq!(out.method, OutboundMethod::Head);
        assert_eq!(out.body, None);
    }

    #[test]
    fn test_post_without_params_sends_empty_body() {
        let req = InboundRequest::new("/x").with_method(InboundMethod::Post);
        let out = build_request(&config(), &req, "u".into());
        assert_eq!(out.method, OutboundMethod::Post);
        assert_eq!(out.body.as_deref(), Some(""));
        assert_eq!(out.header("Content-Type"), Some(FORM_CONTENT_TYPE));
    }

    #[test]
    fn test_put_and_delete_are_identical() {
        let base = InboundRequest::new("/item/1")
            .with_body_param("name", "a b")
            .with_body_param("n", "1");
        let put = build_request(&config(), &base.clone().with_method(InboundMethod::Put), "u".into());
        let delete = build_request(&config(), &base.with_method(InboundMethod::Delete), "u".into());

        assert_eq!(put, delete);
        assert_eq!(put.method, OutboundMethod::Delete);
        assert_eq!(put.body.as_deref(), Some("name=a+b&n=1"));
    }

    #[test]
    fn test_put_can_be_forwarded_as_put() {
        let config = config().with_put_as_delete(false);
        let req = InboundRequest::new("/x").with_method(InboundMethod::Put);
        assert_eq!(build_request(&config, &req, "u".into()).method, OutboundMethod::Put);
    }

    #[test]
    fn test_user_agent_prefix() {
        let out = build_request(&config(), &InboundRequest::new("/"), "u".into());
        assert_eq!(
            out.header("user-agent").unwrap(),
            format!("SimpleProxy - {}", DEFAULT_USER_AGENT)
        );

        let req = InboundRequest::new("/").with_header(header::USER_AGENT, "curl/8.0");
        let out = build_request(&config(), &req, "u".into());
        assert_eq!(out.header("user-agent"), Some("SimpleProxy - curl/8.0"));
    }

    #[test]
    fn test_ajax_headers_only_for_xhr() {
        let out = build_request(&config(), &InboundRequest::new("/"), "u".into());
        assert_eq!(out.header("x-requested-with"), None);

        let req = InboundRequest::new("/")
            .with_header(HeaderName::from_static("x-requested-with"), "XMLHttpRequest");
        let out = build_request(&config(), &req, "u".into());
        assert_eq!(out.header("X-Requested-With"), Some("XMLHttpRequest"));
        assert_eq!(out.header("Accept-Language"), Some("en-us,en;q=0.5"));
        assert_eq!(out.header("Accept-Charset"), Some("ISO-8859-1,utf-8;q=0.7,*;q=0.7"));
    }

    #[test]
    fn test_cookies_require_forwarding() {
        let req = InboundRequest::new("/")
            .with_cookie("a", "1")
            .with_cookie("b", "2")
            .with_session_token("SESSID=xyz");

        let out = build_request(&config(), &req, "u".into());
        assert_eq!(out.header("cookie"), None);

        let forwarding = config().with_cookie_forwarding(true);
        let out = build_request(&forwarding, &req, "u".into());
        assert_eq!(out.header("cookie"), Some("a=1; b=2;"));

        let sharing = forwarding.with_session_sharing(true);
        let out = build_request(&sharing, &req, "u".into());
        assert_eq!(out.header("cookie"), Some("a=1; b=2; SESSID=xyz;"));
    }

    #[test]
    fn test_no_cookie_header_without_cookies() {
        let config = config().with_cookie_forwarding(true).with_session_sharing(true);
        let req = InboundRequest::new("/").with_session_token("SESSID=xyz");
        assert_eq!(build_request(&config, &req, "u".into()).header("cookie"), None);
    }

    #[test]
    fn test_tls_bypass_follows_config() {
        let config = ProxyConfig::new("https://secure.local").unwrap();
        let out = build_request(&config, &InboundRequest::new("/"), "u".into());
        assert!(out.accept_invalid_certs);
    }

    #[test]
    fn test_classification() {
        let ok = UpstreamResponse { status_code: 200, ..Default::default() };
        assert!(classify(&ok).is_ok());

        let failed = classify(&UpstreamResponse::failed()).unwrap_err();
        assert_eq!(failed, ErrorResult::transport_failure());

        for code in [201, 302, 404, 500, 503] {
            let response = UpstreamResponse { status_code: code, ..Default::default() };
            assert_eq!(classify(&response).unwrap_err().status_code, Some(code));
        }
    }
}
