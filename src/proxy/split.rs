//! Separating an upstream payload into header block and body.

use std::borrow::Cow;

use super::types::UpstreamResponse;

/// Header block (if any) and body of an upstream response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitResponse<'a> {
    pub header_block: Option<Cow<'a, str>>,
    pub body: &'a [u8],
}

impl<'a> SplitResponse<'a> {
    /// Non-empty header lines, status line included.
    pub fn header_lines(&self) -> impl Iterator<Item = &str> {
        self.header_block
            .as_deref()
            .into_iter()
            .flat_map(|block| block.split(['\r', '\n']))
            .filter(|line| !line.is_empty())
    }
}

/// Prefer the transport's separate header block; otherwise split the
/// combined payload.
pub fn split_upstream(response: &UpstreamResponse) -> SplitResponse<'_> {
    if !response.raw_header_block.is_empty() {
        return SplitResponse {
            header_block: Some(Cow::Borrowed(response.raw_header_block.as_str())),
            body: &response.raw_body,
        };
    }
    split_payload(&response.raw_body)
}

/// Split at the first blank line (`\r\n\r\n` or `\n\n`).
///
/// Without a blank line the whole payload is body.
pub fn split_payload(payload: &[u8]) -> SplitResponse<'_> {
    match find_boundary(payload) {
        Some((at, width)) => SplitResponse {
            header_block: Some(String::from_utf8_lossy(&payload[..at])),
            body: &payload[at + width..],
        },
        None => SplitResponse {
            header_block: None,
            body: payload,
        },
    }
}

/// Offset and width of the first blank line.
fn find_boundary(payload: &[u8]) -> Option<(usize, usize)> {
    (0..payload.len()).find_map(|at| {
        let rest = &payload[at..];
        if rest.starts_with(b"\r\n\r\n") {
            Some((at, 4))
        } else if rest.starts_with(b"\n\n") {
            Some((at, 2))
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;

    #[test]
    fn test_crlf_split() {
        let payload = b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nX-A: 1\r\n\r\nhello\r\n\r\nworld";
        let split = split_payload(payload);
        assert_eq!(split.body, b"hello\r\n\r\nworld");
        let lines: Vec<&str> = split.header_lines().collect();
        assert_eq!(lines, vec!["HTTP/1.1 200 OK", "Content-Type: text/plain", "X-A: 1"]);
    }

    #[test]
    fn test_bare_lf_split() {
        let payload = b"HTTP/1.1 200 OK\nSet-Cookie: a=b\n\n{\"ok\":true}";
        let split = split_payload(payload);
        assert_eq!(split.body, b"{\"ok\":true}");
        let lines: Vec<&str> = split.header_lines().collect();
        assert_eq!(lines, vec!["HTTP/1.1 200 OK", "Set-Cookie: a=b"]);
    }

    #[test]
    fn test_no_header_block() {
        let payload = b"just a body with\none newline";
        let split = split_payload(payload);
        assert!(split.header_block.is_none());
        assert_eq!(split.body, payload);
        assert_eq!(split.header_lines().count(), 0);
    }

    #[test]
    fn test_mixed_line_endings() {
        let split = split_payload(b"Content-Type: text/plain\r\n\nbody");
        assert_eq!(split.body, b"body");
        assert_eq!(split.header_lines().collect::<Vec<_>>(), vec!["Content-Type: text/plain"]);
    }

    #[test]
    fn test_empty_payload() {
        let split = split_payload(b"");
        assert!(split.header_block.is_none());
        assert!(split.body.is_empty());
    }

    #[test]
    fn test_separate_header_block_is_preferred() {
        let response = UpstreamResponse {
            status_code: 200,
            raw_header_block: "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n".into(),
            raw_body: Bytes::from_static(b"a\n\nb"),
            transport_failed: false,
        };
        let split = split_upstream(&response);
        assert_eq!(split.body, b"a\n\nb");
        assert_eq!(split.header_lines().nth(1), Some("Content-Type: text/plain"));
    }
}
