//! Status line mapping.
//!
//! Only a closed set of codes is ever written back to the caller. Anything
//! outside the set collapses to `200 Ok`, which keeps legacy consumers that
//! expect one of these lines working.

use std::fmt;

/// A status code paired with the reason phrase sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusLine {
    code: u16,
    reason: &'static str,
}

impl StatusLine {
    /// The line used for successful responses and unknown codes.
    pub const OK: StatusLine = StatusLine { code: 200, reason: "Ok" };

    /// Map a numeric code onto the whitelist.
    pub fn for_code(code: u16) -> Self {
        let reason = match code {
            100 => "Continue",
            200 => "Ok",
            301 => "Moved Permanently",
            302 => "Found",
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            407 => "Proxy Authentication Required",
            408 => "Request Timeout",
            410 => "Gone",
            420 => "Enhance Your Calm",
            429 => "Too Many Requests",
            500 => "Internal Server Error",
            501 => "Not Implemented",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            504 => "Gateway Timeout",
            509 => "Bandwidth Limit Exceeded",
            _ => return Self::OK,
        };
        Self { code, reason }
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn reason(&self) -> &'static str {
        self.reason
    }
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::OK
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.reason)
    }
}
