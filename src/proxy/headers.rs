//! Which upstream headers reach the caller.

use super::types::ResponseMode;

const NATIVE_PASSTHROUGH: [&str; 3] = ["content-type", "content-language", "set-cookie"];
const COOKIE_PASSTHROUGH: [&str; 1] = ["set-cookie"];

/// Select headers from upstream header lines.
///
/// Native mode mirrors content type, language and cookies. The JSON modes
/// only pass `Set-Cookie`, and only when cookies are being forwarded.
pub fn propagate<'a>(
    mode: ResponseMode,
    forward_cookies: bool,
    lines: impl IntoIterator<Item = &'a str>,
) -> Vec<(String, String)> {
    let allowed: &[&str] = match mode {
        ResponseMode::Native => &NATIVE_PASSTHROUGH,
        _ if forward_cookies => &COOKIE_PASSTHROUGH,
        _ => return Vec::new(),
    };

    lines
        .into_iter()
        .filter_map(parse_line)
        .filter(|(name, _)| allowed.iter().any(|a| name.eq_ignore_ascii_case(a)))
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

/// `Name: value`; the name must run straight into the colon.
fn parse_line(line: &str) -> Option<(&str, &str)> {
    let (name, value) = line.split_once(':')?;
    if name.is_empty() || name.contains(char::is_whitespace) {
        return None;
    }
    Some((name, value.trim()))
}
