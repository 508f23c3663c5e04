//! Outbound URL composition.

use url::form_urlencoded;

/// Join base URL, sub-path and query pairs into the outbound URL.
///
/// Pairs keep their received order and are form-encoded, so a space comes
/// out as `+`.
pub fn compose_url(base_url: &str, sub_path: &str, query: &[(String, String)]) -> String {
    let mut url = String::with_capacity(base_url.len() + sub_path.len() + 16 * query.len());
    url.push_str(base_url);
    url.push_str(sub_path);

    if !query.is_empty() {
        url.push('?');
        url.push_str(&encode_pairs(query));
    }
    url
}

/// `k1=v1&k2=v2`, form-encoded.
pub fn encode_pairs(pairs: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}
