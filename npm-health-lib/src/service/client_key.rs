/// Key used when no client-identifying header is present.
pub const UNKNOWN_CLIENT: &str = "Unknown";

/// The headers consulted by default, most trusted first.
pub const DEFAULT_CLIENT_IP_HEADERS: [&str; 3] = ["cf-connecting-ip", "x-forwarded-for", "x-real-ip"];

/// Read access to request headers, by lower-case name.
pub trait HeaderSource {
    fn header(&self, name: &str) -> Option<&str>;
}

impl HeaderSource for axum::http::HeaderMap {
    fn header(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.to_str().ok())
    }
}

impl HeaderSource for [(&str, &str)] {
    fn header(&self, name: &str) -> Option<&str> {
        self.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| *v)
    }
}

/// Derive the rate-limiting key of a client from its request headers.
///
/// Walks `header_names` in order and uses the first non-empty value. Proxy headers
/// may carry a chain of addresses, in which case the first (originating) one wins.
pub fn client_key<H, S>(headers: &H, header_names: &[S]) -> String
where
    H: HeaderSource + ?Sized,
    S: AsRef<str>,
{
    header_names
        .iter()
        .filter_map(|name| headers.header(name.as_ref()))
        .filter_map(|value| value.split(',').next().map(str::trim))
        .find(|value| !value.is_empty())
        .map_or_else(|| UNKNOWN_CLIENT.to_string(), str::to_string)
}
