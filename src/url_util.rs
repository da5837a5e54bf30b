//! Pure helpers for deriving the controller session URL.

/// Translates an HTTP(S) base URL into its WebSocket equivalent by scheme
/// substitution only: `https:// -> wss://`, `http:// -> ws://`, anything
/// else is prefixed with `ws://`. Total over all inputs.
pub fn http_to_ws(base: &str) -> String {
    if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        format!("ws://{base}")
    }
}

/// Percent-encodes a token for use in a query string: unreserved
/// alphanumerics plus `-`, `_`, `.` pass through unchanged; every other
/// byte is encoded as `%HH` with uppercase hex digits.
pub fn percent_encode_token(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    for byte in token.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' => {
                out.push(byte as char);
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Builds the full session URL: `{ws|wss}://<host>[:port]/agent?token=<pct>`.
pub fn session_url(controller_url: &str, agent_token: &str) -> String {
    let ws_base = http_to_ws(controller_url);
    format!("{ws_base}/agent?token={}", percent_encode_token(agent_token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_https_to_wss() {
        assert_eq!(http_to_ws("https://example.com"), "wss://example.com");
    }

    #[test]
    fn translates_http_to_ws() {
        assert_eq!(http_to_ws("http://example.com:4000"), "ws://example.com:4000");
    }

    #[test]
    fn bare_host_defaults_to_ws() {
        assert_eq!(http_to_ws("example.com"), "ws://example.com");
    }

    #[test]
    fn percent_encoding_is_identity_on_unreserved_bytes() {
        assert_eq!(percent_encode_token("abcXYZ019-_."), "abcXYZ019-_.");
    }

    #[test]
    fn percent_encoding_escapes_everything_else() {
        assert_eq!(percent_encode_token("a b+c/d"), "a%20b%2Bc%2Fd");
    }

    #[test]
    fn session_url_joins_base_and_token() {
        assert_eq!(
            session_url("http://localhost:4000", "dev token"),
            "ws://localhost:4000/agent?token=dev%20token"
        );
    }
}
