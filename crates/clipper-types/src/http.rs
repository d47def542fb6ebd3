//! HTTP response contract used by the pipeline

use bytes::Bytes;
use std::collections::HashMap;

/// The fetcher's response record.
///
/// `effective_url` reflects all redirects; `body` is the raw payload so the
/// MIME side branches (PDF, images) can operate on the downloaded bytes
/// without a second fetch.
#[derive(Debug, Clone, Default)]
pub struct FetchedResponse {
    pub status: u16,
    /// Header names lowercased; for repeated headers the last value wins.
    pub headers: HashMap<String, String>,
    pub body: Bytes,
    pub effective_url: String,
}

impl FetchedResponse {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// The raw `Content-Type` header, if present.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Decode the body to UTF-8, honoring the charset declared in the
    /// `Content-Type` header. Unknown or missing charsets fall back to a
    /// lossy UTF-8 read.
    pub fn body_text(&self) -> String {
        let charset = self
            .content_type()
            .and_then(|ct| charset_from_content_type(ct));

        if let Some(label) = charset {
            if let Some(encoding) = encoding_rs::Encoding::for_label(label.as_bytes()) {
                let (decoded, _, _) = encoding.decode(&self.body);
                return decoded.into_owned();
            }
        }

        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Extract the `charset=` parameter from a Content-Type value.
fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .skip(1)
        .map(str::trim)
        .find_map(|param| {
            let (key, value) = param.split_once('=')?;
            if key.trim().eq_ignore_ascii_case("charset") {
                Some(value.trim().trim_matches('"').to_string())
            } else {
                None
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_with(content_type: &str, body: &[u8]) -> FetchedResponse {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), content_type.to_string());
        FetchedResponse {
            status: 200,
            headers,
            body: Bytes::copy_from_slice(body),
            effective_url: "http://example.org/".to_string(),
        }
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let resp = response_with("text/html", b"x");
        assert_eq!(resp.header("Content-Type"), Some("text/html"));
        assert_eq!(resp.header("CONTENT-TYPE"), Some("text/html"));
        assert_eq!(resp.header("x-missing"), None);
    }

    #[test]
    fn decodes_latin1_bodies() {
        // 0xE9 is "é" in ISO-8859-1 and invalid UTF-8 on its own.
        let resp = response_with("text/html; charset=iso-8859-1", &[b'c', b'a', b'f', 0xE9]);
        assert_eq!(resp.body_text(), "café");
    }

    #[test]
    fn falls_back_to_utf8_without_charset() {
        let resp = response_with("text/html", "café".as_bytes());
        assert_eq!(resp.body_text(), "café");
    }

    #[test]
    fn charset_parameter_parsing() {
        assert_eq!(
            charset_from_content_type("text/html; charset=UTF-8"),
            Some("UTF-8".to_string())
        );
        assert_eq!(
            charset_from_content_type("text/html; boundary=x; charset=\"utf-8\""),
            Some("utf-8".to_string())
        );
        assert_eq!(charset_from_content_type("text/html"), None);
    }
}
