//! reqwest wrapper producing the pipeline's response contract

use clipper_types::{ClipperError, ClipperResult, FetchedResponse};
use reqwest::header::{HeaderName, HeaderValue, REFERER};
use reqwest::redirect;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Fetcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    pub user_agent: String,
    /// Default referer sent when no site rule overrides it
    pub referer: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub max_redirects: usize,
    /// Responses larger than this are refused
    pub max_response_size: usize,
    /// Total attempts for transient transport errors (timeouts, connect)
    pub max_attempts: u32,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (compatible; Clipper/0.3; +https://github.com/clipper)"
                .to_string(),
            referer: "https://www.google.com/".to_string(),
            timeout: Duration::from_secs(20),
            connect_timeout: Duration::from_secs(5),
            max_redirects: 10,
            max_response_size: 10 * 1024 * 1024,
            max_attempts: 2,
        }
    }
}

/// Redirect-following HTTP client.
///
/// Site rules may carry `http_header(...)` directives; those are applied
/// per request on top of the configured defaults.
#[derive(Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    config: HttpClientConfig,
}

impl HttpClient {
    pub fn new(config: HttpClientConfig) -> ClipperResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .gzip(true)
            .brotli(true)
            .cookie_store(true)
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .redirect(redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| ClipperError::HttpClient(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Fetch a URL. Non-2xx statuses are NOT errors here: the pipeline
    /// needs the observed status to build its result.
    pub async fn fetch(
        &self,
        url: &Url,
        site_headers: &[(String, String)],
    ) -> ClipperResult<FetchedResponse> {
        let mut last_error = None;

        for attempt in 0..self.config.max_attempts {
            let mut request = self
                .client
                .get(url.clone())
                .header(REFERER, self.config.referer.as_str());

            for (name, value) in site_headers {
                match (
                    HeaderName::try_from(name.as_str()),
                    HeaderValue::try_from(value.as_str()),
                ) {
                    (Ok(name), Ok(value)) => {
                        request = request.header(name, value);
                    }
                    _ => warn!(header = %name, "skipping invalid http_header directive"),
                }
            }

            match request.send().await {
                Ok(response) => {
                    if attempt > 0 {
                        debug!(url = %url, attempt = attempt + 1, "fetch succeeded after retry");
                    }
                    return self.into_fetched(response, url).await;
                }
                Err(err) => {
                    let transient = err.is_timeout() || err.is_connect();
                    if transient && attempt + 1 < self.config.max_attempts {
                        debug!(url = %url, error = %err, "transient fetch error, retrying");
                        tokio::time::sleep(Duration::from_millis(250)).await;
                        last_error = Some(err);
                        continue;
                    }
                    return Err(ClipperError::fetch_failed(url.as_str(), err));
                }
            }
        }

        Err(match last_error {
            Some(err) => ClipperError::fetch_failed(url.as_str(), err),
            None => ClipperError::fetch_failed_msg(url.as_str(), "no attempts made"),
        })
    }

    async fn into_fetched(
        &self,
        response: reqwest::Response,
        requested: &Url,
    ) -> ClipperResult<FetchedResponse> {
        let status = response.status().as_u16();
        let effective_url = response.url().to_string();

        let mut headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                headers.insert(name.as_str().to_ascii_lowercase(), value.to_string());
            }
        }

        if let Some(length) = response.content_length() {
            if length as usize > self.config.max_response_size {
                return Err(ClipperError::fetch_failed_msg(
                    requested.as_str(),
                    format!("response of {length} bytes exceeds configured maximum"),
                ));
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ClipperError::fetch_failed(requested.as_str(), e))?;

        if body.len() > self.config.max_response_size {
            return Err(ClipperError::fetch_failed_msg(
                requested.as_str(),
                format!("response of {} bytes exceeds configured maximum", body.len()),
            ));
        }

        debug!(url = %effective_url, status, bytes = body.len(), "fetched");

        Ok(FetchedResponse {
            status,
            headers,
            body,
            effective_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn reports_effective_url_after_redirects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a"))
            .respond_with(
                ResponseTemplate::new(301).insert_header("Location", "/b"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/b"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "text/html")
                    .set_body_string("<html></html>"),
            )
            .mount(&server)
            .await;

        let client = HttpClient::new(HttpClientConfig::default()).unwrap();
        let url = Url::parse(&format!("{}/a", server.uri())).unwrap();
        let response = client.fetch(&url, &[]).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.effective_url, format!("{}/b", server.uri()));
        assert_eq!(response.content_type(), Some("text/html"));
    }

    #[tokio::test]
    async fn applies_site_header_directives() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(header("x-forwarded-for", "66.249.66.1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let client = HttpClient::new(HttpClientConfig::default()).unwrap();
        let url = Url::parse(&server.uri()).unwrap();
        let headers = vec![("x-forwarded-for".to_string(), "66.249.66.1".to_string())];
        let response = client.fetch(&url, &headers).await.unwrap();
        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn non_success_statuses_are_returned_not_raised() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("gone"))
            .mount(&server)
            .await;

        let client = HttpClient::new(HttpClientConfig::default()).unwrap();
        let url = Url::parse(&format!("{}/missing", server.uri())).unwrap();
        let response = client.fetch(&url, &[]).await.unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(response.body_text(), "gone");
    }
}
