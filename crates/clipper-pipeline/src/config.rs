//! Pipeline options

use clipper_config::ResolverConfig;
use clipper_extraction::mime::default_dispatch_table;
use clipper_extraction::{DispatchEntry, ExtractorConfig};
use clipper_fetch::HttpClientConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What happens to `<a>` tags in the cleaned article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentLinks {
    #[default]
    Preserve,
    Footnotes,
    Remove,
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Verbose logging
    pub debug: bool,
    pub rewrite_relative_urls: bool,
    /// Follow `single_page_link` directives
    pub singlepage: bool,
    /// Follow `next_page_link` directives
    pub multipage: bool,
    /// Shown as the article body when extraction fails
    pub error_message: String,
    /// When non-empty, a URL must contain one of these substrings
    /// (case-insensitive); `blocked_urls` is then ignored.
    pub allowed_urls: Vec<String>,
    /// A URL containing any of these substrings (case-insensitive) is
    /// rejected. Only consulted when `allowed_urls` is empty.
    pub blocked_urls: Vec<String>,
    /// Run the HTML sanitizer over the final article
    pub xss_filter: bool,
    /// MIME dispatch table: full mimes or top-level types → entry
    pub content_type_exc: HashMap<String, DispatchEntry>,
    pub content_links: ContentLinks,
    /// Number of words kept in the generated summary
    pub summary_words: usize,

    pub http_client: HttpClientConfig,
    pub extractor: ExtractorConfig,
    pub config_builder: ResolverConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            debug: false,
            rewrite_relative_urls: true,
            singlepage: true,
            multipage: true,
            error_message: "[unable to retrieve full-text content]".to_string(),
            allowed_urls: Vec::new(),
            blocked_urls: Vec::new(),
            xss_filter: false,
            content_type_exc: default_dispatch_table(),
            content_links: ContentLinks::default(),
            summary_words: 55,
            http_client: HttpClientConfig::default(),
            extractor: ExtractorConfig::default(),
            config_builder: ResolverConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Apply the allow/block policy to a URL.
    pub fn url_allowed(&self, url: &str) -> bool {
        let haystack = url.to_ascii_lowercase();
        if !self.allowed_urls.is_empty() {
            return self
                .allowed_urls
                .iter()
                .any(|needle| haystack.contains(&needle.to_ascii_lowercase()));
        }
        !self
            .blocked_urls
            .iter()
            .any(|needle| haystack.contains(&needle.to_ascii_lowercase()))
    }
}
