//! Readability adapter
//!
//! Wraps `dom_smoothie`'s readability port behind the narrow surface the
//! extractor needs: a title and a content fragment, each optional. The
//! scoring internals are the library's business.

use tracing::debug;
use url::Url;

/// Heuristic extraction output.
#[derive(Debug, Clone, Default)]
pub struct HeuristicArticle {
    pub title: Option<String>,
    pub content_html: Option<String>,
}

/// Run the readability heuristic over a page.
///
/// `None` means the heuristic found nothing usable; the caller decides
/// what that costs (per missing field, not globally).
pub fn heuristic_extract(html: &str, url: &Url) -> Option<HeuristicArticle> {
    let mut readability = match dom_smoothie::Readability::new(html, Some(url.as_str()), None) {
        Ok(readability) => readability,
        Err(err) => {
            debug!(url = %url, error = ?err, "readability rejected the document");
            return None;
        }
    };

    match readability.parse() {
        Ok(article) => {
            let title = article.title.trim().to_string();
            let content = article.content.to_string();
            Some(HeuristicArticle {
                title: (!title.is_empty()).then_some(title),
                content_html: (!content.trim().is_empty()).then_some(content),
            })
        }
        Err(err) => {
            debug!(url = %url, error = ?err, "readability parse failed");
            None
        }
    }
}
