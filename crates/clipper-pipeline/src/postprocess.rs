//! Post-extraction cleanup and serialization

use crate::config::ContentLinks;
use clipper_dom::{mutate, serialize, Document, Element};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Tags whose content (not the tag itself) is the article when they end
/// up as the collapsed root.
const CONTAINER_TAGS: [&str; 7] = ["div", "article", "section", "header", "footer", "li", "td"];

static ABSOLUTE_URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^https?://").unwrap());
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static EMPTY_P_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<p>\s*</p>").unwrap());
static A_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"</?a(?:\s[^>]*)?>").unwrap());

/// Rendering options for the final content block.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions<'a> {
    pub base: &'a Url,
    pub rewrite_relative_urls: bool,
    pub content_links: ContentLinks,
    pub xss_filter: bool,
}

/// Run the full cleanup sequence over the content block and serialize it.
pub fn render_content<'d>(
    doc: Document<'d>,
    block: Element<'d>,
    options: RenderOptions<'_>,
) -> String {
    // form controls never belong in an article
    mutate::remove_tags(block, "select");

    if options.rewrite_relative_urls {
        absolutize_urls(block, options.base);
    }

    if options.content_links == ContentLinks::Footnotes && !is_wikipedia(options.base) {
        links_to_footnotes(doc, block);
    }

    mutate::normalize_whitespace(block);
    let root = mutate::collapse_wrappers(block);
    mutate::strip_empty_paragraphs(root);

    let serialized = if CONTAINER_TAGS.contains(&root.name().local_part()) {
        serialize::inner_html(root)
    } else {
        serialize::outer_xml(root)
    };

    let serialized = EMPTY_P_RE.replace_all(&serialized, "").into_owned();

    let serialized = if options.content_links == ContentLinks::Remove {
        A_TAG_RE.replace_all(&serialized, "").into_owned()
    } else {
        serialized
    };

    if options.xss_filter {
        ammonia::clean(&serialized)
    } else {
        serialized
    }
}

/// Make `a@href`, `img@src` and `iframe@src` absolute against the
/// effective URL, the root element included.
///
/// Attribute values get a trim that survives internal spaces: `%20` is
/// decoded, the ends are trimmed, then spaces are re-encoded. Values whose
/// resolution fails are skipped silently.
pub fn absolutize_urls(root: Element<'_>, base: &Url) {
    let mut elements = vec![root];
    elements.extend(mutate::descendant_elements(root));

    for element in elements {
        let attr = match element.name().local_part() {
            "a" => "href",
            "img" | "iframe" => "src",
            _ => continue,
        };
        let Some(value) = element.attribute(attr).map(|a| a.value().to_string()) else {
            continue;
        };

        let cleaned = value.replace("%20", " ");
        let cleaned = cleaned.trim().replace(' ', "%20");
        if cleaned.is_empty() {
            continue;
        }

        if ABSOLUTE_URL_RE.is_match(&cleaned) {
            if cleaned != value {
                element.set_attribute_value(attr, &cleaned);
            }
            continue;
        }

        // collapse accidental double slashes in the base path before joining
        let mut base_fixed = base.clone();
        if base_fixed.path().contains("//") {
            let path = base_fixed.path().replace("//", "/");
            base_fixed.set_path(&path);
        }

        if let Ok(absolute) = base_fixed.join(&cleaned) {
            element.set_attribute_value(attr, absolute.as_str());
        }
    }
}

/// Annotate links with `[n]` markers and append a footnote list.
fn links_to_footnotes<'d>(doc: Document<'d>, root: Element<'d>) {
    let anchors: Vec<Element<'_>> = mutate::descendant_elements(root)
        .into_iter()
        .filter(|el| el.name().local_part() == "a" && el.attribute("href").is_some())
        .collect();

    if anchors.is_empty() {
        return;
    }

    let list = doc.create_element("ol");
    for (index, anchor) in anchors.iter().enumerate() {
        let number = index + 1;
        let href = anchor
            .attribute("href")
            .map(|a| a.value().to_string())
            .unwrap_or_default();

        let marker = doc.create_element("sup");
        marker.set_attribute_value("class", "footnote");
        marker.append_child(doc.create_text(&format!("[{number}]")));
        anchor.append_child(marker);

        let item = doc.create_element("li");
        let link = doc.create_element("a");
        link.set_attribute_value("href", &href);
        link.append_child(doc.create_text(&href));
        item.append_child(link);
        list.append_child(item);
    }

    let container = doc.create_element("div");
    container.set_attribute_value("class", "footnotes");
    container.append_child(list);
    root.append_child(container);
}

fn is_wikipedia(url: &Url) -> bool {
    url.host_str()
        .map(|host| host == "wikipedia.org" || host.ends_with(".wikipedia.org"))
        .unwrap_or(false)
}

/// First `max_words` words of the tag-stripped content, with an ellipsis
/// when truncated.
pub fn summarize(html: &str, max_words: usize) -> Option<String> {
    let text = TAG_RE.replace_all(html, " ");
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return None;
    }
    if words.len() <= max_words {
        Some(words.join(" "))
    } else {
        Some(format!("{}…", words[..max_words].join(" ")))
    }
}
