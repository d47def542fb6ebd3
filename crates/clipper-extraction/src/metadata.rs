//! Document-level metadata: language and OpenGraph

use clipper_dom::{Document, XPathEngine};
use std::collections::HashMap;

/// Detect the document language from the standard places, in priority
/// order: `html@lang`, `meta[http-equiv=content-language]`, `og:locale`.
pub fn language(engine: &XPathEngine, doc: Document<'_>) -> Option<String> {
    if let Some(lang) = engine.first_string(doc, "/html/@lang") {
        return Some(lang);
    }

    // http-equiv values appear in any case in the wild
    let from_meta = engine
        .elements(doc, "//meta[@http-equiv]")
        .into_iter()
        .find(|meta| {
            meta.attribute("http-equiv")
                .map(|a| a.value().eq_ignore_ascii_case("content-language"))
                .unwrap_or(false)
        })
        .and_then(|meta| meta.attribute("content").map(|a| a.value().trim().to_string()))
        .filter(|value| !value.is_empty());
    if from_meta.is_some() {
        return from_meta;
    }

    engine.first_string(doc, "//meta[@property='og:locale']/@content")
}

/// Collect `og:*` meta properties, with `:` mapped to `_` in the keys
/// (`og:title` → `og_title`).
pub fn open_graph(engine: &XPathEngine, doc: Document<'_>) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for meta in engine.elements(doc, "//meta[starts-with(@property,'og:')]") {
        let Some(property) = meta.attribute("property").map(|a| a.value().to_string()) else {
            continue;
        };
        let Some(content) = meta.attribute("content").map(|a| a.value().to_string()) else {
            continue;
        };
        map.insert(property.replace(':', "_"), content);
    }
    map
}
