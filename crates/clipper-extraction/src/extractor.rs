//! Directive + heuristic content extraction

use crate::metadata;
use crate::readability::{heuristic_extract, HeuristicArticle};
use clipper_config::{HtmlParserKind, SiteConfig};
use clipper_dom::{mutate, parse_fragment_into, Document, Element, Package, XPathEngine};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

/// Extractor options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Parser used when a site rule declares none
    pub default_parser: HtmlParserKind,
}

/// What one page yielded.
///
/// `content_block` is `None` only when both the directives and the
/// heuristic came up empty; the other fields are filled on a best-effort
/// basis either way.
pub struct Extraction<'d> {
    pub content_block: Option<Element<'d>>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
    pub language: Option<String>,
    pub next_page_url: Option<String>,
}

/// Applies a host's directives to a parsed page, falling back to the
/// readability heuristic per missing field.
#[derive(Debug, Default)]
pub struct ContentExtractor {
    config: ExtractorConfig,
    engine: XPathEngine,
}

impl ContentExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self {
            config,
            engine: XPathEngine::new(),
        }
    }

    pub fn engine(&self) -> &XPathEngine {
        &self.engine
    }

    /// Apply the site's literal `find_string`/`replace_string`
    /// substitutions, in file order.
    pub fn prepare_html(&self, html: &str, site: &SiteConfig) -> String {
        let mut html = html.to_string();
        for (find, replace) in site.replacements() {
            html = html.replace(find, replace);
        }
        html
    }

    /// Parse a (prepared) page. Both declared parsers share the html5ever
    /// front end, which also covers the tidy pre-pass.
    pub fn parse_page(&self, html: &str, site: &SiteConfig) -> Package {
        let parser = site.parser_or(self.config.default_parser);
        debug!(?parser, tidy = site.should_tidy(), "parsing page");
        clipper_dom::parse_document(html)
    }

    /// Run directive extraction with per-field heuristic fallback.
    ///
    /// `html` must be the same prepared markup `doc` was parsed from; the
    /// heuristic re-reads it when a field needs autodetection.
    pub fn extract<'d>(
        &self,
        doc: Document<'d>,
        html: &str,
        url: &Url,
        site: &SiteConfig,
    ) -> Extraction<'d> {
        let mut title = self.first_directive_string(doc, &site.title);
        let author = self.first_directive_string(doc, &site.author);
        let date = self.first_directive_string(doc, &site.date);

        let body_roots = self.select_body_roots(doc, site);
        self.apply_strip_directives(doc, site, &body_roots);

        let mut content_block = self.assemble_block(doc, body_roots);

        // Heuristic fallback runs per missing field, not as one switch.
        if site.should_autodetect() && (title.is_none() || content_block.is_none()) {
            let heuristic = heuristic_extract(html, url).unwrap_or_else(|| {
                debug!(url = %url, "heuristic produced nothing");
                HeuristicArticle::default()
            });

            if title.is_none() {
                title = heuristic.title;
            }
            if content_block.is_none() {
                if let Some(fragment) = heuristic.content_html {
                    let container = parse_fragment_into(doc, &fragment);
                    // strip expressions are absolute, so they only reach the
                    // container while it hangs off the document tree
                    let anchor = mutate::document_element(doc);
                    if let Some(anchor) = anchor {
                        anchor.append_child(container);
                    }
                    self.apply_strip_directives(doc, site, &[container]);
                    if anchor.is_some() {
                        container.remove_from_parent();
                    }
                    content_block = Some(container);
                }
            }
        }

        let next_page_url = site
            .next_page_link
            .iter()
            .find_map(|expr| self.engine.link_string(doc, expr));

        Extraction {
            content_block,
            title,
            author,
            date,
            language: metadata::language(&self.engine, doc),
            next_page_url,
        }
    }

    fn first_directive_string(&self, doc: Document<'_>, exprs: &[String]) -> Option<String> {
        exprs.iter().find_map(|expr| self.engine.first_string(doc, expr))
    }

    /// First body expression producing a non-empty node list wins; all of
    /// its element matches become the block.
    fn select_body_roots<'d>(&self, doc: Document<'d>, site: &SiteConfig) -> Vec<Element<'d>> {
        for expr in &site.body {
            let elements = self.engine.elements(doc, expr);
            if !elements.is_empty() {
                debug!(expr = %expr, matches = elements.len(), "body directive matched");
                return elements;
            }
        }
        Vec::new()
    }

    /// Strip passes over the selected body subtrees. XPath strips are
    /// evaluated document-wide and scoped to the chosen roots; the
    /// substring strips walk the subtrees directly.
    fn apply_strip_directives<'d>(
        &self,
        doc: Document<'d>,
        site: &SiteConfig,
        roots: &[Element<'d>],
    ) {
        if roots.is_empty() {
            return;
        }

        for expr in &site.strip {
            for element in self.engine.elements(doc, expr) {
                let in_scope = roots
                    .iter()
                    .any(|root| element != *root && mutate::is_within(element, *root));
                if in_scope {
                    element.remove_from_parent();
                }
            }
        }

        for root in roots {
            self.apply_pattern_strips(site, *root);
        }
    }

    /// `strip_id_or_class` and `strip_image_src` substring removal.
    fn apply_pattern_strips(&self, site: &SiteConfig, root: Element<'_>) {
        for element in mutate::descendant_elements(root) {
            let id_or_class_hit = site.strip_id_or_class.iter().any(|pattern| {
                ["id", "class"].iter().any(|attr| {
                    element
                        .attribute(*attr)
                        .map(|a| a.value().contains(pattern.as_str()))
                        .unwrap_or(false)
                })
            });

            let image_src_hit = element.name().local_part() == "img"
                && site.strip_image_src.iter().any(|pattern| {
                    element
                        .attribute("src")
                        .map(|a| a.value().contains(pattern.as_str()))
                        .unwrap_or(false)
                });

            if id_or_class_hit || image_src_hit {
                element.remove_from_parent();
            }
        }
    }

    fn assemble_block<'d>(&self, doc: Document<'d>, roots: Vec<Element<'d>>) -> Option<Element<'d>> {
        match roots.len() {
            0 => None,
            1 => Some(roots[0]),
            _ => {
                // several matches: gather them under one container
                let container = doc.create_element("div");
                for root in roots {
                    root.remove_from_parent();
                    container.append_child(root);
                }
                Some(container)
            }
        }
    }
}
