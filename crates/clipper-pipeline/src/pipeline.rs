//! Pipeline orchestration

use crate::config::PipelineConfig;
use crate::postprocess::{self, RenderOptions};
use clipper_config::{ConfigResolver, SiteConfig};
use clipper_dom::{mutate, Document, Element};
use clipper_extraction::{attachment, metadata, ContentExtractor, MimeDispatcher};
use clipper_fetch::HttpClient;
use clipper_types::{
    ClipperError, ClipperResult, ExtractResult, FetchedResponse, MimeAction, MimeInfo,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Appended to the article when multi-page composition had to give up.
const TRUNCATION_NOTE: &str =
    "This article appears to continue on further pages, which could not be retrieved.";

/// The high-level entry point: one instance, many articles.
///
/// Instances are cheap to share; the rule cache inside the resolver is
/// process-wide and safe for concurrent readers.
#[derive(Debug)]
pub struct Clipper {
    config: PipelineConfig,
    client: HttpClient,
    resolver: Arc<ConfigResolver>,
    extractor: ContentExtractor,
    dispatcher: MimeDispatcher,
}

impl Clipper {
    pub fn new(config: PipelineConfig) -> ClipperResult<Self> {
        let client = HttpClient::new(config.http_client.clone())?;
        let resolver = Arc::new(ConfigResolver::from_config(&config.config_builder));
        let extractor = ContentExtractor::new(config.extractor.clone());
        let dispatcher = MimeDispatcher::new(config.content_type_exc.clone());
        Ok(Self {
            config,
            client,
            resolver,
            extractor,
            dispatcher,
        })
    }

    pub fn resolver(&self) -> &Arc<ConfigResolver> {
        &self.resolver
    }

    /// Turn a URL into a readable article.
    ///
    /// Transport and policy problems are errors; extraction coming up empty
    /// is not — that still yields a result carrying the configured error
    /// message and the observed HTTP status.
    pub async fn fetch_content(&self, raw_url: &str) -> ClipperResult<ExtractResult> {
        let url = normalize_url(raw_url)?;
        self.check_policy(url.as_str())?;

        let mut site = self.site_for(&url);
        let response = self.client.fetch(&url, &site.http_header).await?;
        self.check_policy(&response.effective_url)?;

        let mut effective = Url::parse(&response.effective_url)
            .unwrap_or_else(|_| url.clone());
        site = self.re_resolve(site, &url, &effective);

        let info = self.dispatcher.inspect(response.content_type().unwrap_or(""));
        if let Some(result) = self.dispatch(&info, &response)? {
            return Ok(result);
        }

        let mut page_html = response.body_text();
        let mut status = response.status;
        let mut content_type = mime_or_none(&info);
        let mut promoted = false;

        // Single-page promotion happens strictly before extraction.
        if self.config.singlepage && !site.single_page_link.is_empty() {
            if let Some(single) = self
                .promote_single_page(&site, &page_html, &effective)
                .await?
            {
                let previous_host = effective.host_str().map(str::to_string);
                page_html = single.html;
                status = single.status;
                content_type = single.content_type;
                effective = single.url;
                promoted = true;
                if effective.host_str().map(str::to_string) != previous_host {
                    site = self.site_for(&effective);
                }
                info!(url = %effective, "promoted to single-page view");
            }
        }

        let prepared = self.extractor.prepare_html(&page_html, &site);
        let package = self.extractor.parse_page(&prepared, &site);
        let doc = package.as_document();

        let open_graph = metadata::open_graph(self.extractor.engine(), doc);
        let extraction = self.extractor.extract(doc, &prepared, &effective, &site);

        let Some(content_block) = extraction.content_block else {
            debug!(url = %effective, "no content block, returning error result");
            return Ok(ExtractResult {
                status,
                html: self.config.error_message.clone(),
                title: extraction.title,
                language: extraction.language,
                url: effective.to_string(),
                content_type,
                open_graph,
                summary: None,
            });
        };

        if self.config.multipage && !promoted {
            self.compose_multi_page(
                doc,
                content_block,
                extraction.next_page_url.clone(),
                &url,
                &effective,
                Arc::clone(&site),
            )
            .await;
        }

        let html = postprocess::render_content(
            doc,
            content_block,
            RenderOptions {
                base: &effective,
                rewrite_relative_urls: self.config.rewrite_relative_urls,
                content_links: self.config.content_links,
                xss_filter: self.config.xss_filter,
            },
        );
        let summary = postprocess::summarize(&html, self.config.summary_words);

        Ok(ExtractResult {
            status,
            html,
            title: extraction.title,
            language: extraction.language,
            url: effective.to_string(),
            content_type,
            open_graph,
            summary,
        })
    }

    fn check_policy(&self, url: &str) -> ClipperResult<()> {
        if self.config.url_allowed(url) {
            Ok(())
        } else {
            Err(ClipperError::PolicyBlocked(format!(
                "URL rejected by allow/block lists: {url}"
            )))
        }
    }

    fn site_for(&self, url: &Url) -> Arc<SiteConfig> {
        match url.host_str() {
            Some(host) => self.resolver.build_for_host(host, true),
            None => Arc::new(SiteConfig::new()),
        }
    }

    /// Rule lookup keys off the host; redirects may move us to another one.
    fn re_resolve(&self, current: Arc<SiteConfig>, requested: &Url, effective: &Url) -> Arc<SiteConfig> {
        if requested.host_str() == effective.host_str() {
            current
        } else {
            self.site_for(effective)
        }
    }

    /// Apply the MIME dispatch decision. `Ok(None)` means "extract as HTML".
    fn dispatch(
        &self,
        info: &MimeInfo,
        response: &FetchedResponse,
    ) -> ClipperResult<Option<ExtractResult>> {
        match info.action {
            None => Ok(None),
            Some(MimeAction::Exclude) => Err(ClipperError::PolicyBlocked(format!(
                "content type {} is excluded",
                info.mime
            ))),
            Some(MimeAction::Link) => {
                let html = attachment::attachment_html(info, response);
                let summary = postprocess::summarize(&html, self.config.summary_words);
                Ok(Some(ExtractResult {
                    status: 200,
                    html,
                    title: None,
                    language: None,
                    url: response.effective_url.clone(),
                    content_type: mime_or_none(info),
                    open_graph: HashMap::new(),
                    summary,
                }))
            }
        }
    }

    /// Evaluate `single_page_link` directives against the fetched page and,
    /// on a hit, fetch the one-page rendering.
    async fn promote_single_page(
        &self,
        site: &SiteConfig,
        page_html: &str,
        current: &Url,
    ) -> ClipperResult<Option<PromotedPage>> {
        let package = clipper_dom::parse_document(page_html);
        let doc = package.as_document();

        let candidate = site
            .single_page_link
            .iter()
            .find_map(|expr| self.extractor.engine().link_string(doc, expr));

        let Some(candidate) = candidate else {
            return Ok(None);
        };
        let Ok(target) = current.join(candidate.trim()) else {
            warn!(candidate = %candidate, "single-page link did not resolve");
            return Ok(None);
        };
        if target == *current {
            return Ok(None);
        }

        debug!(url = %target, "following single-page link");
        let response = self.client.fetch(&target, &site.http_header).await?;
        self.check_policy(&response.effective_url)?;

        let info = self.dispatcher.inspect(response.content_type().unwrap_or(""));
        if info.action.is_some() {
            // the "single page" is not an article; stay on the original
            debug!(url = %target, mime = %info.mime, "single-page target dispatched away, keeping original");
            return Ok(None);
        }

        Ok(Some(PromotedPage {
            url: Url::parse(&response.effective_url).unwrap_or(target),
            html: response.body_text(),
            status: response.status,
            content_type: mime_or_none(&info),
        }))
    }

    /// Follow `next_page_link`s, appending each page's content block into
    /// the first page's document. Any failure abandons the loop and leaves
    /// a truncation note; the first page's extraction always survives.
    async fn compose_multi_page<'d>(
        &self,
        doc: Document<'d>,
        content_block: Element<'d>,
        first_next: Option<String>,
        requested: &Url,
        effective: &Url,
        site: Arc<SiteConfig>,
    ) {
        let mut next_candidate = first_next;
        let mut current_base = effective.clone();
        let mut current_site = site;
        let mut visited: HashSet<String> =
            HashSet::from([requested.to_string(), effective.to_string()]);

        while let Some(candidate) = next_candidate.take() {
            let Ok(next_url) = current_base.join(candidate.trim()) else {
                warn!(candidate = %candidate, "next-page link did not resolve, truncating");
                append_truncation_note(doc, content_block);
                return;
            };

            if !visited.insert(next_url.to_string()) {
                debug!(url = %next_url, "next-page loop detected, truncating");
                append_truncation_note(doc, content_block);
                return;
            }

            // rule lookup keys off the host, which pagination may change
            if next_url.host_str() != current_base.host_str() {
                current_site = self.site_for(&next_url);
            }

            let response = match self.client.fetch(&next_url, &current_site.http_header).await {
                Ok(response) => response,
                Err(err) => {
                    warn!(url = %next_url, error = %err, "next-page fetch failed, truncating");
                    append_truncation_note(doc, content_block);
                    return;
                }
            };

            let info = self.dispatcher.inspect(response.content_type().unwrap_or(""));
            if info.action.is_some() {
                debug!(url = %next_url, mime = %info.mime, "next page is not an article, truncating");
                append_truncation_note(doc, content_block);
                return;
            }

            let page_url = Url::parse(&response.effective_url).unwrap_or_else(|_| next_url.clone());
            if page_url.host_str() != next_url.host_str() {
                current_site = self.site_for(&page_url);
            }

            let prepared = self.extractor.prepare_html(&response.body_text(), &current_site);
            let package = self.extractor.parse_page(&prepared, &current_site);
            let page_doc = package.as_document();
            let extraction = self
                .extractor
                .extract(page_doc, &prepared, &page_url, &current_site);

            match extraction.content_block {
                Some(block) => {
                    // adopt the subtree into the first page's document
                    let imported = mutate::import_element(doc, block);
                    content_block.append_child(imported);
                    debug!(url = %page_url, "appended next page");
                    next_candidate = extraction.next_page_url;
                    current_base = page_url;
                }
                None => {
                    warn!(url = %page_url, "next page produced no content, truncating");
                    append_truncation_note(doc, content_block);
                    return;
                }
            }
        }
    }
}

/// A page swapped in by single-page promotion.
#[derive(Debug)]
struct PromotedPage {
    url: Url,
    html: String,
    status: u16,
    content_type: Option<String>,
}

fn append_truncation_note<'d>(doc: Document<'d>, content_block: Element<'d>) {
    let note = doc.create_element("p");
    note.set_attribute_value("class", "clipper-truncated");
    note.append_child(doc.create_text(TRUNCATION_NOTE));
    content_block.append_child(note);
}

fn mime_or_none(info: &MimeInfo) -> Option<String> {
    (!info.mime.is_empty()).then(|| info.mime.clone())
}

/// Normalize user input into a fetchable URL.
///
/// `feed://` becomes `http://`, schemaless input gets `http://` prepended,
/// and anything that still fails to parse (or uses a non-HTTP scheme, or
/// lacks a host) is rejected. Already-normalized URLs pass through
/// unchanged.
pub fn normalize_url(input: &str) -> ClipperResult<Url> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ClipperError::invalid_url(input, "empty URL"));
    }

    let rewritten = if let Some(rest) = input.strip_prefix("feed://") {
        format!("http://{rest}")
    } else if !input.contains("://") {
        format!("http://{input}")
    } else {
        input.to_string()
    };

    let url = Url::parse(&rewritten)
        .map_err(|e| ClipperError::invalid_url(input, e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClipperError::invalid_url(
            input,
            format!("unsupported scheme `{}`", url.scheme()),
        ));
    }
    if url.host_str().is_none() {
        return Err(ClipperError::invalid_url(input, "missing host"));
    }

    Ok(url)
}
