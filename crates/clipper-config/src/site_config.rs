//! The per-host directive bundle and its merge semantics

use serde::{Deserialize, Serialize};

/// HTML parser requested by a rule file.
///
/// Both values are honored by the same html5ever front end; the declared
/// value is preserved so merge-fill behavior stays observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HtmlParserKind {
    #[default]
    Libxml,
    Html5lib,
}

impl HtmlParserKind {
    /// Parse a `parser:` directive value; unknown values yield `None`.
    pub fn from_directive(value: &str) -> Option<Self> {
        match value {
            "libxml" => Some(Self::Libxml),
            "html5lib" => Some(Self::Html5lib),
            _ => None,
        }
    }
}

/// Extraction directives for one hostname.
///
/// Multi-valued lists keep their file order; XPath expressions are tried in
/// order, first non-empty result wins. `find_string`/`replace_string` are
/// positionally paired and must stay index-aligned across merges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteConfig {
    pub title: Vec<String>,
    pub body: Vec<String>,
    pub author: Vec<String>,
    pub date: Vec<String>,

    pub strip: Vec<String>,
    pub strip_id_or_class: Vec<String>,
    pub strip_image_src: Vec<String>,

    pub single_page_link: Vec<String>,
    pub next_page_link: Vec<String>,

    /// `(name, value)` pairs applied to outgoing requests for this host
    pub http_header: Vec<(String, String)>,

    pub test_url: Vec<String>,

    /// Literal substring replacements applied to the raw HTML, in order
    pub find_string: Vec<String>,
    pub replace_string: Vec<String>,

    /// Tri-state flags: declared true / declared false / undeclared
    pub tidy: Option<bool>,
    pub prune: Option<bool>,
    pub autodetect_on_failure: Option<bool>,

    pub parser: Option<HtmlParserKind>,

    /// Identifies the rule file this config came from, for cache indexing.
    /// Cleared on merged cache entries.
    pub cache_key: Option<String>,
}

impl SiteConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Effective `tidy` value (default false; html5ever always normalizes)
    pub fn should_tidy(&self) -> bool {
        self.tidy.unwrap_or(false)
    }

    /// Effective `prune` value (default true)
    pub fn should_prune(&self) -> bool {
        self.prune.unwrap_or(true)
    }

    /// Effective `autodetect_on_failure` value (default true)
    pub fn should_autodetect(&self) -> bool {
        self.autodetect_on_failure.unwrap_or(true)
    }

    /// Effective parser, with the caller's default applied when undeclared
    pub fn parser_or(&self, default: HtmlParserKind) -> HtmlParserKind {
        self.parser.unwrap_or(default)
    }

    /// Aligned `(find, replace)` pairs. Zipping truncates a trailing
    /// unmatched `find_string`, keeping application well-defined even for
    /// a malformed rule file.
    pub fn replacements(&self) -> impl Iterator<Item = (&str, &str)> {
        self.find_string
            .iter()
            .zip(self.replace_string.iter())
            .map(|(f, r)| (f.as_str(), r.as_str()))
    }

    /// True when the config carries no directives at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.body.is_empty()
            && self.author.is_empty()
            && self.date.is_empty()
            && self.strip.is_empty()
            && self.strip_id_or_class.is_empty()
            && self.strip_image_src.is_empty()
            && self.single_page_link.is_empty()
            && self.next_page_link.is_empty()
            && self.http_header.is_empty()
            && self.test_url.is_empty()
            && self.find_string.is_empty()
            && self.replace_string.is_empty()
            && self.tidy.is_none()
            && self.prune.is_none()
            && self.autodetect_on_failure.is_none()
            && self.parser.is_none()
    }

    /// Merge `other` into `self`.
    ///
    /// Multi-valued lists take the set-union preserving first-seen order;
    /// tri-state flags and `parser` are only filled when `self` left them
    /// undeclared; find/replace pairs are concatenated without dedup so
    /// positional alignment survives.
    pub fn merge(&mut self, other: &SiteConfig) {
        union_into(&mut self.title, &other.title);
        union_into(&mut self.body, &other.body);
        union_into(&mut self.author, &other.author);
        union_into(&mut self.date, &other.date);
        union_into(&mut self.strip, &other.strip);
        union_into(&mut self.strip_id_or_class, &other.strip_id_or_class);
        union_into(&mut self.strip_image_src, &other.strip_image_src);
        union_into(&mut self.single_page_link, &other.single_page_link);
        union_into(&mut self.next_page_link, &other.next_page_link);
        union_into(&mut self.test_url, &other.test_url);

        for pair in &other.http_header {
            if !self.http_header.contains(pair) {
                self.http_header.push(pair.clone());
            }
        }

        self.find_string.extend(other.find_string.iter().cloned());
        self.replace_string
            .extend(other.replace_string.iter().cloned());

        if self.tidy.is_none() {
            self.tidy = other.tidy;
        }
        if self.prune.is_none() {
            self.prune = other.prune;
        }
        if self.autodetect_on_failure.is_none() {
            self.autodetect_on_failure = other.autodetect_on_failure;
        }
        if self.parser.is_none() {
            self.parser = other.parser;
        }
    }
}

fn union_into(dst: &mut Vec<String>, src: &[String]) {
    for value in src {
        if !dst.contains(value) {
            dst.push(value.clone());
        }
    }
}
