//! Content-type dispatch

use clipper_types::{MimeAction, MimeInfo};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

static MIME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([-\w]+)/([-\w+]+)").unwrap());

/// One dispatch table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchEntry {
    pub action: MimeAction,
    pub name: String,
}

impl DispatchEntry {
    pub fn link(name: &str) -> Self {
        Self {
            action: MimeAction::Link,
            name: name.to_string(),
        }
    }
}

/// Decides whether a response becomes link / exclude / extract.
///
/// Keys may be full mimes (`application/pdf`) or top-level types (`image`);
/// the full mime is consulted first.
#[derive(Debug, Clone)]
pub struct MimeDispatcher {
    table: HashMap<String, DispatchEntry>,
}

impl Default for MimeDispatcher {
    fn default() -> Self {
        Self::new(default_dispatch_table())
    }
}

impl MimeDispatcher {
    pub fn new(table: HashMap<String, DispatchEntry>) -> Self {
        Self { table }
    }

    /// Parse a `Content-Type` value and look it up. A miss (or an
    /// unparseable content type) leaves `action`/`name` empty.
    pub fn inspect(&self, content_type: &str) -> MimeInfo {
        let Some(captures) = MIME_RE.captures(content_type) else {
            return MimeInfo::default();
        };

        let kind = captures[1].to_ascii_lowercase();
        let subtype = captures[2].to_ascii_lowercase();
        let mime = format!("{kind}/{subtype}");

        let mut info = MimeInfo {
            mime: mime.clone(),
            kind: kind.clone(),
            subtype,
            action: None,
            name: None,
        };

        if let Some(entry) = self.table.get(&mime).or_else(|| self.table.get(&kind)) {
            info.action = Some(entry.action);
            info.name = Some(entry.name.clone());
        }

        info
    }
}

/// The stock dispatch table: binary formats become download links instead
/// of extraction attempts.
pub fn default_dispatch_table() -> HashMap<String, DispatchEntry> {
    HashMap::from([
        ("application/pdf".to_string(), DispatchEntry::link("PDF")),
        ("application/zip".to_string(), DispatchEntry::link("ZIP")),
        ("image".to_string(), DispatchEntry::link("Image")),
        ("audio".to_string(), DispatchEntry::link("Audio")),
        ("video".to_string(), DispatchEntry::link("Video")),
        ("text/plain".to_string(), DispatchEntry::link("plain text")),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_mime_match_wins_over_top_level() {
        let mut table = default_dispatch_table();
        table.insert(
            "image/svg+xml".to_string(),
            DispatchEntry {
                action: MimeAction::Exclude,
                name: "SVG".to_string(),
            },
        );
        let dispatcher = MimeDispatcher::new(table);

        let info = dispatcher.inspect("image/svg+xml");
        assert_eq!(info.action, Some(MimeAction::Exclude));
        assert_eq!(info.name.as_deref(), Some("SVG"));

        let info = dispatcher.inspect("image/png; quality=high");
        assert_eq!(info.action, Some(MimeAction::Link));
        assert_eq!(info.name.as_deref(), Some("Image"));
    }

    #[test]
    fn html_is_not_dispatched() {
        let dispatcher = MimeDispatcher::default();
        let info = dispatcher.inspect("text/html; charset=utf-8");
        assert_eq!(info.mime, "text/html");
        assert_eq!(info.kind, "text");
        assert_eq!(info.subtype, "html");
        assert!(info.action.is_none());
        assert!(info.name.is_none());
    }

    #[test]
    fn unparseable_content_type_is_incomplete() {
        let dispatcher = MimeDispatcher::default();
        let info = dispatcher.inspect("garbage");
        assert!(info.mime.is_empty());
        assert!(info.action.is_none());
    }

    #[test]
    fn pdf_and_plain_text_defaults() {
        let dispatcher = MimeDispatcher::default();
        assert_eq!(
            dispatcher.inspect("application/pdf").name.as_deref(),
            Some("PDF")
        );
        assert_eq!(
            dispatcher.inspect("text/plain").name.as_deref(),
            Some("plain text")
        );
    }
}
