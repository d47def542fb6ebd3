//! Final article record produced by the pipeline

use serde::Serialize;
use std::collections::HashMap;

/// The readable-article record returned for every processed URL.
///
/// When extraction fails this is still produced, with `html` set to the
/// configured error message and `status` equal to the HTTP status observed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractResult {
    pub status: u16,
    pub html: String,
    pub title: Option<String>,
    pub language: Option<String>,
    /// Effective URL after redirects and single-page promotion
    pub url: String,
    pub content_type: Option<String>,
    /// OpenGraph properties with `:` replaced by `_` in keys
    pub open_graph: HashMap<String, String>,
    pub summary: Option<String>,
}
