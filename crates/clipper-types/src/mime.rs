//! MIME dispatch types

use serde::{Deserialize, Serialize};

/// What to do with a response whose content type matched a dispatch entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MimeAction {
    /// Synthesize a link/preview stub instead of extracting
    Link,
    /// Refuse to process the response
    Exclude,
}

/// Parsed content-type information, possibly carrying a dispatch decision.
///
/// `action` and `name` are present only when the full mime or its top-level
/// type matched a configured dispatch entry; a miss leaves them empty.
#[derive(Debug, Clone, Default)]
pub struct MimeInfo {
    /// Full mime, e.g. `application/pdf`
    pub mime: String,
    /// Top-level type, e.g. `application`
    pub kind: String,
    /// Subtype, e.g. `pdf`
    pub subtype: String,
    pub action: Option<MimeAction>,
    /// Human-readable name for the matched entry, e.g. `PDF`
    pub name: Option<String>,
}
