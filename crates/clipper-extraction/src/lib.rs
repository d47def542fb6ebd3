//! Content extraction for Clipper.
//!
//! Combines explicit XPath directives from site rules with a readability
//! heuristic fallback, plus the MIME side branches that turn non-HTML
//! responses into link stubs.

pub mod attachment;
pub mod extractor;
pub mod metadata;
pub mod mime;
pub mod readability;

pub use extractor::{ContentExtractor, Extraction, ExtractorConfig};
pub use mime::{DispatchEntry, MimeDispatcher};
