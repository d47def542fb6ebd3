//! HTML DOM substrate for Clipper.
//!
//! Rule files address pages with XPath, so pages are parsed with html5ever
//! (via `scraper`, which tolerates real-world tag soup) and bridged into an
//! `sxd-document` package where `sxd-xpath` can evaluate expressions and
//! nodes can be removed, imported across documents, and re-serialized.
//!
//! Elements are built namespace-less on purpose: rule files write `//h1`,
//! not `//x:h1`.

pub mod mutate;
pub mod parse;
pub mod serialize;
pub mod xpath;

pub use parse::{parse_document, parse_fragment_into};
pub use xpath::XPathEngine;

// The sxd dom handles are part of this crate's API surface.
pub use sxd_document::dom::{ChildOfElement, Document, Element};
pub use sxd_document::Package;
