//! Shared value types for the Clipper article extraction system.
//!
//! This crate holds the data contracts that cross crate boundaries: the
//! fetcher's response record, the MIME dispatch info, the final extraction
//! result, and the error taxonomy. It deliberately has no HTML or network
//! dependencies so every other crate can depend on it.

pub mod error;
pub mod http;
pub mod mime;
pub mod result;

pub use error::{ClipperError, ClipperResult};
pub use http::FetchedResponse;
pub use mime::{MimeAction, MimeInfo};
pub use result::ExtractResult;
