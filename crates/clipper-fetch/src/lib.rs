//! HTTP transport for the Clipper pipeline.
//!
//! Only the response contract matters to the rest of the system: status,
//! headers, raw body and the effective URL after redirects, packaged as
//! [`clipper_types::FetchedResponse`].

mod client;

pub use client::{HttpClient, HttpClientConfig};
