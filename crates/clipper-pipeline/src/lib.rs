//! The Clipper pipeline: turn a URL into a clean, readable article.
//!
//! Orchestrates fetching, per-host rule resolution, single-page promotion,
//! directive/heuristic extraction, multi-page composition and the final
//! post-processing into an [`clipper_types::ExtractResult`].

pub mod config;
pub mod pipeline;
pub mod postprocess;

pub use config::{ContentLinks, PipelineConfig};
pub use pipeline::Clipper;
