//! Per-host extraction rules for Clipper.
//!
//! Site behavior is driven by plain-text rule files (`example.com.txt`,
//! `.example.com.txt` for wildcards, `global.txt` for defaults). This crate
//! parses those files into [`SiteConfig`] values, indexes the rule
//! directories, and resolves the merged configuration for a hostname with a
//! process-wide cache.

pub mod parser;
pub mod resolver;
pub mod site_config;
pub mod store;

pub use resolver::{ConfigResolver, ResolverConfig};
pub use site_config::{HtmlParserKind, SiteConfig};
pub use store::ConfigFileStore;
