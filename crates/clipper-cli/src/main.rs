//! Clipper CLI - turn a web URL into a clean, readable article
//!
//! Thin front end over `clipper-pipeline`: wire up rule directories, run
//! one extraction, print text or JSON.

use anyhow::Result;
use clap::Parser;
use clipper_pipeline::{Clipper, PipelineConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "clipper")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Rules-driven readable-article extraction", long_about = None)]
struct Cli {
    /// URL of the article to extract
    url: String,

    /// Site-rule directory; may be given several times, first wins on
    /// duplicate filenames
    #[arg(long = "config-dir", env = "CLIPPER_CONFIG_DIR")]
    config_dirs: Vec<PathBuf>,

    /// Output format (text, json)
    #[arg(long, short = 'o', default_value = "text")]
    output: String,

    /// Keep relative URLs as the page wrote them
    #[arg(long)]
    no_rewrite: bool,

    /// Run the HTML sanitizer over the result
    #[arg(long)]
    xss_filter: bool,

    /// Verbose mode - show pipeline debug output
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "clipper=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = PipelineConfig {
        debug: cli.verbose,
        rewrite_relative_urls: !cli.no_rewrite,
        xss_filter: cli.xss_filter,
        ..Default::default()
    };
    config.config_builder.directories = cli.config_dirs;

    let clipper = Clipper::new(config)?;
    let result = clipper.fetch_content(&cli.url).await?;

    match cli.output.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => {
            if let Some(title) = &result.title {
                println!("# {title}");
            }
            println!("url: {}", result.url);
            if let Some(language) = &result.language {
                println!("language: {language}");
            }
            if let Some(summary) = &result.summary {
                println!("summary: {summary}");
            }
            println!();
            println!("{}", result.html);
        }
    }

    Ok(())
}
