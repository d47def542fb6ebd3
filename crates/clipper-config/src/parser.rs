//! Rule-file line grammar
//!
//! One directive per line, `key: value`. `#` starts a comment. Booleans
//! accept `yes`/`true`; anything else reads as false. Two parenthesized
//! sugars exist: `replace_string(<find>): <replacement>` binds both sides
//! of a find/replace pair, and `http_header(<name>): <value>` declares a
//! request header.

use crate::site_config::{HtmlParserKind, SiteConfig};
use tracing::debug;

/// Parse a rule file's content. Never fails: unusable lines are skipped,
/// and a file with zero usable lines parses to an empty config (detectable
/// via [`SiteConfig::is_empty`]).
pub fn parse_str(content: &str) -> SiteConfig {
    let mut config = SiteConfig::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            continue;
        }

        apply_directive(&mut config, key, value);
    }

    config
}

fn apply_directive(config: &mut SiteConfig, key: &str, value: &str) {
    match key {
        "title" => config.title.push(value.to_string()),
        "body" => config.body.push(value.to_string()),
        "author" => config.author.push(value.to_string()),
        "date" => config.date.push(value.to_string()),
        "strip" => config.strip.push(value.to_string()),
        "strip_id_or_class" => config.strip_id_or_class.push(value.to_string()),
        "strip_image_src" => config.strip_image_src.push(value.to_string()),
        "single_page_link" => config.single_page_link.push(value.to_string()),
        "next_page_link" => config.next_page_link.push(value.to_string()),
        "test_url" => config.test_url.push(value.to_string()),
        "find_string" => config.find_string.push(value.to_string()),
        "replace_string" => config.replace_string.push(value.to_string()),
        "tidy" => config.tidy = Some(parse_bool(value)),
        "prune" => config.prune = Some(parse_bool(value)),
        "autodetect_on_failure" => config.autodetect_on_failure = Some(parse_bool(value)),
        "parser" => match HtmlParserKind::from_directive(value) {
            Some(kind) => config.parser = Some(kind),
            None => debug!(value, "unsupported parser directive ignored"),
        },
        _ => {
            if let Some(find) = parenthesized(key, "replace_string") {
                config.find_string.push(find.to_string());
                config.replace_string.push(value.to_string());
            } else if let Some(name) = parenthesized(key, "http_header") {
                config
                    .http_header
                    .push((name.to_ascii_lowercase(), value.to_string()));
            } else {
                debug!(key, "unknown directive skipped");
            }
        }
    }
}

/// True iff the value spells an affirmative; `no`, `0`, typos etc. all
/// read as false.
fn parse_bool(value: &str) -> bool {
    value == "yes" || value == "true"
}

/// Extract `<token>` from `name(<token>)`.
fn parenthesized<'a>(key: &'a str, name: &str) -> Option<&'a str> {
    key.strip_prefix(name)?
        .strip_prefix('(')?
        .strip_suffix(')')
        .map(str::trim)
}
