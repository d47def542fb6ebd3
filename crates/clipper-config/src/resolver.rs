//! Host → merged SiteConfig resolution with a process-wide cache

use crate::parser;
use crate::site_config::SiteConfig;
use crate::store::ConfigFileStore;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Hosts longer than this are rejected outright.
const MAX_HOST_LEN: usize = 200;

/// The filename stem holding site-independent defaults.
const GLOBAL_HOST: &str = "global";

static DEFAULT_HOSTNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(([a-z0-9-]+)\.)*[a-z0-9-]+$").unwrap());

/// Resolver construction options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Rule directories, scanned in order (first wins on duplicates)
    pub directories: Vec<PathBuf>,
    /// Override for the hostname validation regex
    pub hostname_regex: Option<String>,
}

/// Resolves and merges rule files for hostnames.
///
/// Two cache layers persist for the life of the process: unmerged site
/// configs under `<host>`, and merged (site ∪ global) configs under
/// `<host>.merged`. Entries are immutable once published; a per-key build
/// lock keeps concurrent lookups from rebuilding the same merge.
#[derive(Debug)]
pub struct ConfigResolver {
    store: ConfigFileStore,
    hostname_re: Regex,
    cache: DashMap<String, Arc<SiteConfig>>,
    build_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ConfigResolver {
    pub fn new(store: ConfigFileStore) -> Self {
        Self {
            store,
            hostname_re: DEFAULT_HOSTNAME_RE.clone(),
            cache: DashMap::new(),
            build_locks: DashMap::new(),
        }
    }

    pub fn from_config(config: &ResolverConfig) -> Self {
        let store = ConfigFileStore::new(&config.directories);
        let mut resolver = Self::new(store);
        if let Some(pattern) = &config.hostname_regex {
            match Regex::new(pattern) {
                Ok(re) => resolver.hostname_re = re,
                Err(err) => warn!(pattern, error = %err, "invalid hostname regex, keeping default"),
            }
        }
        resolver
    }

    /// Return the merged (site ∪ global) config for a host.
    ///
    /// An invalid host resolves to an empty config so extraction can still
    /// fall back to the heuristic path.
    pub fn build_for_host(&self, host: &str, add_to_cache: bool) -> Arc<SiteConfig> {
        let Some(host) = self.normalize_host(host) else {
            return Arc::new(SiteConfig::new());
        };
        let merged_key = format!("{host}.merged");

        if let Some(hit) = self.cache.get(&merged_key) {
            return hit.clone();
        }

        // at-most-one builder per key
        let lock = self
            .build_locks
            .entry(merged_key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(hit) = self.cache.get(&merged_key) {
            return hit.clone();
        }

        let mut merged = self
            .load_site_config(&host, false)
            .map(|arc| (*arc).clone())
            .unwrap_or_default();

        if merged.should_autodetect() {
            if let Some(global) = self.load_site_config(GLOBAL_HOST, true) {
                merged.merge(&global);
            }
        }

        // merged entries never advertise a source file
        merged.cache_key = None;

        let merged = Arc::new(merged);
        if add_to_cache {
            self.cache.insert(merged_key, merged.clone());
        }
        merged
    }

    /// Return the unmerged site-specific config, if a rule file matches.
    ///
    /// Lookup order: exact `<host>.txt`, then (unless `exact_host_match`)
    /// one wildcard level `.<rest>.txt` with the leftmost label dropped.
    pub fn load_site_config(&self, host: &str, exact_host_match: bool) -> Option<Arc<SiteConfig>> {
        let host = self.normalize_host(host)?;

        if let Some(hit) = self.cache.get(&host) {
            return Some(hit.clone());
        }

        let mut candidates: Vec<String> = vec![host.clone()];
        if !exact_host_match {
            if let Some((_, rest)) = host.split_once('.') {
                if rest.contains('.') {
                    candidates.push(format!(".{rest}"));
                }
            }
        }

        for matched_host in candidates {
            let filename = format!("{matched_host}.txt");
            let Some(path) = self.store.get(&filename) else {
                continue;
            };

            let content = match std::fs::read_to_string(path) {
                Ok(content) => content,
                Err(err) => {
                    warn!(file = %path.display(), error = %err, "unreadable rule file");
                    continue;
                }
            };

            let mut config = parser::parse_str(&content);
            if config.is_empty() {
                // zero usable lines means "no config for this host"
                debug!(file = %path.display(), "rule file holds no usable directives");
                continue;
            }

            if config.cache_key.is_none() {
                config.cache_key = Some(matched_host);
            }

            let config = Arc::new(config);
            self.cache.insert(host, config.clone());
            return Some(config);
        }

        None
    }

    /// Lowercase, strip a leading `www.`, and validate. `None` means the
    /// host cannot name a rule file.
    fn normalize_host(&self, host: &str) -> Option<String> {
        let host = host.trim().to_ascii_lowercase();
        let host = host.strip_prefix("www.").unwrap_or(&host).to_string();

        if host.is_empty() || host.len() > MAX_HOST_LEN || !self.hostname_re.is_match(&host) {
            debug!(host = %host, "host failed validation");
            return None;
        }
        Some(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn resolver_with(files: &[(&str, &str)]) -> (ConfigResolver, TempDir) {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            std::fs::write(dir.path().join(name), content).unwrap();
        }
        let store = ConfigFileStore::new(&[dir.path()]);
        (ConfigResolver::new(store), dir)
    }

    #[test]
    fn exact_match_wins_and_records_cache_key() {
        let (resolver, _dir) = resolver_with(&[
            ("example.org.txt", "title: //h1\nbody: //article\n"),
            (".example.org.txt", "title: //h2\n"),
        ]);

        let config = resolver.load_site_config("example.org", false).unwrap();
        assert_eq!(config.title, vec!["//h1"]);
        assert_eq!(config.cache_key.as_deref(), Some("example.org"));
    }

    #[test]
    fn wildcard_match_drops_leftmost_label() {
        let (resolver, _dir) = resolver_with(&[(".example.org.txt", "body: //article\n")]);

        let config = resolver.load_site_config("fr.example.org", false).unwrap();
        assert_eq!(config.body, vec!["//article"]);
        assert_eq!(config.cache_key.as_deref(), Some(".example.org"));
    }

    #[test]
    fn exact_host_match_skips_wildcards() {
        let (resolver, _dir) = resolver_with(&[(".example.org.txt", "body: //article\n")]);
        assert!(resolver.load_site_config("fr.example.org", true).is_none());
    }

    #[test]
    fn host_case_and_www_are_normalized() {
        let (resolver, _dir) = resolver_with(&[("example.org.txt", "body: //article\n")]);

        let a = resolver.build_for_host("example.org", true);
        let b = resolver.build_for_host("WWW.EXAMPLE.ORG", true);
        let c = resolver.build_for_host("www.example.org", true);
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&b, &c));
    }

    #[test]
    fn build_for_host_is_idempotent() {
        let (resolver, _dir) = resolver_with(&[("example.org.txt", "body: //article\n")]);
        let first = resolver.build_for_host("example.org", true);
        for _ in 0..3 {
            let again = resolver.build_for_host("example.org", true);
            assert!(Arc::ptr_eq(&first, &again));
        }
    }

    #[test]
    fn global_is_merged_when_autodetect_allows() {
        let (resolver, _dir) = resolver_with(&[
            ("example.org.txt", "body: //article\n"),
            ("global.txt", "strip_id_or_class: sidebar\n"),
        ]);

        let merged = resolver.build_for_host("example.org", true);
        assert_eq!(merged.body, vec!["//article"]);
        assert_eq!(merged.strip_id_or_class, vec!["sidebar"]);
        // merged entries never reference a source file
        assert!(merged.cache_key.is_none());
    }

    #[test]
    fn declared_false_autodetect_skips_global() {
        let (resolver, _dir) = resolver_with(&[
            (
                "example.org.txt",
                "body: //article\nautodetect_on_failure: no\n",
            ),
            ("global.txt", "strip_id_or_class: sidebar\n"),
        ]);

        let merged = resolver.build_for_host("example.org", true);
        assert!(merged.strip_id_or_class.is_empty());
    }

    #[test]
    fn missing_rules_resolve_to_global_only() {
        let (resolver, _dir) = resolver_with(&[("global.txt", "strip: //aside\n")]);
        let merged = resolver.build_for_host("unknown.example", true);
        assert_eq!(merged.strip, vec!["//aside"]);
    }

    #[test]
    fn comment_only_rule_file_counts_as_absent() {
        let (resolver, _dir) = resolver_with(&[("example.org.txt", "# nothing here\n")]);
        assert!(resolver.load_site_config("example.org", false).is_none());
    }

    #[test]
    fn invalid_hosts_yield_empty_config() {
        let (resolver, _dir) = resolver_with(&[]);
        assert!(resolver.build_for_host("", true).is_empty());
        assert!(resolver.build_for_host("bad host!", true).is_empty());
        let long = "a".repeat(201);
        assert!(resolver.build_for_host(&long, true).is_empty());
    }
}
