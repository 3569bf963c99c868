// src/services/url_store.rs
use log::{info, warn};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::config::{Settings, StoreConfig};
use crate::error::Result;
use crate::models::{Scope, UrlCollection};
use crate::services::analysis_store::AnalysisStore;
use crate::services::document::{self, Loaded};
use crate::services::ignore_list::IgnoreList;
use crate::services::listing::canonical_key;

/// What a URL write did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UrlWriteReport {
    /// False when the operation was a no-op (delete against a missing or
    /// unreadable document).
    pub written: bool,
    /// Size of the targeted set after the write.
    pub tracked: usize,
    /// URLs dropped because they are on the ignore list.
    pub ignored: Vec<String>,
    /// Analyses removed to keep analysis.json in step with urls.json.
    pub pruned_analyses: usize,
}

/// Anything that can commit a set of URLs under a write mode.
pub trait UrlWriter {
    fn write_urls(&self, urls: &BTreeSet<String>, config: StoreConfig) -> Result<UrlWriteReport>;
}

/// urls.json plus the ignore list and the analysis store it keeps consistent.
#[derive(Debug, Clone)]
pub struct UrlStore {
    path: PathBuf,
    ignore_list: IgnoreList,
    analyses: AnalysisStore,
}

impl UrlStore {
    pub fn new(path: impl Into<PathBuf>, ignore_list: IgnoreList, analyses: AnalysisStore) -> Self {
        UrlStore { path: path.into(), ignore_list, analyses }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        UrlStore::new(
            settings.urls_path(),
            IgnoreList::new(settings.ignored_urls_path()),
            AnalysisStore::new(settings.analysis_path()),
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored collection, or `None` when it is missing or unreadable.
    pub fn collection(&self) -> Option<UrlCollection> {
        match document::load(&self.path) {
            Loaded::Present(doc) => Some(doc),
            Loaded::Missing => None,
            Loaded::Corrupt(e) => {
                warn!("{}", e);
                None
            }
        }
    }

    /// Adds `urls` to the named set. Existing entries keep their discovered
    /// URL lists. A missing or unreadable document is replaced by a fresh one.
    pub fn append(&self, urls: &BTreeSet<String>, scope: Scope) -> Result<UrlWriteReport> {
        let (urls, ignored) = self.ignore_list.filter(urls);
        let mut doc: UrlCollection = document::load(&self.path).or_empty();

        let set = doc.set_mut(scope);
        for url in urls {
            set.entry(url).or_default();
        }
        let tracked = set.len();

        document::save(&self.path, &doc)?;
        info!("Appended to {} URLs; {} now tracked", scope, tracked);
        Ok(UrlWriteReport { written: true, tracked, ignored, pruned_analyses: 0 })
    }

    /// Replaces the named set with `urls`, first pruning the analyses of every
    /// URL that drops out of it.
    pub fn overwrite(&self, urls: &BTreeSet<String>, scope: Scope) -> Result<UrlWriteReport> {
        let (urls, ignored) = self.ignore_list.filter(urls);
        let mut doc: UrlCollection = document::load(&self.path).or_empty();

        let previous = std::mem::take(doc.set_mut(scope));
        let dropped_keys: Vec<String> = previous
            .iter()
            .filter(|(url, _)| !urls.contains(*url))
            .flat_map(|(url, discovered)| analysis_sources(scope, url, discovered))
            .map(|url| canonical_key(&url))
            .collect();
        let pruned_analyses = self.analyses.remove_keys(dropped_keys)?;

        let set = doc.set_mut(scope);
        for url in urls {
            let discovered = previous.get(&url).cloned().unwrap_or_default();
            set.insert(url, discovered);
        }
        let tracked = set.len();

        document::save(&self.path, &doc)?;
        info!("Overwrote {} URLs; {} now tracked", scope, tracked);
        Ok(UrlWriteReport { written: true, tracked, ignored, pruned_analyses })
    }

    /// Removes `urls` from the named set along with their analyses. Does
    /// nothing when the document is missing or unreadable.
    pub fn delete(&self, urls: &BTreeSet<String>, scope: Scope) -> Result<UrlWriteReport> {
        let mut doc: UrlCollection = match document::load(&self.path) {
            Loaded::Present(doc) => doc,
            Loaded::Missing => {
                info!("{} does not exist; nothing to delete", self.path.display());
                return Ok(UrlWriteReport::default());
            }
            Loaded::Corrupt(e) => {
                warn!("{}; nothing deleted", e);
                return Ok(UrlWriteReport::default());
            }
        };

        let set = doc.set_mut(scope);
        let dropped_keys: Vec<String> = urls
            .iter()
            .flat_map(|url| {
                let discovered = set.get(url).cloned().unwrap_or_default();
                analysis_sources(scope, url, &discovered)
            })
            .map(|url| canonical_key(&url))
            .collect();
        for url in urls {
            set.remove(url);
        }
        let tracked = set.len();

        let pruned_analyses = self.analyses.remove_keys(dropped_keys)?;
        document::save(&self.path, &doc)?;
        info!("Deleted from {} URLs; {} now tracked", scope, tracked);
        Ok(UrlWriteReport { written: true, tracked, ignored: Vec::new(), pruned_analyses })
    }

    /// Puts `urls` on the ignore list so no later write tracks them, drops
    /// them from the property set if present and prunes their analyses.
    pub fn ignore(&self, urls: &BTreeSet<String>) -> Result<UrlWriteReport> {
        self.ignore_list.append(urls.iter().map(String::as_str))?;
        let pruned_analyses = self.analyses.remove_keys(urls.iter().map(|url| canonical_key(url)))?;

        let mut report = UrlWriteReport { written: true, pruned_analyses, ..Default::default() };
        if let Loaded::Present(mut doc) = document::load::<UrlCollection>(&self.path) {
            let before = doc.property.len();
            doc.property.retain(|url, _| !urls.contains(url));
            if doc.property.len() != before {
                document::save(&self.path, &doc)?;
            }
            report.tracked = doc.property.len();
        }
        report.ignored = urls.iter().cloned().collect();
        info!("Ignoring {} URL(s)", urls.len());
        Ok(report)
    }
}

/// Property URLs whose analyses belong to `url`: the URL itself for property
/// scope, the URLs discovered on the page for search scope.
fn analysis_sources(scope: Scope, url: &str, discovered: &[String]) -> Vec<String> {
    match scope {
        Scope::Property => vec![url.to_string()],
        Scope::Search => discovered.to_vec(),
    }
}

impl UrlWriter for UrlStore {
    fn write_urls(&self, urls: &BTreeSet<String>, config: StoreConfig) -> Result<UrlWriteReport> {
        let scope = config.scope();
        if config.delete {
            self.delete(urls, scope)
        } else if config.overwrite {
            self.overwrite(urls, scope)
        } else {
            self.append(urls, scope)
        }
    }
}
