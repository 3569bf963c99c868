// src/services/analysis_store.rs
use log::{info, warn};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::AnalysisRecord;
use crate::services::document::{self, Loaded};

type AnalysisDocument = Map<String, Value>;

/// Per-key result of a batch commit, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub updated: Vec<(String, bool)>,
}

impl BatchReport {
    pub fn any_updated(&self) -> bool {
        self.updated.iter().any(|(_, updated)| *updated)
    }

    pub fn updated_count(&self) -> usize {
        self.updated.iter().filter(|(_, updated)| *updated).count()
    }
}

/// analysis.json: canonical property key -> analysis record.
#[derive(Debug, Clone)]
pub struct AnalysisStore {
    path: PathBuf,
}

fn stored_price(doc: &AnalysisDocument, key: &str) -> f64 {
    doc.get(key)
        .and_then(|record| record.get("Property Info"))
        .and_then(|info| info.get("Price ($)"))
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}

/// Puts `record` under `key` unless the stored price already matches.
fn apply(doc: &mut AnalysisDocument, key: &str, record: &AnalysisRecord) -> Result<bool> {
    if record.property_info.price == stored_price(doc, key) {
        return Ok(false);
    }
    doc.insert(key.to_string(), serde_json::to_value(record)?);
    Ok(true)
}

impl AnalysisStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        AnalysisStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current document; missing or corrupt reads as empty.
    pub fn records(&self) -> AnalysisDocument {
        document::load(&self.path).or_empty()
    }

    /// Typed view of a single stored record, if it parses.
    pub fn get(&self, key: &str) -> Option<AnalysisRecord> {
        self.records()
            .remove(key)
            .and_then(|value| serde_json::from_value(value).ok())
    }

    /// Stores `record` only when its price differs from the stored one
    /// (a missing record counts as price 0). Other fields of an existing
    /// record are left as they are when the price matches.
    pub fn upsert_one(&self, key: &str, record: &AnalysisRecord) -> Result<bool> {
        let mut doc = self.records();
        let updated = apply(&mut doc, key, record)?;
        if updated {
            document::save(&self.path, &doc)?;
            info!("Analysis for {} written to {}", key, self.path.display());
        } else {
            info!("Analysis for {} unchanged (same price)", key);
        }
        Ok(updated)
    }

    /// Same rule as `upsert_one` for each entry in order, with a single
    /// write at the end if anything changed.
    pub fn upsert_batch(&self, entries: &[(String, AnalysisRecord)]) -> Result<BatchReport> {
        let mut doc = self.records();
        let mut report = BatchReport::default();
        for (key, record) in entries {
            let updated = apply(&mut doc, key, record)?;
            report.updated.push((key.clone(), updated));
        }

        if report.any_updated() {
            document::save(&self.path, &doc)?;
            info!(
                "{} of {} analyses added/updated in {}",
                report.updated_count(),
                entries.len(),
                self.path.display()
            );
        }
        Ok(report)
    }

    /// Removes the given keys. Nothing is written when the document is
    /// missing or corrupt, or when none of the keys were present.
    pub fn remove_keys<I>(&self, keys: I) -> Result<usize>
    where
        I: IntoIterator<Item = String>,
    {
        let mut doc: AnalysisDocument = match document::load(&self.path) {
            Loaded::Present(doc) => doc,
            Loaded::Missing => return Ok(0),
            Loaded::Corrupt(e) => {
                warn!("{}; skipping analysis pruning", e);
                return Ok(0);
            }
        };

        let removed = keys
            .into_iter()
            .filter(|key| doc.remove(key).is_some())
            .count();
        if removed > 0 {
            document::save(&self.path, &doc)?;
            info!("Pruned {} analyses from {}", removed, self.path.display());
        }
        Ok(removed)
    }

    /// Drops every analysis whose "Property URL" is not tracked any more.
    /// A corrupt document is reset to `{}`.
    pub fn retain_tracked(&self, tracked: &BTreeMap<String, Vec<String>>) -> Result<usize> {
        let mut doc: AnalysisDocument = match document::load(&self.path) {
            Loaded::Present(doc) => doc,
            Loaded::Missing => return Ok(0),
            Loaded::Corrupt(e) => {
                warn!("{}; resetting it", e);
                document::save(&self.path, &AnalysisDocument::new())?;
                return Ok(0);
            }
        };

        let before = doc.len();
        doc.retain(|_, record| {
            record
                .get("Property URL")
                .and_then(Value::as_str)
                .map_or(false, |url| tracked.contains_key(url))
        });
        let removed = before - doc.len();
        if removed > 0 {
            document::save(&self.path, &doc)?;
            info!("Removed {} untracked analyses", removed);
        }
        Ok(removed)
    }
}
