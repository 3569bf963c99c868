// src/services/property_source.rs
use log::{info, warn};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{AnalysisError, Result};
use crate::models::PropertyFacts;
use crate::services::document::{self, Loaded};

/// Yields the facts of one listing.
pub trait PropertySource {
    fn fetch(&self, url: &str) -> Result<PropertyFacts>;
}

/// Facts read from a JSON file mapping property URL -> facts, as left behind
/// by an external scraper.
#[derive(Debug, Clone, Default)]
pub struct JsonPropertySource {
    entries: HashMap<String, Value>,
    interest_rate: Option<f64>,
    /// Set when the facts file could not be parsed; every lookup reports it.
    unreadable: Option<String>,
}

impl JsonPropertySource {
    /// Loads the facts file. A missing file gives an empty source; an
    /// unparsable one gives a source whose every lookup fails with the
    /// parse error, so each property is skipped and logged on its own.
    pub fn load(path: &Path) -> Self {
        let entries: Map<String, Value> = match document::load(path) {
            Loaded::Present(entries) => entries,
            Loaded::Missing => {
                warn!("No property facts at {}", path.display());
                Map::new()
            }
            Loaded::Corrupt(e) => {
                warn!("{}; every property lookup will fail", e);
                return JsonPropertySource { unreadable: Some(e.to_string()), ..Default::default() };
            }
        };
        info!("Loaded facts for {} properties from {}", entries.len(), path.display());
        JsonPropertySource { entries: entries.into_iter().collect(), ..Default::default() }
    }

    pub fn from_facts<I>(facts: I) -> Self
    where
        I: IntoIterator<Item = (String, PropertyFacts)>,
    {
        let entries = facts
            .into_iter()
            .filter_map(|(url, facts)| serde_json::to_value(facts).ok().map(|v| (url, v)))
            .collect();
        JsonPropertySource { entries, ..Default::default() }
    }

    /// Rate used for listings that do not carry their own.
    pub fn with_interest_rate(mut self, rate: Option<f64>) -> Self {
        self.interest_rate = rate;
        self
    }
}

impl PropertySource for JsonPropertySource {
    fn fetch(&self, url: &str) -> Result<PropertyFacts> {
        if let Some(message) = &self.unreadable {
            return Err(AnalysisError::Fetch { url: url.to_string(), message: message.clone() });
        }
        let raw = self.entries.get(url).ok_or_else(|| AnalysisError::Fetch {
            url: url.to_string(),
            message: "no facts recorded for this URL".to_string(),
        })?;
        let mut facts: PropertyFacts =
            serde_json::from_value(raw.clone()).map_err(|e| AnalysisError::Fetch {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        if facts.interest_rate.is_none() {
            facts.interest_rate = self.interest_rate;
        }
        Ok(facts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const URL: &str = "https://www.zillow.com/homedetails/1-Elm-St/11_zpid/";

    #[test]
    fn fills_in_missing_interest_rate() {
        let source = JsonPropertySource::from_facts(vec![(
            URL.to_string(),
            PropertyFacts { price: Some(100_000.0), ..Default::default() },
        )])
        .with_interest_rate(Some(0.07));

        let facts = source.fetch(URL).unwrap();
        assert_eq!(facts.interest_rate, Some(0.07));
        assert_eq!(facts.price, Some(100_000.0));
    }

    #[test]
    fn own_interest_rate_wins() {
        let source = JsonPropertySource::from_facts(vec![(
            URL.to_string(),
            PropertyFacts { interest_rate: Some(0.05), ..Default::default() },
        )])
        .with_interest_rate(Some(0.07));
        assert_eq!(source.fetch(URL).unwrap().interest_rate, Some(0.05));
    }

    #[test]
    fn unknown_or_malformed_entries_are_fetch_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("property_facts.json");
        fs::write(&path, format!(r#"{{ "{}": {{ "price": "a lot" }} }}"#, URL)).unwrap();

        let source = JsonPropertySource::load(&path);
        assert!(matches!(source.fetch(URL), Err(AnalysisError::Fetch { .. })));
        assert!(matches!(
            source.fetch("https://www.zillow.com/homedetails/x/9_zpid/"),
            Err(AnalysisError::Fetch { .. })
        ));
    }

    #[test]
    fn unparsable_file_fails_each_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("property_facts.json");
        fs::write(&path, "{ \"broken\": ").unwrap();

        let source = JsonPropertySource::load(&path);
        match source.fetch(URL) {
            Err(AnalysisError::Fetch { url, message }) => {
                assert_eq!(url, URL);
                assert!(message.contains("could not be parsed"));
            }
            other => panic!("expected fetch error, got {:?}", other),
        }
    }

    #[test]
    fn missing_file_is_an_empty_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonPropertySource::load(&dir.path().join("absent.json"));
        assert!(matches!(source.fetch(URL), Err(AnalysisError::Fetch { .. })));
    }
}
