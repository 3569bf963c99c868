// src/services/document.rs
//! Whole-document JSON persistence shared by the URL and analysis stores.
//!
//! Every mutation reads the full document, changes it in memory and writes it
//! back in one go. There is no file locking: two processes touching the same
//! store at once are not supported.

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{AnalysisError, Result};

#[derive(Debug)]
pub enum Loaded<T> {
    Missing,
    Corrupt(AnalysisError),
    Present(T),
}

impl<T: Default> Loaded<T> {
    /// The document, with absent or unparsable content read as empty.
    pub fn or_empty(self) -> T {
        match self {
            Loaded::Present(doc) => doc,
            Loaded::Missing => T::default(),
            Loaded::Corrupt(e) => {
                warn!("{}; treating it as empty", e);
                T::default()
            }
        }
    }
}

pub fn load<T: DeserializeOwned>(path: &Path) -> Loaded<T> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("{} does not exist yet", path.display());
            return Loaded::Missing;
        }
        Err(e) => {
            return Loaded::Corrupt(AnalysisError::StoreCorrupt {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        }
    };

    match serde_json::from_str(&text) {
        Ok(doc) => Loaded::Present(doc),
        Err(e) => Loaded::Corrupt(AnalysisError::StoreCorrupt {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
    }
}

/// Writes `doc` with four-space indentation. The bytes go to a sibling temp
/// file first and are renamed over `path`, so readers never see half a document.
pub fn save<T: Serialize>(path: &Path, doc: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| AnalysisError::io(parent, e))?;
    }

    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    doc.serialize(&mut serializer)?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, &buf).map_err(|e| AnalysisError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| AnalysisError::io(path, e))?;
    debug!("Wrote {} bytes to {}", buf.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn round_trips_with_four_space_indent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("doc.json");
        let mut doc = BTreeMap::new();
        doc.insert("a".to_string(), vec![1, 2]);

        save(&path, &doc).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n    \"a\": ["), "{}", text);
        assert!(!dir.path().join("nested").join("doc.json.tmp").exists());

        match load::<BTreeMap<String, Vec<i32>>>(&path) {
            Loaded::Present(back) => assert_eq!(back, doc),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn missing_and_corrupt_read_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        assert!(matches!(load::<BTreeMap<String, i32>>(&path), Loaded::Missing));

        fs::write(&path, "[1, 2").unwrap();
        let loaded = load::<BTreeMap<String, i32>>(&path);
        assert!(matches!(loaded, Loaded::Corrupt(AnalysisError::StoreCorrupt { .. })));
        assert!(loaded.or_empty().is_empty());
    }
}
