// src/services/ignore_list.rs
use log::{info, warn};
use std::collections::BTreeSet;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{AnalysisError, Result};

/// ignored_urls.txt: newline-delimited URLs that must never be tracked.
#[derive(Debug, Clone)]
pub struct IgnoreList {
    path: PathBuf,
}

impl IgnoreList {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        IgnoreList { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The ignored URLs; an unreadable or missing file ignores nothing.
    pub fn load(&self) -> BTreeSet<String> {
        match fs::read_to_string(&self.path) {
            Ok(text) => text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeSet::new(),
            Err(e) => {
                warn!("Could not read {}: {}", self.path.display(), e);
                BTreeSet::new()
            }
        }
    }

    /// Splits `urls` into (kept, ignored).
    pub fn filter(&self, urls: &BTreeSet<String>) -> (BTreeSet<String>, Vec<String>) {
        let ignored_urls = self.load();
        let (ignored, kept): (BTreeSet<String>, BTreeSet<String>) =
            urls.iter().cloned().partition(|url| ignored_urls.contains(url));
        if !ignored.is_empty() {
            warn!("{} URL(s) are on the ignore list and will not be added", ignored.len());
        }
        (kept, ignored.into_iter().collect())
    }

    pub fn append<'a, I>(&self, urls: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| AnalysisError::io(parent, e))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| AnalysisError::io(&self.path, e))?;

        let mut count = 0;
        for url in urls {
            writeln!(file, "{}", url).map_err(|e| AnalysisError::io(&self.path, e))?;
            count += 1;
        }
        info!("Added {} URL(s) to {}", count, self.path.display());
        Ok(())
    }
}
