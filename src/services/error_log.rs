// src/services/error_log.rs
use log::error;
use std::error::Error as StdError;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{AnalysisError, Result};

const OFF_MARKET_HINT: &str = "--- (IS THE PROPERTY OFF MARKET? IF SO YOU CAN DELETE THE URL IF IT \
WAS INDIVIDUALLY ADDED TO PROPERTY URLs WITH add_urls. IF IT WAS ADDED BY A SEARCH URL, IGNORE \
THIS PROPERTY INSTEAD WITH ignore_urls.)---";

/// errors.log: one block per property whose analysis was skipped. Blocks
/// start with "###" so they are easy to jump between.
#[derive(Debug, Clone)]
pub struct ErrorLog {
    path: PathBuf,
}

/// Renders the block appended for a skipped property.
pub fn format_entry(url: &str, err: &AnalysisError) -> String {
    let mut chain = String::from("Error chain (outermost first):\n");
    let mut cause: Option<&dyn StdError> = err.source();
    let mut depth = 0;
    while let Some(e) = cause {
        depth += 1;
        chain.push_str(&format!("  {}: {}\n", depth, e));
        cause = e.source();
    }
    if depth == 0 {
        chain.push_str("  (no underlying cause)\n");
    }

    let hint = match err {
        AnalysisError::IncompletePropertyFacts { .. } | AnalysisError::Fetch { .. } => OFF_MARKET_HINT,
        _ => "",
    };

    format!("### {}: [\n{}{}: {}\n]{}\n\n", url, chain, err.kind(), err, hint)
}

impl ErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ErrorLog { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self, url: &str, err: &AnalysisError) -> Result<()> {
        error!("Skipping {}: {}", url, err);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| AnalysisError::io(parent, e))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| AnalysisError::io(&self.path, e))?;
        file.write_all(format_entry(url, err).as_bytes())
            .map_err(|e| AnalysisError::io(&self.path, e))
    }
}
