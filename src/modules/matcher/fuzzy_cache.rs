use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::modules::parser::ParsedTitle;
use crate::shared::{MatcherError, MatcherResult};

/// Precomputed parse results keyed by raw title and issue.
///
/// Large catalogs re-parse the same strings on every run; a cache file lets
/// a deployment skip that work and also pin corrected parses for titles the
/// parser gets wrong.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FuzzyHashCache {
    entries: HashMap<String, ParsedTitle>,
}

impl FuzzyHashCache {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a cache from a JSON file.
    ///
    /// A missing file is not an error: runs are expected to work without a
    /// cache, so it degrades to empty. A file that exists but cannot be
    /// read or parsed is a hard error, since silently ignoring it would
    /// mask a corrupted deployment.
    pub fn load<P: AsRef<Path>>(path: P) -> MatcherResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!(
                "fuzzy hash cache {} not found, starting empty",
                path.display()
            );
            return Ok(Self::empty());
        }

        let text = std::fs::read_to_string(path).map_err(|e| {
            MatcherError::Cache(format!("failed to read {}: {}", path.display(), e))
        })?;
        let entries: HashMap<String, ParsedTitle> =
            serde_json::from_str(&text).map_err(|e| {
                MatcherError::Cache(format!("failed to parse {}: {}", path.display(), e))
            })?;

        log::info!(
            "loaded {} fuzzy hash entries from {}",
            entries.len(),
            path.display()
        );
        Ok(Self { entries })
    }

    /// The lookup key for a record: lowercased title and issue joined with a
    /// separator that cannot appear in an issue number.
    pub fn identity_key(title: &str, issue: Option<&str>) -> String {
        format!(
            "{}|{}",
            title.trim().to_lowercase(),
            issue.unwrap_or("").trim().to_lowercase()
        )
    }

    pub fn get(&self, title: &str, issue: Option<&str>) -> Option<&ParsedTitle> {
        self.entries.get(&Self::identity_key(title, issue))
    }

    pub fn insert(&mut self, title: &str, issue: Option<&str>, parsed: ParsedTitle) {
        self.entries.insert(Self::identity_key(title, issue), parsed);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
