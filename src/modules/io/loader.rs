use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::modules::matcher::types::RawComicRecord;
use crate::shared::utils::normalize_publisher;
use crate::shared::{MatcherError, MatcherResult};

/// Load comic records from a file, dispatching on extension.
pub fn load_records<P: AsRef<Path>>(path: P) -> MatcherResult<Vec<RawComicRecord>> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    let mut records = match extension.as_deref() {
        Some("csv") => load_records_from_csv(path)?,
        Some("json") => load_records_from_json(path)?,
        other => {
            return Err(MatcherError::UnsupportedFormat(format!(
                "unsupported input extension {:?} for {}",
                other.unwrap_or(""),
                path.display()
            )))
        }
    };

    for record in &mut records {
        if let Some(publisher) = &record.publisher {
            record.publisher = Some(normalize_publisher(publisher));
        }
    }
    Ok(records)
}

/// CSV loading is lenient: rows that fail to deserialize are logged and
/// skipped rather than failing the whole file, since scraped catalogs
/// routinely contain a few malformed lines.
pub fn load_records_from_csv(path: &Path) -> MatcherResult<Vec<RawComicRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;

    let mut records = Vec::new();
    for (line, row) in reader.deserialize::<RawComicRecord>().enumerate() {
        match row {
            Ok(record) if !record.title.trim().is_empty() => records.push(record),
            Ok(_) => log::warn!("skipping row {} of {}: empty title", line + 2, path.display()),
            Err(e) => log::warn!("skipping row {} of {}: {}", line + 2, path.display(), e),
        }
    }

    log::info!("loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// JSON inputs come in several shapes: a bare list, a `{"results": [...]}`
/// or `{"comics": [...]}` wrapper, or an id-keyed map of records.
pub fn load_records_from_json(path: &Path) -> MatcherResult<Vec<RawComicRecord>> {
    let text = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&text)?;

    let records = match value {
        Value::Array(items) => from_list(items)?,
        Value::Object(mut map) => {
            if let Some(Value::Array(items)) =
                map.remove("results").or_else(|| map.remove("comics"))
            {
                from_list(items)?
            } else {
                let keyed: HashMap<String, RawComicRecord> =
                    serde_json::from_value(Value::Object(map))?;
                let mut records: Vec<(String, RawComicRecord)> = keyed.into_iter().collect();
                records.sort_by(|a, b| a.0.cmp(&b.0));
                records.into_iter().map(|(_, r)| r).collect()
            }
        }
        _ => {
            return Err(MatcherError::UnsupportedFormat(format!(
                "expected a JSON list or object in {}",
                path.display()
            )))
        }
    };

    log::info!("loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

fn from_list(items: Vec<Value>) -> MatcherResult<Vec<RawComicRecord>> {
    let mut records = Vec::with_capacity(items.len());
    for item in items {
        records.push(RawComicRecord::deserialize(item)?);
    }
    Ok(records)
}
