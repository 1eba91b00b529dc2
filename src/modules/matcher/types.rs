use serde::{Deserialize, Deserializer, Serialize};

/// An externally supplied comic record, as loaded from CSV/JSON.
///
/// `issue` and `volume` tolerate both string and numeric JSON values since
/// catalogs disagree on typing; everything downstream works on the parsed
/// form, never on these raw fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RawComicRecord {
    pub title: String,
    #[serde(default, deserialize_with = "stringlike")]
    pub issue: Option<String>,
    #[serde(default, deserialize_with = "yearlike")]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "stringlike")]
    pub volume: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
}

impl RawComicRecord {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }

    pub fn with_issue(mut self, issue: &str) -> Self {
        self.issue = Some(issue.to_string());
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }
}

/// Accept `"142"`, `142`, or `1.5` for string-typed record fields; empty
/// strings collapse to `None`.
fn stringlike<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        Text(String),
        Int(i64),
        Float(f64),
    }

    let value = Option::<StringOrNumber>::deserialize(deserializer)?;
    Ok(value.and_then(|v| {
        let rendered = match v {
            StringOrNumber::Text(s) => s.trim().to_string(),
            StringOrNumber::Int(i) => i.to_string(),
            StringOrNumber::Float(f) => f.to_string(),
        };
        if rendered.is_empty() {
            None
        } else {
            Some(rendered)
        }
    }))
}

/// Accept `1981`, `"1981"`, or a loose date string like `"1981-05-01"` for
/// the year field; anything without a plausible year collapses to `None`.
fn yearlike<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum YearOrDate {
        Number(i32),
        Text(String),
    }

    let value = Option::<YearOrDate>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        YearOrDate::Number(y) => Some(y),
        YearOrDate::Text(s) => crate::shared::utils::extract_year(&s),
    }))
}

/// Per-field similarity scores for one candidate pair, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldScores {
    pub title: f64,
    pub subtitle: f64,
    pub issue: f64,
    pub year: f64,
    pub sequel: f64,
}

impl FieldScores {
    /// Neutral vector: nothing known, nothing penalized.
    pub fn neutral() -> Self {
        Self {
            title: 0.5,
            subtitle: 0.5,
            issue: 0.5,
            year: 0.5,
            sequel: 0.5,
        }
    }
}

/// One scored (source, target) pairing; lives only inside a match run.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidatePair {
    pub source_index: usize,
    pub target_index: usize,
    pub field_scores: FieldScores,
    pub aggregate_score: f64,
}

/// Externally visible match output: both records, the confidence score,
/// and the per-field breakdown that drove it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub source: RawComicRecord,
    pub target: RawComicRecord,
    pub score: f64,
    pub field_scores: FieldScores,
}
