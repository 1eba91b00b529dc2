use std::path::Path;

use serde::Serialize;

use crate::modules::matcher::types::MatchResult;
use crate::shared::MatcherResult;

/// Flattened CSV row for one match, with the per-field score breakdown that
/// explains the aggregate.
#[derive(Debug, Serialize)]
struct MatchRow<'a> {
    source_title: &'a str,
    source_issue: &'a str,
    source_year: Option<i32>,
    target_title: &'a str,
    target_issue: &'a str,
    target_year: Option<i32>,
    score: f64,
    title_score: f64,
    subtitle_score: f64,
    issue_score: f64,
    year_score: f64,
    sequel_score: f64,
}

pub fn export_matches_to_csv<P: AsRef<Path>>(
    matches: &[MatchResult],
    path: P,
) -> MatcherResult<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)?;

    for result in matches {
        writer.serialize(MatchRow {
            source_title: &result.source.title,
            source_issue: result.source.issue.as_deref().unwrap_or(""),
            source_year: result.source.year,
            target_title: &result.target.title,
            target_issue: result.target.issue.as_deref().unwrap_or(""),
            target_year: result.target.year,
            score: result.score,
            title_score: result.field_scores.title,
            subtitle_score: result.field_scores.subtitle,
            issue_score: result.field_scores.issue,
            year_score: result.field_scores.year,
            sequel_score: result.field_scores.sequel,
        })?;
    }
    writer.flush()?;

    log::info!("wrote {} matches to {}", matches.len(), path.display());
    Ok(())
}

pub fn export_matches_to_json<P: AsRef<Path>>(
    matches: &[MatchResult],
    path: P,
) -> MatcherResult<()> {
    let path = path.as_ref();
    let text = serde_json::to_string_pretty(matches)?;
    std::fs::write(path, text)?;
    log::info!("wrote {} matches to {}", matches.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::matcher::types::{FieldScores, RawComicRecord};

    fn sample_match() -> MatchResult {
        MatchResult {
            source: RawComicRecord::new("Uncanny X-Men")
                .with_issue("142")
                .with_year(1981),
            target: RawComicRecord::new("X-Men").with_issue("142"),
            score: 0.95,
            field_scores: FieldScores {
                title: 1.0,
                subtitle: 1.0,
                issue: 1.0,
                year: 0.5,
                sequel: 1.0,
            },
        }
    }

    #[test]
    fn test_csv_export_round_trip() {
        let file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        export_matches_to_csv(&[sample_match()], file.path()).unwrap();

        let text = std::fs::read_to_string(file.path()).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.contains("source_title"));
        assert!(header.contains("issue_score"));
        let row = lines.next().unwrap();
        assert!(row.contains("Uncanny X-Men"));
        assert!(row.contains("142"));
    }

    #[test]
    fn test_json_export_round_trip() {
        let file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        export_matches_to_json(&[sample_match()], file.path()).unwrap();

        let text = std::fs::read_to_string(file.path()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed[0]["source"]["title"], "Uncanny X-Men");
        assert_eq!(parsed[0]["score"], 0.95);
    }

    #[test]
    fn test_empty_export_writes_file() {
        let file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        export_matches_to_csv(&[], file.path()).unwrap();
        assert!(file.path().exists());
    }
}
